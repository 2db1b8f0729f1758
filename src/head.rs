// src/head.rs

//! Workflow definition heads and the loader seam.
//!
//! `dagsched` never parses a full workflow definition. It only consumes the
//! "head": the workflow's name plus its three schedule-expression groups.
//! How a definition file is turned into a head is behind the
//! [`DefinitionLoader`] trait, so the real parser lives in the embedding
//! process and tests can substitute a fake.

use std::path::Path;

use crate::errors::Result;
use crate::schedule::ScheduleExpr;

/// Minimal schedule metadata for one definition file.
///
/// Replaced wholesale in the registry on reload; readers holding a snapshot
/// never observe a half-updated head.
#[derive(Debug, Clone, Default)]
pub struct WorkflowHead {
    /// Workflow identity, also the key the suspension predicate is asked about.
    pub name: String,
    pub start: Vec<ScheduleExpr>,
    pub stop: Vec<ScheduleExpr>,
    pub restart: Vec<ScheduleExpr>,
}

/// Parses just enough of a definition file to produce its [`WorkflowHead`].
///
/// Implementations must tolerate repeated calls for the same path and return
/// a fresh, independent value each time.
pub trait DefinitionLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<WorkflowHead>;
}

/// Default recognized definition-file extensions.
pub const DEFAULT_EXTENSIONS: &[&str] = &["yaml", "yml", "dag"];

/// Whether `path` carries one of the recognized definition extensions.
///
/// Extensions are compared without the leading dot, case-insensitively.
/// Paths without an extension never match.
pub fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|c| c.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Base filename used as the registry key for `path`, if it has one.
pub fn base_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}
