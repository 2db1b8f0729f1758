// src/registry.rs

//! The live registry of workflow schedule heads.
//!
//! One mutex-guarded map from definition-file base name to [`WorkflowHead`].
//! Built by an initial directory scan, kept current by applying watcher
//! events. Mutations are whole-value insert/replace/delete only; readers get
//! point-in-time snapshots and never see a half-applied change.
//!
//! The lock guards nothing but the map itself. Parsing and filesystem I/O
//! happen before it is taken, so `apply` completes in bounded time no matter
//! how slow the loader is.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::head::{base_name, matches_extension, DefinitionLoader, WorkflowHead};
use crate::watch::{ChangeEvent, ChangeKind};

#[derive(Debug, Default)]
pub struct Registry {
    heads: Mutex<HashMap<String, WorkflowHead>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            heads: Mutex::new(HashMap::new()),
        }
    }

    /// Populate the registry from a full directory scan.
    ///
    /// Files whose extension is not in `extensions` are ignored. A file that
    /// fails to load is logged and skipped; only an unreadable directory
    /// fails the scan as a whole.
    pub fn scan(
        &self,
        dir: &Path,
        loader: &dyn DefinitionLoader,
        extensions: &[String],
    ) -> Result<()> {
        let entries = std::fs::read_dir(dir)?;

        let mut loaded = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "failed to read directory entry; skipping");
                    continue;
                }
            };
            let path = entry.path();
            if !matches_extension(&path, extensions) {
                continue;
            }
            let Some(key) = base_name(&path) else {
                continue;
            };
            match loader.load(&path) {
                Ok(head) => {
                    self.lock().insert(key.clone(), head);
                    loaded.push(key);
                }
                Err(err) => {
                    warn!(file = %key, error = %err, "failed to load definition head; skipping");
                }
            }
        }

        info!(count = loaded.len(), files = ?loaded, "initial definition scan complete");
        Ok(())
    }

    /// Apply one coalesced filesystem event.
    ///
    /// Created/Modified reload the head and swap it in atomically; a load
    /// failure leaves the previous entry (if any) untouched. Removed/Renamed
    /// delete by base filename and are a no-op for absent keys.
    pub fn apply(&self, event: &ChangeEvent, loader: &dyn DefinitionLoader) {
        let Some(key) = base_name(&event.path) else {
            return;
        };

        match event.kind {
            ChangeKind::Created | ChangeKind::Modified => match loader.load(&event.path) {
                Ok(head) => {
                    self.lock().insert(key.clone(), head);
                    info!(file = %key, "reloaded definition entry");
                }
                Err(err) => {
                    warn!(
                        file = %key,
                        error = %err,
                        "failed to reload definition; keeping previous entry"
                    );
                }
            },
            ChangeKind::Removed | ChangeKind::Renamed => {
                if self.lock().remove(&key).is_some() {
                    info!(file = %key, "removed definition entry");
                } else {
                    debug!(file = %key, "remove for unknown entry; ignoring");
                }
            }
        }
    }

    /// Consistent point-in-time view of all entries, for iteration by entry
    /// production. Ordering is unspecified.
    pub fn snapshot(&self) -> Vec<(String, WorkflowHead)> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Nothing panics while the lock is held (map operations only), so a
    /// poisoned lock still holds a consistent map and can be recovered.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, WorkflowHead>> {
        self.heads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
