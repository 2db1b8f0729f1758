#![allow(dead_code)]

//! Fake collaborators for tests: a line-oriented definition loader, a
//! recording job factory, and an in-memory suspension set.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use dagsched::errors::Result;
use dagsched::{DefinitionLoader, Job, JobFactory, ScheduleExpr, SuspendChecker, WorkflowHead};

/// A [`DefinitionLoader`] over a trivial line-oriented format:
///
/// ```text
/// name my-workflow
/// start * * * * *
/// stop 0 0 * * *
/// restart 30 2 * * *
/// ```
///
/// Blank lines are ignored. Any unknown key or unparsable expression fails
/// the load, which lets tests create malformed definition files trivially.
/// If no `name` line is present the file stem is used.
#[derive(Debug, Default)]
pub struct LineLoader;

impl DefinitionLoader for LineLoader {
    fn load(&self, path: &Path) -> Result<WorkflowHead> {
        let contents = std::fs::read_to_string(path)?;
        let mut head = WorkflowHead::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, rest) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow::anyhow!("malformed line: {line:?}"))?;
            match key {
                "name" => head.name = rest.trim().to_string(),
                "start" => head.start.push(ScheduleExpr::parse(rest)?),
                "stop" => head.stop.push(ScheduleExpr::parse(rest)?),
                "restart" => head.restart.push(ScheduleExpr::parse(rest)?),
                other => return Err(anyhow::anyhow!("unknown head key: {other:?}").into()),
            }
        }

        if head.name.is_empty() {
            head.name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unnamed")
                .to_string();
        }

        Ok(head)
    }
}

/// A [`Job`] that records every dispatch into a shared log as
/// `"<kind>:<name>"`, optionally failing each call.
pub struct RecordingJob {
    name: String,
    invoked: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingJob {
    fn record(&self, kind: &str) -> Result<()> {
        self.invoked
            .lock()
            .unwrap()
            .push(format!("{kind}:{}", self.name));
        if self.fail {
            return Err(anyhow::anyhow!("job {} told to fail", self.name).into());
        }
        Ok(())
    }
}

impl Job for RecordingJob {
    fn start(&self) -> Result<()> {
        self.record("start")
    }

    fn stop(&self) -> Result<()> {
        self.record("stop")
    }

    fn restart(&self) -> Result<()> {
        self.record("restart")
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Factory producing [`RecordingJob`]s that all share one invocation log.
pub struct RecordingJobFactory {
    invoked: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingJobFactory {
    pub fn new() -> Self {
        Self {
            invoked: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// All produced jobs fail their start/stop/restart calls.
    pub fn failing() -> Self {
        Self {
            invoked: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// The shared `"<kind>:<name>"` invocation log.
    pub fn invoked(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.invoked)
    }
}

impl Default for RecordingJobFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl JobFactory for RecordingJobFactory {
    fn job_for(&self, head: &WorkflowHead, _next: DateTime<Utc>) -> Arc<dyn Job> {
        Arc::new(RecordingJob {
            name: head.name.clone(),
            invoked: Arc::clone(&self.invoked),
            fail: self.fail,
        })
    }
}

/// In-memory suspension predicate backed by a name set.
#[derive(Debug, Default)]
pub struct SuspendSet {
    suspended: Mutex<HashSet<String>>,
}

impl SuspendSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suspend(&self, name: &str) {
        self.suspended.lock().unwrap().insert(name.to_string());
    }

    pub fn resume(&self, name: &str) {
        self.suspended.lock().unwrap().remove(name);
    }
}

impl SuspendChecker for SuspendSet {
    fn is_suspended(&self, name: &str) -> bool {
        self.suspended.lock().unwrap().contains(name)
    }
}
