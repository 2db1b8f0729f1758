// src/service.rs

//! The entry service: registry + watcher + entry production, wired together.
//!
//! This is the crate's outward surface. The embedding process constructs an
//! [`EntryService`] with its own loader, suspension predicate and job
//! factory, calls [`start`](EntryService::start) once, then calls
//! [`read`](EntryService::read) on every scheduler tick and invokes the
//! returned entries. [`stop`](EntryService::stop) shuts the watcher down.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::SchedulerConfig;
use crate::entry::{produce, Entry, JobFactory, SuspendChecker};
use crate::errors::Result;
use crate::head::{matches_extension, DefinitionLoader};
use crate::registry::Registry;
use crate::watch::{spawn_watcher, WatcherHandle, WatcherOptions};

pub struct EntryService {
    config: SchedulerConfig,
    registry: Arc<Registry>,
    loader: Arc<dyn DefinitionLoader>,
    suspend: Arc<dyn SuspendChecker>,
    jobs: Arc<dyn JobFactory>,
    watcher: Option<WatcherHandle>,
}

impl std::fmt::Debug for EntryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryService")
            .field("config", &self.config)
            .field("entries", &self.registry.len())
            .field("watching", &self.watcher.is_some())
            .finish_non_exhaustive()
    }
}

impl EntryService {
    pub fn new(
        config: SchedulerConfig,
        loader: Arc<dyn DefinitionLoader>,
        suspend: Arc<dyn SuspendChecker>,
        jobs: Arc<dyn JobFactory>,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(Registry::new()),
            loader,
            suspend,
            jobs,
            watcher: None,
        }
    }

    /// Scan the definitions directory and start watching it.
    ///
    /// A failed scan or watcher setup is fatal and surfaced here; the service
    /// must not run in an undefined state. Must be called from within a tokio
    /// runtime (the watch loop is a spawned task).
    pub fn start(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Err(crate::errors::DagschedError::ConfigError(
                "entry service already started".to_string(),
            ));
        }
        self.config.validate()?;

        self.registry.scan(
            &self.config.dags_dir,
            self.loader.as_ref(),
            &self.config.extensions,
        )?;

        let (handle, mut events) = spawn_watcher(
            &self.config.dags_dir,
            WatcherOptions {
                debounce_window: self.config.debounce_window,
                poll_interval: self.config.poll_interval,
            },
        )?;
        self.watcher = Some(handle);

        // Single writer task: the sole mutation path into the registry after
        // the initial scan.
        let registry = Arc::clone(&self.registry);
        let loader = Arc::clone(&self.loader);
        let extensions = self.config.extensions.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if !matches_extension(&event.path, &extensions) {
                    continue;
                }
                registry.apply(&event, loader.as_ref());
            }
            debug!("registry watch loop finished");
        });

        info!(dir = ?self.config.dags_dir, "entry service started");
        Ok(())
    }

    /// Produce the entries due relative to `now` from the current registry
    /// snapshot. Safe to call concurrently with ongoing reloads.
    pub fn read(&self, now: DateTime<Utc>) -> Vec<Entry> {
        let snapshot = self.registry.snapshot();
        produce(now, &snapshot, self.suspend.as_ref(), self.jobs.as_ref())
    }

    /// The live registry (snapshot access for callers that want it).
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Stop watching. Idempotent; the registry stays readable afterwards, it
    /// just no longer tracks filesystem changes.
    pub fn stop(&mut self) {
        if let Some(mut handle) = self.watcher.take() {
            handle.close();
            info!("entry service stopped watching");
        }
    }
}

impl Drop for EntryService {
    fn drop(&mut self) {
        self.stop();
    }
}
