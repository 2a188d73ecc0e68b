//! Application state shared by all handlers.
//!
//! [`PageService`] holds no mutable state of its own; storage is the single
//! source of truth. Writers are serialized per page by [`PageLocks`].

use std::sync::Arc;

use nifki_build::{BuildInvoker, ProcessRunner, SystemRunner};
use nifki_storage::FsPageStore;

use crate::config::Config;
use crate::error::ApiError;
use crate::locks::PageLocks;
use crate::service::PageService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PageService>,
    /// Per-page save locks.
    pub locks: Arc<PageLocks>,
}

impl AppState {
    /// State backed by the configured wiki directory and the real compiler.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    /// Like [`AppState::new`], with builds run by `runner`.
    pub fn with_runner(config: Config, runner: Arc<dyn ProcessRunner>) -> Result<Self, ApiError> {
        let store = FsPageStore::open(config.wiki_dir.clone())?;
        let invoker = BuildInvoker::new(config.build.clone(), runner);
        let service = PageService::new(Arc::new(store), invoker, config.secret_key.clone());
        Ok(AppState {
            service: Arc::new(service),
            locks: Arc::new(PageLocks::new()),
        })
    }
}
