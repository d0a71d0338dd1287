//! Service container for dependency injection
//!
//! Wires up all services with their dependencies. The container owns the
//! store for the lifetime of the process; dropping it tears everything down.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{IdentityService, SkillTreeService};
use crate::application::TreeStore;
use crate::config::{Settings, StoreBackend};
use crate::domain::OwnerId;
use crate::infrastructure::store::{JsonFileStore, MemoryStore};
use crate::infrastructure::traits::{FileSystem, RealFileSystem, SkillStore};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Transactional gateway shared by all services
    pub tree_store: Arc<TreeStore>,

    pub skills: SkillTreeService,
    pub identity: IdentityService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store: Arc<dyn SkillStore> = match settings.store {
            StoreBackend::Json => Arc::new(JsonFileStore::new(fs, settings.store_path())),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        Self::with_deps(settings, store)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, store: Arc<dyn SkillStore>) -> Self {
        debug!("wiring services on store {}", store.describe());
        let settings = Arc::new(settings);
        let tree_store = Arc::new(TreeStore::new(store));

        Self {
            skills: SkillTreeService::new(tree_store.clone(), settings.root_name.clone()),
            identity: IdentityService::new(tree_store.clone(), settings.root_name.clone()),
            settings,
            tree_store,
        }
    }

    /// Owner to use when a command names none.
    pub fn owner_or_default(&self, owner: Option<&str>) -> OwnerId {
        OwnerId::new(owner.unwrap_or(self.settings.default_owner.as_str()))
    }
}
