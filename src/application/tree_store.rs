//! Transactional access to the persisted skill forest.
//!
//! Every mutation runs as: take the writer lock, take the store lock, load a
//! snapshot, rebuild the forest, apply the change, save. Failed changes never
//! reach `save`, so no partial mutation is observable and two adds can never
//! count the same siblings, even from separate processes sharing one store.

use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{ForestBuilder, OwnerRegistry, SkillForest};
use crate::infrastructure::traits::{SkillStore, StoreSnapshot};

/// In-memory view of one snapshot.
#[derive(Debug, Clone, Default)]
pub struct TreeState {
    pub forest: SkillForest,
    pub owners: OwnerRegistry,
}

impl TreeState {
    fn from_snapshot(snapshot: StoreSnapshot) -> ApplicationResult<Self> {
        let forest = ForestBuilder::new().build(snapshot.skills)?;
        Ok(Self {
            forest,
            owners: OwnerRegistry::from_owners(snapshot.owners),
        })
    }

    fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            owners: self.owners.owners().cloned().collect(),
            skills: self.forest.to_records(),
        }
    }
}

/// Single-writer gateway to a `SkillStore`.
pub struct TreeStore {
    store: Arc<dyn SkillStore>,
    writer: Mutex<()>,
}

impl TreeStore {
    pub fn new(store: Arc<dyn SkillStore>) -> Self {
        Self {
            store,
            writer: Mutex::new(()),
        }
    }

    pub fn describe(&self) -> String {
        self.store.describe()
    }

    fn load(&self) -> ApplicationResult<TreeState> {
        let snapshot = self
            .store
            .load()
            .with_store_context("load snapshot", &self.store.describe())?;
        TreeState::from_snapshot(snapshot)
    }

    /// Run a read-only query against the current snapshot.
    pub fn read<T>(&self, query: impl FnOnce(&TreeState) -> T) -> ApplicationResult<T> {
        let state = self.load()?;
        Ok(query(&state))
    }

    /// Run a mutation as one atomic unit.
    ///
    /// The snapshot is saved only when `change` succeeds.
    #[instrument(level = "debug", skip_all)]
    pub fn write<T>(
        &self,
        change: impl FnOnce(&mut TreeState) -> ApplicationResult<T>,
    ) -> ApplicationResult<T> {
        let _guard = self.writer.lock().map_err(|_| ApplicationError::OperationFailed {
            context: "acquire writer lock".into(),
            source: "writer lock poisoned".into(),
        })?;
        let _store_lock = self
            .store
            .lock()
            .with_store_context("lock store", &self.store.describe())?;

        let mut state = self.load()?;
        let out = change(&mut state)?;
        self.store
            .save(&state.to_snapshot())
            .with_store_context("save snapshot", &self.store.describe())?;
        debug!("committed, {} skills", state.forest.len());
        Ok(out)
    }
}
