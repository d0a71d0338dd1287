//! Identity service
//!
//! First-contact initialization: resolve an external user identity to an
//! owner and make sure that owner has a root skill.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::{ApplicationResult, TreeStore};
use crate::domain::{Owner, Skill};

/// Outcome of initializing a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInit {
    pub owner: Owner,
    /// Whether the owner was registered by this call
    pub created: bool,
    /// Root provisioned by this call, if any
    pub root: Option<Skill>,
}

/// Service mapping external identities onto skill tree owners.
pub struct IdentityService {
    store: Arc<TreeStore>,
    root_name: String,
}

impl IdentityService {
    pub fn new(store: Arc<TreeStore>, root_name: impl Into<String>) -> Self {
        Self {
            store,
            root_name: root_name.into(),
        }
    }

    /// Resolve (or register) the user and provision their root, atomically.
    ///
    /// Calling this again for the same identity is a no-op apart from
    /// refreshing the username.
    #[instrument(level = "debug", skip(self))]
    pub fn init_user(&self, external_id: i64, username: Option<&str>) -> ApplicationResult<UserInit> {
        let root_name = self.root_name.as_str();
        let init = self.store.write(|state| {
            let (owner, created) = state.owners.resolve(external_id, username);
            let root = state.forest.ensure_root(&owner.id, root_name).cloned();
            Ok(UserInit {
                owner,
                created,
                root,
            })
        })?;
        if init.created {
            info!("registered owner {} for external id {}", init.owner.id, external_id);
        }
        Ok(init)
    }

    pub fn find(&self, external_id: i64) -> ApplicationResult<Option<Owner>> {
        self.store
            .read(|state| state.owners.find(external_id).cloned())
    }

    pub fn owners(&self) -> ApplicationResult<Vec<Owner>> {
        self.store
            .read(|state| state.owners.owners().cloned().collect())
    }
}
