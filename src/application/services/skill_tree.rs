//! Skill tree service
//!
//! Tree Store operations: add, delete with cascade, train, list and root
//! provisioning, each executed as one atomic unit.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationResult, TreeStore};
use crate::domain::{
    DeletedSummary, DomainError, NewSkill, OwnerId, Skill, SkillForest, SkillKey, SkillView,
};

/// Shape and size of one owner's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub skills: usize,
    pub roots: usize,
    pub depth: usize,
    pub leaves: usize,
}

/// Service for mutating and querying skill trees.
pub struct SkillTreeService {
    store: Arc<TreeStore>,
    root_name: String,
}

impl SkillTreeService {
    /// Create a new skill tree service.
    pub fn new(store: Arc<TreeStore>, root_name: impl Into<String>) -> Self {
        Self {
            store,
            root_name: root_name.into(),
        }
    }

    /// Add a skill below `parent_id`, placed by the layout engine.
    ///
    /// Fails with `DuplicateId` if the owner already has a skill with this id.
    /// An unknown parent does not fail the call; the skill becomes a root.
    #[instrument(level = "debug", skip(self))]
    pub fn add_node(
        &self,
        id: &str,
        name: &str,
        parent_id: Option<&str>,
        owner: &OwnerId,
    ) -> ApplicationResult<Skill> {
        let skill = self.store.write(|state| {
            let skill = state.forest.add_skill(NewSkill {
                id: id.to_string(),
                name: name.to_string(),
                parent: parent_id.map(str::to_string),
                owner: owner.clone(),
            })?;
            Ok(skill.clone())
        })?;
        info!("added {} at {}", skill.key(), skill.pos);
        Ok(skill)
    }

    /// Delete a non-root skill and its whole subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&self, owner: &OwnerId, id: &str) -> ApplicationResult<DeletedSummary> {
        let key = SkillKey::new(owner, id);
        let summary = self
            .store
            .write(|state| Ok(state.forest.remove_subtree(&key)?))?;
        info!("deleted {} ({} skills)", key, summary.count());
        Ok(summary)
    }

    /// Train a skill: +10 levels, saturating at 100.
    #[instrument(level = "debug", skip(self))]
    pub fn train(&self, owner: &OwnerId, id: &str) -> ApplicationResult<Skill> {
        let key = SkillKey::new(owner, id);
        let skill = self
            .store
            .write(|state| Ok(state.forest.train(&key)?.clone()))?;
        debug!("trained {} to {}", key, skill.level);
        Ok(skill)
    }

    /// Provision the owner's root if the owner has none yet.
    #[instrument(level = "debug", skip(self))]
    pub fn ensure_owner_root(&self, owner: &OwnerId) -> ApplicationResult<Option<Skill>> {
        let root_name = self.root_name.as_str();
        let created = self
            .store
            .write(|state| Ok(state.forest.ensure_root(owner, root_name).cloned()))?;
        if created.is_some() {
            info!("provisioned root for {}", owner);
        }
        Ok(created)
    }

    /// All skills, optionally restricted to one owner.
    pub fn list_nodes(&self, owner: Option<&OwnerId>) -> ApplicationResult<BTreeMap<SkillKey, Skill>> {
        self.store.read(|state| {
            state
                .forest
                .skills(owner)
                .map(|s| (s.key(), s.clone()))
                .collect()
        })
    }

    /// One owner's skills in listing shape, keyed by skill id.
    ///
    /// An owner without skills yields an empty map, not an error.
    pub fn listing(&self, owner: &OwnerId) -> ApplicationResult<BTreeMap<String, SkillView>> {
        self.store.read(|state| {
            state
                .forest
                .skills(Some(owner))
                .map(|s| (s.id.clone(), SkillView::from(s)))
                .collect()
        })
    }

    /// Look up a single skill.
    pub fn get(&self, owner: &OwnerId, id: &str) -> ApplicationResult<Skill> {
        let key = SkillKey::new(owner, id);
        self.store
            .read(|state| state.forest.get(&key).cloned())?
            .ok_or_else(|| DomainError::NotFound(key).into())
    }

    /// Number of direct children of a skill.
    pub fn child_count(&self, owner: &OwnerId, id: &str) -> ApplicationResult<usize> {
        let key = SkillKey::new(owner, id);
        let count = self.store.read(|state| {
            state
                .forest
                .contains(&key)
                .then(|| state.forest.child_count(&key))
        })?;
        count.ok_or_else(|| DomainError::NotFound(key).into())
    }

    pub fn stats(&self, owner: &OwnerId) -> ApplicationResult<TreeStats> {
        self.store.read(|state| TreeStats {
            skills: state.forest.skills(Some(owner)).count(),
            roots: state.forest.roots(owner).len(),
            depth: state.forest.depth(owner),
            leaves: state.forest.leaf_ids(owner).len(),
        })
    }

    /// Current forest, for rendering.
    pub fn forest(&self) -> ApplicationResult<SkillForest> {
        self.store.read(|state| state.forest.clone())
    }
}
