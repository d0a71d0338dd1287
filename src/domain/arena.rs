//! Arena-based skill forest.
//!
//! All owners' trees live in one generational arena. Nodes hold explicit parent
//! and child indices; the `(owner, id)` index maps stable identifiers onto arena
//! slots. Every mutating method validates first and mutates second, so a failed
//! call leaves the forest untouched.

use std::collections::BTreeMap;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, warn};

use crate::domain::entities::{DeletedSummary, Level, OwnerId, Skill, SkillKey};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::layout::{compute_position, ORPHAN_ANCHOR, ROOT_ANCHOR};

/// Id given to the root that is provisioned for every owner.
pub const ROOT_ID: &str = "root";

/// Tree node in the arena.
#[derive(Debug, Clone)]
pub struct SkillNode {
    pub skill: Skill,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in insertion order
    pub children: Vec<Index>,
}

/// Request to add a skill below an (optional) parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSkill {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
    pub owner: OwnerId,
}

enum ParentLookup {
    Found(Index),
    Missing,
    ForeignOwner,
}

/// Collection of all skill trees, keyed by owner.
#[derive(Debug, Clone, Default)]
pub struct SkillForest {
    arena: Arena<SkillNode>,
    index: BTreeMap<SkillKey, Index>,
}

impl SkillForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &SkillKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn lookup(&self, key: &SkillKey) -> Option<Index> {
        self.index.get(key).copied()
    }

    pub fn get_node(&self, idx: Index) -> Option<&SkillNode> {
        self.arena.get(idx)
    }

    pub fn get(&self, key: &SkillKey) -> Option<&Skill> {
        self.lookup(key)
            .and_then(|idx| self.arena.get(idx))
            .map(|node| &node.skill)
    }

    /// Number of direct children, 0 for unknown keys.
    pub fn child_count(&self, key: &SkillKey) -> usize {
        self.lookup(key)
            .and_then(|idx| self.arena.get(idx))
            .map_or(0, |node| node.children.len())
    }

    /// Skills in key order, optionally restricted to one owner.
    pub fn skills<'a>(&'a self, owner: Option<&'a OwnerId>) -> impl Iterator<Item = &'a Skill> + 'a {
        self.index
            .iter()
            .filter(move |(key, _)| owner.map_or(true, |o| &key.owner == o))
            .filter_map(|(_, &idx)| self.arena.get(idx))
            .map(|node| &node.skill)
    }

    /// Root nodes of one owner, in key order.
    pub fn roots(&self, owner: &OwnerId) -> Vec<Index> {
        self.index
            .iter()
            .filter(|(key, _)| &key.owner == owner)
            .filter(|&(_, &idx)| self.arena.get(idx).is_some_and(|n| n.parent.is_none()))
            .map(|(_, &idx)| idx)
            .collect()
    }

    pub fn owners(&self) -> Vec<OwnerId> {
        let mut owners: Vec<OwnerId> = self.index.keys().map(|k| k.owner.clone()).collect();
        owners.dedup();
        owners
    }

    /// Low-level insert used when rebuilding from storage.
    ///
    /// The caller guarantees that the key is new and that `parent` is a live
    /// node of the same owner.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, skill: Skill, parent: Option<Index>) -> Index {
        let key = skill.key();
        let node_idx = self.arena.insert(SkillNode {
            skill,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent.and_then(|p| self.arena.get_mut(p)) {
            parent.children.push(node_idx);
        }
        self.index.insert(key, node_idx);
        node_idx
    }

    /// Add a new skill, placing it with the layout engine.
    ///
    /// An unresolvable parent (absent, or only known under another owner) does
    /// not fail the request: the skill becomes a root at `ORPHAN_ANCHOR`.
    #[instrument(level = "debug", skip(self), fields(owner = %new.owner, id = %new.id))]
    pub fn add_skill(&mut self, new: NewSkill) -> DomainResult<&Skill> {
        if new.id.trim().is_empty() {
            return Err(DomainError::InvalidId(new.id));
        }
        let key = SkillKey::new(&new.owner, new.id.clone());
        if self.contains(&key) {
            return Err(DomainError::DuplicateId(key));
        }

        let (parent_idx, pos) = match new.parent.as_deref() {
            None => (None, ORPHAN_ANCHOR),
            Some(parent_id) => match self.lookup_parent(&new.owner, parent_id) {
                ParentLookup::Found(idx) => {
                    let parent = &self.arena[idx];
                    let siblings = parent.children.len();
                    debug!("placing {} as child #{} of {}", key, siblings, parent_id);
                    (Some(idx), compute_position(parent.skill.pos, siblings))
                }
                ParentLookup::ForeignOwner => {
                    let err = DomainError::InvalidParent {
                        child: key.clone(),
                        parent: parent_id.to_string(),
                    };
                    warn!("{}; placing as root", err);
                    (None, ORPHAN_ANCHOR)
                }
                ParentLookup::Missing => {
                    warn!("parent {} of {} not found; placing as root", parent_id, key);
                    (None, ORPHAN_ANCHOR)
                }
            },
        };

        let skill = Skill {
            id: new.id,
            name: new.name,
            level: Level::ZERO,
            pos,
            parent: parent_idx.map(|idx| self.arena[idx].skill.id.clone()),
            owner: new.owner,
        };
        let idx = self.insert_node(skill, parent_idx);
        Ok(&self.arena[idx].skill)
    }

    fn lookup_parent(&self, owner: &OwnerId, parent_id: &str) -> ParentLookup {
        if let Some(idx) = self.lookup(&SkillKey::new(owner, parent_id)) {
            return ParentLookup::Found(idx);
        }
        if self.index.keys().any(|k| k.id == parent_id) {
            ParentLookup::ForeignOwner
        } else {
            ParentLookup::Missing
        }
    }

    /// Provision the owner's root unless the owner already has one.
    ///
    /// Returns the created root, or None when nothing had to be done.
    #[instrument(level = "debug", skip(self))]
    pub fn ensure_root(&mut self, owner: &OwnerId, name: &str) -> Option<&Skill> {
        if !self.roots(owner).is_empty() {
            return None;
        }
        let root_key = SkillKey::new(owner, ROOT_ID);
        if self.contains(&root_key) {
            // "root" exists but is attached below something else; keep it
            return None;
        }
        let idx = self.insert_node(
            Skill {
                id: ROOT_ID.to_string(),
                name: name.to_string(),
                level: Level::MAX,
                pos: ROOT_ANCHOR,
                parent: None,
                owner: owner.clone(),
            },
            None,
        );
        debug!("provisioned root for owner {}", owner);
        Some(&self.arena[idx].skill)
    }

    /// Delete a skill together with its entire subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, key: &SkillKey) -> DomainResult<DeletedSummary> {
        let idx = self
            .lookup(key)
            .ok_or_else(|| DomainError::NotFound(key.clone()))?;
        let parent_idx = self.arena[idx]
            .parent
            .ok_or_else(|| DomainError::ProtectedRoot(key.clone()))?;

        let doomed: Vec<Index> = self.iter_postorder(idx).map(|(i, _)| i).collect();

        if let Some(parent) = self.arena.get_mut(parent_idx) {
            parent.children.retain(|&c| c != idx);
        }
        let mut removed = Vec::with_capacity(doomed.len());
        for i in doomed {
            if let Some(node) = self.arena.remove(i) {
                self.index.remove(&node.skill.key());
                removed.push(node.skill.id);
            }
        }
        debug!("removed {} skills under {}", removed.len(), key);

        Ok(DeletedSummary {
            owner: key.owner.clone(),
            removed,
        })
    }

    /// Raise a skill's level by one training increment.
    #[instrument(level = "debug", skip(self))]
    pub fn train(&mut self, key: &SkillKey) -> DomainResult<&Skill> {
        let idx = self
            .lookup(key)
            .ok_or_else(|| DomainError::NotFound(key.clone()))?;
        let node = &mut self.arena[idx];
        node.skill.level = node.skill.level.trained();
        Ok(&node.skill)
    }

    /// Pre-order traversal of the subtree rooted at `start`.
    pub fn iter_subtree(&self, start: Index) -> SubtreeIterator<'_> {
        SubtreeIterator::new(self, start)
    }

    /// Post-order traversal (children before parents) rooted at `start`.
    pub fn iter_postorder(&self, start: Index) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, start)
    }

    /// Depth of the deepest tree of an owner (a lone root has depth 1).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, owner: &OwnerId) -> usize {
        self.roots(owner)
            .into_iter()
            .map(|root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        self.get_node(node_idx).map_or(0, |node| {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        })
    }

    /// Ids of an owner's skills that have no children.
    pub fn leaf_ids(&self, owner: &OwnerId) -> Vec<String> {
        self.roots(owner)
            .into_iter()
            .flat_map(|root| self.iter_subtree(root))
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.skill.id.clone())
            .collect()
    }

    /// Flatten into records, parents always before their children.
    pub fn to_records(&self) -> Vec<Skill> {
        let mut records = Vec::with_capacity(self.len());
        for owner in self.owners() {
            for root in self.roots(&owner) {
                records.extend(self.iter_subtree(root).map(|(_, node)| node.skill.clone()));
            }
        }
        records
    }
}

pub struct SubtreeIterator<'a> {
    forest: &'a SkillForest,
    stack: Vec<Index>,
}

impl<'a> SubtreeIterator<'a> {
    fn new(forest: &'a SkillForest, start: Index) -> Self {
        Self {
            forest,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for SubtreeIterator<'a> {
    type Item = (Index, &'a SkillNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    forest: &'a SkillForest,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a SkillForest, start: Index) -> Self {
        Self {
            forest,
            stack: vec![(start, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a SkillNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Position;

    fn owner() -> OwnerId {
        OwnerId::from("alice")
    }

    fn new_skill(id: &str, parent: Option<&str>) -> NewSkill {
        NewSkill {
            id: id.to_string(),
            name: id.to_uppercase(),
            parent: parent.map(str::to_string),
            owner: owner(),
        }
    }

    fn forest_with_root() -> SkillForest {
        let mut forest = SkillForest::new();
        forest.ensure_root(&owner(), "Core");
        forest
    }

    #[test]
    fn given_children_added_when_placed_then_fan_out_below_root() {
        let mut forest = forest_with_root();
        let positions: Vec<Position> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| forest.add_skill(new_skill(id, Some(ROOT_ID))).unwrap().pos)
            .collect();

        assert_eq!(
            positions,
            vec![
                Position::new(400, 170),
                Position::new(540, 170),
                Position::new(260, 170),
                Position::new(680, 170),
            ]
        );
        assert_eq!(forest.child_count(&SkillKey::new(&owner(), ROOT_ID)), 4);
    }

    #[test]
    fn given_nested_subtree_when_removed_then_all_descendants_gone() {
        let mut forest = forest_with_root();
        forest.add_skill(new_skill("a", Some(ROOT_ID))).unwrap();
        forest.add_skill(new_skill("a1", Some("a"))).unwrap();
        forest.add_skill(new_skill("a1x", Some("a1"))).unwrap();
        forest.add_skill(new_skill("b", Some(ROOT_ID))).unwrap();

        let summary = forest.remove_subtree(&SkillKey::new(&owner(), "a")).unwrap();

        assert_eq!(summary.removed, vec!["a1x", "a1", "a"]);
        assert_eq!(forest.len(), 2);
        assert!(forest
            .skills(None)
            .all(|s| s.parent.as_deref() != Some("a")));
        assert_eq!(forest.child_count(&SkillKey::new(&owner(), ROOT_ID)), 1);
    }

    #[test]
    fn given_root_when_removed_then_protected_and_unchanged() {
        let mut forest = forest_with_root();
        forest.add_skill(new_skill("a", Some(ROOT_ID))).unwrap();

        let err = forest
            .remove_subtree(&SkillKey::new(&owner(), ROOT_ID))
            .unwrap_err();

        assert!(matches!(err, DomainError::ProtectedRoot(_)));
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn given_removed_child_when_sibling_added_then_slot_reused_by_count() {
        let mut forest = forest_with_root();
        forest.add_skill(new_skill("a", Some(ROOT_ID))).unwrap();
        forest.add_skill(new_skill("b", Some(ROOT_ID))).unwrap();
        forest.remove_subtree(&SkillKey::new(&owner(), "b")).unwrap();

        let c = forest.add_skill(new_skill("c", Some(ROOT_ID))).unwrap();

        assert_eq!(c.pos, Position::new(540, 170));
    }

    #[test]
    fn given_tree_when_flattened_then_parents_precede_children() {
        let mut forest = forest_with_root();
        forest.add_skill(new_skill("a", Some(ROOT_ID))).unwrap();
        forest.add_skill(new_skill("a1", Some("a"))).unwrap();

        let ids: Vec<String> = forest.to_records().into_iter().map(|s| s.id).collect();

        assert_eq!(ids, vec!["root", "a", "a1"]);
        assert_eq!(forest.depth(&owner()), 3);
        assert_eq!(forest.leaf_ids(&owner()), vec!["a1"]);
    }
}
