//! Forest builder: rebuilds the arena from flat skill records.

use std::collections::{BTreeMap, HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::SkillForest;
use crate::domain::entities::{Skill, SkillKey};
use crate::domain::error::{DomainError, DomainResult};

/// Constructs a `SkillForest` from stored records, in any order.
///
/// Rejects snapshots that break tree invariants: duplicate keys, parents that
/// do not exist within the same owner, and parent chains that never reach a root.
#[derive(Default)]
pub struct ForestBuilder {
    records: BTreeMap<SkillKey, Skill>,
    relationship_cache: HashMap<SkillKey, Vec<SkillKey>>,
    visited: HashSet<SkillKey>,
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "debug", skip(self, records))]
    pub fn build(&mut self, records: Vec<Skill>) -> DomainResult<SkillForest> {
        self.records.clear();
        self.relationship_cache.clear();
        self.visited.clear();

        let mut order = Vec::with_capacity(records.len());
        for skill in records {
            let key = skill.key();
            if self.records.contains_key(&key) {
                return Err(DomainError::DuplicateId(key));
            }
            order.push(key.clone());
            self.records.insert(key, skill);
        }

        let mut roots = Vec::new();
        for key in &order {
            match self.records[key].parent.as_deref() {
                None => roots.push(key.clone()),
                Some(parent_id) => {
                    let parent_key = SkillKey::new(&key.owner, parent_id);
                    if !self.records.contains_key(&parent_key) {
                        return Err(DomainError::DanglingParent {
                            child: key.clone(),
                            parent: parent_id.to_string(),
                        });
                    }
                    self.relationship_cache
                        .entry(parent_key)
                        .or_default()
                        .push(key.clone());
                }
            }
        }

        let mut forest = SkillForest::new();
        for root in roots {
            self.attach_tree(&mut forest, root)?;
        }

        // Anything not reached from a root sits on a parent cycle
        if let Some(key) = order.into_iter().find(|k| !self.visited.contains(k)) {
            return Err(DomainError::CycleDetected(key));
        }

        debug!("rebuilt forest with {} skills", forest.len());
        Ok(forest)
    }

    fn attach_tree(&mut self, forest: &mut SkillForest, root: SkillKey) -> DomainResult<()> {
        let mut stack: Vec<(SkillKey, Option<Index>)> = vec![(root, None)];

        while let Some((current, parent_idx)) = stack.pop() {
            if !self.visited.insert(current.clone()) {
                return Err(DomainError::CycleDetected(current));
            }
            let skill = self.records[&current].clone();
            let current_idx = forest.insert_node(skill, parent_idx);

            if let Some(children) = self.relationship_cache.get(&current) {
                // Reverse so children are attached in record order
                for child in children.iter().rev() {
                    stack.push((child.clone(), Some(current_idx)));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Level, OwnerId, Position};

    fn record(owner: &str, id: &str, parent: Option<&str>) -> Skill {
        Skill {
            id: id.to_string(),
            name: id.to_string(),
            level: Level::ZERO,
            pos: Position::default(),
            parent: parent.map(str::to_string),
            owner: OwnerId::from(owner),
        }
    }

    #[test]
    fn given_children_before_parents_when_building_then_links_resolve() {
        let records = vec![
            record("o", "leaf", Some("mid")),
            record("o", "mid", Some("root")),
            record("o", "root", None),
        ];

        let forest = ForestBuilder::new().build(records).unwrap();

        assert_eq!(forest.len(), 3);
        assert_eq!(forest.depth(&OwnerId::from("o")), 3);
    }

    #[test]
    fn given_cycle_when_building_then_errors() {
        let records = vec![
            record("o", "root", None),
            record("o", "a", Some("b")),
            record("o", "b", Some("a")),
        ];

        let err = ForestBuilder::new().build(records).unwrap_err();

        assert!(matches!(err, DomainError::CycleDetected(_)));
    }

    #[test]
    fn given_parent_of_other_owner_when_building_then_dangling() {
        let records = vec![record("a", "root", None), record("b", "child", Some("root"))];

        let err = ForestBuilder::new().build(records).unwrap_err();

        assert!(matches!(err, DomainError::DanglingParent { .. }));
    }

    #[test]
    fn given_duplicate_record_when_building_then_errors() {
        let records = vec![record("o", "root", None), record("o", "root", None)];

        let err = ForestBuilder::new().build(records).unwrap_err();

        assert!(matches!(err, DomainError::DuplicateId(_)));
    }
}
