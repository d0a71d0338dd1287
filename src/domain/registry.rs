//! Owner registry: maps external user identities onto internal owner ids.

use std::collections::BTreeMap;

use crate::domain::entities::{Owner, OwnerId};

/// Known owners, keyed by their external identity.
#[derive(Debug, Clone, Default)]
pub struct OwnerRegistry {
    by_external: BTreeMap<i64, Owner>,
}

impl OwnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_owners(owners: Vec<Owner>) -> Self {
        Self {
            by_external: owners.into_iter().map(|o| (o.external_id, o)).collect(),
        }
    }

    pub fn find(&self, external_id: i64) -> Option<&Owner> {
        self.by_external.get(&external_id)
    }

    /// Resolve an external identity, registering it on first contact.
    ///
    /// Returns the owner and whether it was newly created. A differing
    /// non-empty username replaces the stored one.
    pub fn resolve(&mut self, external_id: i64, username: Option<&str>) -> (Owner, bool) {
        let next_id = self.next_owner_id();
        let mut created = false;
        let owner = self.by_external.entry(external_id).or_insert_with(|| {
            created = true;
            Owner {
                id: next_id,
                external_id,
                username: None,
            }
        });
        if let Some(name) = username.filter(|n| !n.is_empty()) {
            if owner.username.as_deref() != Some(name) {
                owner.username = Some(name.to_string());
            }
        }
        (owner.clone(), created)
    }

    pub fn owners(&self) -> impl Iterator<Item = &Owner> {
        self.by_external.values()
    }

    /// Sequential ids, one past the highest numeric id in use.
    fn next_owner_id(&self) -> OwnerId {
        let max = self
            .by_external
            .values()
            .filter_map(|o| o.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        OwnerId::new((max + 1).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_new_identity_when_resolved_then_gets_next_sequential_id() {
        let mut registry = OwnerRegistry::new();

        let (first, created_first) = registry.resolve(123456, Some("LocalUser"));
        let (second, created_second) = registry.resolve(777, None);

        assert!(created_first && created_second);
        assert_eq!(first.id.as_str(), "1");
        assert_eq!(second.id.as_str(), "2");
        assert_eq!(first.username.as_deref(), Some("LocalUser"));
    }

    #[test]
    fn given_known_identity_when_resolved_then_same_owner_and_username_updated() {
        let mut registry = OwnerRegistry::new();
        let (first, _) = registry.resolve(42, Some("old"));

        let (again, created) = registry.resolve(42, Some("new"));

        assert!(!created);
        assert_eq!(again.id, first.id);
        assert_eq!(again.username.as_deref(), Some("new"));
    }
}
