use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{OwnerId, SkillForest, SkillNode};

/// Render skill trees as `termtree` trees for terminal display.
pub trait TreeNodeConvert {
    /// One tree per root of the owner.
    fn to_tree_strings(&self, owner: &OwnerId) -> Vec<Tree<String>>;
}

fn label(node: &SkillNode) -> String {
    format!(
        "{} [{}] lvl {} @ {}",
        node.skill.name, node.skill.id, node.skill.level, node.skill.pos
    )
}

impl TreeNodeConvert for SkillForest {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_strings(&self, owner: &OwnerId) -> Vec<Tree<String>> {
        fn build_tree(forest: &SkillForest, node_idx: Index) -> Option<Tree<String>> {
            let node = forest.get_node(node_idx)?;
            let leaves: Vec<_> = node
                .children
                .iter()
                .filter_map(|&child| build_tree(forest, child))
                .collect();
            Some(Tree::new(label(node)).with_leaves(leaves))
        }

        self.roots(owner)
            .into_iter()
            .filter_map(|root| build_tree(self, root))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewSkill, ROOT_ID};

    #[test]
    fn given_owner_tree_when_rendered_then_children_nested_under_root() {
        let owner = OwnerId::from("local");
        let mut forest = SkillForest::new();
        forest.ensure_root(&owner, "Core");
        forest
            .add_skill(NewSkill {
                id: "py".into(),
                name: "Python".into(),
                parent: Some(ROOT_ID.into()),
                owner: owner.clone(),
            })
            .unwrap();

        let trees = forest.to_tree_strings(&owner);

        assert_eq!(trees.len(), 1);
        let rendered = trees[0].to_string();
        assert!(rendered.starts_with("Core [root] lvl 100 @ (400, 50)"));
        assert!(rendered.contains("Python [py] lvl 0 @ (400, 170)"));
    }

    #[test]
    fn given_unknown_owner_when_rendered_then_empty() {
        let forest = SkillForest::new();
        assert!(forest.to_tree_strings(&OwnerId::from("nobody")).is_empty());
    }
}
