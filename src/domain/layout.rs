//! Layout engine: deterministic placement of new child nodes.
//!
//! Children fan out beneath their parent, alternating right and left with
//! increasing spread: offsets 0, +1, -1, +2, -2, ... in horizontal steps.

use crate::domain::entities::Position;

/// Vertical distance between a parent and its children.
pub const VERTICAL_STEP: i64 = 120;

/// Horizontal distance between neighbouring sibling slots.
pub const HORIZONTAL_STEP: i64 = 140;

/// Where owner roots are provisioned.
pub const ROOT_ANCHOR: Position = Position::new(400, 50);

/// Where a node lands when its parent reference cannot be resolved.
pub const ORPHAN_ANCHOR: Position = Position::new(400, 150);

/// Position of a new child given its parent's position and the number of
/// children the parent already has.
///
/// Coordinates saturate at the `i64` bounds instead of overflowing.
pub fn compute_position(parent: Position, sibling_count: usize) -> Position {
    Position {
        x: parent
            .x
            .saturating_add(slot_offset(sibling_count).saturating_mul(HORIZONTAL_STEP)),
        y: parent.y.saturating_add(VERTICAL_STEP),
    }
}

/// Signed slot index (in horizontal steps) for the n-th child.
fn slot_offset(sibling_count: usize) -> i64 {
    if sibling_count == 0 {
        return 0;
    }
    let multiplier = i64::try_from(sibling_count / 2 + sibling_count % 2).unwrap_or(i64::MAX);
    let direction = if sibling_count % 2 == 1 { 1 } else { -1 };
    direction * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, -1)]
    #[case(3, 2)]
    #[case(4, -2)]
    #[case(5, 3)]
    #[case(10, -5)]
    fn given_sibling_count_when_slotting_then_alternates_sides(
        #[case] siblings: usize,
        #[case] expected: i64,
    ) {
        assert_eq!(slot_offset(siblings), expected);
    }

    #[test]
    fn given_first_child_when_placed_then_directly_below_parent() {
        let pos = compute_position(Position::new(400, 50), 0);
        assert_eq!(pos, Position::new(400, 170));
    }

    #[test]
    fn given_siblings_when_placed_then_no_two_share_a_slot() {
        let parent = Position::new(-30, 7);
        let placed: Vec<Position> = (0..25).map(|n| compute_position(parent, n)).collect();

        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(placed.iter().all(|p| p.y == parent.y + VERTICAL_STEP));
    }

    #[rstest]
    #[case(Position::new(i64::MAX, i64::MAX), 1, Position::new(i64::MAX, i64::MAX))]
    #[case(Position::new(i64::MIN, 0), 2, Position::new(i64::MIN, 120))]
    #[case(Position::new(0, 0), usize::MAX, Position::new(i64::MAX, 120))]
    fn given_extreme_parent_when_placed_then_saturates_instead_of_overflowing(
        #[case] parent: Position,
        #[case] siblings: usize,
        #[case] expected: Position,
    ) {
        assert_eq!(compute_position(parent, siblings), expected);
    }

    #[test]
    fn given_same_inputs_when_computed_twice_then_identical() {
        let parent = Position::new(123, -456);
        assert_eq!(compute_position(parent, 7), compute_position(parent, 7));
    }
}
