//! Tests for the layout engine

use rstest::rstest;

use skilltree::domain::layout::{HORIZONTAL_STEP, VERTICAL_STEP};
use skilltree::domain::{compute_position, Position};

/// Expected x offset in steps: ceil(n/2), positive for odd n, negative for even n > 0.
fn expected_offset(n: usize) -> i64 {
    let magnitude = n.div_ceil(2) as i64;
    match n {
        0 => 0,
        n if n % 2 == 1 => magnitude,
        _ => -magnitude,
    }
}

#[rstest]
fn given_any_sibling_count_when_placing_then_offset_follows_fan_pattern(
    #[values(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 31, 32, 100)] n: usize,
    #[values(Position::new(0, 0), Position::new(400, 50), Position::new(-250, -900))]
    parent: Position,
) {
    let pos = compute_position(parent, n);

    assert_eq!(pos.x - parent.x, expected_offset(n) * HORIZONTAL_STEP);
    assert_eq!(pos.y - parent.y, VERTICAL_STEP);
}

#[test]
fn given_parent_at_400_50_when_adding_four_children_then_matches_scenario() {
    let parent = Position::new(400, 50);

    let placed: Vec<Position> = (0..4).map(|n| compute_position(parent, n)).collect();

    assert_eq!(
        placed,
        vec![
            Position::new(400, 170),
            Position::new(540, 170),
            Position::new(260, 170),
            Position::new(680, 170),
        ]
    );
}

#[test]
fn given_grandchild_when_placed_then_descends_one_more_row() {
    let root = Position::new(400, 50);
    let child = compute_position(root, 2);
    let grandchild = compute_position(child, 0);

    assert_eq!(grandchild, Position::new(260, 290));
}
