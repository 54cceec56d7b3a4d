use crate::core::level::Level;
use crate::core::models::{Direction, Vec2};
use crate::core::state::GameState;

/// A box is deadlocked if three of its four neighbours are walls, or if it has a wall
/// on one vertical side and one horizontal side. Goal status is not considered here.
///
/// This is a purely local test. Freeze deadlocks involving several boxes are not
/// detected.
pub fn is_box_deadlocked(level: &Level, pos: Vec2) -> bool {
    let wall = |dir: Direction| level.is_wall(&(pos + dir.delta()));
    let wall_up = wall(Direction::Up);
    let wall_down = wall(Direction::Down);
    let wall_left = wall(Direction::Left);
    let wall_right = wall(Direction::Right);

    let walls_count = [wall_up, wall_down, wall_left, wall_right]
        .iter()
        .filter(|&&w| w)
        .count();
    let corner = (wall_up || wall_down) && (wall_left || wall_right);

    walls_count >= 3 || corner
}

/// First box, in box order, that is off-goal and deadlocked.
pub fn find_deadlocked_box(state: &GameState) -> Option<Vec2> {
    state
        .boxes
        .iter()
        .copied()
        .find(|b| !state.level.is_goal(b) && is_box_deadlocked(&state.level, *b))
}
