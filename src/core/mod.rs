mod bounded_grid;
mod bounds;
pub mod clock;
mod heuristics;
mod level;
mod models;
mod scoring;
mod state;
mod update;

pub use bounded_grid::BoundedGrid;
pub use bounds::BoundsOriginRoot;
pub use heuristics::{find_deadlocked_box, is_box_deadlocked};
pub use level::{Level, LevelError};
pub use models::{Direction, Tile, UserAction, Vec2};
pub use scoring::{calculate_score, calculate_score_now, BASE_SCORE, MOVE_PENALTY, PUSH_PENALTY};
pub use state::{create_initial_state, EndReason, GameState};
pub use update::{apply_move, apply_move_at, GameEvent, GameEventSink, MoveResult};
