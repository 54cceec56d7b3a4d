use crate::core::clock;
use crate::core::state::GameState;

pub const BASE_SCORE: i64 = 1000;
pub const MOVE_PENALTY: i64 = 5;
pub const PUSH_PENALTY: i64 = 10;

/// `max(0, 1000 - 5*moves - 10*pushes - whole elapsed seconds)`, with elapsed time
/// measured from the first accepted move to `now_ms`.
///
/// Safe to call on a state still in play; nothing is mutated.
pub fn calculate_score(state: &GameState, now_ms: u64) -> u32 {
    let elapsed_seconds = (state.elapsed_ms(now_ms) / 1000) as i64;
    let score = BASE_SCORE
        - state.moves as i64 * MOVE_PENALTY
        - state.pushes as i64 * PUSH_PENALTY
        - elapsed_seconds;
    score.max(0) as u32
}

pub fn calculate_score_now(state: &GameState) -> u32 {
    calculate_score(state, clock::now_ms())
}
