use std::rc::Rc;
use crate::core::level::Level;
use crate::core::models::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndReason {
    Won,
    Deadlocked,
}

/// One turn's snapshot of a level in play.
///
/// Snapshots are never mutated once handed out: the transition engine builds a fresh
/// one for every accepted move and returns the input untouched for rejected ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub level: Rc<Level>,
    pub player: Vec2,
    /// One entry per box of the level, index-stable across moves.
    pub boxes: Vec<Vec2>,
    pub moves: u32,
    pub pushes: u32,
    /// Set by the first accepted move.
    pub start_time_ms: Option<u64>,
    /// Set by the move that ends the level. Elapsed time stops here.
    pub ended_at_ms: Option<u64>,
    pub ended: bool,
    /// Why `ended` was set. `None` while the level is in play.
    pub end_reason: Option<EndReason>,
    pub current_player: Option<String>,
}

pub fn create_initial_state(level: &Rc<Level>) -> GameState {
    GameState {
        level: Rc::clone(level),
        player: level.player_start(),
        boxes: level.boxes().to_vec(),
        moves: 0,
        pushes: 0,
        start_time_ms: None,
        ended_at_ms: None,
        ended: false,
        end_reason: None,
        current_player: None,
    }
}

impl GameState {
    pub fn with_player(mut self, player: Option<String>) -> GameState {
        self.current_player = player;
        self
    }

    pub fn box_index_at(&self, pos: &Vec2) -> Option<usize> {
        self.boxes.iter().position(|b| b == pos)
    }

    pub fn has_box_at(&self, pos: &Vec2) -> bool {
        self.boxes.contains(pos)
    }

    pub fn goals_satisfied(&self) -> bool {
        self.level.goals().iter().all(|goal| self.has_box_at(goal))
    }

    pub fn boxes_on_goals(&self) -> usize {
        self.boxes.iter().filter(|b| self.level.is_goal(b)).count()
    }

    pub fn is_won(&self) -> bool {
        self.end_reason == Some(EndReason::Won)
    }

    pub fn is_lost(&self) -> bool {
        self.end_reason == Some(EndReason::Deadlocked)
    }

    /// Zero until the clock has started. Frozen once the level has ended.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let end = self.ended_at_ms.unwrap_or(now_ms);
        match self.start_time_ms {
            Some(start) => end.saturating_sub(start),
            None => 0,
        }
    }
}
