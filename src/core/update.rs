use std::rc::Rc;
use log::{debug, info};
use crate::core::clock;
use crate::core::heuristics::find_deadlocked_box;
use crate::core::models::{Direction, Vec2};
use crate::core::scoring::calculate_score;
use crate::core::state::{EndReason, GameState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameEvent {
    /// A pushed box landed on a goal without completing the level.
    BoxPlacedOnGoal,
    Won { score: u32 },
    LostDeadlock { box_position: Vec2 },
    /// Plain move that ended neither in a win nor a loss.
    Moved,
    /// Same as `Moved`, but a box was pushed.
    Pushed,
}

#[derive(Clone, Debug)]
pub struct MoveResult {
    pub success: bool,
    pub pushed_box: bool,
    /// The input state itself when the move was rejected.
    pub new_state: Rc<GameState>,
    /// In emission order. Empty for rejected moves.
    pub events: Vec<GameEvent>,
}

impl MoveResult {
    fn rejected(state: &Rc<GameState>) -> MoveResult {
        MoveResult {
            success: false,
            pushed_box: false,
            new_state: Rc::clone(state),
            events: Vec::new(),
        }
    }

    pub fn final_score(&self) -> Option<u32> {
        self.events.iter().find_map(|e| match e {
            GameEvent::Won { score } => Some(*score),
            _ => None,
        })
    }

    /// Replays the events of this move into `sink`, in emission order.
    pub fn dispatch(&self, sink: &mut impl GameEventSink) {
        let state = self.new_state.as_ref();
        for event in &self.events {
            match *event {
                GameEvent::BoxPlacedOnGoal => sink.on_box_placed_on_goal(state),
                GameEvent::Won { score } => sink.on_win(state, score),
                GameEvent::LostDeadlock { .. } => sink.on_loss(state),
                GameEvent::Moved | GameEvent::Pushed => sink.on_move(state),
            }
        }
    }
}

/// Callback-style consumer of move events. Every slot defaults to a no-op.
pub trait GameEventSink {
    fn on_move(&mut self, _state: &GameState) {}
    fn on_win(&mut self, _state: &GameState, _score: u32) {}
    fn on_loss(&mut self, _state: &GameState) {}
    fn on_box_placed_on_goal(&mut self, _state: &GameState) {}
}

pub fn apply_move(state: &Rc<GameState>, direction: Direction) -> MoveResult {
    apply_move_at(state, direction, clock::now_ms())
}

/// Attempts to move the player one cell. `now_ms` is only used to start the clock on
/// the first accepted move and to score a win.
pub fn apply_move_at(state: &Rc<GameState>, direction: Direction, now_ms: u64) -> MoveResult {
    if state.ended {
        return MoveResult::rejected(state);
    }

    let level = &state.level;
    let delta = direction.delta();
    let target = state.player + delta;

    if !level.in_bounds(&target) || level.is_wall(&target) {
        debug!("{:?} rejected: {} is blocked", direction, target);
        return MoveResult::rejected(state);
    }

    let pushed_index = state.box_index_at(&target);
    let beyond = target + delta;
    if pushed_index.is_some()
        && (!level.in_bounds(&beyond) || level.is_wall(&beyond) || state.has_box_at(&beyond))
    {
        debug!("{:?} rejected: box at {} cannot move to {}", direction, target, beyond);
        return MoveResult::rejected(state);
    }

    let mut next = GameState {
        level: Rc::clone(level),
        player: target,
        boxes: state.boxes.clone(),
        moves: state.moves + 1,
        pushes: state.pushes,
        start_time_ms: Some(state.start_time_ms.unwrap_or(now_ms)),
        ended_at_ms: None,
        ended: false,
        end_reason: None,
        current_player: state.current_player.clone(),
    };

    let mut events = Vec::new();
    let pushed_box = pushed_index.is_some();
    if let Some(index) = pushed_index {
        next.boxes[index] = beyond;
        next.pushes += 1;
        if level.is_goal(&beyond) && !next.goals_satisfied() {
            events.push(GameEvent::BoxPlacedOnGoal);
        }
    }

    if let Some(box_position) = find_deadlocked_box(&next) {
        info!("level {}: box at {} is deadlocked", level.name(), box_position);
        next.ended = true;
        next.ended_at_ms = Some(now_ms);
        next.end_reason = Some(EndReason::Deadlocked);
        events.push(GameEvent::LostDeadlock { box_position });
    } else if next.goals_satisfied() {
        next.ended = true;
        next.ended_at_ms = Some(now_ms);
        next.end_reason = Some(EndReason::Won);
        let score = calculate_score(&next, now_ms);
        info!(
            "level {} solved in {} moves / {} pushes, score {}",
            level.name(),
            next.moves,
            next.pushes,
            score
        );
        events.push(GameEvent::Won { score });
    } else if pushed_box {
        events.push(GameEvent::Pushed);
    } else {
        events.push(GameEvent::Moved);
    }

    MoveResult {
        success: true,
        pushed_box,
        new_state: Rc::new(next),
        events,
    }
}
