use Direction::*;
use crate::core::*;
use crate::test::test_util::{assert_events, GameTestState};

#[derive(Default)]
struct RecordingSink {
    calls: Vec<String>,
}

impl GameEventSink for RecordingSink {
    fn on_move(&mut self, state: &GameState) {
        self.calls.push(format!("move {}", state.moves));
    }

    fn on_win(&mut self, _state: &GameState, score: u32) {
        self.calls.push(format!("win {}", score));
    }

    fn on_loss(&mut self, _state: &GameState) {
        self.calls.push("loss".to_string());
    }

    fn on_box_placed_on_goal(&mut self, state: &GameState) {
        self.calls.push(format!("box on goal {}", state.boxes_on_goals()));
    }
}

#[test]
fn plain_move_emits_moved() {
    let mut game = GameTestState::new(r#"
#P  BG#
"#);
    let result = game.assert_move(Right);
    assert_events(&result, &[GameEvent::Moved]);
}

#[test]
fn push_emits_pushed() {
    let mut game = GameTestState::new(r#"
#PB  G#
"#);
    let result = game.assert_move(Right);
    assert_events(&result, &[GameEvent::Pushed]);
}

#[test]
fn rejected_move_emits_nothing() {
    let mut game = GameTestState::new(r#"
#PB#G
"#);
    let result = game.try_move(Right);
    assert!(result.events.is_empty());

    let mut sink = RecordingSink::default();
    result.dispatch(&mut sink);
    assert!(sink.calls.is_empty());
}

#[test]
fn partial_goal_emits_box_on_goal_then_pushed() {
    let mut game = GameTestState::new(r#"
#PBG G#
"#);
    let result = game.assert_move(Right);

    assert_events(&result, &[GameEvent::BoxPlacedOnGoal, GameEvent::Pushed]);
    game.assert_matches(r#"
# P* G#
"#);
}

#[test]
fn completing_push_emits_only_win() {
    let mut game = GameTestState::new(r#"
########
#  G   #
#  B   #
#  P   #
########
"#);
    game.now_ms = 42_000;
    let result = game.assert_move(Up);

    assert_events(&result, &[GameEvent::Won { score: 985 }]);
    assert_eq!(result.final_score(), Some(985));
}

#[test]
fn box_on_goal_can_precede_loss() {
    let mut game = GameTestState::new(r#"
######
#B  G#
#    #
# PBG#
######
"#);
    let result = game.assert_move(Right);

    assert_events(&result, &[
        GameEvent::BoxPlacedOnGoal,
        GameEvent::LostDeadlock { box_position: Vec2::new(1, 1) },
    ]);
}

#[test]
fn dispatch_replays_callbacks_in_order() {
    let mut game = GameTestState::new(r#"
#######
#     #
#PBG  #
#   BG#
#######
"#);
    let mut sink = RecordingSink::default();

    game.assert_move(Right).dispatch(&mut sink);
    game.assert_move(Down).dispatch(&mut sink);
    game.assert_move(Right).dispatch(&mut sink);
    game.assert_move(Right).dispatch(&mut sink);

    assert_eq!(sink.calls, vec![
        "box on goal 1".to_string(),
        "move 1".to_string(),
        "move 2".to_string(),
        "move 3".to_string(),
        "win 960".to_string(),
    ]);
}

#[test]
fn dispatch_reports_loss_without_move_or_win() {
    let mut game = GameTestState::new(r#"
######
#B   #
#    #
# PBG#
######
"#);
    let mut sink = RecordingSink::default();
    game.assert_move(Right).dispatch(&mut sink);

    assert_eq!(sink.calls, vec!["loss".to_string()]);
}
