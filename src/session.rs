use std::path::PathBuf;
use std::rc::Rc;
use log::info;
use crate::core::{
    apply_move_at, calculate_score, clock, create_initial_state, Direction, GameEvent, GameState,
    LevelError, MoveResult,
};
use crate::levels::load_level;
use crate::scores::{BestScore, LeaderboardEntry, ScoreBoard, ScorePersistence};

const LEADERBOARD_SIZE: usize = 5;

/// Record comparison for a finished level, taken before the score is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinSummary {
    pub level_name: String,
    pub score: u32,
    pub player: Option<String>,
    pub previous_personal_best: u32,
    pub previous_global_best: Option<BestScore>,
}

impl WinSummary {
    pub fn is_personal_record(&self) -> bool {
        self.player.is_some() && self.score > self.previous_personal_best
    }

    /// A zero score never holds a level record.
    pub fn is_global_record(&self) -> bool {
        self.player.is_some()
            && self.score > 0
            && self
                .previous_global_best
                .as_ref()
                .is_none_or(|best| self.score > best.score)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudInfo {
    pub level_name: String,
    pub moves: u32,
    pub pushes: u32,
    pub elapsed_ms: u64,
    pub score: u32,
    pub player: Option<String>,
    pub personal_best: u32,
    pub global_best: Option<BestScore>,
    /// Best few scores on this level, highest first.
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Holds the state in play and wires engine outcomes to the leaderboard.
pub struct GameSession<P: ScorePersistence> {
    level_ids: Vec<String>,
    levels_dir: PathBuf,
    current_index: usize,
    state: Rc<GameState>,
    scores: ScoreBoard<P>,
    last_win: Option<WinSummary>,
}

impl<P: ScorePersistence> GameSession<P> {
    pub fn new(
        level_ids: Vec<String>,
        levels_dir: impl Into<PathBuf>,
        start_index: usize,
        scores: ScoreBoard<P>,
    ) -> Result<Self, LevelError> {
        if level_ids.is_empty() {
            return Err(LevelError::NoLevels);
        }
        let levels_dir = levels_dir.into();
        let current_index = start_index.min(level_ids.len() - 1);
        let level = Rc::new(load_level(&level_ids[current_index], &levels_dir)?);
        let player = scores.current_player().map(String::from);
        let state = create_initial_state(&level).with_player(player);

        Ok(GameSession {
            level_ids,
            levels_dir,
            current_index,
            state: Rc::new(state),
            scores,
            last_win: None,
        })
    }

    pub fn state(&self) -> &Rc<GameState> {
        &self.state
    }

    pub fn scores(&self) -> &ScoreBoard<P> {
        &self.scores
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn last_win(&self) -> Option<&WinSummary> {
        self.last_win.as_ref()
    }

    /// Clamps `index` into the level list and starts that level from scratch.
    pub fn start_level(&mut self, index: usize) -> Result<(), LevelError> {
        let index = index.min(self.level_ids.len().saturating_sub(1));
        let id = &self.level_ids[index];
        let level = Rc::new(load_level(id, &self.levels_dir)?);
        info!("starting level {} ({} boxes, {} goals)", id, level.boxes().len(), level.goals().len());

        let player = self.scores.current_player().map(String::from);
        self.state = Rc::new(create_initial_state(&level).with_player(player));
        self.current_index = index;
        self.last_win = None;
        Ok(())
    }

    pub fn restart_level(&mut self) -> Result<(), LevelError> {
        self.start_level(self.current_index)
    }

    pub fn next_level(&mut self) -> Result<(), LevelError> {
        self.start_level(self.current_index + 1)
    }

    pub fn previous_level(&mut self) -> Result<(), LevelError> {
        self.start_level(self.current_index.saturating_sub(1))
    }

    /// After a win moves on to the next level, after a loss replays the current one.
    /// Does nothing while the level is still in play.
    pub fn advance_after_end(&mut self) -> Result<(), LevelError> {
        if self.state.is_won() {
            self.next_level()
        } else if self.state.is_lost() {
            self.restart_level()
        } else {
            Ok(())
        }
    }

    /// Switches the player scores are attributed to and restarts the level under the
    /// new name. Returns false, leaving everything as is, if the trimmed name is empty.
    pub fn change_player(&mut self, pseudo: &str) -> Result<bool, LevelError> {
        if !self.scores.set_current_player(pseudo) {
            return Ok(false);
        }
        info!("switched player to {}", pseudo.trim());
        self.restart_level()?;
        Ok(true)
    }

    pub fn handle_move(&mut self, direction: Direction) -> MoveResult {
        self.handle_move_at(direction, clock::now_ms())
    }

    pub fn handle_move_at(&mut self, direction: Direction, now_ms: u64) -> MoveResult {
        let result = apply_move_at(&self.state, direction, now_ms);
        if !result.success {
            return result;
        }
        self.state = Rc::clone(&result.new_state);

        for event in &result.events {
            if let GameEvent::Won { score } = *event {
                self.record_win(score);
            }
        }
        result
    }

    fn record_win(&mut self, score: u32) {
        let level_name = self.state.level.name().to_string();
        let summary = WinSummary {
            level_name: level_name.clone(),
            score,
            player: self.state.current_player.clone(),
            previous_personal_best: self.scores.player_best_score(&level_name),
            previous_global_best: self.scores.global_best_score(&level_name),
        };
        if summary.player.is_some() && self.scores.record_score(&level_name, score) {
            info!("new personal record on {}: {}", level_name, score);
        }
        self.last_win = Some(summary);
    }

    pub fn hud(&self) -> HudInfo {
        self.hud_at(clock::now_ms())
    }

    pub fn hud_at(&self, now_ms: u64) -> HudInfo {
        let level_name = self.state.level.name().to_string();
        HudInfo {
            moves: self.state.moves,
            pushes: self.state.pushes,
            elapsed_ms: self.state.elapsed_ms(now_ms),
            score: calculate_score(&self.state, now_ms),
            player: self.scores.current_player().map(String::from),
            personal_best: self.scores.player_best_score(&level_name),
            global_best: self.scores.global_best_score(&level_name),
            leaderboard: self
                .scores
                .level_leaderboard(&level_name)
                .into_iter()
                .take(LEADERBOARD_SIZE)
                .collect(),
            level_name,
        }
    }
}
