use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use log::warn;
use serde::{Deserialize, Serialize};

/// player -> level name -> best score
pub type PlayerScores = BTreeMap<String, BTreeMap<String, u32>>;

const SCORES_FILE: &str = "scores.json";
const PLAYER_FILE: &str = "current_player.txt";

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("score storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("score file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    pub score: u32,
    pub player: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player: String,
    pub score: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelStanding {
    pub level: String,
    pub best: Option<BestScore>,
    pub entries: Vec<LeaderboardEntry>,
}

/// Storage behind the leaderboard. The game never touches storage directly.
pub trait ScorePersistence {
    fn load_scores(&self) -> Result<PlayerScores, ScoreError>;
    fn save_scores(&mut self, scores: &PlayerScores) -> Result<(), ScoreError>;
    fn load_current_player(&self) -> Result<Option<String>, ScoreError>;
    fn save_current_player(&mut self, player: &str) -> Result<(), ScoreError>;
}

/// Keeps `scores.json` and `current_player.txt` in one directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    fn read_optional(&self, file: &str) -> Result<Option<String>, ScoreError> {
        match std::fs::read_to_string(self.dir.join(file)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, file: &str, contents: &str) -> Result<(), ScoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(file), contents)?;
        Ok(())
    }
}

impl ScorePersistence for JsonFileStore {
    fn load_scores(&self) -> Result<PlayerScores, ScoreError> {
        match self.read_optional(SCORES_FILE)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(PlayerScores::new()),
        }
    }

    fn save_scores(&mut self, scores: &PlayerScores) -> Result<(), ScoreError> {
        let json = serde_json::to_string_pretty(scores)?;
        self.write(SCORES_FILE, &json)
    }

    fn load_current_player(&self) -> Result<Option<String>, ScoreError> {
        let player = self.read_optional(PLAYER_FILE)?;
        Ok(player
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()))
    }

    fn save_current_player(&mut self, player: &str) -> Result<(), ScoreError> {
        self.write(PLAYER_FILE, player)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub scores: PlayerScores,
    pub current_player: Option<String>,
}

impl ScorePersistence for MemoryStore {
    fn load_scores(&self) -> Result<PlayerScores, ScoreError> {
        Ok(self.scores.clone())
    }

    fn save_scores(&mut self, scores: &PlayerScores) -> Result<(), ScoreError> {
        self.scores = scores.clone();
        Ok(())
    }

    fn load_current_player(&self) -> Result<Option<String>, ScoreError> {
        Ok(self.current_player.clone())
    }

    fn save_current_player(&mut self, player: &str) -> Result<(), ScoreError> {
        self.current_player = Some(player.to_string());
        Ok(())
    }
}

/// Per-player best scores for every level, plus the identity scores are attributed to.
pub struct ScoreBoard<P: ScorePersistence> {
    persistence: P,
    scores: PlayerScores,
    current_player: Option<String>,
}

impl<P: ScorePersistence> ScoreBoard<P> {
    /// Unreadable storage starts an empty board rather than failing.
    pub fn new(persistence: P) -> Self {
        let scores = persistence.load_scores().unwrap_or_else(|err| {
            warn!("could not load scores, starting empty: {}", err);
            PlayerScores::new()
        });
        let current_player = persistence.load_current_player().unwrap_or_else(|err| {
            warn!("could not load current player: {}", err);
            None
        });
        ScoreBoard {
            persistence,
            scores,
            current_player,
        }
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn current_player(&self) -> Option<&str> {
        self.current_player.as_deref()
    }

    /// Returns false if the trimmed name is empty.
    pub fn set_current_player(&mut self, pseudo: &str) -> bool {
        let pseudo = pseudo.trim();
        if pseudo.is_empty() {
            return false;
        }
        self.scores.entry(pseudo.to_string()).or_default();
        self.current_player = Some(pseudo.to_string());

        if let Err(err) = self.persistence.save_current_player(pseudo) {
            warn!("could not save current player: {}", err);
        }
        self.save_scores();
        true
    }

    /// Keeps `score` if it beats the current player's best for `level_name`.
    /// Returns true for a new personal record.
    pub fn record_score(&mut self, level_name: &str, score: u32) -> bool {
        let Some(player) = self.current_player.clone() else {
            return false;
        };
        let player_scores = self.scores.entry(player).or_default();
        let previous_best = player_scores.get(level_name).copied().unwrap_or(0);
        if score <= previous_best {
            return false;
        }
        player_scores.insert(level_name.to_string(), score);
        self.save_scores();
        true
    }

    /// 0 when there is no current player or no score yet.
    pub fn player_best_score(&self, level_name: &str) -> u32 {
        self.current_player
            .as_ref()
            .and_then(|player| self.scores.get(player))
            .and_then(|scores| scores.get(level_name))
            .copied()
            .unwrap_or(0)
    }

    /// Ties go to the player listed first.
    pub fn global_best_score(&self, level_name: &str) -> Option<BestScore> {
        let mut best: Option<BestScore> = None;
        for (player, scores) in &self.scores {
            let Some(&score) = scores.get(level_name) else {
                continue;
            };
            if score > best.as_ref().map_or(0, |b| b.score) {
                best = Some(BestScore {
                    score,
                    player: player.clone(),
                });
            }
        }
        best
    }

    /// Highest score first.
    pub fn level_leaderboard(&self, level_name: &str) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .scores
            .iter()
            .filter_map(|(player, scores)| {
                scores
                    .get(level_name)
                    .filter(|&&score| score > 0)
                    .map(|&score| LeaderboardEntry {
                        player: player.clone(),
                        score,
                    })
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries
    }

    /// Record holder and full ranking for each level, as pretty JSON.
    pub fn export_standings(&self, level_names: &[&str]) -> Result<String, ScoreError> {
        let standings: Vec<LevelStanding> = level_names
            .iter()
            .map(|&level| LevelStanding {
                level: level.to_string(),
                best: self.global_best_score(level),
                entries: self.level_leaderboard(level),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&standings)?)
    }

    pub fn is_pseudo_available(&self, pseudo: &str) -> bool {
        !self.scores.contains_key(pseudo.trim())
    }

    pub fn existing_players(&self) -> Vec<String> {
        self.scores.keys().cloned().collect()
    }

    fn save_scores(&mut self) {
        if let Err(err) = self.persistence.save_scores(&self.scores) {
            warn!("could not save scores: {}", err);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn board_with(scores: &[(&str, &str, u32)]) -> ScoreBoard<MemoryStore> {
        let mut store = MemoryStore::default();
        for &(player, level, score) in scores {
            store
                .scores
                .entry(player.to_string())
                .or_default()
                .insert(level.to_string(), score);
        }
        ScoreBoard::new(store)
    }

    #[test]
    fn record_without_player_is_ignored() {
        let mut board = board_with(&[]);
        assert!(!board.record_score("intro", 900));
        assert!(board.persistence().scores.is_empty());
    }

    #[test]
    fn record_keeps_only_improvements() {
        let mut board = board_with(&[]);
        assert!(board.set_current_player("  alice "));
        assert_eq!(board.current_player(), Some("alice"));

        assert!(board.record_score("intro", 900));
        assert!(!board.record_score("intro", 850));
        assert!(!board.record_score("intro", 900));
        assert!(board.record_score("intro", 950));

        assert_eq!(board.player_best_score("intro"), 950);
        assert_eq!(board.persistence().scores["alice"]["intro"], 950);
        assert_eq!(board.persistence().current_player.as_deref(), Some("alice"));
    }

    #[test]
    fn empty_pseudo_is_rejected() {
        let mut board = board_with(&[]);
        assert!(!board.set_current_player("   "));
        assert_eq!(board.current_player(), None);
    }

    #[test]
    fn global_best_prefers_strictly_higher() {
        let board = board_with(&[
            ("alice", "intro", 900),
            ("bob", "intro", 900),
            ("carol", "intro", 700),
            ("dave", "push1", 990),
        ]);
        assert_eq!(
            board.global_best_score("intro"),
            Some(BestScore { score: 900, player: "alice".to_string() })
        );
        assert_eq!(board.global_best_score("corner"), None);
    }

    #[test]
    fn zero_scores_never_hold_a_record() {
        let board = board_with(&[("alice", "intro", 0)]);
        assert_eq!(board.global_best_score("intro"), None);
        assert!(board.level_leaderboard("intro").is_empty());
    }

    #[test]
    fn leaderboard_is_sorted_descending() {
        let board = board_with(&[
            ("alice", "intro", 700),
            ("bob", "intro", 950),
            ("carol", "intro", 820),
            ("dave", "push1", 990),
        ]);
        let players: Vec<(String, u32)> = board
            .level_leaderboard("intro")
            .into_iter()
            .map(|e| (e.player, e.score))
            .collect();
        assert_eq!(
            players,
            vec![
                ("bob".to_string(), 950),
                ("carol".to_string(), 820),
                ("alice".to_string(), 700),
            ]
        );
    }

    #[test]
    fn standings_export_lists_every_level() {
        let board = board_with(&[
            ("alice", "intro", 700),
            ("bob", "intro", 950),
        ]);
        let json = board.export_standings(&["intro", "push1"]).unwrap();
        let standings: Vec<LevelStanding> = serde_json::from_str(&json).unwrap();

        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].level, "intro");
        assert_eq!(
            standings[0].best,
            Some(BestScore { score: 950, player: "bob".to_string() })
        );
        assert_eq!(
            standings[0].entries,
            vec![
                LeaderboardEntry { player: "bob".to_string(), score: 950 },
                LeaderboardEntry { player: "alice".to_string(), score: 700 },
            ]
        );
        assert_eq!(standings[1].best, None);
        assert!(standings[1].entries.is_empty());
    }

    #[test]
    fn pseudo_availability_tracks_known_players() {
        let mut board = board_with(&[("alice", "intro", 700)]);
        assert!(!board.is_pseudo_available(" alice"));
        assert!(board.is_pseudo_available("bob"));
        board.set_current_player("bob");
        assert_eq!(board.existing_players(), vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn json_store_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("sokoban-scores-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        {
            let mut board = ScoreBoard::new(JsonFileStore::new(&dir));
            assert_eq!(board.current_player(), None);
            board.set_current_player("alice");
            board.record_score("intro", 875);
        }

        let board = ScoreBoard::new(JsonFileStore::new(&dir));
        assert_eq!(board.current_player(), Some("alice"));
        assert_eq!(board.player_best_score("intro"), 875);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn corrupt_score_file_starts_empty() {
        let dir = std::env::temp_dir().join(format!("sokoban-scores-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SCORES_FILE), "{ not json").unwrap();

        let board = ScoreBoard::new(JsonFileStore::new(&dir));
        assert!(board.existing_players().is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
