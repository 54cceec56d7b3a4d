use std::path::PathBuf;
use crate::core::bounded_grid::BoundedGrid;
use crate::core::models::{Tile, Vec2};

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("level {0} is missing a player start")]
    MissingPlayerStart(String),

    #[error("level {level}: {entity} at {position} lies outside the {width}x{height} grid")]
    OutOfBounds {
        level: String,
        entity: &'static str,
        position: Vec2,
        width: i32,
        height: i32,
    },

    #[error("level {level}: {entity} at {position} sits on a wall")]
    OnWall {
        level: String,
        entity: &'static str,
        position: Vec2,
    },

    #[error("level {level}: goal at {position} is not a goal tile")]
    GoalTileMismatch { level: String, position: Vec2 },

    #[error("level {level}: two boxes share {position}")]
    OverlappingBoxes { level: String, position: Vec2 },

    #[error("no levels to play")]
    NoLevels,

    #[error("unknown level {0}")]
    NotFound(String),

    #[error("failed to read level file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Immutable description of a puzzle. Shared read-only by every state created from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    name: String,
    tiles: BoundedGrid<Tile>,
    player_start: Vec2,
    boxes: Vec<Vec2>,
    goals: Vec<Vec2>,
}

impl Level {
    pub fn new(
        name: impl Into<String>,
        tiles: BoundedGrid<Tile>,
        player_start: Vec2,
        boxes: Vec<Vec2>,
        goals: Vec<Vec2>,
    ) -> Result<Level, LevelError> {
        let level = Level {
            name: name.into(),
            tiles,
            player_start,
            boxes,
            goals,
        };
        level.validate()?;
        Ok(level)
    }

    fn validate(&self) -> Result<(), LevelError> {
        self.check_placement("player", self.player_start)?;
        for (index, &b) in self.boxes.iter().enumerate() {
            self.check_placement("box", b)?;
            if self.boxes[..index].contains(&b) {
                return Err(LevelError::OverlappingBoxes {
                    level: self.name.clone(),
                    position: b,
                });
            }
        }
        for &goal in &self.goals {
            self.check_placement("goal", goal)?;
            if self.tiles[&goal] != Tile::Goal {
                return Err(LevelError::GoalTileMismatch {
                    level: self.name.clone(),
                    position: goal,
                });
            }
        }
        Ok(())
    }

    fn check_placement(&self, entity: &'static str, position: Vec2) -> Result<(), LevelError> {
        if !self.tiles.contains(&position) {
            return Err(LevelError::OutOfBounds {
                level: self.name.clone(),
                entity,
                position,
                width: self.width(),
                height: self.height(),
            });
        }
        if self.tiles[&position] == Tile::Wall {
            return Err(LevelError::OnWall {
                level: self.name.clone(),
                entity,
                position,
            });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> i32 {
        self.tiles.width()
    }

    pub fn height(&self) -> i32 {
        self.tiles.height()
    }

    pub fn tiles(&self) -> &BoundedGrid<Tile> {
        &self.tiles
    }

    pub fn player_start(&self) -> Vec2 {
        self.player_start
    }

    pub fn boxes(&self) -> &[Vec2] {
        &self.boxes
    }

    pub fn goals(&self) -> &[Vec2] {
        &self.goals
    }

    pub fn in_bounds(&self, pos: &Vec2) -> bool {
        self.tiles.contains(pos)
    }

    pub fn tile_at(&self, pos: &Vec2) -> Option<Tile> {
        self.tiles.get(pos).copied()
    }

    /// Cells outside the grid are not walls.
    pub fn is_wall(&self, pos: &Vec2) -> bool {
        self.tile_at(pos) == Some(Tile::Wall)
    }

    pub fn is_goal(&self, pos: &Vec2) -> bool {
        self.goals.contains(pos)
    }
}
