use std::io::ErrorKind;
use std::path::Path;
use log::info;
use crate::core::{BoundedGrid, GameState, Level, LevelError, Tile, Vec2};

// Glyphs: '#' wall, 'G' goal, 'B' box, 'P' player, '*' box on goal, '+' player on goal.
// Anything else is floor.

pub const BUILTIN_LEVELS: &[(&str, &str)] = &[
    ("intro", r#"
########
#   G  #
#  B   #
#   P  #
########
"#),
    ("push1", r#"
########
#  G   #
#  B   #
#  P   #
########
"#),
    ("corridor", r#"
###########
#G   B   P#
###########
"#),
    ("corner", r#"
########
#G     #
#   B  #
#   P  #
########
"#),
    ("woom", r#"
#############
#   #   #   #
# B G B G   #
# ### # ### #
#   P   B G #
#   #   #   #
#############
"#),
    ("warehouse", r#"
###############
#   G G G     #
#  B B B B #  #
#   ###   B  P#
#   ###   #   #
#   G   G   ###
###############
"#),
    ("tight", r#"
########
#  G   #
#  B P #
#  G B #
#      #
########
"#),
    ("zigzag", r#"
###########
#G B G B  #
# ### ### #
#   P     #
###########
"#),
    ("boxes4", r#"
###########
# G G G G #
# B B B B #
#   P     #
###########
"#),
    ("boucle", r#"
#############
# B     G   #
# # # # # # #
# P    B G  #
#   # # #   #
# G   B     #
#############
"#),
    ("injouable", r#"
############################
#G#  #   #P #  #           #
# #    B  # #   BB  #     B#
# # ##### # #  #  G   ##   #
#           #    G#G       #
#    #  ##### ####G    #   #
######  #G  B              #
#G     #### #   B# # ##    #
# # B       #              #
# #  # ####B## # # # # # # #
# #  #      #G          B G#
# #  #  ### # # # # # # # ##
# #  #    # # B           G#
# #  ####  G# ############ #
# #  #    ###              #
#B#  # ##   B            #G#
#   G                    B #
############################
"#),
];

pub fn level_ids() -> Vec<&'static str> {
    BUILTIN_LEVELS.iter().map(|&(id, _)| id).collect()
}

pub fn builtin_level_text(id: &str) -> Option<&'static str> {
    BUILTIN_LEVELS
        .iter()
        .find(|&&(builtin_id, _)| builtin_id == id)
        .map(|&(_, text)| text)
}

/// Built-in levels first, then `<levels_dir>/<id>.txt`.
pub fn load_level(id: &str, levels_dir: &Path) -> Result<Level, LevelError> {
    if let Some(text) = builtin_level_text(id) {
        return parse_ascii_level(id, text);
    }

    let path = levels_dir.join(format!("{}.txt", id));
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(LevelError::NotFound(id.to_string()));
        }
        Err(source) => return Err(LevelError::Io { path, source }),
    };
    info!("loaded level {} from {}", id, path.display());
    parse_ascii_level(id, &text)
}

pub fn parse_ascii_level(name: &str, ascii: &str) -> Result<Level, LevelError> {
    let mut rows: Vec<Vec<char>> = ascii
        .lines()
        .map(|line| line.trim_end().chars().collect())
        .collect();
    while rows.first().is_some_and(|row| row.is_empty()) {
        rows.remove(0);
    }
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }

    let height = rows.len() as i32;
    let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;

    let mut tiles = BoundedGrid::new_with_size(width, height, Tile::Floor);
    let mut player_start = None;
    let mut boxes = Vec::new();
    let mut goals = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        for (x, &ch) in row.iter().enumerate() {
            let pos = Vec2 { x: x as i32, y: y as i32 };
            match ch {
                '#' => tiles[&pos] = Tile::Wall,
                'G' | '*' | '+' => {
                    tiles[&pos] = Tile::Goal;
                    goals.push(pos);
                }
                _ => {}
            }
            match ch {
                'P' | '+' => player_start = Some(pos),
                'B' | '*' => boxes.push(pos),
                _ => {}
            }
        }
    }

    let player_start = player_start.ok_or_else(|| LevelError::MissingPlayerStart(name.to_string()))?;
    Level::new(name, tiles, player_start, boxes, goals)
}

/// Inverse of `parse_ascii_level` for a state in play, one line per row.
pub fn render_state_to_string(state: &GameState) -> String {
    let mut result = String::new();
    for (y, row) in state.level.tiles().rows().enumerate() {
        for (x, tile) in row.iter().enumerate() {
            let pos = Vec2 { x: x as i32, y: y as i32 };
            let has_player = pos == state.player;
            let has_box = state.has_box_at(&pos);
            let ch = match tile {
                Tile::Wall => '#',
                Tile::Floor => if has_player { 'P' } else if has_box { 'B' } else { ' ' },
                Tile::Goal => if has_player { '+' } else if has_box { '*' } else { 'G' },
            };
            result.push(ch);
        }
        result.push('\n');
    }
    result
}
