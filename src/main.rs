// Terminal Sokoban with a local leaderboard
// Controls: W/A/S/D or arrow keys to move, R restart, N/P switch level, C change player,
// Q to quit.
// Tiles: '#' wall, 'P' player, 'B' box, 'G' goal, '*' box on goal, '+' player on goal.

use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{error, info};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use sokoban_engine::console_interface::ConsoleInput::*;
use sokoban_engine::console_interface::{
    cleanup_terminal, confirm_player, handle_input, prompt_player_name, render_game,
    setup_terminal, status_for_events, with_plain_terminal,
};
use sokoban_engine::core::UserAction as Action;
use sokoban_engine::levels::{level_ids, render_state_to_string};
use sokoban_engine::models::GameRenderState;
use sokoban_engine::scores::{JsonFileStore, ScoreBoard};
use sokoban_engine::session::GameSession;

/// Box-pushing puzzles with a per-player leaderboard
#[derive(Parser, Debug)]
#[command(name = "sokoban")]
#[command(about = "Play Sokoban in the terminal", long_about = None)]
struct Args {
    /// Level to start on: a built-in id or the name of a file in --levels-dir
    #[arg(long, default_value = "intro")]
    level: String,

    /// Player name scores are recorded under (asked for when none is stored)
    #[arg(long)]
    player: Option<String>,

    /// Directory holding scores.json and the current player
    #[arg(long, default_value = ".sokoban")]
    scores_dir: PathBuf,

    /// Directory searched for <level>.txt when the level is not built in
    #[arg(long, default_value = "levels")]
    levels_dir: PathBuf,

    /// Log output file (filter with RUST_LOG)
    #[arg(long, default_value = "sokoban.log")]
    log_file: PathBuf,

    /// Print the built-in level ids and exit
    #[arg(long)]
    list_levels: bool,

    /// Print every built-in level's leaderboard as JSON and exit
    #[arg(long)]
    export_scores: bool,
}

fn init_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let log_out = std::fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_out)))
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.list_levels {
        for id in level_ids() {
            println!("{}", id);
        }
        return Ok(());
    }

    init_logging(&args.log_file)?;

    if args.export_scores {
        let scores = ScoreBoard::new(JsonFileStore::new(&args.scores_dir));
        println!("{}", scores.export_standings(&level_ids())?);
        return Ok(());
    }

    let mut scores = ScoreBoard::new(JsonFileStore::new(&args.scores_dir));
    match &args.player {
        Some(player) => {
            scores.set_current_player(player);
        }
        None => {
            let keep_stored = match scores.current_player() {
                Some(stored) => confirm_player(stored)?,
                None => false,
            };
            if !keep_stored {
                choose_player(&mut scores)?;
            }
        }
    }
    info!("playing as {:?}", scores.current_player());

    let mut ids: Vec<String> = level_ids().into_iter().map(String::from).collect();
    let start_index = match ids.iter().position(|id| *id == args.level) {
        Some(index) => index,
        None => {
            ids.push(args.level.clone());
            ids.len() - 1
        }
    };
    let session = GameSession::new(ids, &args.levels_dir, start_index, scores)?;

    let mut terminal = setup_terminal()?;
    let result = run_interactive(session, &mut terminal);
    cleanup_terminal()?;
    if let Err(err) = &result {
        error!("game loop failed: {}", err);
    }
    result
}

fn choose_player(scores: &mut ScoreBoard<JsonFileStore>) -> std::io::Result<()> {
    if let Some(player) = prompt_player_name(&scores.existing_players())? {
        if !scores.is_pseudo_available(&player) {
            println!("Welcome back, {}!", player.trim());
        }
        scores.set_current_player(&player);
    }
    Ok(())
}

fn render_state(session: &GameSession<JsonFileStore>, status: Option<String>) -> GameRenderState {
    GameRenderState {
        board: render_state_to_string(session.state()),
        hud: session.hud(),
        status,
        ended: session.state().ended,
    }
}

fn run_interactive(
    mut session: GameSession<JsonFileStore>,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut status = None;
    render_game(terminal, &render_state(&session, None))?;

    loop {
        match handle_input()? {
            Quit => break,
            UserAction(_) | Unknown if session.state().ended => {
                // any key moves past a finished level
                session.advance_after_end()?;
                status = None;
            }
            UserAction(Action::Move(direction)) => {
                let result = session.handle_move(direction);
                if result.success {
                    status = status_for_events(&result.events, session.last_win());
                }
            }
            UserAction(Action::Restart) => {
                session.restart_level()?;
                status = None;
            }
            UserAction(Action::NextLevel) => {
                session.next_level()?;
                status = None;
            }
            UserAction(Action::PreviousLevel) => {
                session.previous_level()?;
                status = None;
            }
            ChangePlayer => {
                let existing = session.scores().existing_players();
                if let Some(player) = with_plain_terminal(terminal, || prompt_player_name(&existing))? {
                    session.change_player(&player)?;
                }
                status = None;
            }
            Timeout | Unknown => {
                // keeps the clock and live score ticking
            }
        }
        render_game(terminal, &render_state(&session, status.clone()))?;
    }

    Ok(())
}
