use crate::core::{Direction, GameEvent, UserAction};
use crate::models::GameRenderState;
use crate::session::{HudInfo, WinSummary};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use std::io::{self, BufRead, Write};

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, Box<dyn std::error::Error>>
{
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn cleanup_terminal() -> Result<(), Box<dyn std::error::Error>> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Leaves raw mode and the alternate screen while `f` talks to the plain terminal.
pub fn with_plain_terminal<T>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    f: impl FnOnce() -> io::Result<T>,
) -> Result<T, Box<dyn std::error::Error>> {
    cleanup_terminal()?;
    let result = f();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    terminal.clear()?;
    Ok(result?)
}

pub fn render_game(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &GameRenderState,
) -> Result<(), Box<dyn std::error::Error>> {
    terminal.draw(|f| {
        let rows = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());
        let columns = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(rows[0]);

        // Board
        let game_paragraph = Paragraph::new(state.board.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Sokoban - {}", state.hud.level_name)),
            )
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center);
        f.render_widget(game_paragraph, columns[0]);

        // HUD
        let hud_paragraph = Paragraph::new(format_hud(&state.hud).join("\n"))
            .block(Block::default().borders(Borders::ALL).title("Score"))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(hud_paragraph, columns[1]);

        // Instructions
        let controls = if state.ended {
            "Press any key to continue, Q to quit"
        } else {
            "WASD/Arrows move | R restart | N/P level | C player | Q quit"
        };
        let instructions = match &state.status {
            Some(status) => format!("{} | {}", status, controls),
            None => controls.to_string(),
        };
        let instruction_paragraph = Paragraph::new(instructions)
            .block(Block::default().borders(Borders::ALL).title("Instructions"))
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center);
        f.render_widget(instruction_paragraph, rows[1]);
    })?;
    Ok(())
}

pub fn format_hud(hud: &HudInfo) -> Vec<String> {
    let global_best = match &hud.global_best {
        Some(best) => format!("{} ({})", best.score, best.player),
        None => "none".to_string(),
    };
    let personal_best = if hud.personal_best > 0 {
        hud.personal_best.to_string()
    } else {
        "none".to_string()
    };
    let mut lines = vec![
        format!("Moves: {}", hud.moves),
        format!("Pushes: {}", hud.pushes),
        format!("Time: {:.1}s", hud.elapsed_ms as f64 / 1000.0),
        format!("Score: {}", hud.score),
        String::new(),
        format!("Player: {}", hud.player.as_deref().unwrap_or("anonymous")),
        format!("Your best: {}", personal_best),
        format!("Level best: {}", global_best),
    ];
    if !hud.leaderboard.is_empty() {
        lines.push(String::new());
        lines.push("Leaderboard".to_string());
        for (rank, entry) in hud.leaderboard.iter().enumerate() {
            lines.push(format!("{}. {} {}", rank + 1, entry.player, entry.score));
        }
    }
    lines
}

pub fn win_message(summary: &WinSummary) -> String {
    let mut message = format!("Level complete! Score {}", summary.score);
    if summary.player.is_none() {
        return message;
    }
    if summary.is_personal_record() {
        message.push_str(&format!(" - new personal best (was {})", summary.previous_personal_best));
    }
    if summary.is_global_record() {
        match &summary.previous_global_best {
            Some(best) => message.push_str(&format!(
                " - new level record (was {} by {})",
                best.score, best.player
            )),
            None => message.push_str(" - new level record"),
        }
    }
    message
}

/// One line describing what the last move did.
pub fn status_for_events(events: &[GameEvent], win: Option<&WinSummary>) -> Option<String> {
    events.iter().rev().find_map(|event| match event {
        GameEvent::Won { score } => Some(match win {
            Some(summary) => win_message(summary),
            None => format!("Level complete! Score {}", score),
        }),
        GameEvent::LostDeadlock { box_position } => {
            Some(format!("Deadlock: box at {} can no longer reach a goal", box_position))
        }
        GameEvent::BoxPlacedOnGoal => Some("Box on goal!".to_string()),
        GameEvent::Moved | GameEvent::Pushed => None,
    })
}

pub enum ConsoleInput {
    UserAction(UserAction),
    ChangePlayer,
    Quit,
    Timeout,
    Unknown,
}

pub fn handle_input() -> Result<ConsoleInput, Box<dyn std::error::Error>> {
    if event::poll(std::time::Duration::from_millis(50))? {
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            return Ok(input_for_key(code));
        }
    }
    Ok(ConsoleInput::Timeout)
}

fn input_for_key(code: KeyCode) -> ConsoleInput {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => ConsoleInput::Quit,
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => {
            ConsoleInput::UserAction(UserAction::Move(Direction::Up))
        }
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => {
            ConsoleInput::UserAction(UserAction::Move(Direction::Down))
        }
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
            ConsoleInput::UserAction(UserAction::Move(Direction::Left))
        }
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
            ConsoleInput::UserAction(UserAction::Move(Direction::Right))
        }
        KeyCode::Char('r') | KeyCode::Char('R') => ConsoleInput::UserAction(UserAction::Restart),
        KeyCode::Char('n') | KeyCode::Char('N') => ConsoleInput::UserAction(UserAction::NextLevel),
        KeyCode::Char('p') | KeyCode::Char('P') => {
            ConsoleInput::UserAction(UserAction::PreviousLevel)
        }
        KeyCode::Char('c') | KeyCode::Char('C') => ConsoleInput::ChangePlayer,
        _ => ConsoleInput::Unknown,
    }
}

/// Asks for a player name on the plain terminal. Must run before raw mode is enabled.
/// Returns `None` on end of input.
pub fn prompt_player_name(existing_players: &[String]) -> io::Result<Option<String>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if !existing_players.is_empty() {
        writeln!(stdout, "Existing players: {}", existing_players.join(", "))?;
    }
    loop {
        write!(stdout, "Enter your player name: ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let name = line.trim();
        if name.is_empty() {
            writeln!(stdout, "The name cannot be empty.")?;
            continue;
        }
        return Ok(Some(name.to_string()));
    }
}

/// Asks whether to keep playing as the stored player. Anything but an explicit no
/// (or end of input) keeps them.
pub fn confirm_player(player: &str) -> io::Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "Continue as {}? [Y/n] ", player)?;
    stdout.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(true);
    }
    Ok(is_confirmation(&line))
}

fn is_confirmation(answer: &str) -> bool {
    !matches!(answer.trim().to_lowercase().as_str(), "n" | "no" | "non")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::Vec2;
    use crate::scores::{BestScore, LeaderboardEntry};

    fn summary(player: Option<&str>, score: u32, personal: u32, global: Option<(u32, &str)>) -> WinSummary {
        WinSummary {
            level_name: "intro".to_string(),
            score,
            player: player.map(String::from),
            previous_personal_best: personal,
            previous_global_best: global.map(|(score, player)| BestScore {
                score,
                player: player.to_string(),
            }),
        }
    }

    #[test]
    fn win_message_announces_records() {
        let message = win_message(&summary(Some("alice"), 950, 900, Some((940, "bob"))));
        assert_eq!(
            message,
            "Level complete! Score 950 - new personal best (was 900) - new level record (was 940 by bob)"
        );
    }

    #[test]
    fn win_message_without_records() {
        let message = win_message(&summary(Some("alice"), 800, 900, Some((940, "bob"))));
        assert_eq!(message, "Level complete! Score 800");
    }

    #[test]
    fn zero_score_is_never_a_level_record() {
        let result = summary(Some("alice"), 0, 0, None);
        assert!(!result.is_global_record());
        assert!(!result.is_personal_record());
        assert_eq!(win_message(&result), "Level complete! Score 0");
        assert_eq!(
            win_message(&summary(Some("alice"), 12, 0, None)),
            "Level complete! Score 12 - new personal best (was 0) - new level record"
        );
    }

    #[test]
    fn anonymous_win_has_no_record_talk() {
        let message = win_message(&summary(None, 990, 0, None));
        assert_eq!(message, "Level complete! Score 990");
    }

    #[test]
    fn status_prefers_terminal_events() {
        let events = [
            GameEvent::BoxPlacedOnGoal,
            GameEvent::LostDeadlock { box_position: Vec2::new(1, 1) },
        ];
        assert_eq!(
            status_for_events(&events, None).as_deref(),
            Some("Deadlock: box at (1, 1) can no longer reach a goal")
        );
        assert_eq!(status_for_events(&[GameEvent::Moved], None), None);
    }

    #[test]
    fn hud_lines_show_counters_and_bests() {
        let hud = HudInfo {
            level_name: "intro".to_string(),
            moves: 12,
            pushes: 3,
            elapsed_ms: 4_300,
            score: 906,
            player: None,
            personal_best: 0,
            global_best: Some(BestScore { score: 970, player: "bob".to_string() }),
            leaderboard: vec![
                LeaderboardEntry { player: "bob".to_string(), score: 970 },
                LeaderboardEntry { player: "carol".to_string(), score: 910 },
            ],
        };
        let lines = format_hud(&hud);
        assert_eq!(lines[0], "Moves: 12");
        assert_eq!(lines[2], "Time: 4.3s");
        assert_eq!(lines[5], "Player: anonymous");
        assert_eq!(lines[6], "Your best: none");
        assert_eq!(lines[7], "Level best: 970 (bob)");
        assert_eq!(&lines[9..], &["Leaderboard", "1. bob 970", "2. carol 910"]);
    }

    #[test]
    fn keys_map_to_actions() {
        assert!(matches!(
            input_for_key(KeyCode::Char('w')),
            ConsoleInput::UserAction(UserAction::Move(Direction::Up))
        ));
        assert!(matches!(
            input_for_key(KeyCode::Char('r')),
            ConsoleInput::UserAction(UserAction::Restart)
        ));
        assert!(matches!(input_for_key(KeyCode::Esc), ConsoleInput::Quit));
        assert!(matches!(input_for_key(KeyCode::Char('C')), ConsoleInput::ChangePlayer));
        assert!(matches!(input_for_key(KeyCode::Char('x')), ConsoleInput::Unknown));
    }

    #[test]
    fn only_an_explicit_no_declines_the_stored_player() {
        assert!(is_confirmation("\n"));
        assert!(is_confirmation("y\n"));
        assert!(is_confirmation("Yes"));
        assert!(!is_confirmation("n\n"));
        assert!(!is_confirmation(" NO "));
    }
}
