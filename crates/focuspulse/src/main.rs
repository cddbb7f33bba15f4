//! focuspulse - Focus/break interval timer
//!
//! Usage:
//!   focuspulse                      Run the interactive timer
//!   focuspulse settings             Show stored focus/break durations
//!   focuspulse settings set F B     Save new durations (minutes)
//!   focuspulse history [--limit N]  Show recorded sessions

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use focuspulse_core::{Config, Paths};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use focuspulse::runtime::{Command, Notice, Runtime, Update};
use focuspulse::session::{SessionRecord, SessionType, StoredSession};
use focuspulse::settings::{parse_minutes, Settings};
use focuspulse::stats::{format_countdown, format_focus_time, HistoryStats};
use focuspulse::store::{build_store, Store};
use focuspulse::timer::TimerState;
use focuspulse::PulseError;

/// FocusPulse - focus/break interval timer
#[derive(Parser)]
#[command(name = "focuspulse")]
#[command(about = "Focus/break interval timer with persisted settings and session history")]
#[command(version)]
#[command(after_help = r#"TIMER COMMANDS (interactive mode):
    <enter>         start / pause
    s, start        start the countdown
    p, pause        pause (the partial phase is not recorded)
    r, reset        rewind the current phase
    focus N         set focus length to N minutes
    break N         set break length to N minutes
    save F B        save focus/break lengths to the store
    clear           clear completed sessions, focus time and streak
    history         show recorded sessions
    q, quit         exit

STORE:
    By default settings and sessions go to the API at http://localhost:8080.
    Use --url to point elsewhere, or --local to keep everything on disk.

EXAMPLES:
    focuspulse                          # interactive timer
    focuspulse --local                  # offline, file-backed
    focuspulse settings set 50 10       # 50 min focus, 10 min break
    focuspulse history --limit 5
"#)]
struct Cli {
    /// Config file (default: ~/.config/focuspulse/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL of the settings & session API
    #[arg(long, global = true, value_name = "URL", conflicts_with = "local")]
    url: Option<String>,

    /// Use the local file store instead of the API
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive timer
    Run,

    /// Show or change stored durations
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Show recorded sessions
    #[command(alias = "h")]
    History {
        /// Number of sessions to list
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show the stored durations
    Show,
    /// Save new durations
    Set {
        /// Focus length in minutes
        #[arg(value_name = "FOCUS")]
        focus: String,
        /// Break length in minutes
        #[arg(value_name = "BREAK")]
        brk: String,
    },
}

// ANSI color codes
const GREEN: &str = "\x1b[0;32m";
const RED: &str = "\x1b[0;31m";
const CYAN: &str = "\x1b[0;36m";
const MAGENTA: &str = "\x1b[0;35m";
const BOLD: &str = "\x1b[1m";
const NC: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Check if stdout is a TTY and colors should be used
fn use_colors() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Conditionally apply color
fn color(code: &str, text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", code, text, NC)
    } else {
        text.to_string()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the countdown
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = cli.url {
        config.store.backend = "http".to_string();
        config.store.url = url;
    }
    if cli.local {
        config.store.backend = "file".to_string();
    }

    let store = build_store(&config.store, &paths)?;
    let fallback = Settings {
        focus_minutes: config.timer.focus_minutes,
        break_minutes: config.timer.break_minutes,
    };

    match cli.command {
        None | Some(Commands::Run) => cmd_run(store, fallback).await,
        Some(Commands::Settings { action }) => match action {
            None | Some(SettingsAction::Show) => cmd_settings_show(store.as_ref()).await,
            Some(SettingsAction::Set { focus, brk }) => {
                cmd_settings_set(store.as_ref(), &focus, &brk).await
            }
        },
        Some(Commands::History { limit }) => cmd_history(store.as_ref(), limit).await,
    }
}

/// What a line typed in interactive mode means
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Help,
    Unknown(String),
}

fn parse_input(line: &str) -> Result<Input, PulseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let input = match words.as_slice() {
        [] => Input::Command(Command::Toggle),
        ["s" | "start"] => Input::Command(Command::Start),
        ["p" | "pause"] => Input::Command(Command::Pause),
        ["r" | "reset"] => Input::Command(Command::Reset),
        ["clear"] => Input::Command(Command::ClearHistory),
        ["h" | "history"] => Input::Command(Command::ShowHistory),
        ["q" | "quit" | "exit"] => Input::Command(Command::Quit),
        ["?" | "help"] => Input::Help,
        ["focus" | "f", n] => Input::Command(Command::SetFocus(parse_minutes("focus", n)?)),
        ["break" | "b", n] => Input::Command(Command::SetBreak(parse_minutes("break", n)?)),
        ["save", f, b] => {
            Input::Command(Command::SaveSettings {
                focus_minutes: parse_minutes("focus", f)?,
                break_minutes: parse_minutes("break", b)?,
            })
        }
        _ => Input::Unknown(line.trim().to_string()),
    };
    Ok(input)
}

/// Run the interactive timer
async fn cmd_run(store: Arc<dyn Store>, fallback: Settings) -> Result<()> {
    let (command_tx, command_rx) = mpsc::channel(32);
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();

    let runtime = Runtime::new(fallback, store, update_tx);
    let timer = tokio::spawn(runtime.run(command_rx));

    // Plain thread: a blocked stdin read must not keep the runtime from shutting down
    std::thread::spawn(move || read_commands(command_tx));

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "FOCUSPULSE"));
    println!("Press <enter> to start or pause, 'help' for commands.");
    println!();

    let mut screen = Screen::default();
    while let Some(update) = update_rx.recv().await {
        screen.show(update);
    }
    screen.close();

    let state = timer.await.context("Timer task failed")?;
    println!(
        "Completed {} session(s), {} focused",
        state.completed_sessions,
        format_focus_time(state.total_focused_seconds)
    );

    Ok(())
}

fn read_commands(commands: mpsc::Sender<Command>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match parse_input(&line) {
            Ok(Input::Command(command)) => {
                let quit = command == Command::Quit;
                if commands.blocking_send(command).is_err() || quit {
                    return;
                }
            }
            Ok(Input::Help) => print_help(),
            Ok(Input::Unknown(text)) => {
                println!("{} Unknown command: {} (try 'help')", color(RED, "[error]"), text);
            }
            Err(e) => println!("{} {}", color(RED, "[error]"), e),
        }
    }
    let _ = commands.blocking_send(Command::Quit);
}

fn print_help() {
    println!("  <enter> start/pause   r reset   focus N   break N   save F B");
    println!("  clear                 history   q quit");
}

/// Terminal rendering of timer updates
#[derive(Default)]
struct Screen {
    /// The status line is drawn without a trailing newline
    status_open: bool,
}

impl Screen {
    fn show(&mut self, update: Update) {
        match update {
            Update::State(state) => self.status(&state),
            Update::PhaseCompleted(record) => {
                self.line(&completion_message(&record));
            }
            Update::Notice(notice) => self.line(&notice_message(&notice)),
            Update::History(sessions) => {
                self.close();
                print_history(&sessions, 10);
            }
        }
    }

    fn status(&mut self, state: &TimerState) {
        let button = if state.running { "⏸ Pause" } else { "▶ Start" };
        print!(
            "{}{}  {}  [{}]  sessions: {}  focus: {}  streak: {}",
            CLEAR_LINE,
            color(CYAN, state.phase.label()),
            color(BOLD, &format_countdown(state.time_left_seconds)),
            button,
            state.completed_sessions,
            format_focus_time(state.total_focused_seconds),
            state.streak,
        );
        let _ = std::io::stdout().flush();
        self.status_open = true;
    }

    fn line(&mut self, text: &str) {
        self.close();
        println!("{}", text);
    }

    fn close(&mut self) {
        if self.status_open {
            println!();
            self.status_open = false;
        }
    }
}

fn completion_message(record: &SessionRecord) -> String {
    match record.session_type {
        SessionType::Work => format!(
            "{} Focus session complete ({} min). Break time!",
            color(GREEN, "[ok]"),
            record.duration
        ),
        SessionType::Break => format!(
            "{} Break over ({} min). Back to focus.",
            color(GREEN, "[ok]"),
            record.duration
        ),
    }
}

fn notice_message(notice: &Notice) -> String {
    match notice {
        Notice::SettingsSaved(settings) => format!(
            "{} Settings saved: {} min focus, {} min break",
            color(GREEN, "[ok]"),
            settings.focus_minutes,
            settings.break_minutes
        ),
        Notice::SettingsSaveFailed(reason) => format!("{} {}", color(RED, "[error]"), reason),
        Notice::HistoryFailed(reason) => format!("{} {}", color(RED, "[error]"), reason),
        Notice::Rejected(rejection) => format!("{} {}", color(RED, "[error]"), rejection),
    }
}

/// Show the stored durations
async fn cmd_settings_show(store: &dyn Store) -> Result<()> {
    let settings = store
        .fetch_settings()
        .await
        .map_err(PulseError::SettingsFetchFailed)?;

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "SETTINGS"));
    println!();
    println!("  {}  {} minutes", color(CYAN, "Focus:"), settings.focus_minutes);
    println!("  {}  {} minutes", color(CYAN, "Break:"), settings.break_minutes);

    Ok(())
}

/// Validate and save new durations
async fn cmd_settings_set(store: &dyn Store, focus: &str, brk: &str) -> Result<()> {
    let settings = Settings::new(parse_minutes("focus", focus)?, parse_minutes("break", brk)?)?;

    store
        .save_settings(&settings)
        .await
        .map_err(PulseError::SettingsSaveFailed)?;

    println!(
        "{} Settings saved: {} min focus, {} min break",
        color(GREEN, "[ok]"),
        settings.focus_minutes,
        settings.break_minutes
    );

    Ok(())
}

/// List recorded sessions with totals
async fn cmd_history(store: &dyn Store, limit: usize) -> Result<()> {
    let sessions = store
        .list_sessions()
        .await
        .map_err(PulseError::HistoryFetchFailed)?;

    print_history(&sessions, limit);
    Ok(())
}

fn print_history(sessions: &[StoredSession], limit: usize) {
    if sessions.is_empty() {
        println!("No sessions recorded yet");
        return;
    }

    println!("{}", color(BOLD, "Session History"));
    println!();
    for session in sessions.iter().take(limit) {
        let span = match (&session.start_time, &session.end_time) {
            (Some(start), Some(end)) => format!("{}-{}", start, end),
            _ => "           ".to_string(),
        };
        let minutes = session
            .duration
            .map(|m| format!("{:>3} min", m))
            .unwrap_or_else(|| "      -".to_string());
        println!(
            "  {}  {}  {}  {}",
            session.session_date.get(..10).unwrap_or(session.session_date.as_str()),
            span,
            minutes,
            color(CYAN, session.kind().as_str())
        );
    }
    if sessions.len() > limit {
        println!("  ... {} more", sessions.len() - limit);
    }

    let stats = HistoryStats::from_sessions(sessions);
    let (hours, mins) = stats.total_time();
    println!();
    println!("  {}  {}", color(CYAN, "Focus sessions:"), stats.work_sessions);
    println!("  {}          {}", color(CYAN, "Breaks:"), stats.break_sessions);
    println!("  {}      {}h {}m", color(CYAN, "Focus time:"), hours, mins);
    if stats.work_sessions > 0 {
        println!(
            "  {}         {} minutes",
            color(CYAN, "Average:"),
            stats.average_work_minutes
        );
    }
    println!("  {}     {}", color(CYAN, "Active days:"), stats.active_days);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_with_tty() {
        // Just verify the color function doesn't panic
        let result = color(RED, "test");
        assert!(result.contains("test"));
    }

    #[test]
    fn test_parse_timer_commands() {
        assert_eq!(parse_input("").unwrap(), Input::Command(Command::Toggle));
        assert_eq!(parse_input("  s ").unwrap(), Input::Command(Command::Start));
        assert_eq!(parse_input("reset").unwrap(), Input::Command(Command::Reset));
        assert_eq!(parse_input("q").unwrap(), Input::Command(Command::Quit));
        assert_eq!(parse_input("help").unwrap(), Input::Help);
    }

    #[test]
    fn test_parse_durations() {
        assert_eq!(
            parse_input("focus 45").unwrap(),
            Input::Command(Command::SetFocus(45))
        );
        assert_eq!(
            parse_input("break 0").unwrap(),
            Input::Command(Command::SetBreak(0))
        );
        assert_eq!(
            parse_input("save 30 10").unwrap(),
            Input::Command(Command::SaveSettings {
                focus_minutes: 30,
                break_minutes: 10
            })
        );
        assert!(matches!(
            parse_input("focus abc"),
            Err(PulseError::InvalidDurationInput { field: "focus", .. })
        ));
        assert!(matches!(
            parse_input("save 30 x"),
            Err(PulseError::InvalidDurationInput { field: "break", .. })
        ));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_input("dance").unwrap(),
            Input::Unknown("dance".to_string())
        );
        assert_eq!(
            parse_input("save 30 10 5").unwrap(),
            Input::Unknown("save 30 10 5".to_string())
        );
    }
}
