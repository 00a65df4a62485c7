use crate::app::{ImportOutcome, TrainerApp};
use crate::error::TrainerError;
use crate::game::{Board, MoveRecord, PlayerColor};
use crate::persistence::{FileImportSource, Storage};
use crate::preferences::ThemeKey;
use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// One line typed at the prompt. The first word names the command.
#[derive(Parser, Debug)]
#[command(multicall = true)]
struct Prompt {
    #[command(subcommand)]
    command: Command,
}

/// A user intent typed at the prompt.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a repertoire and select it
    New {
        /// Side the repertoire is prepared for (white, black)
        perspective: PlayerColor,
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// List repertoires
    #[command(alias = "ls")]
    List,
    /// Select a repertoire by list number or id
    Select { repertoire: String },
    /// Delete a repertoire by list number or id
    Delete { repertoire: String },
    /// Rename the selected repertoire
    Rename {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Record or follow a move (SAN or UCI)
    Play {
        #[arg(value_name = "MOVE")]
        notation: String,
    },
    /// Step back to the parent position
    Back,
    /// Return to the starting position
    Root,
    /// Jump to a position by node id
    Goto { node_id: String },
    /// Show the continuations from the current position
    Moves,
    /// Show the line leading to the current position
    Line,
    /// Make a continuation the main line
    #[command(name = "mainline")]
    MainLine {
        #[arg(value_name = "MOVE")]
        notation: String,
    },
    /// Override the light square color
    Light { color: String },
    /// Override the dark square color
    Dark { color: String },
    /// Set the board size in pixels
    Size { px: u32 },
    /// Show the current theme, or select a preset
    Theme { name: Option<String> },
    /// Write an export document
    Export { path: PathBuf },
    /// Replace everything with an export document
    Import { path: Option<PathBuf> },
    /// Erase all repertoires and preferences
    Reset {
        /// Skip the safety check and erase
        #[arg(long)]
        confirm: bool,
    },
    /// Leave the trainer
    #[command(alias = "exit")]
    Quit,
}

/// Parse a prompt line. `help` and usage mistakes come back as a
/// [`clap::Error`] whose text is meant for the user.
pub fn parse_line(line: &str) -> Result<Command, clap::Error> {
    Prompt::try_parse_from(line.split_whitespace()).map(|prompt| prompt.command)
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

/// Resolve a 1-based list number or a repertoire id.
fn resolve_repertoire<S: Storage>(app: &TrainerApp<S>, key: &str) -> Result<String> {
    let repertoires = &app.state().repertoires;
    if let Ok(n) = key.parse::<usize>() {
        if let Some(r) = n.checked_sub(1).and_then(|i| repertoires.get(i)) {
            return Ok(r.id.clone());
        }
    }
    repertoires
        .iter()
        .find(|r| r.id == key)
        .map(|r| r.id.clone())
        .ok_or_else(|| TrainerError::repertoire_not_found(key).into())
}

/// Ask the rules engine what `notation` means in the cursor position.
fn resolve_move<S: Storage>(app: &TrainerApp<S>, notation: &str) -> Result<MoveRecord> {
    let node = app
        .state()
        .current_node()
        .ok_or_else(|| anyhow!("select a repertoire first"))?;
    let board = Board::from_fen(&node.fen)?;
    Ok(board.play(notation)?)
}

fn describe_position<S: Storage>(app: &TrainerApp<S>) -> String {
    let state = app.state();
    let Some(node) = state.current_node() else {
        return "no repertoire selected".to_string();
    };
    let line = state.current_line();
    let mut out = format!(
        "[{}] {}\n  {}",
        node.id,
        if line.is_empty() { "(start)" } else { line.as_str() },
        node.fen
    );
    let moves = state.current_moves();
    if !moves.is_empty() {
        let labels: Vec<String> = moves
            .iter()
            .map(|m| {
                let mark = if m.is_main_line { "*" } else { "" };
                format!("{}{}", m.label(), mark)
            })
            .collect();
        let _ = write!(out, "\n  next: {}", labels.join(", "));
    }
    out
}

/// Run one command against the app and return the text to show.
pub async fn execute<S: Storage>(app: &mut TrainerApp<S>, command: Command) -> Result<String> {
    let reply = match command {
        Command::New { perspective, name } => {
            let name = name.join(" ");
            let id = app.create_repertoire(&name, perspective);
            app.select_repertoire(&id)?;
            format!("created {} ({}, {})", name, perspective, id)
        }
        Command::List => {
            let state = app.state();
            if state.repertoires.is_empty() {
                "no repertoires yet".to_string()
            } else {
                let mut out = String::new();
                for (i, r) in state.repertoires.iter().enumerate() {
                    let marker = if state.selected_repertoire_id.as_deref() == Some(r.id.as_str()) {
                        ">"
                    } else {
                        " "
                    };
                    let _ = writeln!(
                        out,
                        "{} {}. {} ({}, {} positions) {}",
                        marker,
                        i + 1,
                        r.name,
                        r.perspective,
                        r.node_count(),
                        r.id
                    );
                }
                out.trim_end().to_string()
            }
        }
        Command::Select { repertoire } => {
            let id = resolve_repertoire(app, &repertoire)?;
            app.select_repertoire(&id)?;
            describe_position(app)
        }
        Command::Delete { repertoire } => {
            let id = resolve_repertoire(app, &repertoire)?;
            app.delete_repertoire(&id)?;
            format!("deleted {}", id)
        }
        Command::Rename { name } => {
            let name = name.join(" ");
            let id = app
                .state()
                .selected_repertoire_id
                .clone()
                .ok_or_else(|| anyhow!("select a repertoire first"))?;
            app.rename_repertoire(&id, &name)?;
            format!("renamed to {}", name)
        }
        Command::Play { notation } => {
            let record = resolve_move(app, &notation)?;
            let known = app
                .state()
                .current_node()
                .map_or(false, |n| n.find_move(&record.uci).is_some());
            if known {
                app.play_move(&record.uci)?;
            } else {
                app.record_move(&record)?;
            }
            describe_position(app)
        }
        Command::Back => {
            app.go_to_parent();
            describe_position(app)
        }
        Command::Root => {
            app.go_to_root();
            describe_position(app)
        }
        Command::Goto { node_id } => {
            app.navigate_to_position(&node_id)?;
            describe_position(app)
        }
        Command::Moves | Command::Line => describe_position(app),
        Command::MainLine { notation } => {
            let record = resolve_move(app, &notation)?;
            let state = app.state();
            let (Some(repertoire_id), Some(node_id)) = (
                state.selected_repertoire_id.clone(),
                state.current_position_node_id.clone(),
            ) else {
                bail!("select a repertoire first");
            };
            app.set_main_line(&repertoire_id, &node_id, &record.uci)?;
            describe_position(app)
        }
        Command::Light { color } => {
            app.set_light_color(&color);
            format!("theme: {}", app.current_theme().name())
        }
        Command::Dark { color } => {
            app.set_dark_color(&color);
            format!("theme: {}", app.current_theme().name())
        }
        Command::Size { px } => format!("board size: {}px", app.set_board_size(px)),
        Command::Theme { name: None } => {
            let theme = app.current_theme();
            let names: Vec<&str> = ThemeKey::all().iter().map(|k| k.label()).collect();
            format!(
                "current: {} ({} / {})\navailable: {}",
                theme.name(),
                theme.light(),
                theme.dark(),
                names.join(", ")
            )
        }
        Command::Theme { name: Some(name) } => {
            let key = app.set_theme(&name)?;
            format!("theme: {}", key)
        }
        Command::Export { path } => {
            let path = expand(&path);
            app.export_to_file(&path)?;
            format!("exported to {}", path.display())
        }
        Command::Import { path } => {
            let source = FileImportSource::new(path.as_deref().map(expand));
            match app.import_state(&source).await? {
                ImportOutcome::Replaced => format!(
                    "imported {} repertoire(s)",
                    app.state().repertoires.len()
                ),
                ImportOutcome::Cancelled => "import cancelled".to_string(),
            }
        }
        Command::Reset { confirm } => {
            if app.reset_state(|| confirm) {
                "state reset to defaults".to_string()
            } else {
                "not reset; run \"reset --confirm\" to erase everything".to_string()
            }
        }
        Command::Quit => String::new(),
    };
    Ok(reply)
}
