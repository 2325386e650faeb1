//! chess-notation - validate, replay and render chess games.
//!
//! Reads PGN files, reports on positions and turns move lists into PGN.
//! Logs go to stderr; stdout carries only command output.

mod config;
mod report;

use anyhow::{bail, Context};
use chess_core::{Move, PieceKind};
use chess_notation::{ChessError, Game, MoveRecord, PgnImporter, Position};
use clap::{Parser, Subcommand};
use config::NotationConfig;
use report::StatusReport;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "chess-notation")]
#[command(about = "Validate, replay and render chess games in PGN")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "chess-notation.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a PGN file is well formed and its moves are legal
    Validate {
        /// PGN file
        file: PathBuf,
    },
    /// Import a PGN file and print it in canonical form
    Export {
        /// PGN file
        file: PathBuf,
        /// Column at which movetext wraps
        #[arg(short, long)]
        width: Option<usize>,
    },
    /// Print the FEN after a ply of a PGN file's main line
    Fen {
        /// PGN file
        file: PathBuf,
        /// Ply to show (default: the last one)
        #[arg(short, long)]
        ply: Option<usize>,
    },
    /// Report check, mate and draw status and the legal moves of a position
    Status {
        /// Position to inspect (default: the starting position)
        #[arg(long)]
        fen: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play moves from a position and print the resulting PGN
    Play {
        /// Starting position (default: the standard one)
        #[arg(long)]
        fen: Option<String>,
        /// Moves in SAN ("Nf3") or coordinates ("g1-f3", "e7-e8=N")
        #[arg(required = true)]
        moves: Vec<String>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config = NotationConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Validate { file } => {
            let text = read_pgn(&file)?;
            let games = match PgnImporter::import_all(&text) {
                Ok(games) if !games.is_empty() => games,
                Ok(_) => {
                    println!("{}: invalid: no games", file.display());
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => {
                    println!("{}: invalid: {}", file.display(), e);
                    return Ok(ExitCode::FAILURE);
                }
            };
            println!("{}: valid ({} game(s))", file.display(), games.len());
        }
        Commands::Export { file, width } => {
            let text = read_pgn(&file)?;
            let games = PgnImporter::import_all(&text)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            let width = width.unwrap_or(config.render.line_width);
            if width == 0 {
                bail!("Line width must be positive");
            }
            let rendered: Vec<String> = games.iter().map(|g| g.render_with_width(width)).collect();
            print!("{}", rendered.join("\n"));
        }
        Commands::Fen { file, ply } => {
            let text = read_pgn(&file)?;
            let game = PgnImporter::import(&text)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            let ply = ply.unwrap_or(game.last_ply());
            println!("{}", game.fen_at(ply)?);
        }
        Commands::Status { fen, json } => {
            let position = match fen {
                Some(fen) => Position::from_fen(&fen)?,
                None => Position::startpos(),
            };
            tracing::info!("Status: {}", report::describe(position.outcome()));
            let report = StatusReport::from_position(&position)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.to_text());
            }
        }
        Commands::Play { fen, moves } => {
            let mut game = match fen {
                Some(fen) => Game::from_fen(&fen)?,
                None => Game::new(),
            };
            config.apply_tags(&mut game)?;
            game.on_move_applied(|record| {
                tracing::debug!("Ply {}: {} -> {}", record.ply, record.san, record.fen)
            });
            for text in &moves {
                play_move(&mut game, text).with_context(|| format!("Failed to play {}", text))?;
            }
            tracing::info!("Played {} move(s)", game.last_ply());
            print!("{}", game.render_with_width(config.render.line_width));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_pgn(path: &Path) -> anyhow::Result<String> {
    tracing::info!("Reading {}", path.display());
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Plays a move written either in coordinates or in SAN.
///
/// Coordinates may carry a promotion piece after `=`, as in `e7-e8=N`.
fn play_move(game: &mut Game, text: &str) -> Result<MoveRecord, ChessError> {
    if let Ok(mv) = Move::parse(text) {
        return game.apply_coordinate_move(mv, None);
    }
    if let Some((coords, letter)) = text.split_once('=') {
        if let Ok(mv) = Move::parse(coords) {
            let promotion = letter
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .and_then(PieceKind::from_san_letter);
            return game.apply_coordinate_move(mv, promotion);
        }
    }
    game.apply_san(text)
}
