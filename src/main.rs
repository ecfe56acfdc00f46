//! Tetrixtui: classic falling-block puzzle game in the terminal.

mod app;
mod board;
mod game;
mod input;
mod piece;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Options derived from CLI that shape a game session (board size, piece sequence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    /// Fixed seed for a reproducible piece sequence; OS entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: board::DEFAULT_WIDTH,
            height: board::DEFAULT_HEIGHT,
            seed: None,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(theme) => theme,
        Err(e) => {
            log::warn!("theme not loaded, using defaults: {e}");
            theme::Theme::default()
        }
    };
    let config = GameConfig {
        width: args.width,
        height: args.height,
        seed: args.seed,
    };
    let mut app = App::new(args, config, theme);
    app.run()?;
    Ok(())
}

/// The terminal belongs to the UI, so logs only ever go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Classic falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tetrixtui",
    version,
    about = "Classic falling-block puzzle in the terminal. Move and rotate falling tetrominoes; full rows clear and score.",
    long_about = "Tetrixtui is a terminal take on the classic falling-block puzzle.\n\n\
        Seven tetrominoes fall into a 10x20 well. Completed rows disappear; clearing \
        several at once scores quadratically more. Every 10 lines raises the level \
        and the fall speed. The game ends when a new piece has no room to spawn.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move       Up, k or x   Rotate CW   Down or j  Soft drop\n  \
        Space/Enter        Hard drop  P            Pause       R          Restart (after game over)\n  \
        Q / Esc            Quit"
)]
pub struct Args {
    /// Playfield width in columns.
    #[arg(long, default_value = "10", value_name = "COLS", value_parser = clap::value_parser!(u16).range(4..=40))]
    pub width: u16,

    /// Playfield height in rows.
    #[arg(long, default_value = "20", value_name = "ROWS", value_parser = clap::value_parser!(u16).range(4..=40))]
    pub height: u16,

    /// Seed for the piece sequence (same seed, same pieces).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Target frames per second of the game loop.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub fps: f64,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the game-over fade.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["tetrixtui"]).unwrap();
        assert_eq!((args.width, args.height), (10, 20));
        assert_eq!(args.seed, None);
        assert_eq!(args.palette, Palette::Normal);
        assert!(!args.no_animation);
    }

    #[test]
    fn test_args_parse_options() {
        let args = Args::try_parse_from([
            "tetrixtui",
            "--width",
            "12",
            "--seed",
            "99",
            "--palette",
            "contrast",
            "--no-animation",
        ])
        .unwrap();
        assert_eq!(args.width, 12);
        assert_eq!(args.seed, Some(99));
        assert_eq!(args.palette, Palette::HighContrast);
        assert!(args.no_animation);
    }

    #[test]
    fn test_board_size_is_bounded() {
        assert!(Args::try_parse_from(["tetrixtui", "--width", "3"]).is_err());
        assert!(Args::try_parse_from(["tetrixtui", "--height", "41"]).is_err());
    }

    #[test]
    fn test_default_config_matches_board() {
        let config = GameConfig::default();
        assert_eq!((config.width, config.height), (10, 20));
    }
}
