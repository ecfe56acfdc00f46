//! App: terminal init, frame loop, key handling.

use crate::game::GameState;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::info;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Frame-rate bounds; `--fps` is clamped into this range.
const MIN_FPS: f64 = 10.0;
const MAX_FPS: f64 = 240.0;

/// Whether the loop should keep going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    args: Args,
    theme: Theme,
    state: GameState,
    paused: bool,
    frame_duration: Duration,
    last_frame: Instant,
    /// TachyonFX fade over the board once the game is over.
    game_over_effect: Option<Effect>,
    /// Last time the game-over effect was processed (for delta).
    game_over_effect_time: Option<Instant>,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Self {
        let fps = if args.fps.is_finite() {
            args.fps.clamp(MIN_FPS, MAX_FPS)
        } else {
            60.0
        };
        Self {
            theme,
            state: GameState::new_game(&config),
            paused: false,
            frame_duration: Duration::from_secs_f64(1.0 / fps),
            last_frame: Instant::now(),
            game_over_effect: None,
            game_over_effect_time: None,
            args,
        }
    }

    /// Swap in a fresh session. Only honoured once the game is over.
    fn restart(&mut self) {
        if !self.state.is_over() {
            return;
        }
        self.state = self.state.restart();
        self.paused = false;
        self.game_over_effect = None;
        self.game_over_effect_time = None;
        self.last_frame = Instant::now();
    }

    /// Route one action to the engine (or to the loop itself).
    pub fn apply_action(&mut self, action: Action) -> Flow {
        match action {
            Action::Quit => return Flow::Quit,
            Action::Pause => {
                if !self.state.is_over() {
                    self.paused = !self.paused;
                }
            }
            Action::Restart => self.restart(),
            _ if self.paused => {}
            Action::MoveLeft => {
                self.state.try_move(-1, 0);
            }
            Action::MoveRight => {
                self.state.try_move(1, 0);
            }
            Action::SoftDrop => {
                self.state.try_move(0, 1);
            }
            Action::Rotate => {
                self.state.try_rotate();
            }
            Action::HardDrop => self.state.hard_drop(),
            Action::None => {}
        }
        Flow::Continue
    }

    /// Gravity for the time since the previous frame. Paused frames still
    /// consume their time so resuming does not drop the piece.
    fn tick(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        if !self.paused {
            self.state.advance(dt);
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        info!("terminal ready, {:?} per frame", self.frame_duration);

        let result = ratatui::Terminal::new(ratatui::backend::CrosstermBackend::new(stdout))
            .map_err(anyhow::Error::from)
            .and_then(|mut terminal| {
                terminal.hide_cursor()?;
                self.run_loop(&mut terminal)
            });

        // Restore
        let mut stdout = std::io::stdout();
        let _ = execute!(stdout, crossterm::cursor::Show);
        execute!(stdout, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        info!("exit with score {}", self.state.progression.score);

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.last_frame = Instant::now();
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &self.state,
                    &self.theme,
                    self.paused,
                    &mut self.game_over_effect,
                    &mut self.game_over_effect_time,
                    now,
                    self.args.no_animation,
                );
            })?;

            let timeout = self.frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Presses and OS auto-repeat move the piece; releases do not.
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        if self.apply_action(key_to_action(key)) == Flow::Quit {
                            return Ok(());
                        }
                    }
                }
            }

            // Input first, then gravity for this frame.
            self.tick(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::game::Status;
    use crate::piece::{Piece, PieceKind};
    use clap::Parser;

    fn app() -> App {
        let args = Args::parse_from(["tetrixtui", "--seed", "3"]);
        let config = GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        };
        App::new(args, config, Theme::default())
    }

    fn o_piece(x: i32, y: i32) -> Piece {
        Piece {
            x,
            y,
            ..Piece::spawn(PieceKind::O, 10)
        }
    }

    #[test]
    fn test_moves_reach_engine() {
        let mut app = app();
        app.state.active = o_piece(4, 0);
        assert_eq!(app.apply_action(Action::MoveLeft), Flow::Continue);
        assert_eq!(app.state.active.x, 3);
        app.apply_action(Action::MoveRight);
        app.apply_action(Action::MoveRight);
        assert_eq!(app.state.active.x, 5);
        app.apply_action(Action::SoftDrop);
        assert_eq!(app.state.active.y, 1);
    }

    #[test]
    fn test_hard_drop_locks() {
        let mut app = app();
        app.state.active = o_piece(0, 0);
        app.apply_action(Action::HardDrop);
        assert_eq!(app.state.board.get(0, 19), Some(Cell::Filled(PieceKind::O)));
    }

    #[test]
    fn test_pause_blocks_moves_and_gravity() {
        let mut app = app();
        app.state.active = o_piece(4, 0);
        app.apply_action(Action::Pause);
        app.apply_action(Action::MoveLeft);
        assert_eq!(app.state.active.x, 4);

        let later = app.last_frame + Duration::from_secs(2);
        app.tick(later);
        assert_eq!(app.state.active.y, 0);

        app.apply_action(Action::Pause);
        app.tick(later + Duration::from_millis(500));
        assert_eq!(app.state.active.y, 1);
    }

    #[test]
    fn test_restart_only_after_game_over() {
        let mut app = app();
        app.state.board.set(0, 19, Cell::Filled(PieceKind::T));
        app.apply_action(Action::Restart);
        assert!(!app.state.board.is_empty());

        app.state.progression.status = Status::GameOver;
        app.state.progression.score = 500;
        app.apply_action(Action::Restart);
        assert!(app.state.board.is_empty());
        assert_eq!(app.state.progression.score, 0);
        assert!(!app.state.is_over());
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert_eq!(app.apply_action(Action::Quit), Flow::Quit);
    }

    #[test]
    fn test_fps_is_clamped() {
        let args = Args::parse_from(["tetrixtui", "--fps", "1000"]);
        let app = App::new(args, GameConfig::default(), Theme::default());
        assert_eq!(app.frame_duration, Duration::from_secs_f64(1.0 / MAX_FPS));
    }
}
