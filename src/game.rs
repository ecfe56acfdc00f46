//! Game state: board, active and next piece, gravity, locking, scoring and levels.

use crate::GameConfig;
use crate::board::Board;
use crate::piece::Piece;
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

/// Gravity interval at level 1.
pub const BASE_FALL_INTERVAL: Duration = Duration::from_millis(500);

/// Gravity gets this much faster per level.
pub const FALL_INTERVAL_STEP: Duration = Duration::from_millis(50);

/// Fastest gravity, reached at level 10.
pub const MIN_FALL_INTERVAL: Duration = Duration::from_millis(50);

pub const LINES_PER_LEVEL: u32 = 10;

/// Single-line clear at level 1; multi-line clears scale with the square of the count.
pub const LINE_CLEAR_BASE_SCORE: u32 = 100;

pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Level for a total number of cleared lines (starts at 1).
pub fn level_for_lines(lines_cleared: u32) -> u32 {
    lines_cleared / LINES_PER_LEVEL + 1
}

/// Gravity interval for a level: 500 ms, minus 50 ms per level, floored at 50 ms.
pub fn fall_interval_for_level(level: u32) -> Duration {
    let step = FALL_INTERVAL_STEP.saturating_mul(level.saturating_sub(1));
    BASE_FALL_INTERVAL.saturating_sub(step).max(MIN_FALL_INTERVAL)
}

/// Points for clearing `rows` lines at once at `level`: rows² × 100 × level.
pub fn line_clear_score(rows: u32, level: u32) -> u32 {
    rows.saturating_mul(rows)
        .saturating_mul(LINE_CLEAR_BASE_SCORE)
        .saturating_mul(level)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    GameOver,
}

/// Score, lines, level and the gravity timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    pub score: u32,
    pub lines_cleared: u32,
    pub level: u32,
    pub fall_interval: Duration,
    /// Time since gravity last fired.
    pub fall_elapsed: Duration,
    pub status: Status,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            score: 0,
            lines_cleared: 0,
            level: 1,
            fall_interval: BASE_FALL_INTERVAL,
            fall_elapsed: Duration::ZERO,
            status: Status::Playing,
        }
    }
}

/// One game session. Restarting builds a new value (see [`GameState::restart`]).
#[derive(Debug)]
pub struct GameState {
    pub board: Board,
    pub active: Piece,
    /// Queued piece, shown in the preview.
    pub next: Piece,
    pub progression: Progression,
    config: GameConfig,
    rng: StdRng,
}

impl GameState {
    /// Empty board, two random pieces, level 1.
    pub fn new_game(config: &GameConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let board = Board::new(config.width, config.height);
        let active = Piece::random(&mut rng, board.width());
        let next = Piece::random(&mut rng, board.width());
        info!(
            "new game: {}x{} board, seed {:?}",
            board.width(),
            board.height(),
            config.seed
        );
        Self {
            board,
            active,
            next,
            progression: Progression::default(),
            config: config.clone(),
            rng,
        }
    }

    /// A fresh session with the same configuration. The caller swaps it in.
    pub fn restart(&self) -> Self {
        info!(
            "restart after score {} ({} lines)",
            self.progression.score, self.progression.lines_cleared
        );
        Self::new_game(&self.config)
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.progression.status == Status::GameOver
    }

    /// Whether `piece` shifted by (dx, dy) fits the board.
    pub fn is_valid(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        self.board.can_place(&piece.shape, piece.x + dx, piece.y + dy)
    }

    /// Shift the active piece if the target position is valid.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.is_over() || !self.is_valid(&self.active, dx, dy) {
            return false;
        }
        self.active.x += dx;
        self.active.y += dy;
        true
    }

    /// Rotate the active piece clockwise in place. No kicks: a blocked
    /// rotation is rejected and the old shape kept.
    pub fn try_rotate(&mut self) -> bool {
        if self.is_over() {
            return false;
        }
        let candidate = Piece {
            shape: self.active.rotate(),
            ..self.active
        };
        if !self.is_valid(&candidate, 0, 0) {
            return false;
        }
        self.active = candidate;
        true
    }

    /// Drop to the lowest valid row, 2 points per row, then lock.
    pub fn hard_drop(&mut self) {
        if self.is_over() {
            return;
        }
        while self.is_valid(&self.active, 0, 1) {
            self.active.y += 1;
            self.progression.score = self
                .progression
                .score
                .saturating_add(HARD_DROP_POINTS_PER_ROW);
        }
        self.lock();
    }

    /// Commit the active piece to the board, clear lines, promote the next
    /// piece and queue a new one. Ends the game if the promoted piece does not fit.
    pub fn lock(&mut self) {
        if self.is_over() {
            return;
        }
        debug_assert!(
            self.is_valid(&self.active, 0, 0),
            "locking a piece that overlaps the board"
        );
        self.board.lock(&self.active);
        debug!(
            "locked {} at ({}, {})",
            self.active.kind.name(),
            self.active.x,
            self.active.y
        );
        self.clear_lines();

        let queued = Piece::random(&mut self.rng, self.board.width());
        self.active = std::mem::replace(&mut self.next, queued);

        if !self.is_valid(&self.active, 0, 0) {
            self.progression.status = Status::GameOver;
            info!(
                "game over: score {}, {} lines, level {}",
                self.progression.score, self.progression.lines_cleared, self.progression.level
            );
        }
    }

    /// Remove complete rows and score them. Returns how many rows were cleared.
    pub fn clear_lines(&mut self) -> u32 {
        let cleared = self.board.clear_full_rows();
        if cleared.is_empty() {
            return 0;
        }
        let rows = cleared.len() as u32;
        let p = &mut self.progression;
        let points = line_clear_score(rows, p.level);
        p.score = p.score.saturating_add(points);
        p.lines_cleared = p.lines_cleared.saturating_add(rows);

        let level = level_for_lines(p.lines_cleared);
        if level != p.level {
            info!("level {} -> {}", p.level, level);
        }
        p.level = level;
        p.fall_interval = fall_interval_for_level(level);
        debug!("cleared rows {:?} for {} points", cleared, points);
        rows
    }

    /// Feed frame time into gravity. Once the fall interval is reached the timer
    /// resets and the piece moves down one row, locking if it cannot.
    pub fn advance(&mut self, dt: Duration) {
        if self.is_over() {
            return;
        }
        let p = &mut self.progression;
        p.fall_elapsed = p.fall_elapsed.saturating_add(dt);
        if p.fall_elapsed < p.fall_interval {
            return;
        }
        p.fall_elapsed = Duration::ZERO;
        if !self.try_move(0, 1) {
            self.lock();
        }
    }
}
