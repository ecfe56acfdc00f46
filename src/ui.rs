//! Layout and drawing: playfield, active piece, next preview, stats, pause and game over.

use crate::board::{Board, Cell};
use crate::game::GameState;
use crate::piece::Piece;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each board cell is two terminal columns wide so it looks square.
const CELL_WIDTH: u16 = 2;
const FILLED: &str = "██";
const EMPTY: &str = " ·";

const SIDEBAR_WIDTH: u16 = 22;
/// Next (6) + gap + Stats (5) + gap + Keys (8).
const SIDEBAR_HEIGHT: u16 = 21;

/// Duration of the game-over fade (TachyonFX).
const GAME_OVER_FADE_MS: u32 = 600;

/// Playfield size in terminal cells, border included.
fn playfield_size(board: &Board) -> (u16, u16) {
    (
        board.width() as u16 * CELL_WIDTH + 2,
        board.height() as u16 + 2,
    )
}

/// Smallest terminal (cols, rows) that fits the playfield and sidebar.
pub fn required_size(board: &Board) -> (u16, u16) {
    let (pw, ph) = playfield_size(board);
    (pw + SIDEBAR_WIDTH, ph.max(SIDEBAR_HEIGHT))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Draw one frame. When the game is over (and animation is on) the board fades
/// out through `game_over_effect`, which is created on first use and advanced
/// by the time since `game_over_effect_time`.
pub fn draw(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    paused: bool,
    game_over_effect: &mut Option<Effect>,
    game_over_effect_time: &mut Option<Instant>,
    now: Instant,
    no_animation: bool,
) {
    let area = frame.area();
    let (total_w, total_h) = required_size(&state.board);
    if area.width < total_w || area.height < total_h {
        draw_too_small(frame, theme, area, total_w, total_h);
        return;
    }

    let active_area = centered(area, total_w, total_h);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(total_w - SIDEBAR_WIDTH),
            Constraint::Length(SIDEBAR_WIDTH),
        ])
        .split(active_area);
    let (_, ph) = playfield_size(&state.board);
    let playfield_area = Rect {
        height: ph,
        ..chunks[0]
    };

    let board_rect = draw_playfield(frame, state, theme, playfield_area);
    draw_sidebar(frame, state, theme, chunks[1]);

    if state.is_over() {
        if !no_animation {
            apply_game_over_effect(
                frame,
                theme,
                board_rect,
                game_over_effect,
                game_over_effect_time,
                now,
            );
        }
        draw_game_over(frame, state, theme, active_area);
    } else if paused {
        draw_pause_overlay(frame, theme, active_area);
    }
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect, need_w: u16, need_h: u16) {
    let lines = vec![
        Line::from(Span::styled("Terminal too small", Style::default().fg(theme.title))),
        Line::from(Span::styled(
            format!("need {}x{}, have {}x{}", need_w, need_h, area.width, area.height),
            Style::default().fg(theme.main_fg),
        )),
    ];
    let rect = centered(area, area.width, 2);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(rect, frame.buffer_mut());
}

/// Board border, locked cells and the active piece. Returns the inner board rect.
fn draw_playfield(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Tetrixtui ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let board = &state.board;
    let buf = frame.buffer_mut();
    for (y, row) in board.rows().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            let rx = inner.x + x as u16 * CELL_WIDTH;
            let ry = inner.y + y as u16;
            if rx + CELL_WIDTH > inner.x + inner.width || ry >= inner.y + inner.height {
                continue;
            }
            let (symbol, style) = if covers(&state.active, x, y) {
                filled_style(theme.piece_color(state.active.kind), theme)
            } else {
                match cell {
                    Cell::Filled(kind) => filled_style(theme.piece_color(kind), theme),
                    Cell::Empty => (EMPTY, Style::default().fg(theme.inactive_fg).bg(theme.bg)),
                }
            };
            buf.set_string(rx, ry, symbol, style);
        }
    }
    inner
}

fn covers(piece: &Piece, x: usize, y: usize) -> bool {
    piece
        .cells()
        .any(|(px, py)| px == x as i32 && py == y as i32)
}

fn filled_style(color: Color, theme: &Theme) -> (&'static str, Style) {
    (FILLED, Style::default().fg(color).bg(theme.bg))
}

/// Create or advance the game-over fade (TachyonFX: board fades to background).
fn apply_game_over_effect(
    frame: &mut Frame,
    theme: &Theme,
    board_rect: Rect,
    effect: &mut Option<Effect>,
    process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *process_time = Some(now);

    let effect = effect.get_or_insert_with(|| {
        fx::fade_to(
            theme.inactive_fg,
            theme.bg,
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_area(board_rect)
    });
    frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
}

fn section(frame: &mut Frame, theme: &Theme, area: Rect, title: &str) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(format!(" {title} "), theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    inner
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Next (border + preview)
            Constraint::Length(1), // gap
            Constraint::Length(5), // Stats (border + score, level, lines)
            Constraint::Length(1), // gap
            Constraint::Length(8), // Keys
        ])
        .split(area);

    let next_inner = section(frame, theme, chunks[0], "Next");
    draw_next_preview(frame, theme, &state.next, next_inner);

    let stats_inner = section(frame, theme, chunks[2], "Stats");
    let label = Style::default().fg(theme.title);
    let value = Style::default().fg(theme.main_fg);
    let p = &state.progression;
    let stats = vec![
        Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(p.score.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Level: ", label),
            Span::styled(p.level.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", label),
            Span::styled(p.lines_cleared.to_string(), value),
        ]),
    ];
    Paragraph::new(Text::from(stats)).render(stats_inner, frame.buffer_mut());

    let keys_inner = section(frame, theme, chunks[4], "Keys");
    let help = Style::default().fg(theme.inactive_fg);
    let keys = [
        ("←→ h l", "move"),
        ("↑ k x", "rotate"),
        ("↓ j", "soft drop"),
        ("space", "hard drop"),
        ("p", "pause"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:<7}"), label),
                Span::styled(*what, help),
            ])
        })
        .collect();
    Paragraph::new(lines).render(keys_inner, frame.buffer_mut());
}

/// Queued piece in spawn orientation, centered in `area`.
fn draw_next_preview(frame: &mut Frame, theme: &Theme, piece: &Piece, area: Rect) {
    let shape = &piece.shape;
    let w = shape.cols() as u16 * CELL_WIDTH;
    let h = shape.rows() as u16;
    let origin = centered(area, w, h);
    let style = Style::default().fg(theme.piece_color(piece.kind)).bg(theme.bg);
    let buf = frame.buffer_mut();
    for (r, c) in shape.occupied() {
        let rx = origin.x + c as u16 * CELL_WIDTH;
        let ry = origin.y + r as u16;
        if rx + CELL_WIDTH <= area.x + area.width && ry < area.y + area.height {
            buf.set_string(rx, ry, FILLED, style);
        }
    }
}

fn popup(frame: &mut Frame, theme: &Theme, rect: Rect, lines: Vec<Line>) {
    Clear.render(rect, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(rect, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    popup(frame, theme, centered(area, 28, 6), lines);
}

fn draw_game_over(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let fg = Style::default().fg(theme.main_fg);
    let p = &state.progression;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", p.score), fg)),
        Line::from(Span::styled(format!(" Lines: {} ", p.lines_cleared), fg)),
        Line::from(Span::styled(format!(" Level: {} ", p.level), fg)),
        Line::from(""),
        Line::from(Span::styled(" R — Restart    Q — Quit ", fg)),
    ];
    popup(frame, theme, centered(area, 30, 10), lines);
}
