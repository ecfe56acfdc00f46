//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use crate::piece::PieceKind;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark piece colours, indexed by [`PieceKind::index`]:
/// cyan, yellow, magenta, blue, orange, green, red.
const ONEDARK_PIECES: [Color; 7] = [
    Color::Rgb(0x56, 0xB6, 0xC2),
    Color::Rgb(0xE5, 0xC0, 0x7B),
    Color::Rgb(0xC6, 0x78, 0xDD),
    Color::Rgb(0x61, 0xAF, 0xEF),
    Color::Rgb(0xD1, 0x9A, 0x66),
    Color::Rgb(0x98, 0xC3, 0x79),
    Color::Rgb(0xE0, 0x6C, 0x75),
];

/// Theme keys read for each piece colour, in [`PieceKind::index`] order.
const PIECE_KEYS: [&[&str]; 7] = [
    &["hi_fg", "proc_misc"],
    &["title", "cpu_mid"],
    &["net_box"],
    &["cpu_box"],
    &["temp_mid", "download_mid"],
    &["mem_box", "cpu_start"],
    &["cpu_end", "temp_end"],
];

/// Piece colours and UI colours loaded from a theme file.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Borders.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Empty-cell dots and help text.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    pub fn onedark_default() -> Self {
        Self {
            pieces: ONEDARK_PIECES,
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// With no path the One Dark defaults are used. Keys missing from the file fall back
    /// to the defaults. `palette` then overrides the piece colours if not Normal.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            None => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override piece colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.pieces = [
                    Color::Rgb(0x00, 0xFF, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0x88, 0x00),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0x00),
                ];
            }
            Palette::Colorblind => {
                // Paul Tol's bright/vibrant sets: no red/green pair carries meaning alone.
                self.pieces = [
                    Color::Rgb(0x33, 0xBB, 0xEE),
                    Color::Rgb(0xCC, 0xBB, 0x44),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0xCC, 0x33, 0x11),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let defaults = Self::onedark_default();
        let mut pieces = defaults.pieces;
        for (slot, keys) in pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(c) = keys.iter().find_map(|&k| get(k)) {
                *slot = c;
            }
        }
        Self {
            pieces,
            bg: get("main_bg").or_else(|| get("meter_bg")).unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
        }
    }

    #[inline]
    pub fn piece_color(&self, kind: PieceKind) -> Color {
        self.pieces[kind.index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| invalid());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let (r, g, b) = match s.len() {
        6 => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex("#12345"), Err(ThemeError::InvalidHex(_))));
        assert!(parse_hex("#GG0000").is_err());
        assert!(parse_hex("#ééé").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_from_map_overrides_and_falls_back() {
        let map = parse_theme_file(
            r##"
            # comment
            theme[hi_fg]="#010203"
            theme[main_bg]='#000000'
            "##,
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.piece_color(PieceKind::I), Color::Rgb(1, 2, 3));
        assert_eq!(theme.bg, Color::Rgb(0, 0, 0));
        assert_eq!(theme.piece_color(PieceKind::Z), ONEDARK_PIECES[6]);
        assert_eq!(theme.main_fg, Theme::default().main_fg);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let err = Theme::load(Some(Path::new("/nonexistent/theme")), Palette::Normal);
        assert!(matches!(err, Err(ThemeError::Io(_))));
    }

    #[test]
    fn test_palettes_change_piece_colours_only() {
        let normal = Theme::load(None, Palette::Normal).unwrap();
        let contrast = Theme::load(None, Palette::HighContrast).unwrap();
        assert_eq!(normal, Theme::default());
        assert_ne!(normal.pieces, contrast.pieces);
        assert_eq!(normal.bg, contrast.bg);
    }
}
