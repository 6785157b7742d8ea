//! Escape-aware text rendering with 7×7 glyphs.
//!
//! Text is drawn left to right, one 7-pixel-wide cell per glyph. A backslash starts an
//! escape that consumes exactly one following character:
//!
//! | input | effect | advance |
//! |-------|--------|---------|
//! | `\0` .. `\9` | draw symbol glyph (see [`crate::glyph`]) | 7 |
//! | `\w \r \g \b \y \m \c` | switch the active color ([`EscapeColor`]) | 0 |
//! | `\` + anything else | nothing | 0 |
//! | trailing `\` | nothing | 0 |
//! | any other character | draw its glyph (blank if it has none) | 7 |
//!
//! Remember that `"\\r"` in Rust source is the two characters `\` and `r`.
//!
//! ```rust
//! use ticker_board::{color::EscapeColor, text::{TextToken, Tokens, text_pixel_width}};
//!
//! let tokens: Vec<_> = Tokens::new("\\rA\\2").collect();
//! assert_eq!(
//!     tokens,
//!     [TextToken::Color(EscapeColor::Red), TextToken::Char('A'), TextToken::Symbol(2)]
//! );
//! assert_eq!(text_pixel_width("\\rA\\2", 10), 5 * 7 - 2 * 10);
//! ```

use core::str::Chars;

use embedded_graphics::{
    Pixel,
    pixelcolor::Rgb888,
    prelude::{DrawTarget, Point},
};
use smart_leds::RGB8;

use crate::color::EscapeColor;
use crate::glyph::{GLYPH_WIDTH, Glyph, GlyphStore};
use crate::surface::rgb8_to_rgb888;

/// Escape character inside rendered text.
pub const ESCAPE: char = '\\';

/// Horizontal advance per drawn glyph.
pub const ADVANCE: i32 = GLYPH_WIDTH as i32;

/// One unit of rendered text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextToken {
    /// A character drawn with the active color.
    Char(char),
    /// A symbol glyph (`\0`..`\9`) drawn with the active color.
    Symbol(u8),
    /// Switch the active color.
    Color(EscapeColor),
}

/// Iterator over the [`TextToken`]s of a string. Unknown escapes produce no token.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    chars: Chars<'a>,
}

impl<'a> Tokens<'a> {
    /// Tokenize `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = TextToken;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ch = self.chars.next()?;
            if ch != ESCAPE {
                return Some(TextToken::Char(ch));
            }
            // A trailing lone escape ends the text.
            let key = self.chars.next()?;
            if let Some(digit) = key.to_digit(10) {
                return Some(TextToken::Symbol(digit as u8));
            }
            if let Some(color) = EscapeColor::from_key(key) {
                return Some(TextToken::Color(color));
            }
        }
    }
}

/// Width used to decide when scrolled text has fully left the display.
///
/// Every character, escapes included, counts as one 7-pixel cell; each backslash then takes
/// `len_modifier` pixels back off. Symbols are therefore counted twice and corrected once,
/// which is why the modifier is tunable per animation.
#[must_use]
pub fn text_pixel_width(text: &str, len_modifier: i32) -> i32 {
    let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    let escapes = i32::try_from(text.matches(ESCAPE).count()).unwrap_or(i32::MAX);
    chars
        .saturating_mul(ADVANCE)
        .saturating_sub(escapes.saturating_mul(len_modifier))
}

/// Draw `text` onto `target` with its top-left at `(start_row, start_col)`.
///
/// Pixels that fall outside the target are the target's business; every target in this
/// crate drops them silently. Returns the column just past the last drawn glyph.
///
/// # Errors
///
/// Propagates the target's draw error.
pub fn render_text<D>(
    target: &mut D,
    glyphs: &GlyphStore,
    text: &str,
    color: RGB8,
    start_row: i32,
    start_col: i32,
) -> Result<i32, D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let mut active = color;
    let mut col = start_col;
    for token in Tokens::new(text) {
        let glyph = match token {
            TextToken::Color(escape) => {
                active = escape.color();
                continue;
            }
            TextToken::Symbol(id) => glyphs.symbol(id),
            TextToken::Char(ch) => glyphs.char_glyph(ch),
        };
        draw_glyph(target, glyph, active, start_row, col)?;
        col = col.saturating_add(ADVANCE);
    }
    Ok(col)
}

/// Draw the lit pixels of one glyph with its top-left at `(row, col)`.
///
/// # Errors
///
/// Propagates the target's draw error.
pub fn draw_glyph<D>(
    target: &mut D,
    glyph: Glyph,
    color: RGB8,
    row: i32,
    col: i32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let color = rgb8_to_rgb888(color);
    target.draw_iter(glyph.lit_cells().map(|(glyph_row, glyph_col)| {
        Pixel(
            Point::new(
                col.saturating_add(glyph_col as i32),
                row.saturating_add(glyph_row as i32),
            ),
            color,
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{RED, WHITE, YELLOW};
    use crate::glyph::SYMBOLS;
    use crate::surface::Frame;

    fn tokens(text: &str) -> Vec<TextToken> {
        Tokens::new(text).collect()
    }

    #[test]
    fn escapes_tokenize() {
        assert_eq!(
            tokens("a\\yb\\9"),
            [
                TextToken::Char('a'),
                TextToken::Color(EscapeColor::Yellow),
                TextToken::Char('b'),
                TextToken::Symbol(9),
            ]
        );
    }

    #[test]
    fn unknown_and_trailing_escapes_vanish() {
        assert_eq!(tokens("\\qA"), [TextToken::Char('A')]);
        assert_eq!(tokens("A\\"), [TextToken::Char('A')]);
        assert_eq!(tokens("\\\\A"), [TextToken::Char('A')]);
        assert!(tokens("\\").is_empty());
    }

    #[test]
    fn pixel_width_counts_every_character() {
        assert_eq!(text_pixel_width("", 10), 0);
        assert_eq!(text_pixel_width("AB", 10), 14);
        assert_eq!(text_pixel_width("\\2", 10), 4);
        assert_eq!(text_pixel_width("\\rHI", 14), 14);
    }

    #[test]
    fn color_escape_recolors_following_glyphs_only() {
        let glyphs = GlyphStore::new();
        let mut frame = Frame::<7, 14>::new();
        let Ok(end) = render_text(&mut frame, &glyphs, "\\rAB", WHITE, 0, 0);
        assert_eq!(end, 14);

        let a = glyphs.char_glyph('A');
        let b = glyphs.char_glyph('B');
        for (row, col) in a.lit_cells() {
            assert_eq!(frame[(row, col)], RED);
        }
        for (row, col) in b.lit_cells() {
            assert_eq!(frame[(row, col + 7)], RED);
        }
        assert_eq!(frame.lit_count(), a.lit_cells().count() + b.lit_cells().count());
    }

    #[test]
    fn symbol_escape_draws_symbol_and_advances() {
        let glyphs = GlyphStore::new();
        let mut frame = Frame::<7, 7>::new();
        let Ok(end) = render_text(&mut frame, &glyphs, "\\2", YELLOW, 0, 0);
        assert_eq!(end, 7);
        for row in 0..7 {
            for col in 0..7 {
                let expected = if SYMBOLS[2].is_lit(row, col) {
                    YELLOW
                } else {
                    crate::color::BLACK
                };
                assert_eq!(frame[(row, col)], expected, "({row}, {col})");
            }
        }
    }

    #[test]
    fn unknown_glyph_still_advances() {
        let glyphs = GlyphStore::new();
        let mut frame = Frame::<7, 14>::new();
        let Ok(end) = render_text(&mut frame, &glyphs, "é\\2", WHITE, 0, 0);
        assert_eq!(end, 14);
        assert!(frame[(0, 10)] == WHITE);
        assert_eq!(frame.lit_count(), SYMBOLS[2].lit_cells().count());
    }

    #[test]
    fn offscreen_start_is_clipped() {
        let glyphs = GlyphStore::new();
        let mut frame = Frame::<7, 7>::new();
        let Ok(end) = render_text(&mut frame, &glyphs, "\\2\\2", WHITE, -3, -7);
        assert_eq!(end, 7);
        // Only rows 3..7 of the second arrow remain: its stem plus the wide row.
        assert_eq!(frame.lit_count(), 3 + 3);
        assert_eq!(frame[(0, 0)], WHITE);
    }
}
