//! 7×7 monochrome glyphs for characters and symbols.
//!
//! Character glyphs are rasterized once, when a [`GlyphStore`] is built, from the
//! [`embedded-graphics`](https://docs.rs/embedded-graphics) `FONT_5X7` font, placed one
//! column in from the left of a 7×7 cell so that consecutive glyphs sit two columns apart.
//!
//! Symbol glyphs `0`..=`9` are a fixed table, selected in text with `\0`..`\9`:
//!
//! | id | symbol |
//! |----|--------|
//! | 0 | sun |
//! | 1 | cloud |
//! | 2 | up arrow |
//! | 3 | down arrow |
//! | 4 | left arrow |
//! | 5 | right arrow |
//! | 6 | degree sign |
//! | 7 | raindrop |
//! | 8 | heart |
//! | 9 | alert |

use core::convert::Infallible;

use embedded_graphics::{
    Drawable, Pixel,
    mono_font::{MonoTextStyle, ascii::FONT_5X7},
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Point, Size},
    text::{Baseline, Text},
};

/// Glyph width in pixels. Also the horizontal advance per character.
pub const GLYPH_WIDTH: usize = 7;
/// Glyph height in pixels.
pub const GLYPH_HEIGHT: usize = 7;

const FIRST_PRINTABLE: char = ' ';
const LAST_PRINTABLE: char = '~';
const PRINTABLE_COUNT: usize = LAST_PRINTABLE as usize - FIRST_PRINTABLE as usize + 1;

/// A 7×7 bitmap, one `u8` per row. Bit 6 is column 0, bit 0 is column 6.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph([u8; GLYPH_HEIGHT]);

impl Glyph {
    /// A glyph with no lit pixels.
    pub const BLANK: Self = Self([0; GLYPH_HEIGHT]);

    /// Build a glyph from its rows, top to bottom. Bit 7 of each row is ignored.
    #[must_use]
    pub const fn from_rows(rows: [u8; GLYPH_HEIGHT]) -> Self {
        let mut masked = rows;
        let mut row = 0;
        while row < GLYPH_HEIGHT {
            masked[row] &= 0b0111_1111;
            row += 1;
        }
        Self(masked)
    }

    /// The rows, top to bottom.
    #[must_use]
    pub const fn rows(&self) -> &[u8; GLYPH_HEIGHT] {
        &self.0
    }

    /// Whether the pixel at `(row, col)` is lit. Out-of-range positions are unlit.
    #[must_use]
    pub const fn is_lit(&self, row: usize, col: usize) -> bool {
        if row >= GLYPH_HEIGHT || col >= GLYPH_WIDTH {
            return false;
        }
        self.0[row] & (1 << (GLYPH_WIDTH - 1 - col)) != 0
    }

    /// Whether no pixel is lit.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        let mut row = 0;
        while row < GLYPH_HEIGHT {
            if self.0[row] != 0 {
                return false;
            }
            row += 1;
        }
        true
    }

    /// Lit `(row, col)` positions in row-major order.
    pub fn lit_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..GLYPH_HEIGHT).flat_map(move |row| {
            (0..GLYPH_WIDTH)
                .filter(move |&col| self.is_lit(row, col))
                .map(move |col| (row, col))
        })
    }
}

/// Symbol glyphs, indexed by the digit that follows `\` in text.
pub const SYMBOLS: [Glyph; 10] = [
    // 0: sun
    Glyph::from_rows([
        0b100_1001, 0b010_1010, 0b001_1100, 0b111_1111, 0b001_1100, 0b010_1010, 0b100_1001,
    ]),
    // 1: cloud
    Glyph::from_rows([
        0b000_0000, 0b001_1000, 0b011_1100, 0b011_1110, 0b111_1111, 0b111_1111, 0b000_0000,
    ]),
    // 2: up arrow
    Glyph::from_rows([
        0b000_1000, 0b001_1100, 0b010_1010, 0b100_1001, 0b000_1000, 0b000_1000, 0b000_1000,
    ]),
    // 3: down arrow
    Glyph::from_rows([
        0b000_1000, 0b000_1000, 0b000_1000, 0b100_1001, 0b010_1010, 0b001_1100, 0b000_1000,
    ]),
    // 4: left arrow
    Glyph::from_rows([
        0b000_1000, 0b001_0000, 0b010_0000, 0b111_1111, 0b010_0000, 0b001_0000, 0b000_1000,
    ]),
    // 5: right arrow
    Glyph::from_rows([
        0b000_1000, 0b000_0100, 0b000_0010, 0b111_1111, 0b000_0010, 0b000_0100, 0b000_1000,
    ]),
    // 6: degree sign
    Glyph::from_rows([
        0b011_0000, 0b100_1000, 0b100_1000, 0b011_0000, 0b000_0000, 0b000_0000, 0b000_0000,
    ]),
    // 7: raindrop
    Glyph::from_rows([
        0b000_1000, 0b000_1000, 0b001_0100, 0b010_0010, 0b010_0010, 0b010_0010, 0b001_1100,
    ]),
    // 8: heart
    Glyph::from_rows([
        0b000_0000, 0b011_0110, 0b111_1111, 0b111_1111, 0b011_1110, 0b001_1100, 0b000_1000,
    ]),
    // 9: alert
    Glyph::from_rows([
        0b000_1000, 0b001_0100, 0b001_0100, 0b010_1010, 0b010_0010, 0b100_1001, 0b111_1111,
    ]),
];

/// Character and symbol glyph tables, built once and read-only afterwards.
///
/// ```rust
/// use ticker_board::glyph::{GlyphStore, SYMBOLS};
///
/// let glyphs = GlyphStore::new();
/// assert!(glyphs.char_glyph(' ').is_blank());
/// assert!(!glyphs.char_glyph('A').is_blank());
/// assert_eq!(glyphs.symbol(2), SYMBOLS[2]);
/// ```
#[derive(Clone, Debug)]
pub struct GlyphStore {
    printable: [Glyph; PRINTABLE_COUNT],
}

impl GlyphStore {
    /// Rasterize the printable ASCII range (`' '..='~'`).
    #[must_use]
    pub fn new() -> Self {
        let mut printable = [Glyph::BLANK; PRINTABLE_COUNT];
        for (slot, code) in printable
            .iter_mut()
            .zip(FIRST_PRINTABLE as u32..=LAST_PRINTABLE as u32)
        {
            if let Some(ch) = char::from_u32(code) {
                *slot = rasterize(ch);
            }
        }
        Self { printable }
    }

    /// Glyph for a character. Characters outside printable ASCII are blank.
    #[must_use]
    pub fn char_glyph(&self, ch: char) -> Glyph {
        (ch as usize)
            .checked_sub(FIRST_PRINTABLE as usize)
            .and_then(|offset| self.printable.get(offset))
            .copied()
            .unwrap_or(Glyph::BLANK)
    }

    /// Glyph for a symbol id. Ids past `9` are blank.
    #[must_use]
    pub fn symbol(&self, id: u8) -> Glyph {
        SYMBOLS.get(usize::from(id)).copied().unwrap_or(Glyph::BLANK)
    }
}

impl Default for GlyphStore {
    fn default() -> Self {
        Self::new()
    }
}

fn rasterize(ch: char) -> Glyph {
    let mut canvas = GlyphCanvas::default();
    let mut utf8 = [0u8; 4];
    let style = MonoTextStyle::new(&FONT_5X7, BinaryColor::On);
    let text = Text::with_baseline(ch.encode_utf8(&mut utf8), Point::new(1, 0), style, Baseline::Top);
    let Ok(_) = text.draw(&mut canvas);
    canvas.0
}

/// Mask-only draw target the size of one glyph cell.
#[derive(Default)]
struct GlyphCanvas(Glyph);

impl OriginDimensions for GlyphCanvas {
    fn size(&self) -> Size {
        Size::new(GLYPH_WIDTH as u32, GLYPH_HEIGHT as u32)
    }
}

impl DrawTarget for GlyphCanvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(row), Ok(col)) = (usize::try_from(point.y), usize::try_from(point.x)) else {
                continue;
            };
            if color.is_on() && col < GLYPH_WIDTH {
                if let Some(bits) = self.0.0.get_mut(row) {
                    *bits |= 1 << (GLYPH_WIDTH - 1 - col);
                }
            }
        }
        Ok(())
    }
}
