//! Toroidal offscreen buffer of `(color, brightness)` cells.
//!
//! The buffer is larger than the display it backs, `rows * 7 + 2` by `cols * 2 + 2`
//! (see [`buffer_rows`] and [`buffer_cols`]), so a whole line of glyphs fits above the
//! visible window. The outermost row and column on each side are border cells. Two
//! addressing schemes exist:
//!
//! - **Direct** ([`OffscreenBuffer::set_cell`], [`OffscreenBuffer::cell`]): the full extent,
//!   border included, with no wraparound.
//! - **Wrapped** ([`OffscreenBuffer::wrapped`], text rendering and embedded-graphics drawing,
//!   window copies): coordinate `r` lands on row `(r + 1) mod (BUF_ROWS - 2)`, and likewise for
//!   columns, using Euclidean modulo so negative coordinates wrap too.
//!
//! ```text
//! wrapped row:  -1  0  1  ...  BUF_ROWS-4  BUF_ROWS-3  BUF_ROWS-2
//! stored row:    0  1  2  ...  BUF_ROWS-3      0           1
//! ```

use core::convert::Infallible;
use core::fmt::{self, Write};

use embedded_graphics::{
    Pixel,
    pixelcolor::Rgb888,
    prelude::{DrawTarget, OriginDimensions, Point, Size},
};
use smart_leds::RGB8;

use crate::color::BLACK;
use crate::surface::rgb888_to_rgb8;

/// Buffer rows per display row.
pub const BUFFER_ROW_SCALE: usize = 7;
/// Buffer columns per display column.
pub const BUFFER_COL_SCALE: usize = 2;
/// Border cells added to each buffer dimension (one per side).
pub const BUFFER_BORDER: usize = 2;

/// Buffer row count for a display with `rows` rows.
#[must_use]
pub const fn buffer_rows(rows: usize) -> usize {
    rows * BUFFER_ROW_SCALE + BUFFER_BORDER
}

/// Buffer column count for a display with `cols` columns.
#[must_use]
pub const fn buffer_cols(cols: usize) -> usize {
    cols * BUFFER_COL_SCALE + BUFFER_BORDER
}

/// One buffer cell: a color and the brightness it is shown at.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell {
    /// Cell color.
    pub color: RGB8,
    /// Brightness multiplier applied when the cell is copied to the display.
    pub brightness: f32,
}

impl Cell {
    /// Black at brightness zero: the state of a fresh or cleared buffer.
    pub const OFF: Self = Self::new(BLACK, 0.0);

    /// Create a cell.
    #[must_use]
    pub const fn new(color: RGB8, brightness: f32) -> Self {
        Self { color, brightness }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::OFF
    }
}

/// A `BUF_ROWS × BUF_COLS` grid of [`Cell`]s with wrapped addressing.
#[derive(Clone, Debug, PartialEq)]
pub struct OffscreenBuffer<const BUF_ROWS: usize, const BUF_COLS: usize> {
    cells: [[Cell; BUF_COLS]; BUF_ROWS],
}

impl<const BUF_ROWS: usize, const BUF_COLS: usize> OffscreenBuffer<BUF_ROWS, BUF_COLS> {
    /// Buffer height in cells, border included.
    pub const ROWS: usize = BUF_ROWS;
    /// Buffer width in cells, border included.
    pub const COLS: usize = BUF_COLS;

    /// Create a buffer with every cell [`Cell::OFF`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [[Cell::OFF; BUF_COLS]; BUF_ROWS],
        }
    }

    /// Write a cell by direct (unwrapped) position.
    ///
    /// Returns `false`, leaving the buffer unchanged, when the position is outside the full
    /// extent.
    pub fn set_cell(&mut self, row: i32, col: i32, color: RGB8, brightness: f32) -> bool {
        match self.cell_mut(row, col) {
            Some(cell) => {
                *cell = Cell::new(color, brightness);
                true
            }
            None => false,
        }
    }

    /// Read a cell by direct (unwrapped) position.
    #[must_use]
    pub fn cell(&self, row: i32, col: i32) -> Option<Cell> {
        let (row, col) = (usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        self.cells.get(row)?.get(col).copied()
    }

    fn cell_mut(&mut self, row: i32, col: i32) -> Option<&mut Cell> {
        let (row, col) = (usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        self.cells.get_mut(row)?.get_mut(col)
    }

    /// Reset every cell to [`Cell::OFF`].
    pub fn clear(&mut self) {
        self.fill(BLACK, 0.0);
    }

    /// Set every cell to `color` at `brightness`.
    pub fn fill(&mut self, color: RGB8, brightness: f32) {
        self.cells = [[Cell::new(color, brightness); BUF_COLS]; BUF_ROWS];
    }

    /// Stored position for a wrapped coordinate.
    ///
    /// `None` only when the buffer is too small to wrap (fewer than 3 rows or columns).
    #[must_use]
    pub fn wrapped(row: i32, col: i32) -> Option<(usize, usize)> {
        let wrap = |coordinate: i32, extent: usize| {
            let period = i32::try_from(extent).ok()?.checked_sub(BUFFER_BORDER as i32)?;
            let wrapped = coordinate.wrapping_add(1).checked_rem_euclid(period)?;
            usize::try_from(wrapped).ok()
        };
        Some((wrap(row, BUF_ROWS)?, wrap(col, BUF_COLS)?))
    }

    /// Read a cell by wrapped position.
    #[must_use]
    pub fn wrapped_cell(&self, row: i32, col: i32) -> Option<Cell> {
        let (row, col) = Self::wrapped(row, col)?;
        self.cells.get(row)?.get(col).copied()
    }

    /// Write a cell by wrapped position. Returns `false` only for unwrappable buffers.
    pub fn set_wrapped(&mut self, row: i32, col: i32, color: RGB8, brightness: f32) -> bool {
        let Some((row, col)) = Self::wrapped(row, col) else {
            return false;
        };
        match self.cells.get_mut(row).and_then(|cells| cells.get_mut(col)) {
            Some(cell) => {
                *cell = Cell::new(color, brightness);
                true
            }
            None => false,
        }
    }

    /// Number of cells that differ from [`Cell::OFF`].
    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.cells
            .as_flattened()
            .iter()
            .filter(|&&cell| cell != Cell::OFF)
            .count()
    }

    /// Write a text picture of the buffer: a header line, then one line per row with `X`
    /// for cells that differ from [`Cell::OFF`] and `-` otherwise.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out`.
    pub fn write_ascii<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "Buffer has {BUF_ROWS} rows and {BUF_COLS} cols")?;
        for cells in &self.cells {
            for cell in cells {
                out.write_char(if *cell == Cell::OFF { '-' } else { 'X' })?;
            }
            out.write_char('\n')?;
        }
        Ok(())
    }
}

impl<const BUF_ROWS: usize, const BUF_COLS: usize> Default for OffscreenBuffer<BUF_ROWS, BUF_COLS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BUF_ROWS: usize, const BUF_COLS: usize> OriginDimensions
    for OffscreenBuffer<BUF_ROWS, BUF_COLS>
{
    fn size(&self) -> Size {
        Size::new(
            BUF_COLS.saturating_sub(BUFFER_BORDER) as u32,
            BUF_ROWS.saturating_sub(BUFFER_BORDER) as u32,
        )
    }
}

/// Drawing uses wrapped addressing at full brightness; `x` is the column, `y` the row.
impl<const BUF_ROWS: usize, const BUF_COLS: usize> DrawTarget
    for OffscreenBuffer<BUF_ROWS, BUF_COLS>
{
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            self.set_wrapped(y, x, rgb888_to_rgb8(color), 1.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, RED, WHITE};

    type Small = OffscreenBuffer<9, 6>;

    #[test]
    fn dimensions_follow_display_size() {
        assert_eq!(buffer_rows(8), 58);
        assert_eq!(buffer_cols(32), 66);
        assert_eq!(buffer_rows(1), 9);
        assert_eq!(buffer_cols(2), 6);
    }

    #[test]
    fn fresh_buffer_is_off() {
        let buffer = Small::new();
        assert_eq!(buffer.cell(0, 0), Some(Cell::OFF));
        assert_eq!(buffer.cell(8, 5), Some(Cell::OFF));
        assert_eq!(buffer.lit_count(), 0);
    }

    #[test]
    fn set_cell_covers_border_without_wrapping() {
        let mut buffer = Small::new();
        assert!(buffer.set_cell(0, 0, RED, 1.0));
        assert!(buffer.set_cell(8, 5, BLUE, 0.5));
        assert!(!buffer.set_cell(9, 0, RED, 1.0));
        assert!(!buffer.set_cell(0, 6, RED, 1.0));
        assert!(!buffer.set_cell(-1, 0, RED, 1.0));
        assert_eq!(buffer.cell(8, 5), Some(Cell::new(BLUE, 0.5)));
        assert_eq!(buffer.lit_count(), 2);
    }

    #[test]
    fn wrapped_addressing_skips_border_period() {
        // 9 rows wrap with period 7, 6 cols with period 4.
        assert_eq!(Small::wrapped(0, 0), Some((1, 1)));
        assert_eq!(Small::wrapped(5, 2), Some((6, 3)));
        assert_eq!(Small::wrapped(6, 3), Some((0, 0)));
        assert_eq!(Small::wrapped(-1, -1), Some((0, 0)));
        assert_eq!(Small::wrapped(-2, -2), Some((6, 3)));
        assert_eq!(Small::wrapped(13, 7), Some((0, 0)));
        assert_eq!(OffscreenBuffer::<2, 2>::wrapped(0, 0), None);
    }

    #[test]
    fn fill_and_clear() {
        let mut buffer = Small::new();
        buffer.fill(WHITE, 0.25);
        assert_eq!(buffer.cell(4, 4), Some(Cell::new(WHITE, 0.25)));
        assert_eq!(buffer.lit_count(), 9 * 6);
        buffer.clear();
        assert_eq!(buffer, Small::new());
    }

    #[test]
    fn fill_black_at_full_brightness_still_counts_as_lit() {
        let mut buffer = Small::new();
        buffer.fill(BLACK, 1.0);
        assert_eq!(buffer.lit_count(), 9 * 6);
    }

    #[test]
    fn ascii_dump_marks_lit_cells() {
        let mut buffer = OffscreenBuffer::<3, 4>::new();
        buffer.set_cell(0, 1, RED, 1.0);
        buffer.set_cell(2, 3, RED, 1.0);
        let mut text = String::new();
        buffer.write_ascii(&mut text).expect("string writes succeed");
        assert_eq!(text, "Buffer has 3 rows and 4 cols\n-X--\n----\n---X\n");
    }

    #[test]
    fn drawing_wraps() {
        let mut buffer = Small::new();
        let Ok(()) = buffer.draw_iter([Pixel(Point::new(-1, 6), Rgb888::new(255, 0, 0))]);
        assert_eq!(buffer.cell(0, 0), Some(Cell::new(RED, 1.0)));
    }
}
