//! Serpentine wiring: mapping between logical `(row, col)` and physical strip index.
//!
//! Coordinates use a screen-style convention: `(0, 0)` is the top-left corner, rows grow
//! downward and columns grow to the right. Row 0 is wired left to right, row 1 right to left,
//! and so on, so the strip snakes through the panel:
//!
//! ```text
//! 3 rows × 4 cols:
//!   LED0   LED1   LED2   LED3
//!   LED7   LED6   LED5   LED4
//!   LED8   LED9   LED10  LED11
//! ```

/// Strip index of `(row, col)` on a `rows × cols` serpentine panel.
///
/// Returns `None` when the position is off the panel. Callers treat `None` as
/// "nothing to draw".
///
/// ```rust
/// use ticker_board::surface::layout::serpentine_index;
///
/// assert_eq!(serpentine_index(0, 3, 3, 4), Some(3));
/// assert_eq!(serpentine_index(1, 3, 3, 4), Some(4)); // odd rows run backwards
/// assert_eq!(serpentine_index(1, 0, 3, 4), Some(7));
/// assert_eq!(serpentine_index(-1, 0, 3, 4), None);
/// assert_eq!(serpentine_index(0, 4, 3, 4), None);
/// ```
#[must_use]
pub const fn serpentine_index(row: i32, col: i32, rows: usize, cols: usize) -> Option<usize> {
    if row < 0 || col < 0 {
        return None;
    }
    let (row, col) = (row as usize, col as usize);
    if row >= rows || col >= cols {
        return None;
    }
    if row % 2 == 0 {
        Some(row * cols + col)
    } else {
        Some(row * cols + (cols - 1 - col))
    }
}

/// Logical `(row, col)` of strip index `index` on a `rows × cols` serpentine panel.
///
/// Inverse of [`serpentine_index`]. Returns `None` past the end of the strip.
#[must_use]
pub const fn serpentine_position(index: usize, rows: usize, cols: usize) -> Option<(usize, usize)> {
    if cols == 0 || index >= rows * cols {
        return None;
    }
    let row = index / cols;
    let offset = index % cols;
    if row % 2 == 0 {
        Some((row, offset))
    } else {
        Some((row, cols - 1 - offset))
    }
}

/// [`serpentine_index`] and [`serpentine_position`] with the panel size fixed at compile time.
///
/// ```rust
/// use ticker_board::surface::layout::Serpentine;
///
/// type Panel = Serpentine<8, 32>;
///
/// assert_eq!(Panel::LEN, 256);
/// assert_eq!(Panel::index(1, 0), Some(63));
/// assert_eq!(Panel::position(63), Some((1, 0)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Serpentine<const ROWS: usize, const COLS: usize>;

impl<const ROWS: usize, const COLS: usize> Serpentine<ROWS, COLS> {
    /// Number of LEDs on the strip.
    pub const LEN: usize = ROWS * COLS;

    /// Strip index of `(row, col)`, or `None` off the panel.
    #[must_use]
    pub const fn index(row: i32, col: i32) -> Option<usize> {
        serpentine_index(row, col, ROWS, COLS)
    }

    /// Logical `(row, col)` of a strip index, or `None` past the end of the strip.
    #[must_use]
    pub const fn position(index: usize) -> Option<(usize, usize)> {
        serpentine_position(index, ROWS, COLS)
    }

    /// Logical positions in strip order.
    pub fn positions() -> impl Iterator<Item = (usize, usize)> {
        (0..Self::LEN).filter_map(Self::position)
    }
}
