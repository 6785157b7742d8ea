//! The pending frame, stored in physical strip order, and a logical [`Frame`] snapshot type.
//!
//! [`Surface`] is what [`LedMatrix`](crate::matrix::LedMatrix) draws into. Writes land in the
//! serpentine strip order the hardware expects, so a flush is a single copy. Positions off the
//! panel are silently ignored, both for direct pixel writes and for
//! [`embedded-graphics`](https://docs.rs/embedded-graphics) drawing.
//!
//! [`Frame`] holds the same pixels in row/column order, which is easier to build by hand,
//! compare in tests, and preview on the host.

pub mod layout;

use core::convert::Infallible;
use core::ops::{Deref, DerefMut, Index, IndexMut};

use embedded_graphics::{
    Pixel,
    pixelcolor::Rgb888,
    prelude::{DrawTarget, OriginDimensions, Point, RgbColor, Size},
};
use smart_leds::RGB8;

use crate::color::{self, BLACK};
use layout::Serpentine;

/// Convert `Rgb888` (embedded-graphics) to `RGB8` (smart-leds).
#[must_use]
pub fn rgb888_to_rgb8(color: Rgb888) -> RGB8 {
    RGB8::new(color.r(), color.g(), color.b())
}

/// Convert `RGB8` (smart-leds) to `Rgb888` (embedded-graphics).
#[must_use]
pub const fn rgb8_to_rgb888(color: RGB8) -> Rgb888 {
    Rgb888::new(color.r, color.g, color.b)
}

/// Pending LED colors for a `ROWS × COLS` serpentine panel, in strip order.
///
/// Each inner array is one run of the strip; flattened, the whole thing is the strip.
/// Embedded-graphics drawing maps `x` to the column and `y` to the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface<const ROWS: usize, const COLS: usize> {
    leds: [[RGB8; COLS]; ROWS],
}

impl<const ROWS: usize, const COLS: usize> Surface<ROWS, COLS> {
    /// Create an all-black surface.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            leds: [[BLACK; COLS]; ROWS],
        }
    }

    /// Write `color` scaled by `brightness` at `(row, col)`.
    ///
    /// Returns `false`, leaving the surface unchanged, when the position is off the panel.
    pub fn set_pixel(&mut self, row: i32, col: i32, color: RGB8, brightness: f32) -> bool {
        let Some(index) = Serpentine::<ROWS, COLS>::index(row, col) else {
            return false;
        };
        match self.leds.as_flattened_mut().get_mut(index) {
            Some(led) => {
                *led = color::scale(color, brightness);
                true
            }
            None => false,
        }
    }

    /// Color at `(row, col)`, or `None` off the panel.
    #[must_use]
    pub fn pixel(&self, row: i32, col: i32) -> Option<RGB8> {
        let index = Serpentine::<ROWS, COLS>::index(row, col)?;
        self.leds.as_flattened().get(index).copied()
    }

    /// Set every LED to `color`.
    pub fn fill(&mut self, color: RGB8) {
        self.leds = [[color; COLS]; ROWS];
    }

    /// Set every LED to black.
    pub fn clear(&mut self) {
        self.fill(BLACK);
    }

    /// All LEDs in strip order.
    #[must_use]
    pub fn strip(&self) -> &[RGB8] {
        self.leds.as_flattened()
    }

    /// All LEDs in strip order, one inner array per run.
    #[must_use]
    pub const fn runs(&self) -> &[[RGB8; COLS]; ROWS] {
        &self.leds
    }

    /// Snapshot in logical row/column order.
    #[must_use]
    pub fn to_frame(&self) -> Frame<ROWS, COLS> {
        let mut frame = Frame::new();
        for (led, (row, col)) in self.strip().iter().zip(Serpentine::<ROWS, COLS>::positions()) {
            frame[(row, col)] = *led;
        }
        frame
    }

    /// Replace every LED with the colors of `frame`.
    pub fn load_frame(&mut self, frame: &Frame<ROWS, COLS>) {
        for (led, (row, col)) in self
            .leds
            .as_flattened_mut()
            .iter_mut()
            .zip(Serpentine::<ROWS, COLS>::positions())
        {
            *led = frame[(row, col)];
        }
    }
}

impl<const ROWS: usize, const COLS: usize> Default for Surface<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const ROWS: usize, const COLS: usize> OriginDimensions for Surface<ROWS, COLS> {
    fn size(&self) -> Size {
        Size::new(COLS as u32, ROWS as u32)
    }
}

impl<const ROWS: usize, const COLS: usize> DrawTarget for Surface<ROWS, COLS> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            self.set_pixel(y, x, rgb888_to_rgb8(color), 1.0);
        }
        Ok(())
    }
}

/// A `ROWS × COLS` grid of LED colors in logical row/column order.
///
/// Index with `frame[(row, col)]`. Drawing with
/// [`embedded-graphics`](https://docs.rs/embedded-graphics) maps `x` to the column and `y`
/// to the row; pixels outside the frame are dropped.
///
/// ```rust
/// use embedded_graphics::{
///     pixelcolor::Rgb888,
///     prelude::*,
///     primitives::{PrimitiveStyle, Rectangle},
/// };
/// use ticker_board::{color, surface::Frame};
///
/// type Panel = Frame<4, 6>;
///
/// let mut frame = Panel::new();
/// Rectangle::new(Point::zero(), Panel::SIZE)
///     .into_styled(PrimitiveStyle::with_stroke(Rgb888::RED, 1))
///     .draw(&mut frame)
///     .expect("frame draws are infallible");
/// frame[(1, 1)] = color::CYAN;
///
/// assert_eq!(frame[(0, 5)], color::RED);
/// assert_eq!(frame[(1, 1)], color::CYAN);
/// assert_eq!(frame[(2, 2)], color::BLACK);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame<const ROWS: usize, const COLS: usize>(pub [[RGB8; COLS]; ROWS]);

impl<const ROWS: usize, const COLS: usize> Frame<ROWS, COLS> {
    /// Frame height in pixels (rows).
    pub const HEIGHT: usize = ROWS;
    /// Frame width in pixels (columns).
    pub const WIDTH: usize = COLS;
    /// Total number of pixels.
    pub const LEN: usize = ROWS * COLS;
    /// Frame dimensions as a [`Size`], for embedded-graphics.
    pub const SIZE: Size = Size::new(COLS as u32, ROWS as u32);

    /// Create a new blank (all black) frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([[BLACK; COLS]; ROWS])
    }

    /// Create a frame filled with a single color.
    #[must_use]
    pub const fn filled(color: RGB8) -> Self {
        Self([[color; COLS]; ROWS])
    }

    /// Number of pixels that are not black.
    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.0.as_flattened().iter().filter(|&&led| led != BLACK).count()
    }
}

impl<const ROWS: usize, const COLS: usize> Deref for Frame<ROWS, COLS> {
    type Target = [[RGB8; COLS]; ROWS];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const ROWS: usize, const COLS: usize> DerefMut for Frame<ROWS, COLS> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const ROWS: usize, const COLS: usize> Index<(usize, usize)> for Frame<ROWS, COLS> {
    type Output = RGB8;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < ROWS, "row must be within height");
        assert!(col < COLS, "col must be within width");
        &self.0[row][col]
    }
}

impl<const ROWS: usize, const COLS: usize> IndexMut<(usize, usize)> for Frame<ROWS, COLS> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(row < ROWS, "row must be within height");
        assert!(col < COLS, "col must be within width");
        &mut self.0[row][col]
    }
}

impl<const ROWS: usize, const COLS: usize> From<[[RGB8; COLS]; ROWS]> for Frame<ROWS, COLS> {
    fn from(array: [[RGB8; COLS]; ROWS]) -> Self {
        Self(array)
    }
}

impl<const ROWS: usize, const COLS: usize> From<&Surface<ROWS, COLS>> for Frame<ROWS, COLS> {
    fn from(surface: &Surface<ROWS, COLS>) -> Self {
        surface.to_frame()
    }
}

impl<const ROWS: usize, const COLS: usize> Default for Frame<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const ROWS: usize, const COLS: usize> OriginDimensions for Frame<ROWS, COLS> {
    fn size(&self) -> Size {
        Self::SIZE
    }
}

impl<const ROWS: usize, const COLS: usize> DrawTarget for Frame<ROWS, COLS> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            let (Ok(row), Ok(col)) = (usize::try_from(y), usize::try_from(x)) else {
                continue;
            };
            if let Some(led) = self.0.get_mut(row).and_then(|cells| cells.get_mut(col)) {
                *led = rgb888_to_rgb8(color);
            }
        }
        Ok(())
    }
}
