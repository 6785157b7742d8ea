//! The LED matrix device abstraction: pending frame, offscreen buffer, text, and output.
//!
//! [`LedMatrix`] ties together a [`Surface`] in strip order, an optional
//! [`OffscreenBuffer`], the glyph tables, your [`LedStrip`] driver, and an
//! [`embedded_hal_async::delay::DelayNs`] used by animations.
//!
//! Drawing calls ([`LedMatrix::set_pixel`], [`LedMatrix::draw_text`], ...) only change the
//! pending frame. Nothing reaches the LEDs until [`LedMatrix::flush`] (or a method that flushes,
//! such as [`LedMatrix::write_text`] or [`LedMatrix::clear`]). The flush applies the matrix
//! brightness and gamma curve through a single lookup table.
//!
//! Every method that draws or animates takes `&mut self`, so only one rendering operation
//! can be in flight per matrix.
//!
//! # Example
//!
//! ```rust
//! use embassy_futures::block_on;
//! use embedded_hal_async::delay::DelayNs;
//! use ticker_board::{RGB8, Result, color, matrix::{LedMatrix, LedStrip, MatrixConfig}};
//!
//! /// Stand-in for a WS2812 driver.
//! struct Wire;
//!
//! impl LedStrip for Wire {
//!     async fn write_pixels(&mut self, pixels: &[RGB8]) -> Result<()> {
//!         assert_eq!(pixels.len(), 8 * 32);
//!         Ok(())
//!     }
//! }
//!
//! struct NoDelay;
//!
//! impl DelayNs for NoDelay {
//!     async fn delay_ns(&mut self, _ns: u32) {}
//! }
//!
//! # fn main() -> Result<()> {
//! let config = MatrixConfig::DEFAULT.with_buffer(false);
//! let mut matrix = LedMatrix::<_, _, 8, 32>::new(Wire, NoDelay, config)?;
//!
//! // Red "Hi" followed by an up arrow.
//! let end_col = block_on(matrix.write_text("\\rHi\\2", color::WHITE, 0, 0))?;
//! assert_eq!(end_col, 21);
//! # Ok(())
//! # }
//! ```

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use smart_leds::RGB8;

use crate::buffer::{OffscreenBuffer, buffer_cols, buffer_rows};
use crate::color::{self, BLACK, Gamma};
use crate::glyph::GlyphStore;
use crate::surface::{Frame, Surface};
use crate::text::render_text;
use crate::{Error, Result};

/// Default LED brightness, as a fraction of full scale.
pub const BRIGHTNESS_DEFAULT: f32 = 0.045;
/// Default wait between animation frames.
pub const FRAME_DELAY_DEFAULT: Duration = Duration::from_millis(30);
/// Default wait after the last frame of an animation.
pub const HOLD_DELAY_DEFAULT: Duration = Duration::from_millis(500);
/// Default gamma curve applied on flush.
pub const GAMMA_DEFAULT: Gamma = Gamma::Linear;

/// Hardware boundary: something that can show one full frame.
///
/// `pixels` is in physical strip order (see [`crate::surface::layout`]) and already scaled by
/// the matrix brightness and gamma curve.
pub trait LedStrip {
    /// Write one full frame to the LEDs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StripWrite`] (or another driver-specific error) if the frame could not
    /// be sent.
    async fn write_pixels(&mut self, pixels: &[RGB8]) -> Result<()>;
}

impl<T: LedStrip + ?Sized> LedStrip for &mut T {
    async fn write_pixels(&mut self, pixels: &[RGB8]) -> Result<()> {
        (**self).write_pixels(pixels).await
    }
}

/// Presentation defaults for a [`LedMatrix`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixConfig {
    /// Output brightness in `[0, 1]` (default: [`BRIGHTNESS_DEFAULT`]).
    pub brightness: f32,
    /// Wait between animation frames (default: [`FRAME_DELAY_DEFAULT`]).
    pub frame_delay: Duration,
    /// Wait after an animation's last frame (default: [`HOLD_DELAY_DEFAULT`]).
    pub hold_delay: Duration,
    /// Gamma curve (default: [`GAMMA_DEFAULT`]).
    pub gamma: Gamma,
    /// Whether the matrix owns an [`OffscreenBuffer`] (default: `true`).
    pub buffer_enabled: bool,
}

impl MatrixConfig {
    /// All defaults, buffer enabled.
    pub const DEFAULT: Self = Self {
        brightness: BRIGHTNESS_DEFAULT,
        frame_delay: FRAME_DELAY_DEFAULT,
        hold_delay: HOLD_DELAY_DEFAULT,
        gamma: GAMMA_DEFAULT,
        buffer_enabled: true,
    };

    /// Replace the brightness.
    #[must_use]
    pub const fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness;
        self
    }

    /// Replace the frame delay.
    #[must_use]
    pub const fn with_frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = frame_delay;
        self
    }

    /// Replace the hold delay.
    #[must_use]
    pub const fn with_hold_delay(mut self, hold_delay: Duration) -> Self {
        self.hold_delay = hold_delay;
        self
    }

    /// Replace the gamma curve.
    #[must_use]
    pub const fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.gamma = gamma;
        self
    }

    /// Enable or disable the offscreen buffer.
    #[must_use]
    pub const fn with_buffer(mut self, buffer_enabled: bool) -> Self {
        self.buffer_enabled = buffer_enabled;
        self
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A `ROWS × COLS` serpentine LED matrix.
///
/// - `S`: the [`LedStrip`] driver.
/// - `D`: the async delay used between animation frames.
/// - `BUF_ROWS`, `BUF_COLS`: offscreen buffer size. When the buffer is enabled they must be
///   [`buffer_rows(ROWS)`](buffer_rows) and [`buffer_cols(COLS)`](buffer_cols), for example
///   `LedMatrix<S, D, 8, 32, 58, 66>`. Leave them at the default `0` for an unbuffered matrix.
///
/// See the [module documentation](mod@crate::matrix) for an example.
pub struct LedMatrix<
    S,
    D,
    const ROWS: usize,
    const COLS: usize,
    const BUF_ROWS: usize = 0,
    const BUF_COLS: usize = 0,
> {
    pub(crate) surface: Surface<ROWS, COLS>,
    pub(crate) glyphs: GlyphStore,
    pub(crate) buffer: Option<OffscreenBuffer<BUF_ROWS, BUF_COLS>>,
    strip: S,
    delay: D,
    brightness: f32,
    gamma: Gamma,
    combo_table: [u8; 256],
    pub(crate) frame_delay: Duration,
    pub(crate) hold_delay: Duration,
}

impl<S, D, const ROWS: usize, const COLS: usize, const BUF_ROWS: usize, const BUF_COLS: usize>
    LedMatrix<S, D, ROWS, COLS, BUF_ROWS, BUF_COLS>
where
    S: LedStrip,
    D: DelayNs,
{
    /// Create a matrix. The pending frame starts black; nothing is written to the strip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferDimensions`] if `config.buffer_enabled` is set and
    /// `BUF_ROWS × BUF_COLS` is not `buffer_rows(ROWS) × buffer_cols(COLS)`.
    pub fn new(strip: S, delay: D, config: MatrixConfig) -> Result<Self> {
        let buffer = if config.buffer_enabled {
            let expected_rows = buffer_rows(ROWS);
            let expected_cols = buffer_cols(COLS);
            if (BUF_ROWS, BUF_COLS) != (expected_rows, expected_cols) {
                return Err(Error::BufferDimensions {
                    expected_rows,
                    expected_cols,
                });
            }
            Some(OffscreenBuffer::new())
        } else {
            None
        };
        info!(
            "LED matrix {}x{}, buffer {}",
            ROWS,
            COLS,
            config.buffer_enabled
        );
        Ok(Self {
            surface: Surface::new(),
            glyphs: GlyphStore::new(),
            buffer,
            strip,
            delay,
            brightness: config.brightness,
            gamma: config.gamma,
            combo_table: color::generate_combo_table(
                config.gamma,
                color::brightness_to_u8(config.brightness),
            ),
            frame_delay: config.frame_delay,
            hold_delay: config.hold_delay,
        })
    }

    // ------------------------------------------------------------------------
    // Display surface
    // ------------------------------------------------------------------------

    /// Write `color` scaled by `brightness` into the pending frame at `(row, col)`.
    ///
    /// Returns `false`, changing nothing, when the position is off the panel.
    pub fn set_pixel(&mut self, row: i32, col: i32, color: RGB8, brightness: f32) -> bool {
        self.surface.set_pixel(row, col, color, brightness)
    }

    /// Set every pending pixel to `color`.
    pub fn fill(&mut self, color: RGB8) {
        self.surface.fill(color);
    }

    /// Send the pending frame to the strip, corrected for brightness and gamma.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn flush(&mut self) -> Result<()> {
        let mut corrected = *self.surface.runs();
        for led in corrected.as_flattened_mut() {
            *led = color::correct(*led, &self.combo_table);
        }
        trace!("flush {} LEDs", ROWS * COLS);
        self.strip.write_pixels(corrected.as_flattened()).await
    }

    /// Black out the pending frame and flush.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn clear(&mut self) -> Result<()> {
        self.surface.fill(BLACK);
        self.flush().await
    }

    /// Replace the pending frame with `frame` and flush.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn write_frame(&mut self, frame: &Frame<ROWS, COLS>) -> Result<()> {
        self.surface.load_frame(frame);
        self.flush().await
    }

    /// The pending frame in row/column order.
    #[must_use]
    pub fn frame(&self) -> Frame<ROWS, COLS> {
        self.surface.to_frame()
    }

    /// The pending frame in strip order.
    #[must_use]
    pub const fn surface(&self) -> &Surface<ROWS, COLS> {
        &self.surface
    }

    /// Mutable access to the pending frame, e.g. as an embedded-graphics draw target.
    pub const fn surface_mut(&mut self) -> &mut Surface<ROWS, COLS> {
        &mut self.surface
    }

    /// The glyph tables used for text.
    #[must_use]
    pub const fn glyphs(&self) -> &GlyphStore {
        &self.glyphs
    }

    /// The strip driver.
    #[must_use]
    pub const fn strip(&self) -> &S {
        &self.strip
    }

    /// Give back the strip driver and delay.
    #[must_use]
    pub fn into_parts(self) -> (S, D) {
        (self.strip, self.delay)
    }

    // ------------------------------------------------------------------------
    // Presentation defaults
    // ------------------------------------------------------------------------

    /// Output brightness in `[0, 1]`.
    #[must_use]
    pub const fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Set the output brightness. Takes effect on the next flush.
    pub fn set_brightness(&mut self, brightness: f32) {
        debug!("brightness {}", brightness);
        self.brightness = brightness;
        self.rebuild_combo_table();
    }

    /// The gamma curve applied on flush.
    #[must_use]
    pub const fn gamma(&self) -> Gamma {
        self.gamma
    }

    /// Set the gamma curve. Takes effect on the next flush.
    pub fn set_gamma(&mut self, gamma: Gamma) {
        self.gamma = gamma;
        self.rebuild_combo_table();
    }

    fn rebuild_combo_table(&mut self) {
        self.combo_table =
            color::generate_combo_table(self.gamma, color::brightness_to_u8(self.brightness));
    }

    /// Default wait between animation frames.
    #[must_use]
    pub const fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    /// Set the default wait between animation frames.
    pub const fn set_frame_delay(&mut self, frame_delay: Duration) {
        self.frame_delay = frame_delay;
    }

    /// Default wait after an animation's last frame.
    #[must_use]
    pub const fn hold_delay(&self) -> Duration {
        self.hold_delay
    }

    /// Set the default wait after an animation's last frame.
    pub const fn set_hold_delay(&mut self, hold_delay: Duration) {
        self.hold_delay = hold_delay;
    }

    pub(crate) async fn pause(&mut self, duration: Duration) {
        let micros = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
        self.delay.delay_us(micros).await;
    }

    // ------------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------------

    /// Draw `text` into the pending frame with its top-left at `(start_row, start_col)`.
    ///
    /// Does not clear or flush. Returns the column just past the last glyph.
    /// See [`crate::text`] for the escape syntax.
    pub fn draw_text(&mut self, text: &str, color: RGB8, start_row: i32, start_col: i32) -> i32 {
        let Ok(end_col) =
            render_text(&mut self.surface, &self.glyphs, text, color, start_row, start_col);
        end_col
    }

    /// Clear the pending frame, draw `text`, and flush.
    ///
    /// Returns the column just past the last glyph.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn write_text(
        &mut self,
        text: &str,
        color: RGB8,
        start_row: i32,
        start_col: i32,
    ) -> Result<i32> {
        self.surface.fill(BLACK);
        let end_col = self.draw_text(text, color, start_row, start_col);
        self.flush().await?;
        Ok(end_col)
    }

    // ------------------------------------------------------------------------
    // Offscreen buffer
    // ------------------------------------------------------------------------

    /// Whether this matrix owns an offscreen buffer.
    #[must_use]
    pub const fn buffer_enabled(&self) -> bool {
        self.buffer.is_some()
    }

    /// The offscreen buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferDisabled`] if the matrix was built without one.
    pub fn buffer(&self) -> Result<&OffscreenBuffer<BUF_ROWS, BUF_COLS>> {
        self.buffer.as_ref().ok_or(Error::BufferDisabled)
    }

    /// The offscreen buffer, mutably. Also an embedded-graphics draw target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferDisabled`] if the matrix was built without one.
    pub fn buffer_mut(&mut self) -> Result<&mut OffscreenBuffer<BUF_ROWS, BUF_COLS>> {
        match self.buffer.as_mut() {
            Some(buffer) => Ok(buffer),
            None => {
                warn!("offscreen buffer requested but disabled");
                Err(Error::BufferDisabled)
            }
        }
    }

    /// Write one buffer cell by direct (unwrapped) position.
    ///
    /// `Ok(false)` means the position was outside the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferDisabled`] if the matrix was built without a buffer.
    pub fn buffer_set_cell(
        &mut self,
        row: i32,
        col: i32,
        color: RGB8,
        brightness: f32,
    ) -> Result<bool> {
        Ok(self.buffer_mut()?.set_cell(row, col, color, brightness))
    }

    /// Reset every buffer cell to black at brightness zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferDisabled`] if the matrix was built without a buffer.
    pub fn clear_buffer(&mut self) -> Result<()> {
        self.buffer_mut()?.clear();
        Ok(())
    }

    /// Set every buffer cell to `color` at `brightness`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferDisabled`] if the matrix was built without a buffer.
    pub fn fill_buffer(&mut self, color: RGB8, brightness: f32) -> Result<()> {
        self.buffer_mut()?.fill(color, brightness);
        Ok(())
    }

    /// Draw `text` into the buffer at full brightness using wrapped addressing.
    ///
    /// Returns the (unwrapped) column just past the last glyph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferDisabled`] if the matrix was built without a buffer.
    pub fn write_text_to_buffer(
        &mut self,
        text: &str,
        color: RGB8,
        start_row: i32,
        start_col: i32,
    ) -> Result<i32> {
        let Some(buffer) = self.buffer.as_mut() else {
            warn!("buffer text requested but buffer disabled");
            return Err(Error::BufferDisabled);
        };
        let Ok(end_col) = render_text(buffer, &self.glyphs, text, color, start_row, start_col);
        Ok(end_col)
    }

    /// Copy a window of the buffer onto the pending frame, then flush once.
    ///
    /// For each offset `(r, c)` inside `window` (default: the display size), the cell at
    /// wrapped buffer position `buffer_origin + (r, c)` is drawn at
    /// `matrix_origin + (r, c)` with the cell's own brightness. Destinations off the panel
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferDisabled`] if the matrix was built without a buffer, or
    /// propagates errors from the [`LedStrip`] driver.
    pub async fn copy_buffer_window(
        &mut self,
        buffer_origin: (i32, i32),
        window: Option<(usize, usize)>,
        matrix_origin: (i32, i32),
    ) -> Result<()> {
        let Some(buffer) = self.buffer.as_ref() else {
            warn!("buffer window requested but buffer disabled");
            return Err(Error::BufferDisabled);
        };
        let (height, width) = window.unwrap_or((ROWS, COLS));
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let (buffer_row, buffer_col) = buffer_origin;
        let (matrix_row, matrix_col) = matrix_origin;
        // Only offsets that land on the panel.
        let rows = matrix_row.saturating_neg().max(0)
            ..height.min((ROWS as i32).saturating_sub(matrix_row));
        let cols = matrix_col.saturating_neg().max(0)
            ..width.min((COLS as i32).saturating_sub(matrix_col));
        for row in rows {
            for col in cols.clone() {
                let source_row = buffer_row.wrapping_add(row);
                let source_col = buffer_col.wrapping_add(col);
                if let Some(cell) = buffer.wrapped_cell(source_row, source_col) {
                    self.surface.set_pixel(
                        matrix_row.wrapping_add(row),
                        matrix_col.wrapping_add(col),
                        cell.color,
                        cell.brightness,
                    );
                }
            }
        }
        self.flush().await
    }
}
