//! Procedural animations built on the display surface and the offscreen buffer.
//!
//! None of these pick random values themselves. Callers pass in positions and colors, so the
//! same inputs always produce the same frames.

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use smart_leds::RGB8;

use crate::Result;
use crate::color::{self, BLACK};
use crate::matrix::{LedMatrix, LedStrip};
use crate::scroll::Timing;

/// Brightness of each trail cell, top to bottom. The brightest cell leads the fall.
pub const RAIN_TRAIL: [f32; 4] = [0.1, 0.4, 0.8, 1.0];
/// How many times the rain window sweeps the buffer's hidden rows.
pub const RAIN_SWEEPS: usize = 5;
/// Wait after rain has cleared.
pub const RAIN_SETTLE: Duration = Duration::from_millis(400);
/// How long the last flash stays lit before the display clears.
pub const FLASH_HOLD: Duration = Duration::from_secs(1);
/// A sine wave stops once its phase reaches this magnitude.
pub const SINE_PHASE_LIMIT: f32 = 10.0;
/// Hue, in degrees, of the first column of a sine wave.
pub const SINE_START_HUE: f32 = 1.0;

/// One falling raindrop: the top of its trail in buffer coordinates, and its color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Raindrop {
    /// Buffer row of the dimmest trail cell.
    pub row: i32,
    /// Buffer column.
    pub col: i32,
    /// Trail color.
    pub color: RGB8,
}

/// Shape and motion of a rainbow sine wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SineWave {
    /// Radians per column.
    pub freq: f32,
    /// Phase added per frame. Negative values move the wave the other way.
    pub phase_shift: f32,
    /// Erase the previous frame's wave before drawing the next.
    pub clear_last: bool,
    /// Degrees added to the hue after every even column.
    pub color_shift: f32,
}

impl SineWave {
    fn row(self, amplitude: f32, col: i32, phase: f32) -> i32 {
        (amplitude * (1.0 + libm::sinf(col as f32 * self.freq + phase))) as i32
    }
}

/// A pixel moving one step diagonally per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounce {
    /// Starting row.
    pub row: i32,
    /// Starting column.
    pub col: i32,
    /// Row step, `1` or `-1`.
    pub row_step: i32,
    /// Column step, `1` or `-1`.
    pub col_step: i32,
}

impl<S, D, const ROWS: usize, const COLS: usize, const BUF_ROWS: usize, const BUF_COLS: usize>
    LedMatrix<S, D, ROWS, COLS, BUF_ROWS, BUF_COLS>
where
    S: LedStrip,
    D: DelayNs,
{
    /// Falling rain.
    ///
    /// Clears the buffer and draws a four-cell trail per raindrop (brightness 0.1, 0.4, 0.8,
    /// 1.0 going down). Then slides the display window upward through the buffer, starting at
    /// buffer row `BUF_ROWS - ROWS`, for `5 * (BUF_ROWS - ROWS)` frames with no wait between
    /// them, so the trails appear to fall. Finally clears the display and the buffer and waits
    /// 400 ms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferDisabled`](crate::Error::BufferDisabled) without a buffer, or
    /// propagates errors from the [`LedStrip`] driver.
    pub async fn rain(&mut self, raindrops: &[Raindrop]) -> Result<()> {
        let buffer = self.buffer_mut()?;
        buffer.clear();
        for raindrop in raindrops {
            for (row, brightness) in (raindrop.row..).zip(RAIN_TRAIL) {
                buffer.set_cell(row, raindrop.col, raindrop.color, brightness);
            }
        }

        let hidden_rows = i32::try_from(BUF_ROWS.saturating_sub(ROWS)).unwrap_or(i32::MAX);
        let frames = hidden_rows.saturating_mul(RAIN_SWEEPS as i32);
        debug!("rain: {} drops, {} frames", raindrops.len(), frames);
        for step in 0..frames {
            self.copy_buffer_window((hidden_rows - step, 0), None, (0, 0))
                .await?;
            self.pause(Duration::from_ticks(0)).await;
        }

        self.clear().await?;
        self.clear_buffer()?;
        self.pause(RAIN_SETTLE).await;
        Ok(())
    }

    /// Paint columns left to right, top to bottom, flushing once per column.
    ///
    /// Waits the frame delay after each column and the hold delay at the end.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn wipe_columns(&mut self, color: RGB8, timing: Timing) -> Result<()> {
        let timing = self.resolve(timing, Duration::from_ticks(0));
        for col in 0..COLS as i32 {
            for row in 0..ROWS as i32 {
                self.surface.set_pixel(row, col, color, 1.0);
            }
            self.flush().await?;
            self.pause(timing.frame_delay).await;
        }
        self.pause(timing.hold_delay).await;
        Ok(())
    }

    /// Reveal `pixels` one at a time, flushing after each, then hold.
    ///
    /// Off-panel pixels are skipped without a frame.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn reveal_pixels<I>(&mut self, pixels: I, timing: Timing) -> Result<()>
    where
        I: IntoIterator<Item = (i32, i32, RGB8)>,
    {
        let timing = self.resolve(timing, Duration::from_ticks(0));
        for (row, col, color) in pixels {
            if self.surface.set_pixel(row, col, color, 1.0) {
                self.flush().await?;
                self.pause(timing.frame_delay).await;
            }
        }
        self.pause(timing.hold_delay).await;
        Ok(())
    }

    /// Fill each column with its own hue, stepping `hue_step` per column from `start_hue`,
    /// then flush once.
    ///
    /// Hues are fractions of a full turn, as for [`color::hsv_to_rgb`]; values past `1.0`
    /// wrap around the color wheel.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn rainbow_columns(&mut self, start_hue: f32, hue_step: f32) -> Result<()> {
        let mut hue = start_hue;
        for col in 0..COLS as i32 {
            let column_color = color::hsv_to_rgb(hue, 1.0, 1.0);
            for row in 0..ROWS as i32 {
                self.surface.set_pixel(row, col, column_color, 1.0);
            }
            hue += hue_step;
        }
        self.flush().await
    }

    /// Move a single pixel diagonally for `steps` frames, reflecting off the panel edges.
    ///
    /// `color_at(step)` picks the pixel color for each step. Earlier positions stay lit, so
    /// the pixel leaves a trail. Ends with the display cleared, then the hold delay.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn bounce<F>(
        &mut self,
        start: Bounce,
        steps: usize,
        mut color_at: F,
        timing: Timing,
    ) -> Result<()>
    where
        F: FnMut(usize) -> RGB8,
    {
        let timing = self.resolve(timing, Duration::from_ticks(0));
        let Bounce {
            mut row,
            mut col,
            mut row_step,
            mut col_step,
        } = start;
        self.surface.fill(BLACK);
        for step in 0..steps {
            if !(0..ROWS as i32).contains(&(row + row_step)) {
                row_step = -row_step;
            }
            if !(0..COLS as i32).contains(&(col + col_step)) {
                col_step = -col_step;
            }
            row += row_step;
            col += col_step;
            self.surface.set_pixel(row, col, color_at(step), 1.0);
            self.flush().await?;
            self.pause(timing.frame_delay).await;
        }
        self.clear().await?;
        self.pause(timing.hold_delay).await;
        Ok(())
    }

    /// Flash `color` at each position in turn. The previous flash is erased before the next
    /// is drawn, so only one pixel is lit per frame.
    ///
    /// Starts from a cleared display, waits the frame delay after each flash, then keeps the
    /// last one lit for [`FLASH_HOLD`] and clears the display.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn flash_pixels<I>(
        &mut self,
        positions: I,
        color: RGB8,
        timing: Timing,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let timing = self.resolve(timing, Duration::from_ticks(0));
        self.clear().await?;
        let mut last = (0, 0);
        for (row, col) in positions {
            self.surface.set_pixel(last.0, last.1, BLACK, 1.0);
            self.surface.set_pixel(row, col, color, 1.0);
            self.flush().await?;
            self.pause(timing.frame_delay).await;
            last = (row, col);
        }
        self.pause(FLASH_HOLD).await;
        self.clear().await
    }

    /// Animate a rainbow sine wave across the panel.
    ///
    /// Column `c` is lit at row `ROWS / 2 * (1 + sin(c * freq + phase))`, truncated. Hue
    /// starts at [`SINE_START_HUE`] degrees and grows by `color_shift` after every even
    /// column, carrying over from frame to frame. The phase starts at zero and moves by
    /// `phase_shift` per frame until its magnitude reaches [`SINE_PHASE_LIMIT`], with one
    /// flush per phase. A zero, subnormal, or non-finite `phase_shift` draws nothing.
    ///
    /// Starts from a cleared display and ends with the hold delay; the wave stays lit.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn sine_wave(&mut self, wave: SineWave, timing: Timing) -> Result<()> {
        if !wave.phase_shift.is_normal() {
            debug!("sine wave skipped: no phase movement");
            return Ok(());
        }
        let timing = self.resolve(timing, Duration::from_ticks(0));
        let amplitude = ROWS as f32 / 2.0;
        self.clear().await?;

        let mut hue = SINE_START_HUE;
        let mut phase = 0.0_f32;
        let mut previous_phase = None;
        while phase.abs() < SINE_PHASE_LIMIT {
            for col in 0..COLS as i32 {
                if let Some(previous_phase) = previous_phase.filter(|_| wave.clear_last) {
                    let previous = wave.row(amplitude, col, previous_phase);
                    self.surface.set_pixel(previous, col, BLACK, 1.0);
                }
                let column_color = color::hsv_to_rgb(hue / 360.0, 1.0, 1.0);
                self.surface
                    .set_pixel(wave.row(amplitude, col, phase), col, column_color, 1.0);
                if col % 2 == 0 {
                    hue += wave.color_shift;
                }
            }
            self.flush().await?;
            self.pause(timing.frame_delay).await;
            previous_phase = Some(phase);
            phase += wave.phase_shift;
        }
        self.pause(timing.hold_delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::Error;
    use crate::color::{BLUE, CYAN, GREEN, RED};
    use crate::host::{RecordingDelay, RecordingStrip};
    use crate::matrix::MatrixConfig;

    const FULL: MatrixConfig = MatrixConfig::DEFAULT
        .with_brightness(1.0)
        .with_frame_delay(Duration::from_ticks(0))
        .with_hold_delay(Duration::from_ticks(0));

    #[test]
    fn rain_sweeps_and_cleans_up() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        // 1x2 display: buffer 9x6, 8 hidden rows, 40 frames.
        let mut matrix =
            LedMatrix::<_, _, 1, 2, 9, 6>::new(&mut strip, &mut delay, FULL).expect("config");
        // Display column 0 shows stored column 1.
        let raindrops = [Raindrop {
            row: 2,
            col: 1,
            color: RED,
        }];
        block_on(matrix.rain(&raindrops)).expect("rain");
        assert_eq!(matrix.buffer().expect("enabled").lit_count(), 0);
        drop(matrix);

        // 40 window frames plus the final clear.
        assert_eq!(strip.frame_count(), 41);
        assert!(strip.last_frame().expect("frame").iter().all(|&led| led == BLACK));
        assert_eq!(delay.pauses().last(), Some(&400_000));

        // Window origin r shows stored row (r + 1) mod 7. Origin 4 shows the brightest cell
        // (stored row 5) and origin 1 the dimmest (stored row 2).
        let frames = strip.logical_frames::<1, 2>();
        assert!(frames.iter().any(|frame| frame[(0, 0)] == RED));
        assert!(frames.iter().any(|frame| frame[(0, 0)] == RGB8::new(25, 0, 0)));
        assert!(frames.iter().all(|frame| frame[(0, 1)] == BLACK));
    }

    #[test]
    fn rain_needs_a_buffer() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 1, 2>::new(&mut strip, &mut delay, FULL.with_buffer(false))
                .expect("config");
        assert_eq!(block_on(matrix.rain(&[])), Err(Error::BufferDisabled));
    }

    #[test]
    fn wipe_flushes_per_column() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 3, 4>::new(&mut strip, &mut delay, FULL.with_buffer(false))
                .expect("config");
        block_on(matrix.wipe_columns(BLUE, Timing::DEFAULT)).expect("wipe");
        drop(matrix);
        let frames = strip.logical_frames::<3, 4>();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].lit_count(), 3);
        assert_eq!(frames[3].lit_count(), 12);
        assert_eq!(frames[1][(2, 1)], BLUE);
        assert_eq!(delay.pauses().len(), 5);
    }

    #[test]
    fn reveal_skips_off_panel_pixels() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 2, 2>::new(&mut strip, &mut delay, FULL.with_buffer(false))
                .expect("config");
        let pixels = [(0, 0, RED), (5, 5, RED), (1, 1, GREEN)];
        block_on(matrix.reveal_pixels(pixels, Timing::DEFAULT)).expect("reveal");
        assert_eq!(matrix.frame()[(1, 1)], GREEN);
        drop(matrix);
        assert_eq!(strip.frame_count(), 2);
    }

    #[test]
    fn rainbow_steps_hue_per_column() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 2, 3>::new(&mut strip, &mut delay, FULL.with_buffer(false))
                .expect("config");
        block_on(matrix.rainbow_columns(0.0, 0.5)).expect("rainbow");
        let frame = matrix.frame();
        assert_eq!(frame[(0, 0)], RED);
        assert_eq!(frame[(1, 1)], CYAN);
        assert_eq!(frame[(1, 2)], RED);
        drop(matrix);
        assert_eq!(strip.frame_count(), 1);
    }

    #[test]
    fn bounce_reflects_off_edges() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 3, 5>::new(&mut strip, &mut delay, FULL.with_buffer(false))
                .expect("config");
        let start = Bounce {
            row: 0,
            col: 0,
            row_step: 1,
            col_step: 1,
        };
        block_on(matrix.bounce(start, 20, |_| GREEN, Timing::DEFAULT)).expect("bounce");
        drop(matrix);
        // 20 steps, then the clear.
        assert_eq!(strip.frame_count(), 21);
        let frames = strip.logical_frames::<3, 5>();
        assert_eq!(frames[0][(1, 1)], GREEN);
        assert_eq!(frames[1][(2, 2)], GREEN);
        assert_eq!(frames[2][(1, 3)], GREEN);
        assert_eq!(frames[3][(0, 4)], GREEN);
        // Corner: both steps flip, back onto (1, 3).
        assert_eq!(frames[4].lit_count(), 4);
        assert_eq!(frames[20].lit_count(), 0);
    }

    #[test]
    fn flash_erases_the_previous_pixel() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 2, 3>::new(&mut strip, &mut delay, FULL.with_buffer(false))
                .expect("config");
        matrix.set_pixel(1, 1, GREEN, 1.0);
        block_on(matrix.flash_pixels([(0, 0), (1, 2), (0, 1)], RED, Timing::DEFAULT))
            .expect("flash");
        drop(matrix);

        // Opening clear, three flashes, closing clear.
        let frames = strip.logical_frames::<2, 3>();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].lit_count(), 0);
        for (frame, (row, col)) in frames[1..4].iter().zip([(0, 0), (1, 2), (0, 1)]) {
            assert_eq!(frame.lit_count(), 1);
            assert_eq!(frame[(row, col)], RED);
        }
        assert_eq!(frames[4].lit_count(), 0);
        assert_eq!(delay.pauses(), &[0, 0, 0, 1_000_000]);
    }

    fn record_wave(wave: SineWave) -> Vec<crate::surface::Frame<4, 6>> {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 4, 6>::new(&mut strip, &mut delay, FULL.with_buffer(false))
                .expect("config");
        block_on(matrix.sine_wave(wave, Timing::DEFAULT)).expect("wave");
        drop(matrix);
        strip.logical_frames::<4, 6>()
    }

    const WAVE: SineWave = SineWave {
        freq: 0.5,
        phase_shift: 2.5,
        clear_last: true,
        color_shift: 30.0,
    };

    #[test]
    fn sine_wave_moves_one_phase_per_frame() {
        let frames = record_wave(WAVE);
        // Opening clear, then phases 0, 2.5, 5 and 7.5.
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].lit_count(), 0);
        assert!(frames[1..].iter().all(|frame| frame.lit_count() == 6));

        // Column 0 sits at rows 2, 3, 0 and 3 as the phase moves.
        assert_eq!(frames[1][(2, 0)], color::hsv_to_rgb(1.0 / 360.0, 1.0, 1.0));
        assert_ne!(frames[3][(0, 0)], BLACK);
        assert_eq!(frames[4][(0, 0)], BLACK);
        assert_ne!(frames[4][(3, 0)], BLACK);

        // Hue steps after even columns only.
        assert_eq!(frames[1].iter().flatten().filter(|&&led| led != BLACK).count(), 6);
        let hue_of = |col: usize| {
            (0..4)
                .map(|row| frames[1][(row, col)])
                .find(|&led| led != BLACK)
                .expect("one lit cell per column")
        };
        assert_eq!(hue_of(1), hue_of(2));
        assert_eq!(hue_of(1), color::hsv_to_rgb(31.0 / 360.0, 1.0, 1.0));
        assert_ne!(hue_of(2), hue_of(3));
    }

    #[test]
    fn sine_wave_can_keep_its_trail() {
        let frames = record_wave(SineWave {
            clear_last: false,
            phase_shift: -2.5,
            ..WAVE
        });
        assert_eq!(frames.len(), 5);
        assert!(frames[4].lit_count() > 6);
        let lit_in_order: Vec<usize> = frames.iter().map(|frame| frame.lit_count()).collect();
        assert!(lit_in_order.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn sine_wave_without_phase_shift_draws_nothing() {
        let still = SineWave {
            phase_shift: 0.0,
            ..WAVE
        };
        assert!(record_wave(still).is_empty());
    }
}
