//! Scroll animations for text.
//!
//! Every animation redraws the whole string once per frame: clear, draw at the frame's
//! position, flush, then wait the frame delay. After the last frame it waits the hold delay.
//! The calls return only when the animation has finished.
//!
//! Positions are the text's top-left corner. Glyphs are 7 rows tall, so at row `-7` the text
//! is entirely above the display.
//!
//! | animation | moves | ends when |
//! |-----------|-------|-----------|
//! | [`scroll_exit_left`](LedMatrix::scroll_exit_left) | left from `start_col` | `col < -width` |
//! | [`scroll_enter_bottom`](LedMatrix::scroll_enter_bottom) | up from row 6 | `row < end_row` |
//! | [`scroll_exit_top`](LedMatrix::scroll_exit_top) | up from `start_row` | `row < -7` |
//! | [`scroll_enter_right_exit_left`](LedMatrix::scroll_enter_right_exit_left) | left from the right edge, pausing at column 0 | `col < -width` |
//!
//! plus the combinations
//! [`scroll_enter_bottom_exit_top`](LedMatrix::scroll_enter_bottom_exit_top) and
//! [`scroll_enter_bottom_exit_left`](LedMatrix::scroll_enter_bottom_exit_left), which hold the
//! text in place for a display time between their two halves.
//!
//! "width" is [`text_pixel_width`] with an animation-specific length modifier.

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use smart_leds::RGB8;

use crate::Result;
use crate::glyph::GLYPH_HEIGHT;
use crate::matrix::{LedMatrix, LedStrip};
use crate::text::text_pixel_width;

/// Length modifier used by exit-left animations unless told otherwise.
pub const LEN_MODIFIER_DEFAULT: i32 = 10;
/// Length modifier used by [`LedMatrix::scroll_enter_right_exit_left`].
pub const ENTER_RIGHT_LEN_MODIFIER: i32 = 14;
/// Row at which text starts when entering from the bottom.
pub const ENTER_BOTTOM_START_ROW: i32 = 6;
/// Row past which text has left through the top.
pub const EXIT_TOP_END_ROW: i32 = -(GLYPH_HEIGHT as i32);

/// Hold between the halves of [`LedMatrix::scroll_enter_bottom_exit_top`].
pub const ENTER_BOTTOM_EXIT_TOP_DISPLAY_DEFAULT: Duration = Duration::from_secs(4);
/// Hold between the halves of [`LedMatrix::scroll_enter_bottom_exit_left`].
pub const ENTER_BOTTOM_EXIT_LEFT_DISPLAY_DEFAULT: Duration = Duration::from_secs(1);
/// Hold at column 0 in [`LedMatrix::scroll_enter_right_exit_left`].
pub const ENTER_RIGHT_EXIT_LEFT_DISPLAY_DEFAULT: Duration = Duration::from_secs(2);

/// Per-call timing overrides. `None` uses the matrix (or animation) default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    /// Wait between frames (default: the matrix frame delay).
    pub frame_delay: Option<Duration>,
    /// Wait after the last frame (default: the matrix hold delay).
    pub hold_delay: Option<Duration>,
    /// Mid-animation hold for the combined animations (default: per animation).
    pub display_time: Option<Duration>,
}

impl Timing {
    /// Use every default.
    pub const DEFAULT: Self = Self {
        frame_delay: None,
        hold_delay: None,
        display_time: None,
    };

    /// No waiting at all, e.g. for tests or for chaining animations back to back.
    pub const IMMEDIATE: Self = Self {
        frame_delay: Some(Duration::from_ticks(0)),
        hold_delay: Some(Duration::from_ticks(0)),
        display_time: Some(Duration::from_ticks(0)),
    };

    /// Override the frame delay.
    #[must_use]
    pub const fn with_frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = Some(frame_delay);
        self
    }

    /// Override the hold delay.
    #[must_use]
    pub const fn with_hold_delay(mut self, hold_delay: Duration) -> Self {
        self.hold_delay = Some(hold_delay);
        self
    }

    /// Override the display time.
    #[must_use]
    pub const fn with_display_time(mut self, display_time: Duration) -> Self {
        self.display_time = Some(display_time);
        self
    }
}

/// Frame and hold delays after resolving a [`Timing`] against matrix defaults.
#[derive(Clone, Copy)]
pub(crate) struct Resolved {
    pub(crate) frame_delay: Duration,
    pub(crate) hold_delay: Duration,
    pub(crate) display_time: Duration,
}

impl<S, D, const ROWS: usize, const COLS: usize, const BUF_ROWS: usize, const BUF_COLS: usize>
    LedMatrix<S, D, ROWS, COLS, BUF_ROWS, BUF_COLS>
where
    S: LedStrip,
    D: DelayNs,
{
    pub(crate) fn resolve(&self, timing: Timing, display_default: Duration) -> Resolved {
        Resolved {
            frame_delay: timing.frame_delay.unwrap_or(self.frame_delay),
            hold_delay: timing.hold_delay.unwrap_or(self.hold_delay),
            display_time: timing.display_time.unwrap_or(display_default),
        }
    }

    async fn frame_at(
        &mut self,
        text: &str,
        color: RGB8,
        row: i32,
        col: i32,
        frame_delay: Duration,
    ) -> Result<()> {
        self.write_text(text, color, row, col).await?;
        self.pause(frame_delay).await;
        Ok(())
    }

    async fn exit_left_frames(
        &mut self,
        text: &str,
        color: RGB8,
        row: i32,
        from_col: i32,
        width: i32,
        frame_delay: Duration,
    ) -> Result<()> {
        let mut col = from_col;
        let last_col = width.saturating_neg();
        while col >= last_col {
            self.frame_at(text, color, row, col, frame_delay).await?;
            col -= 1;
        }
        Ok(())
    }

    async fn enter_bottom_frames(
        &mut self,
        text: &str,
        color: RGB8,
        end_row: i32,
        col: i32,
        frame_delay: Duration,
    ) -> Result<bool> {
        if !(0..=ENTER_BOTTOM_START_ROW).contains(&end_row) {
            debug!("enter-bottom skipped: end row {} out of range", end_row);
            return Ok(false);
        }
        let mut row = ENTER_BOTTOM_START_ROW;
        while row >= end_row {
            self.frame_at(text, color, row, col, frame_delay).await?;
            row -= 1;
        }
        Ok(true)
    }

    async fn exit_top_frames(
        &mut self,
        text: &str,
        color: RGB8,
        from_row: i32,
        col: i32,
        frame_delay: Duration,
    ) -> Result<()> {
        let mut row = from_row;
        while row >= EXIT_TOP_END_ROW {
            self.frame_at(text, color, row, col, frame_delay).await?;
            row -= 1;
        }
        Ok(())
    }

    /// Scroll `text` left from `start_col` until it has left the display, then hold.
    ///
    /// Frames are drawn for every column from `start_col` down to
    /// `-text_pixel_width(text, len_modifier)` inclusive; if `start_col` is already past
    /// that, no frames are drawn and only the hold delay is waited.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn scroll_exit_left(
        &mut self,
        text: &str,
        color: RGB8,
        start_row: i32,
        start_col: i32,
        timing: Timing,
        len_modifier: i32,
    ) -> Result<()> {
        let timing = self.resolve(timing, Duration::from_ticks(0));
        let width = text_pixel_width(text, len_modifier);
        debug!("exit-left: {} px from column {}", width, start_col);
        self.exit_left_frames(text, color, start_row, start_col, width, timing.frame_delay)
            .await?;
        self.pause(timing.hold_delay).await;
        Ok(())
    }

    /// Scroll `text` up from row 6 until its top reaches `end_row`, then hold.
    ///
    /// `end_row` must be in `0..=6`. Otherwise nothing is drawn and nothing is waited.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn scroll_enter_bottom(
        &mut self,
        text: &str,
        color: RGB8,
        end_row: i32,
        start_col: i32,
        timing: Timing,
    ) -> Result<()> {
        let timing = self.resolve(timing, Duration::from_ticks(0));
        debug!("enter-bottom: to row {}", end_row);
        if !self
            .enter_bottom_frames(text, color, end_row, start_col, timing.frame_delay)
            .await?
        {
            return Ok(());
        }
        self.pause(timing.hold_delay).await;
        Ok(())
    }

    /// Scroll `text` up from `start_row` until it has left through the top, then hold.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn scroll_exit_top(
        &mut self,
        text: &str,
        color: RGB8,
        start_row: i32,
        start_col: i32,
        timing: Timing,
    ) -> Result<()> {
        let timing = self.resolve(timing, Duration::from_ticks(0));
        debug!("exit-top: from row {}", start_row);
        self.exit_top_frames(text, color, start_row, start_col, timing.frame_delay)
            .await?;
        self.pause(timing.hold_delay).await;
        Ok(())
    }

    /// Enter from the bottom up to `start_row`, stay for the display time (default 4 s),
    /// then exit through the top.
    ///
    /// Each half ends with its own hold delay, and the whole animation ends with one more.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn scroll_enter_bottom_exit_top(
        &mut self,
        text: &str,
        color: RGB8,
        start_row: i32,
        start_col: i32,
        timing: Timing,
    ) -> Result<()> {
        let resolved = self.resolve(timing, ENTER_BOTTOM_EXIT_TOP_DISPLAY_DEFAULT);
        self.scroll_enter_bottom(text, color, start_row, start_col, timing)
            .await?;
        self.pause(resolved.display_time).await;
        self.scroll_exit_top(text, color, start_row, start_col, timing)
            .await?;
        self.pause(resolved.hold_delay).await;
        Ok(())
    }

    /// Enter from the bottom up to `start_row`, stay for the display time (default 1 s),
    /// then exit to the left using `len_modifier`.
    ///
    /// Each half ends with its own hold delay, and the whole animation ends with one more.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn scroll_enter_bottom_exit_left(
        &mut self,
        text: &str,
        color: RGB8,
        start_row: i32,
        start_col: i32,
        timing: Timing,
        len_modifier: i32,
    ) -> Result<()> {
        let resolved = self.resolve(timing, ENTER_BOTTOM_EXIT_LEFT_DISPLAY_DEFAULT);
        self.scroll_enter_bottom(text, color, start_row, start_col, timing)
            .await?;
        self.pause(resolved.display_time).await;
        self.scroll_exit_left(text, color, start_row, start_col, timing, len_modifier)
            .await?;
        self.pause(resolved.hold_delay).await;
        Ok(())
    }

    /// Scroll `text` in from the right edge to column 0, stay for the display time
    /// (default 2 s), then scroll it out to the left, then hold.
    ///
    /// `start_col` defaults to `COLS` (just off the right edge). The exit uses
    /// [`ENTER_RIGHT_LEN_MODIFIER`].
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`LedStrip`] driver.
    pub async fn scroll_enter_right_exit_left(
        &mut self,
        text: &str,
        color: RGB8,
        start_row: i32,
        start_col: Option<i32>,
        timing: Timing,
    ) -> Result<()> {
        let timing = self.resolve(timing, ENTER_RIGHT_EXIT_LEFT_DISPLAY_DEFAULT);
        let mut col = start_col.unwrap_or(COLS as i32);
        let width = text_pixel_width(text, ENTER_RIGHT_LEN_MODIFIER);
        debug!("enter-right-exit-left: {} px from column {}", width, col);
        while col >= 0 {
            self.frame_at(text, color, start_row, col, timing.frame_delay)
                .await?;
            col -= 1;
        }
        self.pause(timing.display_time).await;
        self.exit_left_frames(text, color, start_row, col, width, timing.frame_delay)
            .await?;
        self.pause(timing.hold_delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::color::WHITE;
    use crate::host::{RecordingDelay, RecordingStrip};
    use crate::matrix::MatrixConfig;

    const CONFIG: MatrixConfig = MatrixConfig::DEFAULT
        .with_buffer(false)
        .with_brightness(1.0)
        .with_frame_delay(Duration::from_millis(1))
        .with_hold_delay(Duration::from_millis(100));

    #[test]
    fn exit_left_frame_count_and_pauses() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 8, 16>::new(&mut strip, &mut delay, CONFIG).expect("config");
        // "AB": width 14, columns 0..=-14 is 15 frames.
        block_on(matrix.scroll_exit_left("AB", WHITE, 0, 0, Timing::DEFAULT, 10))
            .expect("animate");
        drop(matrix);
        assert_eq!(strip.frame_count(), 15);
        let pauses = delay.pauses();
        assert_eq!(pauses.len(), 16);
        assert!(pauses[..15].iter().all(|&us| us == 1_000));
        assert_eq!(pauses[15], 100_000);
        assert!(strip.last_frame().expect("frame").iter().all(|&led| led == crate::color::BLACK));
    }

    #[test]
    fn exit_left_already_gone_only_holds() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 8, 16>::new(&mut strip, &mut delay, CONFIG).expect("config");
        block_on(matrix.scroll_exit_left("A", WHITE, 0, -8, Timing::DEFAULT, 10))
            .expect("animate");
        drop(matrix);
        assert_eq!(strip.frame_count(), 0);
        assert_eq!(delay.pauses(), &[100_000]);
    }

    #[test]
    fn enter_bottom_frames_rows_six_to_end() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 8, 8>::new(&mut strip, &mut delay, CONFIG).expect("config");
        block_on(matrix.scroll_enter_bottom("\\2", WHITE, 2, 0, Timing::DEFAULT))
            .expect("animate");
        // Rows 6, 5, 4, 3, 2.
        assert_eq!(matrix.strip().frame_count(), 5);
        // Final frame has the arrow tip at row 2, column 3.
        assert_eq!(matrix.frame()[(2, 3)], WHITE);
        assert_eq!(matrix.frame()[(1, 3)], crate::color::BLACK);
    }

    #[test]
    fn enter_bottom_out_of_range_draws_nothing() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 8, 8>::new(&mut strip, &mut delay, CONFIG).expect("config");
        block_on(matrix.scroll_enter_bottom("A", WHITE, 7, 0, Timing::DEFAULT)).expect("animate");
        block_on(matrix.scroll_enter_bottom("A", WHITE, -1, 0, Timing::DEFAULT)).expect("animate");
        drop(matrix);
        assert_eq!(strip.frame_count(), 0);
        assert!(delay.pauses().is_empty());
    }

    #[test]
    fn enter_bottom_exit_top_out_of_range_skips_the_entry_hold() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 7, 10>::new(&mut strip, &mut delay, CONFIG).expect("config");
        let timing = Timing::DEFAULT.with_frame_delay(Duration::from_ticks(0));
        block_on(matrix.scroll_enter_bottom_exit_top("A", WHITE, 9, 0, timing)).expect("animate");
        drop(matrix);
        // No entry frames. Exit runs rows 9 down to -7.
        assert_eq!(strip.frame_count(), 17);
        let holds: Vec<u64> = delay.pauses().iter().copied().filter(|&us| us > 0).collect();
        assert_eq!(holds, [4_000_000, 100_000, 100_000]);
    }

    #[test]
    fn exit_top_runs_to_minus_seven() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 8, 8>::new(&mut strip, &mut delay, CONFIG).expect("config");
        block_on(matrix.scroll_exit_top("A", WHITE, 0, 0, Timing::IMMEDIATE)).expect("animate");
        drop(matrix);
        // Rows 0 down to -7.
        assert_eq!(strip.frame_count(), 8);
        assert!(delay.pauses().iter().all(|&us| us == 0));
    }

    #[test]
    fn enter_right_exit_left_sequence() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let mut matrix =
            LedMatrix::<_, _, 8, 10>::new(&mut strip, &mut delay, CONFIG).expect("config");
        let timing = Timing::DEFAULT.with_display_time(Duration::from_millis(50));
        block_on(matrix.scroll_enter_right_exit_left("AB", WHITE, 0, None, timing))
            .expect("animate");
        drop(matrix);
        // Enter: columns 10..=0 (11 frames). Exit: width 2*7-0*14 = 14, columns -1..=-14 (14).
        assert_eq!(strip.frame_count(), 11 + 14);
        let pauses = delay.pauses();
        assert_eq!(pauses.len(), 11 + 1 + 14 + 1);
        assert_eq!(pauses[11], 50_000);
        assert_eq!(pauses[pauses.len() - 1], 100_000);
    }

    #[test]
    fn timing_resolution_prefers_overrides() {
        let mut strip = RecordingStrip::new();
        let mut delay = RecordingDelay::new();
        let matrix =
            LedMatrix::<_, _, 8, 8>::new(&mut strip, &mut delay, CONFIG).expect("config");
        let resolved = matrix.resolve(
            Timing::DEFAULT.with_hold_delay(Duration::from_millis(3)),
            Duration::from_secs(9),
        );
        assert_eq!(resolved.frame_delay, Duration::from_millis(1));
        assert_eq!(resolved.hold_delay, Duration::from_millis(3));
        assert_eq!(resolved.display_time, Duration::from_secs(9));
    }
}
