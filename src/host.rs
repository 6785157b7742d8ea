//! Host-side stand-ins for the hardware: a strip that records frames and a delay that
//! records pauses instead of sleeping.
//!
//! Useful for tests, and with [`crate::to_png`] for previewing animations without a panel.

use embedded_hal_async::delay::DelayNs;
use smart_leds::RGB8;

use crate::Result;
use crate::matrix::LedStrip;
use crate::surface::{Frame, layout::Serpentine};

/// An [`LedStrip`] that keeps every frame it is sent, in strip order.
#[derive(Clone, Debug, Default)]
pub struct RecordingStrip {
    frames: Vec<Vec<RGB8>>,
}

impl RecordingStrip {
    /// Create an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Every frame received so far, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[Vec<RGB8>] {
        &self.frames
    }

    /// Number of frames received.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The most recent frame, if any.
    #[must_use]
    pub fn last_frame(&self) -> Option<&[RGB8]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Recorded frames converted back to row/column order for a `ROWS × COLS` panel.
    ///
    /// Frames of the wrong length are skipped.
    #[must_use]
    pub fn logical_frames<const ROWS: usize, const COLS: usize>(&self) -> Vec<Frame<ROWS, COLS>> {
        self.frames
            .iter()
            .filter(|leds| leds.len() == ROWS * COLS)
            .map(|leds| {
                let mut frame = Frame::new();
                for (led, (row, col)) in leds.iter().zip(Serpentine::<ROWS, COLS>::positions()) {
                    frame[(row, col)] = *led;
                }
                frame
            })
            .collect()
    }

    /// Forget all recorded frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl LedStrip for RecordingStrip {
    async fn write_pixels(&mut self, pixels: &[RGB8]) -> Result<()> {
        self.frames.push(pixels.to_vec());
        Ok(())
    }
}

/// A [`DelayNs`] that returns immediately and records each requested pause in microseconds.
#[derive(Clone, Debug, Default)]
pub struct RecordingDelay {
    pauses: Vec<u64>,
}

impl RecordingDelay {
    /// Create an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self { pauses: Vec::new() }
    }

    /// Every pause requested so far, in microseconds.
    #[must_use]
    pub fn pauses(&self) -> &[u64] {
        &self.pauses
    }

    /// Sum of all pauses, in microseconds.
    #[must_use]
    pub fn total_micros(&self) -> u64 {
        self.pauses.iter().sum()
    }
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.pauses.push(u64::from(ns) / 1_000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.pauses.push(u64::from(us));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.pauses.push(u64::from(ms) * 1_000);
    }
}
