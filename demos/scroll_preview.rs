//! Render a short ticker sequence for an 8x32 panel into an animated PNG.
//!
//! ```text
//! cargo run --features host --bin demo_scroll_preview -- preview.png
//! ```

use std::error::Error;

use embassy_futures::block_on;
use embassy_time::Duration;
use ticker_board::{
    RGB8,
    buffer::{buffer_cols, buffer_rows},
    color,
    effects::{Raindrop, SineWave},
    host::{RecordingDelay, RecordingStrip},
    matrix::{LedMatrix, MatrixConfig},
    scroll::{LEN_MODIFIER_DEFAULT, Timing},
    to_png::write_frames_apng,
};

const ROWS: usize = 8;
const COLS: usize = 32;
const BUF_ROWS: usize = buffer_rows(ROWS);
const BUF_COLS: usize = buffer_cols(COLS);
const FRAME_DELAY_MS: u32 = 40;
const MAX_DIMENSION: u32 = 640;

fn main() -> Result<(), Box<dyn Error>> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "scroll_preview.png".to_owned());

    let mut strip = RecordingStrip::new();
    let mut delay = RecordingDelay::new();
    let config = MatrixConfig::DEFAULT.with_brightness(1.0);
    let mut matrix = LedMatrix::<_, _, ROWS, COLS, BUF_ROWS, BUF_COLS>::new(
        &mut strip,
        &mut delay,
        config,
    )?;

    block_on(async {
        matrix
            .scroll_enter_right_exit_left("\\1 \\r14\\6", color::WHITE, 0, None, Timing::DEFAULT)
            .await?;
        matrix
            .scroll_enter_bottom_exit_left(
                "\\gGo!",
                color::WHITE,
                0,
                2,
                Timing::DEFAULT,
                LEN_MODIFIER_DEFAULT,
            )
            .await?;
        matrix.rainbow_columns(0.0, 1.0 / COLS as f32).await?;
        let wave = SineWave {
            freq: 0.4,
            phase_shift: 0.1,
            clear_last: true,
            color_shift: 0.3,
        };
        matrix.sine_wave(wave, Timing::DEFAULT).await?;
        matrix.rain(&raindrops()).await?;
        let quick = Timing::DEFAULT.with_frame_delay(Duration::from_ticks(0));
        matrix.wipe_columns(color::BLACK, quick).await
    })?;
    drop(matrix);

    let frames = strip.logical_frames::<ROWS, COLS>();
    let seconds = delay.total_micros() as f64 / 1_000_000.0;
    write_frames_apng(&frames, &output_path, MAX_DIMENSION, FRAME_DELAY_MS)?;
    println!(
        "{} frames ({seconds:.1} s on hardware) written to {output_path}",
        frames.len()
    );
    Ok(())
}

/// Evenly scattered drops in the hidden rows, cycling blue shades.
fn raindrops() -> Vec<Raindrop> {
    let shades = [
        RGB8::new(0, 60, 255),
        RGB8::new(0, 140, 255),
        RGB8::new(90, 200, 255),
    ];
    (0..24)
        .map(|drop_index: i32| Raindrop {
            row: (drop_index * 17) % (BUF_ROWS as i32 - 4),
            col: (drop_index * 11) % COLS as i32 + 1,
            color: shades[drop_index as usize % shades.len()],
        })
        .collect()
}
