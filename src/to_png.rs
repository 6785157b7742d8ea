//! Render frames as PNG / animated PNG previews, each LED drawn as a soft round dot.
//!
//! Host only (`host` feature). Pair with [`crate::host::RecordingStrip::logical_frames`] to
//! preview an animation without a panel.

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

use png::{BitDepth, ColorType, Encoder, ScaledFloat};

use crate::surface::Frame;

/// Inverse gamma used to turn LED drive levels back into preview light levels.
pub const PREVIEW_INVERSE_GAMMA: f32 = 2.2;

/// Boxed error returned by the preview writers.
pub type PreviewResult = Result<(), Box<dyn Error>>;

/// Write one frame as a PNG whose longer side is at most `max_dimension` pixels.
///
/// # Errors
///
/// Returns an error for a non-positive `max_dimension`, or if the file cannot be written.
pub fn write_frame_png<const ROWS: usize, const COLS: usize>(
    frame: &Frame<ROWS, COLS>,
    output_path: impl AsRef<Path>,
    max_dimension: u32,
) -> PreviewResult {
    write_frame_png_with_gamma(frame, output_path, max_dimension, PREVIEW_INVERSE_GAMMA)
}

/// [`write_frame_png`] with a custom preview inverse gamma.
///
/// # Errors
///
/// Returns an error for invalid sizes or gamma, or if the file cannot be written.
pub fn write_frame_png_with_gamma<const ROWS: usize, const COLS: usize>(
    frame: &Frame<ROWS, COLS>,
    output_path: impl AsRef<Path>,
    max_dimension: u32,
    inverse_gamma: f32,
) -> PreviewResult {
    let output_path = output_path.as_ref();
    let dots = DotGeometry::fit::<ROWS, COLS>(max_dimension, inverse_gamma)?;
    let image = dots.render(frame);

    let mut encoder = Encoder::new(create_writer(output_path)?, dots.width, dots.height);
    configure(&mut encoder);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image)?;
    writer.finish()?;
    info!("wrote {}x{} PNG preview", dots.width, dots.height);
    Ok(())
}

/// Write `frames` as a looping animated PNG, `frame_delay_ms` per frame.
///
/// # Errors
///
/// Returns an error for an empty frame list, a delay outside `1..=65535` ms, a non-positive
/// `max_dimension`, or if the file cannot be written.
pub fn write_frames_apng<const ROWS: usize, const COLS: usize>(
    frames: &[Frame<ROWS, COLS>],
    output_path: impl AsRef<Path>,
    max_dimension: u32,
    frame_delay_ms: u32,
) -> PreviewResult {
    write_frames_apng_with_gamma(
        frames,
        output_path,
        max_dimension,
        frame_delay_ms,
        PREVIEW_INVERSE_GAMMA,
    )
}

/// [`write_frames_apng`] with a custom preview inverse gamma.
///
/// # Errors
///
/// As [`write_frames_apng`], plus a non-positive `inverse_gamma`.
pub fn write_frames_apng_with_gamma<const ROWS: usize, const COLS: usize>(
    frames: &[Frame<ROWS, COLS>],
    output_path: impl AsRef<Path>,
    max_dimension: u32,
    frame_delay_ms: u32,
    inverse_gamma: f32,
) -> PreviewResult {
    let output_path = output_path.as_ref();
    if frames.is_empty() {
        return Err(invalid("no frames to write"));
    }
    let delay_ms = u16::try_from(frame_delay_ms)
        .ok()
        .filter(|&ms| ms > 0)
        .ok_or_else(|| invalid("frame delay must be 1..=65535 ms"))?;
    let frame_count = u32::try_from(frames.len()).map_err(|_| invalid("too many frames"))?;
    let dots = DotGeometry::fit::<ROWS, COLS>(max_dimension, inverse_gamma)?;

    let mut encoder = Encoder::new(create_writer(output_path)?, dots.width, dots.height);
    configure(&mut encoder);
    // Zero plays forever.
    encoder.set_animated(frame_count, 0)?;
    let mut writer = encoder.write_header()?;
    for frame in frames {
        writer.set_frame_delay(delay_ms, 1000)?;
        writer.write_image_data(&dots.render(frame))?;
    }
    writer.finish()?;
    info!(
        "wrote {}x{} APNG preview, {} frames",
        dots.width,
        dots.height,
        frames.len()
    );
    Ok(())
}

fn invalid(message: &'static str) -> Box<dyn Error> {
    Box::new(io::Error::new(io::ErrorKind::InvalidInput, message))
}

fn create_writer(output_path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(output_path)?))
}

fn configure<W: io::Write>(encoder: &mut Encoder<'_, W>) {
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));
}

/// Pixel layout of a preview image: one square cell per LED, a round dot in each cell, and a
/// border one dot-radius wide.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DotGeometry {
    cell: u32,
    radius: u32,
    /// Distance from the dot center where the fade to black begins.
    solid_radius: f32,
    width: u32,
    height: u32,
    inverse_gamma: f32,
}

impl DotGeometry {
    fn with_cell(cell: u32, rows: u32, cols: u32, inverse_gamma: f32) -> Self {
        let margin = (cell / 8).max(1);
        let radius = cell.saturating_sub(margin * 2) / 2;
        Self {
            cell,
            radius,
            solid_radius: (radius - radius / 3) as f32,
            width: cols * cell + radius * 2,
            height: rows * cell + radius * 2,
            inverse_gamma,
        }
    }

    /// Largest cell size whose image fits in `max_dimension`.
    fn fit<const ROWS: usize, const COLS: usize>(
        max_dimension: u32,
        inverse_gamma: f32,
    ) -> Result<Self, Box<dyn Error>> {
        if max_dimension == 0 {
            return Err(invalid("max dimension must be positive"));
        }
        if inverse_gamma <= 0.0 {
            return Err(invalid("inverse gamma must be positive"));
        }
        let rows = u32::try_from(ROWS).map_err(|_| invalid("too many rows"))?;
        let cols = u32::try_from(COLS).map_err(|_| invalid("too many columns"))?;
        let fits = (1..=max_dimension)
            .rev()
            .map(|cell| Self::with_cell(cell, rows, cols, inverse_gamma))
            .find(|dots| dots.width.max(dots.height) <= max_dimension);
        // Dots need a radius of at least 3 so the fade has room.
        match fits {
            Some(dots) if dots.radius >= 3 => Ok(dots),
            _ => Err(invalid("max dimension too small for this panel")),
        }
    }

    /// 16-bit big-endian RGB samples for `frame`.
    fn render<const ROWS: usize, const COLS: usize>(&self, frame: &Frame<ROWS, COLS>) -> Vec<u8> {
        const BYTES_PER_PIXEL: usize = 6;
        let stride = self.width as usize * BYTES_PER_PIXEL;
        let mut image = vec![0u8; stride * self.height as usize];
        let center = (self.cell as i32 - 1) / 2;
        let radius = self.radius as i32;

        for (row, leds) in frame.iter().enumerate() {
            for (col, led) in leds.iter().enumerate() {
                let light = [led.r, led.g, led.b].map(|channel| self.light_level(channel));
                if light == [0.0; 3] {
                    continue;
                }
                let origin_x = self.radius + col as u32 * self.cell;
                let origin_y = self.radius + row as u32 * self.cell;
                for dy in 0..self.cell {
                    for dx in 0..self.cell {
                        let offset_x = dx as i32 - center;
                        let offset_y = dy as i32 - center;
                        let distance_sq = offset_x * offset_x + offset_y * offset_y;
                        if distance_sq > radius * radius {
                            continue;
                        }
                        let falloff = self.falloff((distance_sq as f32).sqrt());
                        let start = (origin_y + dy) as usize * stride
                            + (origin_x + dx) as usize * BYTES_PER_PIXEL;
                        for (sample, level) in image[start..start + BYTES_PER_PIXEL]
                            .chunks_exact_mut(2)
                            .zip(light)
                        {
                            sample.copy_from_slice(&to_u16(level * falloff).to_be_bytes());
                        }
                    }
                }
            }
        }
        image
    }

    fn light_level(&self, channel: u8) -> f32 {
        (f32::from(channel) / 255.0).powf(self.inverse_gamma)
    }

    fn falloff(&self, distance: f32) -> f32 {
        if distance <= self.solid_radius {
            return 1.0;
        }
        let fade = self.radius as f32 - self.solid_radius;
        (1.0 - (distance - self.solid_radius) / fade).max(0.0)
    }
}

fn to_u16(level: f32) -> u16 {
    (level.clamp(0.0, 1.0) * f32::from(u16::MAX)).round() as u16
}
