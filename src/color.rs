//! Named colors, text escape colors, HSV conversion, and output correction tables.
//!
//! Two HSV conventions live here and they are intentionally different:
//!
//! - [`rgb_to_hsv`] reports hue in degrees `[0, 360)` and saturation/value as percentages
//!   `[0, 100]`.
//! - [`hsv_to_rgb`] takes all three components as fractions in `[0, 1]`.
//!
//! To round-trip, divide the first by 360 and the other two by 100 (see [`Hsv::to_unit`]).

use smart_leds::RGB8;

/// `(255, 255, 255)`
pub const WHITE: RGB8 = RGB8::new(255, 255, 255);
/// `(0, 0, 0)`
pub const BLACK: RGB8 = RGB8::new(0, 0, 0);
/// `(255, 0, 0)`
pub const RED: RGB8 = RGB8::new(255, 0, 0);
/// `(0, 255, 0)`. Full-intensity green, unlike `smart_leds::colors::GREEN`.
pub const GREEN: RGB8 = RGB8::new(0, 255, 0);
/// `(0, 0, 255)`
pub const BLUE: RGB8 = RGB8::new(0, 0, 255);
/// `(255, 255, 0)`
pub const YELLOW: RGB8 = RGB8::new(255, 255, 0);
/// `(255, 0, 255)`
pub const MAGENTA: RGB8 = RGB8::new(255, 0, 255);
/// `(0, 255, 255)`
pub const CYAN: RGB8 = RGB8::new(0, 255, 255);

/// Colors selectable inline in rendered text with `\<key>`.
///
/// | key | color |
/// |-----|-------|
/// | `w` | [`WHITE`] |
/// | `r` | [`RED`] |
/// | `g` | [`GREEN`] |
/// | `b` | [`BLUE`] |
/// | `y` | [`YELLOW`] |
/// | `m` | [`MAGENTA`] |
/// | `c` | [`CYAN`] |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EscapeColor {
    /// `\w`
    White,
    /// `\r`
    Red,
    /// `\g`
    Green,
    /// `\b`
    Blue,
    /// `\y`
    Yellow,
    /// `\m`
    Magenta,
    /// `\c`
    Cyan,
}

impl EscapeColor {
    /// Look up the escape color for a key character, if it is one.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        match key {
            'w' => Some(Self::White),
            'r' => Some(Self::Red),
            'g' => Some(Self::Green),
            'b' => Some(Self::Blue),
            'y' => Some(Self::Yellow),
            'm' => Some(Self::Magenta),
            'c' => Some(Self::Cyan),
            _ => None,
        }
    }

    /// The key character that selects this color.
    #[must_use]
    pub const fn key(self) -> char {
        match self {
            Self::White => 'w',
            Self::Red => 'r',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::Yellow => 'y',
            Self::Magenta => 'm',
            Self::Cyan => 'c',
        }
    }

    /// The color this escape switches to.
    #[must_use]
    pub const fn color(self) -> RGB8 {
        match self {
            Self::White => WHITE,
            Self::Red => RED,
            Self::Green => GREEN,
            Self::Blue => BLUE,
            Self::Yellow => YELLOW,
            Self::Magenta => MAGENTA,
            Self::Cyan => CYAN,
        }
    }
}

/// Scale each channel by `brightness`, truncating toward zero.
///
/// Values outside `[0, 1]` saturate into `[0, 255]` rather than wrap.
#[must_use]
pub fn scale(color: RGB8, brightness: f32) -> RGB8 {
    // `as u8` on f32 saturates (and maps NaN to 0).
    let channel = |value: u8| (f32::from(value) * brightness) as u8;
    RGB8::new(channel(color.r), channel(color.g), channel(color.b))
}

// ============================================================================
// HSV
// ============================================================================

/// HSV triple as returned by [`rgb_to_hsv`]: hue in degrees, the rest in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hsv {
    /// Hue in degrees, `[0, 360)`. `0` for achromatic colors.
    pub hue: f32,
    /// Saturation in percent, `[0, 100]`.
    pub saturation: f32,
    /// Value in percent, `[0, 100]`.
    pub value: f32,
}

impl Hsv {
    /// Rescale to the `[0, 1]` triple that [`hsv_to_rgb`] expects.
    #[must_use]
    pub fn to_unit(self) -> (f32, f32, f32) {
        (self.hue / 360.0, self.saturation / 100.0, self.value / 100.0)
    }
}

/// Convert an RGB color to hue (degrees), saturation (percent), and value (percent).
#[must_use]
pub fn rgb_to_hsv(color: RGB8) -> Hsv {
    let max_channel = color.r.max(color.g).max(color.b);
    let min_channel = color.r.min(color.g).min(color.b);

    let red = f32::from(color.r) / 255.0;
    let green = f32::from(color.g) / 255.0;
    let blue = f32::from(color.b) / 255.0;
    let cmax = f32::from(max_channel) / 255.0;
    let diff = f32::from(max_channel - min_channel) / 255.0;

    // Channel ties are resolved red, then green, then blue.
    let hue = if max_channel == min_channel {
        0.0
    } else if max_channel == color.r {
        (60.0 * ((green - blue) / diff) + 360.0) % 360.0
    } else if max_channel == color.g {
        (60.0 * ((blue - red) / diff) + 120.0) % 360.0
    } else {
        (60.0 * ((red - green) / diff) + 240.0) % 360.0
    };

    let saturation = if max_channel == 0 {
        0.0
    } else {
        (diff / cmax) * 100.0
    };

    Hsv {
        hue,
        saturation,
        value: cmax * 100.0,
    }
}

/// Convert hue, saturation, and value, each in `[0, 1]`, to an RGB color.
///
/// Channels are truncated, not rounded, when scaled to `0..=255`.
#[must_use]
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> RGB8 {
    let to_channel = |unit: f32| (unit * 255.0) as u8;

    if saturation <= 0.0 {
        let gray = to_channel(value);
        return RGB8::new(gray, gray, gray);
    }

    let scaled_hue = hue * 6.0;
    let sector = scaled_hue as i32;
    let fraction = scaled_hue - sector as f32;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - fraction * saturation);
    let t = value * (1.0 - (1.0 - fraction) * saturation);

    let (red, green, blue) = match sector.rem_euclid(6) {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    RGB8::new(to_channel(red), to_channel(green), to_channel(blue))
}

// ============================================================================
// Output correction
// ============================================================================

/// Gamma correction mode applied when a frame is flushed to the strip.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gamma {
    /// Linear gamma (no correction). Gamma = 1.0
    #[default]
    Linear,
    /// Standard gamma 2.2 correction for perceived brightness.
    Gamma2_2,
}

/// Gamma 2.2 lookup table for 8-bit values.
/// Pre-computed to avoid floating point math: corrected = (value/255)^2.2 * 255
const GAMMA_2_2_TABLE: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 11, 11,
    11, 12, 12, 13, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 22, 22, 23,
    23, 24, 25, 25, 26, 26, 27, 28, 28, 29, 30, 30, 31, 32, 33, 33, 34, 35, 35, 36, 37, 38, 39, 39,
    40, 41, 42, 43, 43, 44, 45, 46, 47, 48, 49, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 73, 74, 75, 76, 77, 78, 79, 81, 82, 83, 84, 85, 87, 88,
    89, 90, 91, 93, 94, 95, 97, 98, 99, 100, 102, 103, 105, 106, 107, 109, 110, 111, 113, 114, 116,
    117, 119, 120, 121, 123, 124, 126, 127, 129, 130, 132, 133, 135, 137, 138, 140, 141, 143, 145,
    146, 148, 149, 151, 153, 154, 156, 158, 159, 161, 163, 165, 166, 168, 170, 172, 173, 175, 177,
    179, 181, 182, 184, 186, 188, 190, 192, 194, 196, 197, 199, 201, 203, 205, 207, 209, 211, 213,
    215, 217, 219, 221, 223, 225, 227, 229, 231, 234, 236, 238, 240, 242, 244, 246, 248, 251, 253,
    255,
];

/// Convert a brightness level in `[0, 1]` to the 8-bit scale used by [`generate_combo_table`].
#[must_use]
pub fn brightness_to_u8(level: f32) -> u8 {
    (level.clamp(0.0, 1.0) * 255.0) as u8
}

/// Generate a combined gamma correction and brightness scaling lookup table.
///
/// `combo_table[input_value]` is the value actually sent to the strip.
#[must_use]
pub const fn generate_combo_table(gamma: Gamma, max_brightness: u8) -> [u8; 256] {
    let mut result = [0u8; 256];
    let mut index = 0;
    while index < 256 {
        let corrected = match gamma {
            Gamma::Linear => index as u8,
            Gamma::Gamma2_2 => GAMMA_2_2_TABLE[index],
        };
        // (value * brightness) / 255
        result[index] = ((corrected as u16 * max_brightness as u16) / 255) as u8;
        index += 1;
    }
    result
}

/// Look up each channel of `color` in a table from [`generate_combo_table`].
#[must_use]
pub const fn correct(color: RGB8, combo_table: &[u8; 256]) -> RGB8 {
    RGB8::new(
        combo_table[color.r as usize],
        combo_table[color.g as usize],
        combo_table[color.b as usize],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn escape_keys_round_trip() {
        for key in ['w', 'r', 'g', 'b', 'y', 'm', 'c'] {
            let escape = EscapeColor::from_key(key).expect("known key");
            assert_eq!(escape.key(), key);
        }
        assert_eq!(EscapeColor::from_key('x'), None);
        assert_eq!(EscapeColor::from_key('R'), None);
        assert_eq!(EscapeColor::Green.color(), RGB8::new(0, 255, 0));
    }

    #[test]
    fn scale_truncates_and_saturates() {
        assert_eq!(scale(RGB8::new(255, 100, 3), 0.5), RGB8::new(127, 50, 1));
        assert_eq!(scale(WHITE, 0.0), BLACK);
        assert_eq!(scale(RGB8::new(200, 10, 0), 2.0), RGB8::new(255, 20, 0));
        assert_eq!(scale(WHITE, -1.0), BLACK);
    }

    #[test]
    fn rgb_to_hsv_primaries() {
        let red = rgb_to_hsv(RED);
        assert_close(red.hue, 0.0);
        assert_close(red.saturation, 100.0);
        assert_close(red.value, 100.0);

        assert_close(rgb_to_hsv(GREEN).hue, 120.0);
        assert_close(rgb_to_hsv(BLUE).hue, 240.0);
        assert_close(rgb_to_hsv(MAGENTA).hue, 300.0);
    }

    #[test]
    fn rgb_to_hsv_achromatic() {
        let gray = rgb_to_hsv(RGB8::new(128, 128, 128));
        assert_close(gray.hue, 0.0);
        assert_close(gray.saturation, 0.0);
        assert_close(gray.value, 50.2);

        let black = rgb_to_hsv(BLACK);
        assert_close(black.saturation, 0.0);
        assert_close(black.value, 0.0);
    }

    #[test]
    fn hsv_to_rgb_sectors() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), RED);
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0).g, 255);
        assert_eq!(hsv_to_rgb(0.5, 1.0, 1.0), CYAN);
        assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), RED);
        assert_eq!(hsv_to_rgb(0.3, 0.0, 0.5), RGB8::new(127, 127, 127));
    }

    #[test]
    fn hsv_round_trip_within_one_unit() {
        for color in [
            RED,
            GREEN,
            BLUE,
            YELLOW,
            CYAN,
            MAGENTA,
            RGB8::new(12, 200, 99),
            RGB8::new(250, 128, 3),
        ] {
            let (hue, saturation, value) = rgb_to_hsv(color).to_unit();
            let back = hsv_to_rgb(hue, saturation, value);
            for (before, after) in [(color.r, back.r), (color.g, back.g), (color.b, back.b)] {
                assert!(before.abs_diff(after) <= 1, "{color:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn hsv_to_rgb_then_back_recovers_hsv() {
        // One sample per hue sector, then a gray.
        let samples = [
            (0.05, 1.0, 1.0),
            (0.22, 0.8, 1.0),
            (0.40, 1.0, 0.9),
            (0.55, 0.8, 0.9),
            (0.72, 1.0, 1.0),
            (0.90, 0.6, 1.0),
            (0.3, 0.0, 0.5),
        ];
        for (hue, saturation, value) in samples {
            let hsv = rgb_to_hsv(hsv_to_rgb(hue, saturation, value));
            if saturation > 0.0 {
                assert_close(hsv.hue / 360.0, hue);
            } else {
                assert_eq!(hsv.hue, 0.0);
            }
            assert_close(hsv.saturation / 100.0, saturation);
            assert_close(hsv.value / 100.0, value);
        }
    }

    #[test]
    fn combo_table_scales_and_corrects() {
        let linear_full = generate_combo_table(Gamma::Linear, 255);
        assert_eq!(linear_full[200], 200);

        let linear_half = generate_combo_table(Gamma::Linear, 128);
        assert_eq!(linear_half[255], 128);
        assert_eq!(linear_half[0], 0);

        let gamma = generate_combo_table(Gamma::Gamma2_2, 255);
        assert_eq!(gamma[255], 255);
        assert!(gamma[128] < 128);

        assert_eq!(correct(WHITE, &linear_half), RGB8::new(128, 128, 128));
    }

    #[test]
    fn brightness_to_u8_clamps() {
        assert_eq!(brightness_to_u8(1.0), 255);
        assert_eq!(brightness_to_u8(2.0), 255);
        assert_eq!(brightness_to_u8(-0.5), 0);
        assert_eq!(brightness_to_u8(0.045), 11);
    }
}
