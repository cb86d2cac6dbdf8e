//! Color type and 8-bit output encoding.

use lumen_math::{Interval, Vec3};
use std::io::{self, Write};

/// Color type alias (linear RGB, unclamped until output)
pub type Color = Vec3;

/// Clamp range for channel values just before quantization.
const INTENSITY: Interval = Interval { min: 0.0, max: 1.0 };

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Encode a linear color as 8-bit RGB: gamma, clamp to [0, 1], scale to 255.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let r = (255.0 * INTENSITY.clamp(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * INTENSITY.clamp(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * INTENSITY.clamp(linear_to_gamma(color.z))) as u8;
    [r, g, b]
}

/// Write one pixel as a plain-PPM `r g b` line.
pub fn write_color<W: Write>(writer: &mut W, color: Color) -> io::Result<()> {
    let [r, g, b] = color_to_rgb8(color);
    writeln!(writer, "{} {} {}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);

        // Negative and NaN inputs floor to zero
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert_eq!(linear_to_gamma(f32::NAN), 0.0);
    }

    #[test]
    fn test_color_to_rgb8_clamps() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);

        // Out-of-range energy clamps instead of wrapping
        assert_eq!(color_to_rgb8(Color::new(4.0, -2.0, 0.25)), [255, 0, 127]);
    }

    #[test]
    fn test_write_color_format() {
        let mut out = Vec::new();
        write_color(&mut out, Color::new(1.0, 0.0, 1.0)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "255 0 255\n");
    }
}
