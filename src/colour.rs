use serde::Serialize;
use thiserror::Error;

const MIN_MIREDS: u32 = 153;
const MAX_MIREDS: u32 = 500;

/// Errors returned by colour argument validation.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ColourError {
    /// A chromaticity coordinate was outside the accepted range.
    #[error("chromaticity coordinate {axis} = {value} is outside 0.0..=1.0")]
    ChromaticityOutOfRange { axis: char, value: f64 },
    /// A brightness argument was outside the accepted range.
    #[error("brightness {value} is outside 0.0..=1.0")]
    BrightnessOutOfRange { value: f64 },
}

/// Canonical RGBA colour with every component in `0.0..=1.0`.
///
/// All colour inputs accepted by the session normalise into this one
/// representation before they reach the mixer. Construction clamps RGB
/// channels and validates chromaticity/brightness arguments, so a stored
/// `Colour` never carries an out-of-range component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Colour {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl Colour {
    /// Creates a colour from floating RGB channels; alpha defaults to 1.0.
    ///
    /// Channels are clamped into `0.0..=1.0`. Non-finite inputs clamp to 0.
    ///
    /// ```
    /// use luxcast::Colour;
    ///
    /// let colour = Colour::from_rgb(1.5, 0.25, -0.1);
    /// assert_eq!((1.0, 0.25, 0.0, 1.0), colour.channels());
    /// ```
    #[must_use]
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Self {
        Self::from_rgba(r, g, b, 1.0)
    }

    /// Creates a colour from floating RGBA channels, clamping each into range.
    #[must_use]
    pub fn from_rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: clamp_unit(r),
            g: clamp_unit(g),
            b: clamp_unit(b),
            a: clamp_unit(a),
        }
    }

    /// Creates a colour from 8-bit RGB channels; alpha defaults to 1.0.
    ///
    /// ```
    /// use luxcast::Colour;
    ///
    /// let red = Colour::from_rgb8(255, 0, 0);
    /// assert_eq!((1.0, 0.0, 0.0, 1.0), red.channels());
    /// ```
    #[must_use]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 1.0)
    }

    /// Creates a colour from 8-bit RGB channels and a floating alpha in
    /// `0.0..=1.0` (clamped).
    #[must_use]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self::from_rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            a,
        )
    }

    /// Creates a colour from CIE 1931 xy chromaticity plus brightness.
    ///
    /// Both coordinates and the brightness must lie in `0.0..=1.0`. The
    /// brightness is carried in the alpha channel.
    ///
    /// # Errors
    ///
    /// Returns an error when a coordinate or the brightness is out of range.
    pub fn from_xy(x: f64, y: f64, brightness: f64) -> Result<Self, ColourError> {
        validate_chromaticity('x', x)?;
        validate_chromaticity('y', y)?;
        validate_brightness(brightness)?;

        let (r, g, b) = xy_to_rgb(x, y);
        Ok(Self {
            r,
            g,
            b,
            a: brightness,
        })
    }

    /// Creates a colour from a colour temperature in mireds plus brightness.
    ///
    /// Mireds outside the bridge domain `153..=500` are clamped into it; the
    /// brightness must lie in `0.0..=1.0` and is carried in the alpha channel.
    ///
    /// # Errors
    ///
    /// Returns an error when the brightness is out of range.
    pub fn from_mireds(mireds: u32, brightness: f64) -> Result<Self, ColourError> {
        validate_brightness(brightness)?;

        let mireds = mireds.clamp(MIN_MIREDS, MAX_MIREDS);
        let kelvin = 1.0e6 / f64::from(mireds);
        let (x, y) = cct_to_xy(kelvin);
        let (r, g, b) = xy_to_rgb(x, y);
        Ok(Self {
            r,
            g,
            b,
            a: brightness,
        })
    }

    /// Creates a white colour dimmed by the given brightness factor.
    ///
    /// # Errors
    ///
    /// Returns an error when the brightness is out of range.
    ///
    /// ```
    /// use luxcast::Colour;
    ///
    /// let half = Colour::from_brightness(0.5)?;
    /// assert_eq!((0.5, 0.5, 0.5, 1.0), half.channels());
    /// # Ok::<(), luxcast::ColourError>(())
    /// ```
    pub fn from_brightness(brightness: f64) -> Result<Self, ColourError> {
        validate_brightness(brightness)?;
        Ok(Self::white().scaled(brightness))
    }

    /// Full-intensity white.
    #[must_use]
    pub fn white() -> Self {
        Self {
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
        }
    }

    /// Returns this colour with the RGB channels scaled by a factor.
    ///
    /// The factor is clamped into `0.0..=1.0`; alpha is left untouched.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        let factor = clamp_unit(factor);
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    /// Red channel in `0.0..=1.0`.
    #[must_use]
    pub fn red(&self) -> f64 {
        self.r
    }

    /// Green channel in `0.0..=1.0`.
    #[must_use]
    pub fn green(&self) -> f64 {
        self.g
    }

    /// Blue channel in `0.0..=1.0`.
    #[must_use]
    pub fn blue(&self) -> f64 {
        self.b
    }

    /// Alpha channel in `0.0..=1.0`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.a
    }

    /// Returns all four channels as an `(r, g, b, a)` tuple.
    #[must_use]
    pub fn channels(&self) -> (f64, f64, f64, f64) {
        (self.r, self.g, self.b, self.a)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn validate_chromaticity(axis: char, value: f64) -> Result<(), ColourError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ColourError::ChromaticityOutOfRange { axis, value })
    }
}

fn validate_brightness(value: f64) -> Result<(), ColourError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ColourError::BrightnessOutOfRange { value })
    }
}

/// Converts CIE xy chromaticity at full luminance to gamma-encoded sRGB.
fn xy_to_rgb(x: f64, y: f64) -> (f64, f64, f64) {
    if y <= f64::EPSILON {
        return (0.0, 0.0, 0.0);
    }

    // xyY (Y = 1) to XYZ
    let cap_x = x / y;
    let cap_y = 1.0;
    let cap_z = (1.0 - x - y) / y;

    // XYZ to linear sRGB (D65 reference, sRGB primaries)
    let r_lin = cap_x * 3.2404542 + cap_y * -1.5371385 + cap_z * -0.4985314;
    let g_lin = cap_x * -0.9692660 + cap_y * 1.8760108 + cap_z * 0.0415560;
    let b_lin = cap_x * 0.0556434 + cap_y * -0.2040259 + cap_z * 1.0572252;

    // Normalise so the brightest channel lands on 1.0, then gamma-encode.
    let peak = r_lin.max(g_lin).max(b_lin);
    let scale = if peak > 1.0 { 1.0 / peak } else { 1.0 };
    (
        gamma_encode(r_lin * scale),
        gamma_encode(g_lin * scale),
        gamma_encode(b_lin * scale),
    )
}

fn gamma_encode(linear: f64) -> f64 {
    let linear = linear.clamp(0.0, 1.0);
    if linear <= 0.003_130_8 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

// Kang, Moon, Hong, Lee, Cho, Kim (2002), "Design of Advanced Color
// Temperature Control System for HDTV Applications", equations 8 and 9.
fn cct_to_xy(kelvin: f64) -> (f64, f64) {
    let mired = 1.0e6 / kelvin;
    let mired2 = mired * mired;
    let mired3 = mired2 * mired;
    let x = if kelvin < 4000.0 {
        -0.2661239e9 * mired3 - 0.2343589e6 * mired2 + 0.8776956e3 * mired + 0.179910
    } else {
        -3.0258469e9 * mired3 + 2.1070379e6 * mired2 + 0.2226347e3 * mired + 0.24039
    };
    let x2 = x * x;
    let x3 = x2 * x;
    let y = if kelvin < 2222.0 {
        -1.1063814 * x3 - 1.34811020 * x2 + 2.18555832 * x - 0.20219683
    } else if kelvin < 4000.0 {
        -0.9549476 * x3 - 1.37418593 * x2 + 2.09137015 * x - 0.16748867
    } else {
        3.0817580 * x3 - 5.8733867 * x2 + 3.75112997 * x - 0.37001483
    };
    (x, y)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0, 0)]
    #[case(255, 255, 255)]
    #[case(255, 0, 0)]
    #[case(12, 34, 56)]
    fn rgb8_normalises_within_one_count(#[case] r: u8, #[case] g: u8, #[case] b: u8) {
        let colour = Colour::from_rgb8(r, g, b);
        for (channel, byte) in [
            (colour.red(), r),
            (colour.green(), g),
            (colour.blue(), b),
        ] {
            assert!((0.0..=1.0).contains(&channel));
            assert!((channel - f64::from(byte) / 255.0).abs() <= 1.0 / 255.0);
        }
        assert_eq!(1.0, colour.alpha());
    }

    #[rstest]
    #[case(1.5, 1.0)]
    #[case(-0.2, 0.0)]
    #[case(f64::NAN, 0.0)]
    #[case(f64::INFINITY, 1.0)]
    fn rgb_inputs_clamp_instead_of_erroring(#[case] input: f64, #[case] expected: f64) {
        let colour = Colour::from_rgb(input, 0.5, 0.5);
        assert_eq!(expected, colour.red());
    }

    #[rstest]
    #[case(1.2, 0.3)]
    #[case(-0.1, 0.3)]
    #[case(0.3, 1.01)]
    fn xy_rejects_out_of_range_coordinates(#[case] x: f64, #[case] y: f64) {
        let result = Colour::from_xy(x, y, 0.5);
        assert_matches!(result, Err(ColourError::ChromaticityOutOfRange { .. }));
    }

    #[test]
    fn xy_rejects_out_of_range_brightness() {
        let result = Colour::from_xy(0.3, 0.3, 1.5);
        assert_matches!(
            result,
            Err(ColourError::BrightnessOutOfRange { value }) if value == 1.5
        );
    }

    #[test]
    fn xy_carries_brightness_in_alpha() {
        let colour = Colour::from_xy(0.32, 0.33, 0.25).expect("in-range xy should convert");
        assert_eq!(0.25, colour.alpha());
        let (r, g, b, _) = colour.channels();
        for channel in [r, g, b] {
            assert!((0.0..=1.0).contains(&channel));
        }
    }

    #[test]
    fn warm_mireds_lean_red() {
        let warm = Colour::from_mireds(500, 1.0).expect("warm mireds should convert");
        assert!(warm.red() > warm.blue());
    }

    #[test]
    fn mired_extremes_produce_distinct_colours() {
        let warm = Colour::from_mireds(500, 1.0).expect("warm mireds should convert");
        let cool = Colour::from_mireds(153, 1.0).expect("cool mireds should convert");
        assert!(warm != cool);
    }

    #[test]
    fn out_of_domain_mireds_clamp_to_domain() {
        let below = Colour::from_mireds(50, 1.0).expect("clamped mireds should convert");
        let floor = Colour::from_mireds(153, 1.0).expect("in-domain mireds should convert");
        assert_eq!(floor, below);
    }

    #[test]
    fn mireds_reject_out_of_range_brightness() {
        let result = Colour::from_mireds(300, -0.5);
        assert_matches!(result, Err(ColourError::BrightnessOutOfRange { .. }));
    }

    #[rstest]
    #[case(0.0, (0.0, 0.0, 0.0, 1.0))]
    #[case(0.5, (0.5, 0.5, 0.5, 1.0))]
    #[case(1.0, (1.0, 1.0, 1.0, 1.0))]
    fn brightness_helper_scales_white(
        #[case] brightness: f64,
        #[case] expected: (f64, f64, f64, f64),
    ) {
        let colour = Colour::from_brightness(brightness).expect("valid brightness");
        assert_eq!(expected, colour.channels());
    }

    #[test]
    fn brightness_helper_rejects_out_of_range() {
        assert_matches!(
            Colour::from_brightness(1.2),
            Err(ColourError::BrightnessOutOfRange { .. })
        );
    }
}
