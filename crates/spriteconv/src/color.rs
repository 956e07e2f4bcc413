//! Color spaces and distance metrics used for palette matching.
//!
//! [`Rgb`] is the canonical representation, with channels normalized to
//! `[0, 1]`. [`Hsl`] and [`Lab`] are derived views computed by pure
//! conversion functions and never mutated afterwards. Every conversion is a
//! total function over the input domain; there is no error path here.

use std::f32::consts::PI;
use std::ops::Sub;

/// An RGB color with channels normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn max_channel(self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    pub fn min_channel(self) -> f32 {
        self.r.min(self.g).min(self.b)
    }

    /// Euclidean distance in the RGB unit cube.
    pub fn distance(self, other: Rgb) -> f32 {
        let d = self - other;
        (d.r * d.r + d.g * d.g + d.b * d.b).sqrt()
    }
}

/// Signed per-channel residual, used for quantization error.
impl Sub for Rgb {
    type Output = Rgb;

    fn sub(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

/// A color in HSL space; all components normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    /// Standard min/max hue derivation. Achromatic input (max == min) yields
    /// hue 0 and saturation 0; this is a designed edge case, not an error.
    pub fn from_rgb(rgb: Rgb) -> Self {
        let min = rgb.min_channel();
        let max = rgb.max_channel();
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta == 0.0 {
            return Hsl { h: 0.0, s: 0.0, l };
        }

        let s = if l < 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let dr = (((max - rgb.r) / 6.0) + (delta / 2.0)) / delta;
        let dg = (((max - rgb.g) / 6.0) + (delta / 2.0)) / delta;
        let db = (((max - rgb.b) / 6.0) + (delta / 2.0)) / delta;

        let mut h = if rgb.r >= max {
            db - dg
        } else if rgb.g >= max {
            (1.0 / 3.0) + dr - db
        } else {
            (2.0 / 3.0) + dg - dr
        };

        if h < 0.0 {
            h += 1.0;
        } else if h > 1.0 {
            h -= 1.0;
        }

        Hsl { h, s, l }
    }

    /// Euclidean distance over (h, s, l).
    pub fn distance(self, other: Hsl) -> f32 {
        let dh = self.h - other.h;
        let ds = self.s - other.s;
        let dl = self.l - other.l;
        (dh * dh + ds * ds + dl * dl).sqrt()
    }
}

/// Intermediate CIE XYZ coordinates, scaled so that Y spans `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// sRGB gamma expansion of one channel.
fn gamma_expand(c: f32) -> f32 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

impl Xyz {
    pub fn from_rgb(rgb: Rgb) -> Self {
        let r = gamma_expand(rgb.r) * 100.0;
        let g = gamma_expand(rgb.g) * 100.0;
        let b = gamma_expand(rgb.b) * 100.0;

        Xyz {
            x: r * 0.4124 + g * 0.3576 + b * 0.1805,
            y: r * 0.2126 + g * 0.7152 + b * 0.0722,
            z: r * 0.0193 + g * 0.1192 + b * 0.9505,
        }
    }
}

const LAB_EPSILON: f32 = 0.008856;

/// Cube-root compression with the standard linear segment near zero.
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// A color in CIE L*a*b* space under the D65 reference white.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    pub fn from_rgb(rgb: Rgb) -> Self {
        Self::from_xyz(Xyz::from_rgb(rgb))
    }

    pub fn from_xyz(xyz: Xyz) -> Self {
        let x = lab_f(xyz.x / 95.0489);
        let y = lab_f(xyz.y / 100.0);
        let z = lab_f(xyz.z / 108.883);

        Lab {
            l: (116.0 * y - 16.0).max(0.0),
            a: 500.0 * (x - y),
            b: 200.0 * (y - z),
        }
    }

    /// CIEDE2000 perceptual color difference (ΔE00) with kl = kc = kh = 1.
    ///
    /// Hue angles are kept in radians; the mean hue adds 2π before averaging
    /// when the two hues are more than π apart.
    pub fn distance(self, other: Lab) -> f32 {
        let l_mean = (self.l + other.l) / 2.0;
        let c1 = (self.a * self.a + self.b * self.b).sqrt();
        let c2 = (other.a * other.a + other.b * other.b).sqrt();
        let c_mean = (c1 + c2) / 2.0;

        let g = (1.0 - (c_mean.powi(7) / (c_mean.powi(7) + 25.0f32.powi(7))).sqrt()) / 2.0;
        let a1p = self.a * (1.0 + g);
        let a2p = other.a * (1.0 + g);

        let c1p = (a1p * a1p + self.b * self.b).sqrt();
        let c2p = (a2p * a2p + other.b * other.b).sqrt();
        let cp_mean = (c1p + c2p) / 2.0;

        let h1p = positive_angle(self.b.atan2(a1p));
        let h2p = positive_angle(other.b.atan2(a2p));
        let hp_mean = if (h1p - h2p).abs() > PI {
            (h1p + h2p + 2.0 * PI) / 2.0
        } else {
            (h1p + h2p) / 2.0
        };

        let t = 1.0 - 0.17 * (hp_mean - PI / 6.0).cos()
            + 0.24 * (2.0 * hp_mean).cos()
            + 0.32 * (3.0 * hp_mean + PI / 30.0).cos()
            - 0.20 * (4.0 * hp_mean - 21.0 * PI / 60.0).cos();

        let dhp = if (h1p - h2p).abs() <= PI {
            h2p - h1p
        } else if h2p <= h1p {
            h2p - h1p + 2.0 * PI
        } else {
            h2p - h1p - 2.0 * PI
        };

        // operand order matters for the signs of ΔL' and ΔC'
        let dl = other.l - self.l;
        let dc = c2p - c1p;
        let dh = 2.0 * (c1p * c2p).sqrt() * (dhp / 2.0).sin();

        let sl = 1.0
            + (0.015 * (l_mean - 50.0) * (l_mean - 50.0))
                / (20.0 + (l_mean - 50.0) * (l_mean - 50.0)).sqrt();
        let sc = 1.0 + 0.045 * cp_mean;
        let sh = 1.0 + 0.015 * cp_mean * t;

        let hue_deg = 180.0 / PI * hp_mean;
        let d_theta =
            (30.0 * PI / 180.0) * (-((hue_deg - 275.0) / 25.0) * ((hue_deg - 275.0) / 25.0)).exp();
        let rc = 2.0 * (cp_mean.powi(7) / (cp_mean.powi(7) + 25.0f32.powi(7))).sqrt();
        let rt = -rc * (2.0 * d_theta).sin();

        const KL: f32 = 1.0;
        const KC: f32 = 1.0;
        const KH: f32 = 1.0;

        ((dl / (KL * sl)) * (dl / (KL * sl))
            + (dc / (KC * sc)) * (dc / (KC * sc))
            + (dh / (KH * sh)) * (dh / (KH * sh))
            + rt * (dc / (KC * sc)) * (dh / (KH * sh)))
            .sqrt()
    }
}

/// Maps an `atan2` result from `(-π, π]` into `[0, 2π)`.
fn positive_angle(h: f32) -> f32 {
    if h < 0.0 {
        h + 2.0 * PI
    } else {
        h
    }
}

/// Selects the color space a palette match is scored in.
///
/// The metric is injected as a plain value; every variant shares the same
/// exhaustive nearest-entry scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMetric {
    /// Euclidean distance in the RGB cube. Fast, not perceptual.
    #[default]
    Rgb,
    /// Euclidean distance over hue/saturation/lightness.
    Hsl,
    /// CIEDE2000 in L*a*b* space. Perceptually uniform, most expensive.
    Lab,
}

impl ColorMetric {
    /// Distance between two RGB colors under this metric.
    pub fn distance(self, a: Rgb, b: Rgb) -> f32 {
        match self {
            ColorMetric::Rgb => a.distance(b),
            ColorMetric::Hsl => Hsl::from_rgb(a).distance(Hsl::from_rgb(b)),
            ColorMetric::Lab => Lab::from_rgb(a).distance(Lab::from_rgb(b)),
        }
    }
}
