//! Palettes, named palette generation, and nearest-color lookup.

use std::ops::Index;

use crate::color::{ColorMetric, Hsl, Lab, Rgb};
use crate::{Result, SpriteError};

/// Number of grayscale shades appended after every RGB grid.
const GRAY_SHADES: usize = 6;

/// An ordered, immutable set of colors addressed by positional index.
///
/// The index is the only externally visible identity of an entry. The empty
/// palette is a valid sentinel for "no palette requested"; approximating
/// against it is an error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    entries: Vec<Rgb>,
}

impl Palette {
    pub fn new(entries: Vec<Rgb>) -> Self {
        Self { entries }
    }

    /// The "no palette requested" sentinel.
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rgb> {
        self.entries.iter()
    }
}

impl Index<usize> for Palette {
    type Output = Rgb;

    fn index(&self, index: usize) -> &Rgb {
        &self.entries[index]
    }
}

/// Channel resolutions for a uniform RGB grid palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

impl GridSpec {
    pub const fn new(r: u32, g: u32, b: u32) -> Self {
        Self { r, g, b }
    }
}

/// Position `i` of `resolution` equally spaced steps from 0.0 to 1.0
/// inclusive. A single-step axis is degenerate and sits at 0.0.
fn grid_step(i: u32, resolution: u32) -> f32 {
    if resolution > 1 {
        i as f32 / (resolution - 1) as f32
    } else {
        0.0
    }
}

/// Builds a uniform R×G×B grid palette with [`GRAY_SHADES`] grayscale
/// entries appended at the end.
///
/// Entry 0 is black; the grayscale tail runs from black to white. Each axis
/// must have a resolution of at least 1.
pub fn grid_palette(spec: GridSpec) -> Result<Palette> {
    if spec.r == 0 || spec.g == 0 || spec.b == 0 {
        return Err(SpriteError::InvalidArgument(
            "grid channel resolution must be at least 1",
        ));
    }

    let colors = spec.r as usize * spec.g as usize * spec.b as usize;
    let mut entries = Vec::with_capacity(colors + GRAY_SHADES);

    for r in 0..spec.r {
        for g in 0..spec.g {
            for b in 0..spec.b {
                entries.push(Rgb::new(
                    grid_step(r, spec.r),
                    grid_step(g, spec.g),
                    grid_step(b, spec.b),
                ));
            }
        }
    }

    for shade in 0..GRAY_SHADES {
        let v = shade as f32 / (GRAY_SHADES - 1) as f32;
        entries.push(Rgb::new(v, v, v));
    }

    Ok(Palette::new(entries))
}

/// The classic 16-color EGA palette, derived by bit manipulation of the
/// index against the 6-bit rgbRGB register layout.
pub fn ega_palette() -> Palette {
    fn channel(bits: u32) -> f32 {
        (85 * bits) as f32 / 255.0
    }

    Palette::new(
        (0u32..16)
            .map(|i| {
                Rgb::new(
                    channel(((i >> 1) & 2) | ((i >> 5) & 1)),
                    channel((i & 2) | ((i >> 4) & 1)),
                    channel(((i << 1) & 2) | ((i >> 3) & 1)),
                )
            })
            .collect(),
    )
}

/// Table of named palettes.
///
/// The set of known grids is explicit state handed over at construction
/// rather than a process-wide registry; [`PaletteCatalog::standard`] is the
/// conventional starting set. Lookup is ASCII-case-insensitive.
#[derive(Debug, Clone)]
pub struct PaletteCatalog {
    grids: Vec<(String, GridSpec)>,
}

impl PaletteCatalog {
    /// Catalog with the conventional grid palettes registered: `rgb565`,
    /// `rgb685` and `rgb232`, each plus the grayscale tail. The fixed `ega`
    /// set is always available.
    pub fn standard() -> Self {
        Self {
            grids: vec![
                ("rgb565".to_string(), GridSpec::new(5, 6, 5)),
                ("rgb685".to_string(), GridSpec::new(6, 8, 5)),
                ("rgb232".to_string(), GridSpec::new(2, 3, 2)),
            ],
        }
    }

    /// Registers an additional named grid.
    pub fn with_grid(mut self, name: impl Into<String>, spec: GridSpec) -> Self {
        self.grids.push((name.into(), spec));
        self
    }

    /// Builds the palette registered under `name`.
    pub fn generate(&self, name: &str) -> Result<Palette> {
        if name.eq_ignore_ascii_case("ega") {
            return Ok(ega_palette());
        }

        let spec = self
            .grids
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, spec)| *spec)
            .ok_or_else(|| SpriteError::PaletteNotFound(name.to_string()))?;

        grid_palette(spec)
    }
}

/// Palette entries pre-converted into the selected metric's space, so the
/// per-pixel scan never re-derives them.
#[derive(Debug, Clone)]
enum MetricTable {
    Rgb,
    Hsl(Vec<Hsl>),
    Lab(Vec<Lab>),
}

/// Finds the closest palette entry to a color under a fixed metric.
#[derive(Debug, Clone)]
pub struct PaletteApproximator {
    palette: Palette,
    metric: ColorMetric,
    table: MetricTable,
}

impl PaletteApproximator {
    pub fn new(palette: Palette, metric: ColorMetric) -> Self {
        let table = match metric {
            ColorMetric::Rgb => MetricTable::Rgb,
            ColorMetric::Hsl => MetricTable::Hsl(palette.iter().map(|&c| Hsl::from_rgb(c)).collect()),
            ColorMetric::Lab => MetricTable::Lab(palette.iter().map(|&c| Lab::from_rgb(c)).collect()),
        };
        Self {
            palette,
            metric,
            table,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn metric(&self) -> ColorMetric {
        self.metric
    }

    /// Returns the index of the closest palette entry and the signed
    /// per-channel residual `color - entry` in RGB space.
    ///
    /// Every entry is scanned; ties keep the first entry encountered with
    /// the smallest distance. The residual is not consumed by the encoding
    /// pipeline itself but is available to error-diffusion callers.
    pub fn find_nearest(&self, color: Rgb) -> Result<(usize, Rgb)> {
        if self.palette.is_empty() {
            return Err(SpriteError::EmptyPalette);
        }

        let index = match &self.table {
            MetricTable::Rgb => nearest(self.palette.entries(), |&e| color.distance(e)),
            MetricTable::Hsl(table) => {
                let probe = Hsl::from_rgb(color);
                nearest(table, |&e| probe.distance(e))
            }
            MetricTable::Lab(table) => {
                let probe = Lab::from_rgb(color);
                nearest(table, |&e| probe.distance(e))
            }
        };

        Ok((index, color - self.palette[index]))
    }
}

fn nearest<T>(entries: &[T], distance: impl Fn(&T) -> f32) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, entry) in entries.iter().enumerate() {
        let d = distance(entry);
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}
