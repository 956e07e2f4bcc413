//! # spriteconv
//!
//! A Rust library for converting raster images into palette-indexed TGA
//! sprites.
//!
//! ## Features
//!
//! - **Palettes**: named fixed palettes (uniform RGB grids plus grayscale,
//!   and the classic 16-color EGA set)
//! - **Color matching**: exhaustive nearest-color search under a plain RGB,
//!   HSL, or perceptual CIEDE2000 Lab distance
//! - **Compression**: a windowed, packet-size-bounded run-length codec
//! - **Serialization**: bit-exact TGA 2.0 output (raw or RLE-packed indexed
//!   images, 24-bit color map, footer signature)
//!
//! ## Quick Start
//!
//! ```ignore
//! use spriteconv::{tga_encode, ColorMetric, PaletteCatalog, TgaWriterOptions};
//!
//! // RGBA image data (4 bytes per pixel)
//! let rgba = vec![255u8, 0, 0, 255, 0, 255, 0, 255]; // red and green pixels
//! let palette = PaletteCatalog::standard().generate("rgb685")?;
//! let bytes = tga_encode(
//!     &rgba,
//!     2,
//!     1,
//!     palette,
//!     ColorMetric::Rgb,
//!     TgaWriterOptions::default(),
//! )?;
//! std::fs::write("sprite.tga", bytes)?;
//! ```

use thiserror::Error;

pub mod color;
pub mod encoder;
pub mod palette;
pub mod rle;

pub use color::{ColorMetric, Hsl, Lab, Rgb, Xyz};
pub use encoder::{tga_encode, TgaWriter, TgaWriterOptions};
pub use palette::{GridSpec, Palette, PaletteApproximator, PaletteCatalog};
pub use rle::{Packet, RleCodec};

/// Errors that can occur while building palettes or encoding sprites.
#[derive(Debug, Error)]
pub enum SpriteError {
    /// Invalid image dimensions (zero, or too large for the container)
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Buffer size doesn't match expected size for dimensions
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// A numeric parameter is out of its valid range
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No palette is registered under the requested name
    #[error("palette not found: {0}")]
    PaletteNotFound(String),

    /// Nearest-color lookup against an empty palette has no defined minimum
    #[error("cannot approximate against an empty palette")]
    EmptyPalette,

    /// A color-map block was requested but no palette was supplied
    #[error("missing required palette")]
    MissingPalette,

    /// Indexed 8-bit output cannot address this many palette entries
    #[error("palette has {len} entries, color map supports at most 256")]
    PaletteTooLarge { len: usize },

    /// The writer was asked for something its configuration cannot do
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(&'static str),

    /// Internal invariant violation: the compressed stream does not cover
    /// the source pixels
    #[error("encoded data corrupted: {actual} bytes encoded from {expected} source bytes")]
    DataCorruption { expected: usize, actual: usize },

    /// An underlying I/O operation failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sprite conversion operations.
pub type Result<T> = core::result::Result<T, SpriteError>;

/// Largest palette an 8-bit indexed image can address.
pub(crate) const TGA_PALETTE_MAX: usize = 256;
