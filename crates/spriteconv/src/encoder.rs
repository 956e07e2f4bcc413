//! TGA sprite serializer.
//!
//! Resolves every source pixel to a palette index, optionally run-length
//! packs the index buffer, and writes the indexed-color TGA container
//! byte-for-byte: fixed header, optional 24-bit BGR color map, pixel data,
//! and the TGA 2.0 footer.

use std::io::Write;

use crate::color::{ColorMetric, Rgb};
use crate::palette::{Palette, PaletteApproximator};
use crate::rle::{Packet, RleCodec};
use crate::{Result, SpriteError, TGA_PALETTE_MAX};

/// NUL-terminated signature closing every TGA 2.0 file. Readers are
/// expected to reject files without it.
const TGA_SIGNATURE: &[u8; 18] = b"TRUEVISION-XFILE.\0";

/// Largest symbol count a TGA RLE packet header can carry (7-bit field).
const MAX_RLE_PACKET_SIZE: usize = 127;

/// Runs must be strictly longer than this to become run packets.
const MIN_REPETITION: usize = 2;

/// Bit 5 of the image descriptor selects top-to-bottom scanline order.
const DESCRIPTOR_TOP_TO_BOTTOM: u8 = 0b0010_0000;

// header field values for the indexed forms this writer emits
const COLOR_MAP_NONE: u8 = 0;
const COLOR_MAP_INDEXED: u8 = 1;
const IMAGE_TYPE_INDEXED: u8 = 1;
const IMAGE_TYPE_RLE_INDEXED: u8 = 9;

/// Options for the TGA sprite writer.
#[derive(Debug, Clone)]
pub struct TgaWriterOptions {
    /// Emit the color-map block and mark the header as color-mapped.
    /// Without it most viewers cannot open the file standalone.
    pub write_palette: bool,

    /// Run-length pack the pixel data.
    pub rle_encode: bool,

    /// RLE window size in bytes; `0` compresses the image as one window.
    /// Pass the image width to keep packets from crossing scanlines.
    pub rle_window_size: usize,
}

impl Default for TgaWriterOptions {
    fn default() -> Self {
        Self {
            write_palette: true,
            rle_encode: false,
            rle_window_size: 0,
        }
    }
}

/// Serializes RGBA images into palette-indexed TGA files.
///
/// The run-length codec is an optional collaborator: requesting
/// [`TgaWriterOptions::rle_encode`] without attaching one is an
/// unsupported configuration, not a silent fallback to raw output.
#[derive(Debug, Clone)]
pub struct TgaWriter {
    approximator: PaletteApproximator,
    options: TgaWriterOptions,
    rle_codec: Option<RleCodec>,
}

impl TgaWriter {
    pub fn new(approximator: PaletteApproximator, options: TgaWriterOptions) -> Self {
        Self {
            approximator,
            options,
            rle_codec: None,
        }
    }

    /// Attaches the codec used when [`TgaWriterOptions::rle_encode`] is set.
    pub fn with_rle_codec(mut self, codec: RleCodec) -> Self {
        self.rle_codec = Some(codec);
        self
    }

    /// Encodes `rgba` (4 bytes per pixel, row-major, top-to-bottom) into a
    /// complete TGA file held in memory.
    pub fn encode(&self, rgba: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
        if width == 0 || height == 0 || width > u16::MAX as usize || height > u16::MAX as usize {
            return Err(SpriteError::InvalidDimensions { width, height });
        }
        let expected = width * height * 4;
        if rgba.len() != expected {
            return Err(SpriteError::BufferSizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }

        let palette = self.approximator.palette();
        if self.options.write_palette && palette.is_empty() {
            return Err(SpriteError::MissingPalette);
        }
        if self.options.rle_encode && self.rle_codec.is_none() {
            return Err(SpriteError::UnsupportedConfiguration(
                "run-length encoding requested without a codec",
            ));
        }
        if palette.len() > TGA_PALETTE_MAX {
            return Err(SpriteError::PaletteTooLarge {
                len: palette.len(),
            });
        }

        let indices = self.image_indices(rgba)?;

        let mut out = Vec::with_capacity(18 + palette.len() * 3 + indices.len() + 26);
        self.write_header(&mut out, width as u16, height as u16);
        if self.options.write_palette {
            write_palette_data(&mut out, palette);
        }
        self.write_image_data(&mut out, &indices)?;
        write_footer(&mut out);

        Ok(out)
    }

    /// Encodes and writes a complete file into `out`, flushing before
    /// returning.
    ///
    /// The file is assembled in memory first, so a failing encode never
    /// leaves a truncated file behind.
    pub fn write(&self, rgba: &[u8], width: usize, height: usize, out: &mut impl Write) -> Result<()> {
        let bytes = self.encode(rgba, width, height)?;
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }

    /// Resolves every pixel to a palette index, row-major.
    ///
    /// Fully transparent pixels map to the reserved index 0 without
    /// consulting the approximator, whatever their RGB channels say.
    fn image_indices(&self, rgba: &[u8]) -> Result<Vec<u8>> {
        let mut indices = Vec::with_capacity(rgba.len() / 4);
        for pixel in rgba.chunks_exact(4) {
            if pixel[3] == 0 {
                indices.push(0);
                continue;
            }
            let color = Rgb::from_u8(pixel[0], pixel[1], pixel[2]);
            let (index, _error) = self.approximator.find_nearest(color)?;
            indices.push(index as u8);
        }
        Ok(indices)
    }

    /// The fixed 18-byte header. Field order is load-bearing.
    fn write_header(&self, out: &mut Vec<u8>, width: u16, height: u16) {
        let palette = self.approximator.palette();

        // image id length; no id block is ever emitted
        out.push(0);
        out.push(if self.options.write_palette {
            COLOR_MAP_INDEXED
        } else {
            COLOR_MAP_NONE
        });
        out.push(if self.options.rle_encode {
            IMAGE_TYPE_RLE_INDEXED
        } else {
            IMAGE_TYPE_INDEXED
        });
        // color map first index
        out.extend_from_slice(&0u16.to_le_bytes());
        let color_map_len = if self.options.write_palette {
            palette.len() as u16
        } else {
            0
        };
        out.extend_from_slice(&color_map_len.to_le_bytes());
        // bits per color map entry
        out.push(24);
        // origin x, origin y
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        // bits per pixel; indices into an 8-bit palette
        out.push(8);
        out.push(DESCRIPTOR_TOP_TO_BOTTOM);
    }

    /// Pixel data block: raw indices, or the RLE packet stream.
    fn write_image_data(&self, out: &mut Vec<u8>, indices: &[u8]) -> Result<()> {
        if !self.options.rle_encode {
            out.extend_from_slice(indices);
            return Ok(());
        }

        let codec = self.rle_codec.as_ref().ok_or(SpriteError::UnsupportedConfiguration(
            "run-length encoding requested without a codec",
        ))?;
        let packets = codec.encode_windowed(
            indices,
            self.options.rle_window_size,
            MIN_REPETITION,
            MAX_RLE_PACKET_SIZE,
        )?;

        let encoded: usize = packets.iter().map(Packet::len).sum();
        if encoded != indices.len() {
            return Err(SpriteError::DataCorruption {
                expected: indices.len(),
                actual: encoded,
            });
        }

        for packet in &packets {
            match packet {
                // high bit set, low 7 bits = count - 1, one symbol payload
                Packet::Run { value, count } => {
                    out.push(0x80 | (*count as u8 - 1));
                    out.push(*value);
                }
                // high bit clear, low 7 bits = length - 1, verbatim payload
                Packet::Literal(symbols) => {
                    out.push(symbols.len() as u8 - 1);
                    out.extend_from_slice(symbols);
                }
            }
        }
        Ok(())
    }
}

/// Color map block: one BGR triple per entry, channels truncated (never
/// rounded) to 8 bits.
fn write_palette_data(out: &mut Vec<u8>, palette: &Palette) {
    for color in palette.iter() {
        out.push((color.b * 255.0).floor() as u8);
        out.push((color.g * 255.0).floor() as u8);
        out.push((color.r * 255.0).floor() as u8);
    }
}

/// TGA 2.0 footer: two zero area offsets and the signature. Readers treat
/// a file without this block as malformed.
fn write_footer(out: &mut Vec<u8>) {
    // extension area offset
    out.extend_from_slice(&0u32.to_le_bytes());
    // developer area offset
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(TGA_SIGNATURE);
}

/// Encodes `rgba` against `palette` in one call, with the codec wired in.
///
/// # Example
/// ```ignore
/// use spriteconv::{tga_encode, ColorMetric, PaletteCatalog, TgaWriterOptions};
///
/// let rgba = vec![255u8, 0, 0, 255]; // 1x1 red pixel
/// let palette = PaletteCatalog::standard().generate("ega")?;
/// let bytes = tga_encode(&rgba, 1, 1, palette, ColorMetric::Lab, TgaWriterOptions::default())?;
/// ```
pub fn tga_encode(
    rgba: &[u8],
    width: usize,
    height: usize,
    palette: Palette,
    metric: ColorMetric,
    options: TgaWriterOptions,
) -> Result<Vec<u8>> {
    TgaWriter::new(PaletteApproximator::new(palette, metric), options)
        .with_rle_codec(RleCodec)
        .encode(rgba, width, height)
}
