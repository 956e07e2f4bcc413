use pretty_assertions::assert_eq;
use spriteconv::{
    tga_encode, ColorMetric, Palette, PaletteApproximator, PaletteCatalog, Rgb, RleCodec,
    TgaWriter, TgaWriterOptions,
};

const FOOTER_LEN: usize = 26;
const SIGNATURE: &[u8] = b"TRUEVISION-XFILE.\0";

fn black_white_palette() -> Palette {
    Palette::new(vec![Rgb::new(0.0, 0.0, 0.0), Rgb::new(1.0, 1.0, 1.0)])
}

fn writer(palette: Palette, options: TgaWriterOptions) -> TgaWriter {
    TgaWriter::new(PaletteApproximator::new(palette, ColorMetric::Rgb), options).with_rle_codec(RleCodec)
}

/// Opaque RGBA pixel from float channels.
fn px(r: f32, g: f32, b: f32) -> [u8; 4] {
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255]
}

#[test]
fn raw_indexed_file_is_byte_exact() {
    // 2x2 checkerboard: black, white / white, black
    let rgba: Vec<u8> = [px(0.0, 0.0, 0.0), px(1.0, 1.0, 1.0), px(1.0, 1.0, 1.0), px(0.0, 0.0, 0.0)]
        .concat();

    let bytes = writer(black_white_palette(), TgaWriterOptions::default())
        .encode(&rgba, 2, 2)
        .unwrap();

    let mut expected: Vec<u8> = vec![
        0,    // no image id block
        1,    // color map present
        1,    // uncompressed indexed
        0, 0, // color map first index
        2, 0, // color map length
        24,   // bits per color map entry
        0, 0, // origin x
        0, 0, // origin y
        2, 0, // width
        2, 0, // height
        8,    // bits per pixel
        0x20, // top-to-bottom scanline order
    ];
    expected.extend_from_slice(&[0, 0, 0, 255, 255, 255]); // BGR color map
    expected.extend_from_slice(&[0, 1, 1, 0]); // pixel indices
    expected.extend_from_slice(&[0; 8]); // extension + developer offsets
    expected.extend_from_slice(SIGNATURE);

    assert_eq!(bytes, expected);
}

#[test]
fn rle_file_packs_a_full_scanline_run() {
    let rgba: Vec<u8> = px(0.0, 0.0, 0.0).repeat(4);
    let options = TgaWriterOptions {
        rle_encode: true,
        ..TgaWriterOptions::default()
    };

    let bytes = writer(black_white_palette(), options).encode(&rgba, 4, 1).unwrap();

    assert_eq!(bytes[2], 9, "image type must flag RLE");
    let pixel_data = &bytes[18 + 6..bytes.len() - FOOTER_LEN];
    // one run packet: high bit set, count - 1 = 3, symbol 0
    assert_eq!(pixel_data, &[0x83, 0x00]);
}

#[test]
fn rle_mixes_literal_and_run_packets() {
    // indices become 1, 0, 0, 0, 1, 1: a short literal, a run of three,
    // and a trailing pair too short to be a run
    let rgba: Vec<u8> = [
        px(1.0, 1.0, 1.0),
        px(0.0, 0.0, 0.0),
        px(0.0, 0.0, 0.0),
        px(0.0, 0.0, 0.0),
        px(1.0, 1.0, 1.0),
        px(1.0, 1.0, 1.0),
    ]
    .concat();
    let options = TgaWriterOptions {
        rle_encode: true,
        ..TgaWriterOptions::default()
    };

    let bytes = writer(black_white_palette(), options).encode(&rgba, 6, 1).unwrap();

    let pixel_data = &bytes[18 + 6..bytes.len() - FOOTER_LEN];
    assert_eq!(
        pixel_data,
        &[
            0x00, 1, // literal, length 1
            0x82, 0, // run, count 3
            0x01, 1, 1, // literal, length 2
        ]
    );
}

#[test]
fn rle_window_splits_runs_at_scanline_boundaries() {
    // two identical all-black rows; with the window pinned to the width the
    // run may not continue into the second scanline
    let rgba: Vec<u8> = px(0.0, 0.0, 0.0).repeat(8);
    let options = TgaWriterOptions {
        rle_encode: true,
        rle_window_size: 4,
        ..TgaWriterOptions::default()
    };

    let bytes = writer(black_white_palette(), options).encode(&rgba, 4, 2).unwrap();

    let pixel_data = &bytes[18 + 6..bytes.len() - FOOTER_LEN];
    assert_eq!(pixel_data, &[0x83, 0x00, 0x83, 0x00]);

    // without the window the same image is a single packet
    let unwindowed = TgaWriterOptions {
        rle_encode: true,
        rle_window_size: 0,
        ..TgaWriterOptions::default()
    };
    let bytes = writer(black_white_palette(), unwindowed).encode(&rgba, 4, 2).unwrap();
    let pixel_data = &bytes[18 + 6..bytes.len() - FOOTER_LEN];
    assert_eq!(pixel_data, &[0x87, 0x00]);
}

#[test]
fn color_map_channels_are_truncated_bgr() {
    let palette = Palette::new(vec![Rgb::new(1.0, 0.5, 0.25)]);
    let rgba: Vec<u8> = px(1.0, 0.5, 0.25).to_vec();

    let bytes = writer(palette, TgaWriterOptions::default()).encode(&rgba, 1, 1).unwrap();

    // 0.25 * 255 = 63.75 and 0.5 * 255 = 127.5 truncate, never round
    assert_eq!(&bytes[18..21], &[63, 127, 255]);
}

#[test]
fn omitting_the_palette_drops_the_color_map_block() {
    let options = TgaWriterOptions {
        write_palette: false,
        ..TgaWriterOptions::default()
    };
    let rgba: Vec<u8> = px(0.0, 0.0, 0.0).repeat(4);

    let bytes = writer(black_white_palette(), options).encode(&rgba, 2, 2).unwrap();

    assert_eq!(bytes[1], 0, "color map type must be none");
    assert_eq!(&bytes[5..7], &[0, 0], "color map length must be zero");
    assert_eq!(bytes.len(), 18 + 4 + FOOTER_LEN);
}

#[test]
fn all_transparent_image_never_consults_the_palette_colors() {
    // pure white pixels with zero alpha; nearest-color matching would pick
    // index 1, the alpha shortcut must pin every pixel to index 0
    let rgba: Vec<u8> = [255u8, 255, 255, 0].repeat(9);

    let bytes = writer(black_white_palette(), TgaWriterOptions::default())
        .encode(&rgba, 3, 3)
        .unwrap();

    let pixel_data = &bytes[18 + 6..bytes.len() - FOOTER_LEN];
    assert_eq!(pixel_data, &[0u8; 9]);
}

#[test]
fn tga_encode_resolves_against_named_palettes() {
    let palette = PaletteCatalog::standard().generate("ega").unwrap();
    let rgba: Vec<u8> = [0u8, 0, 255, 255].to_vec(); // pure blue

    let bytes = tga_encode(&rgba, 1, 1, palette, ColorMetric::Rgb, TgaWriterOptions::default())
        .unwrap();

    // EGA blue lives at index 1; its duplicate at index 9 loses the tie
    let pixel_data = &bytes[18 + 16 * 3..bytes.len() - FOOTER_LEN];
    assert_eq!(pixel_data, &[1]);
}

#[test]
fn header_dimensions_are_little_endian() {
    let rgba: Vec<u8> = px(0.0, 0.0, 0.0).repeat(300 * 2);

    let bytes = writer(black_white_palette(), TgaWriterOptions::default())
        .encode(&rgba, 300, 2)
        .unwrap();

    assert_eq!(u16::from_le_bytes([bytes[12], bytes[13]]), 300);
    assert_eq!(u16::from_le_bytes([bytes[14], bytes[15]]), 2);
}

#[test]
fn rle_and_raw_agree_after_expansion() {
    // gradient-ish 8x4 image quantized against the ega palette
    let mut rgba = Vec::new();
    for y in 0..4u32 {
        for x in 0..8u32 {
            rgba.extend_from_slice(&[(x * 32) as u8, (y * 60) as u8, 128, 255]);
        }
    }
    let palette = PaletteCatalog::standard().generate("ega").unwrap();

    let raw = tga_encode(
        &rgba,
        8,
        4,
        palette.clone(),
        ColorMetric::Rgb,
        TgaWriterOptions::default(),
    )
    .unwrap();
    let rle = tga_encode(
        &rgba,
        8,
        4,
        palette,
        ColorMetric::Rgb,
        TgaWriterOptions {
            rle_encode: true,
            rle_window_size: 8,
            ..TgaWriterOptions::default()
        },
    )
    .unwrap();

    let raw_pixels = &raw[18 + 48..raw.len() - FOOTER_LEN];

    // decode the packet stream by hand and compare
    let mut decoded = Vec::new();
    let mut data = &rle[18 + 48..rle.len() - FOOTER_LEN];
    while !data.is_empty() {
        let header = data[0];
        let count = (header & 0x7f) as usize + 1;
        if header & 0x80 != 0 {
            decoded.extend(std::iter::repeat_n(data[1], count));
            data = &data[2..];
        } else {
            decoded.extend_from_slice(&data[1..1 + count]);
            data = &data[1 + count..];
        }
    }
    assert_eq!(decoded, raw_pixels);
}
