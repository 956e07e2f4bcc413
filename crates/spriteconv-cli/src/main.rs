//! spriteconv - Convert images into palette-indexed TGA sprites.
//!
//! Reads input paths from the command line (or one per line from stdin),
//! quantizes each image against a named palette, and writes an indexed TGA
//! next to it according to the output template.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use spriteconv::{
    ColorMetric, PaletteApproximator, PaletteCatalog, RleCodec, TgaWriter, TgaWriterOptions,
};
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

/// Output extensions the TGA container is known under.
const TGA_EXTENSIONS: [&str; 4] = ["tga", "icb", "vda", "vst"];

#[derive(Parser)]
#[command(name = "spriteconv")]
#[command(version)]
#[command(about = "Convert images into palette-indexed TGA sprites", long_about = None)]
struct Cli {
    /// Input image files; reads one path per line from stdin when empty
    files: Vec<PathBuf>,

    /// Palette to quantize against (rgb685, rgb565, rgb232, ega)
    #[arg(short, long, default_value = "rgb685")]
    palette: String,

    /// Color distance metric used for palette matching
    #[arg(short, long, value_enum, default_value = "rgb")]
    colormapper: MetricArg,

    /// Output path template; {name}, {ext} and {dir} expand per input file
    #[arg(short, long, default_value = "{name}.tga")]
    outfile: String,

    /// Run-length encode the pixel data
    #[arg(long)]
    rle: bool,

    /// RLE window size in bytes; 0 compresses the image as one window
    #[arg(long, default_value_t = 0)]
    rle_window: usize,

    /// Skip the color-map block (output can no longer be viewed standalone)
    #[arg(long)]
    omit_palette: bool,

    /// Output container format: tga, or auto to detect from the output
    /// extension
    #[arg(short, long, default_value = "auto")]
    format: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    Rgb,
    Hsl,
    Lab,
}

impl From<MetricArg> for ColorMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Rgb => ColorMetric::Rgb,
            MetricArg::Hsl => ColorMetric::Hsl,
            MetricArg::Lab => ColorMetric::Lab,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // a malformed template would recur for every item, so reject it before
    // the batch starts
    expand_template(&cli.outfile, Path::new("probe.png"))
        .context("invalid output template")?;

    let palette = PaletteCatalog::standard()
        .generate(&cli.palette)
        .with_context(|| format!("cannot build palette '{}'", cli.palette))?;

    let options = TgaWriterOptions {
        write_palette: !cli.omit_palette,
        rle_encode: cli.rle,
        rle_window_size: cli.rle_window,
    };
    let writer = TgaWriter::new(
        PaletteApproximator::new(palette, cli.colormapper.into()),
        options,
    )
    .with_rle_codec(RleCodec);

    let files = gather_inputs(&cli.files)?;
    if files.is_empty() {
        bail!("no input files given");
    }

    let mut failed = 0usize;
    for file in &files {
        if let Err(err) = convert_one(&writer, file, &cli) {
            failed += 1;
            eprintln!("{}: {:#}", file.display(), err);
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed", files.len());
    }
    Ok(())
}

/// Explicit arguments, or one path per stdin line (blank lines skipped).
fn gather_inputs(files: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    if !files.is_empty() {
        return Ok(files.to_vec());
    }

    let mut inputs = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read file list from stdin")?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            inputs.push(PathBuf::from(trimmed));
        }
    }
    Ok(inputs)
}

fn convert_one(writer: &TgaWriter, input: &Path, cli: &Cli) -> anyhow::Result<()> {
    if !input.is_file() {
        bail!("could not find source file");
    }

    let out_path = PathBuf::from(expand_template(&cli.outfile, input)?);
    check_format(&cli.format, &out_path)?;

    let img = image::open(input).context("failed to decode image")?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.into_raw();

    eprintln!(
        "Encoding '{}' ({}x{}) -> '{}'",
        input.display(),
        width,
        height,
        out_path.display()
    );

    let bytes = writer.encode(&pixels, width as usize, height as usize)?;
    fs::write(&out_path, &bytes)
        .with_context(|| format!("failed to write '{}'", out_path.display()))?;
    eprintln!("Written {} bytes to '{}'", bytes.len(), out_path.display());

    if let Some(name) = out_path.file_name() {
        // legacy media the sprites target cannot list longer names
        if name.len() > 11 {
            eprintln!(
                "warning: '{}' is longer than 11 characters",
                name.to_string_lossy()
            );
        }
    }

    Ok(())
}

/// Verifies the output container selection for one item.
fn check_format(selector: &str, out_path: &Path) -> anyhow::Result<()> {
    if selector.eq_ignore_ascii_case("tga") {
        return Ok(());
    }
    if selector.eq_ignore_ascii_case("auto") {
        let ext = out_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if TGA_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(());
        }
        bail!("cannot infer an output format for '.{ext}'");
    }
    bail!("unsupported output format '{selector}'");
}

/// Expands `{name}`, `{ext}` and `{dir}` placeholders against an input path.
fn expand_template(template: &str, input: &Path) -> anyhow::Result<String> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = input
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut out = String::with_capacity(template.len() + stem.len());
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let mut key = String::new();
        let mut closed = false;
        for next in chars.by_ref() {
            if next == '}' {
                closed = true;
                break;
            }
            key.push(next);
        }
        if !closed {
            bail!("unclosed '{{' in output template");
        }
        match key.as_str() {
            "name" => out.push_str(&stem),
            "ext" => out.push_str(&ext),
            "dir" => out.push_str(&dir),
            _ => bail!("unknown placeholder '{{{key}}}' in output template"),
        }
    }
    Ok(out)
}
