use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glyph_render::render::ansi::to_ansi;
use glyph_render::render::raster::{self, CanvasMetrics, RasterStyle};
use glyph_render::{convert_with, Bitmap, GlyphConfig, GlyphGrid, ImageResampler};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Frame, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use walkdir::WalkDir;

mod settings;

use settings::RenderSettings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert images or animations to glyph art")]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render glyph art to stdout for a quick preview
    Preview(PreviewArgs),
    /// Convert an image and write the text result to disk
    Convert(ConvertArgs),
    /// Convert an animation (GIF or directory of frames) to one text file per frame
    Animate(AnimateArgs),
    /// Convert an image and rasterize the glyphs to a PNG
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input image path
    input: PathBuf,
    /// Target column width
    #[arg(long)]
    width: Option<u32>,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image path
    input: PathBuf,
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
    /// Target column width
    #[arg(long)]
    width: Option<u32>,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Input animation path (GIF file or directory of images)
    input: PathBuf,
    /// Output directory for frame files
    #[arg(short, long)]
    out_dir: PathBuf,
    /// Target column width
    #[arg(long)]
    width: Option<u32>,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input image path
    input: PathBuf,
    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,
    /// Monospace TTF/OTF font used to draw glyphs
    #[arg(long)]
    font: PathBuf,
    /// Target column width
    #[arg(long)]
    width: Option<u32>,
    /// Font size in pixels
    #[arg(long, default_value_t = 12.0, conflicts_with = "fit")]
    font_size: f32,
    /// Pick the font size (4-20px) that fits a WIDTHxHEIGHT canvas
    #[arg(long, value_parser = parse_size)]
    fit: Option<(u32, u32)>,
    /// Canvas background as #rrggbb
    #[arg(long, default_value = "#000000", value_parser = parse_hex)]
    background: [u8; 3],
    /// Glyph color as #rrggbb when --color is off
    #[arg(long, default_value = "#ffffff", value_parser = parse_hex)]
    foreground: [u8; 3],
    #[command(flatten)]
    settings: RenderSettings,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(cli.log_level).parse_default_env().init();

    match cli.command {
        Commands::Preview(args) => preview(args),
        Commands::Convert(args) => convert(args),
        Commands::Animate(args) => animate(args),
        Commands::Export(args) => export(args),
    }
}

fn preview(args: PreviewArgs) -> Result<()> {
    let (config, resampler) = args.settings.resolve(args.width, 100)?;
    let grid = render_path(&args.input, &config, &resampler)?;
    print!("{}", format_grid(&grid, &config));
    Ok(())
}

fn convert(args: ConvertArgs) -> Result<()> {
    let (config, resampler) = args.settings.resolve(args.width, 120)?;
    let grid = render_path(&args.input, &config, &resampler)?;
    write_grid(&args.output, &grid, &config)?;
    info!("wrote {}x{} glyphs to {:?}", grid.width(), grid.height(), args.output);
    Ok(())
}

fn animate(args: AnimateArgs) -> Result<()> {
    let (config, resampler) = args.settings.resolve(args.width, 120)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;

    let frames = load_frames(&args.input)?;
    let progress = ProgressBar::new(frames.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames",
        )?
        .progress_chars("=> "),
    );

    for (index, frame) in frames.into_iter().enumerate() {
        let buffer = frame.into_buffer();
        let grid = render_rgba(&buffer, &config, &resampler)
            .with_context(|| format!("failed to render frame {}", index))?;

        let frame_path = args.out_dir.join(format!("frame_{:04}.txt", index));
        write_grid(&frame_path, &grid, &config)?;
        progress.inc(1);
    }

    progress.finish_with_message(format!("Frames written to {:?}", args.out_dir));
    Ok(())
}

fn export(args: ExportArgs) -> Result<()> {
    let (config, resampler) = args.settings.resolve(args.width, 120)?;
    let grid = render_path(&args.input, &config, &resampler)?;
    if grid.is_empty() {
        bail!("{:?} produced an empty grid at width {}", args.input, config.target_width);
    }

    let font = raster::load_font(&args.font)
        .with_context(|| format!("failed to load font {:?}", args.font))?;
    let metrics = match args.fit {
        Some((width, height)) => CanvasMetrics::fit(&grid, width, height),
        None => CanvasMetrics::for_font_size(args.font_size.max(1.0)),
    };
    let style = RasterStyle { background: args.background, foreground: args.foreground };

    raster::export_png(&grid, &font, metrics, style, &args.output)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    info!("exported {:?} at {:.1}px", args.output, metrics.font_size);
    Ok(())
}

fn render_path(path: &Path, config: &GlyphConfig, resampler: &ImageResampler) -> Result<GlyphGrid> {
    let image =
        glyph_render::open_rgba(path).with_context(|| format!("failed to open image {:?}", path))?;
    render_rgba(&image, config, resampler).with_context(|| format!("failed to render {:?}", path))
}

fn render_rgba(
    image: &RgbaImage,
    config: &GlyphConfig,
    resampler: &ImageResampler,
) -> Result<GlyphGrid> {
    let bitmap = Bitmap::from_rgba(image)?;
    Ok(convert_with(&bitmap, config, resampler)?)
}

fn format_grid(grid: &GlyphGrid, config: &GlyphConfig) -> String {
    if config.color {
        to_ansi(grid)
    } else {
        grid.to_text()
    }
}

fn write_grid(path: &Path, grid: &GlyphGrid, config: &GlyphConfig) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    file.write_all(format_grid(grid, config).as_bytes())
        .with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

fn load_frames(path: &Path) -> Result<Vec<Frame>> {
    if path.is_dir() {
        load_frames_from_directory(path)
    } else {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "gif" {
            load_frames_from_gif(path)
        } else {
            let image = glyph_render::open_rgba(path)
                .with_context(|| format!("failed to open image {:?}", path))?;
            Ok(vec![Frame::new(image)])
        }
    }
}

fn load_frames_from_gif(path: &Path) -> Result<Vec<Frame>> {
    let file = File::open(path).with_context(|| format!("failed to open GIF {:?}", path))?;
    let decoder =
        GifDecoder::new(file).with_context(|| format!("failed to decode GIF {:?}", path))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("failed to collect frames from {:?}", path))?;
    Ok(frames)
}

fn load_frames_from_directory(path: &Path) -> Result<Vec<Frame>> {
    let mut entries: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    entries.sort();
    if entries.is_empty() {
        bail!("no image files found in {:?}", path);
    }

    let mut frames = Vec::with_capacity(entries.len());
    for entry in entries {
        let image = glyph_render::open_rgba(&entry)
            .with_context(|| format!("failed to open image {:?}", entry))?;
        frames.push(Frame::new(image));
    }
    Ok(frames)
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) =
        value.split_once(['x', 'X']).ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value}"))?;
    let width = width.trim().parse().map_err(|err| format!("bad width {width:?}: {err}"))?;
    let height = height.trim().parse().map_err(|err| format!("bad height {height:?}: {err}"))?;
    Ok((width, height))
}

fn parse_hex(value: &str) -> Result<[u8; 3], String> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected #rrggbb, got {value}"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|err| format!("bad color {value}: {err}"))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
