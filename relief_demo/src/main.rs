// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render a relief scene to a PNG file.
//!
//! Without `--scene` the default starter texts are scattered over the canvas.
//! Without `--font` every glyph is drawn as a solid block.
//!
//! ```text
//! cargo run -p relief_demo -- --seed 7 --font Sans=/usr/share/fonts/DejaVuSans.ttf --out relief.png
//! ```

use std::error::Error as _;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use relief_imaging_vello_cpu::render_to_rgba;
use relief_render::{ColorError, Compositor, RenderConfig, parse_hex, to_hex};
use relief_scene::{Canvas, Editor, TextItem};
use relief_text::{BlockGlyphs, FontBook, FontChoice, FontError, TextPainter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(about = "Render a two-plane depth text image")]
struct Args {
    /// Render settings as JSON; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Scene as JSON, as written by `--dump-scene`.
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Seed for the starter layout; random when absent.
    #[arg(long)]
    seed: Option<u64>,
    /// Register a font file under a family name. Repeatable.
    #[arg(long = "font", value_name = "FAMILY=PATH", value_parser = parse_font_arg)]
    fonts: Vec<(String, PathBuf)>,
    /// Family used by every item.
    #[arg(long)]
    family: Option<String>,
    /// Font weight to pick faces by; bold when absent.
    #[arg(long)]
    weight: Option<f32>,
    /// Background color preset; background text takes its contrast color.
    #[arg(long, value_name = "HEX")]
    background: Option<String>,
    /// Foreground text color preset.
    #[arg(long, value_name = "HEX")]
    foreground: Option<String>,
    /// Canvas width, overriding the scene.
    #[arg(long)]
    width: Option<u32>,
    /// Canvas height, overriding the scene.
    #[arg(long)]
    height: Option<u32>,
    /// Draw the selection chrome around the item at this index.
    #[arg(long, value_name = "INDEX")]
    select: Option<usize>,
    /// Write the scene that was rendered as JSON.
    #[arg(long, value_name = "PATH")]
    dump_scene: Option<PathBuf>,
    /// Output image.
    #[arg(long, default_value = "relief.png")]
    out: PathBuf,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode PNG")]
    Png(#[from] png::EncodingError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error("canvas {0}x{1} is larger than the rasterizer supports")]
    CanvasTooLarge(u32, u32),
    #[error("canvas {0}x{1} has no area")]
    EmptyCanvas(u32, u32),
    #[error("no item at index {0}")]
    NoSuchItem(usize),
}

/// On-disk scene: a canvas and the items placed on it.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SceneFile {
    #[serde(default)]
    canvas: Canvas,
    #[serde(default)]
    items: Vec<TextItem>,
}

fn parse_font_arg(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((family, path)) if !family.trim().is_empty() && !path.is_empty() => {
            Ok((family.trim().to_owned(), PathBuf::from(path)))
        }
        _ => Err(format!("expected FAMILY=PATH, got `{s}`")),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DemoError> {
    let file = File::open(path).map_err(|source| DemoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| DemoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DemoError> {
    let file = File::create(path).map_err(|source| DemoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|source| DemoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_png(path: &Path, width: u16, height: u16, rgba: &[u8]) -> Result<(), DemoError> {
    let file = File::create(path).map_err(|source| DemoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width.into(), height.into());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    writer.finish()?;
    Ok(())
}

fn load_fonts(args: &Args) -> Result<FontBook, DemoError> {
    let mut book = FontBook::new();
    for (family, path) in &args.fonts {
        book.load_file(family, path)?;
    }
    if let Some(weight) = args.weight {
        book.set_weight(weight);
    }
    if let Some(family) = &args.family
        && !book.set_default_family(family)
    {
        warn!("family `{family}` is not registered, keeping the default");
    }
    Ok(book)
}

fn load_config(args: &Args) -> Result<RenderConfig, DemoError> {
    let mut config = match &args.config {
        Some(path) => read_json(path)?,
        None => RenderConfig::default(),
    };
    apply_color_preset(
        &mut config,
        args.background.as_deref(),
        args.foreground.as_deref(),
    )?;
    Ok(config)
}

/// Apply `--background`/`--foreground`.
///
/// A missing side keeps its configured color. Background text always follows
/// the background, so the two text planes keep distinct colors.
fn apply_color_preset(
    config: &mut RenderConfig,
    background: Option<&str>,
    foreground: Option<&str>,
) -> Result<(), DemoError> {
    if background.is_none() && foreground.is_none() {
        return Ok(());
    }
    let background = background.map_or(Ok(config.background), parse_hex)?;
    let foreground = foreground.map_or(Ok(config.foreground_text), parse_hex)?;
    config.apply_preset(background, foreground);
    debug!(
        "preset {} with {} background text and {} foreground text",
        to_hex(config.background),
        to_hex(config.background_text),
        to_hex(config.foreground_text)
    );
    if config.background_text == config.foreground_text {
        warn!("both text planes are {}", to_hex(config.foreground_text));
    }
    Ok(())
}

/// Convert a canvas to raster dimensions, rejecting empty and oversized ones.
fn raster_size(canvas: Canvas) -> Result<(u16, u16), DemoError> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(DemoError::EmptyCanvas(canvas.width, canvas.height));
    }
    match (u16::try_from(canvas.width), u16::try_from(canvas.height)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(DemoError::CanvasTooLarge(canvas.width, canvas.height)),
    }
}

fn run(args: &Args) -> Result<(), DemoError> {
    let book = load_fonts(args)?;
    let painter: &dyn TextPainter = if book.is_empty() {
        &BlockGlyphs
    } else {
        &book
    };
    let config = load_config(args)?;

    let scene = match &args.scene {
        Some(path) => Some(read_json::<SceneFile>(path)?),
        None => None,
    };
    let base = scene.as_ref().map_or_else(Canvas::default, |s| s.canvas);
    let canvas = Canvas::new(
        args.width.unwrap_or(base.width),
        args.height.unwrap_or(base.height),
    );
    let (width, height) = raster_size(canvas)?;

    let mut editor = Editor::new(painter);
    match scene {
        Some(scene) => {
            editor.resize_canvas(scene.canvas);
            for item in scene.items {
                editor.import(item);
            }
        }
        None => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            editor.resize_canvas(canvas);
            editor.seed(&mut rng);
        }
    }
    let moved = editor.resize_canvas(canvas);
    if moved > 0 {
        info!("recentered {moved} items that fell outside the canvas");
    }
    if let Some(family) = &args.family {
        editor.set_font_all(FontChoice::family(family.as_str()));
    }
    if let Some(index) = args.select {
        let id = editor
            .store()
            .items()
            .get(index)
            .map(|item| item.id)
            .ok_or(DemoError::NoSuchItem(index))?;
        editor.select(id);
    }

    if let Some(path) = &args.dump_scene {
        let scene = SceneFile {
            canvas: editor.canvas(),
            items: editor.store().items().to_vec(),
        };
        write_json(path, &scene)?;
        info!("wrote scene to {}", path.display());
    }

    let compositor = Compositor::new(painter, config);
    let store = editor.store();
    let rgba = render_to_rgba(width, height, |backend| {
        if args.select.is_some() {
            compositor.generate_preview(backend, store, canvas);
        } else {
            compositor.generate_image(backend, store, canvas);
        }
    });
    write_png(&args.out, width, height, &rgba)?;
    info!(
        "rendered {} items at {}x{} to {}",
        store.len(),
        width,
        height,
        args.out.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            let mut source = err.source();
            while let Some(cause) = source {
                error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
