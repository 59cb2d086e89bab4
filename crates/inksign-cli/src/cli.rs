//! CLI entry and dispatch.

use crate::strokes;
use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use inksign_render::{
    DocumentKind, RasterAdapter, SUGGESTED_FILE_NAME, SigningConfig, SigningSession, encode_png,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "inksign", version, about = "Sign an image or the first page of a PDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Draw a recorded signature onto a document and export a flattened PNG
    Sign(SignArgs),
    /// Print the normalized size of a document
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
struct SignArgs {
    /// Image or PDF to sign
    #[arg(long, value_name = "PATH")]
    document: PathBuf,

    /// Declared kind (`image/png`, `application/pdf`, ...); detected when omitted
    #[arg(long, value_name = "MIME")]
    kind: Option<String>,

    /// JSON stroke script to replay onto the ink surface
    #[arg(long, value_name = "PATH")]
    strokes: Option<PathBuf>,

    /// Ink surface width in pixels; height follows the configured aspect ratio
    #[arg(long, default_value_t = 600)]
    width: u32,

    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output path
    #[arg(long, default_value = SUGGESTED_FILE_NAME)]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct InspectArgs {
    /// Image or PDF to inspect
    #[arg(long, value_name = "PATH")]
    document: PathBuf,

    /// Declared kind; detected when omitted
    #[arg(long, value_name = "MIME")]
    kind: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also write a downscaled PNG preview here
    #[arg(long, value_name = "PATH")]
    preview: Option<PathBuf>,

    /// Bounding box for the preview, in pixels
    #[arg(long, default_value_t = 400)]
    preview_size: u32,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Sign(args) => sign(&args).map(|_| ()),
        Commands::Inspect(args) => {
            let (kind, width, height) = inspect(&args)?;
            println!("{:?} {}x{}", kind, width, height);
            Ok(())
        }
    }
}

/// Returns the output dimensions.
fn sign(args: &SignArgs) -> Result<(u32, u32)> {
    let config = load_config(args.config.as_deref())?;
    let bytes = read_document(&args.document)?;
    let kind = resolve_kind(args.kind.as_deref(), &args.document, &bytes)?;

    let mut session = SigningSession::new(args.width, config).context("create signing session")?;
    session
        .load_kind(&bytes, kind)
        .with_context(|| format!("load {}", args.document.display()))?;

    if let Some(path) = &args.strokes {
        let script = fs::read_to_string(path)
            .with_context(|| format!("read stroke script {}", path.display()))?;
        let steps = strokes::parse(&script)?;
        let count = strokes::replay(session.ink_mut(), &steps)?;
        log::info!("Replayed {} steps, {} strokes on the surface", steps.len(), count);
    } else {
        log::warn!("No stroke script given; exporting a blank signature");
    }

    let result = session.export().context("export signed document")?;
    fs::write(&args.out, result.as_bytes())
        .with_context(|| format!("write {}", args.out.display()))?;
    log::info!("Wrote {}", args.out.display());
    Ok((result.width(), result.height()))
}

fn inspect(args: &InspectArgs) -> Result<(DocumentKind, u32, u32)> {
    let config = load_config(args.config.as_deref())?;
    let bytes = read_document(&args.document)?;
    let kind = resolve_kind(args.kind.as_deref(), &args.document, &bytes)?;

    let raster = RasterAdapter::new(config.adapter)
        .load_kind(&bytes, kind)
        .with_context(|| format!("load {}", args.document.display()))?;

    if let Some(path) = &args.preview {
        let preview = raster.preview(args.preview_size, args.preview_size);
        let png = encode_png(&preview).context("encode preview")?;
        fs::write(path, png).with_context(|| format!("write {}", path.display()))?;
    }

    Ok((kind, raster.width(), raster.height()))
}

fn load_config(path: Option<&Path>) -> Result<SigningConfig> {
    let Some(path) = path else {
        return Ok(SigningConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn read_document(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read document {}", path.display()))
}

/// Declared kind first, then the file extension, then the content.
fn resolve_kind(declared: Option<&str>, path: &Path, bytes: &[u8]) -> Result<DocumentKind> {
    if let Some(declared) = declared {
        return Ok(DocumentKind::from_mime(declared)?);
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentKind::from_extension)
        .or_else(|| DocumentKind::sniff(bytes))
        .ok_or_else(|| anyhow!("cannot tell the kind of {}; pass --kind", path.display()))
}
