//! Mirabuf exporter command line

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use mira_export::kernel::MeshQuality;
use mira_export::options::{ExportLocation, ExportMode};
use mira_export::output::HttpBlobSink;
use mira_export::progress::LogSink;
use mira_export::thumbnail::load_png;
use mira_export::{
    ExportOptions, ExportOutcome, ExportSummary, ExportTarget, Exporter, PrimitiveKernel, Scene,
};

#[derive(Parser)]
#[command(name = "mira-export")]
#[command(about = "Export CAD design snapshots to Mirabuf", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene snapshot (JSON) to a .mira file or upload it
    Export(ExportArgs),
    /// Print the contents of a .mira file
    Inspect {
        /// Path to a .mira file, compressed or not
        file: PathBuf,
    },
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Scene snapshot written by a host adapter
    scene: PathBuf,

    /// Output path (defaults to the stored options, then `<name>.mira`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    #[arg(long, value_enum)]
    quality: Option<QualityArg>,

    /// Write the encoded bytes without gzip
    #[arg(long)]
    no_compress: bool,

    /// Upload to the scene's project instead of writing a file
    #[arg(long, requires = "endpoint")]
    upload: bool,

    /// Base URL of the upload service
    #[arg(long)]
    endpoint: Option<String>,

    /// Bearer token for the upload service
    #[arg(long)]
    token: Option<String>,

    /// PNG embedded as the assembly thumbnail
    #[arg(long)]
    thumbnail: Option<PathBuf>,

    /// Store the effective options back into the scene file
    #[arg(long)]
    save_options: bool,

    /// Print the summary and full error details
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Robot,
    Field,
}

#[derive(Clone, Copy, ValueEnum)]
enum QualityArg {
    Low,
    Normal,
    High,
    VeryHigh,
}

impl From<ModeArg> for ExportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Robot => ExportMode::Robot,
            ModeArg::Field => ExportMode::Field,
        }
    }
}

impl From<QualityArg> for MeshQuality {
    fn from(quality: QualityArg) -> Self {
        match quality {
            QualityArg::Low => MeshQuality::Low,
            QualityArg::Normal => MeshQuality::Normal,
            QualityArg::High => MeshQuality::High,
            QualityArg::VeryHigh => MeshQuality::VeryHigh,
        }
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mira_export=info,mira_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Export(args) => export(args),
        Commands::Inspect { file } => inspect(&file),
    }
}

fn export(args: ExportArgs) -> Result<()> {
    let mut scene = Scene::load(&args.scene)
        .with_context(|| format!("Failed to load scene {:?}", args.scene))?;

    let mut options = ExportOptions::read_from(scene.attributes());
    if let Some(output) = args.output {
        options.file_location = output;
    }
    if let Some(mode) = args.mode {
        options.export_mode = mode.into();
    }
    if let Some(quality) = args.quality {
        options.visual_quality = quality.into();
    }
    if args.no_compress {
        options.compress_output = false;
    }
    if args.upload {
        options.export_location = ExportLocation::Upload;
    }

    if args.save_options {
        options.write_to(scene.attributes_mut())?;
        scene
            .save(&args.scene)
            .with_context(|| format!("Failed to save scene {:?}", args.scene))?;
        tracing::info!("Stored export options in {:?}", args.scene);
    }

    let kernel = PrimitiveKernel;
    let progress = LogSink;
    let blob_sink = args.endpoint.map(|endpoint| {
        let sink = HttpBlobSink::new(endpoint);
        match args.token {
            Some(token) => sink.with_token(token),
            None => sink,
        }
    });

    let mut exporter = Exporter::new(&kernel)
        .with_progress(&progress)
        .with_debug(args.debug);
    if let Some(sink) = &blob_sink {
        exporter = exporter.with_blob_sink(sink);
    }
    if let Some(path) = &args.thumbnail {
        let thumbnail =
            load_png(path).with_context(|| format!("Failed to load thumbnail {:?}", path))?;
        exporter = exporter.with_thumbnail(thumbnail);
    }

    match exporter.export(&scene, &options) {
        ExportOutcome::Written { target, bytes } => {
            match target {
                ExportTarget::File(path) => println!("Wrote {} bytes to {}", bytes, path.display()),
                ExportTarget::Upload(handle) => println!("Uploaded {} bytes as {}", bytes, handle),
            }
            Ok(())
        }
        ExportOutcome::Cancelled => {
            println!("Export cancelled");
            Ok(())
        }
        ExportOutcome::Failed { message } => bail!(message),
    }
}

fn inspect(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let compressed = mirabuf::is_compressed(&bytes);
    let assembly =
        mirabuf::decode(&bytes).with_context(|| format!("Failed to decode {:?}", path))?;

    println!(
        "{} ({} bytes{})",
        path.display(),
        bytes.len(),
        if compressed { ", gzip" } else { "" }
    );
    print!("{}", ExportSummary::new(&assembly));
    Ok(())
}
