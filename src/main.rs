//! Echo Exporter CLI
//!
//! Command-line interface for compiling scene descriptions into Echo
//! renderer scene folders.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use echo_core::logging::{self, TracingConfig};
use echo_export::material::translate_object;
use echo_export::{
    compile, EvaluatorKind, ExportProfile, ExportReport, Exporter, LayoutOptions, PatternKind,
    PlyWriter,
};
use echo_scene::Scene;

/// Echo Exporter - compile 3D scenes for the Echo renderer
#[derive(Parser)]
#[command(name = "echo-export")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for reports
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene into an Echo scene folder
    Export(ExportArgs),

    /// Print the compiled scene file without writing anything
    Preview(PreviewArgs),

    /// List scene objects and how they will be exported
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Scene description (.json, .yaml)
    #[arg(short, long)]
    scene: PathBuf,

    /// Destination folder
    #[arg(short, long)]
    output: PathBuf,

    /// Extension appended to the scene file name
    #[arg(long, default_value = "echo")]
    extension: String,

    /// Use the bare folder name as scene file name
    #[arg(long, conflicts_with = "extension")]
    no_extension: bool,

    #[command(flatten)]
    profile: ProfileArgs,
}

#[derive(Args)]
struct PreviewArgs {
    /// Scene description (.json, .yaml)
    #[arg(short, long)]
    scene: PathBuf,

    #[command(flatten)]
    profile: ProfileArgs,
}

#[derive(Args)]
struct InspectArgs {
    /// Scene description (.json, .yaml)
    #[arg(short, long)]
    scene: PathBuf,
}

#[derive(Args)]
struct ProfileArgs {
    /// Profile file (.yaml, .json); flags below override its values
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Evaluator (PathTraced, BruteForced, Albedo, NormalDepth)
    #[arg(long)]
    evaluator: Option<EvaluatorKind>,

    /// Tile pattern (Ordered, Scrambled, Spiral, HilbertCurve)
    #[arg(long)]
    pattern: Option<PatternKind>,

    /// Stratified distribution extend
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    extend: Option<u32>,

    /// Render buffer width
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Render buffer height
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Last epoch to render
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_epoch: Option<u32>,
}

impl ProfileArgs {
    fn resolve(&self) -> Result<ExportProfile> {
        let mut profile = match &self.profile {
            Some(path) => ExportProfile::from_path(path)
                .with_context(|| format!("Failed to load profile {:?}", path))?,
            None => ExportProfile::default(),
        };

        if let Some(evaluator) = self.evaluator {
            profile.evaluator = evaluator;
        }
        if let Some(pattern) = self.pattern {
            profile.pattern = pattern;
        }
        if let Some(extend) = self.extend {
            profile.extend = extend;
        }
        if let Some(width) = self.width {
            profile.width = width;
        }
        if let Some(height) = self.height {
            profile.height = height;
        }
        if let Some(max_epoch) = self.max_epoch {
            profile.max_epoch = max_epoch;
        }

        debug!(?profile, "Resolved profile");
        Ok(profile)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_config(TracingConfig::from_verbosity(cli.verbose));

    match cli.command {
        Commands::Export(args) => cmd_export(args, cli.format),
        Commands::Preview(args) => cmd_preview(args),
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
    }
}

fn load_scene(path: &Path) -> Result<Scene> {
    Scene::from_path(path).with_context(|| format!("Failed to load scene {:?}", path))
}

fn cmd_export(args: ExportArgs, format: OutputFormat) -> Result<()> {
    let scene = load_scene(&args.scene)?;
    let profile = args.profile.resolve()?;

    let layout_options = if args.no_extension {
        LayoutOptions::default()
    } else {
        LayoutOptions::with_extension(args.extension)
    };

    info!("Exporting {:?} to {:?}", args.scene, args.output);

    let writer = PlyWriter::with_comment("exported by echo-export");
    let report = Exporter::new(profile, &writer)
        .with_layout_options(layout_options)
        .export(&scene, &args.output)
        .context("Export failed")?;

    print_report(&report, format)
}

fn print_report(report: &ExportReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            println!("Export complete: {}", report.scene_file.display());
            println!("  Camera:         {}", report.camera);
            println!("  Meshes:         {}", report.exported_meshes.len());
            println!("  Materials:      {}", report.materials);
            println!("  Point lights:   {}", report.point_lights);

            if report.ignored_lights > 0 {
                println!("  Ignored lights: {}", report.ignored_lights);
            }

            if !report.skipped_meshes.is_empty() {
                println!("\nSkipped meshes:");
                for skipped in &report.skipped_meshes {
                    println!("  - {}: {}", skipped.object, skipped.reason);
                }
            }

            if !report.unmaterialed_meshes.is_empty() {
                println!("\nMeshes without material:");
                for skipped in &report.unmaterialed_meshes {
                    println!("  - {}: {}", skipped.object, skipped.reason);
                }
            }
        }
    }

    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> Result<()> {
    let scene = load_scene(&args.scene)?;
    let profile = args.profile.resolve()?;

    let text = compile(&scene, &profile).context("Failed to compile scene")?;
    print!("{}", text);
    Ok(())
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let scene = load_scene(&args.scene)?;

    let rows: Vec<(String, String, String)> = scene
        .objects
        .iter()
        .map(|object| {
            let detail = match object.as_mesh() {
                Some(_) => match translate_object(object) {
                    Ok(kind) => kind.type_name().to_string(),
                    Err(reason) => format!("no material ({})", reason),
                },
                None => String::new(),
            };
            (object.name.clone(), object.kind().to_string(), detail)
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = rows
                .iter()
                .map(|(name, kind, detail)| {
                    serde_json::json!({
                        "name": name,
                        "kind": kind,
                        "material": detail,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("{:<24} {:<8} {}", "Name", "Kind", "Material");
            println!("{:-<24} {:-<8} {:-<30}", "", "", "");
            for (name, kind, detail) in &rows {
                println!("{:<24} {:<8} {}", name, kind, detail);
            }
            println!("\nTotal: {} objects", rows.len());

            match scene.first_camera() {
                Some(camera) => println!("Camera: {}", camera.name),
                None => println!("Camera: none (export will fail)"),
            }
        }
    }

    Ok(())
}
