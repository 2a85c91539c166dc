use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use stackshot::{
    Compositor, ComposeSettings, DecodeQueue, ImageKind, LayerField, LayerId, LayerKind,
    LayerStore, ProjectSnapshot, PumpReport, StackshotError, StackshotResult, export_png,
    write_png,
};

#[derive(Parser, Debug)]
#[command(name = "stackshot", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose images and text given on the command line and export a PNG.
    Compose(ComposeArgs),
    /// Load a project file, re-attach its images and export a PNG.
    Render(RenderArgs),
    /// Print the layers of a project file and the images it is waiting for.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct SettingsArgs {
    /// Font file (TTF/OTF) for text. Overrides `STACKSHOT_FONT`.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Background image, bottom first. Repeatable.
    #[arg(long = "background", required = true)]
    backgrounds: Vec<PathBuf>,

    /// Overlay image, painted above every background. Repeatable.
    #[arg(long = "overlay")]
    overlays: Vec<PathBuf>,

    /// Text block content; `\n` starts a new paragraph. Repeatable.
    #[arg(long = "text")]
    texts: Vec<String>,

    /// Font size for every text block, in pixels.
    #[arg(long, default_value_t = 40.0)]
    font_size: f64,

    /// Text color as `#rrggbb`.
    #[arg(long, default_value = "#ffffff")]
    color: String,

    /// Wrap width for text blocks, in pixels.
    #[arg(long, default_value_t = 400.0)]
    max_width: f64,

    /// Opacity (0-100) of the box behind each text block.
    #[arg(long, default_value_t = 0.0)]
    text_box: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the project file here.
    #[arg(long)]
    save_project: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Image for a restored layer, as `ID=PATH`. Repeatable.
    #[arg(long = "attach")]
    attachments: Vec<Attachment>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,
}

#[derive(Clone, Debug)]
struct Attachment {
    id: LayerId,
    path: PathBuf,
}

impl std::str::FromStr for Attachment {
    type Err = StackshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, path) = s
            .split_once('=')
            .ok_or_else(|| StackshotError::validation(format!("expected ID=PATH, got '{s}'")))?;
        Ok(Self {
            id: id.parse()?,
            path: PathBuf::from(path),
        })
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{}", e.user_notice());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(args: &SettingsArgs) -> StackshotResult<ComposeSettings> {
    let base = match &args.config {
        Some(path) => ComposeSettings::from_path(path)?,
        None => ComposeSettings::default(),
    };
    let mut settings = base.with_env_overrides()?;
    if let Some(font) = &args.font {
        settings.font_path = Some(font.clone());
    }
    Ok(settings)
}

fn cmd_compose(args: ComposeArgs) -> StackshotResult<()> {
    let settings = load_settings(&args.settings)?;
    let mut store = LayerStore::new();
    let mut decodes = DecodeQueue::new();

    for path in &args.backgrounds {
        let id = store.add(LayerKind::Background);
        decodes.request_path(ImageKind::Background, id, path);
    }
    for path in &args.overlays {
        let id = store.add(LayerKind::Overlay);
        decodes.request_path(ImageKind::Overlay, id, path);
    }
    for content in &args.texts {
        let id = store.add(LayerKind::Text);
        for field in [
            LayerField::Content(content.replace("\\n", "\n")),
            LayerField::FontSizePx(args.font_size),
            LayerField::ColorHex(args.color.clone()),
            LayerField::MaxWidthPx(args.max_width),
            LayerField::BackgroundOpacity(args.text_box),
        ] {
            store.update(LayerKind::Text, id, field);
        }
    }

    report_decodes(&decodes.wait_all(&mut store));

    if let Some(path) = &args.save_project {
        ProjectSnapshot::capture(&store).save_to_path(path)?;
        tracing::info!(path = %path.display(), "project saved");
    }

    let mut compositor = Compositor::from_settings(settings);
    let bytes = export_png(&store, &mut compositor)?;
    write_png(&args.out, &bytes)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> StackshotResult<()> {
    let settings = load_settings(&args.settings)?;
    let snapshot = ProjectSnapshot::load_from_path(&args.project)?;
    let mut store = LayerStore::new();
    let pending = snapshot.apply(&mut store);
    let mut decodes = DecodeQueue::new();

    for att in &args.attachments {
        let kind = match store.kind_of(att.id) {
            Some(LayerKind::Background) => ImageKind::Background,
            Some(LayerKind::Overlay) => ImageKind::Overlay,
            Some(LayerKind::Text) => {
                return Err(StackshotError::validation(format!(
                    "layer {} is a text layer and takes no image",
                    att.id
                )));
            }
            None => {
                return Err(StackshotError::validation(format!(
                    "project has no layer {}",
                    att.id
                )));
            }
        };
        decodes.request_path(kind, att.id, &att.path);
    }

    for p in pending
        .iter()
        .filter(|p| !args.attachments.iter().any(|a| a.id == p.id))
    {
        tracing::warn!(id = %p.id, source = %p.source_name, "image not attached; layer skipped");
    }

    report_decodes(&decodes.wait_all(&mut store));

    let mut compositor = Compositor::from_settings(settings);
    let bytes = export_png(&store, &mut compositor)?;
    write_png(&args.out, &bytes)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> StackshotResult<()> {
    let snapshot = ProjectSnapshot::load_from_path(&args.project)?;
    for l in &snapshot.backgrounds {
        println!(
            "background {:>4}  {:>5}x{:<5} opacity {:>5} scale {:>5} at ({}, {})  {}",
            l.id.0,
            l.natural_width,
            l.natural_height,
            l.opacity,
            l.scale,
            l.x,
            l.y,
            l.source_name.as_deref().unwrap_or("-"),
        );
    }
    for l in &snapshot.overlays {
        println!(
            "overlay    {:>4}  opacity {:>5} scale {:>5} at ({}, {})  {}",
            l.id.0,
            l.opacity,
            l.scale,
            l.x,
            l.y,
            l.source_name.as_deref().unwrap_or("-"),
        );
    }
    for l in &snapshot.texts {
        println!(
            "text       {:>4}  {}px {} max {}px box {} at ({}, {})  {:?}",
            l.id.0,
            l.font_size_px,
            l.color_hex,
            l.max_width_px,
            l.background_opacity,
            l.x,
            l.y,
            l.content,
        );
    }
    for p in snapshot.pending_attachments() {
        println!(
            "needs image: {} {} ({})",
            LayerKind::from(p.kind),
            p.id,
            p.source_name
        );
    }
    Ok(())
}

fn report_decodes(report: &PumpReport) {
    for (id, notice) in &report.failed {
        eprintln!("layer {id}: {notice}");
    }
    tracing::info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        "images decoded"
    );
}
