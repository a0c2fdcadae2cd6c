use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use mockshot::{
    AnimationConfig, CancelToken, Canvas, CpuSurface, EditorConfig, EditorSession, ExportPhase,
    ExportSession, JsonFileStore, PlaybackClock, Project, ProjectStore, RefreshScheduler,
    RenderSurface, SceneFrame, Screen, StillFormat, SystemTimeSource, TextRenderer,
    TimeSource, TransformValues, export_batch, export_gif, export_still, find_preset, find_template,
    import_project, interpolate, presets, scene::project::now_millis, templates,
};

#[derive(Parser, Debug)]
#[command(name = "mockshot", version)]
struct Cli {
    /// Editor config JSON. Defaults apply for anything it leaves out.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the animation presets.
    Presets,
    /// Print the interpolated transform of a preset at a normalized time.
    Sample(SampleArgs),
    /// Check a project file and report what it contains.
    Validate(ValidateArgs),
    /// Export a screen's animation as a GIF.
    Gif(GifArgs),
    /// Export a screen as a PNG/JPEG, or a set of store sizes as a ZIP.
    Still(StillArgs),
    /// Replace the stored working project with a project file.
    Import(ImportArgs),
    /// List the screen layout templates.
    Templates,
    /// Apply a layout template to a screen of the stored project.
    Template(TemplateArgs),
    /// Run the playback clock in real time and log its ticks.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct SampleArgs {
    #[arg(long)]
    preset: String,

    /// Normalized time in [0, 1].
    #[arg(long)]
    time: f64,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    #[arg(long)]
    project: PathBuf,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    #[arg(long)]
    project: PathBuf,
}

#[derive(Parser, Debug)]
struct TemplateArgs {
    /// Template id, see `templates`.
    #[arg(long)]
    id: String,

    /// Screen id; defaults to the active screen.
    #[arg(long)]
    screen: Option<String>,
}

#[derive(Parser, Debug)]
struct GifArgs {
    /// Project file; defaults to the stored working project.
    #[arg(long)]
    project: Option<PathBuf>,

    /// Screen id; defaults to the active screen.
    #[arg(long)]
    screen: Option<String>,

    /// Override the project's animation preset.
    #[arg(long)]
    preset: Option<String>,

    #[arg(long)]
    fps: Option<u32>,

    /// 1 (fastest) to 10 (best palette).
    #[arg(long)]
    quality: Option<u8>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct StillArgs {
    /// Project file; defaults to the stored working project.
    #[arg(long)]
    project: Option<PathBuf>,

    #[arg(long)]
    screen: Option<String>,

    #[arg(long, default_value_t = 1242)]
    width: u32,

    #[arg(long, default_value_t = 2208)]
    height: u32,

    /// Store size ids (repeatable). When given, `--out` is a ZIP archive.
    #[arg(long = "size")]
    sizes: Vec<String>,

    /// png or jpg.
    #[arg(long, default_value = "png")]
    format: String,

    /// JPEG quality, 1 to 100.
    #[arg(long, default_value_t = 92)]
    quality: u8,

    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[arg(long)]
    preset: String,

    #[arg(long, default_value_t = 2.0)]
    seconds: f64,

    /// Play once instead of looping.
    #[arg(long)]
    once: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => EditorConfig::default(),
    };
    cfg.apply_env_overrides();
    if cli.log_json {
        cfg.logging.json = true;
    }
    mockshot::logging::init_logging(&cfg.logging);

    match cli.cmd {
        Command::Presets => cmd_presets(),
        Command::Sample(args) => cmd_sample(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Gif(args) => cmd_gif(&cfg, args),
        Command::Still(args) => cmd_still(&cfg, args),
        Command::Import(args) => cmd_import(&cfg, args),
        Command::Templates => cmd_templates(),
        Command::Template(args) => cmd_template(&cfg, args),
        Command::Preview(args) => cmd_preview(&cfg, args),
    }
}

fn read_project(path: &Path) -> anyhow::Result<Project> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read project '{}'", path.display()))?;
    let project =
        import_project(&json).with_context(|| format!("import project '{}'", path.display()))?;
    Ok(project)
}

/// The project at `path`, or the stored working project.
fn load_project(cfg: &EditorConfig, path: Option<&Path>) -> anyhow::Result<Project> {
    if let Some(path) = path {
        return read_project(path);
    }
    let store = JsonFileStore::new(
        &cfg.storage.path,
        SystemTimeSource::new(),
        cfg.storage.save_debounce_ms,
    );
    store.load().with_context(|| {
        format!(
            "no stored project at '{}'; pass --project or run `mockshot import`",
            cfg.storage.path.display()
        )
    })
}

/// Editor-sized surface, with text overlays when a font can be found.
fn new_surface(cfg: &EditorConfig) -> CpuSurface {
    let surface = CpuSurface::new(Canvas::EDITOR);
    match TextRenderer::discover(cfg.render.font_path.as_deref()) {
        Some(renderer) => surface.with_text_renderer(renderer),
        None => {
            tracing::warn!("no usable font found, text overlays skipped (set render.font_path or MOCKSHOT_FONT)");
            surface
        }
    }
}

fn pick_screen<'p>(project: &'p Project, id: Option<&str>) -> anyhow::Result<&'p Screen> {
    match id {
        Some(id) => project
            .screen(id)
            .with_context(|| format!("no screen with id '{id}'")),
        None => project
            .active_screen()
            .context("project has no screens"),
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    for p in presets() {
        println!("{}\t{}\t{}ms\t{}", p.id, p.name, p.duration_ms, p.description);
    }
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let preset = find_preset(&args.preset)
        .with_context(|| format!("unknown preset '{}'", args.preset))?;
    let values = interpolate(preset.keyframes, args.time, &TransformValues::default());
    println!("{}", serde_json::to_string(&values)?);
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let project = read_project(&args.project)?;
    let devices: usize = project.screens.iter().map(|s| s.config.devices.len()).sum();
    println!(
        "ok: '{}' with {} screen(s), {} device(s), active screen '{}'",
        project.name,
        project.screens.len(),
        devices,
        project.active_screen_id
    );
    Ok(())
}

fn cmd_gif(cfg: &EditorConfig, args: GifArgs) -> anyhow::Result<()> {
    let project = load_project(cfg, args.project.as_deref())?;
    let screen = pick_screen(&project, args.screen.as_deref())?;

    let mut animation = project.animation.clone();
    if let Some(id) = args.preset {
        animation = AnimationConfig {
            enabled: true,
            duration_ms: find_preset(&id)
                .map_or(cfg.playback.default_duration_ms, |p| p.duration_ms),
            preset_id: Some(id),
            ..animation
        };
    }

    let mut gif_cfg = cfg.export.gif.clone();
    if let Some(fps) = args.fps {
        gif_cfg.fps = fps;
    }
    if let Some(q) = args.quality {
        gif_cfg.quality = q;
    }
    if let Some(w) = args.width {
        gif_cfg.width = w;
    }
    if let Some(h) = args.height {
        gif_cfg.height = h;
    }

    let time = SystemTimeSource::new();
    let mut clock = PlaybackClock::new(
        RefreshScheduler::new(time.clone(), cfg.playback.refresh_hz),
        &animation,
    );
    let mut surface = new_surface(cfg);
    let asset = {
        let mut session = ExportSession::new(&mut clock);
        let mut seek = session.seeker(
            &screen.config,
            &animation,
            time,
            Duration::from_millis(cfg.export.settle_delay_ms),
        );
        export_gif(
            &mut surface,
            &animation,
            &gif_cfg,
            &mut seek,
            |p| {
                if p.current == p.total {
                    let phase = match p.phase {
                        ExportPhase::Capturing => "captured",
                        ExportPhase::Encoding => "encoded",
                    };
                    tracing::info!(frames = p.total, "{phase} all frames");
                }
            },
            &CancelToken::new(),
        )?
    };

    write_output(&args.out, &asset.bytes)?;
    eprintln!("wrote {} ({} bytes)", args.out.display(), asset.bytes.len());
    Ok(())
}

fn cmd_still(cfg: &EditorConfig, args: StillArgs) -> anyhow::Result<()> {
    let project = load_project(cfg, args.project.as_deref())?;
    let screen = pick_screen(&project, args.screen.as_deref())?;
    let format = StillFormat::parse(&args.format)?;

    let mut surface = new_surface(cfg);
    surface.submit(SceneFrame::from_screen(
        &screen.config,
        &project.animation,
        project.animation.current_time,
    ));

    if !args.sizes.is_empty() {
        let ids: Vec<&str> = args.sizes.iter().map(String::as_str).collect();
        let archive = export_batch(&mut surface, &ids, format, args.quality, |i, n, size| {
            tracing::info!(size = size.name, "exporting {i}/{n}")
        })?;
        write_output(&args.out, &archive.bytes)?;
        eprintln!("wrote {} ({} bytes)", args.out.display(), archive.bytes.len());
        return Ok(());
    }

    let asset = export_still(&mut surface, args.width, args.height, format, args.quality)?;
    write_output(&args.out, &asset.bytes)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_import(cfg: &EditorConfig, args: ImportArgs) -> anyhow::Result<()> {
    let project = read_project(&args.project)?;
    let mut session = EditorSession::from_config(cfg, SystemTimeSource::new());
    session.replace(project);
    session
        .flush()
        .with_context(|| format!("save project to '{}'", cfg.storage.path.display()))?;
    eprintln!(
        "stored '{}' in {}",
        session.project().name,
        cfg.storage.path.display()
    );
    Ok(())
}

fn cmd_templates() -> anyhow::Result<()> {
    for t in templates() {
        println!("{}\t{}\t{} device(s)\t{}", t.id, t.name, t.devices.len(), t.description);
    }
    Ok(())
}

fn cmd_template(cfg: &EditorConfig, args: TemplateArgs) -> anyhow::Result<()> {
    let template =
        find_template(&args.id).with_context(|| format!("unknown template '{}'", args.id))?;
    let mut session = EditorSession::from_config(cfg, SystemTimeSource::new());
    let screen_id = pick_screen(session.project(), args.screen.as_deref())?
        .id
        .clone();

    session.edit_with_history(|p| {
        let mut next = p.clone();
        let now = now_millis();
        if let Some(screen) = next.screens.iter_mut().find(|s| s.id == screen_id) {
            screen.config.apply_template(template);
            screen.updated_at = now;
        }
        next.updated_at = now;
        next
    });
    session
        .flush()
        .with_context(|| format!("save project to '{}'", cfg.storage.path.display()))?;
    eprintln!("applied '{}' to screen {screen_id}", template.name);
    Ok(())
}

fn cmd_preview(cfg: &EditorConfig, args: PreviewArgs) -> anyhow::Result<()> {
    if find_preset(&args.preset).is_none() {
        anyhow::bail!("unknown preset '{}'", args.preset);
    }
    let animation = AnimationConfig {
        loop_: !args.once,
        ..AnimationConfig::for_preset(&args.preset)
    };

    let time = SystemTimeSource::new();
    let mut clock = PlaybackClock::new(
        RefreshScheduler::new(time.clone(), cfg.playback.refresh_hz),
        &animation,
    );
    clock.subscribe(|tick| tracing::debug!(time = tick.time, playing = tick.is_playing, "tick"));
    clock.play();

    let end_ms = time.now_ms() + args.seconds.max(0.0) * 1000.0;
    let mut last_logged = -1.0;
    while clock.is_playing() && time.now_ms() < end_ms {
        let (due, ts) = clock.scheduler_mut().wait_next();
        for id in due {
            clock.on_frame(id, ts);
        }
        let t = clock.current_time();
        if (t - last_logged).abs() >= 0.1 || !clock.is_playing() {
            tracing::info!(time = t, "playback");
            last_logged = t;
        }
    }
    clock.pause();
    println!("{:.4}", clock.current_time());
    Ok(())
}
