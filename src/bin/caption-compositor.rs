use std::path::{Path, PathBuf};

use anyhow::Context as _;
use caption_compositor::{
    CaptionStyle, DirectorySaveBackend, Editor, EditorConfig, EditorEvent, FontSlant, FontWeight,
    FsImageSource, Point, Rgba8, TextAlign,
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "caption-compositor", version)]
struct Cli {
    /// Editor config JSON (canvas, metrics, fonts, default style).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite one caption over one image and write the PNG.
    Render(RenderArgs),
    /// Drive the editor through a JSON event script, then save.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Background image path.
    #[arg(long)]
    image: PathBuf,

    /// Caption markup.
    #[arg(long, default_value = "")]
    caption: String,

    /// Read caption markup from a file instead.
    #[arg(long, conflicts_with = "caption")]
    caption_file: Option<PathBuf>,

    /// Caption style JSON, replacing the configured default style.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Drag the background by this many canvas pixels horizontally.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pan_x: f64,

    /// Drag the background by this many canvas pixels vertically.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pan_y: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Script JSON; the image path is resolved against its directory.
    #[arg(long)]
    script: PathBuf,

    /// Directory receiving `<stem>.png` and `<stem>.json`.
    #[arg(long)]
    out_dir: PathBuf,

    #[arg(long, default_value = "caption")]
    stem: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Script {
    image: String,
    #[serde(default)]
    caption: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    GradientColor(Rgba8),
    GradientOpacity(f32),
    FontSize(u32),
    LineHeight(u32),
    Align(TextAlign),
    Weight(FontWeight),
    Slant(FontSlant),
    TextColor(Rgba8),
    ShadowBlur(u32),
    Caption(String),
    Drag { from: [f64; 2], to: [f64; 2] },
}

impl Step {
    fn into_events(self) -> Vec<EditorEvent> {
        match self {
            Step::GradientColor(c) => vec![EditorEvent::GradientColor(c)],
            Step::GradientOpacity(v) => vec![EditorEvent::GradientOpacity(v)],
            Step::FontSize(v) => vec![EditorEvent::FontSize(v)],
            Step::LineHeight(v) => vec![EditorEvent::LineHeight(v)],
            Step::Align(a) => vec![EditorEvent::Align(a)],
            Step::Weight(w) => vec![EditorEvent::Weight(w)],
            Step::Slant(s) => vec![EditorEvent::Slant(s)],
            Step::TextColor(c) => vec![EditorEvent::TextColor(c)],
            Step::ShadowBlur(v) => vec![EditorEvent::ShadowBlur(v)],
            Step::Caption(markup) => vec![EditorEvent::CaptionEdited(markup)],
            Step::Drag { from, to } => vec![
                EditorEvent::PointerDown(Point::new(from[0], from[1])),
                EditorEvent::PointerMove(Point::new(to[0], to[1])),
                EditorEvent::PointerUp,
            ],
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::from_path(path)?,
        None => EditorConfig::default(),
    };
    match cli.cmd {
        Command::Render(args) => cmd_render(config, args),
        Command::Replay(args) => cmd_replay(config, args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = std::fs::File::open(path)
        .with_context(|| format!("open {what} '{}'", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(f))
        .with_context(|| format!("parse {what} '{}'", path.display()))
}

fn cmd_render(mut config: EditorConfig, args: RenderArgs) -> anyhow::Result<()> {
    if let Some(path) = &args.style {
        let style: CaptionStyle = read_json(path, "caption style")?;
        style.validate()?;
        config.default_style = style;
    }
    let caption = match &args.caption_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read caption '{}'", path.display()))?,
        None => args.caption.clone(),
    };

    let mut editor = Editor::from_config(config)?;
    let mut source = FsImageSource::new(".");
    let url = args.image.to_string_lossy();
    let ticket = editor.open(&url, caption, "");
    editor.load_with(ticket, &mut source)?;

    if args.pan_x != 0.0 || args.pan_y != 0.0 {
        for event in (Step::Drag {
            from: [0.0, 0.0],
            to: [args.pan_x, args.pan_y],
        })
        .into_events()
        {
            editor.handle(event)?;
        }
    }

    let png = editor.export()?.png_bytes()?;
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_replay(config: EditorConfig, args: ReplayArgs) -> anyhow::Result<()> {
    let script: Script = read_json(&args.script, "script")?;
    let root = args
        .script
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let mut editor = Editor::from_config(config)?;
    let mut source = FsImageSource::new(root);
    let ticket = editor.open(&script.image, script.caption, script.body);
    editor.load_with(ticket, &mut source)?;

    for (i, step) in script.steps.into_iter().enumerate() {
        for event in step.into_events() {
            let control = event.control();
            if !editor.handle(event)? {
                eprintln!("step {i}: {control:?} event ignored");
            }
        }
    }

    let mut backend = DirectorySaveBackend::new(&args.out_dir, args.stem);
    let status = editor.save(&mut backend)?;
    eprintln!("{status}");
    Ok(())
}
