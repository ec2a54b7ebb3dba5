use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use jayverse::effects::mockup::decode_mockup_inputs;
use jayverse::encode::export::unix_millis;
use jayverse::encode::gallery;
use jayverse::proxy::ai::{
    CaptionRequest, CaptionStyle, HashtagRequest, SceneRequest, scene_image_bytes,
};
use jayverse::{
    AiProxy, BlendMode, CompositeResult, GlitchParams, JayverseConfig, MemeCompositor, MemeParams,
    MockupParams, PlacementRect, Tool,
};

#[derive(Parser, Debug)]
#[command(name = "jayverse", version)]
struct Cli {
    /// JSON configuration file. Environment overrides apply on top.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the glitch filter to an image.
    Glitch(GlitchArgs),
    /// Caption a meme template.
    Meme(MemeArgs),
    /// Place a logo on a product photo.
    Mockup(MockupArgs),
    /// Print the template catalog as JSON.
    Templates,
    /// Generate social media captions for an image description.
    Caption(CaptionArgs),
    /// Generate hashtags for a topic.
    Hashtags(HashtagArgs),
    /// Generate an image for a script description.
    Scene(SceneArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output PNG path. Defaults to the suggested download name.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also save the result to the local gallery under this user id.
    #[arg(long = "save-gallery", value_name = "USER_ID")]
    save_gallery: Option<String>,
}

#[derive(Parser, Debug)]
struct GlitchArgs {
    /// Source image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Block displacement strength, 0..=0.1.
    #[arg(long, default_value_t = 0.05)]
    intensity: f64,

    /// Red/blue channel offset in pixels, 0..=20.
    #[arg(long, default_value_t = 5.0)]
    rgb_shift: f64,

    /// Darkening of even rows, 0..=1.
    #[arg(long, default_value_t = 0.0)]
    scanlines: f64,

    /// Seed for the block displacement.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct MemeArgs {
    /// Template id from the catalog.
    #[arg(long, conflicts_with = "image")]
    template: Option<String>,

    /// Custom background image.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Top caption. Defaults to the template's suggestion.
    #[arg(long)]
    top: Option<String>,

    /// Bottom caption. Defaults to the template's suggestion.
    #[arg(long)]
    bottom: Option<String>,

    /// Font size in pixels.
    #[arg(long, default_value_t = 48.0)]
    font_size: f32,

    /// Fill color.
    #[arg(long, default_value = "#FFFFFF")]
    font_color: String,

    /// Outline color.
    #[arg(long, default_value = "#000000")]
    stroke_color: String,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct MockupArgs {
    /// Template id from the catalog.
    #[arg(long, conflicts_with = "image")]
    template: Option<String>,

    /// Custom product photo. Requires `--placement`.
    #[arg(long, requires = "placement")]
    image: Option<PathBuf>,

    /// Placement rectangle as `x,y,width,height`.
    #[arg(long, value_delimiter = ',', num_args = 4)]
    placement: Option<Vec<f64>>,

    /// Logo image (PNG, JPEG, WebP, GIF or SVG).
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Logo size in percent of the placement rect.
    #[arg(long, default_value_t = 100.0)]
    scale: f64,

    /// Logo opacity.
    #[arg(long, default_value_t = 1.0)]
    opacity: f32,

    /// Blend mode, e.g. `multiply` or `screen`.
    #[arg(long, default_value = "normal")]
    blend: BlendMode,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct CaptionArgs {
    /// Text description of the image.
    #[arg(long)]
    description: String,

    /// funny, deep, savage, creative or general.
    #[arg(long, default_value = "general")]
    style: String,
}

#[derive(Parser, Debug)]
struct HashtagArgs {
    /// Topic to tag.
    #[arg(long)]
    topic: String,
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Script text to illustrate.
    #[arg(long)]
    description: String,

    /// Write the decoded image here instead of printing the JSON response.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => JayverseConfig::from_path(path)?,
        None => JayverseConfig::default(),
    }
    .with_env_overrides();

    match cli.cmd {
        Command::Glitch(args) => cmd_glitch(&cfg, args),
        Command::Meme(args) => cmd_meme(&cfg, args),
        Command::Mockup(args) => cmd_mockup(&cfg, args),
        Command::Templates => cmd_templates(&cfg),
        Command::Caption(args) => cmd_caption(&cfg, args),
        Command::Hashtags(args) => cmd_hashtags(&cfg, args),
        Command::Scene(args) => cmd_scene(&cfg, args),
    }
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_output(
    cfg: &JayverseConfig,
    result: &CompositeResult,
    output: &OutputArgs,
    title: &str,
) -> anyhow::Result<()> {
    let millis = unix_millis();
    let png = result.to_png()?;
    let out = output
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(result.download_filename(millis)));
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &png).with_context(|| format!("write png '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());

    if let Some(user_id) = &output.save_gallery {
        let mut sink = cfg.gallery.local();
        let record =
            gallery::save_to_gallery(&mut sink, user_id, result.tool, title, &png, millis)?;
        eprintln!("saved to gallery: {}", record.image_url);
    }
    Ok(())
}

fn cmd_glitch(cfg: &JayverseConfig, args: GlitchArgs) -> anyhow::Result<()> {
    let source = jayverse::decode_image(&read_file(&args.in_path)?)?;
    let params = GlitchParams {
        pixel_glitch_intensity: args.intensity,
        rgb_shift_pixels: args.rgb_shift,
        scanline_intensity: args.scanlines,
        seed: args.seed,
    };
    let image = jayverse::apply_glitch(&source, &params);
    let title = gallery::glitch_title(&file_name(&args.in_path));
    write_output(
        cfg,
        &CompositeResult::new(Tool::Glitch, image),
        &args.output,
        &title,
    )
}

fn cmd_meme(cfg: &JayverseConfig, args: MemeArgs) -> anyhow::Result<()> {
    let (template, name, defaults) = match (&args.template, &args.image) {
        (_, Some(path)) => (
            jayverse::decode_image(&read_file(path)?)?,
            file_name(path),
            (None, None),
        ),
        (Some(id), None) => {
            let catalog = cfg.catalog()?;
            let tpl = catalog.meme(id)?;
            let bytes = cfg.asset_root().read_bytes(&tpl.image_src)?;
            (
                jayverse::decode_image(&bytes)?,
                tpl.name.clone(),
                (tpl.default_top_text.clone(), tpl.default_bottom_text.clone()),
            )
        }
        (None, None) => anyhow::bail!("pass --template <id> or --image <path>"),
    };

    let params = MemeParams {
        top_text: args.top.or(defaults.0).unwrap_or_default(),
        bottom_text: args.bottom.or(defaults.1).unwrap_or_default(),
        font_size: args.font_size,
        font_color: args.font_color,
        stroke_color: args.stroke_color,
    };
    let image = MemeCompositor::new(cfg.fonts.font_choice()).render(&template, &params)?;
    let title = gallery::meme_title(&params.top_text, &name);
    write_output(
        cfg,
        &CompositeResult::new(Tool::Meme, image),
        &args.output,
        &title,
    )
}

fn cmd_mockup(cfg: &JayverseConfig, args: MockupArgs) -> anyhow::Result<()> {
    let custom_placement = match args.placement.as_deref() {
        Some(&[x, y, w, h]) => Some(PlacementRect::new(x, y, w, h)?),
        Some(_) => anyhow::bail!("--placement takes exactly four numbers"),
        None => None,
    };
    let (template_bytes, name, placement) = match (&args.template, &args.image) {
        (_, Some(path)) => {
            let placement =
                custom_placement.context("--placement is required with --image")?;
            (read_file(path)?, file_name(path), placement)
        }
        (Some(id), None) => {
            let catalog = cfg.catalog()?;
            let tpl = catalog.mockup(id)?;
            (
                cfg.asset_root().read_bytes(&tpl.image_src)?,
                tpl.name.clone(),
                custom_placement.unwrap_or(tpl.placement),
            )
        }
        (None, None) => anyhow::bail!("pass --template <id> or --image <path>"),
    };

    let logo_bytes = args.logo.as_deref().map(read_file).transpose()?;
    let (template, logo) =
        decode_mockup_inputs(&template_bytes, logo_bytes.as_deref().map(|b| (b, None)))?;
    if logo.is_none() {
        tracing::warn!("no --logo given, writing the template unchanged");
    }

    let params = MockupParams {
        scale_percent: args.scale,
        opacity: args.opacity,
        blend_mode: args.blend,
    };
    let image = jayverse::render_mockup(&template, placement, logo.as_ref(), &params)?;
    write_output(
        cfg,
        &CompositeResult::new(Tool::Mockup, image),
        &args.output,
        &gallery::mockup_title(&name),
    )
}

fn cmd_templates(cfg: &JayverseConfig) -> anyhow::Result<()> {
    let catalog = cfg.catalog()?;
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

fn cmd_caption(cfg: &JayverseConfig, args: CaptionArgs) -> anyhow::Result<()> {
    let style: CaptionStyle = serde_json::from_value(serde_json::Value::String(
        args.style.to_ascii_lowercase(),
    ))?;
    let proxy = AiProxy::new(cfg.ai.clone())?;
    let resp = proxy.generate_captions(&CaptionRequest {
        image_description_text: args.description,
        style,
    })?;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

fn cmd_hashtags(cfg: &JayverseConfig, args: HashtagArgs) -> anyhow::Result<()> {
    let proxy = AiProxy::new(cfg.ai.clone())?;
    let resp = proxy.generate_hashtags(&HashtagRequest { topic: args.topic })?;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

fn cmd_scene(cfg: &JayverseConfig, args: SceneArgs) -> anyhow::Result<()> {
    let proxy = AiProxy::new(cfg.ai.clone())?;
    let resp = proxy.generate_scene(&SceneRequest {
        script_description: args.description,
    })?;
    match args.out {
        Some(out) => {
            let bytes = scene_image_bytes(&resp)
                .context("scene response is not an inline image (mock mode?)")?;
            std::fs::write(&out, bytes).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&resp)?),
    }
    Ok(())
}
