use std::io::BufRead as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "talkhead", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the avatar: each stdin line is spoken; `:resize W H` and `:quit` are commands.
    Run(RunArgs),
    /// Play one existing video through the full pipeline, then exit.
    Play(PlayArgs),
    /// Color-grade a single image against a reference and write a PNG.
    Grade(GradeArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Application config JSON.
    #[arg(long)]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Application config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Video to play.
    video: PathBuf,
}

#[derive(Parser, Debug)]
struct GradeArgs {
    /// Reference face (image, or video whose first frame is used).
    #[arg(long)]
    reference: PathBuf,

    /// Image to correct.
    #[arg(long)]
    frame: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Play(args) => cmd_play(args),
        Command::Grade(args) => cmd_grade(args),
    }
}

#[cfg(feature = "audio-rodio")]
fn audio_output() -> Arc<dyn talkhead::AudioOutput> {
    Arc::new(talkhead::RodioAudio)
}

#[cfg(not(feature = "audio-rodio"))]
fn audio_output() -> Arc<dyn talkhead::AudioOutput> {
    Arc::new(talkhead::ClockAudio::new())
}

fn print_events(events: crossbeam_channel::Receiver<talkhead::StageEvent>) {
    for event in events {
        match event {
            talkhead::StageEvent::Busy { label } => eprintln!("{label}"),
            talkhead::StageEvent::Ready { clear_text } => {
                eprintln!("{}", if clear_text { "ready" } else { "ready (text kept)" })
            }
            talkhead::StageEvent::Error { message } => eprintln!("error: {message}"),
        }
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = talkhead::AppConfig::load(&args.config)?;
    let secrets = talkhead::Secrets::load(&config.secrets_path)?;
    let stage = talkhead::Stage::from_config(&config, &secrets, audio_output())?;

    let events = stage.events();
    std::thread::spawn(move || print_events(events));

    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: read stdin: {e}");
                break;
            }
        };
        let line = line.trim();
        if line == ":quit" {
            break;
        }
        if let Some(rest) = line.strip_prefix(":resize") {
            match parse_resize(rest) {
                Some((w, h)) => {
                    if let Err(e) = stage.resize(w, h) {
                        eprintln!("error: {e}");
                    }
                }
                None => eprintln!("usage: :resize WIDTH HEIGHT"),
            }
            continue;
        }
        // Rejections are reported through the event stream.
        let _ = stage.submit(line);
    }

    stage.shutdown();
    Ok(())
}

fn parse_resize(rest: &str) -> Option<(u32, u32)> {
    let mut dims = rest.split_whitespace().map(str::parse::<u32>);
    match (dims.next(), dims.next(), dims.next()) {
        (Some(Ok(w)), Some(Ok(h)), None) => Some((w, h)),
        _ => None,
    }
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let config = talkhead::AppConfig::load(&args.config)?;
    let secrets = talkhead::Secrets {
        lip_api_key: String::new(),
    };
    let stage = talkhead::Stage::from_config(&config, &secrets, audio_output())?;
    let events = stage.events();

    stage.play_file(&args.video)?;
    let mut failed = None;
    for event in &events {
        match event {
            talkhead::StageEvent::Busy { label } => eprintln!("{label}"),
            talkhead::StageEvent::Error { message } => failed = Some(message),
            talkhead::StageEvent::Ready { .. } => break,
        }
    }
    stage.shutdown();

    match failed {
        Some(message) => {
            anyhow::bail!("playback of '{}' failed: {message}", args.video.display())
        }
        None => {
            eprintln!("played {}", args.video.display());
            Ok(())
        }
    }
}

fn cmd_grade(args: GradeArgs) -> anyhow::Result<()> {
    let reference = talkhead::load_reference(
        &args.reference,
        talkhead::AssetKind::infer(&args.reference),
    )?;
    let frame = talkhead::load_still_image(&args.frame)?;
    let corrected = talkhead::correct(&reference, &frame)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &corrected.data,
        corrected.width,
        corrected.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
