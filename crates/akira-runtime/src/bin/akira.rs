//! `akira` CLI - Convert landmark captures to VMD motion files

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use akira_core::{Bone, Morph};
use akira_retarget::Skeleton;
use akira_runtime::{AkiraConfig, CaptureReader, ModelDescription, Session};
use akira_vmd::VmdMotion;

#[derive(Parser)]
#[command(name = "akira")]
#[command(about = "Motion capture landmarks to MMD motion files")]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines capture and write one VMD file per clip
    Convert {
        /// Capture file, one detector result per line
        input: PathBuf,

        /// Model description (bone and morph names); all known bones when omitted
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Capture frame rate, used for lines without a time
        #[arg(long, default_value = "30")]
        fps: f64,
    },

    /// Summarize a VMD file
    Inspect {
        /// Motion file
        file: PathBuf,

        /// List record counts per bone and morph
        #[arg(short, long)]
        tracks: bool,
    },

    /// Print the default configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Convert {
            input,
            model,
            config,
            out_dir,
            fps,
        } => cmd_convert(input, model, config, out_dir, fps),
        Commands::Inspect { file, tracks } => cmd_inspect(file, tracks),
        Commands::Config => {
            println!("{}", AkiraConfig::default().to_json()?);
            Ok(())
        }
    }
}

fn cmd_convert(
    input: PathBuf,
    model: Option<PathBuf>,
    config: Option<PathBuf>,
    out_dir: PathBuf,
    fps: f64,
) -> Result<()> {
    anyhow::ensure!(fps > 0.0, "fps must be positive, got {fps}");

    let config = match config {
        Some(path) => AkiraConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AkiraConfig::default(),
    };
    let mut session = Session::new(config)?;

    let skeleton = match model {
        Some(path) => ModelDescription::load(&path)
            .with_context(|| format!("loading model {}", path.display()))?
            .skeleton(),
        None => Skeleton::full(),
    };
    session.bind_skeleton(skeleton)?;

    let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
    let mut current = None;
    let mut frame = 0u64;
    for record in CaptureReader::new(BufReader::new(file)) {
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_frame_local() => {
                session.skip(&e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if current != Some(record.clip) {
            session.begin_clip(record.clip)?;
            current = Some(record.clip);
            frame = 0;
        }
        let time = record.frame_time(frame, fps);
        frame += 1;
        session.process(record.result, time)?;
    }

    let stats = session.stats().clone();
    let paths = session.export_all(&out_dir)?;
    println!(
        "Processed {} frames ({} skipped)",
        stats.processed, stats.skipped
    );
    for path in paths {
        println!("  {}", path.display());
    }
    Ok(())
}

fn cmd_inspect(file: PathBuf, tracks: bool) -> Result<()> {
    let data = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    let motion = VmdMotion::parse(&data).with_context(|| format!("parsing {}", file.display()))?;

    println!("File:          {}", file.display());
    println!("Size:          {} bytes", data.len());
    println!("Frames:        {}", motion.frame_count());
    println!("Bone records:  {}", motion.bone_frames.len());
    println!("Morph records: {}", motion.morph_frames.len());
    if motion.camera_count + motion.light_count + motion.shadow_count > 0 {
        println!(
            "Other:         {} camera, {} light, {} shadow",
            motion.camera_count, motion.light_count, motion.shadow_count
        );
    }

    if tracks {
        let mut bones: BTreeMap<String, usize> = BTreeMap::new();
        for frame in &motion.bone_frames {
            let name = frame
                .bone
                .map(Bone::name)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{:02x?}", frame.name));
            *bones.entry(name).or_default() += 1;
        }
        let mut morphs: BTreeMap<String, usize> = BTreeMap::new();
        for frame in &motion.morph_frames {
            let name = frame
                .morph
                .map(Morph::name)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{:02x?}", frame.name));
            *morphs.entry(name).or_default() += 1;
        }

        println!("\nBones:");
        for (name, count) in bones {
            println!("  {name:<12} {count}");
        }
        println!("\nMorphs:");
        for (name, count) in morphs {
            println!("  {name:<12} {count}");
        }
    }
    Ok(())
}
