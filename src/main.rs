mod chunk;
mod encoder;
mod frame;
mod grid;
mod magick;
mod playlist;
mod profile;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use encoder::EncodeSummary;
use indicatif::HumanBytes;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "gridvid",
    version,
    about = "Quadrant-interleaved frame stream encoder + playlist publisher for tiny LCD players"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a folder of JPEG frames into a chunked quadrant stream (.dat)
    Encode {
        frames_dir: PathBuf,
        output: PathBuf,

        /// Scratch directory for intermediate quadrant files
        #[arg(long, default_value = "tmp")]
        scratch: PathBuf,

        /// Chunk payload budget in bytes
        #[arg(long, default_value_t = encoder::DEFAULT_MAX_CHUNK_BYTES)]
        max_chunk: u64,
    },

    /// Derive a video profile from encoded artifacts and merge it into playlist.json
    Publish {
        /// Display title, reduced to [a-zA-Z0-9_-]
        title: String,

        /// Playback speed in frames per second (1-100)
        fps: u32,

        /// Directory holding frames/, vid/, mp3/, jpg/, tmp/ and playlist.json
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Encode {
            frames_dir,
            output,
            scratch,
            max_chunk,
        } => {
            magick::ensure_convert_available().context("ImageMagick convert not found in PATH")?;
            let summary = encoder::encode_frames(
                &frames_dir,
                &output,
                &encoder::EncodeConfig {
                    scratch_dir: scratch,
                    max_chunk_bytes: max_chunk,
                },
            )?;
            print_encode_summary(&summary);
        }

        Commands::Publish { title, fps, root } => {
            let title = profile::sanitize_title(&title)?;
            profile::validate_fps(fps)?;
            magick::ensure_convert_available().context("ImageMagick convert not found in PATH")?;

            let profile = profile::build_profile(&root, &title, fps)?;
            println!("{}", serde_json::to_string(&profile)?);

            let playlist_path = root.join("playlist.json");
            let mut playlist = playlist::Playlist::load(&playlist_path)?;
            playlist.merge(profile);
            playlist.save(&playlist_path)?;
            println!(
                "Playlist saved: {} entries={}",
                playlist_path.display(),
                playlist.playlist_count
            );
        }
    }

    Ok(())
}

fn print_encode_summary(summary: &EncodeSummary) {
    println!(
        "Encode summary: output={} frames={} chunks={} payload={} avg_chunk={} duration={} warnings={}",
        summary.output.display(),
        summary.frame_count,
        summary.chunk_count,
        HumanBytes(summary.payload_bytes),
        summary.avg_chunk_size,
        fmt_duration(summary.elapsed),
        summary.warning_count,
    );
    for warning in &summary.warnings {
        println!("  warning: {}", warning);
    }
}

fn fmt_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}
