use crate::chunk;
use crate::frame;
use crate::grid::{GridSequencer, StatsAccumulator};
use crate::magick;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const START_QUALITY: u32 = 80;
pub const MIN_QUALITY: u32 = 10;
pub const QUALITY_STEP: u32 = 10;
pub const DEFAULT_MAX_CHUNK_BYTES: u64 = 1024;

pub struct EncodeConfig {
    pub scratch_dir: PathBuf,
    pub max_chunk_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct EncodeSummary {
    pub output: PathBuf,
    pub frame_count: usize,
    pub chunk_count: u64,
    pub payload_bytes: u64,
    pub avg_chunk_size: u64,
    pub elapsed: Duration,
    pub warning_count: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityOutcome {
    pub quality: u32,
    pub size: u64,
    pub warning: Option<String>,
}

/// Walks the quality staircase down from 80 in steps of 10 until the selected
/// quadrant fits the byte budget. At the floor of 10 the result is accepted
/// even when oversized, with a warning carrying the frame and the final size.
/// Quality only ever decreases within one search; every frame starts fresh.
pub fn quality_search(
    frame_label: &str,
    max_chunk_bytes: u64,
    mut encode: impl FnMut(u32) -> Result<u64>,
) -> Result<QualityOutcome> {
    let mut quality = START_QUALITY;
    loop {
        let size = encode(quality)?;
        if size <= max_chunk_bytes {
            return Ok(QualityOutcome {
                quality,
                size,
                warning: None,
            });
        }
        if quality <= MIN_QUALITY {
            return Ok(QualityOutcome {
                quality,
                size,
                warning: Some(format!(
                    "{} exceeds max {} : {}",
                    frame_label, max_chunk_bytes, size
                )),
            });
        }
        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
    }
}

/// Converts a directory of still frames into the chunked quadrant stream.
/// One chunk per frame: the quality search bounds the selected quadrant's
/// size, the sequencer picks which quadrant this frame refreshes, and the
/// chunk writer appends it with its length header.
pub fn encode_frames(frames_dir: &Path, output: &Path, cfg: &EncodeConfig) -> Result<EncodeSummary> {
    let started = Instant::now();

    let frames = frame::scan_frames(frames_dir)?;
    if frames.is_empty() {
        bail!("no frames found in {:?}", frames_dir);
    }

    eprintln!(
        "Encode plan: frames={} budget={}B scratch={} output={}",
        frames.len(),
        cfg.max_chunk_bytes,
        cfg.scratch_dir.display(),
        output.display()
    );

    let file = File::create(output).with_context(|| format!("failed to create {:?}", output))?;
    let mut out = BufWriter::new(file);

    let pb = ProgressBar::new(frames.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {wide_bar} {pos}/{len} {msg}").unwrap(),
    );

    let mut sequencer = GridSequencer::new();
    let mut stats = StatsAccumulator::default();
    let mut warnings = Vec::new();

    for frame in &frames {
        let selected = sequencer.selected_quadrant();

        let outcome = quality_search(
            &frame.path.display().to_string(),
            cfg.max_chunk_bytes,
            |quality| {
                magick::crop_quadrants(&frame.path, frame.frame_number, quality, &cfg.scratch_dir)?;
                let quad = magick::quadrant_path(&cfg.scratch_dir, frame.frame_number, selected);
                Ok(fs::metadata(&quad)?.len())
            },
        )?;
        if let Some(warning) = outcome.warning {
            warnings.push(warning);
        }

        let quad = magick::quadrant_path(&cfg.scratch_dir, frame.frame_number, selected);
        let payload =
            fs::read(&quad).with_context(|| format!("failed to read quadrant {:?}", quad))?;
        chunk::write_chunk(&mut out, &payload)?;

        stats.record(payload.len() as u64);
        sequencer.advance();
        pb.set_message(format!("quality={} size={}B", outcome.quality, outcome.size));
        pb.inc(1);
    }

    out.flush()
        .with_context(|| format!("failed to flush {:?}", output))?;
    pb.finish_with_message("done");

    Ok(EncodeSummary {
        output: output.to_path_buf(),
        frame_count: frames.len(),
        chunk_count: stats.chunk_count(),
        payload_bytes: stats.payload_bytes(),
        avg_chunk_size: stats.avg_chunk_size(),
        elapsed: started.elapsed(),
        warning_count: warnings.len(),
        warnings,
    })
}
