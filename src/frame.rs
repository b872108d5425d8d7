use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub path: PathBuf,
    pub frame_number: u64,
}

/// Derives the frame number by stripping every non-digit character from the
/// file name. A name carrying no digits cannot be placed in the sequence.
pub fn frame_number(path: &Path) -> Result<u64> {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        bail!("frame file {:?} has no digits to derive a frame number from", path);
    }
    digits
        .parse::<u64>()
        .with_context(|| format!("frame number in {:?} is out of range", path))
}

/// Lists the source frames of a directory, ordered by parsed frame number so
/// that processing order never depends on filesystem enumeration order.
pub fn scan_frames(dir: &Path) -> Result<Vec<SourceFrame>> {
    if !dir.is_dir() {
        bail!("frames directory {:?} does not exist", dir);
    }
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {:?}", dir))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let number = frame_number(&path)?;
        frames.push(SourceFrame {
            path,
            frame_number: number,
        });
    }
    frames.sort_by_key(|f| f.frame_number);
    Ok(frames)
}
