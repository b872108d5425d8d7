use crate::frame;
use crate::magick;

use anyhow::{bail, Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One playlist entry. Every value is serialized as a JSON string: the
/// player's parser only reads strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProfile {
    pub profile_name: String,
    pub video_file_name: String,
    pub audio_file_name: String,
    pub thumb_file_name: String,
    pub video_file_size: String,
    pub audio_file_size: String,
    pub thumb_file_size: String,
    pub audio_source: String,
    pub framespeed: String,
    pub totalframes: String,
    pub width: String,
    pub height: String,
}

/// Strips every character outside `[a-zA-Z0-9_-]`. A title with nothing left
/// would derive empty file paths, so it is rejected.
pub fn sanitize_title(raw: &str) -> Result<String> {
    let title: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if title.is_empty() {
        bail!(
            "title {:?} has no usable characters (allowed: a-z A-Z 0-9 _ -)",
            raw
        );
    }
    Ok(title)
}

pub fn validate_fps(fps: u32) -> Result<()> {
    if fps == 0 || fps > 100 {
        bail!("Unrealistic fps {}", fps);
    }
    Ok(())
}

fn profile_name(title: &str) -> String {
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Builds the playlist entry for an encoded video from the artifacts under
/// `root`: the frame folder, the stream and audio files, the thumbnail it
/// produces, and the leftover scratch quadrants of the last encoded frame.
/// Every validation failure is a hard error.
pub fn build_profile(root: &Path, title: &str, fps: u32) -> Result<VideoProfile> {
    let frames = frame::scan_frames(&root.join("frames"))?;
    if frames.is_empty() {
        bail!("no frames found in {:?}", root.join("frames"));
    }

    eprintln!(
        "Publish plan: title={} fps={} frames={} root={}",
        title,
        fps,
        frames.len(),
        root.display()
    );

    let video_file_name = format!("/vid/{}.dat", title);
    let audio_file_name = format!("/mp3/{}.mp3", title);
    let thumb_file_name = format!("/jpg/{}.jpg", title);

    let thumb_src = &frames[rand::thread_rng().gen_range(0..frames.len())];
    let thumb_path = rooted(root, &thumb_file_name);
    magick::make_thumbnail(&thumb_src.path, &thumb_path)?;
    if !thumb_path.is_file() {
        bail!("unable to create thumbnail {:?}", thumb_path);
    }

    let video_file_size = file_size(&rooted(root, &video_file_name))?;
    let audio_file_size = file_size(&rooted(root, &audio_file_name))?;
    let thumb_file_size = file_size(&thumb_path)?;

    // The scratch leftovers of the last frame double as a sanity check that
    // encoding ran to completion and produced plausible quadrants.
    let residuals = residual_quadrants(&root.join("tmp"))?;
    let (width, height) = image::image_dimensions(&residuals[0])
        .with_context(|| format!("failed to read dimensions of {:?}", residuals[0]))?;
    if width == 0 || width > 320 {
        bail!("Unrealistic width: {}", width);
    }
    if height == 0 || height > 240 {
        bail!("Unrealistic height: {}", height);
    }

    Ok(VideoProfile {
        profile_name: profile_name(title),
        video_file_name,
        audio_file_name,
        thumb_file_name,
        video_file_size: video_file_size.to_string(),
        audio_file_size: audio_file_size.to_string(),
        thumb_file_size: thumb_file_size.to_string(),
        audio_source: "0".to_string(),
        framespeed: fps.to_string(),
        totalframes: frames.len().to_string(),
        width: width.to_string(),
        height: height.to_string(),
    })
}

fn rooted(root: &Path, device_path: &str) -> PathBuf {
    root.join(device_path.trim_start_matches('/'))
}

fn file_size(path: &Path) -> Result<u64> {
    Ok(std::fs::metadata(path)
        .with_context(|| format!("missing file {:?}", path))?
        .len())
}

fn residual_quadrants(scratch: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(scratch)
        .with_context(|| format!("missing scratch dir {:?}", scratch))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    if files.len() != 4 {
        bail!(
            "expected 4 leftover quadrant files in {:?}, found {}",
            scratch,
            files.len()
        );
    }
    Ok(files)
}
