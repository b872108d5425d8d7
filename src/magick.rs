use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

pub fn ensure_convert_available() -> Result<()> {
    let out = Command::new("convert")
        .arg("-version")
        .output()
        .context("failed to run convert -version")?;
    if !out.status.success() {
        bail!("convert exists but returned non-zero on -version");
    }
    Ok(())
}

pub fn quadrant_path(scratch: &Path, frame_number: u64, quadrant: usize) -> PathBuf {
    scratch.join(format!("{}.{}.jpg", frame_number, quadrant))
}

/// Splits a frame into its 2x2 crop grid at the given JPEG quality, leaving
/// four quadrant files in the scratch directory. The scratch directory is
/// cleared first so a retry at a lower quality never measures stale bytes
/// from the previous attempt.
pub fn crop_quadrants(frame: &Path, frame_number: u64, quality: u32, scratch: &Path) -> Result<()> {
    clear_scratch(scratch)?;

    let pattern = scratch.join(format!("{}.%d.jpg", frame_number));
    let out = Command::new("convert")
        .arg(frame)
        .arg("-crop")
        .arg("50%x50%")
        .arg("+repage")
        .arg("-quality")
        .arg(quality.to_string())
        .arg(&pattern)
        .output()
        .with_context(|| format!("failed to spawn convert for {:?}", frame))?;
    if !out.status.success() {
        bail!(
            "convert failed for {:?}: {}",
            frame,
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }

    for quadrant in 0..4 {
        let path = quadrant_path(scratch, frame_number, quadrant);
        if !path.is_file() {
            bail!("convert did not produce quadrant {:?}", path);
        }
    }
    Ok(())
}

/// Produces a 160x160 letterboxed JPEG thumbnail from a source frame.
pub fn make_thumbnail(src: &Path, dest: &Path) -> Result<()> {
    let out = Command::new("convert")
        .arg(src)
        .arg("-resize")
        .arg("160x160")
        .arg("-background")
        .arg("black")
        .arg("-gravity")
        .arg("center")
        .arg("-extent")
        .arg("160x160")
        .arg(dest)
        .output()
        .with_context(|| format!("failed to spawn convert for {:?}", src))?;
    if !out.status.success() {
        bail!(
            "convert failed for {:?}: {}",
            src,
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    Ok(())
}

pub fn clear_scratch(scratch: &Path) -> Result<()> {
    std::fs::create_dir_all(scratch)
        .with_context(|| format!("failed to create scratch dir {:?}", scratch))?;
    for entry in std::fs::read_dir(scratch)? {
        let path = entry?.path();
        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to clear scratch file {:?}", path))?;
        }
    }
    Ok(())
}
