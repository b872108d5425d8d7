use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn convert_available() -> bool {
    std::process::Command::new("convert")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn combined_output(output: &std::process::Output) -> String {
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn synth_frame(path: &Path) {
    let status = std::process::Command::new("convert")
        .arg("-size")
        .arg("160x120")
        .arg("xc:gray")
        .arg(path)
        .status()
        .expect("convert runs");
    assert!(status.success(), "failed to synthesize {}", path.display());
}

/// Lays out frames/, vid/, mp3/, jpg/ under the root and runs a real encode
/// so that the stream file and the residual scratch quadrants exist.
fn encoded_layout(root: &Path, title: &str) {
    let frames = root.join("frames");
    fs::create_dir_all(&frames).expect("create frames dir");
    fs::create_dir_all(root.join("vid")).expect("create vid dir");
    fs::create_dir_all(root.join("mp3")).expect("create mp3 dir");
    fs::create_dir_all(root.join("jpg")).expect("create jpg dir");

    for i in 0..8 {
        synth_frame(&frames.join(format!("frame{}.jpg", i)));
    }

    let output = Command::new(assert_cmd::cargo::cargo_bin!("gridvid"))
        .arg("encode")
        .arg(&frames)
        .arg(root.join(format!("vid/{}.dat", title)))
        .arg("--scratch")
        .arg(root.join("tmp"))
        .output()
        .expect("encode runs");
    assert!(output.status.success(), "{}", combined_output(&output));

    fs::write(root.join(format!("mp3/{}.mp3", title)), vec![0u8; 2048]).expect("write audio file");
}

fn publish(root: &Path, title: &str, fps: &str) -> std::process::Output {
    Command::new(assert_cmd::cargo::cargo_bin!("gridvid"))
        .arg("publish")
        .arg(title)
        .arg(fps)
        .arg("--root")
        .arg(root)
        .env("BASE_URL", "http://sd.example")
        .output()
        .expect("publish executes")
}

#[test]
fn publish_requires_title_and_fps() {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("gridvid"))
        .arg("publish")
        .output()
        .expect("publish executes");

    assert!(!output.status.success(), "publish unexpectedly succeeded");
    let text = combined_output(&output);
    assert!(
        text.contains("<TITLE>") && text.contains("<FPS>"),
        "usage should name both positionals: {text}"
    );
}

#[test]
fn publish_rejects_out_of_range_fps() {
    let tmp = TempDir::new().expect("tempdir");
    for fps in ["0", "101"] {
        let output = publish(tmp.path(), "demo", fps);
        assert!(!output.status.success(), "fps {fps} unexpectedly accepted");
        let text = combined_output(&output);
        assert!(
            text.contains(&format!("Unrealistic fps {fps}")),
            "missing fps error for {fps}: {text}"
        );
    }
}

#[test]
fn publish_rejects_a_title_with_no_usable_characters() {
    let tmp = TempDir::new().expect("tempdir");
    let output = publish(tmp.path(), "!!! ???", "12");

    assert!(!output.status.success(), "title unexpectedly accepted");
    let text = combined_output(&output);
    assert!(
        text.contains("no usable characters"),
        "missing title error: {text}"
    );
}

#[test]
fn publish_builds_a_profile_and_merges_the_playlist() {
    if !convert_available() {
        return;
    }

    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    encoded_layout(root, "demo");

    let output = publish(root, "demo", "12");
    assert!(output.status.success(), "{}", combined_output(&output));
    let text = combined_output(&output);
    assert!(
        text.contains("\"profileName\":\"Demo\""),
        "missing profile preview: {text}"
    );
    assert!(text.contains("Playlist saved:"), "missing save line: {text}");

    let raw = fs::read_to_string(root.join("playlist.json")).expect("read playlist");
    let playlist: serde_json::Value = serde_json::from_str(&raw).expect("parse playlist");
    assert_eq!(playlist["base_url"], "http://sd.example");
    assert_eq!(playlist["playlist_count"], 1);

    let entry = &playlist["playlist"]["0"];
    assert_eq!(entry["profileName"], "Demo");
    assert_eq!(entry["videoFileName"], "/vid/demo.dat");
    assert_eq!(entry["audioFileName"], "/mp3/demo.mp3");
    assert_eq!(entry["thumbFileName"], "/jpg/demo.jpg");
    assert_eq!(entry["audioSource"], "0");
    assert_eq!(entry["framespeed"], "12");
    assert_eq!(entry["totalframes"], "8");
    assert_eq!(entry["width"], "80");
    assert_eq!(entry["height"], "60");
    assert_eq!(
        entry["audioFileSize"], "2048",
        "audio size must come from the audio file"
    );

    let thumb = root.join("jpg/demo.jpg");
    assert!(thumb.is_file(), "thumbnail must exist after publish");
    assert_eq!(
        entry["thumbFileSize"],
        fs::metadata(&thumb).unwrap().len().to_string(),
        "thumb size must come from the thumbnail file"
    );
    assert!(
        !raw.contains("\\/"),
        "forward slashes must stay unescaped: {raw}"
    );
}

#[test]
fn republishing_the_same_title_keeps_one_entry() {
    if !convert_available() {
        return;
    }

    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    encoded_layout(root, "demo");

    let first = publish(root, "demo", "12");
    assert!(first.status.success(), "{}", combined_output(&first));
    let second = publish(root, "demo", "24");
    assert!(second.status.success(), "{}", combined_output(&second));

    let raw = fs::read_to_string(root.join("playlist.json")).expect("read playlist");
    let playlist: serde_json::Value = serde_json::from_str(&raw).expect("parse playlist");
    assert_eq!(playlist["playlist_count"], 1, "republish must not add entries");
    assert_eq!(
        playlist["playlist"]["0"]["framespeed"], "24",
        "republish must overwrite the entry in place"
    );
    assert!(playlist["playlist"]["1"].is_null());
}

#[test]
fn publishing_a_second_title_appends_at_the_next_index() {
    if !convert_available() {
        return;
    }

    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    encoded_layout(root, "demo");

    let first = publish(root, "demo", "12");
    assert!(first.status.success(), "{}", combined_output(&first));

    // Second video's artifacts: publish only checks presence and size.
    fs::copy(root.join("vid/demo.dat"), root.join("vid/OtherClip.dat")).expect("copy stream");
    fs::write(root.join("mp3/OtherClip.mp3"), vec![0u8; 512]).expect("write audio file");

    let second = publish(root, "Other Clip!", "30");
    assert!(second.status.success(), "{}", combined_output(&second));

    let raw = fs::read_to_string(root.join("playlist.json")).expect("read playlist");
    let playlist: serde_json::Value = serde_json::from_str(&raw).expect("parse playlist");
    assert_eq!(playlist["playlist_count"], 2);
    assert_eq!(playlist["playlist"]["0"]["profileName"], "Demo");
    assert_eq!(playlist["playlist"]["1"]["profileName"], "OtherClip");
    assert_eq!(playlist["playlist"]["1"]["videoFileName"], "/vid/OtherClip.dat");
}

#[test]
fn publish_fails_when_the_video_stream_is_missing() {
    if !convert_available() {
        return;
    }

    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    encoded_layout(root, "demo");
    fs::remove_file(root.join("vid/demo.dat")).expect("remove stream");

    let output = publish(root, "demo", "12");
    assert!(!output.status.success(), "publish unexpectedly succeeded");
    let text = combined_output(&output);
    assert!(text.contains("missing file"), "missing error context: {text}");
    assert!(text.contains("demo.dat"), "missing path context: {text}");
}

#[test]
fn publish_fails_on_a_wrong_residual_quadrant_count() {
    if !convert_available() {
        return;
    }

    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    encoded_layout(root, "demo");
    let leftover = fs::read_dir(root.join("tmp"))
        .expect("read scratch")
        .next()
        .expect("scratch entry")
        .expect("scratch entry")
        .path();
    fs::remove_file(leftover).expect("remove one quadrant");

    let output = publish(root, "demo", "12");
    assert!(!output.status.success(), "publish unexpectedly succeeded");
    let text = combined_output(&output);
    assert!(
        text.contains("expected 4 leftover quadrant files"),
        "missing quadrant count error: {text}"
    );
}
