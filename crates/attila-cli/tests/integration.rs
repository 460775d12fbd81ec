//! Integration tests for the `attila` binary.

use attila_io::read_wav;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn attila_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_attila"))
}

fn generate_sine(path: &Path, extra: &[&str]) {
    let output = attila_bin()
        .args(["generate", "sine"])
        .arg(path)
        .args(["--freq", "1000", "--level-db", "-6", "--duration", "0.1"])
        .args(extra)
        .output()
        .expect("failed to run attila generate");
    assert!(
        output.status.success(),
        "generate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn params_lists_every_id() {
    let output = attila_bin().arg("params").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in [
        "inputGain1",
        "drive2",
        "knee3",
        "bit1",
        "bypass2",
        "mix",
        "lowMidCut",
        "midHighCut",
        "curve3",
    ] {
        assert!(stdout.contains(id), "listing should contain '{id}'");
    }
}

#[test]
fn params_json_is_parseable() {
    let output = attila_bin().args(["params", "--json"]).output().unwrap();
    assert!(output.status.success());
    let list: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let mix = list.iter().find(|p| p["id"] == "mix").unwrap();
    assert_eq!(mix["default"], 100.0);
    let curve = list.iter().find(|p| p["id"] == "curve1").unwrap();
    assert_eq!(curve["labels"][0], "Soft");
    for id in ["lowMidCut", "midHighCut"] {
        let cut = list.iter().find(|p| p["id"] == id).unwrap();
        assert_eq!(cut["scale"], "power");
        let pos = cut["default_normalized"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&pos));
    }
}

#[test]
fn generate_writes_requested_signal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sine.wav");
    generate_sine(&path, &["--sample-rate", "44100", "--channels", "2"]);

    let (buffer, spec) = read_wav(&path).unwrap();
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(buffer.num_channels(), 2);
    assert_eq!(buffer.num_frames(), 4410);
    assert!((buffer.peak() - 0.501).abs() < 1e-2);
}

#[test]
fn process_renders_with_overrides() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    generate_sine(&input, &[]);

    let result = attila_bin()
        .arg("process")
        .arg(&input)
        .arg(&output)
        .args(["--param", "drive1=24", "--param", "drive2=24", "--param", "curve2=hard"])
        .args(["--oversample", "2", "--block-size", "128", "--bit-depth", "24"])
        .output()
        .unwrap();
    assert!(
        result.status.success(),
        "process failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let (dry, _) = read_wav(&input).unwrap();
    let (wet, spec) = read_wav(&output).unwrap();
    assert_eq!(spec.bits_per_sample, 24);
    assert_eq!(wet.num_frames(), dry.num_frames());
    assert!(wet.peak() <= 1.0);
    assert!(wet.rms() > dry.rms(), "drive should raise the RMS level");
}

#[test]
fn process_with_config_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    let config = dir.path().join("render.toml");
    generate_sine(&input, &[]);
    std::fs::write(
        &config,
        "[engine]\noversample_factor = 1\n\n[params]\nbypass = true\n",
    )
    .unwrap();

    let result = attila_bin()
        .arg("process")
        .arg(&input)
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(result.status.success());

    let (dry, _) = read_wav(&input).unwrap();
    let (wet, _) = read_wav(&output).unwrap();
    assert_eq!(wet, dry);
}

#[test]
fn process_rejects_bad_parameters() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    generate_sine(&input, &[]);

    for param in ["volume=3", "knee1=100", "bit2=8.5"] {
        let result = attila_bin()
            .arg("process")
            .arg(&input)
            .arg(dir.path().join("out.wav"))
            .args(["--param", param])
            .output()
            .unwrap();
        assert!(!result.status.success(), "'{param}' should be rejected");
    }
}

#[test]
fn process_clamp_accepts_out_of_range() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    generate_sine(&input, &[]);

    let result = attila_bin()
        .arg("process")
        .arg(&input)
        .arg(&output)
        .args(["--param", "knee1=100", "--clamp"])
        .output()
        .unwrap();
    assert!(result.status.success());
    assert!(output.exists());
}

#[test]
fn process_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let result = attila_bin()
        .arg("process")
        .arg(dir.path().join("missing.wav"))
        .arg(dir.path().join("out.wav"))
        .output()
        .unwrap();
    assert!(!result.status.success());
}
