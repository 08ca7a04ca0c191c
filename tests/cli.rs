//! The `raga` binary: argument errors, prediction output and CSV dump.

use ndarray::Array2;
use raga::{RAGA_CLASSES, io};
use std::path::PathBuf;
use std::process::Command;

fn raga() -> Command {
    Command::new(env!("CARGO_BIN_EXE_raga"))
}

fn temp_path(name: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("raga_cli_{}_{}.{}", name, std::process::id(), ext))
}

fn write_tone(name: &str) -> PathBuf {
    let path = temp_path(name, "wav");
    let y = io::tone(261.63, 22050, 1.0);
    let frames = y.len();
    io::save_wav(&path, &Array2::from_shape_vec((1, frames), y).unwrap(), 22050).unwrap();
    path
}

#[test]
fn usage_errors_exit_with_one() {
    let status = raga().status().unwrap();
    assert_eq!(status.code(), Some(1));

    let status = raga().args(["a.wav", "b.wav"]).status().unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn help_and_version_exit_cleanly() {
    let out = raga().arg("--help").output().unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Usage"));

    let out = raga().arg("--version").output().unwrap();
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn missing_input_reports_error_text() {
    let out = raga()
        .arg(temp_path("missing", "m4a"))
        .env("RUST_LOG", "error")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(!stderr.contains("Symphonia("), "debug output: {stderr}");
}

#[test]
fn prints_prediction_and_dumps_features() {
    let wav = write_tone("predict");
    let csv = temp_path("dump", "csv");
    let out = raga()
        .arg(&wav)
        .args(["--frames", "16", "--seed", "5", "--tuning", "0"])
        .arg("--dump")
        .arg(&csv)
        .output()
        .unwrap();
    let dump = std::fs::read_to_string(&csv);
    std::fs::remove_file(&wav).ok();
    std::fs::remove_file(&csv).ok();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let label = stdout
        .lines()
        .find_map(|l| l.strip_prefix("Predicted raga: "))
        .unwrap();
    assert!(RAGA_CLASSES.contains(&label));

    let dump = dump.unwrap();
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 1 + 16);
    assert!(lines[0].starts_with("chroma_0,"));
    assert!(lines[0].ends_with(",delta_12"));
    for line in &lines {
        assert_eq!(line.split(',').count(), 38);
    }
    for line in &lines[1..] {
        assert!(line.split(',').all(|v| v.parse::<f32>().is_ok()));
    }
}
