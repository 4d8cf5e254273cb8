use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_emotion-diag"))
}

fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("emotion-diag-{}-{}", tag, std::process::id()))
}

#[test]
fn synthetic_analyze_outputs_json() {
    let output = cli()
        .args([
            "analyze",
            "--synthetic",
            "harmonic",
            "--duration-ms",
            "400",
            "--format",
            "json",
        ])
        .output()
        .expect("analyze command");

    assert!(
        output.status.success(),
        "analyze exited with {:?}",
        output.status.code()
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    let json: Value = serde_json::from_str(&stdout).expect("session report JSON");
    assert_eq!(json["source"], "synthetic-harmonic");
    assert!(json["frames"].as_u64().unwrap_or_default() >= 1);
    assert!(json["dominant_category"].is_string());
}

#[test]
fn silence_is_all_neutral() {
    let output = cli()
        .args([
            "analyze",
            "--synthetic",
            "silence",
            "--duration-ms",
            "200",
            "--format",
            "json",
        ])
        .output()
        .expect("analyze command");

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("session report JSON");
    assert_eq!(json["frames"], json["neutral_frames"]);
    assert!(json.get("dominant_category").is_none());
}

#[test]
fn states_out_and_store_dir_persist() {
    let states_path = temp_path("states.json");
    let store_dir = temp_path("models");
    let _ = std::fs::remove_dir_all(&store_dir);

    let output = cli()
        .args([
            "analyze",
            "--synthetic",
            "bursts",
            "--duration-ms",
            "500",
            "--hop",
            "1024",
            "--user",
            "tester",
            "--store-dir",
            store_dir.to_str().unwrap(),
            "--states-out",
            states_path.to_str().unwrap(),
        ])
        .output()
        .expect("analyze command");
    assert!(
        output.status.success(),
        "analyze exited with {:?}",
        output.status.code()
    );

    let data = std::fs::read_to_string(&states_path).expect("states written to disk");
    let json: Value = serde_json::from_str(&data).expect("valid JSON payload");
    let count = json["state_count"].as_u64().unwrap_or_default();
    assert!(count >= 1);
    assert_eq!(json["states"].as_array().map(Vec::len), Some(count as usize));
    assert!(json["states"][0]["primaryCategory"].is_string());

    let model = cli()
        .args([
            "model",
            "--store-dir",
            store_dir.to_str().unwrap(),
            "--user",
            "tester",
            "--format",
            "json",
        ])
        .output()
        .expect("model command");
    assert!(model.status.success());
    let summary: Value = serde_json::from_slice(&model.stdout).expect("model report JSON");
    assert_eq!(summary["user"], "tester");
    assert!(summary["observations"].as_u64().unwrap_or_default() >= 1);

    let _ = std::fs::remove_file(&states_path);
    let _ = std::fs::remove_dir_all(&store_dir);
}

#[test]
fn builtin_taxonomy_round_trips() {
    let output = cli().arg("taxonomy").output().expect("taxonomy command");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("taxonomy JSON");
    let categories = json["categories"].as_array().expect("categories array");
    assert_eq!(categories.len(), 16);
}

#[test]
fn invalid_taxonomy_fails() {
    let path = temp_path("bad-taxonomy.json");
    std::fs::write(&path, r#"{"categories": []}"#).unwrap();

    let output = cli()
        .args(["taxonomy", "--file", path.to_str().unwrap()])
        .output()
        .expect("taxonomy command");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("emotion-diag error"), "{stderr}");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn requires_exactly_one_source() {
    let output = cli().arg("analyze").output().expect("analyze command");
    assert!(!output.status.success());
}
