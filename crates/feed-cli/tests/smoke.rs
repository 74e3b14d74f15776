use serde_json::Value;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const ACTIVITY: &str = r#"{
    "id": "a-1",
    "actor": "user:alice",
    "verb": "post",
    "object": "picture:1",
    "time": "2019-02-12T10:49:53.123456",
    "own_reactions": {"like": [{"id": "r-1", "kind": "like"}]},
    "latest_reactions": {"like": [{"id": "r-9", "kind": "like"}, {"id": "r-1", "kind": "like"}]},
    "reaction_counts": {"like": 2}
}"#;

fn write_payload(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("payload file write should succeed");
    path.to_str().expect("payload path should be utf8").to_string()
}

fn run_cli(args: &[&str], cwd: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_feed-cli"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("cli process should start")
}

fn stdout_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout should be utf8");
    serde_json::from_str(&stdout).expect("json output should parse")
}

#[test]
fn decode_envelope_expected_sentinel_cursor_dropped() {
    let temp = TempDir::new().expect("tempdir should create");
    let file = write_payload(
        temp.path(),
        "page.json",
        &format!(r#"{{"results":[{ACTIVITY}],"next":"","duration":"2ms"}}"#),
    );

    let output = run_cli(&["decode", "--file", &file, "--envelope"], temp.path());
    let value = stdout_json(&output);

    assert_eq!(value["next"], Value::Null);
    assert_eq!(value["results"][0]["id"], "a-1");
    assert_eq!(value["results"][0]["reaction_counts"]["like"], 2);
}

#[test]
fn decode_single_activity_expected_summary() {
    let temp = TempDir::new().expect("tempdir should create");
    let file = write_payload(temp.path(), "activity.json", ACTIVITY);

    let output = run_cli(&["decode", "--file", &file], temp.path());
    let value = stdout_json(&output);

    assert_eq!(value["verb"], "post");
    assert_eq!(value["reaction_counts"]["like"], 2);
}

#[test]
fn react_add_then_delete_expected_views_updated() {
    let temp = TempDir::new().expect("tempdir should create");
    let file = write_payload(temp.path(), "activity.json", ACTIVITY);

    let output = run_cli(
        &[
            "react",
            "--file",
            &file,
            "--add",
            "comment:c-1",
            "--delete",
            "like:r-1",
            "--delete",
            "like:missing",
        ],
        temp.path(),
    );
    let value = stdout_json(&output);

    assert_eq!(value["reaction_counts"]["like"], 1);
    assert_eq!(value["reaction_counts"]["comment"], 1);
    assert_eq!(value["own_reactions"]["like"], Value::Array(Vec::new()));
    assert_eq!(value["latest_reactions"]["like"][0]["id"], "r-9");
    assert_eq!(value["own_reactions"]["comment"][0]["id"], "c-1");
}

#[test]
fn decode_malformed_payload_expected_error_exit() {
    let temp = TempDir::new().expect("tempdir should create");
    let file = write_payload(temp.path(), "broken.json", r#"{"results": 5}"#);

    let output = run_cli(&["decode", "--file", &file, "--envelope"], temp.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: response decode failed"), "stderr:\n{stderr}");
}

#[test]
fn fetch_unreachable_host_expected_transport_error() {
    let temp = TempDir::new().expect("tempdir should create");

    let output = run_cli(
        &["fetch", "--path", "/feed/user/alice/", "--base-url", "http://127.0.0.1:1"],
        temp.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: transport failure"), "stderr:\n{stderr}");
}
