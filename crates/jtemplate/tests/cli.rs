/*
 * cli.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests for the jtemplate binary.
 */

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn jtemplate(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jtemplate"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run jtemplate")
}

fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> String {
    let path = dir.join(name);
    fs::write(&path, value.to_string()).expect("Failed to write fixture");
    path.to_string_lossy().into_owned()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "jtemplate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_render_with_context_file() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let template = write_json(
        temp.path(),
        "template.json",
        json!({"msg": "Hi ${name}", "big": {"$if": "n > 5", "$then": true, "$else": false}}),
    );
    let context = write_json(temp.path(), "context.json", json!({"name": "Ada", "n": 9}));

    let output = jtemplate(&["render", &template, "--context", &context]);
    assert_eq!(stdout_json(&output), json!({"msg": "Hi Ada", "big": true}));
}

#[test]
fn test_render_with_overrides() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let template = write_json(
        temp.path(),
        "template.json",
        json!({"msg": "${user.name} x${count}", "second": {"$eval": "$xs(1)"}}),
    );

    let output = jtemplate(&[
        "render",
        &template,
        "--set",
        "user.name=Grace",
        "--set",
        "count=3",
        "-s",
        "xs=[4,5]",
        "--compact",
    ]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "{\"msg\":\"Grace x3\",\"second\":5}\n"
    );
}

#[test]
fn test_render_to_output_file() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let template = write_json(temp.path(), "template.json", json!(["${1 + 1}"]));
    let out_path = temp.path().join("out.json");

    let output = jtemplate(&["render", &template, "-o", &out_path.to_string_lossy()]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written, json!(["2"]));
}

#[test]
fn test_strict_flag_and_config_file() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let template = write_json(
        temp.path(),
        "template.json",
        json!({"$eval": "1", "$fromNow": "1d"}),
    );

    let lenient = jtemplate(&["render", &template]);
    assert_eq!(stdout_json(&lenient), json!(1));

    let strict = jtemplate(&["render", &template, "--strict"]);
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("Ambiguous directive"));

    let config = write_json(temp.path(), "options.json", json!({"strict-directives": true}));
    let configured = jtemplate(&["render", &template, "--config", &config]);
    assert!(!configured.status.success());
}

#[test]
fn test_max_depth_flag() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let template = write_json(temp.path(), "template.json", json!({"a": {"b": {"c": 1}}}));

    let output = jtemplate(&["render", &template, "--max-depth", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("maximum depth of 1"));
}

#[test]
fn test_render_errors_are_reported() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let template = write_json(
        temp.path(),
        "template.json",
        json!({"s": {"$switch": "'nope'", "yes": 1}}),
    );

    let output = jtemplate(&["render", &template]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing case"), "stderr: {stderr}");
}

#[test]
fn test_non_object_context_is_rejected() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let template = write_json(temp.path(), "template.json", json!({}));
    let context = write_json(temp.path(), "context.json", json!([1, 2]));

    let output = jtemplate(&["render", &template, "-c", &context]);
    assert!(!output.status.success());
}

#[test]
fn test_eval_command() {
    let output = jtemplate(&["eval", "$xs(0) * 2 + n", "--set", "xs=[10]", "--set", "n=1"]);
    assert_eq!(stdout_json(&output), json!(21));

    let output = jtemplate(&["eval", "missing"]);
    assert!(!output.status.success());
}

#[test]
fn test_from_now_command() {
    let output = jtemplate(&["from-now", "1 day"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stamp = stdout.trim();
    // 2025-01-02T03:04:05.000Z
    assert_eq!(stamp.len(), 24, "unexpected timestamp: {stamp}");
    assert!(stamp.ends_with('Z'));
    assert_eq!(&stamp[10..11], "T");
}
