mod common;

use common::{run_cli, run_cli_logged};

#[test]
fn test_call_prints_result() {
    let output = run_cli(&["call", "Math.Power", "2", "10"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1024");

    let output = run_cli(&["call", "Math.Abs", "-3.5"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3.5");
}

#[test]
fn test_call_failure_exits_with_error() {
    let output = run_cli(&["call", "Stack.PopValue", "nothing"]);
    assert_eq!(output.status.code(), Some(1));
    insta::assert_snapshot!(
        String::from_utf8_lossy(&output.stderr).trim(),
        @"Stack.PopValue: Stack with name nothing not found"
    );

    let output = run_cli(&["call", "Math.Abs"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("expects 1 arguments, got 0"));
}

#[test]
fn test_failed_builtin_is_logged_as_warning() {
    let output = run_cli_logged(&["call", "Stack.PopValue", "nothing"], "warn");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WARN"));
    assert!(stderr.contains("Builtin failed"));
    assert!(stderr.contains("Stack.PopValue"));
}

#[test]
fn test_list_contains_every_operation() {
    let output = run_cli(&["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names.len(), smallbasic::builtins::BUILTINS.len());
    assert!(names.contains(&"Text.GetIndexOf"));
    assert!(names.is_sorted());
}

#[test]
fn test_info_reflects_flags() {
    let output = run_cli(&["--width", "320", "--title", "Tiny", "info", "--json"]);
    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["window_width"], 320);
    assert_eq!(config["window_title"], "Tiny");
}
