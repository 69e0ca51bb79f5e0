//! Common test utilities for integration tests.

use std::process::{Command, Output};

use smallbasic::runtime::HeadlessProbes;
use smallbasic::{Runtime, RuntimeConfig, RuntimeResult, Value, builtins};

/// A runtime with in-memory backends and fast timings
#[allow(dead_code)]
pub fn runtime() -> (Runtime, HeadlessProbes) {
    let config = RuntimeConfig {
        system_sound_wait_ms: 0,
        sleep_poll_ms: 5,
        timer_interval_ms: 10,
        args: vec!["smallbasic".to_string()],
        ..Default::default()
    };
    Runtime::headless(config).expect("Failed to create headless runtime")
}

/// Call a builtin with arguments written as literals
#[allow(dead_code)]
pub fn call(rt: &Runtime, name: &str, args: &[&str]) -> RuntimeResult<Value> {
    let args: Vec<Value> = args.iter().map(|arg| Value::parse_literal(arg)).collect();
    builtins::call(rt, name, &args)
}

/// Run the `smallbasic` binary with the given arguments and logging off
#[allow(dead_code)]
pub fn run_cli(args: &[&str]) -> Output {
    run_cli_logged(args, "off")
}

/// Run the `smallbasic` binary with `SMALLBASIC_LOG` set to `filter`
#[allow(dead_code)]
pub fn run_cli_logged(args: &[&str], filter: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_smallbasic"))
        .args(args)
        .env("SMALLBASIC_LOG", filter)
        .output()
        .expect("Failed to execute smallbasic")
}
