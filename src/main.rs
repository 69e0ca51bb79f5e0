//! Small Basic runtime CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use smallbasic::{Host, Runtime, RuntimeConfig, Value, builtins};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match cli.runtime_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::List => {
            for name in builtins::names() {
                println!("{name}");
            }
        }
        Command::Call { operation, args } => call(config, &operation, &args),
        Command::Info { json } => info(&config, json),
    }
}

/// Logs go to stderr, filtered by `SMALLBASIC_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SMALLBASIC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn call(config: RuntimeConfig, operation: &str, args: &[String]) {
    let runtime = match Runtime::new(config, Host::terminal()) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        }
    };
    let args: Vec<Value> = args.iter().map(|arg| Value::parse_literal(arg)).collect();
    match builtins::call(&runtime, operation, &args) {
        Ok(value) => println!("{value}"),
        Err(e) => {
            eprintln!("{operation}: {e}");
            std::process::exit(1);
        }
    }
}

fn info(config: &RuntimeConfig, json: bool) {
    let text = config.to_json();
    if json {
        println!("{text}");
        return;
    }
    let fields: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&text).unwrap_or_default();
    for (key, value) in fields {
        match value {
            serde_json::Value::String(s) => println!("{key} = {s}"),
            other => println!("{key} = {other}"),
        }
    }
}
