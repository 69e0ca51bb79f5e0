//! Command-line interface for the Small Basic runtime.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use smallbasic::{RuntimeConfig, RuntimeResult};

#[derive(Parser)]
#[command(name = "smallbasic")]
#[command(about = "Small Basic runtime library", long_about = None)]
pub struct Cli {
    /// JSON configuration file; environment variables and flags override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Graphics window width in pixels
    #[arg(long, global = true)]
    pub width: Option<u32>,

    /// Graphics window height in pixels
    #[arg(long, global = true)]
    pub height: Option<u32>,

    /// Graphics window title
    #[arg(long, global = true)]
    pub title: Option<String>,

    /// Timeout for network requests in milliseconds
    #[arg(long, global = true)]
    pub http_timeout_ms: Option<u64>,

    /// Argument visible to `Program.GetArgument`; may be repeated
    #[arg(long = "arg", global = true)]
    pub program_args: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the name of every callable operation
    #[command(alias = "ls")]
    List,
    /// Call one operation and print its result
    Call {
        /// Operation name such as `Math.Power`
        operation: String,
        /// Arguments; `true`/`false` and numbers are parsed, anything else is text
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
    },
    /// Print the effective configuration
    Info {
        /// Print JSON instead of `key = value` lines
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Defaults, then the config file, then the environment, then flags
    pub fn runtime_config(&self) -> RuntimeResult<RuntimeConfig> {
        self.runtime_config_with(|key| std::env::var(key).ok())
    }

    pub fn runtime_config_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> RuntimeResult<RuntimeConfig> {
        let mut config = match &self.config {
            Some(path) => RuntimeConfig::from_json_file(path)?,
            None => RuntimeConfig::default(),
        };
        config.apply_env(lookup)?;
        if let Some(width) = self.width {
            config.window_width = width;
        }
        if let Some(height) = self.height {
            config.window_height = height;
        }
        if let Some(title) = &self.title {
            config.window_title = title.clone();
        }
        if let Some(timeout) = self.http_timeout_ms {
            config.http_timeout_ms = timeout;
        }
        config.args = std::iter::once("smallbasic".to_string())
            .chain(self.program_args.iter().cloned())
            .collect();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("smallbasic").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = parse(&["--width", "320", "--arg", "one", "call", "Math.Abs", "-3"]);
        let config = cli
            .runtime_config_with(|key| match key {
                "SMALLBASIC_WINDOW_WIDTH" => Some("1024".to_string()),
                "SMALLBASIC_WINDOW_HEIGHT" => Some("768".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.window_width, 320);
        assert_eq!(config.window_height, 768);
        assert_eq!(config.args, ["smallbasic", "one"]);
        assert!(matches!(cli.command, Command::Call { ref operation, .. } if operation == "Math.Abs"));
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "window_title": "From file", "pen_width": 3.0 }"#).unwrap();
        let cli = parse(&["--config", path.to_str().unwrap(), "info"]);
        let config = cli.runtime_config_with(|_| None).unwrap();
        assert_eq!(config.window_title, "From file");
        assert_eq!(config.pen_width, 3.0);
        assert_eq!(config.window_width, 800);
    }

    #[test]
    fn test_malformed_environment() {
        let cli = parse(&["list"]);
        let err = cli
            .runtime_config_with(|key| (key == "SMALLBASIC_WINDOW_WIDTH").then(|| "wide".to_string()))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
