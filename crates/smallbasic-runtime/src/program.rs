//! The `Program` class.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::text_window::TextWindow;

pub struct Program {
    args: Vec<String>,
    sleep_poll: Duration,
    text_window: Arc<TextWindow>,
}

impl Program {
    pub fn new(config: &RuntimeConfig, text_window: Arc<TextWindow>) -> Self {
        Self {
            args: config.args.clone(),
            sleep_poll: Duration::from_millis(config.sleep_poll_ms.max(1)),
            text_window,
        }
    }

    /// Number of arguments, not counting the program itself
    pub fn argument_count(&self) -> usize {
        self.args.len().saturating_sub(1)
    }

    /// Argument at `index`, where index 0 is the program itself
    pub fn get_argument(&self, index: i64) -> RuntimeResult<String> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.args.get(i))
            .cloned()
            .ok_or_else(|| {
                RuntimeError::invalid_argument(format!(
                    "argument index {index} is outside 0..{}",
                    self.args.len()
                ))
            })
    }

    /// Directory containing the running executable
    pub fn directory(&self) -> RuntimeResult<PathBuf> {
        let exe = std::env::current_exe()?;
        Ok(exe
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Blocks for `milliseconds`; nothing can cut it short
    pub fn delay(&self, milliseconds: u64) {
        std::thread::sleep(Duration::from_millis(milliseconds));
    }

    /// Sleeps up to `seconds`, returning early on a key press.
    ///
    /// The key is consumed. Returns whether a key interrupted the sleep.
    /// A duration too long to represent waits for a key press alone.
    pub fn sleep(&self, seconds: f64) -> RuntimeResult<bool> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(RuntimeError::invalid_argument(format!(
                "cannot sleep for {seconds} seconds"
            )));
        }
        let deadline = Duration::try_from_secs_f64(seconds)
            .ok()
            .and_then(|d| Instant::now().checked_add(d));
        loop {
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    self.sleep_poll.min(deadline - now)
                }
                None => self.sleep_poll,
            };
            if let Some(key) = self.text_window.poll_key(slice)? {
                tracing::debug!(?key, "Sleep interrupted by key press");
                return Ok(true);
            }
        }
    }

    /// Terminates the process
    pub fn end(&self) -> ! {
        tracing::info!("Program ended");
        std::process::exit(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_window::ScriptedConsole;

    fn program(args: &[&str]) -> (Program, crate::text_window::ConsoleProbe) {
        let (console, probe) = ScriptedConsole::new();
        let config = RuntimeConfig {
            args: args.iter().map(|s| s.to_string()).collect(),
            sleep_poll_ms: 10,
            ..Default::default()
        };
        (
            Program::new(&config, Arc::new(TextWindow::new(Box::new(console)))),
            probe,
        )
    }

    #[test]
    fn test_arguments() {
        let (program, _) = program(&["game.exe", "--level", "3"]);
        assert_eq!(program.argument_count(), 2);
        assert_eq!(program.get_argument(0).unwrap(), "game.exe");
        assert_eq!(program.get_argument(2).unwrap(), "3");
        assert!(program.get_argument(3).unwrap_err().is_invalid_argument());
        assert!(program.get_argument(-1).is_err());
    }

    #[test]
    fn test_no_arguments() {
        let (program, _) = program(&[]);
        assert_eq!(program.argument_count(), 0);
    }

    #[test]
    fn test_sleep_interrupted_by_key() {
        let (program, probe) = program(&["p"]);
        probe.push_key(' ');
        let started = Instant::now();
        assert!(program.sleep(5.0).unwrap());
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(probe.pending_keys(), 0);
    }

    #[test]
    fn test_sleep_runs_out() {
        let (program, _) = program(&["p"]);
        let started = Instant::now();
        assert!(!program.sleep(0.05).unwrap());
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(program.sleep(-1.0).is_err());
    }

    #[test]
    fn test_very_long_sleep_waits_for_key() {
        let (program, probe) = program(&["p"]);
        probe.push_key('q');
        assert!(program.sleep(1e20).unwrap());
        probe.push_key('q');
        assert!(program.sleep(f64::MAX).unwrap());
    }

    #[test]
    fn test_directory_exists() {
        let (program, _) = program(&["p"]);
        assert!(program.directory().unwrap().is_dir());
    }
}
