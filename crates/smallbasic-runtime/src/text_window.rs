//! The `TextWindow` class and the consoles it can drive.
//!
//! [`TerminalConsole`] talks to the real terminal through crossterm.
//! [`ScriptedConsole`] feeds canned input and records output so scripts
//! using the text window can be exercised without a terminal.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::{cursor, style, terminal};

use crate::error::{RuntimeError, RuntimeResult};

pub const PAUSE_MESSAGE: &str = "Press any key to continue...";
pub const INVALID_NUMBER_MESSAGE: &str = "Invalid number, please try again.";

/// The sixteen console colours, numbered as the console numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleColor {
    Black = 0,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

impl ConsoleColor {
    pub const ALL: [ConsoleColor; 16] = [
        ConsoleColor::Black,
        ConsoleColor::DarkBlue,
        ConsoleColor::DarkGreen,
        ConsoleColor::DarkCyan,
        ConsoleColor::DarkRed,
        ConsoleColor::DarkMagenta,
        ConsoleColor::DarkYellow,
        ConsoleColor::Gray,
        ConsoleColor::DarkGray,
        ConsoleColor::Blue,
        ConsoleColor::Green,
        ConsoleColor::Cyan,
        ConsoleColor::Red,
        ConsoleColor::Magenta,
        ConsoleColor::Yellow,
        ConsoleColor::White,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConsoleColor::Black => "Black",
            ConsoleColor::DarkBlue => "DarkBlue",
            ConsoleColor::DarkGreen => "DarkGreen",
            ConsoleColor::DarkCyan => "DarkCyan",
            ConsoleColor::DarkRed => "DarkRed",
            ConsoleColor::DarkMagenta => "DarkMagenta",
            ConsoleColor::DarkYellow => "DarkYellow",
            ConsoleColor::Gray => "Gray",
            ConsoleColor::DarkGray => "DarkGray",
            ConsoleColor::Blue => "Blue",
            ConsoleColor::Green => "Green",
            ConsoleColor::Cyan => "Cyan",
            ConsoleColor::Red => "Red",
            ConsoleColor::Magenta => "Magenta",
            ConsoleColor::Yellow => "Yellow",
            ConsoleColor::White => "White",
        }
    }

    fn to_crossterm(self) -> style::Color {
        match self {
            ConsoleColor::Black => style::Color::Black,
            ConsoleColor::DarkBlue => style::Color::DarkBlue,
            ConsoleColor::DarkGreen => style::Color::DarkGreen,
            ConsoleColor::DarkCyan => style::Color::DarkCyan,
            ConsoleColor::DarkRed => style::Color::DarkRed,
            ConsoleColor::DarkMagenta => style::Color::DarkMagenta,
            ConsoleColor::DarkYellow => style::Color::DarkYellow,
            ConsoleColor::Gray => style::Color::Grey,
            ConsoleColor::DarkGray => style::Color::DarkGrey,
            ConsoleColor::Blue => style::Color::Blue,
            ConsoleColor::Green => style::Color::Green,
            ConsoleColor::Cyan => style::Color::Cyan,
            ConsoleColor::Red => style::Color::Red,
            ConsoleColor::Magenta => style::Color::Magenta,
            ConsoleColor::Yellow => style::Color::Yellow,
            ConsoleColor::White => style::Color::White,
        }
    }
}

impl fmt::Display for ConsoleColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConsoleColor {
    type Err = RuntimeError;

    /// Accepts a colour name (any case) or its number 0 to 15
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return ConsoleColor::ALL
                .get(n)
                .copied()
                .ok_or_else(|| RuntimeError::invalid_argument(format!("no console color {n}")));
        }
        ConsoleColor::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RuntimeError::invalid_argument(format!("'{s}' is not a console color")))
    }
}

/// The terminal a [`TextWindow`] writes to and reads from
pub trait Console: Send {
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// One line of input without its terminator, `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Block until a key is pressed
    fn read_key(&mut self) -> io::Result<Option<char>>;

    /// A key pressed within `timeout`, if any
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<char>>;

    fn clear(&mut self) -> io::Result<()>;
    fn set_colors(&mut self, foreground: ConsoleColor, background: ConsoleColor) -> io::Result<()>;
    fn cursor(&mut self) -> io::Result<(u16, u16)>;
    fn set_cursor(&mut self, left: u16, top: u16) -> io::Result<()>;
    fn set_title(&mut self, title: &str) -> io::Result<()>;
    fn set_visible(&mut self, visible: bool) -> io::Result<()>;
}

/// Console backed by the process's terminal
pub struct TerminalConsole {
    stdout: io::Stdout,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }

    fn key_event(timeout: Option<Duration>) -> io::Result<Option<char>> {
        terminal::enable_raw_mode()?;
        let result = (|| -> io::Result<Option<char>> {
            loop {
                if let Some(timeout) = timeout {
                    if !event::poll(timeout)? {
                        return Ok(None);
                    }
                }
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    return Ok(Some(match key.code {
                        KeyCode::Char(c) => c,
                        KeyCode::Enter => '\r',
                        KeyCode::Tab => '\t',
                        KeyCode::Esc => '\u{1b}',
                        KeyCode::Backspace => '\u{8}',
                        _ => '\0',
                    }));
                }
            }
        })();
        terminal::disable_raw_mode()?;
        result
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.stdout.write_all(text.as_bytes())?;
        self.stdout.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn read_key(&mut self) -> io::Result<Option<char>> {
        Self::key_event(None)
    }

    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<char>> {
        Self::key_event(Some(timeout))
    }

    fn clear(&mut self) -> io::Result<()> {
        crossterm::execute!(
            self.stdout,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        )
    }

    fn set_colors(&mut self, foreground: ConsoleColor, background: ConsoleColor) -> io::Result<()> {
        crossterm::execute!(
            self.stdout,
            style::SetForegroundColor(foreground.to_crossterm()),
            style::SetBackgroundColor(background.to_crossterm())
        )
    }

    fn cursor(&mut self) -> io::Result<(u16, u16)> {
        cursor::position()
    }

    fn set_cursor(&mut self, left: u16, top: u16) -> io::Result<()> {
        crossterm::execute!(self.stdout, cursor::MoveTo(left, top))
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        crossterm::execute!(self.stdout, terminal::SetTitle(title))
    }

    fn set_visible(&mut self, _visible: bool) -> io::Result<()> {
        // A terminal cannot hide itself; visibility is tracked by the caller.
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ScriptedState {
    input: VecDeque<String>,
    keys: VecDeque<char>,
    output: String,
    cursor: (u16, u16),
    colors: Option<(ConsoleColor, ConsoleColor)>,
    title: String,
    visible: bool,
    clears: usize,
}

/// In-memory console fed by a script of input lines and keys
pub struct ScriptedConsole {
    state: Arc<Mutex<ScriptedState>>,
}

/// Inspection side of a [`ScriptedConsole`]
#[derive(Clone)]
pub struct ConsoleProbe {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedConsole {
    pub fn new() -> (Self, ConsoleProbe) {
        let state = Arc::new(Mutex::new(ScriptedState {
            visible: true,
            ..Default::default()
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            ConsoleProbe { state },
        )
    }

    fn state(&self) -> io::Result<MutexGuard<'_, ScriptedState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("scripted console poisoned"))
    }
}

impl ConsoleProbe {
    fn state(&self) -> MutexGuard<'_, ScriptedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push_line(&self, line: impl Into<String>) {
        self.state().input.push_back(line.into());
    }

    pub fn push_key(&self, key: char) {
        self.state().keys.push_back(key);
    }

    pub fn output(&self) -> String {
        self.state().output.clone()
    }

    pub fn take_output(&self) -> String {
        std::mem::take(&mut self.state().output)
    }

    pub fn colors(&self) -> Option<(ConsoleColor, ConsoleColor)> {
        self.state().colors
    }

    pub fn title(&self) -> String {
        self.state().title.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state().visible
    }

    pub fn clears(&self) -> usize {
        self.state().clears
    }

    pub fn pending_keys(&self) -> usize {
        self.state().keys.len()
    }
}

/// Cursor positions stop at the largest terminal coordinate
fn clamp(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

impl Console for ScriptedConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut state = self.state()?;
        state.output.push_str(text);
        match text.rfind('\n') {
            Some(i) => {
                state.cursor.1 = state.cursor.1.saturating_add(clamp(text.matches('\n').count()));
                state.cursor.0 = clamp(text[i + 1..].chars().count());
            }
            None => state.cursor.0 = state.cursor.0.saturating_add(clamp(text.chars().count())),
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.state()?.input.pop_front())
    }

    fn read_key(&mut self) -> io::Result<Option<char>> {
        Ok(self.state()?.keys.pop_front())
    }

    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<char>> {
        if let Some(key) = self.state()?.keys.pop_front() {
            return Ok(Some(key));
        }
        std::thread::sleep(timeout);
        Ok(None)
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut state = self.state()?;
        state.clears += 1;
        state.cursor = (0, 0);
        Ok(())
    }

    fn set_colors(&mut self, foreground: ConsoleColor, background: ConsoleColor) -> io::Result<()> {
        self.state()?.colors = Some((foreground, background));
        Ok(())
    }

    fn cursor(&mut self) -> io::Result<(u16, u16)> {
        Ok(self.state()?.cursor)
    }

    fn set_cursor(&mut self, left: u16, top: u16) -> io::Result<()> {
        self.state()?.cursor = (left, top);
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.state()?.title = title.to_string();
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> io::Result<()> {
        self.state()?.visible = visible;
        Ok(())
    }
}

struct WindowState {
    console: Box<dyn Console>,
    foreground: ConsoleColor,
    background: ConsoleColor,
    title: String,
    visible: bool,
}

pub struct TextWindow {
    state: Mutex<WindowState>,
}

impl TextWindow {
    pub fn new(console: Box<dyn Console>) -> Self {
        Self {
            state: Mutex::new(WindowState {
                console,
                foreground: ConsoleColor::Gray,
                background: ConsoleColor::Black,
                title: String::new(),
                visible: true,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn foreground_color(&self) -> ConsoleColor {
        self.lock().foreground
    }

    pub fn set_foreground_color(&self, color: ConsoleColor) -> RuntimeResult<()> {
        let mut state = self.lock();
        state.foreground = color;
        let background = state.background;
        state.console.set_colors(color, background)?;
        Ok(())
    }

    pub fn background_color(&self) -> ConsoleColor {
        self.lock().background
    }

    pub fn set_background_color(&self, color: ConsoleColor) -> RuntimeResult<()> {
        let mut state = self.lock();
        state.background = color;
        let foreground = state.foreground;
        state.console.set_colors(foreground, color)?;
        Ok(())
    }

    pub fn cursor_left(&self) -> RuntimeResult<u16> {
        Ok(self.lock().console.cursor()?.0)
    }

    pub fn set_cursor_left(&self, left: u16) -> RuntimeResult<()> {
        let mut state = self.lock();
        let (_, top) = state.console.cursor()?;
        state.console.set_cursor(left, top)?;
        Ok(())
    }

    pub fn cursor_top(&self) -> RuntimeResult<u16> {
        Ok(self.lock().console.cursor()?.1)
    }

    pub fn set_cursor_top(&self, top: u16) -> RuntimeResult<()> {
        let mut state = self.lock();
        let (left, _) = state.console.cursor()?;
        state.console.set_cursor(left, top)?;
        Ok(())
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    pub fn set_title(&self, title: &str) -> RuntimeResult<()> {
        let mut state = self.lock();
        state.console.set_title(title)?;
        state.title = title.to_string();
        Ok(())
    }

    pub fn show(&self) -> RuntimeResult<()> {
        let mut state = self.lock();
        state.console.set_visible(true)?;
        state.visible = true;
        Ok(())
    }

    pub fn hide(&self) -> RuntimeResult<()> {
        let mut state = self.lock();
        state.console.set_visible(false)?;
        state.visible = false;
        Ok(())
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    pub fn clear(&self) -> RuntimeResult<()> {
        self.lock().console.clear()?;
        Ok(())
    }

    pub fn write(&self, text: &str) -> RuntimeResult<()> {
        self.lock().console.write(text)?;
        Ok(())
    }

    pub fn write_line(&self, text: &str) -> RuntimeResult<()> {
        let mut state = self.lock();
        state.console.write(text)?;
        state.console.write("\n")?;
        Ok(())
    }

    /// Shows the pause message and waits for a key
    pub fn pause(&self) -> RuntimeResult<()> {
        let mut state = self.lock();
        state.console.write(PAUSE_MESSAGE)?;
        state.console.write("\n")?;
        state.console.read_key()?;
        Ok(())
    }

    /// Pauses only while the window is visible; returns whether it paused
    pub fn pause_if_visible(&self) -> RuntimeResult<bool> {
        if !self.is_visible() {
            return Ok(false);
        }
        self.pause()?;
        Ok(true)
    }

    pub fn pause_without_message(&self) -> RuntimeResult<()> {
        self.lock().console.read_key()?;
        Ok(())
    }

    /// A line of input; empty at end of input
    pub fn read(&self) -> RuntimeResult<String> {
        Ok(self.lock().console.read_line()?.unwrap_or_default())
    }

    pub fn read_key(&self) -> RuntimeResult<String> {
        Ok(self
            .lock()
            .console
            .read_key()?
            .map(String::from)
            .unwrap_or_default())
    }

    /// Reads lines until one parses as a number
    pub fn read_number(&self) -> RuntimeResult<f64> {
        let mut state = self.lock();
        loop {
            let Some(line) = state.console.read_line()? else {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input ended before a number was read",
                )
                .into());
            };
            match line.trim().parse::<f64>() {
                Ok(n) => return Ok(n),
                Err(_) => {
                    state.console.write(INVALID_NUMBER_MESSAGE)?;
                    state.console.write("\n")?;
                }
            }
        }
    }

    /// A key pressed within `timeout`, consumed if present
    pub fn poll_key(&self, timeout: Duration) -> RuntimeResult<Option<char>> {
        Ok(self.lock().console.poll_key(timeout)?)
    }

    /// Whether the console can currently be used
    pub fn verify_access(&self) -> bool {
        self.state.try_lock().is_ok()
    }
}
