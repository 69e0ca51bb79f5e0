//! Runtime library of the Small Basic language.
//!
//! Every class of the standard library lives in its own module:
//! - Pure helpers: [`math`], [`text`], [`clock`], [`file`]
//! - Named stores: [`Stack`], [`Queue`], [`ImageList`]
//! - Windows: [`GraphicsWindow`], [`Shapes`], [`Controls`], [`TextWindow`]
//! - Host services: [`Sound`], [`Mouse`], [`Desktop`], [`Network`], [`Program`], [`Timer`]
//!
//! Stateful classes are owned by a [`Runtime`], so several independent
//! runtimes can live in one process. Anything that touches the host goes
//! through a backend trait ([`Surface`], [`Console`], [`Platform`],
//! [`AudioBackend`]) with an in-memory implementation for tests.

pub mod bitmap;
pub mod clock;
pub mod collections;
pub mod color;
pub mod config;
pub mod controls;
pub mod desktop;
pub mod error;
pub mod file;
pub mod graphics_window;
pub mod handle;
pub mod image_list;
pub mod math;
pub mod mouse;
pub mod network;
pub mod platform;
pub mod program;
pub mod shapes;
pub mod sound;
pub mod surface;
pub mod text;
pub mod text_window;
pub mod timer;
pub mod ui;
pub mod value;

use std::sync::Arc;

pub use bitmap::Bitmap;
pub use collections::{Queue, Stack};
pub use color::Color;
pub use config::RuntimeConfig;
pub use controls::Controls;
pub use desktop::Desktop;
pub use error::{ErrorKind, RuntimeError, RuntimeResult};
pub use graphics_window::{EventHandler, GraphicsWindow};
pub use handle::{Handle, HandleRegistry};
pub use image_list::ImageList;
pub use mouse::Mouse;
pub use network::Network;
pub use platform::{Platform, PlatformProbe, VirtualPlatform};
pub use program::Program;
pub use shapes::Shapes;
pub use sound::{AudioBackend, AudioProbe, RecordingAudio, Sound, TerminalBell};
pub use surface::{HeadlessSurface, Surface, SurfaceProbe};
pub use text_window::{Console, ConsoleProbe, ScriptedConsole, TerminalConsole, TextWindow};
pub use timer::{Timer, TimerState};
pub use ui::UiThread;
pub use value::Value;

/// Screen size reported by the in-memory platform
pub const VIRTUAL_SCREEN: (u32, u32) = (1920, 1080);

/// The backends a [`Runtime`] talks to the outside world through
pub struct Host {
    pub surface: Box<dyn Surface>,
    pub console: Box<dyn Console>,
    pub platform: Arc<dyn Platform>,
    pub audio: Box<dyn AudioBackend>,
}

impl Host {
    /// Host for running in a terminal: text goes to the real terminal,
    /// graphics are kept in memory.
    pub fn terminal() -> Self {
        let (surface, _) = HeadlessSurface::new();
        let (platform, _) = VirtualPlatform::new(VIRTUAL_SCREEN);
        Self {
            surface: Box::new(surface),
            console: Box::new(TerminalConsole::new()),
            platform: Arc::new(platform),
            audio: Box::new(TerminalBell),
        }
    }
}

/// Inspection handles for the backends of [`Runtime::headless`]
#[derive(Clone)]
pub struct HeadlessProbes {
    pub surface: SurfaceProbe,
    pub console: ConsoleProbe,
    pub platform: PlatformProbe,
    pub audio: AudioProbe,
}

/// One instance of every stateful class.
pub struct Runtime {
    pub config: RuntimeConfig,
    pub stack: Stack,
    pub queue: Queue,
    pub network: Arc<Network>,
    pub images: Arc<ImageList>,
    pub graphics_window: Arc<GraphicsWindow>,
    pub shapes: Shapes,
    pub controls: Controls,
    pub text_window: Arc<TextWindow>,
    pub program: Program,
    pub sound: Sound,
    pub mouse: Mouse,
    pub desktop: Desktop,
    pub timer: Arc<Timer>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig, host: Host) -> RuntimeResult<Self> {
        let network = Arc::new(Network::new(&config));
        let images = Arc::new(ImageList::new(Arc::clone(&network)));
        let ui = Arc::new(UiThread::spawn(host.surface)?);
        let graphics_window = Arc::new(GraphicsWindow::new(&config, ui, Arc::clone(&images))?);
        let text_window = Arc::new(TextWindow::new(host.console));
        let runtime = Self {
            stack: Stack::new(),
            queue: Queue::new(),
            shapes: Shapes::new(Arc::clone(&graphics_window), Arc::clone(&images)),
            controls: Controls::new(Arc::clone(&graphics_window)),
            program: Program::new(&config, Arc::clone(&text_window)),
            sound: Sound::new(&config, host.audio),
            mouse: Mouse::new(Arc::clone(&host.platform)),
            desktop: Desktop::new(host.platform),
            timer: Arc::new(Timer::new(&config)?),
            network,
            images,
            graphics_window,
            text_window,
            config,
        };
        tracing::debug!(title = %runtime.config.window_title, "Runtime created");
        Ok(runtime)
    }

    /// A runtime whose backends are all in memory
    pub fn headless(config: RuntimeConfig) -> RuntimeResult<(Self, HeadlessProbes)> {
        let (surface, surface_probe) = HeadlessSurface::new();
        let (console, console_probe) = ScriptedConsole::new();
        let (platform, platform_probe) = VirtualPlatform::new(VIRTUAL_SCREEN);
        let (audio, audio_probe) = RecordingAudio::new();
        let host = Host {
            surface: Box::new(surface),
            console: Box::new(console),
            platform: Arc::new(platform),
            audio: Box::new(audio),
        };
        let probes = HeadlessProbes {
            surface: surface_probe,
            console: console_probe,
            platform: platform_probe,
            audio: audio_probe,
        };
        Ok((Self::new(config, host)?, probes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_runtime_is_send_sync() {
        assert_send_sync::<Runtime>();
    }

    #[test]
    fn test_runtimes_are_independent() {
        let (first, _) = Runtime::headless(RuntimeConfig::default()).unwrap();
        let (second, _) = Runtime::headless(RuntimeConfig::default()).unwrap();
        first.stack.push("s", 1);
        assert_eq!(first.stack.count("s").unwrap(), 1);
        assert!(second.stack.count("s").unwrap_err().is_not_found());
    }
}
