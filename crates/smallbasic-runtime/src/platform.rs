//! Host OS services used by the `Mouse` and `Desktop` classes.

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseButtons {
    pub left: bool,
    pub right: bool,
}

pub trait Platform: Send + Sync {
    fn cursor_position(&self) -> (i32, i32);
    fn set_cursor_position(&self, x: i32, y: i32);
    fn set_cursor_visible(&self, visible: bool);
    fn buttons(&self) -> MouseButtons;

    /// Size of the primary screen in pixels
    fn screen_size(&self) -> (u32, u32);

    /// Sets the desktop wallpaper; fails with the OS error code
    fn set_wallpaper(&self, location: &str) -> Result<(), i32>;
}

#[derive(Debug)]
struct VirtualState {
    cursor: (i32, i32),
    cursor_visible: bool,
    buttons: MouseButtons,
    screen: (u32, u32),
    wallpaper: Option<String>,
    wallpaper_error: Option<i32>,
}

/// Platform simulated in memory
pub struct VirtualPlatform {
    state: Arc<Mutex<VirtualState>>,
}

/// Control side of a [`VirtualPlatform`]
#[derive(Clone)]
pub struct PlatformProbe {
    state: Arc<Mutex<VirtualState>>,
}

fn lock(state: &Mutex<VirtualState>) -> MutexGuard<'_, VirtualState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl VirtualPlatform {
    pub fn new(screen: (u32, u32)) -> (Self, PlatformProbe) {
        let state = Arc::new(Mutex::new(VirtualState {
            cursor: (0, 0),
            cursor_visible: true,
            buttons: MouseButtons::default(),
            screen,
            wallpaper: None,
            wallpaper_error: None,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            PlatformProbe { state },
        )
    }
}

impl Platform for VirtualPlatform {
    fn cursor_position(&self) -> (i32, i32) {
        lock(&self.state).cursor
    }

    fn set_cursor_position(&self, x: i32, y: i32) {
        let mut state = lock(&self.state);
        let (w, h) = state.screen;
        state.cursor = (x.clamp(0, w as i32 - 1), y.clamp(0, h as i32 - 1));
    }

    fn set_cursor_visible(&self, visible: bool) {
        lock(&self.state).cursor_visible = visible;
    }

    fn buttons(&self) -> MouseButtons {
        lock(&self.state).buttons
    }

    fn screen_size(&self) -> (u32, u32) {
        lock(&self.state).screen
    }

    fn set_wallpaper(&self, location: &str) -> Result<(), i32> {
        let mut state = lock(&self.state);
        if let Some(code) = state.wallpaper_error {
            return Err(code);
        }
        state.wallpaper = Some(location.to_string());
        Ok(())
    }
}

impl PlatformProbe {
    pub fn press(&self, buttons: MouseButtons) {
        lock(&self.state).buttons = buttons;
    }

    pub fn cursor_visible(&self) -> bool {
        lock(&self.state).cursor_visible
    }

    pub fn wallpaper(&self) -> Option<String> {
        lock(&self.state).wallpaper.clone()
    }

    /// Make every following wallpaper change fail with `code`
    pub fn fail_wallpaper_with(&self, code: i32) {
        lock(&self.state).wallpaper_error = Some(code);
    }
}
