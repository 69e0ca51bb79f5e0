//! The `Mouse` class.

use std::sync::Arc;

use crate::platform::Platform;

pub struct Mouse {
    platform: Arc<dyn Platform>,
}

impl Mouse {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    pub fn mouse_x(&self) -> i32 {
        self.platform.cursor_position().0
    }

    pub fn set_mouse_x(&self, x: i32) {
        let (_, y) = self.platform.cursor_position();
        self.platform.set_cursor_position(x, y);
    }

    pub fn mouse_y(&self) -> i32 {
        self.platform.cursor_position().1
    }

    pub fn set_mouse_y(&self, y: i32) {
        let (x, _) = self.platform.cursor_position();
        self.platform.set_cursor_position(x, y);
    }

    pub fn is_left_button_down(&self) -> bool {
        self.platform.buttons().left
    }

    pub fn is_right_button_down(&self) -> bool {
        self.platform.buttons().right
    }

    pub fn hide_cursor(&self) {
        self.platform.set_cursor_visible(false);
    }

    pub fn show_cursor(&self) {
        self.platform.set_cursor_visible(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MouseButtons, VirtualPlatform};

    #[test]
    fn test_position_and_buttons() {
        let (platform, probe) = VirtualPlatform::new((1920, 1080));
        let mouse = Mouse::new(Arc::new(platform));
        mouse.set_mouse_x(100);
        mouse.set_mouse_y(50);
        assert_eq!((mouse.mouse_x(), mouse.mouse_y()), (100, 50));
        mouse.set_mouse_x(5000);
        assert_eq!(mouse.mouse_x(), 1919);

        assert!(!mouse.is_left_button_down());
        probe.press(MouseButtons {
            left: true,
            right: false,
        });
        assert!(mouse.is_left_button_down());
        assert!(!mouse.is_right_button_down());

        mouse.hide_cursor();
        assert!(!probe.cursor_visible());
        mouse.show_cursor();
        assert!(probe.cursor_visible());
    }
}
