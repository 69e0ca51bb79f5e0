//! The `Desktop` class.

use std::sync::Arc;

use crate::error::{RuntimeError, RuntimeResult};
use crate::platform::Platform;

pub struct Desktop {
    platform: Arc<dyn Platform>,
}

impl Desktop {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    pub fn width(&self) -> u32 {
        self.platform.screen_size().0
    }

    pub fn height(&self) -> u32 {
        self.platform.screen_size().1
    }

    pub fn set_wallpaper(&self, file_or_url: &str) -> RuntimeResult<()> {
        if file_or_url.trim().is_empty() {
            return Err(RuntimeError::invalid_argument(
                "file path or URL cannot be empty",
            ));
        }
        self.platform.set_wallpaper(file_or_url).map_err(|code| {
            tracing::warn!(location = file_or_url, code, "Setting wallpaper failed");
            RuntimeError::os("SetWallpaper", code)
        })?;
        tracing::info!(location = file_or_url, "Wallpaper changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::platform::VirtualPlatform;

    #[test]
    fn test_screen_size() {
        let (platform, _) = VirtualPlatform::new((1280, 720));
        let desktop = Desktop::new(Arc::new(platform));
        assert_eq!((desktop.width(), desktop.height()), (1280, 720));
    }

    #[test]
    fn test_set_wallpaper() {
        let (platform, probe) = VirtualPlatform::new((1280, 720));
        let desktop = Desktop::new(Arc::new(platform));
        assert!(desktop.set_wallpaper("  ").unwrap_err().is_invalid_argument());

        desktop.set_wallpaper("/pics/sunset.png").unwrap();
        assert_eq!(probe.wallpaper().as_deref(), Some("/pics/sunset.png"));

        probe.fail_wallpaper_with(5);
        let err = desktop.set_wallpaper("/pics/other.png").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Os { code: 5, .. }));
    }
}
