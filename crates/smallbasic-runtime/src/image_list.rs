//! The `ImageList` class: decoded images kept under generated names.

use std::sync::Arc;

use crate::bitmap::Bitmap;
use crate::error::RuntimeResult;
use crate::file::map_missing;
use crate::handle::{Handle, HandleRegistry};
use crate::network::{Network, is_web_url};

pub struct ImageList {
    images: HandleRegistry<Arc<Bitmap>>,
    network: Arc<Network>,
}

impl ImageList {
    pub fn new(network: Arc<Network>) -> Self {
        Self {
            images: HandleRegistry::new("Image", 0),
            network,
        }
    }

    /// Loads a PNG from a file path or an absolute http(s) URL
    pub fn load_image(&self, location: &str) -> RuntimeResult<Handle> {
        let bytes = if is_web_url(location) {
            self.network.get_bytes(location.trim())?
        } else {
            let path = std::path::Path::new(location);
            std::fs::read(path).map_err(|e| map_missing(e, "Image file", path))?
        };
        let bitmap = Bitmap::decode_png(&bytes)?;
        let (width, height) = (bitmap.width(), bitmap.height());
        let handle = self.images.add("Image", Arc::new(bitmap));
        tracing::debug!(name = %handle, location, width, height, "Loaded image");
        Ok(handle)
    }

    /// Registers an already decoded bitmap
    pub fn add_bitmap(&self, bitmap: Bitmap) -> Handle {
        self.images.add("Image", Arc::new(bitmap))
    }

    pub fn get_width_of_image(&self, name: &str) -> RuntimeResult<u32> {
        self.images.with(name, |b| b.width())
    }

    pub fn get_height_of_image(&self, name: &str) -> RuntimeResult<u32> {
        self.images.with(name, |b| b.height())
    }

    pub fn get(&self, name: &str) -> RuntimeResult<Arc<Bitmap>> {
        self.images.get(name)
    }

    pub fn remove_image(&self, name: &str) -> bool {
        self.images.remove(name)
    }

    pub fn names(&self) -> Vec<Handle> {
        self.images.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::config::RuntimeConfig;
    use crate::network::test_server;

    fn image_list() -> ImageList {
        ImageList::new(Arc::new(Network::new(&RuntimeConfig::default())))
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        Bitmap::new(width, height, Color::rgb(9, 8, 7))
            .encode_png()
            .unwrap()
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprite.png");
        std::fs::write(&path, png(4, 3)).unwrap();

        let images = image_list();
        let name = images.load_image(path.to_str().unwrap()).unwrap();
        assert_eq!(name.as_str(), "Image0");
        assert_eq!(images.get_width_of_image(&name).unwrap(), 4);
        assert_eq!(images.get_height_of_image(&name).unwrap(), 3);
        assert_eq!(images.get(&name).unwrap().pixel(0, 0), Some(Color::rgb(9, 8, 7)));
    }

    #[test]
    fn test_load_from_url() {
        let (url, server) = test_server::serve(200, png(2, 2), 1);
        let images = image_list();
        let name = images.load_image(&format!("{url}/a.png")).unwrap();
        assert_eq!(images.get_width_of_image(&name).unwrap(), 2);
        server.join().unwrap();
    }

    #[test]
    fn test_unknown_and_removed_images() {
        let images = image_list();
        assert!(images.get_width_of_image("Image9").unwrap_err().is_not_found());
        let name = images.add_bitmap(Bitmap::new(1, 1, Color::WHITE));
        assert!(images.remove_image(&name));
        assert!(images.get(&name).unwrap_err().is_not_found());
        assert_eq!(images.add_bitmap(Bitmap::new(1, 1, Color::WHITE)).as_str(), "Image1");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let images = image_list();
        let err = images.load_image("/definitely/not/here.png").unwrap_err();
        assert!(err.is_not_found());
    }
}
