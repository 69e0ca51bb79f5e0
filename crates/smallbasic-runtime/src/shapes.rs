//! The `Shapes` class: retained drawings addressed by generated names.
//!
//! Colours are taken from the graphics window when a shape is added. A
//! shape keeps them for its whole life, even if the window's pen or brush
//! changes afterwards.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::bitmap::Bitmap;
use crate::error::{RuntimeError, RuntimeResult};
use crate::graphics_window::GraphicsWindow;
use crate::handle::{Handle, HandleRegistry};
use crate::image_list::ImageList;
use crate::surface::{Element, ElementKind, Point};
use crate::ui::UiThread;

const ANIMATION_FRAME: Duration = Duration::from_millis(16);

#[derive(Clone)]
struct Shape {
    element: Element,
    /// Unrotated, fully opaque bitmap of an image shape
    source: Option<Arc<Bitmap>>,
}

impl Shape {
    /// The element as the surface should show it
    fn rendered(&self) -> Element {
        let mut element = self.element.clone();
        if let Some(source) = &self.source {
            let mut bitmap = source.rotated(element.angle);
            if element.opacity < 100.0 {
                bitmap = bitmap.with_opacity(element.opacity / 100.0);
            }
            element.kind = ElementKind::Image {
                bitmap: Arc::new(bitmap),
            };
        }
        element
    }
}

fn publish(registry: &HandleRegistry<Shape>, ui: &UiThread, name: &str) -> RuntimeResult<()> {
    let element = registry.with(name, Shape::rendered)?;
    ui.invoke(move |surface| surface.place(&element))
}

pub struct Shapes {
    registry: Arc<HandleRegistry<Shape>>,
    window: Arc<GraphicsWindow>,
    images: Arc<ImageList>,
    animations: Mutex<Vec<JoinHandle<()>>>,
}

impl Shapes {
    pub fn new(window: Arc<GraphicsWindow>, images: Arc<ImageList>) -> Self {
        Self {
            registry: Arc::new(HandleRegistry::new("Shape", 0)),
            window,
            images,
            animations: Mutex::new(Vec::new()),
        }
    }

    fn add(&self, kind: ElementKind, size: Point, source: Option<Arc<Bitmap>>) -> RuntimeResult<Handle> {
        let (width, height) = size;
        let element = Element {
            name: String::new(),
            kind,
            left: 0.0,
            top: 0.0,
            width,
            height,
            angle: 0.0,
            opacity: 100.0,
            visible: true,
        };
        let handle = self.registry.add("Shape", Shape { element, source });
        self.registry
            .with_mut(&handle, |shape| shape.element.name = handle.to_string())?;
        tracing::debug!(name = %handle, width, height, "Added shape");
        publish(&self.registry, self.window.ui(), &handle)?;
        Ok(handle)
    }

    fn update(&self, name: &str, f: impl FnOnce(&mut Shape) -> RuntimeResult<()>) -> RuntimeResult<()> {
        self.registry.with_mut(name, f)??;
        publish(&self.registry, self.window.ui(), name)
    }

    pub fn add_rectangle(&self, width: f64, height: f64) -> RuntimeResult<Handle> {
        let kind = ElementKind::Rectangle {
            pen: self.window.pen(),
            brush: self.window.brush(),
        };
        self.add(kind, (width, height), None)
    }

    pub fn add_ellipse(&self, width: f64, height: f64) -> RuntimeResult<Handle> {
        let kind = ElementKind::Ellipse {
            pen: self.window.pen(),
            brush: self.window.brush(),
        };
        self.add(kind, (width, height), None)
    }

    /// A triangle sized to the largest of its coordinates
    pub fn add_triangle(&self, points: [Point; 3]) -> RuntimeResult<Handle> {
        let width = points.iter().map(|p| p.0).fold(0.0, f64::max);
        let height = points.iter().map(|p| p.1).fold(0.0, f64::max);
        let kind = ElementKind::Triangle {
            points,
            pen: self.window.pen(),
            brush: self.window.brush(),
        };
        self.add(kind, (width, height), None)
    }

    pub fn add_line(&self, from: Point, to: Point) -> RuntimeResult<Handle> {
        let size = (from.0.max(to.0), from.1.max(to.1));
        let kind = ElementKind::Line {
            from,
            to,
            pen: self.window.pen(),
        };
        self.add(kind, size, None)
    }

    /// A shape showing an image from the image list at its natural size
    pub fn add_image(&self, image: &str) -> RuntimeResult<Handle> {
        let bitmap = self.images.get(image)?;
        let size = (bitmap.width() as f64, bitmap.height() as f64);
        let kind = ElementKind::Image {
            bitmap: Arc::clone(&bitmap),
        };
        self.add(kind, size, Some(bitmap))
    }

    pub fn add_text(&self, text: &str) -> RuntimeResult<Handle> {
        let font = self.window.font();
        let size = (text.chars().count() as f64 * font.size * 0.6, font.size * 1.5);
        let kind = ElementKind::Text {
            text: text.to_string(),
            font,
            brush: self.window.brush(),
        };
        self.add(kind, size, None)
    }

    /// Replaces the text of a text shape
    pub fn set_text(&self, name: &str, text: &str) -> RuntimeResult<()> {
        self.update(name, |shape| match &mut shape.element.kind {
            ElementKind::Text { text: current, .. } => {
                *current = text.to_string();
                Ok(())
            }
            _ => Err(RuntimeError::invalid_argument(format!("{name} is not a text shape"))),
        })
    }

    pub fn remove(&self, name: &str) -> RuntimeResult<bool> {
        if !self.registry.remove(name) {
            return Ok(false);
        }
        let name = name.to_string();
        self.window.ui().invoke(move |surface| surface.remove(&name))?;
        Ok(true)
    }

    pub fn move_to(&self, name: &str, left: f64, top: f64) -> RuntimeResult<()> {
        self.update(name, |shape| {
            shape.element.left = left;
            shape.element.top = top;
            Ok(())
        })
    }

    pub fn get_left(&self, name: &str) -> RuntimeResult<f64> {
        self.registry.with(name, |shape| shape.element.left)
    }

    pub fn get_top(&self, name: &str) -> RuntimeResult<f64> {
        self.registry.with(name, |shape| shape.element.top)
    }

    pub fn get_size(&self, name: &str) -> RuntimeResult<Point> {
        self.registry
            .with(name, |shape| (shape.element.width, shape.element.height))
    }

    /// Turns a shape a further `degrees` clockwise
    pub fn rotate(&self, name: &str, degrees: f64) -> RuntimeResult<()> {
        self.update(name, |shape| {
            shape.element.angle = (shape.element.angle + degrees) % 360.0;
            Ok(())
        })
    }

    pub fn get_angle(&self, name: &str) -> RuntimeResult<f64> {
        self.registry.with(name, |shape| shape.element.angle)
    }

    /// Multiplies the current size by the scale factors
    pub fn zoom(&self, name: &str, scale_x: f64, scale_y: f64) -> RuntimeResult<()> {
        for scale in [scale_x, scale_y] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(RuntimeError::invalid_argument(format!(
                    "zoom factor must be positive, got {scale}"
                )));
            }
        }
        self.update(name, |shape| {
            shape.element.width *= scale_x;
            shape.element.height *= scale_y;
            Ok(())
        })
    }

    /// Sets opacity in percent, clamped to 0..=100
    pub fn set_opacity(&self, name: &str, opacity: f64) -> RuntimeResult<()> {
        if opacity.is_nan() {
            return Err(RuntimeError::invalid_argument("opacity is not a number"));
        }
        self.update(name, |shape| {
            shape.element.opacity = opacity.clamp(0.0, 100.0);
            Ok(())
        })
    }

    pub fn get_opacity(&self, name: &str) -> RuntimeResult<f64> {
        self.registry.with(name, |shape| shape.element.opacity)
    }

    pub fn hide_shape(&self, name: &str) -> RuntimeResult<()> {
        self.update(name, |shape| {
            shape.element.visible = false;
            Ok(())
        })
    }

    pub fn show_shape(&self, name: &str) -> RuntimeResult<()> {
        self.update(name, |shape| {
            shape.element.visible = true;
            Ok(())
        })
    }

    /// Glides a shape to (left, top) over `duration_ms` on a background thread
    pub fn animate(&self, name: &str, left: f64, top: f64, duration_ms: u64) -> RuntimeResult<()> {
        if duration_ms == 0 {
            return self.move_to(name, left, top);
        }
        let start = self
            .registry
            .with(name, |shape| (shape.element.left, shape.element.top))?;
        let registry = Arc::clone(&self.registry);
        let ui = Arc::clone(self.window.ui());
        let name = name.to_string();
        let duration = Duration::from_millis(duration_ms);

        let thread = std::thread::Builder::new()
            .name(format!("animate-{name}"))
            .spawn(move || {
                let began = Instant::now();
                loop {
                    let t = (began.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0);
                    let moved = registry.with_mut(&name, |shape| {
                        shape.element.left = start.0 + (left - start.0) * t;
                        shape.element.top = start.1 + (top - start.1) * t;
                    });
                    if moved.is_err() || publish(&registry, &ui, &name).is_err() {
                        tracing::debug!(name = %name, "Animation target vanished");
                        return;
                    }
                    if t >= 1.0 {
                        return;
                    }
                    std::thread::sleep(ANIMATION_FRAME);
                }
            })?;

        let mut animations = self.animations.lock().unwrap_or_else(|e| e.into_inner());
        animations.retain(|a| !a.is_finished());
        animations.push(thread);
        Ok(())
    }

    /// Blocks until every running animation has finished
    pub fn wait_for_animations(&self) {
        let pending: Vec<_> = self
            .animations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        for thread in pending {
            if thread.join().is_err() {
                tracing::warn!("Animation thread panicked");
            }
        }
    }

    pub fn names(&self) -> Vec<Handle> {
        self.registry.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::config::RuntimeConfig;
    use crate::network::Network;
    use crate::surface::{HeadlessSurface, SurfaceProbe};

    fn shapes() -> (Shapes, Arc<GraphicsWindow>, Arc<ImageList>, SurfaceProbe) {
        let (surface, probe) = HeadlessSurface::new();
        let config = RuntimeConfig::default();
        let ui = Arc::new(UiThread::spawn(Box::new(surface)).unwrap());
        let images = Arc::new(ImageList::new(Arc::new(Network::new(&config))));
        let window = Arc::new(GraphicsWindow::new(&config, ui, Arc::clone(&images)).unwrap());
        (
            Shapes::new(Arc::clone(&window), Arc::clone(&images)),
            window,
            images,
            probe,
        )
    }

    #[test]
    fn test_names_and_placement() {
        let (shapes, _, _, probe) = shapes();
        let a = shapes.add_rectangle(10.0, 20.0).unwrap();
        let b = shapes.add_ellipse(5.0, 5.0).unwrap();
        assert_eq!((a.as_str(), b.as_str()), ("Shape0", "Shape1"));
        let placed = probe.element("Shape0").unwrap();
        assert_eq!((placed.width, placed.height), (10.0, 20.0));

        assert!(shapes.remove(&a).unwrap());
        assert!(!shapes.remove(&a).unwrap());
        assert!(probe.element("Shape0").is_none());
        assert_eq!(shapes.add_line((0.0, 0.0), (3.0, 4.0)).unwrap().as_str(), "Shape2");
    }

    #[test]
    fn test_colors_are_captured_at_creation() {
        let (shapes, window, _, probe) = shapes();
        window.set_brush_color("Red").unwrap();
        let name = shapes.add_rectangle(1.0, 1.0).unwrap();
        window.set_brush_color("Blue").unwrap();
        shapes.move_to(&name, 5.0, 5.0).unwrap();
        let ElementKind::Rectangle { brush, .. } = probe.element(&name).unwrap().kind else {
            panic!("expected a rectangle");
        };
        assert_eq!(brush, Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_move_and_negative_coordinates() {
        let (shapes, _, _, _) = shapes();
        let name = shapes.add_rectangle(1.0, 1.0).unwrap();
        shapes.move_to(&name, -1.0, -30.0).unwrap();
        assert_eq!(shapes.get_left(&name).unwrap(), -1.0);
        assert_eq!(shapes.get_top(&name).unwrap(), -30.0);
        assert!(shapes.get_left("Shape99").unwrap_err().is_not_found());
    }

    #[test]
    fn test_triangle_bounds() {
        let (shapes, _, _, _) = shapes();
        let name = shapes
            .add_triangle([(0.0, 10.0), (15.0, 0.0), (7.0, 3.0)])
            .unwrap();
        assert_eq!(shapes.get_size(&name).unwrap(), (15.0, 10.0));
    }

    #[test]
    fn test_zoom_is_cumulative() {
        let (shapes, _, _, _) = shapes();
        let name = shapes.add_ellipse(10.0, 4.0).unwrap();
        shapes.zoom(&name, 2.0, 0.5).unwrap();
        shapes.zoom(&name, 2.0, 0.5).unwrap();
        assert_eq!(shapes.get_size(&name).unwrap(), (40.0, 1.0));
        assert!(shapes.zoom(&name, 0.0, 1.0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_rotate_image_shape_re_renders_bitmap() {
        let (shapes, _, images, probe) = shapes();
        let mut bitmap = Bitmap::new(3, 3, Color::WHITE);
        bitmap.set_pixel(2, 1, Color::rgb(255, 0, 0));
        let image = images.add_bitmap(bitmap);
        let name = shapes.add_image(&image).unwrap();
        shapes.rotate(&name, 45.0).unwrap();
        shapes.rotate(&name, 45.0).unwrap();
        assert_eq!(shapes.get_angle(&name).unwrap(), 90.0);

        let ElementKind::Image { bitmap } = probe.element(&name).unwrap().kind else {
            panic!("expected an image");
        };
        assert_eq!(bitmap.pixel(1, 2), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_opacity() {
        let (shapes, _, images, probe) = shapes();
        let image = images.add_bitmap(Bitmap::new(2, 2, Color::BLACK));
        let name = shapes.add_image(&image).unwrap();
        shapes.set_opacity(&name, 150.0).unwrap();
        assert_eq!(shapes.get_opacity(&name).unwrap(), 100.0);
        shapes.set_opacity(&name, 0.0).unwrap();
        let ElementKind::Image { bitmap } = probe.element(&name).unwrap().kind else {
            panic!("expected an image");
        };
        assert!(bitmap.pixels().chunks(4).all(|p| p[3] == 0));
    }

    #[test]
    fn test_add_image_requires_known_image() {
        let (shapes, _, _, _) = shapes();
        assert!(shapes.add_image("Image42").unwrap_err().is_not_found());
    }

    #[test]
    fn test_hide_and_show() {
        let (shapes, _, _, probe) = shapes();
        let name = shapes.add_text("score").unwrap();
        shapes.hide_shape(&name).unwrap();
        assert!(!probe.element(&name).unwrap().visible);
        shapes.show_shape(&name).unwrap();
        shapes.set_text(&name, "level").unwrap();
        let element = probe.element(&name).unwrap();
        assert!(element.visible);
        assert!(matches!(element.kind, ElementKind::Text { ref text, .. } if text == "level"));
    }

    #[test]
    fn test_animate_reaches_target() {
        let (shapes, _, _, probe) = shapes();
        let name = shapes.add_rectangle(1.0, 1.0).unwrap();
        shapes.animate(&name, 100.0, 50.0, 80).unwrap();
        shapes.wait_for_animations();
        assert_eq!(shapes.get_left(&name).unwrap(), 100.0);
        assert_eq!(probe.element(&name).unwrap().top, 50.0);

        shapes.animate(&name, 0.0, 0.0, 0).unwrap();
        assert_eq!(shapes.get_left(&name).unwrap(), 0.0);
    }
}
