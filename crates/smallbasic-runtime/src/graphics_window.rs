//! The `GraphicsWindow` class.
//!
//! Pen, brush, font and window properties are plain mutable state. Each
//! drawing call reads that state when it is made and sends one
//! [`DrawCommand`] to the surface, so changing the pen colour affects later
//! drawings and never earlier ones.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::color::Color;
use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::image_list::ImageList;
use crate::surface::{DrawCommand, Font, Pen, Point, Rect, WindowSpec};
use crate::ui::UiThread;

/// Callback attached to a window event
pub type EventHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input reported by the host window
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    KeyDown(String),
    KeyUp(String),
    MouseDown { x: f64, y: f64, button: MouseButton },
    MouseUp { x: f64, y: f64, button: MouseButton },
    MouseMove { x: f64, y: f64 },
}

struct WindowState {
    title: String,
    width: u32,
    height: u32,
    background: Color,
    pen: Pen,
    brush: Color,
    font: Font,
    can_resize: bool,
    shown: bool,
    last_key: String,
    mouse: Point,
}

impl WindowState {
    fn spec(&self) -> WindowSpec {
        WindowSpec {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            background: self.background,
            can_resize: self.can_resize,
        }
    }
}

#[derive(Default)]
struct Handlers {
    key_down: Option<EventHandler>,
    key_up: Option<EventHandler>,
    mouse_down: Option<EventHandler>,
    mouse_up: Option<EventHandler>,
    mouse_move: Option<EventHandler>,
}

pub struct GraphicsWindow {
    state: Mutex<WindowState>,
    handlers: Mutex<Handlers>,
    ui: Arc<UiThread>,
    images: Arc<ImageList>,
}

fn positive(what: &str, value: f64) -> RuntimeResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(RuntimeError::invalid_argument(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

fn dimension(what: &str, value: u32) -> RuntimeResult<u32> {
    if value == 0 {
        return Err(RuntimeError::invalid_argument(format!("{what} must be positive")));
    }
    Ok(value)
}

impl GraphicsWindow {
    pub fn new(
        config: &RuntimeConfig,
        ui: Arc<UiThread>,
        images: Arc<ImageList>,
    ) -> RuntimeResult<Self> {
        let state = WindowState {
            title: config.window_title.clone(),
            width: dimension("width", config.window_width)?,
            height: dimension("height", config.window_height)?,
            background: Color::from_name(&config.background_color)?,
            pen: Pen {
                color: Color::from_name(&config.pen_color)?,
                width: positive("pen width", config.pen_width)?,
            },
            brush: Color::from_name(&config.brush_color)?,
            font: Font {
                name: config.font_name.clone(),
                size: positive("font size", config.font_size)?,
            },
            can_resize: config.can_resize,
            shown: false,
            last_key: String::new(),
            mouse: (0.0, 0.0),
        };
        Ok(Self {
            state: Mutex::new(state),
            handlers: Mutex::new(Handlers::default()),
            ui,
            images,
        })
    }

    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn handlers(&self) -> MutexGuard<'_, Handlers> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn ui(&self) -> &Arc<UiThread> {
        &self.ui
    }

    pub(crate) fn ensure_shown(&self) -> RuntimeResult<()> {
        if self.lock().shown {
            Ok(())
        } else {
            Err(RuntimeError::not_initialized("Graphics window"))
        }
    }

    pub fn show(&self) -> RuntimeResult<()> {
        let spec = self.lock().spec();
        tracing::info!(title = %spec.title, width = spec.width, height = spec.height, "Showing graphics window");
        self.ui.invoke(move |surface| surface.show(&spec))?;
        self.lock().shown = true;
        Ok(())
    }

    pub fn hide(&self) -> RuntimeResult<()> {
        self.lock().shown = false;
        tracing::info!("Hiding graphics window");
        self.ui.invoke(|surface| surface.hide())
    }

    pub fn is_shown(&self) -> bool {
        self.lock().shown
    }

    /// Mutate window properties and push them to the surface when shown
    fn reconfigure(&self, update: impl FnOnce(&mut WindowState)) -> RuntimeResult<()> {
        let spec = {
            let mut state = self.lock();
            update(&mut state);
            state.shown.then(|| state.spec())
        };
        match spec {
            Some(spec) => {
                tracing::debug!(width = spec.width, height = spec.height, "Reconfiguring graphics window");
                self.ui.invoke(move |surface| surface.configure(&spec))
            }
            None => Ok(()),
        }
    }

    pub fn width(&self) -> u32 {
        self.lock().width
    }

    pub fn set_width(&self, width: u32) -> RuntimeResult<()> {
        let width = dimension("width", width)?;
        self.reconfigure(|s| s.width = width)
    }

    pub fn height(&self) -> u32 {
        self.lock().height
    }

    pub fn set_height(&self, height: u32) -> RuntimeResult<()> {
        let height = dimension("height", height)?;
        self.reconfigure(|s| s.height = height)
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    pub fn set_title(&self, title: &str) -> RuntimeResult<()> {
        let title = title.to_string();
        self.reconfigure(|s| s.title = title)
    }

    pub fn can_resize(&self) -> bool {
        self.lock().can_resize
    }

    pub fn set_can_resize(&self, can_resize: bool) -> RuntimeResult<()> {
        self.reconfigure(|s| s.can_resize = can_resize)
    }

    pub fn background_color(&self) -> String {
        self.lock().background.name()
    }

    pub fn set_background_color(&self, name: &str) -> RuntimeResult<()> {
        let color = Color::from_name(name)?;
        self.reconfigure(|s| s.background = color)
    }

    pub fn pen_color(&self) -> String {
        self.lock().pen.color.name()
    }

    pub fn set_pen_color(&self, name: &str) -> RuntimeResult<()> {
        let color = Color::from_name(name)?;
        self.lock().pen.color = color;
        Ok(())
    }

    pub fn pen_width(&self) -> f64 {
        self.lock().pen.width
    }

    pub fn set_pen_width(&self, width: f64) -> RuntimeResult<()> {
        let width = positive("pen width", width)?;
        self.lock().pen.width = width;
        Ok(())
    }

    pub fn brush_color(&self) -> String {
        self.lock().brush.name()
    }

    pub fn set_brush_color(&self, name: &str) -> RuntimeResult<()> {
        let color = Color::from_name(name)?;
        self.lock().brush = color;
        Ok(())
    }

    pub fn font_name(&self) -> String {
        self.lock().font.name.clone()
    }

    pub fn set_font_name(&self, name: &str) -> RuntimeResult<()> {
        if name.trim().is_empty() {
            return Err(RuntimeError::invalid_argument("font name is empty"));
        }
        self.lock().font.name = name.to_string();
        Ok(())
    }

    pub fn font_size(&self) -> f64 {
        self.lock().font.size
    }

    pub fn set_font_size(&self, size: f64) -> RuntimeResult<()> {
        let size = positive("font size", size)?;
        self.lock().font.size = size;
        Ok(())
    }

    pub(crate) fn pen(&self) -> Pen {
        self.lock().pen
    }

    pub(crate) fn brush(&self) -> Color {
        self.lock().brush
    }

    pub(crate) fn font(&self) -> Font {
        self.lock().font.clone()
    }

    /// Build a command from the current state and send it to the surface
    fn draw(&self, build: impl FnOnce(&WindowState) -> DrawCommand) -> RuntimeResult<()> {
        let command = {
            let state = self.lock();
            if !state.shown {
                return Err(RuntimeError::not_initialized("Graphics window"));
            }
            build(&state)
        };
        self.ui.invoke(move |surface| surface.draw(&command))
    }

    pub fn draw_rectangle(&self, x: f64, y: f64, width: f64, height: f64) -> RuntimeResult<()> {
        let rect = Rect { x, y, width, height };
        self.draw(|s| DrawCommand::Rectangle { rect, pen: s.pen })
    }

    pub fn fill_rectangle(&self, x: f64, y: f64, width: f64, height: f64) -> RuntimeResult<()> {
        let rect = Rect { x, y, width, height };
        self.draw(|s| DrawCommand::FillRectangle { rect, brush: s.brush })
    }

    pub fn draw_ellipse(&self, x: f64, y: f64, width: f64, height: f64) -> RuntimeResult<()> {
        let rect = Rect { x, y, width, height };
        self.draw(|s| DrawCommand::Ellipse { rect, pen: s.pen })
    }

    pub fn fill_ellipse(&self, x: f64, y: f64, width: f64, height: f64) -> RuntimeResult<()> {
        let rect = Rect { x, y, width, height };
        self.draw(|s| DrawCommand::FillEllipse { rect, brush: s.brush })
    }

    pub fn draw_triangle(&self, points: [Point; 3]) -> RuntimeResult<()> {
        self.draw(|s| DrawCommand::Triangle { points, pen: s.pen })
    }

    pub fn fill_triangle(&self, points: [Point; 3]) -> RuntimeResult<()> {
        self.draw(|s| DrawCommand::FillTriangle {
            points,
            brush: s.brush,
        })
    }

    pub fn draw_line(&self, from: Point, to: Point) -> RuntimeResult<()> {
        self.draw(|s| DrawCommand::Line { from, to, pen: s.pen })
    }

    /// Draws `text` at (x, y) in the current font and pen colour
    pub fn draw_text(&self, x: f64, y: f64, text: &str) -> RuntimeResult<()> {
        let text = text.to_string();
        self.draw(|s| DrawCommand::Text {
            at: (x, y),
            text,
            font: s.font.clone(),
            color: s.pen.color,
        })
    }

    /// Draws an image from the image list with its top-left corner at (x, y)
    pub fn draw_image(&self, image: &str, x: f64, y: f64) -> RuntimeResult<()> {
        let bitmap = self.images.get(image)?;
        self.draw(|_| DrawCommand::Image { at: (x, y), bitmap })
    }

    pub fn set_pixel(&self, x: f64, y: f64, color: &str) -> RuntimeResult<()> {
        let color = Color::from_name(color)?;
        self.draw(|_| DrawCommand::Pixel { at: (x, y), color })
    }

    /// Erases everything drawn so far
    pub fn clear(&self) -> RuntimeResult<()> {
        let background = {
            let state = self.lock();
            if !state.shown {
                return Err(RuntimeError::not_initialized("Graphics window"));
            }
            state.background
        };
        self.ui.invoke(move |surface| surface.clear(background))
    }

    pub fn get_color_from_rgb(r: f64, g: f64, b: f64) -> String {
        Color::from_rgb(r, g, b).name()
    }

    pub fn get_random_color() -> String {
        Color::random().name()
    }

    pub fn last_key(&self) -> String {
        self.lock().last_key.clone()
    }

    pub fn mouse_x(&self) -> f64 {
        self.lock().mouse.0
    }

    pub fn mouse_y(&self) -> f64 {
        self.lock().mouse.1
    }

    pub fn on_key_down(&self, handler: EventHandler) {
        self.handlers().key_down = Some(handler);
    }

    pub fn on_key_up(&self, handler: EventHandler) {
        self.handlers().key_up = Some(handler);
    }

    pub fn on_mouse_down(&self, handler: EventHandler) {
        self.handlers().mouse_down = Some(handler);
    }

    pub fn on_mouse_up(&self, handler: EventHandler) {
        self.handlers().mouse_up = Some(handler);
    }

    pub fn on_mouse_move(&self, handler: EventHandler) {
        self.handlers().mouse_move = Some(handler);
    }

    /// Feed an input event from the host window.
    ///
    /// State (`last_key`, mouse position) is updated before the handler
    /// runs, and the handler runs without any runtime lock held.
    pub fn dispatch_event(&self, event: WindowEvent) {
        let handler = {
            let mut state = self.lock();
            let handlers = self.handlers();
            match &event {
                WindowEvent::KeyDown(key) => {
                    state.last_key = key.clone();
                    handlers.key_down.clone()
                }
                WindowEvent::KeyUp(key) => {
                    state.last_key = key.clone();
                    handlers.key_up.clone()
                }
                WindowEvent::MouseDown { x, y, .. } => {
                    state.mouse = (*x, *y);
                    handlers.mouse_down.clone()
                }
                WindowEvent::MouseUp { x, y, .. } => {
                    state.mouse = (*x, *y);
                    handlers.mouse_up.clone()
                }
                WindowEvent::MouseMove { x, y } => {
                    state.mouse = (*x, *y);
                    handlers.mouse_move.clone()
                }
            }
        };
        tracing::trace!(?event, handled = handler.is_some(), "Window event");
        if let Some(handler) = handler {
            handler();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use crate::surface::{HeadlessSurface, SurfaceProbe};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn window() -> (GraphicsWindow, SurfaceProbe) {
        let (surface, probe) = HeadlessSurface::new();
        let config = RuntimeConfig::default();
        let ui = Arc::new(UiThread::spawn(Box::new(surface)).unwrap());
        let images = Arc::new(ImageList::new(Arc::new(Network::new(&config))));
        (GraphicsWindow::new(&config, ui, images).unwrap(), probe)
    }

    #[test]
    fn test_defaults() {
        let (gw, _) = window();
        assert_eq!((gw.width(), gw.height()), (800, 600));
        assert_eq!(gw.background_color(), "White");
        assert_eq!(gw.pen_color(), "Black");
        assert_eq!(gw.font_name(), "Arial");
        assert_eq!(gw.title(), "Graphics Window");
        assert!(!gw.can_resize());
    }

    #[test]
    fn test_failed_show_leaves_window_hidden() {
        let (gw, probe) = window();
        probe.refuse_show();
        assert!(gw.show().is_err());
        assert!(!gw.is_shown());
        assert!(gw.draw_line((0.0, 0.0), (1.0, 1.0)).unwrap_err().is_not_initialized());
        assert!(probe.commands().is_empty());
    }

    #[test]
    fn test_draw_before_show_is_not_initialized() {
        let (gw, probe) = window();
        assert!(gw.draw_rectangle(0.0, 0.0, 5.0, 5.0).unwrap_err().is_not_initialized());
        assert!(gw.clear().unwrap_err().is_not_initialized());
        assert!(probe.commands().is_empty());
    }

    #[test]
    fn test_state_is_read_at_call_time() {
        let (gw, probe) = window();
        gw.show().unwrap();
        gw.draw_line((0.0, 0.0), (10.0, 10.0)).unwrap();
        gw.set_pen_color("Red").unwrap();
        gw.set_pen_width(3.0).unwrap();
        gw.draw_line((0.0, 0.0), (10.0, 10.0)).unwrap();

        let commands = probe.commands();
        assert_eq!(commands.len(), 2);
        let DrawCommand::Line { pen: first, .. } = &commands[0] else {
            panic!("expected a line, got {:?}", commands[0]);
        };
        let DrawCommand::Line { pen: second, .. } = &commands[1] else {
            panic!("expected a line, got {:?}", commands[1]);
        };
        assert_eq!(first.color, Color::BLACK);
        assert_eq!(second.color, Color::rgb(255, 0, 0));
        assert_eq!(second.width, 3.0);
    }

    #[test]
    fn test_resize_refreshes_shown_window() {
        let (gw, probe) = window();
        gw.set_width(320).unwrap();
        assert_eq!(probe.refreshes(), 0);
        gw.show().unwrap();
        gw.set_height(200).unwrap();
        let spec = probe.spec().unwrap();
        assert_eq!((spec.width, spec.height), (320, 200));
        assert_eq!(probe.refreshes(), 1);
        assert!(gw.set_width(0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let (gw, _) = window();
        assert!(gw.set_brush_color("NotAColor").unwrap_err().is_invalid_argument());
        assert_eq!(gw.brush_color(), "Black");
    }

    #[test]
    fn test_fill_uses_brush_and_text_uses_pen() {
        let (gw, probe) = window();
        gw.show().unwrap();
        gw.set_brush_color("Green").unwrap();
        gw.fill_ellipse(1.0, 2.0, 3.0, 4.0).unwrap();
        assert!(matches!(
            probe.last_command(),
            Some(DrawCommand::FillEllipse { brush, .. }) if brush == Color::rgb(0, 128, 0)
        ));
        gw.set_font_size(20.0).unwrap();
        gw.draw_text(5.0, 5.0, "hi").unwrap();
        assert!(matches!(
            probe.last_command(),
            Some(DrawCommand::Text { font, color, .. }) if font.size == 20.0 && color == Color::BLACK
        ));
    }

    #[test]
    fn test_events_update_state_then_call_handler() {
        let (gw, _) = window();
        let gw = Arc::new(gw);
        let seen = Arc::new(AtomicUsize::new(0));
        let observer = Arc::clone(&gw);
        let counter = Arc::clone(&seen);
        gw.on_mouse_down(Arc::new(move || {
            assert_eq!(observer.mouse_x(), 12.0);
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        gw.dispatch_event(WindowEvent::MouseDown {
            x: 12.0,
            y: 34.0,
            button: MouseButton::Left,
        });
        gw.dispatch_event(WindowEvent::KeyDown("Space".into()));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(gw.mouse_y(), 34.0);
        assert_eq!(gw.last_key(), "Space");
    }

    #[test]
    fn test_draw_image_requires_known_image() {
        let (gw, _) = window();
        gw.show().unwrap();
        assert!(gw.draw_image("Image0", 0.0, 0.0).unwrap_err().is_not_found());
    }

    #[test]
    fn test_color_helpers() {
        assert_eq!(GraphicsWindow::get_color_from_rgb(255.0, 0.0, 0.0), "Red");
        assert_eq!(GraphicsWindow::get_color_from_rgb(1.0, 2.0, 3.0), "#010203");
        assert!(Color::from_name(&GraphicsWindow::get_random_color()).is_ok());
    }
}
