//! Drawing surfaces.
//!
//! A [`Surface`] is whatever the host uses to put a graphics window on the
//! screen. The runtime only ever talks to it from the UI thread (see
//! [`crate::ui`]), issuing immediate-mode [`DrawCommand`]s for the
//! `GraphicsWindow` drawing calls and retained [`Element`]s for shapes and
//! controls.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::error::{RuntimeError, RuntimeResult};

/// Window properties a surface must reflect
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub can_resize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: String,
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub type Point = (f64, f64);

/// One immediate-mode drawing operation with the state captured at call time
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rectangle { rect: Rect, pen: Pen },
    FillRectangle { rect: Rect, brush: Color },
    Ellipse { rect: Rect, pen: Pen },
    FillEllipse { rect: Rect, brush: Color },
    Triangle { points: [Point; 3], pen: Pen },
    FillTriangle { points: [Point; 3], brush: Color },
    Line { from: Point, to: Point, pen: Pen },
    Text { at: Point, text: String, font: Font, color: Color },
    Image { at: Point, bitmap: Arc<Bitmap> },
    Pixel { at: Point, color: Color },
}

/// What a retained element looks like
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Rectangle { pen: Pen, brush: Color },
    Ellipse { pen: Pen, brush: Color },
    /// Points are relative to the element's top-left corner
    Triangle { points: [Point; 3], pen: Pen, brush: Color },
    Line { from: Point, to: Point, pen: Pen },
    Image { bitmap: Arc<Bitmap> },
    Text { text: String, font: Font, brush: Color },
    Button { caption: String },
    TextBox { text: String, multi_line: bool },
}

/// A named object that stays on the surface until removed
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub kind: ElementKind,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    /// 0 is invisible, 100 fully opaque
    pub opacity: f64,
    pub visible: bool,
}

pub trait Surface: Send {
    fn show(&mut self, spec: &WindowSpec) -> RuntimeResult<()>;
    fn hide(&mut self) -> RuntimeResult<()>;

    /// Apply a changed spec to a shown window and refresh it
    fn configure(&mut self, spec: &WindowSpec) -> RuntimeResult<()>;

    /// Wipe immediate-mode drawings, filling with `background`
    fn clear(&mut self, background: Color) -> RuntimeResult<()>;
    fn draw(&mut self, command: &DrawCommand) -> RuntimeResult<()>;

    /// Insert or replace the element with the same name
    fn place(&mut self, element: &Element) -> RuntimeResult<()>;
    fn remove(&mut self, name: &str) -> RuntimeResult<()>;
}

#[derive(Debug, Default)]
struct Recording {
    spec: Option<WindowSpec>,
    shown: bool,
    refreshes: usize,
    commands: Vec<DrawCommand>,
    elements: BTreeMap<String, Element>,
    refuse_show: bool,
}

/// Surface that records what it is asked to do
pub struct HeadlessSurface {
    recording: Arc<Mutex<Recording>>,
}

/// Read side of a [`HeadlessSurface`]
#[derive(Clone)]
pub struct SurfaceProbe {
    recording: Arc<Mutex<Recording>>,
}

impl HeadlessSurface {
    pub fn new() -> (Self, SurfaceProbe) {
        let recording = Arc::new(Mutex::new(Recording::default()));
        let surface = Self {
            recording: Arc::clone(&recording),
        };
        (surface, SurfaceProbe { recording })
    }

    fn recording(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Surface for HeadlessSurface {
    fn show(&mut self, spec: &WindowSpec) -> RuntimeResult<()> {
        let mut rec = self.recording();
        if rec.refuse_show {
            return Err(RuntimeError::unsupported("opening a window"));
        }
        rec.spec = Some(spec.clone());
        rec.shown = true;
        Ok(())
    }

    fn hide(&mut self) -> RuntimeResult<()> {
        self.recording().shown = false;
        Ok(())
    }

    fn configure(&mut self, spec: &WindowSpec) -> RuntimeResult<()> {
        let mut rec = self.recording();
        rec.spec = Some(spec.clone());
        rec.refreshes += 1;
        Ok(())
    }

    fn clear(&mut self, background: Color) -> RuntimeResult<()> {
        let mut rec = self.recording();
        rec.commands.clear();
        if let Some(spec) = rec.spec.as_mut() {
            spec.background = background;
        }
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) -> RuntimeResult<()> {
        self.recording().commands.push(command.clone());
        Ok(())
    }

    fn place(&mut self, element: &Element) -> RuntimeResult<()> {
        self.recording()
            .elements
            .insert(element.name.clone(), element.clone());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> RuntimeResult<()> {
        self.recording().elements.remove(name);
        Ok(())
    }
}

impl SurfaceProbe {
    fn recording(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_shown(&self) -> bool {
        self.recording().shown
    }

    /// Make every following `show` fail
    pub fn refuse_show(&self) {
        self.recording().refuse_show = true;
    }

    pub fn spec(&self) -> Option<WindowSpec> {
        self.recording().spec.clone()
    }

    pub fn refreshes(&self) -> usize {
        self.recording().refreshes
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.recording().commands.clone()
    }

    pub fn last_command(&self) -> Option<DrawCommand> {
        self.recording().commands.last().cloned()
    }

    pub fn element(&self, name: &str) -> Option<Element> {
        self.recording().elements.get(name).cloned()
    }

    pub fn element_names(&self) -> Vec<String> {
        self.recording().elements.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_records_commands_until_clear() {
        let (mut surface, probe) = HeadlessSurface::new();
        let spec = WindowSpec {
            title: "t".into(),
            width: 10,
            height: 10,
            background: Color::WHITE,
            can_resize: false,
        };
        surface.show(&spec).unwrap();
        surface
            .draw(&DrawCommand::Pixel {
                at: (1.0, 1.0),
                color: Color::BLACK,
            })
            .unwrap();
        assert!(probe.is_shown());
        assert_eq!(probe.commands().len(), 1);

        surface.clear(Color::rgb(1, 2, 3)).unwrap();
        assert!(probe.commands().is_empty());
        assert_eq!(probe.spec().unwrap().background, Color::rgb(1, 2, 3));
    }
}
