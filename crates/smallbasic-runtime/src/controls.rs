//! The `Controls` class: buttons and text boxes on the graphics window.
//!
//! All control kinds share one counter, so names run `Button1`,
//! `TextBox2`, `MultiLineTextBox3` and so on. Controls can only be added
//! once the graphics window is showing.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{RuntimeError, RuntimeResult};
use crate::graphics_window::{EventHandler, GraphicsWindow};
use crate::handle::{Handle, HandleRegistry};
use crate::surface::{Element, ElementKind};

const BUTTON_SIZE: (f64, f64) = (75.0, 23.0);
const TEXT_BOX_SIZE: (f64, f64) = (100.0, 20.0);
const MULTI_LINE_TEXT_BOX_SIZE: (f64, f64) = (200.0, 200.0);

#[derive(Default)]
struct Activity {
    last_clicked: Option<String>,
    last_typed: Option<String>,
    button_clicked: Option<EventHandler>,
    text_typed: Option<EventHandler>,
}

pub struct Controls {
    registry: HandleRegistry<Element>,
    window: Arc<GraphicsWindow>,
    activity: Mutex<Activity>,
}

impl Controls {
    pub fn new(window: Arc<GraphicsWindow>) -> Self {
        Self {
            registry: HandleRegistry::new("Control", 1),
            window,
            activity: Mutex::new(Activity::default()),
        }
    }

    fn activity(&self) -> MutexGuard<'_, Activity> {
        self.activity.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, name: &str) -> RuntimeResult<()> {
        let element = self.registry.get(name)?;
        self.window
            .ui()
            .invoke(move |surface| surface.place(&element))
    }

    fn add(&self, prefix: &str, kind: ElementKind, left: f64, top: f64, size: (f64, f64)) -> RuntimeResult<Handle> {
        self.window.ensure_shown()?;
        let element = Element {
            name: String::new(),
            kind,
            left,
            top,
            width: size.0,
            height: size.1,
            angle: 0.0,
            opacity: 100.0,
            visible: true,
        };
        let handle = self.registry.add(prefix, element);
        self.registry
            .with_mut(&handle, |element| element.name = handle.to_string())?;
        tracing::debug!(name = %handle, left, top, "Added control");
        self.publish(&handle)?;
        Ok(handle)
    }

    pub fn add_button(&self, caption: &str, left: f64, top: f64) -> RuntimeResult<Handle> {
        let kind = ElementKind::Button {
            caption: caption.to_string(),
        };
        self.add("Button", kind, left, top, BUTTON_SIZE)
    }

    pub fn add_text_box(&self, left: f64, top: f64) -> RuntimeResult<Handle> {
        let kind = ElementKind::TextBox {
            text: String::new(),
            multi_line: false,
        };
        self.add("TextBox", kind, left, top, TEXT_BOX_SIZE)
    }

    pub fn add_multi_line_text_box(&self, left: f64, top: f64) -> RuntimeResult<Handle> {
        self.add_multi_line_text_box_with_size(
            left,
            top,
            MULTI_LINE_TEXT_BOX_SIZE.0,
            MULTI_LINE_TEXT_BOX_SIZE.1,
        )
    }

    pub fn add_multi_line_text_box_with_size(
        &self,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> RuntimeResult<Handle> {
        let kind = ElementKind::TextBox {
            text: String::new(),
            multi_line: true,
        };
        self.add("MultiLineTextBox", kind, left, top, (width, height))
    }

    pub fn get_text_box_text(&self, name: &str) -> RuntimeResult<String> {
        self.registry
            .with(name, |element| match &element.kind {
                ElementKind::TextBox { text, .. } => Some(text.clone()),
                _ => None,
            })?
            .ok_or_else(|| RuntimeError::not_found("Text box", name))
    }

    /// Replaces a text box's contents, which counts as typing into it
    pub fn set_text_box_text(&self, name: &str, text: &str) -> RuntimeResult<()> {
        self.registry
            .with_mut(name, |element| match &mut element.kind {
                ElementKind::TextBox { text: current, .. } => {
                    *current = text.to_string();
                    true
                }
                _ => false,
            })?
            .then_some(())
            .ok_or_else(|| RuntimeError::not_found("Text box", name))?;
        self.publish(name)?;
        self.fire_text_typed(name);
        Ok(())
    }

    pub fn get_button_caption(&self, name: &str) -> RuntimeResult<String> {
        self.registry
            .with(name, |element| match &element.kind {
                ElementKind::Button { caption } => Some(caption.clone()),
                _ => None,
            })?
            .ok_or_else(|| RuntimeError::not_found("Button", name))
    }

    pub fn set_button_caption(&self, name: &str, caption: &str) -> RuntimeResult<()> {
        self.registry
            .with_mut(name, |element| match &mut element.kind {
                ElementKind::Button { caption: current } => {
                    *current = caption.to_string();
                    true
                }
                _ => false,
            })?
            .then_some(())
            .ok_or_else(|| RuntimeError::not_found("Button", name))?;
        self.publish(name)
    }

    pub fn move_control(&self, name: &str, left: f64, top: f64) -> RuntimeResult<()> {
        self.registry.with_mut(name, |element| {
            element.left = left;
            element.top = top;
        })?;
        self.publish(name)
    }

    pub fn set_size(&self, name: &str, width: f64, height: f64) -> RuntimeResult<()> {
        if !(width >= 0.0 && height >= 0.0) {
            return Err(RuntimeError::invalid_argument(format!(
                "size {width}x{height} is negative"
            )));
        }
        self.registry.with_mut(name, |element| {
            element.width = width;
            element.height = height;
        })?;
        self.publish(name)
    }

    pub fn remove_control(&self, name: &str) -> RuntimeResult<bool> {
        if !self.registry.remove(name) {
            return Ok(false);
        }
        let owned = name.to_string();
        self.window
            .ui()
            .invoke(move |surface| surface.remove(&owned))?;
        Ok(true)
    }

    pub fn last_clicked_button(&self) -> String {
        self.activity().last_clicked.clone().unwrap_or_default()
    }

    pub fn last_typed_text_box(&self) -> String {
        self.activity().last_typed.clone().unwrap_or_default()
    }

    pub fn on_button_clicked(&self, handler: EventHandler) {
        self.activity().button_clicked = Some(handler);
    }

    pub fn on_text_typed(&self, handler: EventHandler) {
        self.activity().text_typed = Some(handler);
    }

    /// Report a click on a button from the host window
    pub fn notify_click(&self, name: &str) -> RuntimeResult<()> {
        let is_button = self
            .registry
            .with(name, |element| matches!(element.kind, ElementKind::Button { .. }))?;
        if !is_button {
            return Err(RuntimeError::not_found("Button", name));
        }
        let handler = {
            let mut activity = self.activity();
            activity.last_clicked = Some(name.to_string());
            activity.button_clicked.clone()
        };
        if let Some(handler) = handler {
            handler();
        }
        Ok(())
    }

    /// Report text typed into a text box from the host window
    pub fn notify_text_changed(&self, name: &str, text: &str) -> RuntimeResult<()> {
        self.set_text_box_text(name, text)
    }

    fn fire_text_typed(&self, name: &str) {
        let handler = {
            let mut activity = self.activity();
            activity.last_typed = Some(name.to_string());
            activity.text_typed.clone()
        };
        if let Some(handler) = handler {
            handler();
        }
    }

    pub fn names(&self) -> Vec<Handle> {
        self.registry.names()
    }
}
