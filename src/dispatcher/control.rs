use super::event::{EventKind, InputEvent};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

type Callback = Box<dyn Fn(&InputEvent)>;

/// Application handler for input events.
///
/// A control is inert: press timestamps and transforms live in the binding
/// that ties it to components. One control can be bound on many dispatchers
/// and is identified by its `Rc`.
pub struct Control {
    label: Option<String>,
    enabled: Cell<bool>,
    on_press: Option<Callback>,
    on_hold: Option<Callback>,
    on_release: Option<Callback>,
    on_move: Option<Callback>,
}

impl Control {
    pub fn builder() -> ControlBuilder {
        ControlBuilder::default()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub(crate) fn fire(&self, event: &InputEvent) {
        let callback = match event.kind {
            EventKind::Press => &self.on_press,
            EventKind::Hold => &self.on_hold,
            EventKind::Release => &self.on_release,
            EventKind::Move => &self.on_move,
        };
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("label", &self.label)
            .field("enabled", &self.enabled.get())
            .field("on_press", &self.on_press.is_some())
            .field("on_hold", &self.on_hold.is_some())
            .field("on_release", &self.on_release.is_some())
            .field("on_move", &self.on_move.is_some())
            .finish()
    }
}

pub struct ControlBuilder {
    label: Option<String>,
    enabled: bool,
    on_press: Option<Callback>,
    on_hold: Option<Callback>,
    on_release: Option<Callback>,
    on_move: Option<Callback>,
}

impl Default for ControlBuilder {
    fn default() -> Self {
        Self {
            label: None,
            enabled: true,
            on_press: None,
            on_hold: None,
            on_release: None,
            on_move: None,
        }
    }
}

impl ControlBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn on_press(mut self, f: impl Fn(&InputEvent) + 'static) -> Self {
        self.on_press = Some(Box::new(f));
        self
    }

    pub fn on_hold(mut self, f: impl Fn(&InputEvent) + 'static) -> Self {
        self.on_hold = Some(Box::new(f));
        self
    }

    pub fn on_release(mut self, f: impl Fn(&InputEvent) + 'static) -> Self {
        self.on_release = Some(Box::new(f));
        self
    }

    pub fn on_move(mut self, f: impl Fn(&InputEvent) + 'static) -> Self {
        self.on_move = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Rc<Control> {
        Rc::new(Control {
            label: self.label,
            enabled: Cell::new(self.enabled),
            on_press: self.on_press,
            on_hold: self.on_hold,
            on_release: self.on_release,
            on_move: self.on_move,
        })
    }
}
