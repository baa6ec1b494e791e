use super::control::Control;
use super::event::{EventKind, InputEvent, Motion};
use super::{Dispatcher, DispatcherInner};
use crate::component::codes::mouse;
use crate::component::Component;
use crate::normalize::AxisMotion;
use chrono::{DateTime, Duration, Local};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Derives an extra value from every axis move of a binding.
pub enum MoveTransform {
    Scale(f64),
    Custom(Box<dyn Fn(f64) -> f64>),
}

impl MoveTransform {
    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        MoveTransform::Custom(Box::new(f))
    }

    fn apply(&self, motion: AxisMotion) -> AxisMotion {
        match self {
            MoveTransform::Scale(factor) => AxisMotion {
                v: motion.v * factor,
                dv: motion.dv * factor,
            },
            MoveTransform::Custom(f) => {
                let v = f(motion.v);
                AxisMotion {
                    v,
                    dv: v - f(motion.v - motion.dv),
                }
            }
        }
    }
}

impl fmt::Debug for MoveTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveTransform::Scale(factor) => f.debug_tuple("Scale").field(factor).finish(),
            MoveTransform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Ties one control to components on one dispatcher and tracks which of
/// those components it currently holds pressed.
pub struct Binding {
    control: Rc<Control>,
    dispatcher: Weak<DispatcherInner>,
    move_args: Vec<(String, MoveTransform)>,
    time_pressed: RefCell<HashMap<Component, DateTime<Local>>>,
}

impl Binding {
    pub(super) fn new(
        control: Rc<Control>,
        dispatcher: Weak<DispatcherInner>,
        move_args: Vec<(String, MoveTransform)>,
    ) -> Self {
        Self {
            control,
            dispatcher,
            move_args,
            time_pressed: RefCell::new(HashMap::new()),
        }
    }

    pub fn control(&self) -> &Rc<Control> {
        &self.control
    }

    pub fn dispatcher(&self) -> Option<Dispatcher> {
        self.dispatcher.upgrade().map(Dispatcher::from_inner)
    }

    pub fn is_pressed(&self, component: &str) -> bool {
        self.time_pressed.borrow().contains_key(component)
    }

    pub fn pressed_at(&self, component: &str) -> Option<DateTime<Local>> {
        self.time_pressed.borrow().get(component).copied()
    }

    pub(super) fn press(
        self: &Rc<Self>,
        component: &Component,
        device: Option<Rc<str>>,
        time: DateTime<Local>,
    ) {
        if !self.control.is_enabled() {
            return;
        }
        {
            let mut pressed = self.time_pressed.borrow_mut();
            if pressed.contains_key(component) {
                return;
            }
            pressed.insert(component.clone(), time);
        }

        let event = InputEvent::new(
            EventKind::Press,
            Rc::clone(self),
            component.clone(),
            device,
            time,
        );
        self.control.fire(&event);
    }

    pub(super) fn hold(
        self: &Rc<Self>,
        component: &Component,
        device: Option<Rc<str>>,
        duration: Option<Duration>,
        time: DateTime<Local>,
    ) {
        let Some(pressed_at) = self.pressed_at(component.as_str()) else {
            return;
        };
        if !self.control.is_enabled() {
            return;
        }

        let mut event = InputEvent::new(
            EventKind::Hold,
            Rc::clone(self),
            component.clone(),
            device,
            time,
        );
        event.duration = Some(duration.unwrap_or(time - pressed_at));
        self.control.fire(&event);
    }

    pub(super) fn release(
        self: &Rc<Self>,
        component: &Component,
        device: Option<Rc<str>>,
        duration: Option<Duration>,
        time: DateTime<Local>,
    ) {
        let Some(pressed_at) = self.time_pressed.borrow_mut().remove(component) else {
            return;
        };
        if !self.control.is_enabled() {
            return;
        }

        let mut event = InputEvent::new(
            EventKind::Release,
            Rc::clone(self),
            component.clone(),
            device,
            time,
        );
        event.duration = Some(duration.unwrap_or(time - pressed_at));
        self.control.fire(&event);
    }

    pub(super) fn moved(
        self: &Rc<Self>,
        component: &Component,
        device: Option<Rc<str>>,
        motion: Motion,
        time: DateTime<Local>,
    ) {
        if !self.control.is_enabled() {
            return;
        }
        let pointer = component.as_str() == mouse::MOVE;
        if !pointer && !self.is_pressed(component.as_str()) {
            return;
        }

        let mut event = InputEvent::new(
            EventKind::Move,
            Rc::clone(self),
            component.clone(),
            device,
            time,
        );
        if let (Motion::Axis(axis), false) = (motion, pointer) {
            for (name, transform) in &self.move_args {
                event.derived.insert(name.clone(), transform.apply(axis));
            }
        }
        event.motion = Some(motion);
        self.control.fire(&event);
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("control", &self.control)
            .field("move_args", &self.move_args)
            .field("time_pressed", &self.time_pressed.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_transform_scales_value_and_delta() {
        let out = MoveTransform::Scale(2.0).apply(AxisMotion { v: 0.5, dv: 0.25 });
        assert_eq!(out, AxisMotion { v: 1.0, dv: 0.5 });
    }

    #[test]
    fn custom_transform_delta_is_difference_of_images() {
        let square = MoveTransform::custom(|v| v * v);
        let out = square.apply(AxisMotion { v: 0.5, dv: 0.25 });
        assert!((out.v - 0.25).abs() < 1e-12);
        // 0.5^2 - 0.25^2
        assert!((out.dv - 0.1875).abs() < 1e-12);
    }
}
