//! Keyboard and pointer helpers.
//!
//! Keys and mouse buttons are digital: a press moves the value to 1 and a
//! release back to 0. Pointer movement needs no press and carries the
//! position and movement in its payload.

use super::event::{Motion, Signal};
use super::Dispatcher;
use crate::component::codes::mouse;
use crate::component::Component;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub fn component(self) -> &'static str {
        match self {
            MouseButton::Left => mouse::LEFT_BUTTON,
            MouseButton::Middle => mouse::MIDDLE_BUTTON,
            MouseButton::Right => mouse::RIGHT_BUTTON,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct PointerState {
    down: HashSet<Component>,
    position: Option<(f64, f64)>,
}

impl Dispatcher {
    /// Presses `key`. Repeats while the key is already down are ignored.
    pub fn key_down(&self, key: impl Into<Component>) {
        self.digital_down(key.into());
    }

    pub fn key_up(&self, key: impl Into<Component>) {
        self.digital_up(key.into());
    }

    pub fn button_down(&self, button: MouseButton) {
        self.digital_down(Component::from(button.component()));
    }

    pub fn button_up(&self, button: MouseButton) {
        self.digital_up(Component::from(button.component()));
    }

    /// A wheel step. Negative `delta` scrolls up.
    pub fn scroll(&self, delta: f64) {
        let (code, direction) = if delta < 0.0 {
            (mouse::SCROLL_UP, -1.0)
        } else {
            (mouse::SCROLL_DOWN, 1.0)
        };
        let component = Component::from(code);
        self.emit(vec![
            Signal::Press(component.clone()),
            Signal::Move(component.clone(), Motion::axis(delta, direction)),
            Signal::Release(component, None),
        ]);
    }

    /// Moves the pointer to `(x, y)`. Without an explicit `movement` the
    /// delta is taken from the previous position.
    pub fn pointer_move(&self, x: f64, y: f64, movement: Option<(f64, f64)>) {
        let (dx, dy) = {
            let mut pointer = self.inner.pointer.borrow_mut();
            let delta = movement.unwrap_or_else(|| match pointer.position {
                Some((ox, oy)) => (x - ox, y - oy),
                None => (0.0, 0.0),
            });
            pointer.position = Some((x, y));
            delta
        };
        self.emit(vec![Signal::Move(
            Component::from(mouse::MOVE),
            Motion::Pointer { x, y, dx, dy },
        )]);
    }

    pub fn pointer_position(&self) -> Option<(f64, f64)> {
        self.inner.pointer.borrow().position
    }

    fn digital_down(&self, component: Component) {
        if !self.inner.pointer.borrow_mut().down.insert(component.clone()) {
            return;
        }
        self.inner.hub.with_values(|values| values.set(&component, 1.0));
        self.emit(vec![
            Signal::Press(component.clone()),
            Signal::Move(component, Motion::axis(1.0, 1.0)),
        ]);
    }

    fn digital_up(&self, component: Component) {
        self.inner.pointer.borrow_mut().down.remove(&component);
        self.inner.hub.with_values(|values| values.remove(component.as_str()));
        self.emit(vec![
            Signal::Move(component.clone(), Motion::axis(0.0, -1.0)),
            Signal::Release(component, None),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::codes::keyboard;
    use crate::dispatcher::{Components, Control};
    use crate::hub::InputHub;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(d: &Dispatcher, components: &[&str]) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (p, m, r) = (log.clone(), log.clone(), log.clone());
        let control = Control::builder()
            .on_press(move |e| p.borrow_mut().push(format!("press {}", e.component)))
            .on_move(move |e| {
                let text = match e.motion {
                    Some(Motion::Axis(a)) => format!("move {} {} {}", e.component, a.v, a.dv),
                    Some(Motion::Pointer { x, y, dx, dy }) => {
                        format!("pointer {} {} {} {}", x, y, dx, dy)
                    }
                    None => String::new(),
                };
                m.borrow_mut().push(text)
            })
            .on_release(move |e| r.borrow_mut().push(format!("release {}", e.component)))
            .build();
        d.bind(&control, Components::from(components));
        log
    }

    #[test]
    fn key_repeat_is_suppressed() {
        let hub = InputHub::new();
        let d = Dispatcher::new(&hub);
        let log = recording(&d, &[keyboard::SHIFT]);

        d.key_down(keyboard::SHIFT);
        d.key_down(keyboard::SHIFT);
        d.key_up(keyboard::SHIFT);

        assert_eq!(
            *log.borrow(),
            vec![
                "press Shift",
                "move Shift 1 1",
                "move Shift 0 -1",
                "release Shift"
            ]
        );
        assert_eq!(hub.value(keyboard::SHIFT), None);
    }

    #[test]
    fn scroll_is_a_full_click() {
        let hub = InputHub::new();
        let d = Dispatcher::new(&hub);
        let log = recording(&d, &[mouse::SCROLL_UP, mouse::SCROLL_DOWN]);

        d.scroll(-120.0);
        d.scroll(3.0);
        assert_eq!(
            *log.borrow(),
            vec![
                "press Mouse Scroll Up",
                "move Mouse Scroll Up -120 -1",
                "release Mouse Scroll Up",
                "press Mouse Scroll Down",
                "move Mouse Scroll Down 3 1",
                "release Mouse Scroll Down"
            ]
        );
    }

    #[test]
    fn pointer_moves_without_press() {
        let hub = InputHub::new();
        let d = Dispatcher::new(&hub);
        let log = recording(&d, &[mouse::MOVE]);

        d.pointer_move(10.0, 20.0, None);
        d.pointer_move(13.0, 16.0, None);
        d.pointer_move(13.0, 16.0, Some((5.0, 5.0)));

        assert_eq!(
            *log.borrow(),
            vec!["pointer 10 20 0 0", "pointer 13 16 3 -4", "pointer 13 16 5 5"]
        );
        assert_eq!(d.pointer_position(), Some((13.0, 16.0)));
    }

    #[test]
    fn mouse_buttons_hold_value_while_down() {
        let hub = InputHub::new();
        let d = Dispatcher::new(&hub);
        d.button_down(MouseButton::Left);
        assert_eq!(hub.value(mouse::LEFT_BUTTON), Some(1.0));
        d.button_up(MouseButton::Left);
        assert_eq!(hub.value(mouse::LEFT_BUTTON), None);
    }
}
