use super::control::Control;
use super::{Components, Dispatcher};
use crate::component::Component;
use std::rc::Rc;
use tracing::{info, warn};

/// Analog dead zone while waiting for the new component, so stick drift
/// does not get captured.
pub const REBIND_DEAD_ZONE: f64 = 0.625;

pub(crate) struct PendingRebind {
    target: Rc<Control>,
    capture: Rc<Control>,
    dead_zone: f64,
}

impl Dispatcher {
    /// Unbinds `control` and binds it to whichever component is pressed
    /// next. Returns `false` if another rebind is still waiting.
    pub fn rebind(&self, control: &Rc<Control>) -> bool {
        if self.is_rebinding() {
            warn!(
                "Rebind of {:?} rejected, another rebind is pending",
                control.label()
            );
            return false;
        }

        let capture = Control::builder()
            .label("rebind capture")
            .on_press(|event| {
                if let Some(dispatcher) = event.dispatcher() {
                    dispatcher.finish_rebind(event.component.clone());
                }
            })
            .build();

        let dead_zone = self.settings().analog.dead_zone;
        self.update_settings(|s| s.analog.dead_zone = REBIND_DEAD_ZONE);
        self.unbind(control, Components::All);
        self.bind(&capture, Components::All);

        *self.inner.rebind.borrow_mut() = Some(PendingRebind {
            target: Rc::clone(control),
            capture,
            dead_zone,
        });
        info!("Waiting for a component to rebind {:?}", control.label());
        true
    }

    pub fn is_rebinding(&self) -> bool {
        self.inner.rebind.borrow().is_some()
    }

    /// Drops a pending rebind. The control stays unbound.
    pub fn cancel_rebind(&self) {
        if let Some(pending) = self.inner.rebind.borrow_mut().take() {
            self.unbind(&pending.capture, Components::All);
            self.update_settings(|s| s.analog.dead_zone = pending.dead_zone);
            info!("Rebind of {:?} cancelled", pending.target.label());
        }
    }

    fn finish_rebind(&self, component: Component) {
        let Some(pending) = self.inner.rebind.borrow_mut().take() else {
            return;
        };
        self.unbind(&pending.capture, Components::All);
        self.bind(&pending.target, component.clone());
        self.update_settings(|s| s.analog.dead_zone = pending.dead_zone);
        info!("Rebound {:?} to {}", pending.target.label(), component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::codes::keyboard;
    use crate::hub::InputHub;
    use std::cell::Cell;

    #[test]
    fn next_press_becomes_the_binding() {
        let hub = InputHub::new();
        let d = Dispatcher::new(&hub);
        let presses = Rc::new(Cell::new(0));
        let counter = presses.clone();
        let jump = Control::builder()
            .label("jump")
            .on_press(move |_| counter.set(counter.get() + 1))
            .build();
        d.bind(&jump, keyboard::SPACE);

        assert!(d.rebind(&jump));
        assert!(!d.is_bound(&jump, keyboard::SPACE));
        assert_eq!(d.settings().analog.dead_zone, REBIND_DEAD_ZONE);

        d.press(keyboard::ENTER, None);
        assert!(!d.is_rebinding());
        assert!(d.is_bound(&jump, keyboard::ENTER));
        assert_eq!(d.listener_count(keyboard::SPACE), 0);
        assert_eq!(d.settings().analog.dead_zone, 0.1);
        // the capturing press is not delivered to the rebound control
        assert_eq!(presses.get(), 0);

        d.release(keyboard::ENTER, None, None);
        d.press(keyboard::ENTER, None);
        assert_eq!(presses.get(), 1);
    }

    #[test]
    fn second_rebind_is_rejected() {
        let hub = InputHub::new();
        let d = Dispatcher::new(&hub);
        let a = Control::builder().label("a").build();
        let b = Control::builder().label("b").build();
        d.bind(&b, "B");

        assert!(d.rebind(&a));
        assert!(!d.rebind(&b));
        assert!(d.is_bound(&b, "B"));
    }

    #[test]
    fn cancel_restores_dead_zone() {
        let hub = InputHub::new();
        let d = Dispatcher::new(&hub);
        let a = Control::builder().build();
        d.rebind(&a);
        d.cancel_rebind();
        assert!(!d.is_rebinding());
        assert_eq!(d.settings().analog.dead_zone, 0.1);
        assert_eq!(d.listener_count("A"), 0);
    }
}
