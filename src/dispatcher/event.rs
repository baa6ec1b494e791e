use super::binding::Binding;
use super::control::Control;
use super::Dispatcher;
use crate::component::Component;
use crate::normalize::{AxisMotion, AxisTransition};
use chrono::{DateTime, Duration, Local};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Press,
    Hold,
    Release,
    Move,
}

/// Payload of a move event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Axis(AxisMotion),
    /// Pointer position and movement, in pointer units.
    Pointer { x: f64, y: f64, dx: f64, dy: f64 },
}

impl Motion {
    pub fn axis(v: f64, dv: f64) -> Self {
        Motion::Axis(AxisMotion { v, dv })
    }
}

/// What a bound control receives.
pub struct InputEvent {
    pub kind: EventKind,
    pub binding: Rc<Binding>,
    pub component: Component,
    pub device: Option<Rc<str>>,
    pub time: DateTime<Local>,
    /// Time since the press, set on hold and release.
    pub duration: Option<Duration>,
    pub motion: Option<Motion>,
    /// Values produced by the binding's move transforms, keyed by name.
    pub derived: BTreeMap<String, AxisMotion>,
}

impl InputEvent {
    pub(crate) fn new(
        kind: EventKind,
        binding: Rc<Binding>,
        component: Component,
        device: Option<Rc<str>>,
        time: DateTime<Local>,
    ) -> Self {
        Self {
            kind,
            binding,
            component,
            device,
            time,
            duration: None,
            motion: None,
            derived: BTreeMap::new(),
        }
    }

    pub fn control(&self) -> &Rc<Control> {
        self.binding.control()
    }

    /// The dispatcher that raised this event, unless it is gone already.
    pub fn dispatcher(&self) -> Option<Dispatcher> {
        self.binding.dispatcher()
    }

    /// Axis value of a move event.
    pub fn value(&self) -> Option<f64> {
        match self.motion {
            Some(Motion::Axis(m)) => Some(m.v),
            _ => None,
        }
    }

    pub fn delta(&self) -> Option<f64> {
        match self.motion {
            Some(Motion::Axis(m)) => Some(m.dv),
            _ => None,
        }
    }

    pub fn derived(&self, name: &str) -> Option<AxisMotion> {
        self.derived.get(name).copied()
    }
}

impl fmt::Debug for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputEvent")
            .field("kind", &self.kind)
            .field("component", &self.component)
            .field("device", &self.device)
            .field("time", &self.time)
            .field("duration", &self.duration)
            .field("motion", &self.motion)
            .field("derived", &self.derived)
            .finish()
    }
}

/// An event before it is fanned out to bindings. Trackers collect these
/// while their state is borrowed and hand them over afterwards.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Signal {
    Press(Component),
    Hold(Component, Option<Duration>),
    Release(Component, Option<Duration>),
    Move(Component, Motion),
}

impl Signal {
    /// Press, move and release in the order a transition implies.
    pub(crate) fn push_transition(
        signals: &mut Vec<Signal>,
        component: &Component,
        transition: &AxisTransition,
    ) {
        if transition.pressed {
            signals.push(Signal::Press(component.clone()));
        }
        if let Some(motion) = transition.motion {
            signals.push(Signal::Move(component.clone(), Motion::Axis(motion)));
        }
        if transition.released {
            signals.push(Signal::Release(component.clone(), None));
        }
    }
}
