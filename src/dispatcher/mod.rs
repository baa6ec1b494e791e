//! Listener tables and the per-binding press state machine.
//!
//! ```text
//!            press             release
//!   Idle ───────────► Pressed ─────────► Idle
//!                      │   ▲
//!                      └───┘ hold / move
//! ```
//!
//! Every state change is tracked per (binding, component). Callbacks run
//! with no dispatcher state borrowed, so a control may bind, unbind,
//! rebind or calibrate from inside its own handler.

pub mod binding;
pub mod control;
pub mod event;
mod poll_loop;
pub mod pointer;
mod rebind;

pub use binding::{Binding, MoveTransform};
pub use control::{Control, ControlBuilder};
pub use event::{EventKind, InputEvent, Motion};
pub use pointer::MouseButton;
pub use rebind::REBIND_DEAD_ZONE;

use crate::component::Component;
use crate::config::DispatcherSettings;
use crate::device::gamepad::{GamepadSource, GamepadTracker};
use crate::hub::InputHub;
use crate::motion::{
    AxisCalibration, MotionFilters, MotionSample, MotionTracker, OrientationSample,
    OrientationTracker,
};
use crate::normalize::sanitize_dead_zone;
use chrono::{DateTime, Duration, Local};
use event::Signal;
use pointer::PointerState;
use rebind::PendingRebind;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Which components a bind or unbind applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Components {
    /// Every registered component.
    All,
    One(Component),
    Many(Vec<Component>),
}

impl From<&str> for Components {
    fn from(name: &str) -> Self {
        Components::One(Component::from(name))
    }
}

impl From<String> for Components {
    fn from(name: String) -> Self {
        Components::One(Component::from(name))
    }
}

impl From<Component> for Components {
    fn from(component: Component) -> Self {
        Components::One(component)
    }
}

impl From<&Component> for Components {
    fn from(component: &Component) -> Self {
        Components::One(component.clone())
    }
}

impl From<Vec<Component>> for Components {
    fn from(components: Vec<Component>) -> Self {
        Components::Many(components)
    }
}

impl From<&[&str]> for Components {
    fn from(names: &[&str]) -> Self {
        Components::Many(names.iter().map(|n| Component::from(*n)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Components {
    fn from(names: [&str; N]) -> Self {
        Components::Many(names.iter().map(|n| Component::from(*n)).collect())
    }
}

#[derive(Debug, Default)]
pub struct BindOptions {
    /// Named values derived from every axis move.
    pub move_args: Vec<(String, MoveTransform)>,
    /// Put the binding ahead of existing ones.
    pub prepend: bool,
}

impl BindOptions {
    pub fn transform(mut self, name: impl Into<String>, transform: MoveTransform) -> Self {
        self.move_args.push((name.into(), transform));
        self
    }

    pub fn prepend(mut self) -> Self {
        self.prepend = true;
        self
    }
}

/// Routes component events to bound controls.
///
/// Cheap to clone; clones share state. A dispatcher stays registered with
/// its hub until [`Dispatcher::dispose`] is called or the last clone is
/// dropped.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Rc<DispatcherInner>,
}

pub(crate) struct DispatcherInner {
    id: u64,
    hub: InputHub,
    settings: Cell<DispatcherSettings>,
    listeners: RefCell<HashMap<Component, Vec<Rc<Binding>>>>,
    rebind: RefCell<Option<PendingRebind>>,
    polling: Cell<bool>,
    disposed: Cell<bool>,
    orientation: RefCell<OrientationTracker>,
    motion: RefCell<MotionTracker>,
    gamepads: RefCell<GamepadTracker>,
    gamepad_source: RefCell<Option<Box<dyn GamepadSource>>>,
    pointer: RefCell<PointerState>,
}

fn sanitize(mut settings: DispatcherSettings) -> DispatcherSettings {
    settings.analog.dead_zone = sanitize_dead_zone(settings.analog.dead_zone, "Analog");
    if settings.poll_rate_ms == 0 {
        warn!("Poll rate of 0 ms is not usable, using 1 ms");
        settings.poll_rate_ms = 1;
    }
    settings
}

impl Dispatcher {
    pub fn new(hub: &InputHub) -> Self {
        Self::with_settings(hub, hub.settings().dispatcher)
    }

    pub fn with_settings(hub: &InputHub, settings: DispatcherSettings) -> Self {
        let id = hub.next_dispatcher_id();
        let inner = Rc::new(DispatcherInner {
            id,
            hub: hub.clone(),
            settings: Cell::new(sanitize(settings)),
            listeners: RefCell::new(HashMap::new()),
            rebind: RefCell::new(None),
            polling: Cell::new(false),
            disposed: Cell::new(false),
            orientation: RefCell::new(OrientationTracker::new()),
            motion: RefCell::new(MotionTracker::new()),
            gamepads: RefCell::new(GamepadTracker::new()),
            gamepad_source: RefCell::new(None),
            pointer: RefCell::new(PointerState::default()),
        });
        hub.attach(id, &inner);
        info!(
            "Dispatcher {} created, polling every {} ms",
            id, settings.poll_rate_ms
        );
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<DispatcherInner>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn hub(&self) -> &InputHub {
        &self.inner.hub
    }

    pub fn settings(&self) -> DispatcherSettings {
        self.inner.settings.get()
    }

    pub fn update_settings(&self, f: impl FnOnce(&mut DispatcherSettings)) {
        let mut settings = self.inner.settings.get();
        f(&mut settings);
        self.inner.settings.set(sanitize(settings));
    }

    pub fn is_enabled(&self) -> bool {
        self.settings().enabled && !self.is_disposed()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.update_settings(|s| s.enabled = enabled);
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn same(&self, other: &Dispatcher) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    //
    // binding
    //

    pub fn bind(&self, control: &Rc<Control>, components: impl Into<Components>) -> Rc<Binding> {
        self.bind_with(control, components, BindOptions::default())
    }

    /// Binds `control` to `components`. A component the control is already
    /// bound to keeps its existing binding; unregistered components are
    /// skipped.
    pub fn bind_with(
        &self,
        control: &Rc<Control>,
        components: impl Into<Components>,
        options: BindOptions,
    ) -> Rc<Binding> {
        let binding = Rc::new(Binding::new(
            Rc::clone(control),
            Rc::downgrade(&self.inner),
            options.move_args,
        ));

        let components = self.resolve(components.into());
        let mut listeners = self.inner.listeners.borrow_mut();
        for component in components {
            let list = listeners.entry(component).or_default();
            if list.iter().any(|b| Rc::ptr_eq(b.control(), control)) {
                continue;
            }
            if options.prepend {
                list.insert(0, Rc::clone(&binding));
            } else {
                list.push(Rc::clone(&binding));
            }
        }

        binding
    }

    pub fn unbind(&self, control: &Rc<Control>, components: impl Into<Components>) {
        let components = self.resolve(components.into());
        let mut listeners = self.inner.listeners.borrow_mut();
        for component in components {
            let Some(list) = listeners.get_mut(&component) else {
                continue;
            };
            if let Some(i) = list.iter().position(|b| Rc::ptr_eq(b.control(), control)) {
                list.remove(i);
            }
            if list.is_empty() {
                listeners.remove(&component);
            }
        }
    }

    pub fn is_bound(&self, control: &Rc<Control>, component: &str) -> bool {
        self.inner
            .listeners
            .borrow()
            .get(component)
            .is_some_and(|list| list.iter().any(|b| Rc::ptr_eq(b.control(), control)))
    }

    /// Number of bindings listening on `component`.
    pub fn listener_count(&self, component: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .get(component)
            .map_or(0, Vec::len)
    }

    fn resolve(&self, components: Components) -> Vec<Component> {
        let hub = &self.inner.hub;
        let known = |component: Component| {
            if hub.is_registered(component.as_str()) {
                Some(component)
            } else {
                debug!("Ignoring unregistered component {}", component);
                None
            }
        };

        match components {
            Components::All => hub.components(),
            Components::One(component) => known(component).into_iter().collect(),
            Components::Many(list) => list.into_iter().filter_map(known).collect(),
        }
    }

    //
    // events
    //

    pub fn press(&self, component: impl Into<Component>, time: Option<DateTime<Local>>) {
        let time = time.unwrap_or_else(|| self.inner.hub.now());
        self.dispatch(Signal::Press(component.into()), time);
    }

    /// Raises hold on every binding that has `component` pressed. The
    /// duration defaults to the time since the press.
    pub fn hold(
        &self,
        component: impl Into<Component>,
        duration: Option<Duration>,
        time: Option<DateTime<Local>>,
    ) {
        let time = time.unwrap_or_else(|| self.inner.hub.now());
        self.dispatch(Signal::Hold(component.into(), duration), time);
    }

    pub fn release(
        &self,
        component: impl Into<Component>,
        duration: Option<Duration>,
        time: Option<DateTime<Local>>,
    ) {
        let time = time.unwrap_or_else(|| self.inner.hub.now());
        self.dispatch(Signal::Release(component.into(), duration), time);
    }

    pub fn moved(
        &self,
        component: impl Into<Component>,
        motion: Motion,
        time: Option<DateTime<Local>>,
    ) {
        let time = time.unwrap_or_else(|| self.inner.hub.now());
        self.dispatch(Signal::Move(component.into(), motion), time);
    }

    pub(crate) fn emit(&self, signals: Vec<Signal>) {
        if signals.is_empty() {
            return;
        }
        let time = self.inner.hub.now();
        for signal in signals {
            self.dispatch(signal, time);
        }
    }

    pub(crate) fn dispatch(&self, signal: Signal, time: DateTime<Local>) {
        if !self.is_enabled() {
            return;
        }

        let component = match &signal {
            Signal::Press(c) | Signal::Hold(c, _) | Signal::Release(c, _) | Signal::Move(c, _) => {
                c
            }
        };
        let bindings = match self.inner.listeners.borrow().get(component) {
            Some(list) => list.clone(),
            None => return,
        };
        let device = self.inner.hub.device_of(component.as_str());

        for binding in bindings {
            match &signal {
                Signal::Press(c) => binding.press(c, device.clone(), time),
                Signal::Hold(c, duration) => binding.hold(c, device.clone(), *duration, time),
                Signal::Release(c, duration) => {
                    binding.release(c, device.clone(), *duration, time)
                }
                Signal::Move(c, motion) => binding.moved(c, device.clone(), *motion, time),
            }
        }
    }

    //
    // polling
    //

    /// One poll tick: hold for every component in the async value table,
    /// then the gamepad diff.
    pub fn poll(&self) {
        if self.inner.polling.replace(true) {
            warn!("Dispatcher {} poll re-entered from a callback, skipping", self.id());
            return;
        }

        if self.is_enabled() {
            let time = self.inner.hub.now();
            for component in self.inner.hub.active_components() {
                self.dispatch(Signal::Hold(component, None), time);
            }
            self.poll_gamepads();
        }

        self.inner.polling.set(false);
    }

    pub fn set_gamepad_source(&self, source: impl GamepadSource + 'static) {
        *self.inner.gamepad_source.borrow_mut() = Some(Box::new(source));
        info!("Dispatcher {} gamepad source attached", self.id());
    }

    pub fn clear_gamepad_source(&self) {
        self.inner.gamepad_source.borrow_mut().take();
    }

    pub fn connected_gamepads(&self) -> usize {
        self.inner.gamepads.borrow().connected()
    }

    fn poll_gamepads(&self) {
        let snapshots = match self.inner.gamepad_source.borrow_mut().as_mut() {
            Some(source) => source.snapshots(),
            None => return,
        };
        let analog = self.settings().analog;
        let signals = self.inner.hub.with_values(|values| {
            self.inner
                .gamepads
                .borrow_mut()
                .tick(&snapshots, &analog, values)
        });
        self.emit(signals);
    }

    //
    // orientation and motion
    //

    pub fn handle_orientation(&self, sample: OrientationSample) {
        if self.is_disposed() {
            return;
        }
        let settings = self.settings().orientation;
        let signals = self.inner.hub.with_values(|values| {
            self.inner
                .orientation
                .borrow_mut()
                .update(&sample, &settings, values)
        });
        self.emit(signals);
    }

    pub fn handle_motion(&self, sample: MotionSample) {
        if self.is_disposed() {
            return;
        }
        let settings = self.settings().motion;
        let matrix = *self.inner.orientation.borrow().matrix();
        let signals = self.inner.hub.with_values(|values| {
            self.inner
                .motion
                .borrow_mut()
                .update(&sample, &settings, &matrix, values)
        });
        self.emit(signals);
    }

    pub fn set_motion_filters(&self, filters: MotionFilters) {
        self.inner.motion.borrow_mut().set_filters(filters);
    }

    /// Takes the given angles, or the last reported ones, as the new zero.
    pub fn calibrate_orientation(&self, x: AxisCalibration, y: AxisCalibration, z: AxisCalibration) {
        self.inner.orientation.borrow_mut().calibrate([x, y, z]);
    }

    pub fn calibrate_acceleration(
        &self,
        x: AxisCalibration,
        y: AxisCalibration,
        z: AxisCalibration,
    ) {
        self.inner
            .motion
            .borrow_mut()
            .calibrate_acceleration([x, y, z]);
    }

    pub fn calibrate_acceleration_with_gravity(
        &self,
        x: AxisCalibration,
        y: AxisCalibration,
        z: AxisCalibration,
    ) {
        self.inner
            .motion
            .borrow_mut()
            .calibrate_acceleration_with_gravity([x, y, z]);
    }

    pub fn calibrate_rotation(&self, x: AxisCalibration, y: AxisCalibration, z: AxisCalibration) {
        self.inner.motion.borrow_mut().calibrate_rotation([x, y, z]);
    }

    pub fn calibrate_position(&self, x: AxisCalibration, y: AxisCalibration, z: AxisCalibration) {
        self.inner.motion.borrow_mut().calibrate_position([x, y, z]);
    }

    /// Orientation calibration offsets in radians.
    pub fn orientation_calibration(&self) -> [f64; 3] {
        self.inner.orientation.borrow().calibration()
    }

    pub fn velocity(&self) -> [f64; 3] {
        self.inner.motion.borrow().velocity()
    }

    pub fn position(&self) -> [f64; 3] {
        self.inner.motion.borrow().position()
    }

    //
    // lifecycle
    //

    /// Detaches from the hub, drops every binding and stops the poll loop.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.inner.hub.detach(self.id());
        self.inner.listeners.borrow_mut().clear();
        self.inner.rebind.borrow_mut().take();
        self.inner.gamepad_source.borrow_mut().take();
        info!("Dispatcher {} disposed", self.id());
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("id", &self.inner.id)
            .field("settings", &self.inner.settings.get())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::component::codes::{gamepad, keyboard};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log) -> Rc<Control> {
        let (p, h, r, m) = (log.clone(), log.clone(), log.clone(), log.clone());
        Control::builder()
            .on_press(move |e| p.borrow_mut().push(format!("press {}", e.component)))
            .on_hold(move |e| {
                h.borrow_mut().push(format!(
                    "hold {} {}",
                    e.component,
                    e.duration.map_or(-1, |d| d.num_milliseconds())
                ))
            })
            .on_release(move |e| {
                r.borrow_mut().push(format!(
                    "release {} {}",
                    e.component,
                    e.duration.map_or(-1, |d| d.num_milliseconds())
                ))
            })
            .on_move(move |e| m.borrow_mut().push(format!("move {}", e.component)))
            .build()
    }

    fn setup() -> (Rc<ManualClock>, InputHub, Dispatcher) {
        let clock = Rc::new(ManualClock::default());
        let hub = InputHub::with_clock(clock.clone());
        let dispatcher = Dispatcher::new(&hub);
        (clock, hub, dispatcher)
    }

    #[test]
    fn press_hold_release_reports_durations() {
        let (clock, _hub, d) = setup();
        let log = Log::default();
        d.bind(&recorder(&log), keyboard::SPACE);

        d.press(keyboard::SPACE, None);
        clock.advance_ms(50);
        d.hold(keyboard::SPACE, None, None);
        clock.advance_ms(50);
        d.release(keyboard::SPACE, None, None);

        assert_eq!(
            *log.borrow(),
            vec!["press Space", "hold Space 50", "release Space 100"]
        );
    }

    #[test]
    fn second_press_without_release_is_ignored() {
        let (_clock, _hub, d) = setup();
        let log = Log::default();
        d.bind(&recorder(&log), keyboard::SPACE);

        d.press(keyboard::SPACE, None);
        d.press(keyboard::SPACE, None);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn explicit_duration_overrides_clock() {
        let (_clock, _hub, d) = setup();
        let log = Log::default();
        d.bind(&recorder(&log), keyboard::SPACE);
        d.press(keyboard::SPACE, None);
        d.release(keyboard::SPACE, Some(Duration::milliseconds(7)), None);
        assert_eq!(log.borrow().last().map(String::as_str), Some("release Space 7"));
    }

    #[test]
    fn hold_and_move_need_a_press() {
        let (_clock, _hub, d) = setup();
        let log = Log::default();
        d.bind(&recorder(&log), keyboard::SPACE);

        d.hold(keyboard::SPACE, None, None);
        d.moved(keyboard::SPACE, Motion::axis(1.0, 1.0), None);
        d.release(keyboard::SPACE, None, None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn bind_is_idempotent_and_unbind_reclaims() {
        let (_clock, _hub, d) = setup();
        let log = Log::default();
        let control = recorder(&log);

        d.bind(&control, keyboard::SPACE);
        d.bind(&control, keyboard::SPACE);
        assert_eq!(d.listener_count(keyboard::SPACE), 1);

        d.unbind(&control, keyboard::SPACE);
        assert_eq!(d.listener_count(keyboard::SPACE), 0);
        assert!(!d.is_bound(&control, keyboard::SPACE));
    }

    #[test]
    fn unknown_components_are_skipped() {
        let (_clock, _hub, d) = setup();
        let control = recorder(&Log::default());
        d.bind(&control, "No Such Thing");
        assert_eq!(d.listener_count("No Such Thing"), 0);
    }

    #[test]
    fn prepend_runs_first() {
        let (_clock, _hub, d) = setup();
        let order = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (order.clone(), order.clone());
        let first = Control::builder()
            .on_press(move |_| a.borrow_mut().push("first"))
            .build();
        let second = Control::builder()
            .on_press(move |_| b.borrow_mut().push("second"))
            .build();

        d.bind(&second, keyboard::ENTER);
        d.bind_with(&first, keyboard::ENTER, BindOptions::default().prepend());
        d.press(keyboard::ENTER, None);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn disabled_control_releases_silently() {
        let (_clock, _hub, d) = setup();
        let log = Log::default();
        let control = recorder(&log);
        let binding = d.bind(&control, keyboard::SPACE);

        d.press(keyboard::SPACE, None);
        control.set_enabled(false);
        d.release(keyboard::SPACE, None, None);
        control.set_enabled(true);

        assert!(!binding.is_pressed(keyboard::SPACE));
        assert_eq!(*log.borrow(), vec!["press Space"]);
    }

    #[test]
    fn disabled_dispatcher_raises_nothing() {
        let (_clock, _hub, d) = setup();
        let log = Log::default();
        d.bind(&recorder(&log), keyboard::SPACE);
        d.set_enabled(false);
        d.press(keyboard::SPACE, None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn move_transforms_fill_derived_values() {
        let (_clock, _hub, d) = setup();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let control = Control::builder()
            .on_move(move |e| *sink.borrow_mut() = e.derived("speed"))
            .build();
        d.bind_with(
            &control,
            gamepad::LEFT_STICK_X,
            BindOptions::default().transform("speed", MoveTransform::Scale(10.0)),
        );

        d.press(gamepad::LEFT_STICK_X, None);
        d.moved(gamepad::LEFT_STICK_X, Motion::axis(0.5, 0.25), None);
        let derived = seen.borrow().unwrap();
        assert_eq!((derived.v, derived.dv), (5.0, 2.5));
    }

    #[test]
    fn callbacks_may_unbind_themselves() {
        let (_clock, _hub, d) = setup();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let control = Control::builder()
            .on_press(move |e| {
                counter.set(counter.get() + 1);
                if let Some(d) = e.dispatcher() {
                    d.unbind(e.control(), e.component.clone());
                }
            })
            .build();
        d.bind(&control, keyboard::TAB);

        d.press(keyboard::TAB, None);
        d.release(keyboard::TAB, None, None);
        d.press(keyboard::TAB, None);
        assert_eq!(count.get(), 1);
        assert_eq!(d.listener_count(keyboard::TAB), 0);
    }

    #[test]
    fn poll_holds_active_components() {
        let (clock, hub, d) = setup();
        let log = Log::default();
        d.bind(&recorder(&log), keyboard::SPACE);

        d.key_down(keyboard::SPACE);
        clock.advance_ms(50);
        d.poll();
        assert_eq!(hub.value(keyboard::SPACE), Some(1.0));
        assert_eq!(
            *log.borrow(),
            vec!["press Space", "move Space", "hold Space 50"]
        );
    }

    #[test]
    fn poll_inside_poll_is_rejected() {
        let (_clock, _hub, d) = setup();
        let polls = Rc::new(Cell::new(0));
        let counter = polls.clone();
        let control = Control::builder()
            .on_hold(move |e| {
                counter.set(counter.get() + 1);
                if let Some(d) = e.dispatcher() {
                    d.poll();
                }
            })
            .build();
        d.bind(&control, keyboard::SPACE);
        d.key_down(keyboard::SPACE);

        d.poll();
        assert_eq!(polls.get(), 1);
    }

    #[test]
    fn dispose_detaches_from_hub() {
        let (_clock, hub, d) = setup();
        let log = Log::default();
        d.bind(&recorder(&log), keyboard::SPACE);
        assert_eq!(hub.dispatchers().len(), 1);

        d.dispose();
        assert!(hub.dispatchers().is_empty());
        hub.press(keyboard::SPACE, None);
        d.press(keyboard::SPACE, None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn gamepad_source_feeds_poll() {
        let (_clock, _hub, d) = setup();
        let log = Log::default();
        d.bind(&recorder(&log), gamepad::BUTTON_0);

        let frames = Rc::new(RefCell::new(vec![
            vec![0.0],
            vec![1.0],
            vec![0.0],
        ]));
        let source = frames.clone();
        d.set_gamepad_source(move || {
            let buttons = {
                let mut frames = source.borrow_mut();
                if frames.len() > 1 {
                    frames.remove(0)
                } else {
                    frames[0].clone()
                }
            };
            vec![Some(crate::device::GamepadSnapshot {
                id: "pad".into(),
                timestamp: None,
                axes: vec![0.0; 4],
                buttons,
            })]
        });

        d.poll();
        d.poll();
        d.poll();
        let log = log.borrow();
        assert_eq!(log.first().map(String::as_str), Some("press Button 0"));
        assert!(log.iter().any(|l| l.starts_with("release Button 0")));
        assert_eq!(d.connected_gamepads(), 1);
    }
}
