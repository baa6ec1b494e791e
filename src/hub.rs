//! Process-wide input state.
//!
//! The hub owns what every dispatcher and device shares: the component
//! registry, the async value table, the clock and the list of live
//! dispatchers. Devices raise their events through the hub, which hands them
//! to every live dispatcher in creation order.

use crate::clock::{Clock, SystemClock};
use crate::component::{AsyncValues, Component, ComponentRegistry};
use crate::config::InkySettings;
use crate::dispatcher::event::{Motion, Signal};
use crate::dispatcher::{Dispatcher, DispatcherInner};
use chrono::{DateTime, Duration, Local};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, info};

#[derive(Clone)]
pub struct InputHub {
    inner: Rc<HubInner>,
}

struct HubInner {
    settings: InkySettings,
    clock: Rc<dyn Clock>,
    registry: RefCell<ComponentRegistry>,
    values: RefCell<AsyncValues>,
    dispatchers: RefCell<Vec<(u64, Weak<DispatcherInner>)>>,
    next_dispatcher_id: Cell<u64>,
    next_device_id: Cell<u64>,
}

impl InputHub {
    pub fn new() -> Self {
        Self::with_settings(InkySettings::default(), SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self::with_settings(InkySettings::default(), clock)
    }

    /// `settings` supply the defaults for dispatchers and devices created on
    /// this hub.
    pub fn with_settings(settings: InkySettings, clock: impl Clock + 'static) -> Self {
        let registry = ComponentRegistry::with_builtins();
        info!(
            "Input hub ready with {} registered components",
            registry.len()
        );

        Self {
            inner: Rc::new(HubInner {
                settings,
                clock: Rc::new(clock),
                registry: RefCell::new(registry),
                values: RefCell::new(AsyncValues::new()),
                dispatchers: RefCell::new(Vec::new()),
                next_dispatcher_id: Cell::new(0),
                next_device_id: Cell::new(0),
            }),
        }
    }

    pub fn settings(&self) -> &InkySettings {
        &self.inner.settings
    }

    pub fn now(&self) -> DateTime<Local> {
        self.inner.clock.now()
    }

    /// Last filtered value of `component`, if it ever reported.
    pub fn value(&self, component: &str) -> Option<f64> {
        self.inner.values.borrow().get(component)
    }

    pub fn device_of(&self, component: &str) -> Option<Rc<str>> {
        self.inner.registry.borrow().device_of(component)
    }

    pub fn is_registered(&self, component: &str) -> bool {
        self.inner.registry.borrow().contains(component)
    }

    pub fn register_component(&self, component: Component, device: &str) -> bool {
        self.inner.registry.borrow_mut().register(component, device)
    }

    /// Every registered component, in registration order.
    pub fn components(&self) -> Vec<Component> {
        self.inner.registry.borrow().components().to_vec()
    }

    /// Components present in the async value table.
    pub fn active_components(&self) -> Vec<Component> {
        self.inner.values.borrow().components()
    }

    /// Live dispatchers in creation order.
    pub fn dispatchers(&self) -> Vec<Dispatcher> {
        let mut list = self.inner.dispatchers.borrow_mut();
        list.retain(|(_, weak)| weak.strong_count() > 0);
        list.iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .map(Dispatcher::from_inner)
            .collect()
    }

    pub fn press(&self, component: impl Into<Component>, time: Option<DateTime<Local>>) {
        let component = component.into();
        let time = time.unwrap_or_else(|| self.now());
        for dispatcher in self.dispatchers() {
            dispatcher.press(component.clone(), Some(time));
        }
    }

    pub fn hold(
        &self,
        component: impl Into<Component>,
        duration: Option<Duration>,
        time: Option<DateTime<Local>>,
    ) {
        let component = component.into();
        let time = time.unwrap_or_else(|| self.now());
        for dispatcher in self.dispatchers() {
            dispatcher.hold(component.clone(), duration, Some(time));
        }
    }

    pub fn release(
        &self,
        component: impl Into<Component>,
        duration: Option<Duration>,
        time: Option<DateTime<Local>>,
    ) {
        let component = component.into();
        let time = time.unwrap_or_else(|| self.now());
        for dispatcher in self.dispatchers() {
            dispatcher.release(component.clone(), duration, Some(time));
        }
    }

    pub fn moved(
        &self,
        component: impl Into<Component>,
        motion: Motion,
        time: Option<DateTime<Local>>,
    ) {
        let component = component.into();
        let time = time.unwrap_or_else(|| self.now());
        for dispatcher in self.dispatchers() {
            dispatcher.moved(component.clone(), motion, Some(time));
        }
    }

    /// Disposes every live dispatcher.
    pub fn shutdown(&self) {
        let dispatchers = self.dispatchers();
        info!("Shutting down {} dispatchers", dispatchers.len());
        for dispatcher in dispatchers {
            dispatcher.dispose();
        }
    }

    pub(crate) fn emit(&self, signals: Vec<Signal>) {
        if signals.is_empty() {
            return;
        }
        let time = self.now();
        let dispatchers = self.dispatchers();
        for signal in signals {
            for dispatcher in &dispatchers {
                dispatcher.dispatch(signal.clone(), time);
            }
        }
    }

    pub(crate) fn with_values<R>(&self, f: impl FnOnce(&mut AsyncValues) -> R) -> R {
        f(&mut *self.inner.values.borrow_mut())
    }

    pub(crate) fn next_dispatcher_id(&self) -> u64 {
        let id = self.inner.next_dispatcher_id.get();
        self.inner.next_dispatcher_id.set(id + 1);
        id
    }

    pub(crate) fn attach(&self, id: u64, dispatcher: &Rc<DispatcherInner>) {
        self.inner
            .dispatchers
            .borrow_mut()
            .push((id, Rc::downgrade(dispatcher)));
        debug!("Dispatcher {} attached", id);
    }

    pub(crate) fn detach(&self, id: u64) {
        self.inner
            .dispatchers
            .borrow_mut()
            .retain(|(other, _)| *other != id);
        debug!("Dispatcher {} detached", id);
    }

    pub(crate) fn next_device_id(&self) -> u64 {
        let id = self.inner.next_device_id.get();
        self.inner.next_device_id.set(id + 1);
        id
    }
}

impl Default for InputHub {
    fn default() -> Self {
        Self::new()
    }
}
