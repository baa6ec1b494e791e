//! User-defined devices.
//!
//! A device is described by a [`DeviceSchema`], which is checked once
//! before any component reaches the hub:
//!
//! ```text
//!   DeviceSchema<Draft> ──validate()──► DeviceSchema<Validated> ──► Device
//! ```
//!
//! Values are pushed with [`Device::update`] or pulled by a
//! [`DevicePoller`]. Every raise runs each component through the dead zone
//! and broadcasts press, move and release through the hub.

pub mod gamepad;
#[cfg(feature = "gilrs")]
pub mod gilrs_source;
pub mod touch;

pub use gamepad::{GamepadSnapshot, GamepadSource, GamepadTracker};
#[cfg(feature = "gilrs")]
pub use gilrs_source::{GilrsSource, SourceError};
pub use touch::{TouchArea, TouchBounds, TouchPhase, TouchPoint};

use crate::component::Component;
use crate::config::DeviceSettings;
use crate::dispatcher::event::Signal;
use crate::hub::InputHub;
use crate::normalize::{sanitize_dead_zone, AxisSettings, AxisState, Scaling};
use statum::{machine, state};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Device name must not be empty")]
    EmptyName,

    #[error("Device declares no components")]
    NoComponents,

    #[error("Component key must not be empty")]
    EmptyKey,

    #[error("Component key {0} is declared twice")]
    DuplicateKey(String),

    #[error("Component {0} has an empty display name")]
    EmptyDisplayName(String),
}

/// One component of a device schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    /// Key used with [`DeviceValues`].
    pub key: String,
    /// Shown after the device name in the registered component name.
    pub display_name: String,
    /// Whether the device's normalization applies to this component. Turn
    /// it off for values the device normalizes itself.
    pub normalized: bool,
}

#[state]
#[derive(Debug, Clone)]
pub enum SchemaState {
    Draft,
    Validated,
}

#[machine]
#[derive(Debug)]
pub struct DeviceSchema<S: SchemaState> {
    name: Option<String>,
    components: Vec<ComponentSpec>,
}

impl DeviceSchema<Draft> {
    pub fn builder() -> Self {
        Self::new(None, Vec::new())
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn component(self, key: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.component_with(key, display_name, true)
    }

    pub fn component_with(
        mut self,
        key: impl Into<String>,
        display_name: impl Into<String>,
        normalized: bool,
    ) -> Self {
        self.components.push(ComponentSpec {
            key: key.into(),
            display_name: display_name.into(),
            normalized,
        });
        self
    }

    pub fn validate(self) -> Result<DeviceSchema<Validated>, SchemaError> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(SchemaError::EmptyName);
        }
        if self.components.is_empty() {
            return Err(SchemaError::NoComponents);
        }

        let mut keys = HashSet::new();
        for spec in &self.components {
            if spec.key.is_empty() {
                return Err(SchemaError::EmptyKey);
            }
            if spec.display_name.trim().is_empty() {
                return Err(SchemaError::EmptyDisplayName(spec.key.clone()));
            }
            if !keys.insert(spec.key.as_str()) {
                return Err(SchemaError::DuplicateKey(spec.key.clone()));
            }
        }

        Ok(self.transition())
    }
}

impl DeviceSchema<Validated> {
    pub fn device_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }
}

/// Values written by the device owner, one per schema key.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceValues {
    keys: Rc<[String]>,
    values: Vec<f64>,
}

impl DeviceValues {
    fn new(keys: Rc<[String]>) -> Self {
        let values = vec![0.0; keys.len()];
        Self { keys, values }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        let index = self.keys.iter().position(|k| k == key)?;
        Some(self.values[index])
    }

    /// Returns `false` for a key the schema does not declare.
    pub fn set(&mut self, key: &str, value: f64) -> bool {
        match self.keys.iter().position(|k| k == key) {
            Some(index) => {
                self.values[index] = value;
                true
            }
            None => {
                debug!("Ignoring value for undeclared key {}", key);
                false
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Pull-mode source for a device. Returns whether the device should raise
/// events for the values it wrote.
pub trait DevicePoller {
    fn poll(&mut self, values: &mut DeviceValues) -> bool;
}

impl<F: FnMut(&mut DeviceValues) -> bool> DevicePoller for F {
    fn poll(&mut self, values: &mut DeviceValues) -> bool {
        self(values)
    }
}

struct DeviceComponent {
    component: Component,
    normalized: bool,
}

struct DeviceInner {
    id: u64,
    name: Rc<str>,
    hub: InputHub,
    settings: Cell<DeviceSettings>,
    components: Vec<DeviceComponent>,
    states: RefCell<Vec<AxisState>>,
    values: RefCell<DeviceValues>,
    poller: RefCell<Option<Box<dyn DevicePoller>>>,
}

/// A registered device. Clones share state; the device stays registered
/// for the life of the hub.
#[derive(Clone)]
pub struct Device {
    inner: Rc<DeviceInner>,
}

impl Device {
    pub fn new(hub: &InputHub, schema: DeviceSchema<Validated>) -> Self {
        Self::with_settings(hub, schema, hub.settings().device)
    }

    pub fn with_settings(
        hub: &InputHub,
        schema: DeviceSchema<Validated>,
        mut settings: DeviceSettings,
    ) -> Self {
        let id = hub.next_device_id();
        let name: Rc<str> = match schema.device_name() {
            Some(name) => Rc::from(name),
            None => Rc::from(format!("User-Defined Device {}", id)),
        };
        settings.dead_zone = sanitize_dead_zone(settings.dead_zone, &name);

        let mut components = Vec::with_capacity(schema.components().len());
        for spec in schema.components() {
            let component = Component::new(format!("{} {}", name, spec.display_name));
            if !hub.register_component(component.clone(), &name) {
                warn!(
                    "Component {} is already registered to {:?}, keeping that owner",
                    component,
                    hub.device_of(component.as_str())
                );
            }
            hub.with_values(|values| values.set(&component, 0.0));
            components.push(DeviceComponent {
                component,
                normalized: spec.normalized,
            });
        }

        let keys: Rc<[String]> = schema
            .components()
            .iter()
            .map(|spec| spec.key.clone())
            .collect();
        info!(
            "Device {} registered with {} components",
            name,
            components.len()
        );

        Self {
            inner: Rc::new(DeviceInner {
                id,
                name,
                hub: hub.clone(),
                settings: Cell::new(settings),
                states: RefCell::new(vec![AxisState::default(); components.len()]),
                components,
                values: RefCell::new(DeviceValues::new(keys)),
                poller: RefCell::new(None),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Registered component for schema `key`.
    pub fn component(&self, key: &str) -> Option<Component> {
        let values = self.inner.values.borrow();
        let index = values.keys.iter().position(|k| k == key)?;
        Some(self.inner.components[index].component.clone())
    }

    pub fn components(&self) -> Vec<Component> {
        self.inner
            .components
            .iter()
            .map(|c| c.component.clone())
            .collect()
    }

    pub fn settings(&self) -> DeviceSettings {
        self.inner.settings.get()
    }

    pub fn update_settings(&self, f: impl FnOnce(&mut DeviceSettings)) {
        let mut settings = self.inner.settings.get();
        f(&mut settings);
        settings.dead_zone = sanitize_dead_zone(settings.dead_zone, &self.inner.name);
        self.inner.settings.set(settings);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.update_settings(|s| s.enabled = enabled);
    }

    pub fn values(&self) -> DeviceValues {
        self.inner.values.borrow().clone()
    }

    /// Writes values and raises events for them.
    pub fn update(&self, f: impl FnOnce(&mut DeviceValues)) {
        f(&mut *self.inner.values.borrow_mut());
        self.raise_events();
    }

    pub fn set_value(&self, key: &str, value: f64) {
        if self.inner.values.borrow_mut().set(key, value) {
            self.raise_events();
        }
    }

    pub fn set_poller(&self, poller: impl DevicePoller + 'static) {
        *self.inner.poller.borrow_mut() = Some(Box::new(poller));
    }

    /// Runs the poller once. Returns whether a poller is attached.
    ///
    /// The poller works on a copy of the values that replaces the stored
    /// ones afterwards, so a poller may call back into the device; writes
    /// it makes through the handle are superseded by its copy.
    pub fn poll(&self) -> bool {
        let Some(mut poller) = self.inner.poller.borrow_mut().take() else {
            return false;
        };
        let mut values = self.inner.values.borrow().clone();
        let raise = poller.poll(&mut values);
        *self.inner.values.borrow_mut() = values;
        self.inner.poller.borrow_mut().get_or_insert(poller);

        if raise {
            self.raise_events();
        }
        true
    }

    /// Runs every component through the dead zone and broadcasts the
    /// resulting events. Disabled devices and devices whose dead zone
    /// covers the whole range stay silent.
    pub fn raise_events(&self) {
        let settings = self.inner.settings.get();
        if !settings.enabled || settings.dead_zone >= 1.0 {
            return;
        }

        let axis_settings = AxisSettings::new(settings.dead_zone, settings.threshold);
        let current = self.inner.values.borrow().values.clone();
        let mut states = self.inner.states.borrow_mut();
        let mut signals = Vec::new();

        self.inner.hub.with_values(|values| {
            for (i, device_component) in self.inner.components.iter().enumerate() {
                let scaling = Scaling::select(settings.normalized, device_component.normalized);
                if let Some(t) = states[i].update(current[i], &axis_settings, scaling) {
                    values.set(&device_component.component, t.value);
                    Signal::push_transition(&mut signals, &device_component.component, &t);
                }
            }
        });
        drop(states);

        self.inner.hub.emit(signals);
    }

    /// Polls on the current `LocalSet` every `poll_rate_ms` until the last
    /// handle to the device is dropped.
    pub fn spawn_poll_loop(&self) -> JoinHandle<()> {
        tokio::task::spawn_local(run_device_loop(Rc::downgrade(&self.inner)))
    }
}

async fn run_device_loop(weak: Weak<DeviceInner>) {
    let Some(period) = weak.upgrade().map(|inner| inner.settings.get().poll_rate_ms) else {
        return;
    };
    info!("Starting device poll loop with {}ms interval", period);
    let mut interval_timer =
        tokio::time::interval(tokio::time::Duration::from_millis(period.max(1)));

    loop {
        interval_timer.tick().await;

        let Some(inner) = weak.upgrade() else {
            debug!("Device dropped, ending poll loop");
            break;
        };
        let device = Device { inner };
        if !device.poll() {
            info!("Device {} has no poller, ending poll loop", device.name());
            break;
        }

        let poll_rate_ms = device.settings().poll_rate_ms.max(1);
        let new_interval_time = tokio::time::Duration::from_millis(poll_rate_ms);
        if new_interval_time != interval_timer.period() {
            info!("Updating interval time to {} ms", poll_rate_ms);
            interval_timer = tokio::time::interval(new_interval_time);
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("settings", &self.inner.settings.get())
            .field("values", &self.inner.values.borrow())
            .finish()
    }
}
