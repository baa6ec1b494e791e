use super::codes::{gamepad, keyboard, motion, mouse};
use super::Component;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Which device owns which component.
///
/// Registration order is kept so that binding "every component" visits them
/// in a stable order.
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    devices: HashMap<Component, Rc<str>>,
    order: Vec<Component>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with keyboard, mouse, gamepad and motion names.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        for key in keyboard::all() {
            registry.register(Component::from(key), keyboard::DEVICE);
        }
        for name in mouse::all() {
            registry.register(Component::from(name), mouse::DEVICE);
        }
        for name in gamepad::all() {
            registry.register(Component::from(name), gamepad::DEVICE);
        }
        for index in 0..gamepad::MAX_PADS {
            let device = gamepad::pad_device(index);
            for name in gamepad::all() {
                registry.register(Component::for_pad(index, name), &device);
            }
        }
        for name in motion::all() {
            registry.register(Component::from(name), motion::DEVICE);
        }

        debug!("Component registry holds {} built-in names", registry.len());
        registry
    }

    /// Registers `component` under `device`. An existing registration is
    /// kept; returns whether the component was new.
    pub fn register(&mut self, component: Component, device: &str) -> bool {
        if self.devices.contains_key(&component) {
            return false;
        }
        self.devices.insert(component.clone(), Rc::from(device));
        self.order.push(component);
        true
    }

    pub fn contains(&self, component: &str) -> bool {
        self.devices.contains_key(component)
    }

    pub fn device_of(&self, component: &str) -> Option<Rc<str>> {
        self.devices.get(component).cloned()
    }

    pub fn components(&self) -> &[Component] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Last filtered value per component, readable without subscribing.
#[derive(Debug, Default, Clone)]
pub struct AsyncValues {
    values: HashMap<Component, f64>,
}

impl AsyncValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, component: &str) -> Option<f64> {
        self.values.get(component).copied()
    }

    pub fn set(&mut self, component: &Component, value: f64) {
        match self.values.get_mut(component.as_str()) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(component.clone(), value);
            }
        }
    }

    pub fn remove(&mut self, component: &str) -> Option<f64> {
        self.values.remove(component)
    }

    pub fn contains(&self, component: &str) -> bool {
        self.values.contains_key(component)
    }

    /// Snapshot of the present components.
    pub fn components(&self) -> Vec<Component> {
        let mut components: Vec<Component> = self.values.keys().cloned().collect();
        components.sort();
        components
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Component, f64)> {
        self.values.iter().map(|(c, v)| (c, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
