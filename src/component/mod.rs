//! Canonical component names, their owning devices, and the async value table.
//!
//! A [`Component`] is an immutable name such as `"Left Stick X"` or
//! `"Gamepad 1 Button 0"`. The [`ComponentRegistry`] knows which device each
//! name belongs to; [`AsyncValues`] holds the last filtered value of every
//! component that has reported.

pub mod codes;
pub mod registry;

pub use registry::{AsyncValues, ComponentRegistry};

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Component(Rc<str>);

impl Component {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Rc::from(name.as_ref()))
    }

    /// Per-pad name, e.g. `Gamepad 2 Left Stick X`.
    pub fn for_pad(index: usize, name: &str) -> Self {
        Self::new(format!("{} {}", codes::gamepad::pad_device(index), name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Component {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Component {
    fn from(name: String) -> Self {
        Self(Rc::from(name))
    }
}

impl From<&Component> for Component {
    fn from(component: &Component) -> Self {
        component.clone()
    }
}

impl AsRef<str> for Component {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Component {
    fn borrow(&self) -> &str {
        &self.0
    }
}
