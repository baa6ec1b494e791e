//! Stateful smoothing filters for 3-component sensor streams.
//!
//! Every filter consumes a vector, rewrites it in place, and keeps whatever
//! history it needs for the next call. Instances must not be shared between
//! unrelated streams. A `None` sample is passed over untouched so chains can
//! be fed before a sensor has reported anything.
//!
//! ```text
//! raw ──► MovingAverage ──► AdaptiveHighPass ──► ... ──► calibrated pipeline
//! ```

pub mod high_pass;
pub mod inertia;
pub mod moving_average;
pub mod ramp;

pub use high_pass::{AdaptiveHighPass, HighPassSettings};
pub use inertia::Inertia;
pub use moving_average::MovingAverage;
pub use ramp::Ramp;

use crate::math::Vec3;
use std::fmt;

pub trait VectorFilter {
    /// Filters `v` in place.
    fn apply(&mut self, v: &mut Vec3);

    fn process(&mut self, v: Option<&mut Vec3>) {
        if let Some(v) = v {
            self.apply(v);
        }
    }
}

impl<F: FnMut(&mut Vec3)> VectorFilter for F {
    fn apply(&mut self, v: &mut Vec3) {
        self(v)
    }
}

/// An ordered list of filters applied one after another.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn VectorFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl VectorFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    pub fn push(&mut self, filter: impl VectorFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl VectorFilter for FilterChain {
    fn apply(&mut self, v: &mut Vec3) {
        for filter in &mut self.filters {
            filter.apply(v);
        }
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}
