use super::VectorFilter;
use crate::math::Vec3;

/// Exponential smoothing: `v = v * alpha + previous * (1 - alpha)`.
#[derive(Debug, Clone)]
pub struct Ramp {
    alpha: f64,
    previous: Vec3,
}

impl Ramp {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            previous: [0.0; 3],
        }
    }

    /// Smoothing factor derived from the sensor interval in milliseconds.
    pub fn for_interval(interval_ms: f64) -> Self {
        Self::new(interval_ms / 1000.0)
    }
}

impl VectorFilter for Ramp {
    fn apply(&mut self, v: &mut Vec3) {
        let keep = 1.0 - self.alpha;
        for (value, previous) in v.iter_mut().zip(self.previous.iter_mut()) {
            *value = *value * self.alpha + *previous * keep;
            *previous = *value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_approaches_constant_input() {
        let mut ramp = Ramp::new(0.5);
        let mut v = [1.0, 2.0, -4.0];
        ramp.apply(&mut v);
        assert_eq!(v, [0.5, 1.0, -2.0]);

        let mut v = [1.0, 2.0, -4.0];
        ramp.apply(&mut v);
        assert_eq!(v, [0.75, 1.5, -3.0]);
    }

    #[test]
    fn interval_sets_alpha() {
        let mut ramp = Ramp::for_interval(250.0);
        let mut v = [4.0, 0.0, 0.0];
        ramp.apply(&mut v);
        assert_eq!(v[0], 1.0);
    }
}
