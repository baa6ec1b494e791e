use super::VectorFilter;
use crate::math::Vec3;

/// Resists direction reversal.
///
/// A component is dampened only when the sign of its change disagrees with
/// the sign of its value, so a value may grow freely but falls back toward
/// zero slowly.
#[derive(Debug, Clone)]
pub struct Inertia {
    damp: f64,
    previous: Vec3,
}

impl Inertia {
    /// `dampening` of `1.0` lets every change through, `0.0` freezes
    /// reversals completely.
    pub fn new(dampening: f64) -> Self {
        Self {
            damp: 1.0 - dampening.clamp(0.0, 1.0),
            previous: [0.0; 3],
        }
    }
}

impl VectorFilter for Inertia {
    fn apply(&mut self, v: &mut Vec3) {
        for (value, previous) in v.iter_mut().zip(self.previous.iter_mut()) {
            let d = *value - *previous;
            if (d < 0.0) != (*value < 0.0) {
                *value -= d * self.damp;
            }
            *previous = *value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_passes_reversal_is_dampened() {
        let mut inertia = Inertia::new(0.25);

        let mut v = [0.5, -0.5, 0.0];
        inertia.apply(&mut v);
        assert_eq!(v, [0.5, -0.5, 0.0]);

        let mut v = [0.7, -0.7, 0.0];
        inertia.apply(&mut v);
        assert_eq!(v[0], 0.7);
        assert_eq!(v[1], -0.7);

        let mut v = [0.3, -0.3, 0.0];
        inertia.apply(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-12);
        assert!((v[1] + 0.6).abs() < 1e-12);
    }
}
