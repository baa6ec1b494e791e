use super::VectorFilter;
use crate::math::{magnitude, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighPassSettings {
    /// Cutoff period; the filter frequency is its reciprocal.
    pub cutoff: f64,
    /// Sampling interval in milliseconds.
    pub interval_ms: f64,
    /// Magnitude change at which the filter starts to relax.
    pub min: f64,
    /// How much the filter constant is divided by under full volatility.
    pub attenuation: f64,
}

impl Default for HighPassSettings {
    fn default() -> Self {
        Self {
            cutoff: 0.9,
            interval_ms: 16.0,
            min: 0.033,
            attenuation: 3.0,
        }
    }
}

/// High-pass filter whose constant adapts to how fast the signal changes.
///
/// The volatility estimate `d` is the magnitude gap between the last filtered
/// output and the incoming sample, scaled by `min` and clamped to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct AdaptiveHighPass {
    previous_input: Vec3,
    output: Vec3,
    constant: f64,
    min: f64,
    attenuation: f64,
}

impl AdaptiveHighPass {
    pub fn new(settings: HighPassSettings) -> Self {
        let cutoff = 1.0 / settings.cutoff;
        let constant = cutoff / (1.0 / settings.interval_ms + cutoff);
        Self {
            previous_input: [0.0; 3],
            output: [0.0; 3],
            constant,
            min: if settings.min > 0.0 { settings.min } else { 0.033 },
            attenuation: if settings.attenuation > 0.0 {
                settings.attenuation
            } else {
                3.0
            },
        }
    }

    /// Current volatility estimate for sample `v`, in `[0, 1]`.
    pub fn volatility(&self, v: &Vec3) -> f64 {
        ((magnitude(&self.output) - magnitude(v)).abs() / self.min - 1.0).clamp(0.0, 1.0)
    }
}

impl VectorFilter for AdaptiveHighPass {
    fn apply(&mut self, v: &mut Vec3) {
        let d = self.volatility(v);
        let alpha = d * self.constant / self.attenuation + (1.0 - d) * self.constant;

        for i in 0..3 {
            self.output[i] = alpha * (self.output[i] + v[i] - self.previous_input[i]);
            self.previous_input[i] = v[i];
            v[i] = self.output[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_signal_decays_towards_zero() {
        let mut filter = AdaptiveHighPass::new(HighPassSettings::default());
        let mut last = f64::MAX;
        for _ in 0..50 {
            let mut v = [0.0, 9.81, 0.0];
            filter.apply(&mut v);
            assert!(v[1].abs() <= last);
            last = v[1].abs();
        }
        assert!(last < 1.0);
    }

    #[test]
    fn volatility_is_clamped() {
        let filter = AdaptiveHighPass::new(HighPassSettings::default());
        assert_eq!(filter.volatility(&[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(filter.volatility(&[100.0, 0.0, 0.0]), 1.0);
    }
}
