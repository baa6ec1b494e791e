//! Dead-zone gating, threshold suppression and rescaling for analog values.
//!
//! Every analog source in the crate (device components, gamepad axes, radial
//! sticks, touch radials) runs through [`normalize_axis`], so press and
//! release edges sit at exactly the same boundary everywhere:
//!
//! * a value is active when `|v| > dead_zone`
//! * a press fires when the previous value was inactive, `|old| <= dead_zone`
//! * a release fires when an active value drops back inside the dead zone
//!
//! The function is pure. Callers keep the previous raw value (see
//! [`AxisState`]) and publish [`AxisTransition::value`] to the async table.

use tracing::{debug, warn};

/// Smallest accepted dead zone. Rescaling divides by `1 - dead_zone` and
/// the gate compares against it, so zero and negative values are lifted here.
pub const MIN_DEAD_ZONE: f64 = 0.00001;

/// Clamps a configured dead zone to [`MIN_DEAD_ZONE`], logging when it does.
pub fn sanitize_dead_zone(dead_zone: f64, what: &str) -> f64 {
    let clamped = clamp_dead_zone(dead_zone);
    if dead_zone == 0.0 {
        debug!("{} dead zone of 0 raised to {}", what, clamped);
    } else if clamped != dead_zone {
        warn!(
            "{} dead zone {} is below the minimum, using {}",
            what, dead_zone, clamped
        );
    }
    clamped
}

pub fn clamp_dead_zone(dead_zone: f64) -> f64 {
    if dead_zone.is_nan() || dead_zone < MIN_DEAD_ZONE {
        MIN_DEAD_ZONE
    } else {
        dead_zone
    }
}

/// How a value relates to normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaling {
    /// The source does not normalize. Gate on the dead zone, report raw values.
    Raw,
    /// Gate on the dead zone and rescale `(dead_zone, 1]` onto `(0, 1]`.
    Rescale,
    /// Already normalized upstream (radial values). Any non-zero value is
    /// active and no dead zone is subtracted again.
    PreNormalized,
}

impl Scaling {
    pub fn select(source_normalized: bool, component_normalized: bool) -> Self {
        match (source_normalized, component_normalized) {
            (false, _) => Scaling::Raw,
            (true, true) => Scaling::Rescale,
            (true, false) => Scaling::PreNormalized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSettings {
    pub dead_zone: f64,
    pub threshold: f64,
}

impl AxisSettings {
    pub fn new(dead_zone: f64, threshold: f64) -> Self {
        Self {
            dead_zone: clamp_dead_zone(dead_zone),
            threshold: if threshold > 0.0 { threshold } else { 0.0 },
        }
    }
}

/// Value and delta delivered with a move event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisMotion {
    pub v: f64,
    pub dv: f64,
}

/// Outcome of one sample on one component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTransition {
    /// Raw value to remember as `old` for the next sample.
    pub raw: f64,
    /// Value for the async table.
    pub value: f64,
    pub pressed: bool,
    pub motion: Option<AxisMotion>,
    pub released: bool,
}

/// Maps `value` from `(dead_zone, dead_zone + range]` onto `(0, 1]`,
/// keeping the sign. Values inside the dead zone map to zero.
pub fn rescale(value: f64, dead_zone: f64, range: f64) -> f64 {
    if value > 0.0 {
        ((value - dead_zone) / range).max(0.0)
    } else {
        ((value + dead_zone) / range).min(0.0)
    }
}

/// [`rescale`] over the unit range.
pub fn rescale_unit(value: f64, dead_zone: f64) -> f64 {
    rescale(value, dead_zone, 1.0 - dead_zone)
}

/// Runs one sample through the dead zone.
///
/// Returns `None` when the change from `old` is below the threshold; the
/// caller must then leave both its stored raw value and the async table
/// untouched.
pub fn normalize_axis(
    raw: f64,
    old: f64,
    settings: &AxisSettings,
    scaling: Scaling,
) -> Option<AxisTransition> {
    if raw.is_nan() {
        return None;
    }

    let dead_zone = clamp_dead_zone(settings.dead_zone);
    let diff = raw - old;
    if diff.abs() < settings.threshold {
        return None;
    }

    let (gate, press_below) = match scaling {
        Scaling::PreNormalized => (0.0, settings.threshold),
        Scaling::Raw | Scaling::Rescale => (dead_zone, dead_zone),
    };

    if raw.abs() > gate {
        let (v, dv) = match scaling {
            Scaling::Rescale => {
                let v = rescale_unit(raw, dead_zone);
                (v, v - rescale_unit(old, dead_zone))
            }
            Scaling::Raw | Scaling::PreNormalized => (raw, diff),
        };

        Some(AxisTransition {
            raw,
            value: v,
            pressed: old.abs() <= press_below,
            motion: Some(AxisMotion { v, dv }),
            released: false,
        })
    } else if old.abs() > 0.0 {
        let dv = match scaling {
            Scaling::Rescale => -rescale_unit(old, dead_zone),
            Scaling::Raw | Scaling::PreNormalized => -old,
        };

        Some(AxisTransition {
            raw: 0.0,
            value: 0.0,
            pressed: false,
            motion: Some(AxisMotion { v: 0.0, dv }),
            released: true,
        })
    } else {
        Some(AxisTransition {
            raw: 0.0,
            value: 0.0,
            pressed: false,
            motion: None,
            released: false,
        })
    }
}

/// Previous raw value of one component.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisState {
    previous: f64,
}

impl AxisState {
    pub fn previous(&self) -> f64 {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = 0.0;
    }

    /// Sets the previous raw value without raising anything.
    pub fn seed(&mut self, raw: f64) {
        self.previous = raw;
    }

    pub fn update(
        &mut self,
        raw: f64,
        settings: &AxisSettings,
        scaling: Scaling,
    ) -> Option<AxisTransition> {
        let transition = normalize_axis(raw, self.previous, settings, scaling)?;
        self.previous = transition.raw;
        Some(transition)
    }
}

/// Radial dead zone for a stick or touch vector.
///
/// The vector is clamped to the unit circle, its length is rescaled against
/// the dead zone, and the result is laid back along the original angle. A
/// square per-axis dead zone would clip the corners of a circular range.
pub fn normalize_radial(x: f64, y: f64, dead_zone: f64) -> (f64, f64) {
    let length = x.hypot(y);
    if length == 0.0 || length.is_nan() {
        return (0.0, 0.0);
    }

    let dead_zone = clamp_dead_zone(dead_zone);
    let clamped = length.min(1.0);
    let scaled = rescale_unit(clamped, dead_zone);
    (x / length * scaled, y / length * scaled)
}

/// Clamps a vector to the unit circle without rescaling.
pub fn clamp_radial(x: f64, y: f64) -> (f64, f64) {
    let length = x.hypot(y);
    let scale = if length <= 1.0 { 1.0 } else { 1.0 / length };
    (x * scale, y * scale)
}
