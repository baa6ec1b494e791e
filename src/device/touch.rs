//! Touch surface device.
//!
//! Components, prefixed with the device name:
//!
//! | key         | range     | meaning                                    |
//! |-------------|-----------|--------------------------------------------|
//! | Slider X/Y  | `0..=1`   | touch position across the surface          |
//! | Manhattan X/Y | `-1..=1` | offset from the touch origin, per axis     |
//! | Radial X/Y  | unit disc | offset from the origin, clamped to length 1 |
//! | Pressure    | `0..=1`   | reported touch force                       |
//!
//! With `float_origin` the origin is wherever the touch started, otherwise
//! the center of the surface.

use super::{Device, DeviceSchema, DeviceValues, SchemaError};
use crate::config::TouchSettings;
use crate::hub::InputHub;
use crate::normalize::{clamp_radial, normalize_radial};
use std::cell::Cell;
use tracing::debug;

pub const SLIDER_X: &str = "slider_x";
pub const SLIDER_Y: &str = "slider_y";
pub const MANHATTAN_X: &str = "manhattan_x";
pub const MANHATTAN_Y: &str = "manhattan_y";
pub const RADIAL_X: &str = "radial_x";
pub const RADIAL_Y: &str = "radial_y";
pub const PRESSURE: &str = "pressure";

const KEYS: [&str; 7] = [
    SLIDER_X,
    SLIDER_Y,
    MANHATTAN_X,
    MANHATTAN_Y,
    RADIAL_X,
    RADIAL_Y,
    PRESSURE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One touch in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
    pub force: f64,
}

/// Position and size of the touch surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl TouchBounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// `point` relative to the surface, `0..=1` inside it.
    fn relative(&self, point: &TouchPoint) -> Option<(f64, f64)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some((
            (point.x - self.left) / self.width,
            (point.y - self.top) / self.height,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct TouchArea {
    device: Device,
    bounds: Cell<TouchBounds>,
    origin: Cell<(f64, f64)>,
    snap: Cell<bool>,
    float_origin: Cell<bool>,
}

impl TouchArea {
    pub fn new(hub: &InputHub, bounds: TouchBounds) -> Result<Self, SchemaError> {
        Self::with_settings(hub, bounds, hub.settings().touch, None)
    }

    pub fn with_settings(
        hub: &InputHub,
        bounds: TouchBounds,
        settings: TouchSettings,
        name: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let mut schema = DeviceSchema::builder()
            .component(SLIDER_X, "Slider X")
            .component(SLIDER_Y, "Slider Y")
            .component(MANHATTAN_X, "Manhattan X")
            .component(MANHATTAN_Y, "Manhattan Y")
            .component_with(RADIAL_X, "Radial X", false)
            .component_with(RADIAL_Y, "Radial Y", false)
            .component(PRESSURE, "Pressure");
        if let Some(name) = name {
            schema = schema.name(name);
        }
        let device = Device::with_settings(hub, schema.validate()?, settings.device_settings());

        Ok(Self {
            device,
            bounds: Cell::new(bounds),
            origin: Cell::new((0.0, 0.0)),
            snap: Cell::new(settings.snap),
            float_origin: Cell::new(settings.float_origin),
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn set_bounds(&self, bounds: TouchBounds) {
        self.bounds.set(bounds);
    }

    pub fn set_snap(&self, snap: bool) {
        self.snap.set(snap);
    }

    pub fn set_float_origin(&self, float_origin: bool) {
        self.float_origin.set(float_origin);
    }

    /// Feeds one touch event. `point` is the most recent touch on the
    /// surface; it is ignored for end and cancel when snapping.
    pub fn handle(&self, phase: TouchPhase, point: TouchPoint) {
        let ending = matches!(phase, TouchPhase::End | TouchPhase::Cancel);
        if ending && self.snap.get() {
            self.device.update(|values| {
                for key in KEYS {
                    values.set(key, 0.0);
                }
            });
            return;
        }

        let Some((x, y)) = self.bounds.get().relative(&point) else {
            debug!("Touch surface has no area, ignoring touch");
            return;
        };

        let mut rx = x + x - 1.0;
        let mut ry = y + y - 1.0;
        if phase == TouchPhase::Start {
            self.origin.set(if self.float_origin.get() {
                (rx, ry)
            } else {
                (0.0, 0.0)
            });
        }
        let (ox, oy) = self.origin.get();
        rx -= ox;
        ry -= oy;

        let settings = self.device.settings();
        let (radial_x, radial_y) = if settings.normalized {
            normalize_radial(rx, ry, settings.dead_zone)
        } else {
            clamp_radial(rx, ry)
        };

        self.device.update(|values: &mut DeviceValues| {
            values.set(PRESSURE, point.force);
            values.set(SLIDER_X, x.clamp(0.0, 1.0));
            values.set(SLIDER_Y, y.clamp(0.0, 1.0));
            values.set(MANHATTAN_X, rx.clamp(-1.0, 1.0));
            values.set(MANHATTAN_Y, ry.clamp(-1.0, 1.0));
            values.set(RADIAL_X, radial_x);
            values.set(RADIAL_Y, radial_y);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(float_origin: bool) -> (InputHub, TouchArea) {
        let hub = InputHub::new();
        let settings = TouchSettings {
            float_origin,
            ..TouchSettings::default()
        };
        let area = TouchArea::with_settings(
            &hub,
            TouchBounds::new(0.0, 0.0, 200.0, 100.0),
            settings,
            Some("Pad"),
        )
        .unwrap();
        (hub, area)
    }

    fn touch(x: f64, y: f64) -> TouchPoint {
        TouchPoint { x, y, force: 0.5 }
    }

    #[test]
    fn sliders_follow_position() {
        let (hub, area) = area(true);
        area.handle(TouchPhase::Start, touch(150.0, 25.0));

        let slider_x = hub.value("Pad Slider X").unwrap();
        // 0.75 through the 0.1 dead zone
        assert!((slider_x - (0.75 - 0.1) / 0.9).abs() < 1e-9);
        assert!(hub.value("Pad Pressure").unwrap() > 0.0);
    }

    #[test]
    fn floating_origin_starts_at_zero() {
        let (hub, area) = area(true);
        area.handle(TouchPhase::Start, touch(150.0, 25.0));
        assert_eq!(hub.value("Pad Manhattan X"), Some(0.0));
        assert_eq!(hub.value("Pad Radial X"), Some(0.0));

        area.handle(TouchPhase::Move, touch(200.0, 25.0));
        assert!(hub.value("Pad Manhattan X").unwrap() > 0.0);
        assert!(hub.value("Pad Radial X").unwrap() > 0.0);
    }

    #[test]
    fn fixed_origin_is_the_center() {
        let (hub, area) = area(false);
        area.handle(TouchPhase::Start, touch(0.0, 50.0));
        let x = hub.value("Pad Radial X").unwrap();
        assert!((x + 1.0).abs() < 1e-9);
    }

    #[test]
    fn radial_follows_dead_zone_changes() {
        let (hub, area) = area(false);
        area.device().update_settings(|s| s.dead_zone = 0.5);
        // rx = 0.4, inside the new dead zone
        area.handle(TouchPhase::Start, touch(140.0, 50.0));

        assert_eq!(hub.value("Pad Manhattan X"), Some(0.0));
        assert_eq!(hub.value("Pad Radial X"), Some(0.0));

        area.handle(TouchPhase::Move, touch(190.0, 50.0));
        let radial = hub.value("Pad Radial X").unwrap();
        assert!((radial - (0.9 - 0.5) / 0.5).abs() < 1e-9);
    }

    #[test]
    fn radial_clamps_when_normalizing_is_off() {
        let (hub, area) = area(false);
        area.device().update_settings(|s| s.normalized = false);
        area.handle(TouchPhase::Start, touch(140.0, 50.0));

        let radial = hub.value("Pad Radial X").unwrap();
        assert!((radial - 0.4).abs() < 1e-9);
    }

    #[test]
    fn end_snaps_back() {
        let (hub, area) = area(true);
        area.handle(TouchPhase::Start, touch(20.0, 20.0));
        area.handle(TouchPhase::Move, touch(180.0, 80.0));
        area.handle(TouchPhase::End, TouchPoint::default());

        for name in ["Slider X", "Manhattan X", "Radial X", "Radial Y", "Pressure"] {
            assert_eq!(hub.value(&format!("Pad {}", name)), Some(0.0), "{}", name);
        }
    }
}
