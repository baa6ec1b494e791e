use super::{calibrate, AxisCalibration};
use crate::component::codes::motion;
use crate::component::{AsyncValues, Component};
use crate::config::OrientationSettings;
use crate::dispatcher::event::{Motion, Signal};
use crate::math::{
    angle_between, build_rotation_matrix, identity_matrix, unit, wrap_angle, Matrix4, Vec3,
    DEGREES_TO_RADIANS, DOUBLE_PI, HALF_PI,
};
use crate::normalize::{clamp_dead_zone, rescale};
use std::f64::consts::PI;

/// Direction of a device lying flat, i.e. zero calibrated angles.
const NEUTRAL: Vec3 = [1.0, 0.0, 0.0];

/// Device orientation in degrees, as reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationSample {
    /// Rotation around the vertical axis, drives Z.
    pub alpha: f64,
    /// Front-to-back tilt, drives X.
    pub beta: f64,
    /// Left-to-right tilt, drives Y.
    pub gamma: f64,
}

/// Turns orientation samples into X/Y/Z orientation events.
///
/// X and Y are gated together on the angle between the current tilt
/// direction and the neutral direction, so a small tilt in any direction
/// stays inside the dead zone. Z is gated on its own.
#[derive(Debug, Clone)]
pub struct OrientationTracker {
    calibration: Vec3,
    last_reported: Vec3,
    direction: Vec3,
    last_z: f64,
    published: Vec3,
    xy_active: bool,
    z_active: bool,
    matrix: Matrix4,
    started: bool,
}

fn direction_of(x: f64, y: f64) -> Vec3 {
    unit([y.cos(), x.sin(), y.sin()])
}

impl OrientationTracker {
    pub fn new() -> Self {
        Self {
            calibration: [0.0; 3],
            last_reported: [0.0; 3],
            direction: NEUTRAL,
            last_z: 0.0,
            published: [0.0; 3],
            xy_active: false,
            z_active: false,
            matrix: identity_matrix(),
            started: false,
        }
    }

    /// Rotation for the latest calibrated angles.
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    /// Latest uncalibrated angles in radians, `[x, y, z]`.
    pub fn last_reported(&self) -> Vec3 {
        self.last_reported
    }

    pub fn calibration(&self) -> Vec3 {
        self.calibration
    }

    pub fn calibrate(&mut self, axes: [AxisCalibration; 3]) {
        calibrate(&mut self.calibration, &self.last_reported, axes);
    }

    pub(crate) fn update(
        &mut self,
        sample: &OrientationSample,
        settings: &OrientationSettings,
        values: &mut AsyncValues,
    ) -> Vec<Signal> {
        self.last_reported = [
            sample.beta * DEGREES_TO_RADIANS,
            sample.gamma * DEGREES_TO_RADIANS,
            sample.alpha * DEGREES_TO_RADIANS,
        ];
        let x = self.last_reported[0] - self.calibration[0];
        let y = self.last_reported[1] - self.calibration[1];
        let z = self.last_reported[2] - self.calibration[2];

        build_rotation_matrix(x, y, z, &mut self.matrix);

        let first = !self.started;
        self.started = true;

        let mut signals = Vec::new();
        self.update_xy(x, y, first, settings, values, &mut signals);
        self.update_z(z, first, settings, values, &mut signals);
        signals
    }

    fn update_xy(
        &mut self,
        x: f64,
        y: f64,
        first: bool,
        settings: &OrientationSettings,
        values: &mut AsyncValues,
        signals: &mut Vec<Signal>,
    ) {
        let direction = direction_of(x, y);
        if !first && angle_between(&direction, &self.direction) <= settings.xy_threshold {
            return;
        }

        let dead_zone = clamp_dead_zone(settings.xy_dead_zone);
        let from_center = angle_between(&direction, &NEUTRAL);
        let x = wrap_angle(x, PI);
        let y = wrap_angle(y, HALF_PI);
        let active = x.abs() > HALF_PI || from_center > dead_zone;

        let components = [
            Component::from(motion::ORIENTATION_X),
            Component::from(motion::ORIENTATION_Y),
        ];

        if active {
            let reported = if settings.xy_normalized {
                [
                    rescale(x, dead_zone, PI - dead_zone),
                    rescale(y, dead_zone, HALF_PI - dead_zone),
                ]
            } else {
                [x, y]
            };

            if !self.xy_active {
                for component in &components {
                    signals.push(Signal::Press(component.clone()));
                }
            }
            for (i, component) in components.iter().enumerate() {
                signals.push(Signal::Move(
                    component.clone(),
                    Motion::axis(reported[i], reported[i] - self.published[i]),
                ));
                self.published[i] = reported[i];
            }
        } else {
            for (i, component) in components.iter().enumerate() {
                if self.xy_active {
                    signals.push(Signal::Move(
                        component.clone(),
                        Motion::axis(0.0, -self.published[i]),
                    ));
                    signals.push(Signal::Release(component.clone(), None));
                }
                self.published[i] = 0.0;
            }
        }

        for (i, component) in components.iter().enumerate() {
            values.set(component, self.published[i]);
        }
        self.direction = direction;
        self.xy_active = active;
    }

    fn update_z(
        &mut self,
        z: f64,
        first: bool,
        settings: &OrientationSettings,
        values: &mut AsyncValues,
        signals: &mut Vec<Signal>,
    ) {
        let z = wrap_angle(z, DOUBLE_PI);
        if !first && (z - self.last_z).abs() <= settings.z_threshold {
            return;
        }
        self.last_z = z;

        let dead_zone = clamp_dead_zone(settings.z_dead_zone);
        let component = Component::from(motion::ORIENTATION_Z);
        let active = z.abs() > dead_zone;

        if active {
            let reported = if settings.z_normalized {
                rescale(z, dead_zone, DOUBLE_PI - dead_zone)
            } else {
                z
            };
            if !self.z_active {
                signals.push(Signal::Press(component.clone()));
            }
            signals.push(Signal::Move(
                component.clone(),
                Motion::axis(reported, reported - self.published[2]),
            ));
            self.published[2] = reported;
        } else {
            if self.z_active {
                signals.push(Signal::Move(
                    component.clone(),
                    Motion::axis(0.0, -self.published[2]),
                ));
                signals.push(Signal::Release(component.clone(), None));
            }
            self.published[2] = 0.0;
        }

        values.set(&component, self.published[2]);
        self.z_active = active;
    }
}

impl Default for OrientationTracker {
    fn default() -> Self {
        Self::new()
    }
}
