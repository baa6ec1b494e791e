use super::{calibrate, AxisCalibration};
use crate::component::codes::motion;
use crate::component::{AsyncValues, Component};
use crate::config::{GateSettings, MotionSettings};
use crate::dispatcher::event::{Motion, Signal};
use crate::filter::{FilterChain, MovingAverage, VectorFilter};
use crate::math::{add, magnitude, scale, subtract, transform, Matrix4, Vec3, Vec4};
use crate::normalize::clamp_dead_zone;
use std::fmt;
use tracing::debug;

/// One reading of the motion sensors. Streams the sensor does not provide
/// are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSample {
    /// Time since the previous sample.
    pub interval_ms: f64,
    pub acceleration: Option<Vec3>,
    pub acceleration_with_gravity: Option<Vec3>,
    pub rotation_rate: Option<Vec3>,
}

type Filter = Option<Box<dyn VectorFilter>>;

/// Optional smoothing per motion stream.
#[derive(Default)]
pub struct MotionFilters {
    pub acceleration: Filter,
    pub acceleration_with_gravity: Filter,
    pub rotation: Filter,
    pub velocity: Filter,
    pub position: Filter,
}

impl MotionFilters {
    /// Moving averages sized for the sensor interval. Gravity gets a fixed
    /// 21-sample window and velocity is averaged twice.
    pub fn defaults(interval_ms: f64) -> Self {
        Self {
            acceleration: Some(Box::new(
                FilterChain::new().with(MovingAverage::for_interval(interval_ms)),
            )),
            acceleration_with_gravity: Some(Box::new(
                FilterChain::new().with(MovingAverage::new(21)),
            )),
            rotation: Some(Box::new(MovingAverage::for_interval(interval_ms))),
            velocity: Some(Box::new(
                FilterChain::new()
                    .with(MovingAverage::for_interval(interval_ms))
                    .with(MovingAverage::for_interval(interval_ms)),
            )),
            position: Some(Box::new(MovingAverage::for_interval(interval_ms))),
        }
    }
}

impl fmt::Debug for MotionFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionFilters")
            .field("acceleration", &self.acceleration.is_some())
            .field(
                "acceleration_with_gravity",
                &self.acceleration_with_gravity.is_some(),
            )
            .field("rotation", &self.rotation.is_some())
            .field("velocity", &self.velocity.is_some())
            .field("position", &self.position.is_some())
            .finish()
    }
}

fn run(filter: &mut Filter, v: &mut Vec3) {
    if let Some(filter) = filter {
        filter.apply(v);
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Offsets {
    acceleration: Vec3,
    acceleration_with_gravity: Vec3,
    rotation: Vec3,
    position: Vec3,
}

/// Published values and press state of one X/Y/Z/Magnitude group.
#[derive(Debug, Clone, Copy, Default)]
struct Stream {
    published: Vec4,
    active: bool,
}

const ACCELERATION: usize = 0;
const WITH_GRAVITY: usize = 1;
const ROTATION: usize = 2;
const VELOCITY: usize = 3;
const POSITION: usize = 4;

#[derive(Debug, Default)]
pub struct MotionTracker {
    offsets: Offsets,
    last_acceleration: Vec3,
    last_acceleration_with_gravity: Vec3,
    last_rotation: Vec3,
    velocity: Vec4,
    position: Vec4,
    streams: [Stream; 5],
    filters: Option<MotionFilters>,
    started: bool,
}

fn with_magnitude(v: Vec3) -> Vec4 {
    [v[0], v[1], v[2], magnitude(&v)]
}

fn calibrated(v: &Vec3, offset: &Vec3) -> Vec3 {
    [v[0] - offset[0], v[1] - offset[1], v[2] - offset[2]]
}

fn xyz(v: &Vec4) -> Vec3 {
    [v[0], v[1], v[2]]
}

/// Gates a group on its magnitude and emits press/move/release for all four
/// components together.
fn gate(
    stream: &mut Stream,
    v: &Vec4,
    codes: &[&str; 4],
    settings: &GateSettings,
    first: bool,
    values: &mut AsyncValues,
    signals: &mut Vec<Signal>,
) {
    let old_magnitude = stream.published[3];
    if !first && (v[3] - old_magnitude).abs() < settings.threshold {
        return;
    }

    let dead_zone = clamp_dead_zone(settings.dead_zone);
    if v[3] > dead_zone {
        for (i, code) in codes.iter().enumerate() {
            let component = Component::from(*code);
            if !stream.active {
                signals.push(Signal::Press(component.clone()));
            }
            signals.push(Signal::Move(
                component.clone(),
                Motion::axis(v[i], v[i] - stream.published[i]),
            ));
            stream.published[i] = v[i];
            values.set(&component, v[i]);
        }
        stream.active = true;
    } else if stream.active {
        for (i, code) in codes.iter().enumerate() {
            let component = Component::from(*code);
            signals.push(Signal::Move(
                component.clone(),
                Motion::axis(0.0, -stream.published[i]),
            ));
            signals.push(Signal::Release(component.clone(), None));
            stream.published[i] = 0.0;
            values.set(&component, 0.0);
        }
        stream.active = false;
    }
}

impl MotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the filters. Set before the first sample to keep the
    /// defaults from being installed.
    pub fn set_filters(&mut self, filters: MotionFilters) {
        self.filters = Some(filters);
    }

    pub fn filters(&self) -> Option<&MotionFilters> {
        self.filters.as_ref()
    }

    pub fn velocity(&self) -> Vec3 {
        xyz(&self.velocity)
    }

    /// Integrated position minus the position calibration.
    pub fn position(&self) -> Vec3 {
        calibrated(&xyz(&self.position), &self.offsets.position)
    }

    pub fn calibrate_acceleration(&mut self, axes: [AxisCalibration; 3]) {
        calibrate(
            &mut self.offsets.acceleration,
            &self.last_acceleration,
            axes,
        );
    }

    pub fn calibrate_acceleration_with_gravity(&mut self, axes: [AxisCalibration; 3]) {
        calibrate(
            &mut self.offsets.acceleration_with_gravity,
            &self.last_acceleration_with_gravity,
            axes,
        );
    }

    pub fn calibrate_rotation(&mut self, axes: [AxisCalibration; 3]) {
        calibrate(&mut self.offsets.rotation, &self.last_rotation, axes);
    }

    pub fn calibrate_position(&mut self, axes: [AxisCalibration; 3]) {
        let current = xyz(&self.position);
        calibrate(&mut self.offsets.position, &current, axes);
    }

    pub(crate) fn update(
        &mut self,
        sample: &MotionSample,
        settings: &MotionSettings,
        matrix: &Matrix4,
        values: &mut AsyncValues,
    ) -> Vec<Signal> {
        let first = !self.started;
        self.started = true;
        if first && self.filters.is_none() && settings.default_filters {
            debug!(
                "Installing default motion filters for a {} ms interval",
                sample.interval_ms
            );
            self.filters = Some(MotionFilters::defaults(sample.interval_ms));
        }
        let filters = self.filters.get_or_insert_with(MotionFilters::default);
        let dt = sample.interval_ms.max(0.0) / 1000.0;
        let mut signals = Vec::new();

        if let Some(mut a) = sample.acceleration {
            run(&mut filters.acceleration, &mut a);
            self.last_acceleration = a;
        }
        if let Some(mut g) = sample.acceleration_with_gravity {
            run(&mut filters.acceleration_with_gravity, &mut g);
            self.last_acceleration_with_gravity = g;
        }
        if let Some(mut r) = sample.rotation_rate {
            run(&mut filters.rotation, &mut r);
            self.last_rotation = r;
        }

        let acceleration = with_magnitude(calibrated(
            &self.last_acceleration,
            &self.offsets.acceleration,
        ));

        if sample.acceleration.is_some() {
            gate(
                &mut self.streams[ACCELERATION],
                &acceleration,
                &motion::ACCELERATION,
                &settings.acceleration,
                first,
                values,
                &mut signals,
            );
        }
        if sample.acceleration_with_gravity.is_some() {
            let g = with_magnitude(calibrated(
                &self.last_acceleration_with_gravity,
                &self.offsets.acceleration_with_gravity,
            ));
            gate(
                &mut self.streams[WITH_GRAVITY],
                &g,
                &motion::ACCELERATION_WITH_GRAVITY,
                &settings.acceleration_with_gravity,
                first,
                values,
                &mut signals,
            );
        }
        if sample.rotation_rate.is_some() {
            let r = with_magnitude(calibrated(&self.last_rotation, &self.offsets.rotation));
            gate(
                &mut self.streams[ROTATION],
                &r,
                &motion::ROTATION,
                &settings.rotation,
                first,
                values,
                &mut signals,
            );
        }

        if sample.acceleration.is_none() {
            return signals;
        }

        // semi-implicit Euler on the acceleration rotated into world space
        if acceleration[3] > clamp_dead_zone(settings.acceleration.dead_zone) {
            let rotated = transform(matrix, &acceleration);
            self.velocity = add(&self.velocity, &scale(&rotated, dt));
            let mut v = xyz(&self.velocity);
            run(&mut filters.velocity, &mut v);
            self.velocity = with_magnitude(v);
        } else {
            self.velocity = with_magnitude(xyz(&scale(&self.velocity, 0.5)));
        }

        gate(
            &mut self.streams[VELOCITY],
            &self.velocity,
            &motion::VELOCITY,
            &settings.velocity,
            first,
            values,
            &mut signals,
        );

        if self.velocity[3] > clamp_dead_zone(settings.velocity.dead_zone) {
            let mut delta = xyz(&scale(&self.velocity, dt));
            run(&mut filters.position, &mut delta);
            self.position = add(&self.position, &[delta[0], delta[1], delta[2], 0.0]);

            let reported = with_magnitude(xyz(&subtract(
                &self.position,
                &[
                    self.offsets.position[0],
                    self.offsets.position[1],
                    self.offsets.position[2],
                    0.0,
                ],
            )));
            gate(
                &mut self.streams[POSITION],
                &reported,
                &motion::POSITION,
                &settings.position,
                first,
                values,
                &mut signals,
            );
        }

        signals
    }
}
