//! Orientation and motion sensor handling.
//!
//! Orientation samples drive the X/Y/Z orientation components and the
//! rotation matrix. Motion samples drive acceleration, acceleration with
//! gravity and rotation rate, plus velocity and position integrated from the
//! rotated acceleration.

pub mod acceleration;
pub mod orientation;

pub use acceleration::{MotionFilters, MotionSample, MotionTracker};
pub use orientation::{OrientationSample, OrientationTracker};

use crate::math::Vec3;

/// How one axis of a calibration call is set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AxisCalibration {
    /// Leave the offset as it is.
    Skip,
    /// Use the last reported value as the new zero.
    #[default]
    Current,
    Value(f64),
}

impl From<f64> for AxisCalibration {
    fn from(value: f64) -> Self {
        AxisCalibration::Value(value)
    }
}

/// Applies one calibration call to an offset vector.
pub(crate) fn calibrate(offset: &mut Vec3, current: &Vec3, axes: [AxisCalibration; 3]) {
    for (i, axis) in axes.into_iter().enumerate() {
        match axis {
            AxisCalibration::Skip => {}
            AxisCalibration::Current => offset[i] = current[i],
            AxisCalibration::Value(value) => offset[i] = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_per_axis() {
        let mut offset = [1.0, 2.0, 3.0];
        calibrate(
            &mut offset,
            &[7.0, 8.0, 9.0],
            [
                AxisCalibration::Skip,
                AxisCalibration::Current,
                AxisCalibration::Value(0.5),
            ],
        );
        assert_eq!(offset, [1.0, 8.0, 0.5]);
    }
}
