//! Fixed-size vector and matrix helpers for the motion pipeline.
//!
//! Vectors carry four slots: `x`, `y`, `z` and a fourth slot that the motion
//! code uses for the magnitude of the first three. Matrices are 4x4, row-major.

use std::f64::consts::PI;

pub type Vec3 = [f64; 3];
pub type Vec4 = [f64; 4];
pub type Matrix4 = [f64; 16];

pub const DOUBLE_PI: f64 = PI * 2.0;
pub const HALF_PI: f64 = PI / 2.0;
pub const DEGREES_TO_RADIANS: f64 = PI / 180.0;

pub fn identity_matrix() -> Matrix4 {
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

/// Writes the rotation for Euler-like angles `(x, y, z)` into the upper-left
/// 3x3 block of `m`. The translation column and last row are left alone.
pub fn build_rotation_matrix(x: f64, y: f64, z: f64, m: &mut Matrix4) {
    let (sx, cx) = x.sin_cos();
    let (sy, cy) = y.sin_cos();
    let (sz, cz) = z.sin_cos();
    let cycz = cy * cz;
    let cysz = cy * sz;

    m[0] = cx * cycz - sx * sz;
    m[1] = cx * cysz + sx * cz;
    m[2] = -cx * sy;

    m[4] = -sx * cycz - cx * sz;
    m[5] = -sx * cysz + cx * cz;
    m[6] = sx * sy;

    m[8] = sy * cz;
    m[9] = sy * sz;
    m[10] = cy;
}

/// Rotation matrix for `(x, y, z)`, starting from identity.
pub fn rotation_matrix(x: f64, y: f64, z: f64) -> Matrix4 {
    let mut m = identity_matrix();
    build_rotation_matrix(x, y, z, &mut m);
    m
}

/// Transforms the xyz part of `v` by `m`, including the translation column.
/// The fourth slot of the result is left at zero.
pub fn transform(m: &Matrix4, v: &Vec4) -> Vec4 {
    [
        m[0] * v[0] + m[1] * v[1] + m[2] * v[2] + m[3],
        m[4] * v[0] + m[5] * v[1] + m[6] * v[2] + m[7],
        m[8] * v[0] + m[9] * v[1] + m[10] * v[2] + m[11],
        0.0,
    ]
}

pub fn add(a: &Vec4, b: &Vec4) -> Vec4 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3]]
}

pub fn subtract(a: &Vec4, b: &Vec4) -> Vec4 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3]]
}

pub fn scale(v: &Vec4, s: f64) -> Vec4 {
    [v[0] * s, v[1] * s, v[2] * s, v[3] * s]
}

/// Length of the xyz part; the fourth slot is ignored.
pub fn magnitude(v: &[f64]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub fn dot3(a: &[f64], b: &[f64]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Normalizes the xyz part to unit length. A zero vector stays zero.
pub fn unit(v: Vec3) -> Vec3 {
    let length = magnitude(&v);
    if length > 0.0 {
        [v[0] / length, v[1] / length, v[2] / length]
    } else {
        v
    }
}

/// Angle between two unit vectors, safe against rounding outside `[-1, 1]`.
pub fn angle_between(a: &Vec3, b: &Vec3) -> f64 {
    dot3(a, b).clamp(-1.0, 1.0).acos()
}

/// Folds `value` back into `[-limit, limit]` when it overshoots by less than
/// one period. Values already inside the range are returned unchanged.
pub fn wrap_angle(value: f64, limit: f64) -> f64 {
    if value > limit {
        value % limit - limit
    } else if value < -limit {
        limit + value % limit
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn zero_rotation_is_identity() {
        let m = rotation_matrix(0.0, 0.0, 0.0);
        for (a, b) in m.iter().zip(identity_matrix().iter()) {
            assert!((a - b).abs() < EPS);
        }
    }

    #[test]
    fn transform_by_identity_keeps_vector() {
        let v = [1.5, -2.0, 0.25, 9.0];
        let out = transform(&identity_matrix(), &v);
        assert_eq!(out, [1.5, -2.0, 0.25, 0.0]);
    }

    #[test]
    fn rotation_preserves_length() {
        let m = rotation_matrix(0.3, -1.1, 2.4);
        let v = [3.0, 4.0, 12.0, 0.0];
        let out = transform(&m, &v);
        assert!((magnitude(&out) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn magnitude_ignores_fourth_slot() {
        assert_eq!(magnitude(&[3.0, 4.0, 0.0, 100.0]), 5.0);
    }

    #[test]
    fn angle_between_clamps_rounding() {
        let a = unit([1.0, 1.0, 1.0]);
        assert!(angle_between(&a, &a) < 1e-6);
        let b = [-a[0], -a[1], -a[2]];
        assert!((angle_between(&a, &b) - PI).abs() < 1e-6);
    }

    #[test]
    fn wrap_angle_folds_overshoot() {
        assert!((wrap_angle(PI + 0.5, PI) - (-PI + 0.5)).abs() < EPS);
        assert!((wrap_angle(-PI - 0.5, PI) - (PI - 0.5)).abs() < EPS);
        assert_eq!(wrap_angle(1.0, PI), 1.0);
    }
}
