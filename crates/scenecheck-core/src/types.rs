//! Spatial and common types

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A 3D vector
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Self = Self {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(arr: [f64; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Component-wise absolute value
    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Whether every component is within `tolerance` of `other`
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// A node transform: translation, rotation (Euler degrees, XYZ order) and scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub translate: Vec3,
    #[serde(default)]
    pub rotate: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translate: Vec3::ZERO,
        rotate: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn with_translate(mut self, translate: Vec3) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_rotate(mut self, rotate: Vec3) -> Self {
        self.rotate = rotate;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// True when every channel is within `tolerance` of identity
    pub fn is_identity(&self, tolerance: f64) -> bool {
        self.translate.approx_eq(&Vec3::ZERO, tolerance)
            && self.rotate.approx_eq(&Vec3::ZERO, tolerance)
            && self.scale.approx_eq(&Vec3::ONE, tolerance)
    }

    /// Convert to a 4x4 transformation matrix (column-major, T * R * S)
    pub fn to_matrix(&self) -> [[f64; 4]; 4] {
        let (px, py, pz) = (
            self.rotate.x.to_radians(),
            self.rotate.y.to_radians(),
            self.rotate.z.to_radians(),
        );

        let (sx, cx) = (px.sin(), px.cos());
        let (sy, cy) = (py.sin(), py.cos());
        let (sz, cz) = (pz.sin(), pz.cos());

        // Rz * Ry * Rx: X is applied first
        let (r00, r01, r02, r10, r11, r12, r20, r21, r22) = (
            cy * cz,
            sx * sy * cz - cx * sz,
            cx * sy * cz + sx * sz,
            cy * sz,
            sx * sy * sz + cx * cz,
            cx * sy * sz - sx * cz,
            -sy,
            sx * cy,
            cx * cy,
        );

        [
            [r00 * self.scale.x, r10 * self.scale.x, r20 * self.scale.x, 0.0],
            [r01 * self.scale.y, r11 * self.scale.y, r21 * self.scale.y, 0.0],
            [r02 * self.scale.z, r12 * self.scale.z, r22 * self.scale.z, 0.0],
            [self.translate.x, self.translate.y, self.translate.z, 1.0],
        ]
    }
}

impl Transform {
    /// Decompose a column-major `T * R * S` matrix.
    ///
    /// A mirrored basis comes back as a negative X scale. Shear cannot be
    /// represented and is dropped.
    pub fn from_matrix(m: &[[f64; 4]; 4]) -> Self {
        let column = |i: usize| Vec3::new(m[i][0], m[i][1], m[i][2]);
        let (c0, c1, c2) = (column(0), column(1), column(2));

        let mut scale = Vec3::new(c0.length(), c1.length(), c2.length());
        if c0.dot(&c1.cross(&c2)) < 0.0 {
            scale.x = -scale.x;
        }
        let unit = |c: Vec3, s: f64| if s.abs() > 1e-12 { c * (1.0 / s) } else { c };
        let (x, y, z) = (unit(c0, scale.x), unit(c1, scale.y), unit(c2, scale.z));

        // Rz * Ry * Rx, rows indexed as in `to_matrix`
        let (r00, r10, r20) = (x.x, x.y, x.z);
        let (r11, r21) = (y.y, y.z);
        let (r12, r22) = (z.y, z.z);

        let ry = (-r20).clamp(-1.0, 1.0).asin();
        let (rx, rz) = if ry.cos().abs() > 1e-9 {
            (r21.atan2(r22), r10.atan2(r00))
        } else {
            // Gimbal lock: fold Z into X
            ((-r12).atan2(r11), 0.0)
        };

        Self {
            translate: Vec3::new(m[3][0], m[3][1], m[3][2]),
            rotate: Vec3::new(rx.to_degrees(), ry.to_degrees(), rz.to_degrees()),
            scale,
        }
    }
}

/// Element-wise comparison of two 4x4 matrices
pub fn mat4_approx_eq(a: &[[f64; 4]; 4], b: &[[f64; 4]; 4], tolerance: f64) -> bool {
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .all(|(x, y)| (x - y).abs() <= tolerance)
}

/// Multiply two 4x4 column-major matrices
pub fn mat4_mul(a: &[[f64; 4]; 4], b: &[[f64; 4]; 4]) -> [[f64; 4]; 4] {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }
    result
}

/// Apply a column-major matrix to a point
pub fn transform_point(m: &[[f64; 4]; 4], p: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0],
        m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1],
        m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let v1 = Vec3::new(1.0, 2.0, 3.0);
        let v2 = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(v1 + v2, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(v2 - v1, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(v1 * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(Vec3::new(-1.0, 2.0, -3.0).abs(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_transform_default_is_identity() {
        let t = Transform::default();
        assert!(t.is_identity(1e-4));
        assert!(!t.with_scale(Vec3::new(1.0, -1.0, 1.0)).is_identity(1e-4));
    }

    #[test]
    fn test_transform_point_applies_scale_then_translate() {
        let t = Transform::IDENTITY
            .with_translate(Vec3::new(10.0, 0.0, 0.0))
            .with_scale(Vec3::new(2.0, 2.0, 2.0));
        let p = transform_point(&t.to_matrix(), Vec3::new(1.0, 1.0, 1.0));
        assert!(p.approx_eq(&Vec3::new(12.0, 2.0, 2.0), 1e-9));
    }

    #[test]
    fn test_rotation_about_z() {
        let t = Transform::IDENTITY.with_rotate(Vec3::new(0.0, 0.0, 90.0));
        let p = transform_point(&t.to_matrix(), Vec3::new(1.0, 0.0, 0.0));
        assert!(p.approx_eq(&Vec3::new(0.0, 1.0, 0.0), 1e-9));
    }

    #[test]
    fn test_vec3_serializes_as_array() {
        let v: Vec3 = toml::from_str::<toml::Table>("v = [1.0, 2.5, -3.0]")
            .unwrap()
            .get("v")
            .cloned()
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(v, Vec3::new(1.0, 2.5, -3.0));
    }

    #[test]
    fn test_from_matrix_recovers_transform() {
        let t = Transform::IDENTITY
            .with_translate(Vec3::new(1.0, -2.0, 3.0))
            .with_rotate(Vec3::new(30.0, -45.0, 60.0))
            .with_scale(Vec3::new(2.0, 0.5, 1.5));
        let back = Transform::from_matrix(&t.to_matrix());
        assert!(back.translate.approx_eq(&t.translate, 1e-9));
        assert!(back.rotate.approx_eq(&t.rotate, 1e-9));
        assert!(back.scale.approx_eq(&t.scale, 1e-9));
    }

    #[test]
    fn test_from_matrix_mirrored_and_gimbal_locked() {
        let mirrored = Transform::IDENTITY.with_scale(Vec3::new(-1.0, 1.0, 1.0));
        assert_eq!(Transform::from_matrix(&mirrored.to_matrix()).scale.x, -1.0);

        let locked = Transform::IDENTITY.with_rotate(Vec3::new(20.0, 90.0, 0.0));
        let back = Transform::from_matrix(&locked.to_matrix());
        assert!(mat4_approx_eq(&back.to_matrix(), &locked.to_matrix(), 1e-9));
    }
}
