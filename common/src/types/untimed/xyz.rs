use nalgebra::Vector3;

use std::ops::{Add, Sub};

use crate::constants::N_XYZ_COORDINATES;

/// 3-axis measurement in the sensor's native units (g, deg/s or uT).
#[derive(Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct XYZ(Vector3<f64>);

impl XYZ {
    pub fn new(data: [f64; N_XYZ_COORDINATES]) -> Self {
        Self(Vector3::from(data))
    }

    pub fn from_vector(data: Vector3<f64>) -> Self {
        Self(data)
    }

    pub fn inner(&self) -> [f64; N_XYZ_COORDINATES] {
        [self.0.x, self.0.y, self.0.z]
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// Euclidean norm of the vector
    pub fn magnitude(&self) -> f64 {
        self.0.norm()
    }
}

impl From<XYZ> for [f64; N_XYZ_COORDINATES] {
    fn from(value: XYZ) -> Self {
        value.inner()
    }
}

impl From<[f64; N_XYZ_COORDINATES]> for XYZ {
    fn from(value: [f64; N_XYZ_COORDINATES]) -> Self {
        Self(Vector3::from(value))
    }
}

impl TryFrom<Vec<f64>> for XYZ {
    type Error = &'static str;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        if value.len() != N_XYZ_COORDINATES {
            return Err("Can't convert to XYZ");
        }
        Ok(Self(Vector3::from_vec(value)))
    }
}

impl Add for XYZ {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for XYZ {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let data = [1.0, 2.0, 3.0];
        let xyz = XYZ::new(data);
        assert_eq!(xyz.inner(), data);
        assert_eq!((xyz.x(), xyz.y(), xyz.z()), (1.0, 2.0, 3.0));
    }

    #[test]
    fn test_try_from_vec() {
        assert!(XYZ::try_from(vec![1.0, 2.0]).is_err());
        assert_eq!(
            XYZ::try_from(vec![1.0, 2.0, 3.0]).unwrap(),
            XYZ::from([1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn test_magnitude() {
        let xyz = XYZ::new([3.0, 4.0, 0.0]);
        assert_eq!(xyz.magnitude(), 5.0);
    }

    #[test]
    fn test_add_sub() {
        let xyz1 = XYZ::new([4.0, 5.0, 6.0]);
        let xyz2 = XYZ::new([1.0, 2.0, 3.0]);
        assert_eq!((xyz1.clone() - xyz2.clone()).inner(), [3.0, 3.0, 3.0]);
        assert_eq!((xyz1 + xyz2).inner(), [5.0, 7.0, 9.0]);
    }
}
