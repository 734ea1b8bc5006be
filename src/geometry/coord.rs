//! Typed points and sizes using PhantomData for compile-time safety.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::Add;

/// A 2D point with a type-level marker for the coordinate space.
///
/// The `TSpace` parameter is one of [`Definition`](super::Definition),
/// [`Image`](super::Image) or [`Document`](super::Document), so points from
/// different spaces cannot be accidentally mixed.
#[derive(Clone, Copy, PartialEq)]
pub struct Point<TSpace> {
    pub x: f64,
    pub y: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> Point<TSpace> {
    /// Creates a new point with the given x and y values.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    /// Returns true if both coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point in the same space.
    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// The point halfway between this point and `other`.
    #[inline]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// A width/height pair with a type-level marker for the coordinate space.
#[derive(Clone, Copy, PartialEq)]
pub struct Size<TSpace> {
    pub width: f64,
    pub height: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> Size<TSpace> {
    /// Creates a new size.
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            _space: PhantomData,
        }
    }
}

impl<TSpace> Add<Size<TSpace>> for Point<TSpace> {
    type Output = Point<TSpace>;

    #[inline]
    fn add(self, rhs: Size<TSpace>) -> Self::Output {
        Point::new(self.x + rhs.width, self.y + rhs.height)
    }
}

impl<TSpace> std::fmt::Debug for Point<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Point")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<TSpace> std::fmt::Debug for Size<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Size")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl<TSpace> Default for Point<TSpace> {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

// Custom serde implementations to avoid TSpace: Serialize/Deserialize bounds
impl<TSpace> Serialize for Point<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Point", 2)?;
        state.serialize_field("x", &self.x)?;
        state.serialize_field("y", &self.y)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for Point<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct PointData {
            x: f64,
            y: f64,
        }
        let data = PointData::deserialize(deserializer)?;
        Ok(Point::new(data.x, data.y))
    }
}

impl<TSpace> Serialize for Size<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Size", 2)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for Size<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct SizeData {
            width: f64,
            height: f64,
        }
        let data = SizeData::deserialize(deserializer)?;
        Ok(Size::new(data.width, data.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Document, Image};

    #[test]
    fn test_point_creation() {
        let point: Point<Image> = Point::new(10.0, 20.0);
        assert_eq!(point.x, 10.0);
        assert_eq!(point.y, 20.0);
    }

    #[test]
    fn test_point_is_finite() {
        let finite: Point<Image> = Point::new(10.0, 20.0);
        assert!(finite.is_finite());

        let nan: Point<Image> = Point::new(f64::NAN, 20.0);
        assert!(!nan.is_finite());
    }

    #[test]
    fn test_point_plus_size() {
        let point: Point<Document> = Point::new(1.0, 2.0);
        let moved = point + Size::new(3.0, -1.0);
        assert_eq!(moved, Point::new(4.0, 1.0));
    }

    #[test]
    fn test_distance_and_midpoint() {
        let a: Point<Image> = Point::new(0.0, 0.0);
        let b: Point<Image> = Point::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.midpoint(&b), Point::new(1.5, 2.0));
    }

    #[test]
    fn test_point_serde_shape() {
        let point: Point<Image> = Point::new(1.5, 2.0);
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"x":1.5,"y":2.0}"#);
        let restored: Point<Image> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, point);
    }
}
