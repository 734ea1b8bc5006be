//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use super::coord::{Point, Size};

/// An axis-aligned rectangle stored as its minimum corner plus a size.
///
/// In [`Image`](super::Image) space the minimum corner is the top-left; in
/// [`Document`](super::Document) space it is the bottom-left. The type does
/// not enforce a non-negative size.
#[derive(Clone, Copy, PartialEq)]
pub struct Rect<TSpace> {
    pub origin: Point<TSpace>,
    pub size: Size<TSpace>,
}

impl<TSpace> Rect<TSpace> {
    /// Creates a rectangle from its minimum corner and size.
    #[inline]
    pub fn new(origin: Point<TSpace>, size: Size<TSpace>) -> Self {
        Self { origin, size }
    }

    /// Creates a rectangle from explicit x, y, width and height.
    #[inline]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// The center point of the rectangle.
    #[inline]
    pub fn center(&self) -> Point<TSpace> {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Returns true if `point` lies inside the rectangle (edges included).
    pub fn contains(&self, point: &Point<TSpace>) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }
}

impl<TSpace> std::fmt::Debug for Rect<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rect")
            .field("x", &self.origin.x)
            .field("y", &self.origin.y)
            .field("width", &self.size.width)
            .field("height", &self.size.height)
            .finish()
    }
}

// Custom serde implementation to avoid TSpace: Serialize/Deserialize bounds
impl<TSpace> Serialize for Rect<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Rect", 4)?;
        state.serialize_field("x", &self.origin.x)?;
        state.serialize_field("y", &self.origin.y)?;
        state.serialize_field("width", &self.size.width)?;
        state.serialize_field("height", &self.size.height)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for Rect<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RectData {
            x: f64,
            y: f64,
            width: f64,
            height: f64,
        }
        let data = RectData::deserialize(deserializer)?;
        Ok(Rect::from_xywh(data.x, data.y, data.width, data.height))
    }
}
