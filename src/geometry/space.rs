//! Coordinate space marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! between the three coordinate systems a ballot passes through at compile
//! time. Values tagged with one space can only be moved into another through
//! the explicit conversions in [`super::convert`].

use std::fmt;

/// Marker type for AccuVote definition coordinates.
///
/// These are the `OX`/`OY` values declared in the ballot definition XML. The
/// origin is the top-left of the front page, the Y axis increases downward,
/// and the back page continues below the front page as if both sides were a
/// single tall sheet.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Definition {}

/// Marker type for rendered-image pixel coordinates.
///
/// Image coordinates are measured in pixels of a page rendered at a known
/// [`PixelDensity`](super::PixelDensity), with (0, 0) at the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Image {}

/// Marker type for output-document coordinates.
///
/// Document coordinates are measured in points (1/72 inch) with (0, 0) at
/// the bottom-left corner of the page, so the Y axis increases upward.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {}

impl fmt::Debug for Definition {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Definition has no variants
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Image has no variants
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Document has no variants
    }
}
