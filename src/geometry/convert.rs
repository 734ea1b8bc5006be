//! Conversions between coordinate spaces.
//!
//! Every conversion takes the context it depends on (pixel density, page
//! size, sheet offset) as an explicit argument. There are no `From` impls
//! between spaces.

use serde::{Deserialize, Serialize};

use super::coord::{Point, Size};
use super::space::{Definition, Document, Image};

/// Points per inch in the output document format.
pub const DOCUMENT_POINTS_PER_INCH: f64 = 72.0;

/// Pixels per inch of a rendered page image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PixelDensity(pub f64);

impl PixelDensity {
    /// Document points per image pixel at this density.
    #[inline]
    fn points_per_pixel(self) -> f64 {
        DOCUMENT_POINTS_PER_INCH / self.0
    }
}

/// Converts an image-space size to a document-space size.
pub fn image_size_to_document_size(density: PixelDensity, size: Size<Image>) -> Size<Document> {
    let scale = density.points_per_pixel();
    Size::new(size.width * scale, size.height * scale)
}

/// Converts a document-space size to an image-space size.
pub fn document_size_to_image_size(density: PixelDensity, size: Size<Document>) -> Size<Image> {
    let scale = density.points_per_pixel();
    Size::new(size.width / scale, size.height / scale)
}

/// Converts an image-space point to a document-space point on a page of
/// `page_size`, flipping the Y axis.
pub fn image_point_to_document_point(
    page_size: Size<Document>,
    density: PixelDensity,
    point: Point<Image>,
) -> Point<Document> {
    let scale = density.points_per_pixel();
    Point::new(point.x * scale, page_size.height - point.y * scale)
}

/// Converts a document-space point on a page of `page_size` to an
/// image-space point.
pub fn document_point_to_image_point(
    page_size: Size<Document>,
    density: PixelDensity,
    point: Point<Document>,
) -> Point<Image> {
    let scale = density.points_per_pixel();
    Point::new(point.x / scale, (page_size.height - point.y) / scale)
}

/// Converts a document-space point to definition space.
///
/// `sheet_offset` is the definition-space Y offset of the page: zero for the
/// front, the front page height for the back.
pub fn document_point_to_definition_point(
    page_size: Size<Document>,
    sheet_offset: f64,
    point: Point<Document>,
) -> Point<Definition> {
    Point::new(point.x, page_size.height - point.y + sheet_offset)
}

/// Converts a definition-space point back to document space on the page
/// identified by `sheet_offset`.
pub fn definition_point_to_document_point(
    page_size: Size<Document>,
    sheet_offset: f64,
    point: Point<Definition>,
) -> Point<Document> {
    Point::new(point.x, page_size.height - (point.y - sheet_offset))
}
