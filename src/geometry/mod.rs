//! Coordinate-space kernel.
//!
//! Three incompatible point/size types, one per coordinate space, plus the
//! explicit conversions between them and the logical timing-mark grid that
//! matching operates on.

mod convert;
mod coord;
mod grid;
mod rect;
mod sheet;
mod space;

pub use convert::{
    definition_point_to_document_point, document_point_to_definition_point,
    document_point_to_image_point, document_size_to_image_size, image_point_to_document_point,
    image_size_to_document_size, PixelDensity, DOCUMENT_POINTS_PER_INCH,
};
pub use coord::{Point, Size};
pub use grid::{
    compare_column_then_side_then_row, compare_side_then_column_then_row, compare_side_then_row,
    definition_point_to_grid_location, grid_location_to_definition_point, GridEntry, GridLocation,
    GridPoint, Side, DEFINITION_COLUMN_SPACING, DEFINITION_ROW_SPACING,
};
pub use rect::Rect;
pub use sheet::Sheet;
pub use space::{Definition, Document, Image};
