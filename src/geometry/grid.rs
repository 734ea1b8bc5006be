//! The logical timing-mark grid.
//!
//! Matching never compares raw coordinates. Everything placed on a ballot is
//! reduced to a [`GridLocation`] (side, column, row) and compared by topology
//! alone.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::coord::Point;
use super::space::Definition;

/// Which face of a ballot card something is printed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Front => write!(f, "front"),
            Side::Back => write!(f, "back"),
        }
    }
}

/// An integer position on one side's timing-mark grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub column: i32,
    pub row: i32,
}

impl GridPoint {
    pub fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }
}

/// Anything that can be placed on the front/back timing-mark grid.
pub trait GridEntry {
    fn side(&self) -> Side;
    fn column(&self) -> i32;
    fn row(&self) -> i32;
}

/// A fully-qualified grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLocation {
    pub side: Side,
    pub column: i32,
    pub row: i32,
}

impl GridLocation {
    pub fn new(side: Side, column: i32, row: i32) -> Self {
        Self { side, column, row }
    }

    pub fn on(side: Side, point: GridPoint) -> Self {
        Self::new(side, point.column, point.row)
    }

    pub fn point(&self) -> GridPoint {
        GridPoint::new(self.column, self.row)
    }
}

impl GridEntry for GridLocation {
    fn side(&self) -> Side {
        self.side
    }

    fn column(&self) -> i32 {
        self.column
    }

    fn row(&self) -> i32 {
        self.row
    }
}

impl<T: GridEntry + ?Sized> GridEntry for &T {
    fn side(&self) -> Side {
        (**self).side()
    }

    fn column(&self) -> i32 {
        (**self).column()
    }

    fn row(&self) -> i32 {
        (**self).row()
    }
}

/// Orders entries front before back, then top to bottom.
pub fn compare_side_then_row<T: GridEntry, U: GridEntry>(a: &T, b: &U) -> Ordering {
    a.side()
        .cmp(&b.side())
        .then_with(|| a.row().cmp(&b.row()))
}

/// Orders entries left to right, then front before back, then top to bottom.
pub fn compare_column_then_side_then_row<T: GridEntry, U: GridEntry>(a: &T, b: &U) -> Ordering {
    a.column()
        .cmp(&b.column())
        .then_with(|| compare_side_then_row(a, b))
}

/// Orders entries front before back, then left to right, then top to bottom.
pub fn compare_side_then_column_then_row<T: GridEntry, U: GridEntry>(a: &T, b: &U) -> Ordering {
    a.side()
        .cmp(&b.side())
        .then_with(|| a.column().cmp(&b.column()))
        .then_with(|| a.row().cmp(&b.row()))
}

/// Definition-space distance between adjacent timing-mark rows.
pub const DEFINITION_ROW_SPACING: f64 = 9.0;

/// Definition-space distance between adjacent timing-mark columns.
pub const DEFINITION_COLUMN_SPACING: f64 = 108.0 / 7.0;

// Calibration: a candidate declared at (236.126, 245.768) sits on column 12,
// row 9 of the front grid.
const REFERENCE_POINT: (f64, f64) = (236.126, 245.768);
const REFERENCE_GRID: (f64, f64) = (12.0, 9.0);

fn definition_origin() -> (f64, f64) {
    (
        REFERENCE_POINT.0 - DEFINITION_COLUMN_SPACING * REFERENCE_GRID.0,
        REFERENCE_POINT.1 - DEFINITION_ROW_SPACING * REFERENCE_GRID.1,
    )
}

/// Maps a declared definition-space oval center onto the grid.
///
/// The definition format places the back page directly below the front, so a
/// point whose Y is past `front_page_height` lands on the back side with the
/// front page height subtracted.
pub fn definition_point_to_grid_location(
    point: Point<Definition>,
    front_page_height: f64,
) -> GridLocation {
    let (side, y) = if point.y >= front_page_height {
        (Side::Back, point.y - front_page_height)
    } else {
        (Side::Front, point.y)
    };
    let (origin_x, origin_y) = definition_origin();
    GridLocation::new(
        side,
        ((point.x - origin_x) / DEFINITION_COLUMN_SPACING).round() as i32,
        ((y - origin_y) / DEFINITION_ROW_SPACING).round() as i32,
    )
}

/// The inverse of [`definition_point_to_grid_location`] for exact grid points.
pub fn grid_location_to_definition_point(
    location: GridLocation,
    front_page_height: f64,
) -> Point<Definition> {
    let (origin_x, origin_y) = definition_origin();
    let offset = match location.side {
        Side::Front => 0.0,
        Side::Back => front_page_height,
    };
    Point::new(
        origin_x + f64::from(location.column) * DEFINITION_COLUMN_SPACING,
        origin_y + f64::from(location.row) * DEFINITION_ROW_SPACING + offset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_point_maps_to_calibration_cell() {
        let location = definition_point_to_grid_location(Point::new(236.126, 245.768), 792.0);
        assert_eq!(location, GridLocation::new(Side::Front, 12, 9));
    }

    #[test]
    fn test_back_side_points_subtract_front_height() {
        let front = grid_location_to_definition_point(GridLocation::new(Side::Front, 3, 20), 792.0);
        let back = grid_location_to_definition_point(GridLocation::new(Side::Back, 3, 20), 792.0);
        assert_eq!(back.y - front.y, 792.0);
        assert_eq!(
            definition_point_to_grid_location(back, 792.0),
            GridLocation::new(Side::Back, 3, 20)
        );
    }

    #[test]
    fn test_rounds_to_nearest_cell() {
        let exact = grid_location_to_definition_point(GridLocation::new(Side::Front, 7, 30), 1008.0);
        let nudged = Point::new(exact.x + 3.0, exact.y - 2.5);
        assert_eq!(
            definition_point_to_grid_location(nudged, 1008.0),
            GridLocation::new(Side::Front, 7, 30)
        );
    }

    #[test]
    fn test_orderings() {
        let a = GridLocation::new(Side::Back, 1, 2);
        let b = GridLocation::new(Side::Front, 2, 1);
        assert_eq!(compare_side_then_row(&a, &b), Ordering::Greater);
        assert_eq!(compare_column_then_side_then_row(&a, &b), Ordering::Less);
        assert_eq!(compare_side_then_column_then_row(&a, &b), Ordering::Greater);
    }
}
