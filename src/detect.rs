//! Boundary with the external image-detection collaborator.
//!
//! The converter never inspects pixels. A [`TemplateDetector`] turns a pair
//! of rendered template pages into timing-mark grids and bubble positions;
//! [`PrecomputedDetector`] replays results produced ahead of time, which is
//! how the CLI and the tests drive the pipeline.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::election::PaperSize;
use crate::error::AccuvoteError;
use crate::geometry::{GridPoint, Image, PixelDensity, Point, Rect, Side, Size, Sheet};

/// Number of timing-mark columns and rows on one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub columns: u32,
    pub rows: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub paper_size: PaperSize,
    pub pixels_per_inch: PixelDensity,
    pub canvas_size: Size<Image>,
    pub timing_mark_size: Size<Image>,
    pub grid_size: GridSize,
}

/// Complete (interpolated) timing marks of one page, in image space.
///
/// Left and right marks are ordered top to bottom, top and bottom marks left
/// to right.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingMarkGrid {
    pub geometry: Geometry,
    pub left_rects: Vec<Rect<Image>>,
    pub right_rects: Vec<Rect<Image>>,
    pub top_rects: Vec<Rect<Image>>,
    pub bottom_rects: Vec<Rect<Image>>,
}

impl TimingMarkGrid {
    /// Image-space center of a (possibly fractional) grid cell.
    ///
    /// Interpolates between the left and right timing marks of the row, and
    /// between adjacent rows for fractional rows.
    pub fn point_for_location(&self, column: f64, row: f64) -> Option<Point<Image>> {
        let columns = self.geometry.grid_size.columns;
        if columns < 2 || !column.is_finite() || !row.is_finite() || row < 0.0 {
            return None;
        }
        let t = column / f64::from(columns - 1);

        let row_point = |index: usize| -> Option<Point<Image>> {
            let left = self.left_rects.get(index)?.center();
            let right = self.right_rects.get(index)?.center();
            Some(Point::new(
                left.x + (right.x - left.x) * t,
                left.y + (right.y - left.y) * t,
            ))
        };

        let upper = row.floor();
        let fraction = row - upper;
        let upper_point = row_point(upper as usize)?;
        if fraction == 0.0 {
            return Some(upper_point);
        }
        let lower_point = row_point(upper as usize + 1)?;
        Some(Point::new(
            upper_point.x + (lower_point.x - upper_point.x) * fraction,
            upper_point.y + (lower_point.y - upper_point.y) * fraction,
        ))
    }

    /// A grid of evenly spaced marks, the first (top-left) centered at
    /// `first_mark`. Mark counts come from `geometry.grid_size`.
    pub fn regular(geometry: Geometry, first_mark: Point<Image>, spacing: Size<Image>) -> Self {
        let GridSize { columns, rows } = geometry.grid_size;
        let mark = |column: u32, row: u32| {
            let center = Point::<Image>::new(
                first_mark.x + f64::from(column) * spacing.width,
                first_mark.y + f64::from(row) * spacing.height,
            );
            let size = geometry.timing_mark_size;
            Rect::from_xywh(
                center.x - size.width / 2.0,
                center.y - size.height / 2.0,
                size.width,
                size.height,
            )
        };
        let last_column = columns.saturating_sub(1);
        let last_row = rows.saturating_sub(1);
        Self {
            left_rects: (0..rows).map(|row| mark(0, row)).collect(),
            right_rects: (0..rows).map(|row| mark(last_column, row)).collect(),
            top_rects: (0..columns).map(|column| mark(column, 0)).collect(),
            bottom_rects: (0..columns).map(|column| mark(column, last_row)).collect(),
            geometry,
        }
    }

    /// Image-space center of a bubble.
    pub fn point_for_bubble(&self, bubble: GridPoint) -> Option<Point<Image>> {
        self.point_for_location(f64::from(bubble.column), f64::from(bubble.row))
    }

    pub fn all_rects(&self) -> impl Iterator<Item = &Rect<Image>> {
        self.left_rects
            .iter()
            .chain(&self.right_rects)
            .chain(&self.top_rects)
            .chain(&self.bottom_rects)
    }
}

/// Page identity decoded from the bottom row of timing marks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub side: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<u32>,
}

/// What the detector found on one template page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateGridAndBubbles {
    pub grid: TimingMarkGrid,
    pub bubbles: Vec<GridPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum DetectionError {
    #[error("no timing marks found on {side}")]
    MissingTimingMarks { side: Side },

    #[error("could not read {side} page: {message}")]
    UnreadablePage { side: Side, message: String },
}

impl DetectionError {
    pub fn side(&self) -> Side {
        match self {
            DetectionError::MissingTimingMarks { side }
            | DetectionError::UnreadablePage { side, .. } => *side,
        }
    }
}

/// Finds timing-mark grids and template bubbles on a front/back page pair.
pub trait TemplateDetector {
    type Page;

    fn find_template_grids_and_bubbles(
        &self,
        pages: Sheet<&Self::Page>,
    ) -> Result<Sheet<TemplateGridAndBubbles>, DetectionError>;
}

/// A detector whose "pages" are already-detected results.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrecomputedDetector;

impl TemplateDetector for PrecomputedDetector {
    type Page = TemplateGridAndBubbles;

    fn find_template_grids_and_bubbles(
        &self,
        pages: Sheet<&Self::Page>,
    ) -> Result<Sheet<TemplateGridAndBubbles>, DetectionError> {
        for (side, page) in pages.iter() {
            if page.grid.left_rects.is_empty() || page.grid.right_rects.is_empty() {
                return Err(DetectionError::MissingTimingMarks { side });
            }
        }
        Ok(pages.map(|_, page| page.clone()))
    }
}

/// Serialized detector output for one ballot template document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedTemplate {
    pub pages: Vec<TemplateGridAndBubbles>,
}

impl DetectedTemplate {
    /// Reads detector output from a JSON file.
    pub fn read_json(path: &Path) -> Result<Self, AccuvoteError> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| AccuvoteError::DetectionJsonParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The front/back pair, if the template has exactly two pages.
    pub fn sheet(&self) -> Option<Sheet<&TemplateGridAndBubbles>> {
        match self.pages.as_slice() {
            [front, back] => Some(Sheet::new(front, back)),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::geometry::{DEFINITION_COLUMN_SPACING, DEFINITION_ROW_SPACING};

    /// A 72 ppi template page whose timing marks line up exactly with the
    /// definition-space grid.
    pub fn page(
        paper_size: PaperSize,
        bubbles: &[(i32, i32)],
        metadata: Option<PageMetadata>,
    ) -> TemplateGridAndBubbles {
        let canvas_size = {
            let size = paper_size.document_size();
            Size::new(size.width, size.height)
        };
        let rows = match paper_size {
            PaperSize::Letter => 60,
            PaperSize::Legal => 90,
        };
        let geometry = Geometry {
            paper_size,
            pixels_per_inch: PixelDensity(72.0),
            canvas_size,
            timing_mark_size: Size::new(10.0, 4.0),
            grid_size: GridSize { columns: 34, rows },
        };
        let first_mark = Point::new(
            236.126 - 12.0 * DEFINITION_COLUMN_SPACING,
            245.768 - 9.0 * DEFINITION_ROW_SPACING,
        );
        TemplateGridAndBubbles {
            grid: TimingMarkGrid::regular(
                geometry,
                first_mark,
                Size::new(DEFINITION_COLUMN_SPACING, DEFINITION_ROW_SPACING),
            ),
            bubbles: bubbles
                .iter()
                .map(|&(column, row)| GridPoint::new(column, row))
                .collect(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TimingMarkGrid {
        let mark = |x: f64, y: f64| Rect::from_xywh(x - 2.0, y - 1.0, 4.0, 2.0);
        TimingMarkGrid {
            geometry: Geometry {
                paper_size: PaperSize::Letter,
                pixels_per_inch: PixelDensity(72.0),
                canvas_size: Size::new(612.0, 792.0),
                timing_mark_size: Size::new(4.0, 2.0),
                grid_size: GridSize {
                    columns: 11,
                    rows: 3,
                },
            },
            left_rects: vec![mark(10.0, 100.0), mark(10.0, 110.0), mark(10.0, 120.0)],
            right_rects: vec![mark(110.0, 100.0), mark(110.0, 110.0), mark(110.0, 122.0)],
            top_rects: Vec::new(),
            bottom_rects: Vec::new(),
        }
    }

    #[test]
    fn test_point_for_location_interpolates_columns() {
        let point = grid().point_for_location(5.0, 1.0).unwrap();
        assert_eq!(point, Point::new(60.0, 110.0));
    }

    #[test]
    fn test_point_for_location_accounts_for_skew() {
        let point = grid().point_for_location(10.0, 2.0).unwrap();
        assert_eq!(point, Point::new(110.0, 122.0));
    }

    #[test]
    fn test_point_for_location_fractional_row() {
        let point = grid().point_for_location(0.0, 0.5).unwrap();
        assert_eq!(point, Point::new(10.0, 105.0));
    }

    #[test]
    fn test_point_outside_grid() {
        assert_eq!(grid().point_for_location(0.0, 3.0), None);
        assert_eq!(grid().point_for_location(0.0, -1.0), None);
    }

    #[test]
    fn test_regular_grid_places_marks() {
        let page = test_support::page(PaperSize::Letter, &[], None);
        assert_eq!(page.grid.left_rects.len(), 60);
        assert_eq!(page.grid.top_rects.len(), 34);
        let reference = page.grid.point_for_bubble(GridPoint::new(12, 9)).unwrap();
        assert!((reference.x - 236.126).abs() < 1e-9);
        assert!((reference.y - 245.768).abs() < 1e-9);
    }

    #[test]
    fn test_precomputed_detector_requires_timing_marks() {
        let good = TemplateGridAndBubbles {
            grid: grid(),
            bubbles: vec![GridPoint::new(1, 1)],
            metadata: None,
        };
        let mut bad = good.clone();
        bad.grid.right_rects.clear();
        let err = PrecomputedDetector
            .find_template_grids_and_bubbles(Sheet::new(&good, &bad))
            .unwrap_err();
        assert_eq!(err.side(), Side::Back);
    }
}
