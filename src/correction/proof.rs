//! Proofing annotations.
//!
//! A proof overlays the template with what detection and matching found:
//! timing marks, the interpolated grid, matched bubbles with their option
//! labels, and anything left unmatched. Drawing goes through [`ProofCanvas`]
//! so the same annotations can target a PDF renderer or, as here, a JSON
//! log for review tooling.

use serde::Serialize;

use crate::definition::BallotDefinition;
use crate::detect::{TemplateGridAndBubbles, TimingMarkGrid};
use crate::geometry::{
    image_point_to_document_point, image_size_to_document_size, Document, GridPoint, Image, Point,
    Rect, Sheet, Side, Size,
};
use crate::matching::{MatchResult, OptionRef, Unmatched, YesNo};

const GRID_LINE_THICKNESS: f64 = 0.5;
const CROSSHAIR_SIZE: f64 = 2.0;
const QUESTION_MARK_FONT_SIZE: f64 = 14.0;
const LABEL_MAX_FONT_SIZE: f64 = 10.0;
const LABEL_MIN_FONT_SIZE: f64 = 5.0;
const LABEL_MAX_WIDTH: f64 = 80.0;
const LEGEND_TITLE_FONT_SIZE: f64 = 14.0;
const LEGEND_FONT_SIZE: f64 = 10.0;
const LEGEND_MARGIN: f64 = 20.0;
const LEGEND_PADDING: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const DARK_RED: Color = Color::rgb(0.55, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 0.8, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const PURPLE: Color = Color::rgb(0.4, 0.22, 0.71);
}

/// How to mark a bubble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BubbleMark {
    Crosshair,
    QuestionMark,
}

/// A drawing surface with one page per side, in document points with the
/// origin at the bottom left.
pub trait ProofCanvas {
    fn fill_rect(&mut self, side: Side, rect: Rect<Document>, color: Color);

    fn line(
        &mut self,
        side: Side,
        from: Point<Document>,
        to: Point<Document>,
        thickness: f64,
        color: Color,
    );

    /// Draws `text` with its bottom-left corner at `origin`.
    fn text(
        &mut self,
        side: Side,
        origin: Point<Document>,
        text: &str,
        font_size: f64,
        color: Color,
    );

    fn text_width(&self, text: &str, font_size: f64) -> f64;

    fn text_height(&self, font_size: f64) -> f64 {
        font_size
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Annotation {
    Rect {
        rect: Rect<Document>,
        color: Color,
    },
    Line {
        from: Point<Document>,
        to: Point<Document>,
        thickness: f64,
        color: Color,
    },
    Text {
        origin: Point<Document>,
        text: String,
        font_size: f64,
        color: Color,
    },
}

/// A canvas that records annotations instead of rendering them.
///
/// Text is measured as half an em per character, which is close enough for
/// the proportional fonts proofs use.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnnotationLog {
    pub pages: Sheet<Vec<Annotation>>,
}

impl ProofCanvas for AnnotationLog {
    fn fill_rect(&mut self, side: Side, rect: Rect<Document>, color: Color) {
        self.pages.get_mut(side).push(Annotation::Rect { rect, color });
    }

    fn line(
        &mut self,
        side: Side,
        from: Point<Document>,
        to: Point<Document>,
        thickness: f64,
        color: Color,
    ) {
        self.pages.get_mut(side).push(Annotation::Line {
            from,
            to,
            thickness,
            color,
        });
    }

    fn text(
        &mut self,
        side: Side,
        origin: Point<Document>,
        text: &str,
        font_size: f64,
        color: Color,
    ) {
        self.pages.get_mut(side).push(Annotation::Text {
            origin,
            text: text.to_string(),
            font_size,
            color,
        });
    }

    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        0.5 * font_size * text.chars().count() as f64
    }
}

/// Maps image-space points of one page into proof coordinates.
struct PageTransform {
    grid: TimingMarkGrid,
    page_size: Size<Document>,
}

impl PageTransform {
    fn new(grid: &TimingMarkGrid) -> Self {
        let geometry = &grid.geometry;
        Self {
            page_size: image_size_to_document_size(geometry.pixels_per_inch, geometry.canvas_size),
            grid: grid.clone(),
        }
    }

    fn point(&self, point: Point<Image>) -> Point<Document> {
        image_point_to_document_point(self.page_size, self.grid.geometry.pixels_per_inch, point)
    }

    fn size(&self, size: Size<Image>) -> Size<Document> {
        image_size_to_document_size(self.grid.geometry.pixels_per_inch, size)
    }

    fn bubble(&self, bubble: GridPoint) -> Option<Point<Document>> {
        self.grid.point_for_bubble(bubble).map(|p| self.point(p))
    }
}

/// Fills every timing mark of `grid`.
pub fn annotate_timing_marks(canvas: &mut impl ProofCanvas, side: Side, grid: &TimingMarkGrid) {
    let transform = PageTransform::new(grid);
    for rect in grid.all_rects() {
        let origin = transform.point(Point::new(rect.min_x(), rect.max_y()));
        canvas.fill_rect(side, Rect::new(origin, transform.size(rect.size)), Color::BLUE);
    }
}

/// Draws the grid lines joining opposite timing marks.
pub fn annotate_grid_lines(canvas: &mut impl ProofCanvas, side: Side, grid: &TimingMarkGrid) {
    let transform = PageTransform::new(grid);
    let rows = grid.left_rects.iter().zip(&grid.right_rects);
    let columns = grid.top_rects.iter().zip(&grid.bottom_rects);
    for (start, end) in rows.chain(columns) {
        canvas.line(
            side,
            transform.point(start.center()),
            transform.point(end.center()),
            GRID_LINE_THICKNESS,
            Color::GREEN,
        );
    }
}

/// Marks each of `bubbles` on `grid`. Bubbles off the grid are skipped.
pub fn annotate_bubbles(
    canvas: &mut impl ProofCanvas,
    side: Side,
    grid: &TimingMarkGrid,
    bubbles: &[GridPoint],
    mark: BubbleMark,
    color: Color,
) {
    let transform = PageTransform::new(grid);
    for &bubble in bubbles {
        let Some(center) = transform.bubble(bubble) else {
            continue;
        };
        match mark {
            BubbleMark::Crosshair => {
                let offset = |dx: f64, dy: f64| Point::new(center.x + dx, center.y + dy);
                for (dx, dy) in [(CROSSHAIR_SIZE, 0.0), (0.0, CROSSHAIR_SIZE)] {
                    canvas.line(side, offset(-dx, -dy), offset(dx, dy), 1.0, color);
                }
            }
            BubbleMark::QuestionMark => {
                let width = canvas.text_width("?", QUESTION_MARK_FONT_SIZE);
                let height = canvas.text_height(QUESTION_MARK_FONT_SIZE);
                let origin = Point::new(center.x - width / 2.0, center.y - height / 2.0);
                canvas.text(side, origin, "?", QUESTION_MARK_FONT_SIZE, color);
            }
        }
    }
}

/// The largest font size at which `text` fits `max_width`.
fn fit_font_size(canvas: &impl ProofCanvas, text: &str, max_width: f64) -> Option<f64> {
    let mut font_size = LABEL_MAX_FONT_SIZE;
    while font_size >= LABEL_MIN_FONT_SIZE {
        if canvas.text_width(text, font_size) <= max_width {
            return Some(font_size);
        }
        font_size -= 1.0;
    }
    None
}

/// Draws `label` on a dark background just left of the bubble.
fn annotate_label(
    canvas: &mut impl ProofCanvas,
    side: Side,
    transform: &PageTransform,
    bubble: GridPoint,
    label: &str,
) {
    let Some(center) = transform.bubble(bubble) else {
        return;
    };
    let Some(font_size) = fit_font_size(&*canvas, label, LABEL_MAX_WIDTH) else {
        log::debug!("label '{label}' does not fit next to its bubble");
        return;
    };
    let width = canvas.text_width(label, font_size);
    let height = canvas.text_height(font_size);
    let mark_width = transform.size(transform.grid.geometry.timing_mark_size).width;
    let origin = Point::new(center.x - mark_width - width, center.y - height / 2.0);
    canvas.fill_rect(
        side,
        Rect::new(origin, Size::new(width, height)),
        Color::BLACK,
    );
    canvas.text(side, origin, label, font_size, Color::WHITE);
}

fn option_label(definition: &BallotDefinition, option: OptionRef) -> Option<String> {
    match option {
        OptionRef::Candidate { contest, candidate } => {
            let contest = definition.candidate_contests.get(contest)?;
            let candidate = contest.candidates.get(candidate)?;
            Some(if candidate.is_write_in {
                format!("write-in ({})", contest.office.name)
            } else {
                candidate.name.clone()
            })
        }
        OptionRef::Question { question, option } => {
            definition.questions.get(question)?;
            Some(match option {
                YesNo::Yes => "Yes".to_string(),
                YesNo::No => "No".to_string(),
            })
        }
    }
}

fn unmatched_label(definition: &BallotDefinition, unmatched: &Unmatched) -> String {
    match *unmatched {
        Unmatched::Option {
            option: OptionRef::Candidate { contest, candidate },
        } => {
            let contest = definition.candidate_contests.get(contest);
            let office = contest.map_or("?", |c| c.office.name.as_str());
            let name = contest
                .and_then(|c| c.candidates.get(candidate))
                .map_or("?", |c| c.name.as_str());
            format!("{office} - {name}")
        }
        Unmatched::Option {
            option: OptionRef::Question { question, option },
        } => {
            let title = definition
                .questions
                .get(question)
                .map_or("?", |q| q.title.as_str());
            let answer = match option {
                YesNo::Yes => "yes",
                YesNo::No => "no",
            };
            format!("{title} - {answer}")
        }
        Unmatched::Bubble { side, bubble } => {
            format!("Bubble at ({side}, {}, {})", bubble.column, bubble.row)
        }
    }
}

/// Lists everything left unmatched in the top-left corner of the front page.
fn annotate_unmatched_legend(
    canvas: &mut impl ProofCanvas,
    page_height: f64,
    definition: &BallotDefinition,
    unmatched: &[Unmatched],
) {
    if unmatched.is_empty() {
        return;
    }
    let mut y = page_height - LEGEND_MARGIN - canvas.text_height(LEGEND_TITLE_FONT_SIZE);
    canvas.text(
        Side::Front,
        Point::new(LEGEND_MARGIN, y),
        "Unmatched",
        LEGEND_TITLE_FONT_SIZE,
        Color::RED,
    );
    for entry in unmatched {
        let label = unmatched_label(definition, entry);
        let width = canvas.text_width(&label, LEGEND_FONT_SIZE);
        let height = canvas.text_height(LEGEND_FONT_SIZE);
        y -= height + LEGEND_PADDING;
        let origin = Point::new(LEGEND_MARGIN, y);
        canvas.fill_rect(
            Side::Front,
            Rect::new(origin, Size::new(width, height)),
            Color::DARK_RED,
        );
        canvas.text(Side::Front, origin, &label, LEGEND_FONT_SIZE, Color::WHITE);
    }
}

/// Draws the complete proof of a matched template.
pub fn annotate_match_result(
    canvas: &mut impl ProofCanvas,
    definition: &BallotDefinition,
    grids: &Sheet<TemplateGridAndBubbles>,
    match_result: &MatchResult,
) {
    for (side, page) in grids.iter() {
        let grid = &page.grid;
        let transform = PageTransform::new(grid);
        annotate_timing_marks(canvas, side, grid);
        annotate_grid_lines(canvas, side, grid);

        let matched = match_result.matched.get(side);
        let matched_bubbles: Vec<GridPoint> = matched.iter().map(|m| m.bubble).collect();
        annotate_bubbles(
            canvas,
            side,
            grid,
            &matched_bubbles,
            BubbleMark::Crosshair,
            Color::PURPLE,
        );
        for m in matched {
            if let Some(label) = option_label(definition, m.option) {
                annotate_label(canvas, side, &transform, m.bubble, &label);
            }
        }

        let unmatched_bubbles: Vec<GridPoint> = match_result
            .unmatched_bubbles()
            .filter(|b| b.side == side)
            .map(|b| b.point())
            .collect();
        annotate_bubbles(
            canvas,
            side,
            grid,
            &unmatched_bubbles,
            BubbleMark::QuestionMark,
            Color::RED,
        );
    }
    let front_height = PageTransform::new(&grids.front.grid).page_size.height;
    annotate_unmatched_legend(canvas, front_height, definition, &match_result.unmatched);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::page;
    use crate::election::PaperSize;
    use crate::matching::test_support::definition;
    use crate::matching::{match_bubbles, BubbleLayout};

    fn texts(annotations: &[Annotation]) -> Vec<&str> {
        annotations
            .iter()
            .filter_map(|a| match a {
                Annotation::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_fit_font_size_shrinks_long_labels() {
        let log = AnnotationLog::default();
        assert_eq!(fit_font_size(&log, "Alice", LABEL_MAX_WIDTH), Some(10.0));
        assert_eq!(fit_font_size(&log, &"x".repeat(20), LABEL_MAX_WIDTH), Some(8.0));
        assert_eq!(fit_font_size(&log, &"x".repeat(40), LABEL_MAX_WIDTH), None);
    }

    #[test]
    fn test_timing_marks_and_grid_lines() {
        let page = page(PaperSize::Letter, &[], None);
        let mut log = AnnotationLog::default();
        annotate_timing_marks(&mut log, Side::Front, &page.grid);
        annotate_grid_lines(&mut log, Side::Front, &page.grid);

        let front = &log.pages.front;
        let rects = front.iter().filter(|a| matches!(a, Annotation::Rect { .. })).count();
        let lines = front.iter().filter(|a| matches!(a, Annotation::Line { .. })).count();
        assert_eq!(rects, 2 * 60 + 2 * 34);
        assert_eq!(lines, 60 + 34);
        assert!(log.pages.back.is_empty());
    }

    #[test]
    fn test_proof_labels_matches_and_lists_unmatched() {
        let mut definition = definition(&[("Governor", &[("Alice", None), ("Bob", None)])]);
        definition.candidate_contests[0].candidates[0].oval = Point::new(236.126, 245.768);
        definition.candidate_contests[0].candidates[1].oval = Point::new(236.126, 281.768);
        let grids = Sheet::new(
            page(PaperSize::Letter, &[(12, 9), (12, 13), (20, 30)], None),
            page(PaperSize::Letter, &[], None),
        );
        let match_result = match_bubbles(&definition, &grids, BubbleLayout::Spatial);
        let mut log = AnnotationLog::default();
        annotate_match_result(&mut log, &definition, &grids, &match_result);

        let front = texts(&log.pages.front);
        assert!(front.contains(&"Alice"));
        assert!(front.contains(&"Bob"));
        assert!(front.contains(&"?"));
        assert!(front.contains(&"Unmatched"));
        assert!(front.contains(&"Bubble at (front, 20, 30)"));
    }

    #[test]
    fn test_write_in_label_names_office() {
        let mut definition = definition(&[("Governor", &[("", None)])]);
        definition.candidate_contests[0].candidates[0].is_write_in = true;
        let label = option_label(
            &definition,
            OptionRef::Candidate {
                contest: 0,
                candidate: 0,
            },
        );
        assert_eq!(label.as_deref(), Some("write-in (Governor)"));
    }
}
