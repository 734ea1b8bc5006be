//! Coordinate correction.
//!
//! Legacy definitions often declare oval coordinates that are off by a
//! column or a few points. Correction matches the definition against a
//! rendered template and rewrites each matched option's coordinates from the
//! detected bubble, producing a corrected XML file and a proofing sheet for
//! a human to check.

mod config;
mod proof;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use config::{CardConfig, CorrectionConfig, ResolvedCard};
pub use proof::{
    annotate_bubbles, annotate_grid_lines, annotate_match_result, annotate_timing_marks,
    Annotation, AnnotationLog, BubbleMark, Color, ProofCanvas,
};

use crate::conversion::ConvertIssue;
use crate::definition::{write_corrected_definition, BallotDefinition, QuestionSource, YesNoOvals};
use crate::detect::{
    DetectedTemplate, PrecomputedDetector, TemplateDetector, TemplateGridAndBubbles,
};
use crate::error::AccuvoteError;
use crate::geometry::{
    document_point_to_definition_point, image_point_to_document_point,
    image_size_to_document_size, Definition, GridPoint, Point, Sheet, Side,
};
use crate::io::{read_definition, write_json};
use crate::matching::{match_bubbles, BubbleLayout, MatchResult, OptionRef, YesNo};

/// Definition-space center of a detected bubble.
///
/// The definition format stacks the back page under the front page, so back
/// bubbles are offset by the height of the front page.
pub fn bubble_definition_point(
    grids: &Sheet<TemplateGridAndBubbles>,
    side: Side,
    bubble: GridPoint,
) -> Option<Point<Definition>> {
    let page_size = |grid: &TemplateGridAndBubbles| {
        let geometry = &grid.grid.geometry;
        image_size_to_document_size(geometry.pixels_per_inch, geometry.canvas_size)
    };
    let page = grids.get(side);
    let image_point = page.grid.point_for_bubble(bubble)?;
    let document_size = page_size(page);
    let density = page.grid.geometry.pixels_per_inch;
    let document_point = image_point_to_document_point(document_size, density, image_point);
    let sheet_offset = match side {
        Side::Front => 0.0,
        Side::Back => page_size(&grids.front).height,
    };
    Some(document_point_to_definition_point(
        document_size,
        sheet_offset,
        document_point,
    ))
}

/// A definition with coordinates recomputed from detected bubbles.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrectedDefinition {
    pub definition: BallotDefinition,
    /// Options that kept their declared coordinates.
    pub uncorrected: Vec<OptionRef>,
}

/// Rewrites every matched option's coordinates from its matched bubble.
///
/// Questions parsed from the free-text blob come out as structured questions
/// when both bubbles of every blob question are known. Otherwise none of them
/// gain coordinates.
pub fn correct_definition(
    definition: &BallotDefinition,
    grids: &Sheet<TemplateGridAndBubbles>,
    match_result: &MatchResult,
) -> CorrectedDefinition {
    let mut corrected = definition.clone();
    let mut uncorrected = Vec::new();
    let point_for = |option: OptionRef| {
        let location = match_result.bubble_for(option)?;
        bubble_definition_point(grids, location.side, location.point())
    };

    for (contest_index, contest) in corrected.candidate_contests.iter_mut().enumerate() {
        for (candidate_index, candidate) in contest.candidates.iter_mut().enumerate() {
            let option = OptionRef::Candidate {
                contest: contest_index,
                candidate: candidate_index,
            };
            match point_for(option) {
                Some(point) => candidate.oval = point,
                None => uncorrected.push(option),
            }
        }
    }

    for (index, question) in corrected.questions.iter_mut().enumerate() {
        let yes = OptionRef::Question {
            question: index,
            option: YesNo::Yes,
        };
        let no = OptionRef::Question {
            question: index,
            option: YesNo::No,
        };
        match (point_for(yes), point_for(no)) {
            (Some(yes), Some(no)) => question.ovals = Some(YesNoOvals { yes, no }),
            // A question keeps both declared ovals unless both bubbles matched.
            _ => uncorrected.extend([yes, no]),
        }
    }

    if corrected.question_source == QuestionSource::TextBlob && !corrected.questions.is_empty() {
        if corrected.questions.iter().all(|q| q.ovals.is_some()) {
            corrected.question_source = QuestionSource::Structured;
        } else {
            // The blob is replaced as a whole or not at all.
            for (index, question) in corrected.questions.iter_mut().enumerate() {
                if question.ovals.take().is_some() {
                    uncorrected.extend([YesNo::Yes, YesNo::No].map(|option| {
                        OptionRef::Question {
                            question: index,
                            option,
                        }
                    }));
                }
            }
        }
    }

    CorrectedDefinition {
        definition: corrected,
        uncorrected,
    }
}

/// What correcting one card produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrectionSummary {
    pub name: String,
    pub corrected_definition_path: PathBuf,
    pub proof_path: PathBuf,
    pub corrected: usize,
    pub uncorrected: usize,
    pub unmatched_bubbles: usize,
}

/// Corrects one configured card and writes its outputs.
pub fn correct_card(card: &ResolvedCard) -> Result<CorrectionSummary, AccuvoteError> {
    let (xml, definition) = read_definition(&card.definition_path)?;

    let template = DetectedTemplate::read_json(&card.detection_path)?;
    let Some(pages) = template.sheet() else {
        return Err(AccuvoteError::ConversionFailed {
            issues: vec![ConvertIssue::InvalidBallotTemplateNumPages {
                found: template.pages.len(),
            }],
        });
    };
    let grids = PrecomputedDetector
        .find_template_grids_and_bubbles(pages)
        .map_err(|error| AccuvoteError::ConversionFailed {
            issues: vec![ConvertIssue::TimingMarkDetectionFailed {
                side: error.side(),
                message: error.to_string(),
            }],
        })?;

    let layout = card.layout.unwrap_or(BubbleLayout::Spatial);
    let match_result = match_bubbles(&definition, &grids, layout);
    if !match_result.is_complete() {
        log::warn!(
            "card '{}': {}",
            card.name,
            match_result.summary(&definition)
        );
    }

    let corrected = correct_definition(&definition, &grids, &match_result);
    let corrected_xml = write_corrected_definition(&xml, &corrected.definition).map_err(|issues| {
        AccuvoteError::DefinitionParse {
            path: card.definition_path.clone(),
            issues,
        }
    })?;

    let mut proof = AnnotationLog::default();
    annotate_match_result(&mut proof, &corrected.definition, &grids, &match_result);

    fs::create_dir_all(&card.output_dir)?;
    let corrected_definition_path = card.output_dir.join(format!("{}-corrected.xml", card.name));
    let proof_path = card.output_dir.join(format!("{}-proof.json", card.name));
    fs::write(&corrected_definition_path, corrected_xml)?;
    write_json(&proof_path, &proof)?;

    let option_count = definition.candidate_count() + 2 * definition.questions.len();
    let summary = CorrectionSummary {
        name: card.name.clone(),
        corrected_definition_path,
        proof_path,
        corrected: option_count - corrected.uncorrected.len(),
        uncorrected: corrected.uncorrected.len(),
        unmatched_bubbles: match_result.unmatched_bubbles().count(),
    };
    log::info!(
        "corrected card '{}': {} option(s) corrected, {} unchanged",
        summary.name,
        summary.corrected,
        summary.uncorrected
    );
    Ok(summary)
}

/// Corrects every card listed in the config file at `config_path`.
pub fn run_correction(config_path: &Path) -> Result<Vec<CorrectionSummary>, AccuvoteError> {
    let config = CorrectionConfig::read(config_path)?;
    config
        .resolve(config_path)
        .iter()
        .map(correct_card)
        .collect()
}
