//! Writes corrected oval coordinates back into the original definition XML.
//!
//! Only the text of the coordinate elements changes. Every other byte of the
//! source document is preserved, so downstream tools that read the original
//! format accept the corrected file unchanged.

use std::ops::Range;

use roxmltree::{Document, Node};

use super::model::{BallotDefinition, ConstitutionalQuestion, QuestionSource};
use super::parse::{child_element, child_elements};
use crate::conversion::{ConvertIssue, IssueResult};
use crate::geometry::{Definition, Point};

/// Returns `original_xml` with the coordinates of `corrected` spliced in.
///
/// Candidates are matched to `CandidateName` elements by position, so
/// `corrected` must have been derived from `original_xml`. When `corrected`
/// turned the free-text question blob into structured questions, the blob is
/// removed and one `YesNoQuestion` element per question is appended to the
/// root instead.
pub fn write_corrected_definition(
    original_xml: &str,
    corrected: &BallotDefinition,
) -> IssueResult<String> {
    let document = Document::parse(original_xml).map_err(|source| {
        vec![ConvertIssue::InvalidDefinitionXml {
            message: source.to_string(),
        }]
    })?;
    let root = document.root_element();
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    let contest_nodes: Vec<_> = child_elements(root, "Candidates").collect();
    if contest_nodes.len() != corrected.candidate_contests.len() {
        return Err(structure_mismatch(
            "Candidates",
            contest_nodes.len(),
            corrected.candidate_contests.len(),
        ));
    }

    for (contest_node, contest) in contest_nodes.into_iter().zip(&corrected.candidate_contests) {
        let candidate_nodes: Vec<_> = child_elements(contest_node, "CandidateName").collect();
        if candidate_nodes.len() != contest.candidates.len() {
            return Err(structure_mismatch(
                "CandidateName",
                candidate_nodes.len(),
                contest.candidates.len(),
            ));
        }
        for (candidate_node, candidate) in candidate_nodes.into_iter().zip(&contest.candidates) {
            push_point_edits(&mut edits, candidate_node, ("OX", "OY"), candidate.oval);
        }
    }

    let question_nodes: Vec<_> = child_elements(root, "YesNoQuestion").collect();
    if !question_nodes.is_empty() {
        let structured: Vec<_> = corrected
            .questions
            .iter()
            .filter_map(|question| question.ovals)
            .collect();
        if corrected.question_source != QuestionSource::Structured
            || structured.len() != question_nodes.len()
        {
            return Err(structure_mismatch(
                "YesNoQuestion",
                question_nodes.len(),
                structured.len(),
            ));
        }
        for (question_node, ovals) in question_nodes.into_iter().zip(structured) {
            push_point_edits(&mut edits, question_node, ("YesOX", "YesOY"), ovals.yes);
            push_point_edits(&mut edits, question_node, ("NoOX", "NoOY"), ovals.no);
        }
    } else if corrected.question_source == QuestionSource::Structured
        && !corrected.questions.is_empty()
    {
        push_converted_questions(&mut edits, original_xml, root, &corrected.questions)?;
    }

    edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
    let mut output = original_xml.to_string();
    for (range, replacement) in edits {
        output.replace_range(range, &replacement);
    }
    Ok(output)
}

fn push_point_edits(
    edits: &mut Vec<(Range<usize>, String)>,
    node: Node<'_, '_>,
    (x_tag, y_tag): (&str, &str),
    point: Point<Definition>,
) {
    for (tag, value) in [(x_tag, point.x), (y_tag, point.y)] {
        if let Some(element) = child_element(node, tag) {
            let replacement = format!("<{tag}>{}</{tag}>", format_coordinate(value));
            edits.push((element.range(), replacement));
        }
    }
}

fn push_converted_questions(
    edits: &mut Vec<(Range<usize>, String)>,
    original_xml: &str,
    root: Node<'_, '_>,
    questions: &[ConstitutionalQuestion],
) -> IssueResult<()> {
    let blob = child_element(root, "BallotPaperInfo")
        .and_then(|info| child_element(info, "Questions"));
    let root_range = root.range();
    let closing = original_xml[root_range.clone()]
        .rfind("</")
        .map(|offset| root_range.start + offset);
    let (Some(blob), Some(closing)) = (blob, closing) else {
        return Err(structure_mismatch("Questions", 0, questions.len()));
    };

    let mut elements = String::new();
    for question in questions {
        let Some(ovals) = question.ovals else {
            return Err(structure_mismatch("YesNoQuestion", 0, questions.len()));
        };
        elements.push_str("  <YesNoQuestion>\n");
        if let Some(number) = question.number {
            elements.push_str(&format!("    <Number>{number}</Number>\n"));
        }
        if let Some(header) = &question.header {
            elements.push_str(&format!(
                "    <Header>{}</Header>\n",
                html_escape::encode_text(header)
            ));
        }
        elements.push_str(&format!(
            "    <Title>{}</Title>\n",
            html_escape::encode_text(&question.title)
        ));
        for (tag, value) in [
            ("YesOX", ovals.yes.x),
            ("YesOY", ovals.yes.y),
            ("NoOX", ovals.no.x),
            ("NoOY", ovals.no.y),
        ] {
            elements.push_str(&format!("    <{tag}>{}</{tag}>\n", format_coordinate(value)));
        }
        elements.push_str("  </YesNoQuestion>\n");
    }

    edits.push((blob.range(), String::new()));
    edits.push((closing..closing, elements));
    Ok(())
}

fn structure_mismatch(element: &str, found: usize, expected: usize) -> Vec<ConvertIssue> {
    vec![ConvertIssue::InvalidDefinitionXml {
        message: format!(
            "corrected definition does not match the original XML: {found} <{element}> element(s), {expected} corrected"
        ),
    }]
}

/// Formats a coordinate with at most three decimals.
pub fn format_coordinate(value: f64) -> String {
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
