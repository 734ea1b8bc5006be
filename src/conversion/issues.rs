//! Conversion issues and the accumulate-or-bail combinator.
//!
//! Every fallible step of a conversion reports problems as [`ConvertIssue`]
//! values rather than failing at the first error, so an operator fixing a
//! legacy definition sees every defect in one pass.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::definition::QuestionParseError;
use crate::election::PaperSize;
use crate::geometry::{GridEntry, GridLocation, Image, Side, Size};
use crate::matching::PairColumnEntriesIssue;

/// A single problem found while converting a ballot card.
#[derive(Clone, Debug, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConvertIssue {
    #[error("ballot definition is not valid XML: {message}")]
    InvalidDefinitionXml { message: String },

    #[error("{property} is missing ({path}{})", fmt_context(.context))]
    MissingDefinitionProperty {
        property: String,
        path: String,
        context: Option<String>,
    },

    #[error("{property} has invalid value '{value}' ({path}): expected {expected}")]
    InvalidDefinitionProperty {
        property: String,
        path: String,
        value: String,
        expected: String,
    },

    #[error("invalid election date '{value}': expected M/d/yyyy HH:mm:ss")]
    InvalidElectionDate { value: String },

    #[error("invalid ballot size '{value}': expected 8.5X11 or 8.5X14")]
    InvalidBallotSize { value: String },

    #[error("election validation failed: {message}")]
    ElectionValidationFailed { message: String },

    #[error(
        "definition has {structured_count} structured yes/no question(s) and a question text blob; only one source is allowed"
    )]
    ConflictingQuestionSources { structured_count: usize },

    #[error("constitutional questions could not be parsed: {error}")]
    ConstitutionalQuestionsParseFailed { error: QuestionParseError },

    #[error("expected exactly two pages in the ballot template, but found {found}")]
    InvalidBallotTemplateNumPages { found: usize },

    #[error("failed to detect timing marks on {side}: {message}")]
    TimingMarkDetectionFailed { side: Side, message: String },

    #[error(
        "template images do not match the declared {paper_size} paper size (front {front_paper_size}, back {back_paper_size})"
    )]
    InvalidTemplateSize {
        paper_size: PaperSize,
        front_paper_size: PaperSize,
        back_paper_size: PaperSize,
        front_template_size: Size<Image>,
        back_template_size: Size<Image>,
    },

    #[error("invalid timing mark metadata on {side}: {message}")]
    InvalidTimingMarkMetadata { side: Side, message: String },

    #[error("definition and template disagree on oval grid: {mismatch}")]
    MismatchedOvalGrids { mismatch: GridMismatch },

    #[error("bubble matching failed: {message}")]
    BubbleMatchingFailed { message: String },

    #[error("all cards of a primary election must have the same {field}")]
    MismatchedPrimaryPartyElections { field: String },
}

fn fmt_context(context: &Option<String>) -> String {
    match context {
        Some(context) => format!(", {context}"),
        None => String::new(),
    }
}

impl ConvertIssue {
    /// Shorthand for a missing required element.
    pub fn missing(property: &str, path: &str, context: Option<String>) -> Self {
        ConvertIssue::MissingDefinitionProperty {
            property: property.to_string(),
            path: path.to_string(),
            context,
        }
    }

    /// Stable machine-readable name of the issue kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertIssue::InvalidDefinitionXml { .. } => "invalid_definition_xml",
            ConvertIssue::MissingDefinitionProperty { .. } => "missing_definition_property",
            ConvertIssue::InvalidDefinitionProperty { .. } => "invalid_definition_property",
            ConvertIssue::InvalidElectionDate { .. } => "invalid_election_date",
            ConvertIssue::InvalidBallotSize { .. } => "invalid_ballot_size",
            ConvertIssue::ElectionValidationFailed { .. } => "election_validation_failed",
            ConvertIssue::ConflictingQuestionSources { .. } => "conflicting_question_sources",
            ConvertIssue::ConstitutionalQuestionsParseFailed { .. } => {
                "constitutional_questions_parse_failed"
            }
            ConvertIssue::InvalidBallotTemplateNumPages { .. } => {
                "invalid_ballot_template_num_pages"
            }
            ConvertIssue::TimingMarkDetectionFailed { .. } => "timing_mark_detection_failed",
            ConvertIssue::InvalidTemplateSize { .. } => "invalid_template_size",
            ConvertIssue::InvalidTimingMarkMetadata { .. } => "invalid_timing_mark_metadata",
            ConvertIssue::MismatchedOvalGrids { .. } => "mismatched_oval_grids",
            ConvertIssue::BubbleMatchingFailed { .. } => "bubble_matching_failed",
            ConvertIssue::MismatchedPrimaryPartyElections { .. } => {
                "mismatched_primary_party_elections"
            }
        }
    }
}

/// Where a declared grid and a detected grid stopped lining up.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridMismatch {
    ColumnCount {
        counts: (usize, usize),
    },
    ColumnEntryCount {
        column_index: usize,
        counts: (usize, usize),
        extra_declared: Vec<GridLocation>,
        extra_detected: Vec<GridLocation>,
    },
}

impl fmt::Display for GridMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridMismatch::ColumnCount { counts } => write!(
                f,
                "different number of columns containing ovals: {} vs {}",
                counts.0, counts.1
            ),
            GridMismatch::ColumnEntryCount {
                column_index,
                counts,
                ..
            } => write!(
                f,
                "different number of entries in column {}: {} vs {}",
                column_index, counts.0, counts.1
            ),
        }
    }
}

fn locations<T: GridEntry>(entries: Vec<T>) -> Vec<GridLocation> {
    entries
        .iter()
        .map(|e| GridLocation::new(e.side(), e.column(), e.row()))
        .collect()
}

impl<T: GridEntry, U: GridEntry> From<PairColumnEntriesIssue<T, U>> for GridMismatch {
    fn from(issue: PairColumnEntriesIssue<T, U>) -> Self {
        match issue {
            PairColumnEntriesIssue::ColumnCountMismatch { counts } => {
                GridMismatch::ColumnCount { counts }
            }
            PairColumnEntriesIssue::ColumnEntryCountMismatch {
                column_index,
                counts,
                extra_left,
                extra_right,
            } => GridMismatch::ColumnEntryCount {
                column_index,
                counts,
                extra_declared: locations(extra_left),
                extra_detected: locations(extra_right),
            },
        }
    }
}

/// Either a value or every issue that prevented producing one.
pub type IssueResult<T> = Result<T, Vec<ConvertIssue>>;

/// A produced value together with the non-fatal issues found on the way.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Converted<T> {
    pub value: T,
    pub issues: Vec<ConvertIssue>,
}

impl<T> Converted<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            issues: Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Converted<U> {
        Converted {
            value: f(self.value),
            issues: self.issues,
        }
    }
}

/// Accumulates issues across several sub-steps.
///
/// Sub-results are absorbed with [`take`](Self::take) (failures are fatal)
/// or [`absorb`](Self::absorb) (warnings only). [`finish`](Self::finish)
/// fails if any fatal issue was recorded.
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<ConvertIssue>,
    failed: bool,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-fatal issue.
    pub fn warn(&mut self, issue: ConvertIssue) {
        self.issues.push(issue);
    }

    /// Record a fatal issue.
    pub fn fail(&mut self, issue: ConvertIssue) {
        self.issues.push(issue);
        self.failed = true;
    }

    /// Unwrap a sub-result, recording its issues as fatal if it failed.
    pub fn take<T>(&mut self, result: IssueResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(issues) => {
                self.issues.extend(issues);
                self.failed = true;
                None
            }
        }
    }

    /// Unwrap a successful sub-result, keeping its warnings.
    pub fn absorb<T>(&mut self, converted: Converted<T>) -> T {
        self.issues.extend(converted.issues);
        converted.value
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn issues(&self) -> &[ConvertIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ConvertIssue> {
        self.issues
    }

    /// Produce the final result: the value with warnings, or every issue.
    pub fn finish<T>(self, value: T) -> IssueResult<Converted<T>> {
        if self.failed {
            Err(self.issues)
        } else {
            Ok(Converted {
                value,
                issues: self.issues,
            })
        }
    }

    /// Like [`finish`](Self::finish) for steps that have no warnings.
    pub fn finish_strict<T>(self, value: T) -> IssueResult<T> {
        if self.issues.is_empty() {
            Ok(value)
        } else {
            Err(self.issues)
        }
    }
}

/// Renders an issue list one per line, the way the CLI prints it.
pub struct IssueList<'a>(pub &'a [ConvertIssue]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in self.0 {
            writeln!(f, "  - [{}] {}", issue.kind(), issue)?;
        }
        Ok(())
    }
}
