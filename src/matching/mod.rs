//! Matching declared contest options to detected template bubbles.
//!
//! Yes/no questions are always matched first, from the bottom of the card
//! upward (see [`questions`]). The remaining bubbles go to candidates using
//! one of three [`BubbleLayout`] strategies:
//!
//! - [`BubbleLayout::DeclaredOrder`]: the n-th candidate in document order
//!   gets the n-th bubble in side, column, row order.
//! - [`BubbleLayout::PartyColumns`]: candidates are grouped by party in the
//!   order parties appear across contests, bubbles are read column by column.
//! - [`BubbleLayout::Spatial`]: declared ovals are mapped onto the grid and
//!   paired with bubbles by column topology.
//!
//! Matching itself never fails; anything that could not be placed ends up in
//! [`MatchResult::unmatched`] with the reasons in [`MatchResult::issues`].

mod declared_order;
mod pairing;
mod party_columns;
mod questions;
mod spatial;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::conversion::GridMismatch;
use crate::definition::BallotDefinition;
use crate::detect::TemplateGridAndBubbles;
use crate::geometry::{
    definition_point_to_grid_location, Definition, GridEntry, GridLocation, GridPoint, Point,
    Sheet, Side,
};

pub use pairing::{pair_column_entries, PairColumnEntriesError, PairColumnEntriesIssue};
pub use party_columns::party_order;

/// How candidate bubbles are laid out on the template.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BubbleLayout {
    DeclaredOrder,
    PartyColumns,
    #[default]
    Spatial,
}

impl fmt::Display for BubbleLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BubbleLayout::DeclaredOrder => write!(f, "declared-order"),
            BubbleLayout::PartyColumns => write!(f, "party-columns"),
            BubbleLayout::Spatial => write!(f, "spatial"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

/// One selectable option of the definition, by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionRef {
    Candidate { contest: usize, candidate: usize },
    Question { question: usize, option: YesNo },
}

impl OptionRef {
    fn describe(&self, definition: &BallotDefinition) -> String {
        match *self {
            OptionRef::Candidate { contest, candidate } => definition
                .candidate_contests
                .get(contest)
                .and_then(|c| Some((c, c.candidates.get(candidate)?)))
                .map(|(c, cand)| format!("'{}' in '{}'", cand.name, c.office.name))
                .unwrap_or_else(|| format!("candidate {candidate} of contest {contest}")),
            OptionRef::Question { question, option } => {
                let answer = match option {
                    YesNo::Yes => "yes",
                    YesNo::No => "no",
                };
                format!("{answer} of question {}", question + 1)
            }
        }
    }
}

/// An option and the bubble it was assigned. The side is implied by which
/// half of [`MatchResult::matched`] holds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Matched {
    pub option: OptionRef,
    pub bubble: GridPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Unmatched {
    Option { option: OptionRef },
    Bubble { side: Side, bubble: GridPoint },
}

/// Why part of a card could not be matched.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchIssue {
    OptionCountMismatch { options: usize, bubbles: usize },
    QuestionRowMismatch { side: Side, row: i32, bubbles: usize },
    NotEnoughQuestionRows { questions: usize, rows: usize },
    Grid { mismatch: GridMismatch },
}

impl fmt::Display for MatchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchIssue::OptionCountMismatch { options, bubbles } => write!(
                f,
                "{options} candidate option(s) but {bubbles} candidate bubble(s)"
            ),
            MatchIssue::QuestionRowMismatch { side, row, bubbles } => write!(
                f,
                "question row {row} on {side} has {bubbles} bubble(s), expected 2"
            ),
            MatchIssue::NotEnoughQuestionRows { questions, rows } => write!(
                f,
                "{questions} question(s) but only {rows} bubble row(s)"
            ),
            MatchIssue::Grid { mismatch } => write!(f, "{mismatch}"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MatchResult {
    pub matched: Sheet<Vec<Matched>>,
    pub unmatched: Vec<Unmatched>,
    pub issues: Vec<MatchIssue>,
}

impl MatchResult {
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// The bubble an option was matched to, if any.
    pub fn bubble_for(&self, option: OptionRef) -> Option<GridLocation> {
        self.matched.iter().find_map(|(side, matched)| {
            matched
                .iter()
                .find(|m| m.option == option)
                .map(|m| GridLocation::on(side, m.bubble))
        })
    }

    pub fn unmatched_bubbles(&self) -> impl Iterator<Item = GridLocation> + '_ {
        self.unmatched.iter().filter_map(|u| match *u {
            Unmatched::Bubble { side, bubble } => Some(GridLocation::on(side, bubble)),
            Unmatched::Option { .. } => None,
        })
    }

    pub fn unmatched_options(&self) -> impl Iterator<Item = OptionRef> + '_ {
        self.unmatched.iter().filter_map(|u| match *u {
            Unmatched::Option { option } => Some(option),
            Unmatched::Bubble { .. } => None,
        })
    }

    /// One-line human summary of what went wrong, for issue messages.
    pub fn summary(&self, definition: &BallotDefinition) -> String {
        let mut parts: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        let options: Vec<String> = self
            .unmatched_options()
            .map(|option| option.describe(definition))
            .collect();
        if !options.is_empty() {
            parts.push(format!("unmatched options: {}", options.join(", ")));
        }
        let bubbles: Vec<String> = self
            .unmatched_bubbles()
            .map(|b| format!("{} ({}, {})", b.side, b.column, b.row))
            .collect();
        if !bubbles.is_empty() {
            parts.push(format!("unmatched bubbles: {}", bubbles.join(", ")));
        }
        parts.join("; ")
    }

    fn push_matched(&mut self, option: OptionRef, bubble: GridLocation) {
        self.matched.get_mut(bubble.side).push(Matched {
            option,
            bubble: bubble.point(),
        });
    }
}

/// A declared oval mapped onto the grid through the fixed affine transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeclaredOption {
    pub option: OptionRef,
    pub location: GridLocation,
}

impl GridEntry for DeclaredOption {
    fn side(&self) -> Side {
        self.location.side
    }

    fn column(&self) -> i32 {
        self.location.column
    }

    fn row(&self) -> i32 {
        self.location.row
    }
}

/// Every option with a declared oval: candidates in declared order, then
/// both ovals of each structured question. Questions parsed from free text
/// have no ovals and are skipped.
pub fn declared_options(
    definition: &BallotDefinition,
    front_page_height: f64,
) -> Vec<DeclaredOption> {
    let on_grid = |option: OptionRef, point: Point<Definition>| DeclaredOption {
        option,
        location: definition_point_to_grid_location(point, front_page_height),
    };

    let candidates = definition.candidates().map(|(contest, candidate, c)| {
        on_grid(OptionRef::Candidate { contest, candidate }, c.oval)
    });
    let questions = definition
        .questions
        .iter()
        .enumerate()
        .filter_map(|(question, q)| Some((question, q.ovals?)))
        .flat_map(|(question, ovals)| {
            [
                on_grid(
                    OptionRef::Question {
                        question,
                        option: YesNo::Yes,
                    },
                    ovals.yes,
                ),
                on_grid(
                    OptionRef::Question {
                        question,
                        option: YesNo::No,
                    },
                    ovals.no,
                ),
            ]
        });
    candidates.chain(questions).collect()
}

/// Candidate options in declared order.
fn candidate_options(definition: &BallotDefinition) -> Vec<OptionRef> {
    definition
        .candidates()
        .map(|(contest, candidate, _)| OptionRef::Candidate { contest, candidate })
        .collect()
}

/// Assigns every declared option of `definition` a detected bubble.
pub fn match_bubbles(
    definition: &BallotDefinition,
    grids: &Sheet<TemplateGridAndBubbles>,
    layout: BubbleLayout,
) -> MatchResult {
    let bubbles: Vec<GridLocation> = grids
        .iter()
        .flat_map(|(side, page)| page.bubbles.iter().map(move |&b| GridLocation::on(side, b)))
        .collect();

    let mut result = MatchResult::default();
    let remaining = questions::match_questions(definition.questions.len(), bubbles, &mut result);

    match layout {
        BubbleLayout::DeclaredOrder => {
            declared_order::match_candidates(definition, remaining, &mut result)
        }
        BubbleLayout::PartyColumns => {
            party_columns::match_candidates(definition, remaining, &mut result)
        }
        BubbleLayout::Spatial => {
            let front_page_height = grids.front.grid.geometry.paper_size.document_size().height;
            spatial::match_candidates(definition, front_page_height, remaining, &mut result)
        }
    }

    log::debug!(
        "matched {} front and {} back bubble(s) with {} layout, {} left unmatched",
        result.matched.front.len(),
        result.matched.back.len(),
        layout,
        result.unmatched.len()
    );
    result
}

/// Assigns `options` to `bubbles` one-to-one in the given orders, or leaves
/// everything unmatched when the counts differ.
fn match_in_order(
    options: Vec<OptionRef>,
    bubbles: Vec<GridLocation>,
    result: &mut MatchResult,
) {
    if options.len() != bubbles.len() {
        result.issues.push(MatchIssue::OptionCountMismatch {
            options: options.len(),
            bubbles: bubbles.len(),
        });
        result
            .unmatched
            .extend(options.into_iter().map(|option| Unmatched::Option { option }));
        result.unmatched.extend(bubbles.into_iter().map(|b| Unmatched::Bubble {
            side: b.side,
            bubble: b.point(),
        }));
        return;
    }
    for (option, bubble) in options.into_iter().zip(bubbles) {
        result.push_matched(option, bubble);
    }
}

/// Records every bubble not in `used` as unmatched.
fn record_leftover_bubbles(
    bubbles: &[GridLocation],
    used: &HashSet<GridLocation>,
    result: &mut MatchResult,
) {
    result.unmatched.extend(
        bubbles
            .iter()
            .filter(|b| !used.contains(b))
            .map(|b| Unmatched::Bubble {
                side: b.side,
                bubble: b.point(),
            }),
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::definition::{BallotDefinition, Candidate, CandidateContest, Header, Office};
    use crate::geometry::Point;

    /// A definition whose contests hold `(name, party)` candidates with
    /// placeholder ovals.
    pub fn definition(contests: &[(&str, &[(&str, Option<&str>)])]) -> BallotDefinition {
        BallotDefinition {
            header: Header {
                election_id: "0001".to_string(),
                election_name: "Test Election".to_string(),
                town_name: "Test Town".to_string(),
                town_id: "00701".to_string(),
                election_date: "7/12/2022 12:00:00".to_string(),
                precinct_id: None,
                party_name: None,
                ballot_type: None,
                ballot_size: "8.5X11".to_string(),
            },
            candidate_contests: contests
                .iter()
                .map(|(office, candidates)| CandidateContest {
                    office: Office {
                        name: office.to_string(),
                        winner_note: None,
                    },
                    candidates: candidates
                        .iter()
                        .map(|(name, party)| Candidate {
                            name: name.to_string(),
                            party_name: party.map(str::to_string),
                            pronunciation: None,
                            oval: Point::new(0.0, 0.0),
                            is_write_in: false,
                        })
                        .collect(),
                })
                .collect(),
            questions: Vec::new(),
            question_source: Default::default(),
        }
    }
}
