//! Conversion of AccuVote ballot cards into a grid-layout election.
//!
//! The pipeline for one card is:
//!
//! 1. [`convert_header`] builds precincts, districts, parties, contests and
//!    the ballot style, with ids from [`crate::election`].
//! 2. A [`TemplateDetector`](crate::detect::TemplateDetector) finds timing
//!    marks and bubbles on the template pages.
//! 3. Page metadata and paper size are checked against the definition.
//! 4. [`match_bubbles`](crate::matching::match_bubbles) assigns options to
//!    bubbles and the matches become grid positions.
//!
//! Several cards (the party ballots of a primary) are then merged by
//! [`combine_into_primary`]. Every step reports [`ConvertIssue`]s instead of
//! stopping at the first problem.

mod card;
mod combine;
mod header;
mod issues;
mod validate;

pub use card::{
    apply_jurisdiction_override, convert_card, convert_election_definition, CardDefinition,
    ConvertOptions, ConvertedCard, OPTION_BOUNDS_FROM_TARGET_MARK,
};
pub use combine::combine_into_primary;
pub use header::{
    contest_id_for_office, convert_header, parse_election_date, parse_paper_size,
    question_contest_id, seats_from_winner_note, STATE,
};
pub use issues::{ConvertIssue, Converted, GridMismatch, IssueCollector, IssueList, IssueResult};
pub use validate::validate_election;
