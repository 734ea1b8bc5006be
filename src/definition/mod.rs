//! The AccuVote ballot definition: model, parser and corrected-XML writer.

mod html;
mod model;
mod parse;
mod questions;
mod write;

pub use html::text_fragments;
pub use model::{
    BallotDefinition, Candidate, CandidateContest, ConstitutionalQuestion, Header, Office,
    QuestionSource, YesNoOvals,
};
pub use parse::{
    parse_candidate, parse_candidate_contest, parse_definition, parse_definition_str,
    parse_header, parse_yes_no_question,
};
pub use questions::{parse_question_fragments, parse_questions_html, QuestionParseError};
#[cfg(feature = "fuzzing")]
pub use questions::fuzz_parse_question_lines;
pub use write::{format_coordinate, write_corrected_definition};
