//! Typed form of an AccuVote ballot definition.

use serde::{Deserialize, Serialize};

use crate::geometry::{Definition, Point};

/// The parsed `AVSInterface` root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BallotDefinition {
    pub header: Header,
    pub candidate_contests: Vec<CandidateContest>,
    pub questions: Vec<ConstitutionalQuestion>,
    /// Where `questions` came from.
    pub question_source: QuestionSource,
}

impl BallotDefinition {
    /// All candidates in declared order, with the index of their contest.
    pub fn candidates(&self) -> impl Iterator<Item = (usize, usize, &Candidate)> {
        self.candidate_contests
            .iter()
            .enumerate()
            .flat_map(|(contest_index, contest)| {
                contest
                    .candidates
                    .iter()
                    .enumerate()
                    .map(move |(candidate_index, candidate)| {
                        (contest_index, candidate_index, candidate)
                    })
            })
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_contests
            .iter()
            .map(|contest| contest.candidates.len())
            .sum()
    }
}

/// Fields of `AccuvoteHeaderInfo`, kept as the raw strings the format uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub election_id: String,
    pub election_name: String,
    pub town_name: String,
    pub town_id: String,
    /// `M/d/yyyy HH:mm:ss`
    pub election_date: String,
    pub precinct_id: Option<String>,
    pub party_name: Option<String>,
    pub ballot_type: Option<String>,
    /// Paper size code, e.g. `8.5X11`.
    pub ballot_size: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Office {
    pub name: String,
    pub winner_note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateContest {
    pub office: Office,
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub party_name: Option<String>,
    pub pronunciation: Option<String>,
    /// Declared oval center.
    pub oval: Point<Definition>,
    pub is_write_in: bool,
}

/// Declared oval centers of a structured yes/no question.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct YesNoOvals {
    pub yes: Point<Definition>,
    pub no: Point<Definition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstitutionalQuestion {
    pub number: Option<u32>,
    pub header: Option<String>,
    pub title: String,
    /// Present only for structured `YesNoQuestion` elements.
    pub ovals: Option<YesNoOvals>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    #[default]
    None,
    /// `YesNoQuestion` elements with declared ovals.
    Structured,
    /// Free text in `BallotPaperInfo/Questions`.
    TextBlob,
}
