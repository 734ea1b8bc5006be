//! The produced election definition.
//!
//! Serialized as camelCase JSON for the downstream ballot interpreter.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BallotStyleId, CandidateId, ContestId, DistrictId, OptionId, PartyId, PrecinctId};
use crate::detect::PageMetadata;
use crate::geometry::{Document, GridEntry, Side, Size, Sheet};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub title: String,
    #[serde(rename = "type")]
    pub election_type: ElectionType,
    /// ISO 8601 date (`yyyy-mm-dd`).
    pub date: String,
    pub state: String,
    pub county: County,
    pub parties: Vec<Party>,
    pub precincts: Vec<Precinct>,
    pub districts: Vec<District>,
    pub contests: Vec<Contest>,
    pub ballot_styles: Vec<BallotStyle>,
    pub ballot_layout: BallotLayout,
    pub grid_layouts: Vec<GridLayout>,
}

impl Election {
    pub fn contest(&self, id: &ContestId) -> Option<&Contest> {
        self.contests.iter().find(|contest| contest.id() == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionType {
    General,
    Primary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct County {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub full_name: String,
    pub abbrev: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precinct {
    pub id: PrecinctId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub id: DistrictId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotStyle {
    pub id: BallotStyleId,
    pub precincts: Vec<PrecinctId>,
    pub districts: Vec<DistrictId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<PartyId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Contest {
    #[serde(rename = "candidate")]
    Candidate(CandidateContest),
    #[serde(rename = "yesno")]
    YesNo(YesNoContest),
}

impl Contest {
    pub fn id(&self) -> &ContestId {
        match self {
            Contest::Candidate(contest) => &contest.id,
            Contest::YesNo(contest) => &contest.id,
        }
    }

    pub fn district_id(&self) -> &DistrictId {
        match self {
            Contest::Candidate(contest) => &contest.district_id,
            Contest::YesNo(contest) => &contest.district_id,
        }
    }

    pub fn set_district_id(&mut self, district_id: DistrictId) {
        match self {
            Contest::Candidate(contest) => contest.district_id = district_id,
            Contest::YesNo(contest) => contest.district_id = district_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateContest {
    pub id: ContestId,
    pub district_id: DistrictId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<PartyId>,
    pub title: String,
    pub seats: u32,
    pub allow_write_ins: bool,
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    /// More than one entry for a multi-party endorsement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub party_ids: Vec<PartyId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YesNoContest {
    pub id: ContestId,
    pub district_id: DistrictId,
    pub title: String,
    pub description: String,
    pub yes_option: YesNoOption,
    pub no_option: YesNoOption,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YesNoOption {
    pub id: OptionId,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    Letter,
    Legal,
}

impl PaperSize {
    /// Parses the definition's `BallotSize` code.
    pub fn from_ballot_size_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "8.5X11" => Some(PaperSize::Letter),
            "8.5X14" => Some(PaperSize::Legal),
            _ => None,
        }
    }

    /// Page dimensions in document points.
    pub fn document_size(self) -> Size<Document> {
        match self {
            PaperSize::Letter => Size::new(612.0, 792.0),
            PaperSize::Legal => Size::new(612.0, 1008.0),
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperSize::Letter => write!(f, "letter"),
            PaperSize::Legal => write!(f, "legal"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotLayout {
    pub paper_size: PaperSize,
}

/// Grid units between a bubble and the edges of its option's label area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outset {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub ballot_style_id: BallotStyleId,
    pub option_bounds_from_target_mark: Outset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuvote_metadata: Option<Sheet<PageMetadata>>,
    pub grid_positions: Vec<GridPosition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GridPosition {
    #[serde(rename = "option")]
    Option(GridPositionOption),
    #[serde(rename = "write-in")]
    WriteIn(GridPositionWriteIn),
}

impl GridPosition {
    pub fn contest_id(&self) -> &ContestId {
        match self {
            GridPosition::Option(position) => &position.contest_id,
            GridPosition::WriteIn(position) => &position.contest_id,
        }
    }
}

impl GridEntry for GridPosition {
    fn side(&self) -> Side {
        match self {
            GridPosition::Option(position) => position.side,
            GridPosition::WriteIn(position) => position.side,
        }
    }

    fn column(&self) -> i32 {
        match self {
            GridPosition::Option(position) => position.column,
            GridPosition::WriteIn(position) => position.column,
        }
    }

    fn row(&self) -> i32 {
        match self {
            GridPosition::Option(position) => position.row,
            GridPosition::WriteIn(position) => position.row,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPositionOption {
    pub sheet_number: u32,
    pub side: Side,
    pub column: i32,
    pub row: i32,
    pub contest_id: ContestId,
    pub option_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPositionWriteIn {
    pub sheet_number: u32,
    pub side: Side,
    pub column: i32,
    pub row: i32,
    pub contest_id: ContestId,
    pub write_in_index: u32,
    pub write_in_area: WriteInArea,
}

/// Grid-unit rectangle where a voter writes a name.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WriteInArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WriteInArea {
    /// The largest box left of a write-in bubble that clears the contest's
    /// candidate labels.
    pub fn for_bubble(column: i32, row: i32) -> Self {
        Self {
            x: f64::from(column) - 5.0,
            y: f64::from(row) - 0.65,
            width: 4.5,
            height: 0.85,
        }
    }
}
