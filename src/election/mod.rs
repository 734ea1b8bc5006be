//! The produced election definition and its identifier scheme.

mod ids;
mod model;

pub use ids::{
    ballot_style_id, candidate_contest_id, candidate_id, district_id, make_id, no_option_id,
    party_id, precinct_id, yes_no_contest_id, yes_option_id, BallotStyleId, CandidateId,
    ContestId, DistrictId, OptionId, PartyId, PrecinctId,
};
pub use model::{
    BallotLayout, BallotStyle, Candidate, CandidateContest, Contest, County, District, Election,
    ElectionType, GridLayout, GridPosition, GridPositionOption, GridPositionWriteIn, Outset,
    PaperSize, Party, Precinct, WriteInArea, YesNoContest, YesNoOption,
};
