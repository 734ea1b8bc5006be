use super::{candidate_options, match_in_order, MatchResult};
use crate::definition::BallotDefinition;
use crate::geometry::{compare_side_then_column_then_row, GridLocation};

/// Reads bubbles front to back, then column by column, then top to bottom.
pub(super) fn match_candidates(
    definition: &BallotDefinition,
    mut bubbles: Vec<GridLocation>,
    result: &mut MatchResult,
) {
    bubbles.sort_by(compare_side_then_column_then_row);
    match_in_order(candidate_options(definition), bubbles, result);
}
