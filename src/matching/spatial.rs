use std::collections::HashSet;

use super::{
    declared_options, pair_column_entries, record_leftover_bubbles, DeclaredOption, MatchIssue,
    MatchResult, OptionRef, Unmatched,
};
use crate::conversion::GridMismatch;
use crate::definition::BallotDefinition;
use crate::geometry::GridLocation;

/// Maps declared ovals onto the grid and pairs them with bubbles by column
/// topology, keeping whatever pairs survive a mismatch.
pub(super) fn match_candidates(
    definition: &BallotDefinition,
    front_page_height: f64,
    bubbles: Vec<GridLocation>,
    result: &mut MatchResult,
) {
    let declared: Vec<DeclaredOption> = declared_options(definition, front_page_height)
        .into_iter()
        .filter(|declared| matches!(declared.option, OptionRef::Candidate { .. }))
        .collect();

    let pairs = match pair_column_entries(declared.iter().copied(), bubbles.iter().copied()) {
        Ok(pairs) => pairs,
        Err(err) => {
            result.issues.extend(err.issues.into_iter().map(|issue| MatchIssue::Grid {
                mismatch: GridMismatch::from(issue),
            }));
            err.pairs
        }
    };

    let mut used = HashSet::new();
    let mut paired = HashSet::new();
    for (declared, bubble) in pairs {
        used.insert(bubble);
        paired.insert(declared.option);
        result.push_matched(declared.option, bubble);
    }

    result.unmatched.extend(
        declared
            .iter()
            .filter(|declared| !paired.contains(&declared.option))
            .map(|declared| Unmatched::Option {
                option: declared.option,
            }),
    );
    record_leftover_bubbles(&bubbles, &used, result);
}
