//! Party-column layout, where each party's candidates share a column.

use std::collections::HashSet;

use super::{match_in_order, MatchResult, OptionRef};
use crate::definition::BallotDefinition;
use crate::geometry::{compare_column_then_side_then_row, GridLocation};

/// Orders parties so that, within every contest, a party listed before
/// another comes first. Candidates without a party form their own group.
///
/// Parties with no ordering constraint between them keep the order of their
/// first appearance. Contradictory orders across contests do not loop; the
/// first constraint seen wins.
pub fn party_order(definition: &BallotDefinition) -> Vec<Option<String>> {
    let mut nodes: Vec<Option<&str>> = Vec::new();
    let mut edges: Vec<(usize, usize)> = Vec::new();

    for contest in &definition.candidate_contests {
        let mut seen: Vec<usize> = Vec::new();
        for candidate in &contest.candidates {
            let node = index_of(&mut nodes, candidate.party_name.as_deref());
            if seen.contains(&node) {
                continue;
            }
            for &earlier in &seen {
                if !edges.contains(&(earlier, node)) {
                    edges.push((earlier, node));
                }
            }
            seen.push(node);
        }
    }

    let mut visited = HashSet::new();
    let mut post_order = Vec::with_capacity(nodes.len());
    for node in (0..nodes.len()).rev() {
        visit(node, &edges, &mut visited, &mut post_order);
    }

    post_order
        .into_iter()
        .rev()
        .map(|node| nodes[node].map(str::to_string))
        .collect()
}

fn index_of<'a>(nodes: &mut Vec<Option<&'a str>>, party: Option<&'a str>) -> usize {
    match nodes.iter().position(|n| *n == party) {
        Some(index) => index,
        None => {
            nodes.push(party);
            nodes.len() - 1
        }
    }
}

fn visit(
    node: usize,
    edges: &[(usize, usize)],
    visited: &mut HashSet<usize>,
    post_order: &mut Vec<usize>,
) {
    if !visited.insert(node) {
        return;
    }
    for &(_, successor) in edges.iter().filter(|(from, _)| *from == node) {
        visit(successor, edges, visited, post_order);
    }
    post_order.push(node);
}

/// Groups candidates by party rank, then contest, then declared order, and
/// reads bubbles column by column.
pub(super) fn match_candidates(
    definition: &BallotDefinition,
    mut bubbles: Vec<GridLocation>,
    result: &mut MatchResult,
) {
    let order = party_order(definition);
    let rank = |party: Option<&str>| {
        order
            .iter()
            .position(|p| p.as_deref() == party)
            .unwrap_or(order.len())
    };

    let mut candidates: Vec<(usize, OptionRef)> = definition
        .candidates()
        .map(|(contest, index, candidate)| {
            (
                rank(candidate.party_name.as_deref()),
                OptionRef::Candidate {
                    contest,
                    candidate: index,
                },
            )
        })
        .collect();
    // Stable, so contest and declared order survive within a party.
    candidates.sort_by_key(|(rank, _)| *rank);

    bubbles.sort_by(compare_column_then_side_then_row);
    match_in_order(
        candidates.into_iter().map(|(_, option)| option).collect(),
        bubbles,
        result,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GridPoint, Side};
    use crate::matching::test_support::definition;

    #[test]
    fn test_party_order_respects_every_contest() {
        let definition = definition(&[
            ("Governor", &[("A", Some("Rep")), ("B", Some("Dem"))]),
            (
                "Senator",
                &[("C", Some("Dem")), ("D", Some("Lib")), ("E", None)],
            ),
        ]);
        assert_eq!(
            party_order(&definition),
            vec![
                Some("Rep".to_string()),
                Some("Dem".to_string()),
                Some("Lib".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_unconstrained_parties_keep_first_appearance() {
        let definition = definition(&[
            ("Governor", &[("A", Some("Rep"))]),
            ("Senator", &[("B", Some("Dem"))]),
        ]);
        assert_eq!(
            party_order(&definition),
            vec![Some("Rep".to_string()), Some("Dem".to_string())]
        );
    }

    #[test]
    fn test_contradictory_orders_terminate() {
        let definition = definition(&[
            ("Governor", &[("A", Some("Rep")), ("B", Some("Dem"))]),
            ("Senator", &[("C", Some("Dem")), ("D", Some("Rep"))]),
        ]);
        assert_eq!(party_order(&definition).len(), 2);
    }

    #[test]
    fn test_candidates_read_by_party_column() {
        let definition = definition(&[
            ("Governor", &[("A", Some("Rep")), ("B", Some("Dem"))]),
            ("Senator", &[("C", Some("Rep")), ("D", Some("Dem"))]),
        ]);
        let bubbles = vec![
            GridLocation::new(Side::Front, 19, 9),
            GridLocation::new(Side::Front, 12, 9),
            GridLocation::new(Side::Front, 19, 15),
            GridLocation::new(Side::Front, 12, 15),
        ];
        let mut result = MatchResult::default();
        match_candidates(&definition, bubbles, &mut result);

        assert!(result.is_complete());
        let bubble_of = |contest, candidate| {
            result
                .bubble_for(OptionRef::Candidate { contest, candidate })
                .map(|b| b.point())
        };
        assert_eq!(bubble_of(0, 0), Some(GridPoint::new(12, 9)));
        assert_eq!(bubble_of(1, 0), Some(GridPoint::new(12, 15)));
        assert_eq!(bubble_of(0, 1), Some(GridPoint::new(19, 9)));
        assert_eq!(bubble_of(1, 1), Some(GridPoint::new(19, 15)));
    }
}
