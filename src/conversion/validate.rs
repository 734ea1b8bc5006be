//! Structural checks of a produced election.
//!
//! Checks for:
//! - Unique ids (contests, candidates within a contest, ballot styles)
//! - Valid references (districts, precincts, parties, grid-position targets)
//! - Grid positions that do not share a cell

use std::collections::{HashMap, HashSet};

use super::issues::ConvertIssue;
use crate::election::{Contest, ContestId, DistrictId, Election, GridPosition, PartyId};
use crate::geometry::{GridEntry, GridLocation};

fn failed(message: String) -> ConvertIssue {
    ConvertIssue::ElectionValidationFailed { message }
}

/// Validates an election and returns every problem found.
pub fn validate_election(election: &Election) -> Vec<ConvertIssue> {
    let mut issues = Vec::new();
    let district_ids: HashSet<_> = election.districts.iter().map(|d| &d.id).collect();
    let precinct_ids: HashSet<_> = election.precincts.iter().map(|p| &p.id).collect();
    let party_ids: HashSet<_> = election.parties.iter().map(|p| &p.id).collect();

    if election.contests.is_empty() {
        issues.push(failed("election has no contests".to_string()));
    }

    validate_contests(election, &district_ids, &party_ids, &mut issues);

    let mut ballot_style_ids = HashSet::new();
    for style in &election.ballot_styles {
        if !ballot_style_ids.insert(&style.id) {
            issues.push(failed(format!("duplicate ballot style id {}", style.id)));
        }
        for precinct in style.precincts.iter().filter(|p| !precinct_ids.contains(p)) {
            issues.push(failed(format!(
                "ballot style {} references unknown precinct {}",
                style.id, precinct
            )));
        }
        for district in style.districts.iter().filter(|d| !district_ids.contains(d)) {
            issues.push(failed(format!(
                "ballot style {} references unknown district {}",
                style.id, district
            )));
        }
        if let Some(party) = style.party_id.as_ref().filter(|p| !party_ids.contains(p)) {
            issues.push(failed(format!(
                "ballot style {} references unknown party {}",
                style.id, party
            )));
        }
    }

    for layout in &election.grid_layouts {
        if !ballot_style_ids.contains(&layout.ballot_style_id) {
            issues.push(failed(format!(
                "grid layout references unknown ballot style {}",
                layout.ballot_style_id
            )));
        }
        validate_grid_positions(election, &layout.grid_positions, &mut issues);
    }

    issues
}

fn validate_contests(
    election: &Election,
    district_ids: &HashSet<&DistrictId>,
    party_ids: &HashSet<&PartyId>,
    issues: &mut Vec<ConvertIssue>,
) {
    let mut seen: HashMap<&ContestId, usize> = HashMap::new();

    for (index, contest) in election.contests.iter().enumerate() {
        if let Some(first) = seen.get(contest.id()) {
            issues.push(failed(format!(
                "duplicate contest id {} (first seen at index {})",
                contest.id(),
                first
            )));
        } else {
            seen.insert(contest.id(), index);
        }

        if !district_ids.contains(contest.district_id()) {
            issues.push(failed(format!(
                "contest {} references unknown district {}",
                contest.id(),
                contest.district_id()
            )));
        }

        if let Contest::Candidate(contest) = contest {
            let mut candidate_ids = HashSet::new();
            for candidate in &contest.candidates {
                if !candidate_ids.insert(&candidate.id) {
                    issues.push(failed(format!(
                        "duplicate candidate id {} in contest {}",
                        candidate.id, contest.id
                    )));
                }
                for party in candidate.party_ids.iter().filter(|p| !party_ids.contains(p)) {
                    issues.push(failed(format!(
                        "candidate {} references unknown party {}",
                        candidate.id, party
                    )));
                }
            }
        }
    }
}

fn option_exists(contest: &Contest, option_id: &str) -> bool {
    match contest {
        Contest::Candidate(contest) => contest
            .candidates
            .iter()
            .any(|candidate| candidate.id.as_str() == option_id),
        Contest::YesNo(contest) => {
            contest.yes_option.id.as_str() == option_id
                || contest.no_option.id.as_str() == option_id
        }
    }
}

fn validate_grid_positions(
    election: &Election,
    positions: &[GridPosition],
    issues: &mut Vec<ConvertIssue>,
) {
    let mut cells = HashSet::new();
    for position in positions {
        let cell = GridLocation::new(position.side(), position.column(), position.row());
        if !cells.insert(cell) {
            issues.push(failed(format!(
                "more than one option at {} column {} row {}",
                cell.side, cell.column, cell.row
            )));
        }

        let Some(contest) = election.contest(position.contest_id()) else {
            issues.push(failed(format!(
                "grid position references unknown contest {}",
                position.contest_id()
            )));
            continue;
        };
        match position {
            GridPosition::Option(option) => {
                if !option_exists(contest, &option.option_id) {
                    issues.push(failed(format!(
                        "grid position references unknown option {} of contest {}",
                        option.option_id, option.contest_id
                    )));
                }
            }
            GridPosition::WriteIn(write_in) => {
                let allows = matches!(contest, Contest::Candidate(c) if c.allow_write_ins);
                if !allows {
                    issues.push(failed(format!(
                        "write-in position for contest {} which does not allow write-ins",
                        write_in.contest_id
                    )));
                }
            }
        }
    }
}
