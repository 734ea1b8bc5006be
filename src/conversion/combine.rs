//! Merging the single-party cards of a primary into one election.

use std::collections::{BTreeSet, HashMap};

use super::issues::{ConvertIssue, Converted, IssueResult};
use crate::election::{
    ballot_style_id, district_id, BallotStyle, BallotStyleId, Contest, ContestId, District,
    DistrictId, Election, PrecinctId,
};

fn mismatch(field: &str) -> ConvertIssue {
    ConvertIssue::MismatchedPrimaryPartyElections {
        field: field.to_string(),
    }
}

/// Every election-level field that must agree across cards.
fn check_shared_fields(first: &Election, rest: &[Election]) -> IssueResult<()> {
    let mut issues = Vec::new();
    let mut check = |field: &str, differs: &dyn Fn(&Election) -> bool| {
        if rest.iter().any(differs) {
            issues.push(mismatch(field));
        }
    };
    check("title", &|e| e.title != first.title);
    check("type", &|e| e.election_type != first.election_type);
    check("date", &|e| e.date != first.date);
    check("state", &|e| e.state != first.state);
    check("county", &|e| e.county != first.county);
    check("ballotLayout", &|e| e.ballot_layout != first.ballot_layout);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// A contest with the parts that differ between cards blanked out.
fn comparable(contest: &Contest) -> Contest {
    let mut contest = contest.clone();
    contest.set_district_id(DistrictId::new(""));
    match &mut contest {
        Contest::Candidate(contest) => contest.candidates.clear(),
        Contest::YesNo(contest) => {
            contest.yes_option.label.clear();
            contest.no_option.label.clear();
        }
    }
    contest
}

fn push_unique<T: PartialEq + Clone>(items: &mut Vec<T>, item: &T) {
    if !items.contains(item) {
        items.push(item.clone());
    }
}

/// Combines per-party elections into one primary election.
///
/// A contest's district becomes the set of precincts whose cards carry it,
/// so contests shared by every party land in one district and party-only
/// contests in their own. Ballot style ids are recomputed from the new
/// districts and grid layouts follow them.
pub fn combine_into_primary(elections: Vec<Election>) -> IssueResult<Converted<Election>> {
    let mut elections = elections.into_iter();
    let Some(first) = elections.next() else {
        return Err(vec![ConvertIssue::ElectionValidationFailed {
            message: "no cards to combine".to_string(),
        }]);
    };
    let rest: Vec<Election> = elections.collect();
    if rest.is_empty() {
        return Ok(Converted::clean(first));
    }
    check_shared_fields(&first, &rest)?;

    let all: Vec<Election> = std::iter::once(first).chain(rest).collect();

    let mut contest_order: Vec<ContestId> = Vec::new();
    let mut precincts_by_contest: HashMap<ContestId, BTreeSet<PrecinctId>> = HashMap::new();
    for election in &all {
        for contest in &election.contests {
            push_unique(&mut contest_order, contest.id());
            precincts_by_contest
                .entry(contest.id().clone())
                .or_default()
                .extend(election.precincts.iter().map(|p| p.id.clone()));
        }
    }

    let mut districts: Vec<District> = Vec::new();
    let mut district_by_contest: HashMap<&ContestId, DistrictId> = HashMap::new();
    let mut districts_by_precinct: HashMap<&PrecinctId, BTreeSet<DistrictId>> = HashMap::new();
    for contest_id in &contest_order {
        let precincts = &precincts_by_contest[contest_id];
        let district = district_id(precincts);
        for precinct in precincts {
            districts_by_precinct
                .entry(precinct)
                .or_default()
                .insert(district.clone());
        }
        push_unique(
            &mut districts,
            &District {
                id: district.clone(),
                name: district.to_string(),
            },
        );
        district_by_contest.insert(contest_id, district);
    }

    let mut contests: Vec<Contest> = Vec::new();
    let mut seen: Vec<Contest> = Vec::new();
    for contest in all.iter().flat_map(|e| &e.contests) {
        let key = comparable(contest);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        let mut contest = contest.clone();
        contest.set_district_id(district_by_contest[contest.id()].clone());
        contests.push(contest);
    }

    let mut ballot_styles: Vec<BallotStyle> = Vec::new();
    let mut renamed: HashMap<BallotStyleId, BallotStyleId> = HashMap::new();
    for style in all.iter().flat_map(|e| &e.ballot_styles) {
        let district_ids: BTreeSet<DistrictId> = style
            .precincts
            .iter()
            .filter_map(|p| districts_by_precinct.get(p))
            .flatten()
            .cloned()
            .collect();
        let id = ballot_style_id(&style.precincts, &district_ids, style.party_id.as_ref());
        renamed.insert(style.id.clone(), id.clone());
        ballot_styles.push(BallotStyle {
            id,
            precincts: style.precincts.clone(),
            districts: district_ids.into_iter().collect(),
            party_id: style.party_id.clone(),
        });
    }

    let mut precincts = Vec::new();
    let mut parties = Vec::new();
    for election in &all {
        for precinct in &election.precincts {
            push_unique(&mut precincts, precinct);
        }
        for party in &election.parties {
            push_unique(&mut parties, party);
        }
    }

    let grid_layouts = all
        .iter()
        .flat_map(|e| e.grid_layouts.iter().cloned())
        .map(|mut layout| {
            if let Some(id) = renamed.get(&layout.ballot_style_id) {
                layout.ballot_style_id = id.clone();
            }
            layout
        })
        .collect();

    let first = &all[0];
    log::info!(
        "combined {} cards into one primary: {} contest(s), {} district(s), {} ballot style(s)",
        all.len(),
        contests.len(),
        districts.len(),
        ballot_styles.len()
    );
    Ok(Converted::clean(Election {
        title: first.title.clone(),
        election_type: first.election_type,
        date: first.date.clone(),
        state: first.state.clone(),
        county: first.county.clone(),
        parties,
        precincts,
        districts,
        contests,
        ballot_styles,
        ballot_layout: first.ballot_layout,
        grid_layouts,
    }))
}
