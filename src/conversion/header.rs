//! Builds the election skeleton (everything but grid positions) from a
//! definition's header, contests and questions.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::issues::{ConvertIssue, Converted, IssueCollector, IssueResult};
use crate::definition::{BallotDefinition, ConstitutionalQuestion, Header};
use crate::election::{
    ballot_style_id, candidate_contest_id, candidate_id, district_id, no_option_id, party_id,
    precinct_id, yes_no_contest_id, yes_option_id, BallotLayout, BallotStyle, Candidate,
    CandidateContest, Contest, ContestId, County, District, DistrictId, Election, ElectionType,
    PaperSize, Party, PartyId, Precinct, YesNoContest, YesNoOption,
};

/// The only state this converter targets.
pub const STATE: &str = "NH";

const ELECTION_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

static SEATS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)vote\s+for\s+not\s+more\s+than\s+(\d+)").expect("static regex"));

/// Parses `M/d/yyyy HH:mm:ss` into an ISO `yyyy-mm-dd` date.
pub fn parse_election_date(value: &str) -> IssueResult<String> {
    NaiveDateTime::parse_from_str(value.trim(), ELECTION_DATE_FORMAT)
        .map(|date_time| date_time.date().format("%Y-%m-%d").to_string())
        .map_err(|_| {
            vec![ConvertIssue::InvalidElectionDate {
                value: value.to_string(),
            }]
        })
}

pub fn parse_paper_size(code: &str) -> IssueResult<PaperSize> {
    PaperSize::from_ballot_size_code(code).ok_or_else(|| {
        vec![ConvertIssue::InvalidBallotSize {
            value: code.to_string(),
        }]
    })
}

/// Number of seats from a winner note such as "Vote for not more than 2".
pub fn seats_from_winner_note(winner_note: Option<&str>) -> u32 {
    winner_note
        .and_then(|note| SEATS.captures(note))
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(1)
}

fn party(name: &str) -> Party {
    Party {
        id: party_id(name),
        name: name.to_string(),
        full_name: name.to_string(),
        abbrev: name.to_string(),
    }
}

/// Id of the contest a definition contest converts into.
pub fn contest_id_for_office(header: &Header, office_name: &str) -> ContestId {
    candidate_contest_id(office_name, header.party_name.as_deref())
}

pub fn question_contest_id(question: &ConstitutionalQuestion) -> ContestId {
    yes_no_contest_id(question.number, &question.title)
}

fn question_title(question: &ConstitutionalQuestion) -> String {
    match (&question.header, question.number) {
        (Some(header), _) => header.clone(),
        (None, Some(number)) => format!("Question {number}"),
        (None, None) => "Constitutional Question".to_string(),
    }
}

/// Builds candidate contests, merging definition contests that share an
/// office and candidates that share a name within one office.
fn convert_candidate_contests(
    definition: &BallotDefinition,
    district: &DistrictId,
    election_party: Option<&PartyId>,
    collector: &mut IssueCollector,
) -> Vec<CandidateContest> {
    let mut contests: Vec<CandidateContest> = Vec::new();
    // Per contest: candidate names seen without a party.
    let mut partyless: Vec<Vec<String>> = Vec::new();

    for source in &definition.candidate_contests {
        let id = contest_id_for_office(&definition.header, &source.office.name);
        let index = match contests.iter().position(|contest| contest.id == id) {
            Some(index) => index,
            None => {
                contests.push(CandidateContest {
                    id,
                    district_id: district.clone(),
                    party_id: election_party.cloned(),
                    title: source.office.name.clone(),
                    seats: seats_from_winner_note(source.office.winner_note.as_deref()),
                    allow_write_ins: false,
                    candidates: Vec::new(),
                });
                partyless.push(Vec::new());
                contests.len() - 1
            }
        };
        let contest = &mut contests[index];

        for candidate in &source.candidates {
            if candidate.is_write_in {
                contest.allow_write_ins = true;
                continue;
            }
            let party_ids: Vec<PartyId> =
                candidate.party_name.as_deref().map(party_id).into_iter().collect();
            let missing_party = || {
                ConvertIssue::missing(
                    "Party",
                    "AVSInterface → Candidates → CandidateName → Party",
                    Some(format!(
                        "candidate '{}' in office '{}'",
                        candidate.name, source.office.name
                    )),
                )
            };

            match contest
                .candidates
                .iter_mut()
                .find(|existing| existing.name == candidate.name)
            {
                Some(existing) => {
                    // A repeated name is a multi-party endorsement, which
                    // needs a party on every listing.
                    if party_ids.is_empty() {
                        collector.fail(missing_party());
                    } else if partyless[index].contains(&candidate.name) {
                        collector.fail(missing_party());
                        partyless[index].retain(|name| name != &candidate.name);
                    }
                    for id in party_ids {
                        if !existing.party_ids.contains(&id) {
                            existing.party_ids.push(id);
                        }
                    }
                }
                None => {
                    if party_ids.is_empty() {
                        partyless[index].push(candidate.name.clone());
                    }
                    contest.candidates.push(Candidate {
                        id: candidate_id(&candidate.name),
                        name: candidate.name.clone(),
                        party_ids,
                    });
                }
            }
        }
    }

    contests
}

fn convert_question(
    question: &ConstitutionalQuestion,
    district: &DistrictId,
) -> YesNoContest {
    let id = question_contest_id(question);
    YesNoContest {
        yes_option: YesNoOption {
            id: yes_option_id(&id),
            label: "Yes".to_string(),
        },
        no_option: YesNoOption {
            id: no_option_id(&id),
            label: "No".to_string(),
        },
        id,
        district_id: district.clone(),
        title: question_title(question),
        description: question.title.clone(),
    }
}

/// Converts everything but the grid layout. The ballot layout carries the
/// declared paper size until a template says otherwise.
pub fn convert_header(definition: &BallotDefinition) -> IssueResult<Converted<Election>> {
    let header = &definition.header;
    let mut collector = IssueCollector::new();

    let date = collector.take(parse_election_date(&header.election_date));
    let paper_size = collector.take(parse_paper_size(&header.ballot_size));

    let election_party = header.party_name.as_deref().map(party);
    let election_type = if election_party.is_some() {
        ElectionType::Primary
    } else {
        ElectionType::General
    };

    let precinct = Precinct {
        id: precinct_id(&header.town_id, header.precinct_id.as_deref()),
        name: header.town_name.clone(),
    };
    let district = District {
        id: district_id([&precinct.id]),
        name: header.town_name.clone(),
    };

    let mut parties: Vec<Party> = election_party.iter().cloned().collect();
    for (_, _, candidate) in definition.candidates() {
        if let Some(name) = candidate.party_name.as_deref() {
            if !parties.iter().any(|p| p.name == name) {
                parties.push(party(name));
            }
        }
    }

    let election_party_id = election_party.as_ref().map(|p| &p.id);
    let mut contests: Vec<Contest> =
        convert_candidate_contests(definition, &district.id, election_party_id, &mut collector)
            .into_iter()
            .map(Contest::Candidate)
            .collect();
    contests.extend(
        definition
            .questions
            .iter()
            .map(|question| Contest::YesNo(convert_question(question, &district.id))),
    );

    let ballot_style = BallotStyle {
        id: ballot_style_id([&precinct.id], [&district.id], election_party_id),
        precincts: vec![precinct.id.clone()],
        districts: vec![district.id.clone()],
        party_id: election_party_id.cloned(),
    };

    let (Some(date), Some(paper_size)) = (date, paper_size) else {
        return Err(collector.into_issues());
    };

    let election = Election {
        title: header.election_name.clone(),
        election_type,
        date,
        state: STATE.to_string(),
        county: County {
            id: header.town_id.clone(),
            name: header.town_name.clone(),
        },
        parties,
        precincts: vec![precinct],
        districts: vec![district],
        contests,
        ballot_styles: vec![ballot_style],
        ballot_layout: BallotLayout { paper_size },
        grid_layouts: Vec::new(),
    };

    log::debug!(
        "converted header of '{}': {} contest(s), {} part(ies)",
        election.title,
        election.contests.len(),
        election.parties.len()
    );
    collector.finish(election)
}
