//! AccuVote definition XML parser.
//!
//! Parsing is forgiving: every problem in an element and its siblings is
//! collected before the element fails, so one pass reports every missing or
//! malformed property. A missing required container element short-circuits
//! its own descendants only.

use log::debug;
use roxmltree::{Document, Node};

use super::model::{
    BallotDefinition, Candidate, CandidateContest, ConstitutionalQuestion, Header, Office,
    QuestionSource, YesNoOvals,
};
use super::questions::parse_questions_html;
use crate::conversion::{ConvertIssue, IssueCollector, IssueResult};
use crate::geometry::{Definition, Point};

const ROOT: &str = "AVSInterface";

/// Parses a ballot definition from XML text.
pub fn parse_definition_str(xml: &str) -> IssueResult<BallotDefinition> {
    let document = Document::parse(xml).map_err(|source| {
        vec![ConvertIssue::InvalidDefinitionXml {
            message: source.to_string(),
        }]
    })?;
    parse_definition(document.root_element())
}

/// Parses a ballot definition from its `AVSInterface` root element.
pub fn parse_definition(root: Node<'_, '_>) -> IssueResult<BallotDefinition> {
    if root.tag_name().name() != ROOT {
        return Err(vec![ConvertIssue::InvalidDefinitionXml {
            message: format!(
                "missing <{ROOT}> root element, found <{}>",
                root.tag_name().name()
            ),
        }]);
    }

    let mut issues = IssueCollector::new();

    let header = match child_element(root, "AccuvoteHeaderInfo") {
        Some(node) => issues.take(parse_header(node)),
        None => {
            issues.fail(ConvertIssue::missing(
                "AccuvoteHeaderInfo",
                &join_path(ROOT, "AccuvoteHeaderInfo"),
                None,
            ));
            None
        }
    };

    let mut candidate_contests = Vec::new();
    for node in child_elements(root, "Candidates") {
        if let Some(contest) = issues.take(parse_candidate_contest(node)) {
            candidate_contests.push(contest);
        }
    }

    let mut structured = Vec::new();
    for node in child_elements(root, "YesNoQuestion") {
        if let Some(question) = issues.take(parse_yes_no_question(node)) {
            structured.push(question);
        }
    }

    let blob = child_element(root, "BallotPaperInfo")
        .and_then(|info| child_element(info, "Questions"))
        .and_then(|questions| questions.text())
        .map(str::trim)
        .filter(|text| !text.is_empty());

    let (questions, question_source) = match blob {
        Some(_) if !structured.is_empty() => {
            issues.fail(ConvertIssue::ConflictingQuestionSources {
                structured_count: structured.len(),
            });
            (Vec::new(), QuestionSource::None)
        }
        Some(raw) => {
            // Some exporters escape the markup twice.
            let html = if raw.contains('<') {
                raw.to_string()
            } else {
                html_escape::decode_html_entities(raw).into_owned()
            };
            match parse_questions_html(&html) {
                Ok(questions) => (questions, QuestionSource::TextBlob),
                Err(error) => {
                    issues.fail(ConvertIssue::ConstitutionalQuestionsParseFailed { error });
                    (Vec::new(), QuestionSource::None)
                }
            }
        }
        None if structured.is_empty() => (Vec::new(), QuestionSource::None),
        None => (structured, QuestionSource::Structured),
    };

    let Some(header) = header else {
        return Err(issues.into_issues());
    };

    let definition = BallotDefinition {
        header,
        candidate_contests,
        questions,
        question_source,
    };
    let definition = issues.finish_strict(definition)?;

    debug!(
        "parsed definition {}: {} contests, {} candidates, {} questions ({:?})",
        definition.header.election_id,
        definition.candidate_contests.len(),
        definition.candidate_count(),
        definition.questions.len(),
        definition.question_source,
    );
    Ok(definition)
}

/// Parses an `AccuvoteHeaderInfo` element.
pub fn parse_header(node: Node<'_, '_>) -> IssueResult<Header> {
    let path = join_path(ROOT, "AccuvoteHeaderInfo");
    let mut issues = IssueCollector::new();

    let mut required = |tag: &str| issues.take(required_child_text(node, tag, &path, None));
    let election_id = required("ElectionID");
    let election_name = required("ElectionName");
    let town_name = required("TownName");
    let town_id = required("TownID");
    let election_date = required("ElectionDate");
    let ballot_size = required("BallotSize");

    match (
        election_id,
        election_name,
        town_name,
        town_id,
        election_date,
        ballot_size,
    ) {
        (
            Some(election_id),
            Some(election_name),
            Some(town_name),
            Some(town_id),
            Some(election_date),
            Some(ballot_size),
        ) => issues.finish_strict(Header {
            election_id,
            election_name,
            town_name,
            town_id,
            election_date,
            precinct_id: optional_child_text(node, "PrecinctID"),
            party_name: optional_child_text(node, "PartyName"),
            ballot_type: optional_child_text(node, "BallotType"),
            ballot_size,
        }),
        _ => Err(issues.into_issues()),
    }
}

/// Parses a `Candidates` element: one office and its candidates.
pub fn parse_candidate_contest(node: Node<'_, '_>) -> IssueResult<CandidateContest> {
    let path = join_path(ROOT, "Candidates");
    let office_path = join_path(&path, "OfficeName");

    let Some(office_node) = child_element(node, "OfficeName") else {
        return Err(vec![ConvertIssue::missing("OfficeName", &office_path, None)]);
    };

    let name = required_child_text(office_node, "Name", &office_path, None)?;
    let office = Office {
        winner_note: optional_child_text(office_node, "WinnerNote"),
        name,
    };

    let candidate_path = join_path(&path, "CandidateName");
    let mut issues = IssueCollector::new();
    let mut candidates = Vec::new();
    for candidate_node in child_elements(node, "CandidateName") {
        let parsed = parse_candidate_in(candidate_node, &candidate_path, Some(&office.name));
        if let Some(candidate) = issues.take(parsed) {
            candidates.push(candidate);
        }
    }

    issues.finish_strict(CandidateContest { office, candidates })
}

/// Parses a single `CandidateName` element.
pub fn parse_candidate(node: Node<'_, '_>) -> IssueResult<Candidate> {
    let path = join_path(&join_path(ROOT, "Candidates"), "CandidateName");
    parse_candidate_in(node, &path, None)
}

fn parse_candidate_in(
    node: Node<'_, '_>,
    path: &str,
    office: Option<&str>,
) -> IssueResult<Candidate> {
    let mut issues = IssueCollector::new();

    let name = issues.take(required_child_text(
        node,
        "Name",
        path,
        office.map(|office| format!("office '{office}'")),
    ));
    let context = match (&name, office) {
        (Some(name), Some(office)) => Some(format!("candidate '{name}' in office '{office}'")),
        (Some(name), None) => Some(format!("candidate '{name}'")),
        (None, Some(office)) => Some(format!("office '{office}'")),
        (None, None) => None,
    };

    let write_in_flag = optional_child_text(node, "WriteIn").is_some_and(|flag| flag == "True");
    let is_write_in = write_in_flag
        || name
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case("write-in"));

    let mut coordinate = |tag: &str| {
        let value = issues.take(required_child_number(node, tag, path, context.clone()))?;
        if value < 0.0 && !is_write_in {
            issues.fail(ConvertIssue::InvalidDefinitionProperty {
                property: tag.to_string(),
                path: join_path(path, tag),
                value: value.to_string(),
                expected: "a non-negative number".to_string(),
            });
            return None;
        }
        Some(value)
    };
    let ox = coordinate("OX");
    let oy = coordinate("OY");

    match (name, ox, oy) {
        (Some(name), Some(ox), Some(oy)) => issues.finish_strict(Candidate {
            name,
            party_name: optional_child_text(node, "Party"),
            pronunciation: optional_child_text(node, "Pronunciation"),
            oval: Point::new(ox, oy),
            is_write_in,
        }),
        _ => Err(issues.into_issues()),
    }
}

/// Parses a structured `YesNoQuestion` element.
pub fn parse_yes_no_question(node: Node<'_, '_>) -> IssueResult<ConstitutionalQuestion> {
    let path = join_path(ROOT, "YesNoQuestion");
    let mut issues = IssueCollector::new();

    let title = issues.take(required_child_text(node, "Title", &path, None));
    let context = title.as_ref().map(|title| format!("question '{title}'"));

    let number = match optional_child_text(node, "Number") {
        Some(raw) => match raw.parse::<u32>() {
            Ok(number) => Some(number),
            Err(_) => {
                issues.fail(ConvertIssue::InvalidDefinitionProperty {
                    property: "Number".to_string(),
                    path: join_path(&path, "Number"),
                    value: raw,
                    expected: "a non-negative integer".to_string(),
                });
                None
            }
        },
        None => None,
    };

    let mut number_of =
        |tag: &str| issues.take(required_child_number(node, tag, &path, context.clone()));
    let yes_x = number_of("YesOX");
    let yes_y = number_of("YesOY");
    let no_x = number_of("NoOX");
    let no_y = number_of("NoOY");

    match (title, yes_x, yes_y, no_x, no_y) {
        (Some(title), Some(yes_x), Some(yes_y), Some(no_x), Some(no_y)) => {
            issues.finish_strict(ConstitutionalQuestion {
                number,
                header: optional_child_text(node, "Header"),
                title,
                ovals: Some(YesNoOvals {
                    yes: Point::<Definition>::new(yes_x, yes_y),
                    no: Point::new(no_x, no_y),
                }),
            })
        }
        _ => Err(issues.into_issues()),
    }
}

fn join_path(parent: &str, tag: &str) -> String {
    format!("{parent} → {tag}")
}

pub(crate) fn child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

pub(crate) fn child_elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &str,
    context: Option<String>,
) -> IssueResult<String> {
    optional_child_text(node, tag)
        .ok_or_else(|| vec![ConvertIssue::missing(tag, &join_path(path, tag), context)])
}

fn required_child_number(
    node: Node<'_, '_>,
    tag: &str,
    path: &str,
    context: Option<String>,
) -> IssueResult<f64> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            vec![ConvertIssue::InvalidDefinitionProperty {
                property: tag.to_string(),
                path: join_path(path, tag),
                value: raw,
                expected: "a number".to_string(),
            }]
        })
}
