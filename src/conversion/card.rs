//! Converting one ballot card (definition plus template pages) and merging
//! cards into one election.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::combine::combine_into_primary;
use super::header::{contest_id_for_office, convert_header, question_contest_id};
use super::issues::{ConvertIssue, Converted, IssueCollector, IssueResult};
use super::validate::validate_election;
use crate::definition::BallotDefinition;
use crate::detect::{TemplateDetector, TemplateGridAndBubbles};
use crate::election::{
    candidate_id, no_option_id, yes_option_id, Election, GridLayout, GridPosition,
    GridPositionOption, GridPositionWriteIn, Outset, WriteInArea,
};
use crate::geometry::{compare_column_then_side_then_row, GridLocation, Sheet, Side};
use crate::matching::{
    declared_options, match_bubbles, pair_column_entries, BubbleLayout, MatchResult, OptionRef,
    YesNo,
};

/// Library-side configuration of a conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    pub layout: BubbleLayout,
    /// Replaces the county and district display names.
    pub jurisdiction_override: Option<String>,
}

/// A ballot definition and its rendered template pages.
#[derive(Clone, Debug)]
pub struct CardDefinition<P> {
    pub definition: BallotDefinition,
    pub pages: Vec<P>,
}

/// A converted card and what the converter learned along the way.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConvertedCard {
    pub election: Election,
    pub grids: Sheet<TemplateGridAndBubbles>,
    pub match_result: MatchResult,
}

/// Grid units around a target mark covered by its option label. Fixed for
/// New Hampshire ballots.
pub const OPTION_BOUNDS_FROM_TARGET_MARK: Outset = Outset {
    top: 1.0,
    left: 5.0,
    right: 1.0,
    bottom: 1.0,
};

const SHEET_NUMBER: u32 = 1;

/// Checks the decoded page identities, swapping pages that were supplied
/// back first.
fn check_page_metadata(
    grids: Sheet<TemplateGridAndBubbles>,
) -> IssueResult<Sheet<TemplateGridAndBubbles>> {
    let (Some(front), Some(back)) = (&grids.front.metadata, &grids.back.metadata) else {
        return Ok(grids);
    };

    if let (Some(front_card), Some(back_card)) = (front.card_number, back.card_number) {
        if front_card != back_card {
            return Err(vec![ConvertIssue::InvalidTimingMarkMetadata {
                side: Side::Back,
                message: format!(
                    "card number {back_card} does not match front card number {front_card}"
                ),
            }]);
        }
    }

    match (front.side, back.side) {
        (Side::Front, Side::Back) => Ok(grids),
        (Side::Back, Side::Front) => {
            log::warn!("template pages are in back/front order, swapping");
            Ok(grids.swap())
        }
        (found, _) if found != Side::Front => Err(vec![ConvertIssue::InvalidTimingMarkMetadata {
            side: Side::Front,
            message: format!("expected front page, found {found}"),
        }]),
        (_, found) => Err(vec![ConvertIssue::InvalidTimingMarkMetadata {
            side: Side::Back,
            message: format!("expected back page, found {found}"),
        }]),
    }
}

/// Write-in index of every write-in candidate, counted per produced contest
/// in top-to-bottom ballot order.
fn write_in_indexes(definition: &BallotDefinition) -> HashMap<(usize, usize), u32> {
    let mut by_contest: HashMap<String, Vec<(usize, usize, f64)>> = HashMap::new();
    for (contest, index, candidate) in definition.candidates() {
        if candidate.is_write_in {
            let office = &definition.candidate_contests[contest].office.name;
            let contest_id = contest_id_for_office(&definition.header, office);
            by_contest
                .entry(contest_id.to_string())
                .or_default()
                .push((contest, index, candidate.oval.y));
        }
    }

    let mut indexes = HashMap::new();
    for mut write_ins in by_contest.into_values() {
        write_ins.sort_by(|a, b| a.2.total_cmp(&b.2));
        for (write_in_index, (contest, candidate, _)) in write_ins.into_iter().enumerate() {
            indexes.insert((contest, candidate), write_in_index as u32);
        }
    }
    indexes
}

fn grid_position(
    definition: &BallotDefinition,
    write_in_indexes: &HashMap<(usize, usize), u32>,
    option: OptionRef,
    location: GridLocation,
) -> GridPosition {
    let GridLocation { side, column, row } = location;
    match option {
        OptionRef::Candidate { contest, candidate } => {
            let source = &definition.candidate_contests[contest];
            let contest_id = contest_id_for_office(&definition.header, &source.office.name);
            match write_in_indexes.get(&(contest, candidate)) {
                Some(&write_in_index) => GridPosition::WriteIn(GridPositionWriteIn {
                    sheet_number: SHEET_NUMBER,
                    side,
                    column,
                    row,
                    contest_id,
                    write_in_index,
                    write_in_area: WriteInArea::for_bubble(column, row),
                }),
                None => GridPosition::Option(GridPositionOption {
                    sheet_number: SHEET_NUMBER,
                    side,
                    column,
                    row,
                    contest_id,
                    option_id: candidate_id(&source.candidates[candidate].name).to_string(),
                }),
            }
        }
        OptionRef::Question { question, option } => {
            let contest_id = question_contest_id(&definition.questions[question]);
            let option_id = match option {
                YesNo::Yes => yes_option_id(&contest_id),
                YesNo::No => no_option_id(&contest_id),
            };
            GridPosition::Option(GridPositionOption {
                sheet_number: SHEET_NUMBER,
                side,
                column,
                row,
                contest_id,
                option_id: option_id.to_string(),
            })
        }
    }
}

/// Where every option goes: its matched bubble, or for options the chosen
/// strategy left unmatched, whatever bubble column pairing of the declared
/// ovals assigns it.
fn place_options(
    definition: &BallotDefinition,
    grids: &Sheet<TemplateGridAndBubbles>,
    match_result: &MatchResult,
    collector: &mut IssueCollector,
) -> Vec<(OptionRef, GridLocation)> {
    let mut placements: Vec<(OptionRef, GridLocation)> = match_result
        .matched
        .iter()
        .flat_map(|(side, matched)| {
            matched
                .iter()
                .map(move |m| (m.option, GridLocation::on(side, m.bubble)))
        })
        .collect();

    let unmatched: HashSet<OptionRef> = match_result.unmatched_options().collect();
    if unmatched.is_empty() {
        return placements;
    }

    let front_page_height = grids.front.grid.geometry.paper_size.document_size().height;
    let declared = declared_options(definition, front_page_height);
    let detected: Vec<GridLocation> = grids
        .iter()
        .flat_map(|(side, page)| page.bubbles.iter().map(move |&b| GridLocation::on(side, b)))
        .collect();

    let pairs = match pair_column_entries(declared, detected) {
        Ok(pairs) => pairs,
        Err(err) => {
            for issue in err.issues {
                let issue = ConvertIssue::MismatchedOvalGrids {
                    mismatch: issue.into(),
                };
                log::warn!("{issue}");
                collector.warn(issue);
            }
            err.pairs
        }
    };

    let mut used: HashSet<GridLocation> = placements.iter().map(|(_, l)| *l).collect();
    for (declared, bubble) in pairs {
        if unmatched.contains(&declared.option) && used.insert(bubble) {
            log::debug!(
                "placed unmatched {:?} at {} ({}, {}) by declared position",
                declared.option,
                bubble.side,
                bubble.column,
                bubble.row
            );
            placements.push((declared.option, bubble));
        }
    }
    placements
}

/// Converts one card: header, detection, page checks, matching and grid
/// layout.
pub fn convert_card<D: TemplateDetector>(
    detector: &D,
    definition: &BallotDefinition,
    pages: &[D::Page],
    options: &ConvertOptions,
) -> IssueResult<Converted<ConvertedCard>> {
    let [front_page, back_page] = pages else {
        return Err(vec![ConvertIssue::InvalidBallotTemplateNumPages {
            found: pages.len(),
        }]);
    };

    let mut collector = IssueCollector::new();
    let Some(header) = collector.take(convert_header(definition)) else {
        return Err(collector.into_issues());
    };
    let mut election = collector.absorb(header);

    let grids = match detector.find_template_grids_and_bubbles(Sheet::new(front_page, back_page)) {
        Ok(grids) => grids,
        Err(error) => {
            collector.fail(ConvertIssue::TimingMarkDetectionFailed {
                side: error.side(),
                message: error.to_string(),
            });
            return Err(collector.into_issues());
        }
    };
    let Some(grids) = collector.take(check_page_metadata(grids)) else {
        return Err(collector.into_issues());
    };

    let declared_paper_size = election.ballot_layout.paper_size;
    let front_geometry = &grids.front.grid.geometry;
    let back_geometry = &grids.back.grid.geometry;
    if front_geometry.paper_size != back_geometry.paper_size
        || front_geometry.paper_size != declared_paper_size
    {
        log::warn!(
            "declared {} paper but template is {} / {}; using {}",
            declared_paper_size,
            front_geometry.paper_size,
            back_geometry.paper_size,
            front_geometry.paper_size
        );
        collector.warn(ConvertIssue::InvalidTemplateSize {
            paper_size: declared_paper_size,
            front_paper_size: front_geometry.paper_size,
            back_paper_size: back_geometry.paper_size,
            front_template_size: front_geometry.canvas_size,
            back_template_size: back_geometry.canvas_size,
        });
    }
    election.ballot_layout.paper_size = front_geometry.paper_size;

    let match_result = match_bubbles(definition, &grids, options.layout);
    if !match_result.is_complete() {
        collector.warn(ConvertIssue::BubbleMatchingFailed {
            message: match_result.summary(definition),
        });
    }

    let write_in_indexes = write_in_indexes(definition);
    let mut grid_positions: Vec<GridPosition> =
        place_options(definition, &grids, &match_result, &mut collector)
            .into_iter()
            .map(|(option, location)| {
                grid_position(definition, &write_in_indexes, option, location)
            })
            .collect();
    grid_positions.sort_by(compare_column_then_side_then_row);

    let accuvote_metadata = match (&grids.front.metadata, &grids.back.metadata) {
        (Some(front), Some(back)) if front.side == Side::Front && back.side == Side::Back => {
            Some(Sheet::new(front.clone(), back.clone()))
        }
        _ => None,
    };
    // The header always produces exactly one ballot style per card.
    let ballot_style_id = election.ballot_styles[0].id.clone();
    election.grid_layouts.push(GridLayout {
        ballot_style_id,
        option_bounds_from_target_mark: OPTION_BOUNDS_FROM_TARGET_MARK,
        accuvote_metadata,
        grid_positions,
    });

    for issue in validate_election(&election) {
        collector.fail(issue);
    }

    log::info!(
        "converted card '{}': {} grid position(s), {} issue(s)",
        election.title,
        election.grid_layouts[0].grid_positions.len(),
        collector.issues().len()
    );
    collector.finish(ConvertedCard {
        election,
        grids,
        match_result,
    })
}

/// Replaces county and district display names.
pub fn apply_jurisdiction_override(election: &mut Election, jurisdiction: &str) {
    election.county.name = jurisdiction.to_string();
    for district in &mut election.districts {
        district.name = jurisdiction.to_string();
    }
}

/// Converts every card of a jurisdiction and merges them into one election.
///
/// A single card converts as is; several cards are the party ballots of a
/// primary and are combined with [`combine_into_primary`].
pub fn convert_election_definition<D: TemplateDetector>(
    detector: &D,
    cards: &[CardDefinition<D::Page>],
    options: &ConvertOptions,
) -> IssueResult<Converted<Election>> {
    let mut collector = IssueCollector::new();
    let mut elections = Vec::with_capacity(cards.len());

    for card in cards {
        if let Some(converted) =
            collector.take(convert_card(detector, &card.definition, &card.pages, options))
        {
            elections.push(collector.absorb(converted).election);
        }
    }
    if collector.has_failed() {
        return Err(collector.into_issues());
    }

    let Some(combined) = collector.take(combine_into_primary(elections)) else {
        return Err(collector.into_issues());
    };
    let mut election = collector.absorb(combined);

    if let Some(jurisdiction) = &options.jurisdiction_override {
        apply_jurisdiction_override(&mut election, jurisdiction);
    }
    for issue in validate_election(&election) {
        collector.fail(issue);
    }
    collector.finish(election)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::page;
    use crate::detect::{PageMetadata, PrecomputedDetector};
    use crate::election::PaperSize;
    use crate::geometry::Point;
    use crate::matching::test_support::definition;

    fn metadata(side: Side, card_number: Option<u32>) -> Option<PageMetadata> {
        Some(PageMetadata { side, card_number })
    }

    fn pages(
        front: Option<PageMetadata>,
        back: Option<PageMetadata>,
    ) -> Sheet<TemplateGridAndBubbles> {
        Sheet::new(
            page(PaperSize::Letter, &[(12, 9)], front),
            page(PaperSize::Letter, &[(19, 9)], back),
        )
    }

    #[test]
    fn test_missing_metadata_is_accepted() {
        let grids = check_page_metadata(pages(None, None)).unwrap();
        assert_eq!(grids.front.bubbles[0].column, 12);
    }

    #[test]
    fn test_reversed_pages_are_swapped() {
        let grids = check_page_metadata(pages(
            metadata(Side::Back, Some(3)),
            metadata(Side::Front, Some(3)),
        ))
        .unwrap();
        assert_eq!(grids.front.bubbles[0].column, 19);
        assert_eq!(grids.front.metadata, metadata(Side::Front, Some(3)));
    }

    #[test]
    fn test_two_fronts_are_rejected() {
        let issues = check_page_metadata(pages(
            metadata(Side::Front, None),
            metadata(Side::Front, None),
        ))
        .unwrap_err();
        assert!(matches!(
            issues.as_slice(),
            [ConvertIssue::InvalidTimingMarkMetadata {
                side: Side::Back,
                ..
            }]
        ));
    }

    #[test]
    fn test_card_number_mismatch_is_rejected() {
        let issues = check_page_metadata(pages(
            metadata(Side::Front, Some(1)),
            metadata(Side::Back, Some(2)),
        ))
        .unwrap_err();
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_write_in_indexes_follow_ballot_order() {
        let mut definition = definition(&[("Governor", &[("Alice", None)])]);
        for y in [300.0, 280.0] {
            definition.candidate_contests[0]
                .candidates
                .push(crate::definition::Candidate {
                    name: "Write-In".to_string(),
                    party_name: None,
                    pronunciation: None,
                    oval: Point::new(236.126, y),
                    is_write_in: true,
                });
        }
        let indexes = write_in_indexes(&definition);
        assert_eq!(indexes.get(&(0, 1)), Some(&1));
        assert_eq!(indexes.get(&(0, 2)), Some(&0));
        assert_eq!(indexes.get(&(0, 0)), None);
    }

    #[test]
    fn test_wrong_page_count() {
        let definition = definition(&[("Governor", &[("Alice", None)])]);
        let only = page(PaperSize::Letter, &[], None);
        let issues = convert_card(
            &PrecomputedDetector,
            &definition,
            std::slice::from_ref(&only),
            &ConvertOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            issues,
            vec![ConvertIssue::InvalidBallotTemplateNumPages { found: 1 }]
        );
    }

    #[test]
    fn test_convert_card_places_every_option() {
        let mut definition = definition(&[("Governor", &[("Alice", None), ("Bob", None)])]);
        definition.candidate_contests[0].candidates[0].oval = Point::new(236.126, 245.768);
        definition.candidate_contests[0].candidates[1].oval = Point::new(236.126, 281.768);
        let card_pages = vec![
            page(PaperSize::Letter, &[(12, 9), (12, 13)], None),
            page(PaperSize::Letter, &[], None),
        ];

        let converted = convert_card(
            &PrecomputedDetector,
            &definition,
            &card_pages,
            &ConvertOptions::default(),
        )
        .unwrap();
        assert!(converted.issues.is_empty(), "{:?}", converted.issues);
        let layout = &converted.value.election.grid_layouts[0];
        assert_eq!(layout.grid_positions.len(), 2);
        assert_eq!(layout.ballot_style_id, converted.value.election.ballot_styles[0].id);
        let GridPosition::Option(first) = &layout.grid_positions[0] else {
            panic!("expected an option position");
        };
        assert_eq!((first.column, first.row), (12, 9));
        assert_eq!(first.option_id, candidate_id("Alice").to_string());
    }
}
