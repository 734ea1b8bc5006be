//! Yes/no question matching.
//!
//! Questions sit at the bottom of the last side that has any, one row per
//! question with the "yes" bubble left of the "no" bubble. Rows are consumed
//! from the end of the card backward, last question first.

use std::collections::BTreeMap;

use super::{MatchIssue, MatchResult, OptionRef, Unmatched, YesNo};
use crate::geometry::{GridLocation, Side};

/// Matches `question_count` questions and returns the bubbles left over for
/// candidates, in their original order.
pub(super) fn match_questions(
    question_count: usize,
    bubbles: Vec<GridLocation>,
    result: &mut MatchResult,
) -> Vec<GridLocation> {
    if question_count == 0 {
        return bubbles;
    }

    let mut rows: BTreeMap<(Side, i32), Vec<GridLocation>> = BTreeMap::new();
    for bubble in &bubbles {
        rows.entry((bubble.side, bubble.row)).or_default().push(*bubble);
    }
    let mut rows: Vec<((Side, i32), Vec<GridLocation>)> = rows.into_iter().collect();
    let row_count = rows.len();

    let mut consumed = Vec::new();
    for question in (0..question_count).rev() {
        let Some(((side, row), mut row_bubbles)) = rows.pop() else {
            result.issues.push(MatchIssue::NotEnoughQuestionRows {
                questions: question_count,
                rows: row_count,
            });
            mark_unmatched(0..=question, result);
            break;
        };
        if row_bubbles.len() != 2 {
            result.issues.push(MatchIssue::QuestionRowMismatch {
                side,
                row,
                bubbles: row_bubbles.len(),
            });
            mark_unmatched(0..=question, result);
            break;
        }
        row_bubbles.sort_by_key(|b| b.column);
        let (yes, no) = (row_bubbles[0], row_bubbles[1]);
        result.push_matched(
            OptionRef::Question {
                question,
                option: YesNo::Yes,
            },
            yes,
        );
        result.push_matched(
            OptionRef::Question {
                question,
                option: YesNo::No,
            },
            no,
        );
        consumed.extend([yes, no]);
    }

    bubbles
        .into_iter()
        .filter(|b| !consumed.contains(b))
        .collect()
}

fn mark_unmatched(questions: impl Iterator<Item = usize>, result: &mut MatchResult) {
    for question in questions {
        for option in [YesNo::Yes, YesNo::No] {
            result.unmatched.push(Unmatched::Option {
                option: OptionRef::Question { question, option },
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridPoint;
    use crate::matching::Matched;

    fn loc(side: Side, column: i32, row: i32) -> GridLocation {
        GridLocation::new(side, column, row)
    }

    #[test]
    fn test_questions_consume_rows_from_the_bottom() {
        let bubbles = vec![
            loc(Side::Front, 12, 9),
            loc(Side::Back, 26, 30),
            loc(Side::Back, 20, 30),
            loc(Side::Back, 20, 40),
            loc(Side::Back, 26, 40),
        ];
        let mut result = MatchResult::default();
        let remaining = match_questions(2, bubbles, &mut result);

        assert_eq!(remaining, vec![loc(Side::Front, 12, 9)]);
        assert!(result.unmatched.is_empty());
        assert_eq!(
            result.bubble_for(OptionRef::Question {
                question: 1,
                option: YesNo::Yes
            }),
            Some(loc(Side::Back, 20, 40))
        );
        assert_eq!(
            result.bubble_for(OptionRef::Question {
                question: 0,
                option: YesNo::No
            }),
            Some(loc(Side::Back, 26, 30))
        );
        assert!(result.matched.front.is_empty());
    }

    #[test]
    fn test_row_with_wrong_bubble_count_stops_matching() {
        let bubbles = vec![
            loc(Side::Front, 20, 30),
            loc(Side::Front, 26, 30),
            loc(Side::Front, 20, 40),
            loc(Side::Front, 26, 40),
            loc(Side::Front, 32, 40),
        ];
        let mut result = MatchResult::default();
        let remaining = match_questions(2, bubbles.clone(), &mut result);

        assert_eq!(remaining, bubbles);
        assert_eq!(
            result.issues,
            vec![MatchIssue::QuestionRowMismatch {
                side: Side::Front,
                row: 40,
                bubbles: 3
            }]
        );
        assert_eq!(result.unmatched.len(), 4);
    }

    #[test]
    fn test_running_out_of_rows() {
        let bubbles = vec![loc(Side::Front, 20, 30), loc(Side::Front, 26, 30)];
        let mut result = MatchResult::default();
        let remaining = match_questions(2, bubbles, &mut result);

        assert!(remaining.is_empty());
        assert_eq!(
            result.issues,
            vec![MatchIssue::NotEnoughQuestionRows {
                questions: 2,
                rows: 1
            }]
        );
        assert_eq!(
            result.matched.front,
            vec![
                Matched {
                    option: OptionRef::Question {
                        question: 1,
                        option: YesNo::Yes
                    },
                    bubble: GridPoint::new(20, 30)
                },
                Matched {
                    option: OptionRef::Question {
                        question: 1,
                        option: YesNo::No
                    },
                    bubble: GridPoint::new(26, 30)
                },
            ]
        );
        assert_eq!(result.unmatched.len(), 2);
    }
}
