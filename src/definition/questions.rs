//! Parser for the free-text constitutional question blob.
//!
//! Older definitions encode their yes/no questions as a single HTML string in
//! `BallotPaperInfo/Questions` instead of structured elements. The text is
//! split into fragments (see [`super::html::text_fragments`]) and fed through
//! a small state machine that recognises question numbers, boilerplate
//! headers and the `YES`/`NO` labels that terminate each question.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::html::text_fragments;
use super::model::ConstitutionalQuestion;

static QUESTION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\s*").expect("static regex"));

/// Prefixes of the boilerplate lines that introduce a question.
const HEADER_PREFIXES: &[&str] = &[
    "CONSTITUTIONAL AMENDMENT",
    "QUESTION PROPOSED PURSUANT",
    "PROPOSED AMENDMENT",
    "QUESTION PROPOSED",
];

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionParseError {
    #[error("found YES/NO with no question text at fragment {fragment_index}: '{fragment}'")]
    MissingQuestionText {
        fragment_index: usize,
        fragment: String,
    },

    #[error("question has no YES/NO: '{text}'")]
    MissingYesNo { text: String },
}

/// Extracts questions from the raw HTML of a `Questions` element.
pub fn parse_questions_html(
    html: &str,
) -> Result<Vec<ConstitutionalQuestion>, QuestionParseError> {
    parse_question_fragments(&text_fragments(html))
}

/// Fuzz-only entrypoint: runs the state machine over newline-separated
/// fragments, bypassing HTML extraction.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_question_lines(input: &str) -> Result<(), QuestionParseError> {
    let fragments: Vec<&str> = input.lines().collect();
    parse_question_fragments(&fragments)?;
    Ok(())
}

#[derive(Debug, Default)]
struct PendingQuestion {
    number: Option<u32>,
    header: Option<String>,
    body: Vec<String>,
    saw_yes: bool,
    saw_no: bool,
}

impl PendingQuestion {
    fn has_text(&self) -> bool {
        !self.body.is_empty()
    }

    /// An un-numbered question whose second fragment opens a new sentence
    /// was preceded by its header line. A lowercase second fragment continues
    /// the question text instead.
    fn close(mut self) -> ConstitutionalQuestion {
        let header_line_first = self.header.is_none()
            && self.number.is_none()
            && self
                .body
                .get(1)
                .and_then(|line| line.chars().next())
                .is_some_and(char::is_uppercase);
        if header_line_first {
            self.header = Some(self.body.remove(0));
        }
        ConstitutionalQuestion {
            number: self.number,
            header: self.header,
            title: self.body.join(" "),
            ovals: None,
        }
    }

    fn missing_yes_no(&self) -> QuestionParseError {
        QuestionParseError::MissingYesNo {
            text: self.body.join(" "),
        }
    }
}

/// Runs the question state machine over already-extracted text fragments.
pub fn parse_question_fragments<S: AsRef<str>>(
    fragments: &[S],
) -> Result<Vec<ConstitutionalQuestion>, QuestionParseError> {
    let mut questions = Vec::new();
    let mut current: Option<PendingQuestion> = None;
    let mut next_header: Option<String> = None;

    for (index, fragment) in fragments.iter().enumerate() {
        let fragment = fragment.as_ref().trim();
        let (rest, saw_no) = strip_trailing_token(fragment, "NO");
        let (rest, saw_yes) = strip_trailing_token(rest, "YES");
        let (number, text) = strip_question_number(rest);

        if !text.is_empty() {
            if number.is_some() {
                if let Some(pending) = current.take() {
                    if pending.has_text() {
                        return Err(pending.missing_yes_no());
                    }
                }
                current = Some(PendingQuestion {
                    number,
                    header: next_header.take(),
                    body: vec![text.to_string()],
                    ..Default::default()
                });
            } else if index == 0 && !saw_yes && !saw_no && is_section_title(text) {
                // section title, not part of any question
            } else if is_header(text) && !current.as_ref().is_some_and(|q| q.saw_yes) {
                if let Some(pending) = current.take() {
                    if pending.has_text() {
                        return Err(pending.missing_yes_no());
                    }
                }
                next_header = Some(text.to_string());
            } else {
                current
                    .get_or_insert_with(|| PendingQuestion {
                        header: next_header.take(),
                        ..Default::default()
                    })
                    .body
                    .push(text.to_string());
            }
        }

        if saw_yes || saw_no {
            let pending = match current.as_mut() {
                Some(pending) if pending.has_text() => pending,
                _ => {
                    return Err(QuestionParseError::MissingQuestionText {
                        fragment_index: index,
                        fragment: fragment.to_string(),
                    })
                }
            };
            pending.saw_yes |= saw_yes;
            pending.saw_no |= saw_no;
            if pending.saw_yes && pending.saw_no {
                if let Some(done) = current.take() {
                    questions.push(done.close());
                }
            }
        }
    }

    match current {
        Some(pending) if pending.has_text() => Err(pending.missing_yes_no()),
        _ => Ok(questions),
    }
}

/// Removes `token` from the end of `text` if it stands alone as a word.
fn strip_trailing_token<'a>(text: &'a str, token: &str) -> (&'a str, bool) {
    match text.strip_suffix(token) {
        Some(rest) if rest.is_empty() || rest.ends_with(char::is_whitespace) => {
            (rest.trim_end(), true)
        }
        _ => (text, false),
    }
}

fn strip_question_number(text: &str) -> (Option<u32>, &str) {
    let Some(captures) = QUESTION_NUMBER.captures(text) else {
        return (None, text);
    };
    let (Some(whole), Some(digits)) = (captures.get(0), captures.get(1)) else {
        return (None, text);
    };
    match digits.as_str().parse() {
        Ok(number) => (Some(number), text[whole.end()..].trim()),
        Err(_) => (None, text),
    }
}

fn is_section_title(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

fn is_header(text: &str) -> bool {
    let upper = text.to_uppercase();
    HEADER_PREFIXES.iter().any(|prefix| upper.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_header_and_body() {
        let questions =
            parse_question_fragments(&["TITLE", "Some header line", "Shall X? YES", "NO"]).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].title, "Shall X?");
        assert_eq!(questions[0].header.as_deref(), Some("Some header line"));
        assert_eq!(questions[0].number, None);
    }

    #[test]
    fn test_numbered_questions_with_boilerplate_header() {
        let fragments = [
            "CONSTITUTIONAL AMENDMENTS PROPOSED BY THE 2022 GENERAL COURT",
            "1. Are you in favor of amending the constitution?",
            "YES",
            "NO",
            "Constitutional Amendment Proposed by Convention",
            "2. Shall there be a convention to amend the constitution? YES NO",
        ];
        let questions = parse_question_fragments(&fragments).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].number, Some(1));
        assert_eq!(questions[0].header, None);
        assert_eq!(questions[0].title, "Are you in favor of amending the constitution?");
        assert_eq!(questions[1].number, Some(2));
        assert_eq!(
            questions[1].header.as_deref(),
            Some("Constitutional Amendment Proposed by Convention")
        );
    }

    #[test]
    fn test_multi_fragment_body_of_numbered_question() {
        let questions = parse_question_fragments(&[
            "1. Are you in favor of",
            "amending article 7? YES",
            "NO",
        ])
        .unwrap();
        assert_eq!(questions[0].title, "Are you in favor of amending article 7?");
        assert_eq!(questions[0].header, None);
    }

    #[test]
    fn test_wrapped_question_keeps_first_line_in_title() {
        let questions =
            parse_question_fragments(&["Shall the town", "adopt X? YES", "NO"]).unwrap();
        assert_eq!(questions[0].title, "Shall the town adopt X?");
        assert_eq!(questions[0].header, None);
    }

    #[test]
    fn test_lowercase_no_is_text() {
        let questions =
            parse_question_fragments(&["Shall we say yes or no", "YES", "NO"]).unwrap();
        assert_eq!(questions[0].title, "Shall we say yes or no");
    }

    #[test]
    fn test_yes_without_text() {
        let err = parse_question_fragments(&["YES", "NO"]).unwrap_err();
        assert!(matches!(
            err,
            QuestionParseError::MissingQuestionText {
                fragment_index: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_text_without_yes_no() {
        let err = parse_question_fragments(&["1. Dangling question?"]).unwrap_err();
        assert_eq!(
            err,
            QuestionParseError::MissingYesNo {
                text: "Dangling question?".into()
            }
        );
    }

    #[test]
    fn test_new_number_before_yes_no_is_error() {
        let err = parse_question_fragments(&["1. First?", "2. Second? YES", "NO"]).unwrap_err();
        assert!(matches!(err, QuestionParseError::MissingYesNo { .. }));
    }

    #[test]
    fn test_from_html_decodes_named_entities() {
        let html = "<p>1. Shall the caf&eacute; &sect; 3 be open&hellip;?</p><p>YES</p><p>NO</p>";
        let questions = parse_questions_html(html).unwrap();
        assert_eq!(questions[0].title, "Shall the caf\u{e9} \u{a7} 3 be open\u{2026}?");
    }

    #[test]
    fn test_from_html_ignores_uppercase_style_block() {
        let html = "<STYLE>p {x}</STYLE><p>1. Shall X?</p><p>YES</p><p>NO</p>";
        let questions = parse_questions_html(html).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].title, "Shall X?");
    }

    #[test]
    fn test_from_html() {
        let html = "<p>1. Shall we&nbsp;proceed?</p><p>YES</p><p>NO</p>";
        let questions = parse_questions_html(html).unwrap();
        assert_eq!(questions[0].title, "Shall we proceed?");
    }
}
