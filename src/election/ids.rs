//! Deterministic, content-derived identifiers.
//!
//! Every id is a pure function of normalized source strings, so converting
//! unchanged input twice, or converting the cards of a multi-party primary
//! independently, assigns the same id to the same logical entity.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifies a political party.
    PartyId
);
string_id!(
    /// Identifies a precinct: a town plus an optional precinct code.
    PrecinctId
);
string_id!(
    /// Identifies a district, derived from its member precincts.
    DistrictId
);
string_id!(
    /// Identifies a ballot style.
    BallotStyleId
);
string_id!(
    /// Identifies a candidate or yes/no contest.
    ContestId
);
string_id!(
    /// Identifies a candidate.
    CandidateId
);
string_id!(
    /// Identifies a yes/no contest option.
    OptionId
);

const MAX_SLUG_LEN: usize = 64;

static NON_ID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^-_a-z0-9+]+").expect("static regex"));
static NON_PRECINCT_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^-_A-Za-z0-9]").expect("static regex"));

/// 8 hex characters of the CRC-32C of `text`.
fn content_hash(text: &str) -> String {
    format!("{:08x}", crc32c::crc32c(text.as_bytes()))
}

/// Builds `{slug}-{hash}` where the hash covers the whole lower-cased text.
pub fn make_id(text: &str) -> String {
    let lower = text.to_lowercase();
    let slug = NON_ID_CHARS.replace_all(&lower, "-");
    let slug: String = slug.chars().take(MAX_SLUG_LEN).collect();
    format!("{}-{}", slug, content_hash(&lower))
}

pub fn party_id(party_name: &str) -> PartyId {
    PartyId(make_id(party_name))
}

pub fn candidate_id(candidate_name: &str) -> CandidateId {
    CandidateId(make_id(candidate_name))
}

/// A town's precinct, optionally narrowed by the raw `PrecinctID`.
pub fn precinct_id(town_id: &str, raw_precinct_id: Option<&str>) -> PrecinctId {
    let cleaned = raw_precinct_id
        .map(|raw| NON_PRECINCT_CHARS.replace_all(raw, "").into_owned())
        .filter(|cleaned| !cleaned.is_empty());
    match cleaned {
        Some(cleaned) => PrecinctId(format!("town-id-{town_id}-precinct-id-{cleaned}")),
        None => PrecinctId(format!("town-id-{town_id}-precinct")),
    }
}

fn sorted_unique<'a, I>(ids: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ids: Vec<&str> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// A district covering exactly `precinct_ids`, independent of their order.
pub fn district_id<'a>(precinct_ids: impl IntoIterator<Item = &'a PrecinctId>) -> DistrictId {
    let ids = sorted_unique(precinct_ids.into_iter().map(PrecinctId::as_str));
    DistrictId(format!("district-{}", content_hash(&ids.join(","))))
}

pub fn ballot_style_id<'a>(
    precinct_ids: impl IntoIterator<Item = &'a PrecinctId>,
    district_ids: impl IntoIterator<Item = &'a DistrictId>,
    party: Option<&PartyId>,
) -> BallotStyleId {
    let precincts = sorted_unique(precinct_ids.into_iter().map(PrecinctId::as_str));
    let districts = sorted_unique(district_ids.into_iter().map(DistrictId::as_str));
    let key = format!(
        "{}|{}|{}",
        precincts.join(","),
        districts.join(","),
        party.map(PartyId::as_str).unwrap_or_default()
    );
    BallotStyleId(format!("ballot-style-{}", content_hash(&key)))
}

/// A candidate contest; primaries scope the office by the card's party.
pub fn candidate_contest_id(office_name: &str, election_party_name: Option<&str>) -> ContestId {
    match election_party_name {
        Some(party) => ContestId(make_id(&format!("{office_name}-{party}"))),
        None => ContestId(make_id(office_name)),
    }
}

pub fn yes_no_contest_id(number: Option<u32>, title: &str) -> ContestId {
    match number {
        Some(number) => ContestId(make_id(&format!("question-{number}-{title}"))),
        None => ContestId(make_id(&format!("question-{title}"))),
    }
}

pub fn yes_option_id(contest_id: &ContestId) -> OptionId {
    OptionId(format!("{contest_id}-option-yes"))
}

pub fn no_option_id(contest_id: &ContestId) -> OptionId {
    OptionId(format!("{contest_id}-option-no"))
}
