#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use accuvote_convert::detect::{
    DetectedTemplate, Geometry, GridSize, PageMetadata, TemplateGridAndBubbles, TimingMarkGrid,
};
use accuvote_convert::election::PaperSize;
use accuvote_convert::geometry::{
    grid_location_to_definition_point, GridLocation, GridPoint, PixelDensity, Point, Side, Size,
    DEFINITION_COLUMN_SPACING, DEFINITION_ROW_SPACING,
};

/// Definition-space position of grid cell (12, 9) on the front page.
pub const REFERENCE_X: f64 = 236.126;
pub const REFERENCE_Y: f64 = 245.768;

pub struct CandidateSpec {
    pub name: String,
    pub party: Option<String>,
    pub oval: (f64, f64),
    pub write_in: bool,
}

pub struct ContestSpec {
    pub office: String,
    pub winner_note: Option<String>,
    pub candidates: Vec<CandidateSpec>,
}

pub struct QuestionSpec {
    pub number: Option<u32>,
    pub title: String,
    pub yes: (f64, f64),
    pub no: (f64, f64),
}

/// Builds AccuVote definition XML.
pub struct DefinitionBuilder {
    pub election_id: String,
    pub election_name: String,
    pub town_name: String,
    pub town_id: String,
    pub election_date: String,
    pub precinct_id: Option<String>,
    pub party_name: Option<String>,
    pub ballot_size: String,
    pub contests: Vec<ContestSpec>,
    pub questions: Vec<QuestionSpec>,
    pub question_blob: Option<String>,
    pub omit: Vec<&'static str>,
}

impl Default for DefinitionBuilder {
    fn default() -> Self {
        Self {
            election_id: "0001".into(),
            election_name: "General Election".into(),
            town_name: "Test Town".into(),
            town_id: "00701".into(),
            election_date: "11/8/2022 00:00:00".into(),
            precinct_id: None,
            party_name: None,
            ballot_size: "8.5X11".into(),
            contests: Vec::new(),
            questions: Vec::new(),
            question_blob: None,
            omit: Vec::new(),
        }
    }
}

/// Definition-space center of a grid cell on a letter-size card.
pub fn oval(side: Side, column: i32, row: i32) -> (f64, f64) {
    let point = grid_location_to_definition_point(GridLocation::new(side, column, row), 792.0);
    (point.x, point.y)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl DefinitionBuilder {
    pub fn contest(mut self, office: &str, candidates: &[(&str, Option<&str>, (f64, f64))]) -> Self {
        self.contests.push(ContestSpec {
            office: office.into(),
            winner_note: None,
            candidates: candidates
                .iter()
                .map(|&(name, party, oval)| CandidateSpec {
                    name: name.into(),
                    party: party.map(Into::into),
                    oval,
                    write_in: false,
                })
                .collect(),
        });
        self
    }

    /// Adds a write-in to the most recently added contest.
    pub fn write_in(mut self, oval: (f64, f64)) -> Self {
        if let Some(contest) = self.contests.last_mut() {
            contest.candidates.push(CandidateSpec {
                name: "Write-In".into(),
                party: None,
                oval,
                write_in: true,
            });
        }
        self
    }

    pub fn question(mut self, number: u32, title: &str, yes: (f64, f64), no: (f64, f64)) -> Self {
        self.questions.push(QuestionSpec {
            number: Some(number),
            title: title.into(),
            yes,
            no,
        });
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<AVSInterface>\n");
        xml.push_str("  <AccuvoteHeaderInfo>\n");
        let mut field = |tag: &'static str, value: Option<&str>| {
            if let Some(value) = value {
                if !self.omit.contains(&tag) {
                    let _ = writeln!(xml, "    <{tag}>{}</{tag}>", escape(value));
                }
            }
        };
        field("ElectionID", Some(self.election_id.as_str()));
        field("ElectionName", Some(self.election_name.as_str()));
        field("TownName", Some(self.town_name.as_str()));
        field("TownID", Some(self.town_id.as_str()));
        field("ElectionDate", Some(self.election_date.as_str()));
        field("PrecinctID", self.precinct_id.as_deref());
        field("PartyName", self.party_name.as_deref());
        field("BallotSize", Some(self.ballot_size.as_str()));
        xml.push_str("  </AccuvoteHeaderInfo>\n");

        for contest in &self.contests {
            xml.push_str("  <Candidates>\n    <OfficeName>\n");
            let _ = writeln!(xml, "      <Name>{}</Name>", escape(&contest.office));
            if let Some(note) = &contest.winner_note {
                let _ = writeln!(xml, "      <WinnerNote>{}</WinnerNote>", escape(note));
            }
            xml.push_str("    </OfficeName>\n");
            for candidate in &contest.candidates {
                xml.push_str("    <CandidateName>\n");
                let _ = writeln!(xml, "      <Name>{}</Name>", escape(&candidate.name));
                if let Some(party) = &candidate.party {
                    let _ = writeln!(xml, "      <Party>{}</Party>", escape(party));
                }
                let _ = writeln!(xml, "      <OX>{}</OX>", candidate.oval.0);
                let _ = writeln!(xml, "      <OY>{}</OY>", candidate.oval.1);
                if candidate.write_in {
                    xml.push_str("      <WriteIn>True</WriteIn>\n");
                }
                xml.push_str("    </CandidateName>\n");
            }
            xml.push_str("  </Candidates>\n");
        }

        for question in &self.questions {
            xml.push_str("  <YesNoQuestion>\n");
            if let Some(number) = question.number {
                let _ = writeln!(xml, "    <Number>{number}</Number>");
            }
            let _ = writeln!(xml, "    <Title>{}</Title>", escape(&question.title));
            let _ = writeln!(xml, "    <YesOX>{}</YesOX>", question.yes.0);
            let _ = writeln!(xml, "    <YesOY>{}</YesOY>", question.yes.1);
            let _ = writeln!(xml, "    <NoOX>{}</NoOX>", question.no.0);
            let _ = writeln!(xml, "    <NoOY>{}</NoOY>", question.no.1);
            xml.push_str("  </YesNoQuestion>\n");
        }

        if let Some(blob) = &self.question_blob {
            let _ = writeln!(
                xml,
                "  <BallotPaperInfo><Questions>{}</Questions></BallotPaperInfo>",
                escape(blob)
            );
        }
        xml.push_str("</AVSInterface>\n");
        xml
    }
}

/// A 72 ppi template page whose timing marks line up exactly with the
/// definition grid, so declared ovals and detected bubbles agree.
pub fn page(
    paper_size: PaperSize,
    bubbles: &[(i32, i32)],
    metadata: Option<PageMetadata>,
) -> TemplateGridAndBubbles {
    let size = paper_size.document_size();
    let rows = match paper_size {
        PaperSize::Letter => 60,
        PaperSize::Legal => 90,
    };
    let geometry = Geometry {
        paper_size,
        pixels_per_inch: PixelDensity(72.0),
        canvas_size: Size::new(size.width, size.height),
        timing_mark_size: Size::new(10.0, 4.0),
        grid_size: GridSize { columns: 34, rows },
    };
    let first_mark = Point::new(
        REFERENCE_X - 12.0 * DEFINITION_COLUMN_SPACING,
        REFERENCE_Y - 9.0 * DEFINITION_ROW_SPACING,
    );
    TemplateGridAndBubbles {
        grid: TimingMarkGrid::regular(
            geometry,
            first_mark,
            Size::new(DEFINITION_COLUMN_SPACING, DEFINITION_ROW_SPACING),
        ),
        bubbles: bubbles
            .iter()
            .map(|&(column, row)| GridPoint::new(column, row))
            .collect(),
        metadata,
    }
}

pub fn template(
    paper_size: PaperSize,
    front: &[(i32, i32)],
    back: &[(i32, i32)],
) -> DetectedTemplate {
    DetectedTemplate {
        pages: vec![
            page(
                paper_size,
                front,
                Some(PageMetadata {
                    side: Side::Front,
                    card_number: Some(1),
                }),
            ),
            page(
                paper_size,
                back,
                Some(PageMetadata {
                    side: Side::Back,
                    card_number: Some(1),
                }),
            ),
        ],
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(&path, contents).expect("write fixture");
    path
}

pub fn write_template(dir: &Path, name: &str, template: &DetectedTemplate) -> PathBuf {
    let json = serde_json::to_string_pretty(template).expect("serialize template");
    write_file(dir, name, &json)
}
