//! Criterion microbenches for definition parsing and grid pairing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Definition XML parsing (parse_definition_str)
//! - Constitutional question blob parsing (parse_questions_html)
//! - Column pairing of declared ovals against detected bubbles

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::fmt::Write as _;
use std::hint::black_box;

use accuvote_convert::definition::{parse_definition_str, parse_questions_html};
use accuvote_convert::geometry::{GridLocation, Side};
use accuvote_convert::matching::pair_column_entries;

const QUESTIONS_FIXTURE: &str = "<div><p><b>CONSTITUTIONAL AMENDMENTS PROPOSED BY THE 2022 GENERAL COURT</b></p>\
<p>1. Are you in favor of amending article 39 of part 2 of the constitution?</p><p>YES</p><p>NO</p>\
<p>Constitutional Amendment Proposed by Convention</p>\
<p>2. Shall there be a convention to amend or revise the constitution?</p><p>YES</p><p>NO</p></div>";

/// A definition with `contests` offices of five candidates each.
fn definition_fixture(contests: usize) -> String {
    let mut xml = String::from(
        "<AVSInterface><AccuvoteHeaderInfo><ElectionID>1</ElectionID>\
         <ElectionName>General Election</ElectionName><TownName>Town</TownName>\
         <TownID>00701</TownID><ElectionDate>11/8/2022 00:00:00</ElectionDate>\
         <BallotSize>8.5X14</BallotSize></AccuvoteHeaderInfo>",
    );
    for contest in 0..contests {
        let _ = write!(xml, "<Candidates><OfficeName><Name>Office {contest}</Name></OfficeName>");
        for candidate in 0..5 {
            let _ = write!(
                xml,
                "<CandidateName><Name>Candidate {contest}-{candidate}</Name><Party>Party {candidate}</Party>\
                 <OX>{}</OX><OY>{}</OY></CandidateName>",
                236.126 + 108.0 / 7.0 * candidate as f64,
                245.768 + 9.0 * (contest * 4) as f64,
            );
        }
        xml.push_str("</Candidates>");
    }
    xml.push_str("</AVSInterface>");
    xml
}

fn grid(columns: i32, rows: i32, offset: i32) -> Vec<GridLocation> {
    (0..columns)
        .flat_map(|column| {
            (0..rows).map(move |row| GridLocation::new(Side::Front, column + offset, row * 4 + offset))
        })
        .collect()
}

/// Benchmark definition XML parsing.
fn bench_definition_parse(c: &mut Criterion) {
    let xml = definition_fixture(20);
    let mut group = c.benchmark_group("definition_parse");
    group.throughput(Throughput::Bytes(xml.len() as u64));

    group.bench_function("parse_definition_str", |b| {
        b.iter(|| {
            let definition = parse_definition_str(black_box(&xml)).unwrap();
            black_box(definition)
        })
    });

    group.finish();
}

/// Benchmark question blob parsing.
fn bench_questions_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("questions_parse");
    group.throughput(Throughput::Bytes(QUESTIONS_FIXTURE.len() as u64));

    group.bench_function("parse_questions_html", |b| {
        b.iter(|| {
            let questions = parse_questions_html(black_box(QUESTIONS_FIXTURE)).unwrap();
            black_box(questions)
        })
    });

    group.finish();
}

/// Benchmark column pairing on a full-ballot-sized grid.
fn bench_pairing(c: &mut Criterion) {
    let declared = grid(5, 20, 0);
    let detected = grid(5, 20, 2);
    let mut group = c.benchmark_group("pairing");
    group.throughput(Throughput::Elements(declared.len() as u64));

    group.bench_function("pair_column_entries", |b| {
        b.iter(|| {
            let pairs =
                pair_column_entries(black_box(declared.clone()), black_box(detected.clone()))
                    .unwrap();
            black_box(pairs)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_definition_parse,
    bench_questions_parse,
    bench_pairing
);
criterion_main!(benches);
