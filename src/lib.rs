//! accuvote-convert: AccuVote ballot definitions to grid-layout elections.
//!
//! An AccuVote card is described by a legacy XML ballot definition and a
//! printed template. This crate converts such cards into an election
//! definition whose every option is located on the ballot's timing-mark
//! grid, and can correct the oval coordinates of definitions whose declared
//! positions drifted from the printed ballot.
//!
//! # Modules
//!
//! - [`definition`]: the legacy XML model, parser and corrected-XML writer
//! - [`election`]: the produced election model and identifier assignment
//! - [`detect`]: the boundary with the image-detection collaborator
//! - [`matching`]: assigning declared options to detected bubbles
//! - [`conversion`]: card conversion, primary merge and the issue taxonomy
//! - [`correction`]: coordinate correction and proofing output
//! - [`geometry`]: typed coordinates and grid primitives
//! - [`error`]: error types for file and CLI operations

pub mod conversion;
pub mod correction;
pub mod definition;
pub mod detect;
pub mod election;
pub mod error;
pub mod geometry;
pub mod io;
pub mod matching;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use conversion::{convert_election_definition, CardDefinition, ConvertOptions, IssueList};
use detect::{DetectedTemplate, PrecomputedDetector};
pub use error::AccuvoteError;
use matching::BubbleLayout;

/// The accuvote-convert CLI application.
#[derive(Parser)]
#[command(name = "accuvote-convert")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert ballot cards into an election definition.
    Convert(ConvertArgs),
    /// Correct the oval coordinates of the cards listed in a config file.
    Correct(CorrectArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Ballot definition XML, once per card.
    #[arg(short = 'd', long = "definition", required = true)]
    definitions: Vec<PathBuf>,

    /// Detected template JSON, once per card, in the same order.
    #[arg(short = 't', long = "template", required = true)]
    templates: Vec<PathBuf>,

    /// How candidate bubbles are laid out on the templates.
    #[arg(long, value_enum, default_value_t = BubbleLayout::Spatial, env = "ACCUVOTE_LAYOUT")]
    layout: BubbleLayout,

    /// Replace the county and district names with this jurisdiction.
    #[arg(long)]
    jurisdiction: Option<String>,

    /// Output file for the election definition (stdout when omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Treat warnings as errors.
    #[arg(long)]
    strict: bool,

    /// Format of the issue report written to stderr.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

/// Arguments for the correct subcommand.
#[derive(clap::Args)]
struct CorrectArgs {
    /// Config file (JSON or YAML) listing the cards to correct.
    config: PathBuf,
}

/// Run the accuvote-convert CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), AccuvoteError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Correct(args)) => run_correct(args),
        None => {
            println!("accuvote-convert {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Converts AccuVote ballot definitions into grid-layout elections.");
            println!();
            println!("Run 'accuvote-convert --help' for usage information.");
            Ok(())
        }
    }
}

fn report_issues(
    format: ReportFormat,
    label: &str,
    issues: &[conversion::ConvertIssue],
) -> Result<(), AccuvoteError> {
    if issues.is_empty() {
        return Ok(());
    }
    match format {
        ReportFormat::Text => eprint!("{label}:\n{}", IssueList(issues)),
        ReportFormat::Json => {
            let text = serde_json::to_string_pretty(issues).map_err(|source| {
                AccuvoteError::JsonWrite {
                    path: "<stderr>".into(),
                    source,
                }
            })?;
            eprintln!("{text}");
        }
    }
    Ok(())
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), AccuvoteError> {
    if args.definitions.len() != args.templates.len() {
        return Err(AccuvoteError::InvalidArguments(format!(
            "{} definition(s) but {} template(s); pass one --template per --definition",
            args.definitions.len(),
            args.templates.len()
        )));
    }

    let mut cards = Vec::with_capacity(args.definitions.len());
    for (definition_path, template_path) in args.definitions.iter().zip(&args.templates) {
        let (_, definition) = io::read_definition(definition_path)?;
        let template = DetectedTemplate::read_json(template_path)?;
        log::info!(
            "loaded {} ({} contest(s)) with template {} ({} page(s))",
            definition_path.display(),
            definition.candidate_contests.len(),
            template_path.display(),
            template.pages.len()
        );
        cards.push(CardDefinition {
            definition,
            pages: template.pages,
        });
    }

    let options = ConvertOptions {
        layout: args.layout,
        jurisdiction_override: args.jurisdiction,
    };
    let converted = match convert_election_definition(&PrecomputedDetector, &cards, &options) {
        Ok(converted) => converted,
        Err(issues) => {
            if args.report == ReportFormat::Json {
                report_issues(args.report, "Errors", &issues)?;
            }
            return Err(AccuvoteError::ConversionFailed { issues });
        }
    };

    report_issues(args.report, "Warnings", &converted.issues)?;
    if args.strict && !converted.issues.is_empty() {
        return Err(AccuvoteError::ConversionFailed {
            issues: converted.issues,
        });
    }

    match &args.output {
        Some(path) => {
            io::write_json(path, &converted.value)?;
            log::info!("wrote election definition to {}", path.display());
        }
        None => io::print_json(&converted.value)?,
    }
    Ok(())
}

/// Execute the correct subcommand.
fn run_correct(args: CorrectArgs) -> Result<(), AccuvoteError> {
    let summaries = correction::run_correction(&args.config)?;
    for summary in &summaries {
        println!(
            "{}: {} corrected, {} unchanged, {} unmatched bubble(s) -> {}",
            summary.name,
            summary.corrected,
            summary.uncorrected,
            summary.unmatched_bubbles,
            summary.corrected_definition_path.display()
        );
    }
    Ok(())
}
