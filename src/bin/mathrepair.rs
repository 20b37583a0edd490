//! mathrepair CLI - recover and solve math from typed questions or recognizer output.

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use mathrepair::core::{clean_recognizer_output, normalize};
use mathrepair::pipeline::{
    format_solution, solve_candidates_with_report, solve_question_with_report, PipelineOptions,
};
use mathrepair::sources::{gather, CandidateSource, StaticSource};
use mathrepair::{AngleUnit, Label, OcrResponse, PipelineTrace};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "MATHREPAIR_LOG";

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mathrepair")]
#[command(author = "SciPenAI")]
#[command(version)]
#[command(about = "Recover solvable math from noisy recognizer output and solve it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read pipeline options from a TOML file
    #[arg(long, global = true)]
    options: Option<String>,

    /// Trig arguments are already in radians
    #[arg(long, global = true)]
    radians: bool,

    /// Write the stage trace as JSON to this path
    #[arg(long, global = true)]
    trace_log: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Solve a typed question (reads stdin if not provided)
    Solve {
        question: Option<String>,

        /// Diagram label as name=value (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// JSON file with an array of labels
        #[arg(long = "labels")]
        labels_file: Option<String>,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Select among recognizer candidates and solve the winner
    Ocr {
        /// Primary candidate text (repeatable, in recognizer order)
        #[arg(short, long = "candidate")]
        candidates: Vec<String>,

        /// Fallback recognizer text, used only without candidates
        #[arg(long)]
        fallback: Vec<String>,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the normalized form of a text
    Normalize {
        text: String,

        /// Apply the recognizer cleanup instead
        #[arg(long)]
        recognizer: bool,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> io::Result<()> {
    let options = load_options(&cli)?;

    match cli.command {
        Commands::Solve {
            question,
            labels,
            labels_file,
            json,
        } => {
            let question = match question {
                Some(q) => q,
                None => {
                    let mut buffer = String::new();
                    io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let labels = load_labels(&labels, labels_file.as_deref())?;

            let report = solve_question_with_report(&question, &labels, &options);
            write_trace(cli.trace_log.as_deref(), &report.trace)?;

            if json {
                println!("{}", to_json(&report.response)?);
            } else if let Some(err) = &report.response.error {
                println!("Error: {}", err);
            } else {
                println!("{}", format_solution(report.outcome.as_ref()));
            }
        }
        Commands::Ocr {
            candidates,
            fallback,
            json,
        } => {
            let primary = StaticSource::new("cli", candidates);
            let backup = StaticSource::new("cli-fallback", fallback);
            let primary: [&dyn CandidateSource; 1] = [&primary];
            let backup: [&dyn CandidateSource; 1] = [&backup];
            let pool = gather(&primary, &backup);

            let report = solve_candidates_with_report(&pool, &options);
            write_trace(cli.trace_log.as_deref(), &report.trace)?;

            if json {
                println!("{}", to_json(&report.response)?);
            } else {
                match &report.response {
                    OcrResponse::NoOperator { error, .. } => println!("Error: {}", error),
                    OcrResponse::Text { text } => println!("{}", text),
                    OcrResponse::Solved {
                        error: Some(err), ..
                    } => println!("Error: {}", err),
                    OcrResponse::Solved { .. } => {
                        println!("{}", format_solution(report.outcome.as_ref()))
                    }
                }
            }
        }
        Commands::Normalize { text, recognizer } => {
            if recognizer {
                println!("{}", clean_recognizer_output(&text));
            } else {
                println!("{}", normalize(&text));
            }
        }
    }

    Ok(())
}

fn load_options(cli: &Cli) -> io::Result<PipelineOptions> {
    let mut options = match &cli.options {
        Some(path) => {
            let source = fs::read_to_string(path)?;
            PipelineOptions::from_toml_str(&source)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?
        }
        None => PipelineOptions::from_env(),
    };
    if cli.radians {
        options.angle_unit = AngleUnit::Radians;
    }
    Ok(options)
}

fn load_labels(inline: &[String], file: Option<&str>) -> io::Result<Vec<Label>> {
    let mut labels = match file {
        Some(path) => {
            let source = fs::read_to_string(path)?;
            serde_json::from_str::<Vec<Label>>(&source)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?
        }
        None => Vec::new(),
    };
    labels.extend(inline.iter().map(|text| Label::assignment(text.as_str())));
    Ok(labels)
}

fn write_trace(path: Option<&str>, trace: &PipelineTrace) -> io::Result<()> {
    if let Some(path) = path {
        fs::write(path, to_json(trace)?)?;
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}
