//! Shrike CLI
//!
//! Command-line interface for the Shrike payload inspection engine.

use anyhow::Result;
use clap::{Parser, Subcommand};
use shrike_engine::InspectionEngine;
use shrike_pda::HttpValidator;
use shrike_signatures::SignatureSet;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "shrike")]
#[command(about = "Shrike - payload inspection engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a payload for signature occurrences
    Scan {
        /// Signature file (JSON, category -> patterns)
        #[arg(short, long, default_value = "./signatures/default.json")]
        signatures: PathBuf,

        /// Payload file, or literal payload with --text
        input: String,

        /// Treat the input argument as the payload itself
        #[arg(short, long)]
        text: bool,

        /// Include the per-byte scan trace in the output
        #[arg(long)]
        steps: bool,
    },

    /// Validate a payload as an HTTP message
    Validate {
        /// Message file, or literal message with --text
        input: String,

        /// Treat the input argument as the message itself
        #[arg(short, long)]
        text: bool,

        /// Include the PDA execution trace in the output
        #[arg(long)]
        trace: bool,
    },

    /// Scan and validate one payload in a single pass
    Inspect {
        /// Signature file (JSON, category -> patterns)
        #[arg(short, long, default_value = "./signatures/default.json")]
        signatures: PathBuf,

        /// Payload file, or literal payload with --text
        input: String,

        /// Treat the input argument as the payload itself
        #[arg(short, long)]
        text: bool,
    },

    /// Export the compiled automaton graph for visualization
    Export {
        /// Signature file (JSON, category -> patterns)
        #[arg(short, long, default_value = "./signatures/default.json")]
        signatures: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level)?;

    match cli.command {
        Commands::Scan {
            signatures,
            input,
            text,
            steps,
        } => scan(&signatures, &input, text, steps),
        Commands::Validate { input, text, trace } => validate(&input, text, trace),
        Commands::Inspect {
            signatures,
            input,
            text,
        } => inspect(&signatures, &input, text),
        Commands::Export { signatures, output } => export(&signatures, output.as_deref()),
    }
}

fn setup_logging(level: &str) -> Result<()> {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(())
}

fn read_payload(input: &str, text: bool) -> Result<Vec<u8>> {
    if text {
        Ok(input.as_bytes().to_vec())
    } else {
        Ok(std::fs::read(input)?)
    }
}

fn scan(signatures: &Path, input: &str, text: bool, steps: bool) -> Result<()> {
    let signatures = SignatureSet::from_path(signatures)?;
    let engine = InspectionEngine::new(&signatures);
    let payload = read_payload(input, text)?;

    let report = engine.scan(&payload);
    info!(matches = report.matches.len(), "Scan complete");

    if steps {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&report.matches)?);
    }

    Ok(())
}

fn validate(input: &str, text: bool, trace: bool) -> Result<()> {
    let message = read_payload(input, text)?;
    let report = HttpValidator::new().validate(&message);
    info!(verdict = ?report.verdict, headers = report.headers.len(), "Validation complete");

    if trace {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let summary = serde_json::json!({
            "verdict": report.verdict,
            "headers": report.headers,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn inspect(signatures: &Path, input: &str, text: bool) -> Result<()> {
    let signatures = SignatureSet::from_path(signatures)?;
    let engine = InspectionEngine::new(&signatures);
    let payload = read_payload(input, text)?;

    let report = engine.inspect(&payload);
    info!(
        matches = report.scan.matches.len(),
        verdict = ?report.http.verdict,
        "Inspection complete"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn export(signatures: &Path, output: Option<&Path>) -> Result<()> {
    let signatures = SignatureSet::from_path(signatures)?;
    let automaton = signatures.compile();
    let export = automaton.export();
    info!(
        nodes = export.nodes.len(),
        edges = export.edges.len(),
        "Automaton exported"
    );

    let json = serde_json::to_string_pretty(&export)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{}", json),
    }

    Ok(())
}
