//! Prescription pipeline CLI: OCR results document in, JSON envelope out.
//!
//! The OCR engine itself is an external collaborator; this binary picks
//! up its results.json, runs extraction and validation, and prints the
//! final envelope (optionally saving it next to other pipeline output).

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rxlens_core::ocr;
use rxlens_core::pipeline::Pipeline;
use rxlens_llm::GeminiExtractor;

#[derive(Parser)]
#[command(
    name = "rxlens",
    about = "Extract a structured eyeglass prescription from OCR results"
)]
struct Args {
    /// OCR results document (results.json written by the OCR engine)
    results: PathBuf,

    /// Directory to save prescription_result.json into
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the envelope
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Same shape the web layer would return for a broken request
            let failure = serde_json::json!({
                "status": "error",
                "message": format!("{err:#}"),
                "data": null
            });
            eprintln!("{failure}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let raw = fs::read_to_string(&args.results)
        .with_context(|| format!("reading {}", args.results.display()))?;
    let lines = ocr::parse_lines(&raw).context("parsing OCR results document")?;
    let text = ocr::joined_text(&lines);
    info!(lines = lines.len(), "loaded OCR document");

    let extractor = GeminiExtractor::from_env()?;
    let envelope = Pipeline::new(&extractor).process(&text, &lines)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };

    if let Some(dir) = &args.output {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        let path = dir.join("prescription_result.json");
        fs::write(&path, &json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "saved envelope");
    }

    println!("{json}");
    Ok(())
}
