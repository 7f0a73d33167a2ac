use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use batanki_lib::config::PipelineConfig;
use batanki_lib::export::{ExportFormat, ExportOutcome, ExportReport, Exporter};
use batanki_lib::input::RawInput;
use batanki_lib::pipeline::{Pipeline, PipelineOutcome};

use crate::render::terminal::{paint, render_card, Color};
use crate::OutputFormat;

const AWAITING_INPUT: &str = "Awaiting input: pass a file, --text, or pipe text on stdin.";

/// Where and what to export. Nothing is written when `formats` is empty.
pub struct ExportRequest {
    pub formats: Vec<ExportFormat>,
    pub out_dir: PathBuf,
}

pub fn run(
    config: PipelineConfig,
    input: RawInput,
    export: &ExportRequest,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let outcome = Pipeline::new(config).run(&input);

    let report = match outcome.deck() {
        Some(deck) if !export.formats.is_empty() => {
            let report = Exporter::new()
                .export_all(deck, &export.formats)
                .context("Export failed")?;
            write_artifacts(&report, &export.out_dir)?;
            Some(report)
        }
        _ => None,
    };

    match format {
        OutputFormat::Json => {
            let exports: Vec<serde_json::Value> = report
                .iter()
                .flat_map(|r| r.outcomes.iter())
                .map(|outcome| match outcome {
                    ExportOutcome::Written(artifact) => serde_json::json!({
                        "format": artifact.format,
                        "mimeType": artifact.format.mime_type(),
                        "path": export.out_dir.join(&artifact.file_name).to_string_lossy(),
                        "bytes": artifact.bytes.len(),
                    }),
                    ExportOutcome::Skipped { format, reason } => serde_json::json!({
                        "format": format,
                        "skipped": reason,
                    }),
                })
                .collect();
            let output = serde_json::json!({
                "outcome": outcome,
                "exports": exports,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match &outcome {
            PipelineOutcome::AwaitingInput => println!("{}", AWAITING_INPUT),
            PipelineOutcome::Generated(generated) => {
                println!("{}", paint(&generated.summary, Color::ITALIC, use_color));
                println!();
                println!(
                    "{}: {} card(s) from {} chunk(s)",
                    generated.deck.name,
                    generated.deck.len(),
                    generated.chunk_count
                );
                for (i, card) in generated.deck.cards.iter().enumerate() {
                    println!();
                    println!("{}", render_card(i + 1, card, use_color));
                }
                if let Some(report) = &report {
                    println!();
                    print_report(report, &export.out_dir, use_color);
                }
            }
        },
    }

    Ok(())
}

fn write_artifacts(report: &ExportReport, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for artifact in report.artifacts() {
        let path = out_dir.join(&artifact.file_name);
        fs::write(&path, &artifact.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote {}", path.display());
    }
    Ok(())
}

fn print_report(report: &ExportReport, out_dir: &Path, use_color: bool) {
    for outcome in &report.outcomes {
        match outcome {
            ExportOutcome::Written(artifact) => println!(
                "{} {} ({} bytes)",
                paint("Wrote", Color::GREEN, use_color),
                out_dir.join(&artifact.file_name).display(),
                artifact.bytes.len()
            ),
            ExportOutcome::Skipped { format, reason } => println!(
                "{} {}: {}",
                paint("Skipped", Color::YELLOW, use_color),
                format,
                reason
            ),
        }
    }
}
