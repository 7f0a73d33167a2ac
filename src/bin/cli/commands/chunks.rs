use anyhow::Result;

use batanki_lib::config::PipelineConfig;
use batanki_lib::input::RawInput;
use batanki_lib::pipeline::{chunk_text, normalize, Chunk};

use crate::render::terminal::render_chunk;
use crate::OutputFormat;

pub fn run(config: &PipelineConfig, input: RawInput, format: &OutputFormat, use_color: bool) -> Result<()> {
    let normalized = normalize(&input.text, config.max_text_length);
    let chunks = chunk_text(&normalized, config.chunk_size);
    let collected: Vec<Chunk> = chunks.iter().collect();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "sentenceCount": chunks.sentence_count(),
                "groupSize": chunks.group_size(),
                "chunks": collected,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if collected.is_empty() {
                println!("No sentences found.");
                return Ok(());
            }
            println!(
                "{} sentence(s) in {} chunk(s) of up to {}",
                chunks.sentence_count(),
                collected.len(),
                chunks.group_size()
            );
            for chunk in &collected {
                println!();
                println!("{}", render_chunk(chunk, use_color));
            }
        }
    }

    Ok(())
}
