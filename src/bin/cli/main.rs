mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use batanki_lib::cards::CardKind;
use batanki_lib::export::ExportFormat;
use batanki_lib::input::InputOrigin;

use app::ConfigOverrides;
use commands::generate::ExportRequest;

#[derive(Parser)]
#[command(name = "batanki-cli", about = "Generate flashcard decks from study text", version)]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Generate flashcards and optionally export them
    Generate {
        /// Input file (txt, md, html, docx, epub); stdin is used when piped
        file: Option<PathBuf>,
        /// Inline text (use "-" to read from stdin)
        #[arg(long)]
        text: Option<String>,
        /// Input origin: upload, manual, onenote, link, voice
        #[arg(long)]
        origin: Option<InputOrigin>,
        /// Card kind: basic, cloze, mcq, reverse, memo, image-occlusion
        #[arg(long)]
        kind: Option<CardKind>,
        /// Sentences per chunk
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Maximum characters kept from the input
        #[arg(long)]
        max_length: Option<usize>,
        /// Leave out the demonstration cards
        #[arg(long)]
        no_demo: bool,
        /// One overview card for the whole document
        #[arg(long)]
        document: bool,
        /// Directory for exported files (default: current directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Comma-separated export formats: csv, json, apkg
        #[arg(long, value_delimiter = ',')]
        export: Vec<ExportFormat>,
    },

    /// Show how the input splits into sentence chunks
    Chunks {
        /// Input file; stdin is used when piped
        file: Option<PathBuf>,
        /// Inline text (use "-" to read from stdin)
        #[arg(long)]
        text: Option<String>,
        /// Sentences per chunk
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Print the effective configuration
    Config,
}

/// Read content from stdin if piped, or resolve "-" as stdin
fn resolve_content(content: Option<String>, has_file: bool) -> Option<String> {
    match content.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
            Some(buf)
        }
        Some(_) => content,
        None => {
            // Auto-detect piped stdin
            if !has_file && !stdin_is_tty() {
                let mut buf = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
                if buf.is_empty() { None } else { Some(buf) }
            } else {
                None
            }
        }
    }
}

/// Check if stdin is a terminal (not piped)
fn stdin_is_tty() -> bool {
    unsafe { libc_isatty(0) != 0 }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.config.as_deref())?;

    match cli.command {
        Command::Generate {
            file,
            text,
            origin,
            kind,
            chunk_size,
            max_length,
            no_demo,
            document,
            out_dir,
            export,
        } => {
            let config = app.pipeline_config(&ConfigOverrides {
                kind,
                chunk_size,
                max_length,
                no_demo,
                document,
            })?;
            let text = resolve_content(text, file.is_some());
            let input = app.read_input(file.as_deref(), text, origin)?;

            // An output directory alone means every format
            let formats = if export.is_empty() && out_dir.is_some() {
                ExportFormat::ALL.to_vec()
            } else {
                export
            };
            let request = ExportRequest {
                formats,
                out_dir: out_dir.unwrap_or_else(|| PathBuf::from(".")),
            };

            commands::generate::run(config, input, &request, &cli.format, use_color)?;
        }
        Command::Chunks { file, text, chunk_size } => {
            let config = app.pipeline_config(&ConfigOverrides {
                chunk_size,
                ..Default::default()
            })?;
            let text = resolve_content(text, file.is_some());
            let input = app.read_input(file.as_deref(), text, None)?;
            commands::chunks::run(&config, input, &cli.format, use_color)?;
        }
        Command::Config => {
            commands::config::run(&app, &cli.format)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
