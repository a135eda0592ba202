use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use ssp_collator::combine::{combine_files, CombinedModel};
use ssp_collator::components::{AcceptAll, ComponentVocabulary};
use ssp_collator::recognize::{collate, KeywordRecognizer, RecognitionResult, SourceMetadata};
use ssp_collator::report::{write_component_reports, write_selection_reports};
use ssp_collator::sample::sample_lines;
use ssp_collator::selector::{select, summarize, SelectorSpec};
use ssp_collator::statement::{reader_for, write_statements, ReaderFormat, ReaderOptions};
use ssp_collator::tagged::TaggedSources;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ssp-collator")]
#[command(about = "Normalize and aggregate compliance control statements")]
struct Args {
    /// Input statement format
    #[arg(long, value_enum, default_value_t = Format::Psv, global = true)]
    reader: Format,

    /// Column holding the control id
    #[arg(long, default_value_t = 0, global = true)]
    control_id_col: usize,

    /// Column holding the statement text
    #[arg(long, default_value_t = 1, global = true)]
    statement_col: usize,

    /// Leading lines to skip
    #[arg(long, default_value_t = 0, global = true)]
    skip_lines: usize,

    /// Input character encoding
    #[arg(long, default_value = "utf-8", global = true)]
    encoding: String,

    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Psv,
    #[value(name = "json-l")]
    Jsonl,
}

impl From<Format> for ReaderFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => ReaderFormat::Csv,
            Format::Psv => ReaderFormat::Psv,
            Format::Jsonl => ReaderFormat::Jsonl,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Convert structured statement data from one format to another
    Convert {
        #[arg(long, value_enum, default_value_t = Format::Psv)]
        format: Format,
        filename: PathBuf,
    },

    /// Recognize component entities and collate statements per component
    Recognize {
        /// JSON file with known components and aliases
        #[arg(long)]
        components: PathBuf,
        /// Control catalog the source document implements
        #[arg(long)]
        catalog: String,
        /// Optional remarks to include in the output metadata
        #[arg(long)]
        remarks: Option<String>,
        filename: PathBuf,
    },

    /// Combine recognition artifacts from multiple documents
    Combine { files: Vec<PathBuf> },

    /// Re-collate a combined model using a selector specification
    Select {
        spec: PathBuf,
        components: PathBuf,
        /// Output only statements from this catalog
        #[arg(long)]
        catalog: Option<String>,
        /// Output only statements with controls from this selector
        #[arg(long)]
        selector: Option<String>,
        /// Summarize matched and missing controls
        #[arg(long)]
        summary: bool,
        /// Write markdown reports in this directory
        #[arg(long)]
        markdown: Option<PathBuf>,
    },

    /// Write per-component markdown reports from a combined model
    Report {
        input: PathBuf,
        output_dir: PathBuf,
    },

    /// List which tagged documents cover each control
    Controls {
        /// Tagged line-record document, as TAG=PATH
        #[arg(long = "ssp", value_parser = parse_tagged, required = true)]
        ssp: Vec<(String, PathBuf)>,
    },

    /// Randomly sample lines from a raw export
    Sample {
        /// Number of lines to sample
        #[arg(long, default_value_t = 10)]
        number: usize,
        input: PathBuf,
    },
}

fn parse_tagged(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((tag, path)) if !tag.is_empty() && !path.is_empty() => {
            Ok((tag.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected TAG=PATH, got '{}'", raw)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = ReaderOptions {
        control_id_col: args.control_id_col,
        statement_col: args.statement_col,
        skip_lines: args.skip_lines,
        encoding: args.encoding.clone(),
    };

    match args.command {
        Command::Convert { format, filename } => {
            let statements = reader_for(args.reader.into(), options).read(&filename)?;
            write_statements(format.into(), &mut std::io::stdout(), &statements)?;
        }

        Command::Recognize {
            components,
            catalog,
            remarks,
            filename,
        } => {
            let vocabulary = ComponentVocabulary::load(&components)?;
            let recognizer = KeywordRecognizer::new(&vocabulary);
            let statements = reader_for(args.reader.into(), options).read(&filename)?;
            info!("read {} statements from {}", statements.len(), filename.display());

            // the keyword recognizer emits canonical names by construction
            let by_component = collate(&statements, &recognizer, &AcceptAll);

            let metadata = SourceMetadata::now(
                &filename.display().to_string(),
                &catalog,
                remarks.as_deref().unwrap_or(""),
                &command_line(),
            );
            let result = RecognitionResult::new(metadata, by_component);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Combine { files } => {
            let combined = combine_files(&files)?;
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }

        Command::Select {
            spec,
            components,
            catalog,
            selector,
            summary,
            markdown,
        } => {
            let spec = SelectorSpec::load(&spec)?;
            let combined = CombinedModel::load(&components)?;
            let selection = select(&spec, &combined, catalog.as_deref(), selector.as_deref());
            if summary {
                println!("{}", summarize(&selection, &spec));
            } else if let Some(dir) = markdown {
                write_selection_reports(&selection, &dir)?;
            } else {
                println!("{}", serde_json::to_string_pretty(&selection)?);
            }
        }

        Command::Report { input, output_dir } => {
            let combined = CombinedModel::load(&input)?;
            write_component_reports(&combined, &output_dir)?;
        }

        Command::Controls { ssp } => {
            let mut sources = TaggedSources::new();
            for (tag, path) in &ssp {
                sources.add(tag, path)?;
            }
            for (control, entries) in sources.control_index(&options)? {
                println!("{}", control);
                for (tag, text) in entries {
                    println!("  {}: {}", tag, snippet(&text, 72));
                }
            }
        }

        Command::Sample { number, input } => {
            let content = fs::read_to_string(&input)?;
            for line in sample_lines(&content, number, &mut rand::thread_rng()) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

fn command_line() -> String {
    std::env::args().collect::<Vec<_>>().join(" ")
}

fn snippet(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let shortened: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", shortened.trim_end())
}
