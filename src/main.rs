#![warn(clippy::complexity)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::suspicious)]
use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Parser, ValueEnum};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use ocit2sumo::constants::{DEFAULT_OUTPUT_FILE, DEFAULT_TLS_ID};
use ocit2sumo::import::IndexTable;
use ocit2sumo::{convert, logging, ConvertOptions, OutputFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Sumo,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Sumo => OutputFormat::Sumo,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Convert OCIT-C signal programs into SUMO traffic light logic
#[derive(Debug, Parser)]
#[command(name = "ocit2sumo", version)]
struct Args {
    /// OCIT-C XML document
    ocit_file: PathBuf,
    /// Where to write the result
    #[arg(short, long = "output-file", default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
    /// Traffic light id in the SUMO network
    #[arg(long, default_value = DEFAULT_TLS_ID)]
    tls_id: String,
    /// CSV (`group,indices`) overriding the connection indices of the Bemerkung fields
    #[arg(long)]
    index_table: Option<PathBuf>,
    /// Connection indices that get minor green (`g`)
    #[arg(long, value_delimiter = ',')]
    minor_index: Vec<usize>,
    /// Parent nodes (AbschaltTeilknoten) to skip
    #[arg(long, value_delimiter = ',')]
    ignore_nodes: Vec<String>,
    /// Cut points closer than this many milliseconds are merged
    #[arg(long, default_value_t = 100)]
    cut_tolerance_ms: u32,
    #[arg(long, value_enum, default_value = "sumo")]
    format: Format,
    /// Log every intersection
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            tls_id: self.tls_id.clone(),
            cut_tolerance: Duration::milliseconds(i64::from(self.cut_tolerance_ms)),
            minor_indices: self.minor_index.iter().copied().collect::<BTreeSet<_>>(),
            ignored_nodes: self.ignore_nodes.clone(),
            format: self.format.into(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let document = fs::read_to_string(&args.ocit_file)
        .with_context(|| format!("Failed to read {}", args.ocit_file.display()))?;

    let table = args
        .index_table
        .as_ref()
        .map(|path| {
            let file = fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            IndexTable::from_reader(file)
                .with_context(|| format!("Failed to read index table {}", path.display()))
        })
        .transpose()?;

    let output = convert(&document, &args.options(), table.as_ref())
        .with_context(|| format!("Failed to convert {}", args.ocit_file.display()))?;

    fs::write(&args.output, output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Wrote {}", args.output.display());
    Ok(())
}
