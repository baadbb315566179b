use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfwise::{ConfigLoader, Processor};

#[derive(Parser)]
#[command(name = "shelfwise")]
#[command(
    version,
    about = "Enrich product barcodes into structured product records"
)]
struct Cli {
    /// Barcodes to process; reads a JSON array from stdin when omitted
    barcodes: Vec<String>,

    /// Print processing statistics to stderr after the batch
    #[arg(long)]
    stats: bool,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let barcodes = gather_barcodes(&cli.barcodes)?;
    let config = ConfigLoader::load()?;

    let rt = Runtime::new()?;
    let results = rt.block_on(async {
        let mut processor = Processor::from_config(&config)?;

        let results = tokio::select! {
            results = processor.process_batch(&barcodes) => results,
            _ = tokio::signal::ctrl_c() => {
                anyhow::bail!("processing interrupted");
            }
        };

        if cli.stats {
            let stats = serde_json::to_string_pretty(&processor.stats())?;
            eprintln!("{stats}");
        }

        Ok::<_, anyhow::Error>(results)
    })?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Barcodes come from the command line, or as a JSON array on stdin when no
/// arguments were given. A scalar JSON value is treated as a single barcode.
fn gather_barcodes(args: &[String]) -> anyhow::Result<Vec<String>> {
    if !args.is_empty() {
        return Ok(args.to_vec());
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let input = input.trim();
    if input.is_empty() {
        anyhow::bail!("no barcodes supplied: pass them as arguments or a JSON array on stdin");
    }

    let value: Value = serde_json::from_str(input).context("invalid JSON input on stdin")?;
    Ok(barcode_values(value))
}

fn barcode_values(value: Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect()
}
