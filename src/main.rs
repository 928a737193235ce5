//! Applies a flow of insert and delete batches, read from newline-delimited
//! files, to one table, and writes the per-key results to a text file.
//!
//! ```text
//! lockprobe --data_size 100K --threads 8 --tsize 1M \
//!     --flow insert delete --input keys.txt stale.txt
//! ```

use anyhow::Context;
use clap::Parser;
use lockprobe::{format_size, parse_size, run, Action, RunConfig};
use std::{path::PathBuf, process::ExitCode};

const MAX_OPERATIONS: usize = 16;

#[derive(Parser, Debug)]
#[command(name = "lockprobe", version)]
#[command(about = "Insert or delete batches of keys in a fixed-size hash table, in parallel")]
struct Args {
    /// Nominal number of records per input file (accepts K and M suffixes)
    #[arg(long = "data_size", value_parser = parse_size)]
    data_size: usize,

    /// Number of worker threads per batch
    #[arg(long)]
    threads: usize,

    /// Number of slots of the table (accepts K and M suffixes)
    #[arg(long, value_parser = parse_size)]
    tsize: usize,

    /// Actions to apply, in order (`insert` or `delete`)
    #[arg(long, required = true, num_args = 1..=MAX_OPERATIONS)]
    flow: Vec<Action>,

    /// Input files, one per action
    #[arg(long, required = true, num_args = 1..=MAX_OPERATIONS)]
    input: Vec<PathBuf>,

    /// Directory of the result file
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match try_main(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(args: Args) -> anyhow::Result<()> {
    let config = RunConfig::builder(args.tsize)
        .threads(args.threads)
        .data_size(args.data_size)
        .flow(args.flow, args.input)
        .output_dir(args.output_dir)
        .build()
        .context("invalid command line")?;

    log::info!(
        "Table of {} slots, {} threads, {} steps",
        format_size(config.table_size()),
        config.threads(),
        config.flow().len()
    );

    let reports = run(&config).context("run failed")?;

    for report in &reports {
        println!(
            "{}: {} records in {} ms, {} collisions",
            report.action(),
            report.len(),
            report.elapsed_millis(),
            report.collisions()
        );
    }

    Ok(())
}
