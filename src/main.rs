use anyhow::Context;
use clap::{Parser, Subcommand};
use dsi_progress_logger::{ProgressLog, ProgressLogger};
use gdf_betweenness::betweenness::{self, Partition};
use gdf_betweenness::consolidation::{self, PARTIAL_EXTENSION};
use gdf_betweenness::gdf;
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Distributed approximate betweenness centrality of GDF graphs", long_about = None)]
struct MainArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Computes the centrality counts of the sources owned by one worker.
    Worker {
        /// GDF file to read.
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Number of workers sharing the graph.
        #[arg(short = 't', long)]
        total: usize,

        /// Index of this worker, starting from 0.
        #[arg(short = 'o', long)]
        ordinal: usize,

        /// Partial file to write. Defaults to `<ordinal>.cen`.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Merges the partial files into the annotated graph.
    Consolidate {
        /// GDF file the workers read.
        #[arg(short = 'i', long)]
        original: PathBuf,

        /// Partial files to merge.
        #[arg(short = 'p', long, num_args = 1.., required_unless_present = "count", conflicts_with = "count")]
        partials: Vec<PathBuf>,

        /// Merge `0.cen` to `<count - 1>.cen` from the current directory.
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Annotated GDF file to write.
        #[arg(long)]
        output: PathBuf,

        /// Name of the appended node column.
        #[arg(short = 'c', long, default_value = gdf::DEFAULT_COLUMN)]
        column: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init()?;

    let args = MainArgs::parse();
    info!("Args: {:?}", args);

    match args.command {
        Command::Worker {
            input,
            total,
            ordinal,
            output,
        } => {
            let partition = Partition::new(ordinal, total)?;
            let output =
                output.unwrap_or_else(|| PathBuf::from(format!("{ordinal}.{PARTIAL_EXTENSION}")));
            run_worker(input, partition, output)?;
        }
        Command::Consolidate {
            original,
            partials,
            count,
            output,
            column,
        } => {
            let partials = match count {
                Some(count) => consolidation::default_partial_paths(count),
                None => partials,
            };
            let summary = consolidation::consolidate(&original, &partials, &output, &column)
                .with_context(|| format!("Failed consolidating into {}", output.display()))?;
            info!(
                "Wrote {} ({} vertices, {} records from {} partial files)",
                output.display(),
                summary.vertices,
                summary.records,
                summary.partials
            );
        }
    }

    info!("Done");

    Ok(())
}

fn run_worker(input: PathBuf, partition: Partition, output: PathBuf) -> anyhow::Result<()> {
    let mut graph = gdf::load_graph(&input)
        .with_context(|| format!("Failed loading graph {}", input.display()))?;

    let mut pl = ProgressLogger::default();
    pl.display_memory(true).local_speed(true);
    let sources = betweenness::compute(&mut graph, partition, &mut pl);

    gdf::save_partial(&graph, &output)
        .with_context(|| format!("Failed writing partial file {}", output.display()))?;
    info!(
        "Wrote counts of {sources} sources to {}",
        output.display()
    );
    Ok(())
}
