use anyhow::Result;
use clap::{Parser, Subcommand};
use log::Level;
use std::path::PathBuf;

use rnaseq_utils::config::PipelineConfig;
use rnaseq_utils::genome::{
    estimate_for_fasta, star_genome_files, star_genome_params, GenomeStatsSource,
    NativeGenomeStats, ShellGenomeStats,
};
use rnaseq_utils::io::{TransferMode, DEFAULT_EXCLUDE};
use rnaseq_utils::matcher::ReadTags;
use rnaseq_utils::processing::{rename_and_move, RenameOptions};
use rnaseq_utils::samples::index_directory;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Helpers for RNA-seq runs: read file renaming, sample IDs and STAR indexing parameters"
)]
struct Args {
    /// Debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move and rename paired-end FASTQ files to `<dir>_R1.fastq` / `<dir>_R2.fastq`
    Rename {
        /// Top level directory containing sample directories
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Current file name denoter for read 1
        #[arg(short = '1', long)]
        read1: String,

        /// Current file name denoter for read 2
        #[arg(short = '2', long)]
        read2: String,

        /// Extension of the raw FASTQ files, usually "fq" or "fastq"
        #[arg(short, long)]
        extension: String,

        /// Output directory for renamed files
        #[arg(short = 'd', long)]
        out_dir: PathBuf,

        /// Skip files whose name contains this
        #[arg(long, default_value = DEFAULT_EXCLUDE)]
        exclude: String,

        /// Only scan sample directories whose own name (not the full path)
        /// contains this (repeatable)
        #[arg(long = "dir-filter")]
        dir_filters: Vec<String>,

        /// Copy files instead of moving them
        #[arg(long, default_value_t = false)]
        copy: bool,

        /// Print the planned renames without touching any file
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Link sample IDs to the files or directories in a data directory
    Samples {
        /// Directory holding one file or directory per sample
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Regex matching the text right after the sample ID (Rust `regex`
        /// syntax: no lookaround or backreferences)
        #[arg(short, long)]
        sample_regex: String,

        /// Regex an entry must also match, e.g. a replicate marker (same syntax)
        #[arg(short, long, default_value = "")]
        replicate_regex: String,
    },

    /// Print STAR genome-generation parameters for a run configuration
    StarParams {
        /// YAML run configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Measure the genome in-process instead of with grep/wc/awk
        #[arg(long, default_value_t = false)]
        native: bool,
    },

    /// Estimate STAR's --genomeChrBinNbits for a genome FASTA
    StarNbits {
        /// Genome FASTA
        #[arg(short, long)]
        genome: PathBuf,

        /// Read length of the experiment
        #[arg(short = 'l', long)]
        read_length: u64,

        /// Measure the genome in-process instead of with grep/wc/awk
        #[arg(long, default_value_t = false)]
        native: bool,
    },

    /// List the files STAR writes when indexing a genome
    StarFiles {
        /// STAR genome directory
        #[arg(short = 'd', long)]
        star_dir: PathBuf,
    },
}

fn stats_source(native: bool) -> &'static dyn GenomeStatsSource {
    if native {
        &NativeGenomeStats
    } else {
        &ShellGenomeStats
    }
}

/// CLI entry point: set up logging, then run the requested subcommand.
/// Results go to stdout as tab-separated lines, logs to stderr.
fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::Debug
    } else if args.quiet {
        Level::Warn
    } else {
        Level::Info
    };
    simple_logger::init_with_level(level)?;

    match args.command {
        Commands::Rename {
            input_dir,
            read1,
            read2,
            extension,
            out_dir,
            exclude,
            dir_filters,
            copy,
            dry_run,
        } => {
            let opts = RenameOptions {
                input_dir,
                output_dir: out_dir,
                tags: ReadTags::new(read1, read2),
                extension,
                exclude,
                dir_filters,
                mode: if copy {
                    TransferMode::Copy
                } else {
                    TransferMode::Move
                },
                dry_run,
            };

            let (plan, summary) = rename_and_move(&opts)?;
            for p in &plan {
                println!("{}\t{}", p.source.display(), p.destination.display());
            }
            log::info!(
                "Scanned {} directories, planned {} files, transferred {}",
                summary.directories,
                summary.planned,
                summary.transferred
            );
        }

        Commands::Samples {
            input_dir,
            sample_regex,
            replicate_regex,
        } => {
            let index = index_directory(&input_dir, &sample_regex, &replicate_regex)?;
            if index.is_empty() {
                log::warn!("No entries of {} matched", input_dir.display());
            }
            for (sample, path) in &index {
                println!("{}\t{}", sample, path.display());
            }
        }

        Commands::StarParams { config, native } => {
            let config = PipelineConfig::from_path(&config)?;
            println!("{}", star_genome_params(&config, stats_source(native))?);
        }

        Commands::StarNbits {
            genome,
            read_length,
            native,
        } => {
            let nbits = estimate_for_fasta(stats_source(native), &genome, read_length)?;
            println!("{}", nbits);
        }

        Commands::StarFiles { star_dir } => {
            for f in star_genome_files(&star_dir) {
                println!("{}", f.display());
            }
        }
    }

    Ok(())
}
