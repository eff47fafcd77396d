//! Genome statistics and the STAR genome-generation helpers built on them.
//!
//! STAR's `--genomeChrBinNbits` has to shrink for genomes made of many small
//! scaffolds, otherwise index generation runs out of memory. The estimate
//! used here follows the STAR manual: `min(18, log2(max(genome_length /
//! n_references, read_length)))`.

use needletail::errors::ParseErrorKind;
use needletail::parse_fastx_file;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};

/// Upper bound STAR accepts for `--genomeChrBinNbits`.
pub const MAX_CHR_BIN_NBITS: u32 = 18;

/// Files STAR writes into the genome directory when indexing.
pub const STAR_GENOME_FILES: [&str; 15] = [
    "chrLength.txt",
    "exonInfo.tab",
    "SAindex",
    "chrNameLength.txt",
    "geneInfo.tab",
    "sjdbInfo.txt",
    "chrName.txt",
    "Genome",
    "sjdbList.fromGTF.out.tab",
    "chrStart.txt",
    "genomeParameters.txt",
    "sjdbList.out.tab",
    "exonGeTrInfo.tab",
    "SA",
    "transcriptInfo.tab",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeStats {
    /// Total sequence length, headers and line breaks excluded.
    pub sequence_length: u64,
    /// Number of reference sequences (FASTA records).
    pub reference_count: u64,
}

/// Something that can measure a genome FASTA.
pub trait GenomeStatsSource {
    fn genome_stats(&self, fasta: &Path) -> Result<GenomeStats>;
}

/// Measures the FASTA with `grep`, `wc` and `awk` run through `sh`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellGenomeStats;

/// Reads the FASTA in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeGenomeStats;

/// Quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Run `command` through `sh -c` and return its trimmed stdout.
fn run_shell(command: &str) -> Result<String> {
    let output = Command::new("sh").arg("-c").arg(command).output()?;
    if !output.status.success() {
        return Err(Error::ExternalTool {
            command: command.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn run_count(command: &str) -> Result<u64> {
    let out = run_shell(command)?;
    out.parse().map_err(|_| Error::ToolOutput {
        command: command.to_string(),
        output: out,
    })
}

impl GenomeStatsSource for ShellGenomeStats {
    fn genome_stats(&self, fasta: &Path) -> Result<GenomeStats> {
        // the pipelines below report zero for a missing file instead of failing
        std::fs::metadata(fasta)?;

        let file = shell_quote(&fasta.to_string_lossy());
        let length_cmd = format!("grep -v '>' {} | wc | awk '{{print $3-$1}}'", file);
        let count_cmd = format!("grep '^>' {} | wc -l", file);

        Ok(GenomeStats {
            sequence_length: run_count(&length_cmd)?,
            reference_count: run_count(&count_cmd)?,
        })
    }
}

impl GenomeStatsSource for NativeGenomeStats {
    fn genome_stats(&self, fasta: &Path) -> Result<GenomeStats> {
        let mut stats = GenomeStats {
            sequence_length: 0,
            reference_count: 0,
        };

        let mut reader = match parse_fastx_file(fasta) {
            Ok(r) => r,
            Err(e) if e.kind == ParseErrorKind::EmptyFile => return Ok(stats),
            Err(e) => return Err(e.into()),
        };

        while let Some(record) = reader.next() {
            let r = record?;
            stats.sequence_length += r.seq().len() as u64;
            stats.reference_count += 1;
        }
        Ok(stats)
    }
}

/// Estimate `--genomeChrBinNbits` for `stats` and reads of `read_length`.
///
/// Each log2 is truncated towards zero before the comparison.
pub fn estimate_chr_bin_nbits(stats: &GenomeStats, read_length: u64) -> Result<u32> {
    if stats.reference_count == 0 {
        return Err(Error::InvalidGenomeStats(
            "genome has no reference sequences".to_string(),
        ));
    }
    if stats.sequence_length == 0 {
        return Err(Error::InvalidGenomeStats(format!(
            "{} reference sequences but no bases",
            stats.reference_count
        )));
    }
    if read_length == 0 {
        return Err(Error::InvalidGenomeStats(
            "read length must be positive".to_string(),
        ));
    }

    let per_reference = stats.sequence_length as f64 / stats.reference_count as f64;
    let by_genome = per_reference.log2().trunc() as i64;
    let by_reads = (read_length as f64).log2().trunc() as i64;

    // by_reads >= 0, so the clamp never goes below zero
    Ok(by_genome.max(by_reads).clamp(0, MAX_CHR_BIN_NBITS as i64) as u32)
}

/// Measure `fasta` with `source` and estimate `--genomeChrBinNbits`.
pub fn estimate_for_fasta(
    source: &dyn GenomeStatsSource,
    fasta: &Path,
    read_length: u64,
) -> Result<u32> {
    let stats = source.genome_stats(fasta)?;
    log::info!(
        "Genome {}: {} bases in {} sequences",
        fasta.display(),
        stats.sequence_length,
        stats.reference_count
    );
    estimate_chr_bin_nbits(&stats, read_length)
}

/// STAR genome-generation arguments from the run configuration, with
/// `--genomeChrBinNbits` appended when estimation is enabled.
pub fn star_genome_params(
    config: &PipelineConfig,
    source: &dyn GenomeStatsSource,
) -> Result<String> {
    let mut params = config.params.star_genome.clone();
    if config.flags.star_est_chr_bin_nbits {
        let nbits = estimate_for_fasta(
            source,
            &config.files.genome_fasta,
            config.dataset.read_length,
        )?;
        params.push_str(&format!(" --genomeChrBinNbits {}", nbits));
    }
    Ok(params)
}

/// Every file STAR is expected to write into `star_dir`.
pub fn star_genome_files(star_dir: &Path) -> Vec<PathBuf> {
    STAR_GENOME_FILES.iter().map(|f| star_dir.join(f)).collect()
}
