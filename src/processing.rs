use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::io::{ensure_dir, list_candidate_files, list_subdirectories, transfer, TransferMode};
use crate::matcher::{build_read_matchers, classify, ReadMatchers, ReadTags};

/// Settings for one rename run, built once from the command line.
#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// Directory holding one subdirectory per sample.
    pub input_dir: PathBuf,
    /// Where renamed files end up.
    pub output_dir: PathBuf,
    pub tags: ReadTags,
    /// Suffix raw read files end with, e.g. `fq` or `fastq`.
    pub extension: String,
    /// Files containing this substring are left alone.
    pub exclude: String,
    /// Only subdirectories whose name contains one of these are scanned; all
    /// of them when empty.
    pub dir_filters: Vec<String>,
    pub mode: TransferMode,
    pub dry_run: bool,
}

/// One file to relocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRename {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameSummary {
    pub directories: usize,
    pub planned: usize,
    pub transferred: usize,
}

/// Classify the candidate files of `root` and name the matched ones.
///
/// `candidates` must already be filtered to regular files with the right
/// extension (see [`list_candidate_files`]). Files denoting neither read are
/// skipped. Returns `(root/candidate, new_name)` in candidate order.
pub fn scan_and_classify<S: AsRef<str>>(
    root: &Path,
    candidates: &[S],
    prefix: &str,
    matchers: &ReadMatchers,
) -> Vec<(PathBuf, String)> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let classified = classify(candidate.as_ref(), matchers);
            match classified.direction.output_name(prefix) {
                Some(new_name) => Some((root.join(&classified.filename), new_name)),
                None => {
                    log::debug!("{} denotes neither read, skipping", classified.filename);
                    None
                }
            }
        })
        .collect()
}

fn dir_selected(dir: &Path, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    dir.file_name()
        .and_then(|s| s.to_str())
        .map_or(false, |name| filters.iter().any(|f| name.contains(f.as_str())))
}

/// Work out every move without touching the filesystem. Returns the plan and
/// the number of subdirectories scanned.
///
/// Each selected subdirectory's name becomes the prefix of the files it holds.
pub fn plan_renames(opts: &RenameOptions) -> Result<(Vec<PlannedRename>, usize)> {
    let matchers = build_read_matchers(&opts.tags, &opts.extension)?;
    let (read1, read2) = matchers.patterns();
    log::debug!("Read 1 pattern {:?}, read 2 pattern {:?}", read1, read2);

    let mut plan = Vec::new();
    let mut scanned = 0;
    for dir in list_subdirectories(&opts.input_dir)? {
        if !dir_selected(&dir, &opts.dir_filters) {
            log::debug!("Directory {} not selected, skipping", dir.display());
            continue;
        }
        let Some(prefix) = dir.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        scanned += 1;

        let candidates = list_candidate_files(&dir, &opts.extension, &opts.exclude)?;
        for (source, new_name) in scan_and_classify(&dir, &candidates, prefix, &matchers) {
            plan.push(PlannedRename {
                source,
                destination: opts.output_dir.join(new_name),
            });
        }
    }

    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for p in &plan {
        if let Some(earlier) = seen.insert(p.destination.as_path(), p.source.as_path()) {
            log::warn!(
                "{} and {} both map to {}; the latter will overwrite the former",
                earlier.display(),
                p.source.display(),
                p.destination.display()
            );
        }
    }

    Ok((plan, scanned))
}

/// Carry out `plan`, creating `output_dir` first. Returns the number of files
/// transferred; files already at their destination are left alone.
pub fn execute_plan(
    plan: &[PlannedRename],
    output_dir: &Path,
    mode: TransferMode,
) -> Result<usize> {
    ensure_dir(output_dir)?;

    let pb = ProgressBar::new(plan.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(" {msg:<12} {wide_bar} {pos}/{len} ")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message(match mode {
        TransferMode::Move => "Moving",
        TransferMode::Copy => "Copying",
    });

    let mut transferred = 0;
    for p in plan {
        log::info!(
            "Re-naming: {} -> {}",
            p.source.display(),
            p.destination.display()
        );
        if transfer(&p.source, &p.destination, mode)? {
            transferred += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(transferred)
}

/// Rename and relocate every paired read file under `opts.input_dir`.
pub fn rename_and_move(opts: &RenameOptions) -> Result<(Vec<PlannedRename>, RenameSummary)> {
    let (plan, directories) = plan_renames(opts)?;
    let transferred = if opts.dry_run {
        0
    } else {
        execute_plan(&plan, &opts.output_dir, opts.mode)?
    };

    let summary = RenameSummary {
        directories,
        planned: plan.len(),
        transferred,
    };
    Ok((plan, summary))
}
