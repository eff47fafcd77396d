use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};

use crate::error::{compile, Result};

/// Sample IDs linked to the file or directory each was extracted from.
///
/// Built once by [`extract_sample_ids`] and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleIndex {
    samples: BTreeMap<String, PathBuf>,
}

impl SampleIndex {
    pub fn get(&self, sample_id: &str) -> Option<&Path> {
        self.samples.get(sample_id).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Entries ordered by sample ID.
    pub fn iter(&self) -> btree_map::Iter<'_, String, PathBuf> {
        self.samples.iter()
    }
}

impl<'a> IntoIterator for &'a SampleIndex {
    type Item = (&'a String, &'a PathBuf);
    type IntoIter = btree_map::Iter<'a, String, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Link sample IDs to entries of `data_dir`.
///
/// Patterns use the `regex` crate syntax, which has no lookaround or
/// backreferences; such patterns are rejected as invalid.
///
/// `sample_pattern` describes the text that *follows* the ID: the ID is the
/// entry name up to the start of the first match. An entry is kept only when
/// both `sample_pattern` and `replicate_pattern` are found somewhere in its
/// name; an empty `replicate_pattern` keeps everything. When two entries give
/// the same ID the later one replaces the earlier.
pub fn extract_sample_ids<S: AsRef<str>>(
    data_dir: &Path,
    entries: &[S],
    sample_pattern: &str,
    replicate_pattern: &str,
) -> Result<SampleIndex> {
    let sample_re = compile(sample_pattern)?;
    let replicate_re = compile(replicate_pattern)?;

    let mut samples = BTreeMap::new();
    for entry in entries {
        let entry = entry.as_ref();
        let Some(sample_match) = sample_re.find(entry) else {
            log::debug!("No sample match in {}, skipping", entry);
            continue;
        };
        if !replicate_re.is_match(entry) {
            log::debug!("No replicate match in {}, skipping", entry);
            continue;
        }

        let sample_id = &entry[..sample_match.start()];
        if let Some(previous) = samples.insert(sample_id.to_string(), data_dir.join(entry)) {
            log::debug!(
                "Sample {:?} from {} replaces {}",
                sample_id,
                entry,
                previous.display()
            );
        }
    }

    Ok(SampleIndex { samples })
}

/// List `data_dir` and build its [`SampleIndex`].
///
/// Entries are enumerated in name order, so on a collision the
/// lexicographically last entry is kept.
pub fn index_directory(
    data_dir: &Path,
    sample_pattern: &str,
    replicate_pattern: &str,
) -> anyhow::Result<SampleIndex> {
    let entries = crate::io::list_entries(data_dir)?;
    Ok(extract_sample_ids(
        data_dir,
        &entries,
        sample_pattern,
        replicate_pattern,
    )?)
}
