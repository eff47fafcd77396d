use regex::Regex;

use crate::error::{compile, Result};

/// Extension every renamed read file receives, whatever the input used.
pub const OUTPUT_EXTENSION: &str = "fastq";

/// How read 1 and read 2 are denoted in raw file names, e.g. `_1` / `_2`.
///
/// Order matters: `read1` is always checked first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTags {
    pub read1: String,
    pub read2: String,
}

/// Textual relationship between two tags that makes some file names match
/// both of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOverlap {
    /// Both tags are the same string; every match is classified as read 1.
    Identical,
    /// `read1` is a suffix of `read2`, so read 2 files are classified as read 1.
    Read1SuffixOfRead2,
    /// `read2` is a suffix of `read1`; read 1 files also match read 2 but read 1 wins.
    Read2SuffixOfRead1,
}

impl ReadTags {
    pub fn new(read1: impl Into<String>, read2: impl Into<String>) -> Self {
        Self {
            read1: read1.into(),
            read2: read2.into(),
        }
    }

    /// Detect tags that can both match the same file name.
    ///
    /// Both matchers are anchored at `<tag>.<ext>$`, so a name can match both
    /// only when one tag ends with the other.
    pub fn overlap(&self) -> Option<TagOverlap> {
        if self.read1 == self.read2 {
            Some(TagOverlap::Identical)
        } else if self.read2.ends_with(&self.read1) {
            Some(TagOverlap::Read1SuffixOfRead2)
        } else if self.read1.ends_with(&self.read2) {
            Some(TagOverlap::Read2SuffixOfRead1)
        } else {
            None
        }
    }
}

/// Which physical file of a read pair a file name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadDirection {
    Read1,
    Read2,
    Unmatched,
}

impl ReadDirection {
    /// Canonical file name `{prefix}_R1.fastq` / `{prefix}_R2.fastq`, or
    /// `None` for unmatched files.
    pub fn output_name(&self, prefix: &str) -> Option<String> {
        let read = match self {
            ReadDirection::Read1 => 1,
            ReadDirection::Read2 => 2,
            ReadDirection::Unmatched => return None,
        };
        Some(format!("{}_R{}.{}", prefix, read, OUTPUT_EXTENSION))
    }
}

/// A file name together with the direction it was classified as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFilename {
    pub filename: String,
    pub direction: ReadDirection,
}

/// The compiled read 1 / read 2 matchers, built once per run.
#[derive(Debug, Clone)]
pub struct ReadMatchers {
    read1: Regex,
    read2: Regex,
}

impl ReadMatchers {
    /// Patterns the matchers were compiled from, read 1 first.
    pub fn patterns(&self) -> (&str, &str) {
        (self.read1.as_str(), self.read2.as_str())
    }

    /// Read 1 is tested first, so it wins when both match.
    pub fn direction(&self, filename: &str) -> ReadDirection {
        if self.read1.is_match(filename) {
            ReadDirection::Read1
        } else if self.read2.is_match(filename) {
            ReadDirection::Read2
        } else {
            ReadDirection::Unmatched
        }
    }
}

/// Build the end-anchored `<tag>\.<extension>$` matchers for both tags.
///
/// Tags and extension are matched literally. Overlapping tags are accepted
/// but reported with a warning, since read 1 silently takes priority.
pub fn build_read_matchers(tags: &ReadTags, extension: &str) -> Result<ReadMatchers> {
    let pattern = |tag: &str| format!(r"{}\.{}$", regex::escape(tag), regex::escape(extension));

    let matchers = ReadMatchers {
        read1: compile(&pattern(&tags.read1))?,
        read2: compile(&pattern(&tags.read2))?,
    };

    match tags.overlap() {
        Some(TagOverlap::Identical) => log::warn!(
            "Read tags are identical ({:?}); every matching file will be treated as read 1",
            tags.read1
        ),
        Some(TagOverlap::Read1SuffixOfRead2) => log::warn!(
            "Read 1 tag {:?} is a suffix of read 2 tag {:?}; \
             read 2 files will be treated as read 1",
            tags.read1,
            tags.read2
        ),
        Some(TagOverlap::Read2SuffixOfRead1) => log::warn!(
            "Read 2 tag {:?} is a suffix of read 1 tag {:?}; \
             files matching both are treated as read 1",
            tags.read2,
            tags.read1
        ),
        None => {}
    }

    Ok(matchers)
}

pub fn classify(filename: &str, matchers: &ReadMatchers) -> ClassifiedFilename {
    ClassifiedFilename {
        filename: filename.to_string(),
        direction: matchers.direction(filename),
    }
}

/// New name for `filename` under `prefix`, or `None` if it denotes neither read.
pub fn rename_file(filename: &str, prefix: &str, matchers: &ReadMatchers) -> Option<String> {
    matchers.direction(filename).output_name(prefix)
}
