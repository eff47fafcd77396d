use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Run configuration shared by the pipeline steps.
///
/// Only the keys the STAR helpers need are typed; everything else in the
/// document is kept in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub params: Params,
    pub flags: Flags,
    pub files: Files,
    pub dataset: Dataset,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Extra arguments passed to `STAR --runMode genomeGenerate`.
    #[serde(default)]
    pub star_genome: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flags {
    #[serde(rename = "star_est_ChrBinsNbits", default)]
    pub star_est_chr_bin_nbits: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Files {
    pub genome_fasta: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    pub read_length: u64,
}

impl PipelineConfig {
    pub fn from_yaml(text: &str) -> crate::error::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Failed to parse config {}", path.display()))
    }
}
