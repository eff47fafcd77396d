use thiserror::Error;

/// Errors raised by the library-level operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied regular expression (or one built from tags) failed
    /// to compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An external command exited with a non-zero status. `stderr` is kept
    /// verbatim.
    #[error("command `{command}` failed ({status}): {stderr}")]
    ExternalTool {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("could not parse output of `{command}`: {output:?}")]
    ToolOutput { command: String, output: String },

    #[error("invalid genome statistics: {0}")]
    InvalidGenomeStats(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("failed to read FASTA: {0}")]
    Fastx(#[from] needletail::errors::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compile `pattern`, mapping failures to [`Error::InvalidPattern`].
pub(crate) fn compile(pattern: &str) -> Result<regex::Regex> {
    regex::Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
