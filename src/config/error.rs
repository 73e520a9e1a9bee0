use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set
    #[error("cant find home directory")]
    NoHome,

    /// Filesystem failure
    #[error("config file {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`GlobalConfig`](super::GlobalConfig)
    #[error("malformed config file: {0}")]
    Format(#[from] serde_json::Error),

    /// A required value has not been set
    #[error("{0} is not configured")]
    Missing(&'static str),

    /// A value was rejected
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
