use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting the address ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger file for the selected mode does not exist
    #[error("Address ledger not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading or writing the ledger file failed
    #[error("Ledger I/O failed for {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The ledger file is not valid ledger JSON
    #[error("Malformed address ledger {}: {source}", path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory ledger could not be serialized
    #[error("Failed to serialize address ledger: {0}")]
    Serialize(#[from] serde_json::Error),
}
