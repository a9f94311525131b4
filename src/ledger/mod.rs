//! Address Ledger & Persistence Sink
//!
//! The ledger is the source of truth for what is deployed where: one
//! [`ChainRecord`] per chain, keyed by chain slug, read from
//! `<deployments-dir>/<mode>_addresses.json` at startup.
//!
//! Every mutating step writes through: [`LedgerStore::update`] applies the change
//! to the in-memory document and rewrites the file before returning, so a crash
//! loses at most the step in flight. All writers go through one async mutex; two
//! steps can never interleave partial updates to the same chain record or file.

pub mod errors;
pub mod record;

pub use errors::LedgerError;
pub use record::{ChainRecord, DeploymentAddresses, IntegrationConfig, SiblingIntegrations};

use crate::chains::ChainSlug;
use crate::constants::ADDRESSES_FILE_SUFFIX;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Deployment environment, selecting which ledger file is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DeploymentMode {
    /// Development deployments
    Dev,
    /// Pre-production deployments
    Surge,
    /// Production deployments
    Prod,
}

impl DeploymentMode {
    /// Name used in the ledger file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Surge => "surge",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path of the ledger file for a mode.
pub fn ledger_path(dir: impl AsRef<Path>, mode: DeploymentMode) -> PathBuf {
    dir.as_ref()
        .join(format!("{}{}", mode.as_str(), ADDRESSES_FILE_SUFFIX))
}

/// In-memory ledger with write-through persistence.
#[derive(Debug)]
pub struct LedgerStore {
    /// Ledger file
    path: PathBuf,
    /// Authoritative in-memory document; the lock also serializes file writes
    state: Mutex<DeploymentAddresses>,
}

impl LedgerStore {
    /// Load the ledger for `mode` from `dir`.
    ///
    /// A missing file is a configuration error. Chains without `integrations`
    /// load as "nothing configured yet".
    pub fn load(dir: impl AsRef<Path>, mode: DeploymentMode) -> Result<Self, LedgerError> {
        let path = ledger_path(dir, mode);
        if !path.exists() {
            return Err(LedgerError::NotFound(path));
        }
        let data = std::fs::read_to_string(&path).map_err(|source| LedgerError::Io {
            path: path.clone(),
            source,
        })?;
        let state = serde_json::from_str(&data).map_err(|source| LedgerError::Parse {
            path: path.clone(),
            source,
        })?;
        Ok(Self::from_state(path, state))
    }

    /// Wrap an already-built document. Nothing is written until the first mutation.
    pub fn from_state(path: impl Into<PathBuf>, state: DeploymentAddresses) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(state),
        }
    }

    /// Ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the whole document.
    pub async fn snapshot(&self) -> DeploymentAddresses {
        self.state.lock().await.clone()
    }

    /// Copy of one chain record.
    pub async fn record(&self, chain: ChainSlug) -> Option<ChainRecord> {
        self.state.lock().await.get(&chain).cloned()
    }

    /// Replace one chain's record and persist the ledger.
    pub async fn store(&self, chain: ChainSlug, record: ChainRecord) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        state.insert(chain, record);
        persist(&self.path, &state).await
    }

    /// Apply `f` to one chain's record (created empty if absent) and persist the ledger
    /// before releasing the lock.
    pub async fn update<T>(
        &self,
        chain: ChainSlug,
        f: impl FnOnce(&mut ChainRecord) -> T,
    ) -> Result<T, LedgerError> {
        let mut state = self.state.lock().await;
        let out = f(state.entry(chain).or_default());
        persist(&self.path, &state).await?;
        Ok(out)
    }
}

/// Atomically replace the ledger file: write a sibling temp file, then rename.
async fn persist(path: &Path, state: &DeploymentAddresses) -> Result<(), LedgerError> {
    let json = serde_json::to_string_pretty(state)?;
    let io_err = |source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_DIR: AtomicU64 = AtomicU64::new(0);

    /// Temporary directory removed on drop (std only, no external crate).
    pub(crate) struct TempDir {
        path: PathBuf,
    }

    impl TempDir {
        pub(crate) fn new() -> Result<Self, std::io::Error> {
            let mut path = std::env::temp_dir();
            path.push(format!(
                "socket-ledger-test-{}-{}",
                std::process::id(),
                NEXT_DIR.fetch_add(1, Ordering::Relaxed)
            ));
            fs::create_dir_all(&path)?;
            Ok(Self { path })
        }

        pub(crate) fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}
