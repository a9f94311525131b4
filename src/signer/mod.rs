//! Operator signing capability
//!
//! The operator key authorizes both the configuration transactions and the
//! signed parameter updates. It is supplied at process start (hex or encrypted
//! keystore), kept in memory only, and never logged: only its address is shown.

pub mod errors;
pub mod manager;

pub use errors::SignerError;
pub use manager::SignerManager;
