//! # Socket Mesh Configurator
//!
//! Brings a fleet of deployed cross-chain sockets to their fully wired state:
//! registers switchboards on every socket for every sibling chain, grants
//! attesters, links native bridge switchboards to their remote counterparts and
//! pushes signed gas-limit and execution-overhead parameters to the registries.
//!
//! Every step checks on-chain state first, so re-running against a partially
//! configured mesh only sends the transactions that are still missing. Progress is
//! written through to the per-environment address ledger as it is made.

pub mod chains;
pub mod cli;
pub mod constants;
pub mod contracts;
pub mod keystore;
pub mod ledger;
pub mod limits;
pub mod orchestrator;
pub mod output;
pub mod params;
pub mod registration;
pub mod remote_link;
pub mod report;
pub mod signer;
pub mod switchboard;
