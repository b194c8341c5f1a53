//! SQLite mirror of the HAPI registry.
//!
//! This crate provides:
//! - Storage of networks, reporters, cases, addresses, assets and reward
//!   counters with paging and per-network counts
//! - Risk lookups for addresses and assets, including the status of the
//!   backing case
//! - A sync pass mirroring a registry account store into the database
//! - TOML configuration with `${VAR}` expansion
//!
//! ```text
//! ┌──────────────────┐   sync    ┌───────────────┐   queries   ┌──────────┐
//! │  hapi-registry   │ ────────► │    Storage    │ ──────────► │ consumer │
//! │  (AccountStore)  │  records  │   (SQLite)    │  risk/page  │          │
//! └──────────────────┘           └───────────────┘             └──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod storage;
pub mod sync;

pub use config::Config;
pub use storage::{DatabaseStats, RiskReport, Storage};
pub use sync::{Indexer, SyncReport};
