//! HAPI registry state machine.
//!
//! This crate provides:
//! - Network registry (stake and reward configuration, authority hand-over)
//! - Reporter lifecycle (activation, deactivation, unstaking, freezing)
//! - Case ledger
//! - Address and asset ledgers with the confirmation protocol
//! - Reward accounting
//! - Paged reads and counts
//!
//! State lives in an [`AccountStore`] addressed by derived entity addresses,
//! tokens in a [`TokenLedger`]. In-memory implementations of both are
//! included.

#![warn(missing_docs)]

pub mod address;
pub mod asset;
pub mod case;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod network;
pub mod query;
pub mod registry;
pub mod reporter;
pub mod reward;
pub mod store;

#[cfg(test)]
mod testing;

pub use address::{CreateAddressInput, UpdateAddressInput};
pub use asset::{CreateAssetInput, UpdateAssetInput};
pub use case::{CreateCaseInput, UpdateCaseInput};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{RegistryError, Result};
pub use ledger::{MemoryLedger, TokenAccount, TokenLedger};
pub use network::CreateNetworkInput;
pub use query::NetworkScoped;
pub use registry::Registry;
pub use reporter::{CreateReporterInput, StakeAccounts, UpdateReporterInput};
pub use reward::{RewardAccounts, RewardKind};
pub use store::{AccountStore, MemoryStore, Write, WriteBatch};

/// Registry backed by the in-memory store and ledger.
pub type MemoryRegistry<C = SystemClock> = Registry<MemoryStore, MemoryLedger, C>;
