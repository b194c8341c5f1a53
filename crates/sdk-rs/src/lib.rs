//! Rust SDK for the HAPI registry.
//!
//! This crate provides:
//! - The [`HapiCore`] client interface, keyed by UUID strings and native addresses
//! - Address validation for each network schema
//! - [`LocalClient`], an in-process client over a shared registry
//!
//! ```no_run
//! use hapi_core::{AccountKey, NetworkName};
//! use hapi_registry::MemoryRegistry;
//! use hapi_sdk::{connect, ClientOptions, HapiCore, LocalNetwork};
//!
//! # fn main() -> hapi_sdk::Result<()> {
//! let program = AccountKey::default();
//! let registry: MemoryRegistry = MemoryRegistry::new(
//!     program,
//!     Default::default(),
//!     Default::default(),
//!     Default::default(),
//! );
//! let network = LocalNetwork::new(registry);
//! let client = connect(network, ClientOptions::new(NetworkName::new("ethereum")?, program))?;
//! println!("{}", client.get_reporter_count()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod input;
pub mod interface;
pub mod local;

pub use address::{address_format, AddressFormat};
pub use error::{ClientError, Result};
pub use input::{
    CreateAddressInput, CreateAssetInput, CreateCaseInput, CreateReporterInput,
    UpdateAddressInput, UpdateAssetInput, UpdateCaseInput, UpdateReporterInput,
};
pub use interface::{HapiCore, Tx};
pub use local::{connect, ClientOptions, LocalClient, LocalNetwork};
