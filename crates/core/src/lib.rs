//! # HAPI Core
//!
//! Core types, constants, identifier codec, entity addressing and fixed record
//! layouts for the HAPI risk-reporting registry.
//!
//! This crate provides the fundamental building blocks used across all HAPI
//! components, ensuring consistent identifiers, derived addresses and
//! byte-for-byte record layouts.
//!
//! ## Features
//!
//! - **Identifier Codec**: v4 UUID strings to `u128` keys and back, zero-padded fields
//! - **Entity Addressing**: `keccak256(tag || 0x00 || parents...)` storage addresses
//! - **Domain Types**: ReporterRole, ReporterStatus, CaseStatus, Category, RiskScore
//! - **Records**: Network, Reporter, Case, Address, Asset, Confirmation, ReporterReward

#![warn(missing_docs)]

pub mod codec;
pub mod constants;
pub mod error;
pub mod hashing;
pub mod records;
pub mod types;

// Re-export commonly used items
pub use codec::{key_to_uuid, pad_bytes, string_to_bytes, uuid_to_key, validate_key};
pub use constants::*;
pub use error::{CoreError, Result};
pub use hashing::{derive_address, keccak256};
pub use records::{
    AddressRecord, AssetRecord, Case, Confirmation, Network, Record, Reporter, ReporterReward,
};
pub use types::*;

// Re-export Alloy primitives for convenience
pub use alloy_primitives::B256;
