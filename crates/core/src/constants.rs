//! Canonical constants for the HAPI registry.
//!
//! Field widths and derivation tags are part of the on-chain compatibility
//! surface: changing any of them changes record sizes or entity addresses.

// Entity addressing namespace tags

/// Namespace tag for network records.
pub const SEED_NETWORK: &[u8] = b"network";

/// Namespace tag for reporter records.
pub const SEED_REPORTER: &[u8] = b"reporter";

/// Namespace tag for case records.
pub const SEED_CASE: &[u8] = b"case";

/// Namespace tag for address records.
pub const SEED_ADDRESS: &[u8] = b"address";

/// Namespace tag for asset records.
pub const SEED_ASSET: &[u8] = b"asset";

/// Namespace tag for confirmation records.
pub const SEED_CONFIRMATION: &[u8] = b"confirmation";

/// Namespace tag for reporter reward records.
pub const SEED_REPORTER_REWARD: &[u8] = b"reporter_reward";

/// Separator between the namespace tag and the parent keys.
pub const SEED_SEPARATOR: u8 = 0x00;

// Fixed field widths

/// Length of the per-record type discriminator.
pub const DISCRIMINATOR_LENGTH: usize = 8;

/// Width of a network name.
pub const NETWORK_NAME_LEN: usize = 32;

/// Width of reporter and case names.
pub const NAME_LEN: usize = 128;

/// Width of reporter and case URLs.
pub const URL_LEN: usize = 128;

/// Width of a flagged address (zero-padded).
pub const ADDRESS_LEN: usize = 64;

/// Width of an asset id (zero-padded).
pub const ASSET_ID_LEN: usize = 32;

/// Width of account keys, token ids and entity addresses.
pub const KEY_LEN: usize = 32;

// Risk bounds

/// Lowest risk score (safe).
pub const MIN_RISK: u8 = 0;

/// Highest risk score (maximum risk).
pub const MAX_RISK: u8 = 10;

// Record layout versions

/// Current layout version of every record type.
pub const RECORD_VERSION: u16 = 1;
