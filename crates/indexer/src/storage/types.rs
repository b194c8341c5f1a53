//! Database types and row conversions for the indexer storage layer.

use anyhow::{Context, Result};
use hapi_core::{AddressKey, AssetId, CaseId, CaseStatus, Category, ReporterId, RiskScore};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Risk assessment of an address or asset, as served to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReport {
    /// The flagged address (or the asset's contract address).
    pub address: AddressKey,

    /// Asset id within the contract, for asset reports.
    pub asset_id: Option<AssetId>,

    /// Primary category
    pub category: Category,

    /// Risk score, `0..=10`
    pub risk: RiskScore,

    /// Number of independent confirmations
    pub confirmations: u32,

    /// Reporter that filed the record
    pub reporter_id: ReporterId,

    /// Case the record belongs to
    pub case_id: CaseId,

    /// Status of that case, if the case has been mirrored
    pub case_status: Option<CaseStatus>,
}

/// Database statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of networks
    pub network_count: u64,

    /// Total number of reporters
    pub reporter_count: u64,

    /// Total number of cases
    pub case_count: u64,

    /// Total number of reported addresses
    pub address_count: u64,

    /// Total number of reported assets
    pub asset_count: u64,
}

/// Decode a 32-byte key column.
pub(crate) fn key_column(bytes: &[u8], column: &str) -> Result<[u8; 32]> {
    <[u8; 32]>::try_from(bytes)
        .with_context(|| format!("Column {} holds {} bytes, expected 32", column, bytes.len()))
}

/// Decode a text column through the type's `FromStr`.
pub(crate) fn parse_column<T>(value: &str, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("Invalid {} value: {:?}", column, value))
}

/// Current unix time in seconds, stored as `updated_at`.
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
