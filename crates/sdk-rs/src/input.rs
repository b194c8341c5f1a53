//! String-keyed operation inputs, as accepted from callers.

use hapi_core::{CaseStatus, Category, ReporterRole};
use serde::{Deserialize, Serialize};

/// A new reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReporterInput {
    /// Reporter UUID
    pub id: String,
    /// Signing key of the reporter, hex
    pub account: String,
    /// Role
    pub role: ReporterRole,
    /// Display name
    pub name: String,
    /// Reporter website
    pub url: String,
}

/// New details of a reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReporterInput {
    /// Reporter UUID
    pub id: String,
    /// Signing key of the reporter, hex
    pub account: String,
    /// Role
    pub role: ReporterRole,
    /// Display name
    pub name: String,
    /// Reporter website
    pub url: String,
}

/// A new case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCaseInput {
    /// Case UUID
    pub id: String,
    /// Short description
    pub name: String,
    /// Link to case materials
    pub url: String,
}

/// New content of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCaseInput {
    /// Case UUID
    pub id: String,
    /// Short description
    pub name: String,
    /// Link to case materials
    pub url: String,
    /// Open or closed
    pub status: CaseStatus,
}

/// A new address report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAddressInput {
    /// Address in the network's native format
    pub address: String,
    /// Case UUID
    pub case_id: String,
    /// Risk score, `0..=10`
    pub risk: u8,
    /// Category
    pub category: Category,
}

/// Reassessment of a reported address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAddressInput {
    /// Address in the network's native format
    pub address: String,
    /// Risk score, `0..=10`
    pub risk: u8,
    /// Category
    pub category: Category,
}

/// A new asset report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssetInput {
    /// Contract address in the network's native format
    pub address: String,
    /// Asset id within the contract
    pub asset_id: String,
    /// Case UUID
    pub case_id: String,
    /// Risk score, `0..=10`
    pub risk: u8,
    /// Category
    pub category: Category,
}

/// Reassessment of a reported asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAssetInput {
    /// Contract address in the network's native format
    pub address: String,
    /// Asset id within the contract
    pub asset_id: String,
    /// Risk score, `0..=10`
    pub risk: u8,
    /// Category
    pub category: Category,
}
