//! The client capability interface.

use hapi_core::{
    AddressRecord, AssetRecord, Case, Reporter, ReporterReward, RewardConfiguration,
    StakeConfiguration,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::{
    CreateAddressInput, CreateAssetInput, CreateCaseInput, CreateReporterInput,
    UpdateAddressInput, UpdateAssetInput, UpdateCaseInput, UpdateReporterInput,
};

/// Receipt of a committed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    /// Transaction hash, `0x`-prefixed hex
    pub hash: String,
}

/// Operations a client can submit to one network of the registry.
///
/// The acting reporter is the one registered for the client's signing key.
/// Identifiers are UUID strings and addresses are in the network's native
/// format.
pub trait HapiCore {
    /// Check an address against the network's address format.
    fn is_valid_address(&self, address: &str) -> Result<()>;

    /// Hand the network over to another authority key.
    fn set_authority(&self, address: &str) -> Result<Tx>;
    /// Current network authority key.
    fn get_authority(&self) -> Result<String>;

    /// Replace the stake configuration.
    fn update_stake_configuration(&self, configuration: StakeConfiguration) -> Result<Tx>;
    /// Current stake configuration.
    fn get_stake_configuration(&self) -> Result<StakeConfiguration>;

    /// Replace the reward configuration.
    fn update_reward_configuration(&self, configuration: RewardConfiguration) -> Result<Tx>;
    /// Current reward configuration.
    fn get_reward_configuration(&self) -> Result<RewardConfiguration>;

    /// Register a reporter.
    fn create_reporter(&self, input: CreateReporterInput) -> Result<Tx>;
    /// Change a reporter's account, role, name or url.
    fn update_reporter(&self, input: UpdateReporterInput) -> Result<Tx>;
    /// Fetch a reporter.
    fn get_reporter(&self, id: &str) -> Result<Reporter>;
    /// Number of reporters.
    fn get_reporter_count(&self) -> Result<u64>;
    /// Reporters, paged.
    fn get_reporters(&self, skip: u64, take: u64) -> Result<Vec<Reporter>>;

    /// Bond the signer's stake.
    fn activate_reporter(&self) -> Result<Tx>;
    /// Start the signer's unlock countdown.
    fn deactivate_reporter(&self) -> Result<Tx>;
    /// Withdraw the signer's stake after the unlock time.
    fn unstake_reporter(&self) -> Result<Tx>;
    /// Freeze a reporter.
    fn freeze_reporter(&self, id: &str) -> Result<Tx>;
    /// Unfreeze a reporter.
    fn unfreeze_reporter(&self, id: &str) -> Result<Tx>;

    /// Pending reward counters of the signer's reporter.
    fn get_reporter_reward(&self) -> Result<ReporterReward>;
    /// Pay out the signer's pending rewards.
    fn claim_reporter_reward(&self) -> Result<Tx>;

    /// Open a case.
    fn create_case(&self, input: CreateCaseInput) -> Result<Tx>;
    /// Rename, close or reopen a case.
    fn update_case(&self, input: UpdateCaseInput) -> Result<Tx>;
    /// Fetch a case.
    fn get_case(&self, id: &str) -> Result<Case>;
    /// Number of cases.
    fn get_case_count(&self) -> Result<u64>;
    /// Cases, paged.
    fn get_cases(&self, skip: u64, take: u64) -> Result<Vec<Case>>;

    /// Report an address.
    fn create_address(&self, input: CreateAddressInput) -> Result<Tx>;
    /// Reassess a reported address.
    fn update_address(&self, input: UpdateAddressInput) -> Result<Tx>;
    /// Confirm an address reported by someone else.
    fn confirm_address(&self, address: &str) -> Result<Tx>;
    /// Fetch a reported address.
    fn get_address(&self, address: &str) -> Result<AddressRecord>;
    /// Number of reported addresses.
    fn get_address_count(&self) -> Result<u64>;
    /// Reported addresses, paged.
    fn get_addresses(&self, skip: u64, take: u64) -> Result<Vec<AddressRecord>>;

    /// Report an asset.
    fn create_asset(&self, input: CreateAssetInput) -> Result<Tx>;
    /// Reassess a reported asset.
    fn update_asset(&self, input: UpdateAssetInput) -> Result<Tx>;
    /// Confirm an asset reported by someone else.
    fn confirm_asset(&self, address: &str, asset_id: &str) -> Result<Tx>;
    /// Fetch a reported asset.
    fn get_asset(&self, address: &str, asset_id: &str) -> Result<AssetRecord>;
    /// Number of reported assets.
    fn get_asset_count(&self) -> Result<u64>;
    /// Reported assets, paged.
    fn get_assets(&self, skip: u64, take: u64) -> Result<Vec<AssetRecord>>;
}
