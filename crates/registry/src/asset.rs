//! Asset ledger and asset confirmations.

use hapi_core::hashing::{asset_address, confirmation_address};
use hapi_core::{
    AccountKey, AddressKey, AssetId, AssetRecord, CaseId, Category, Confirmation, EntityAddress,
    NetworkName, ReporterId, RiskScore,
};
use hapi_engine::Action;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{RegistryError, Result};
use crate::ledger::TokenLedger;
use crate::registry::Registry;
use crate::reward::RewardKind;
use crate::store::{AccountStore, WriteBatch};

/// Parameters of a new asset report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssetInput {
    /// Contract address of the asset.
    pub address: AddressKey,
    /// Id within the contract.
    pub asset_id: AssetId,
    /// Case the asset belongs to.
    pub case_id: CaseId,
    /// Risk score, `0..=10`.
    pub risk: u8,
    /// Primary category.
    pub category: Category,
}

/// New assessment of a reported asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAssetInput {
    /// Contract address of the asset.
    pub address: AddressKey,
    /// Id within the contract.
    pub asset_id: AssetId,
    /// New risk score, `0..=10`.
    pub risk: u8,
    /// New category.
    pub category: Category,
}

impl<S, L, C> Registry<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    /// Report an asset.
    pub fn create_asset(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        reporter_id: ReporterId,
        input: CreateAssetInput,
    ) -> Result<EntityAddress> {
        let (network_address, _) = self.load_network(network_name)?;
        let (_, reporter) = self.acting_reporter(signer, &network_address, reporter_id)?;
        Self::authorize_action(&reporter, Action::CreateAsset, true)?;
        let risk = RiskScore::new(input.risk)?;
        self.open_case(&network_address, input.case_id)?;

        let address = asset_address(&network_address, &input.address, &input.asset_id);
        if self.store.contains(&address)? {
            return Err(RegistryError::DuplicateEntity(address));
        }

        let record = AssetRecord {
            network: network_address,
            address: input.address,
            asset_id: input.asset_id,
            category: input.category,
            risk,
            case_id: input.case_id,
            reporter_id,
            confirmations: 0,
        };

        let mut batch = WriteBatch::new();
        batch.create(address, &record)?;
        self.stage_reward(&mut batch, &network_address, reporter_id, RewardKind::AssetTracer)?;
        self.store.commit(batch)?;

        info!(
            network = %network_name,
            address = %record.address,
            asset_id = %record.asset_id,
            case = %record.case_id,
            reporter = %reporter_id,
            risk = %record.risk,
            "Asset created"
        );

        Ok(address)
    }

    /// Change the risk or category of a reported asset.
    pub fn update_asset(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        reporter_id: ReporterId,
        input: UpdateAssetInput,
    ) -> Result<EntityAddress> {
        let (network_address, _) = self.load_network(network_name)?;
        let (_, reporter) = self.acting_reporter(signer, &network_address, reporter_id)?;
        let (address, mut record) =
            self.load_asset(&network_address, &input.address, &input.asset_id)?;
        Self::authorize_action(&reporter, Action::UpdateAsset, record.reporter_id == reporter.id)?;
        let risk = RiskScore::new(input.risk)?;
        self.open_case(&network_address, record.case_id)?;

        record.risk = risk;
        record.category = input.category;

        let mut batch = WriteBatch::new();
        batch.update(address, &record)?;
        self.store.commit(batch)?;

        info!(
            network = %network_name,
            address = %record.address,
            asset_id = %record.asset_id,
            risk = %record.risk,
            "Asset updated"
        );

        Ok(address)
    }

    /// Corroborate an asset reported by someone else.
    pub fn confirm_asset(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        reporter_id: ReporterId,
        case_id: CaseId,
        address: &AddressKey,
        asset_id: &AssetId,
    ) -> Result<EntityAddress> {
        let (network_address, _) = self.load_network(network_name)?;
        let (_, reporter) = self.acting_reporter(signer, &network_address, reporter_id)?;
        let (entity, mut record) = self.load_asset(&network_address, address, asset_id)?;
        Self::authorize_action(&reporter, Action::ConfirmAsset, record.reporter_id == reporter.id)?;
        let case = self.open_case(&network_address, case_id)?;
        if case.id != record.case_id {
            return Err(RegistryError::CaseMismatch);
        }

        let confirmation_key = confirmation_address(&entity, reporter_id);
        if self.store.contains(&confirmation_key)? {
            return Err(RegistryError::DuplicateEntity(confirmation_key));
        }

        record.confirmations = record
            .confirmations
            .checked_add(1)
            .ok_or(RegistryError::ArithmeticOverflow)?;

        let confirmation = Confirmation {
            network: network_address,
            account: entity,
            reporter_id,
        };

        let mut batch = WriteBatch::new();
        batch.create(confirmation_key, &confirmation)?;
        batch.update(entity, &record)?;
        self.stage_reward(
            &mut batch,
            &network_address,
            reporter_id,
            RewardKind::AssetConfirmation,
        )?;
        self.store.commit(batch)?;

        info!(
            network = %network_name,
            address = %record.address,
            asset_id = %record.asset_id,
            reporter = %reporter_id,
            confirmations = record.confirmations,
            "Asset confirmed"
        );

        Ok(confirmation_key)
    }

    /// Fetch a reported asset.
    pub fn get_asset(
        &self,
        network_name: &NetworkName,
        address: &AddressKey,
        asset_id: &AssetId,
    ) -> Result<AssetRecord> {
        let (network_address, _) = self.load_network(network_name)?;
        self.load_asset(&network_address, address, asset_id)
            .map(|(_, record)| record)
    }

    fn load_asset(
        &self,
        network: &EntityAddress,
        address: &AddressKey,
        asset_id: &AssetId,
    ) -> Result<(EntityAddress, AssetRecord)> {
        let entity = asset_address(network, address, asset_id);
        let record = self
            .load_record::<AssetRecord>(&entity)?
            .ok_or_else(|| RegistryError::NotFound(format!("asset {address}/{asset_id}")))?;
        Ok((entity, record))
    }
}
