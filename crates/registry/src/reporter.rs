//! Reporter lifecycle: `Inactive -> Active -> Unstaking -> Inactive`, plus freezing.

use hapi_core::hashing::reporter_address;
use hapi_core::{
    AccountKey, EntityAddress, NetworkName, Reporter, ReporterId, ReporterRole, ReporterStatus,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{RegistryError, Result};
use crate::ledger::TokenLedger;
use crate::registry::Registry;
use crate::store::{AccountStore, WriteBatch};

/// Parameters of a new reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReporterInput {
    /// Reporter UUID.
    pub id: ReporterId,
    /// Signing identity of the reporter.
    pub account: AccountKey,
    /// Role within the network.
    pub role: ReporterRole,
    /// Display name.
    pub name: String,
    /// Public page.
    pub url: String,
}

/// New role and profile of an existing reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReporterInput {
    /// Reporter UUID.
    pub id: ReporterId,
    /// New signing identity.
    pub account: AccountKey,
    /// New role.
    pub role: ReporterRole,
    /// New display name.
    pub name: String,
    /// New public page.
    pub url: String,
}

/// Token accounts moving stake between a reporter and network custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeAccounts {
    /// Reporter's token account, owned by the reporter.
    pub reporter: AccountKey,
    /// Network custody account, owned by the network address.
    pub network: AccountKey,
}

impl<S, L, C> Registry<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    /// Register a reporter. Only the network authority may do this.
    pub fn create_reporter(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        input: CreateReporterInput,
    ) -> Result<EntityAddress> {
        let (network_address, network) = self.load_network(network_name)?;
        Self::require_network_authority(signer, &network)?;
        input.id.validate()?;

        let reporter = Reporter {
            id: input.id,
            network: network_address,
            account: input.account,
            name: input.name,
            role: input.role,
            status: ReporterStatus::Inactive,
            stake: 0,
            unlock_time: 0,
            is_frozen: false,
            url: input.url,
        };

        let address = reporter_address(&network_address, input.id);
        if self.store.contains(&address)? {
            return Err(RegistryError::DuplicateEntity(address));
        }

        let mut batch = WriteBatch::new();
        batch.create(address, &reporter)?;
        self.store.commit(batch)?;

        info!(
            network = %network_name,
            reporter = %reporter.id,
            role = %reporter.role,
            account = %reporter.account,
            "Reporter created"
        );

        Ok(address)
    }

    /// Change a reporter's account, role, name or url.
    ///
    /// A staked reporter may only move to a role whose stake requirement its
    /// current stake covers.
    pub fn update_reporter(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        input: UpdateReporterInput,
    ) -> Result<EntityAddress> {
        let (network_address, network) = self.load_network(network_name)?;
        Self::require_network_authority(signer, &network)?;
        let (address, mut reporter) = self.load_reporter(&network_address, input.id)?;

        if reporter.status != ReporterStatus::Inactive
            && input.role != reporter.role
            && reporter.stake < network.stake_configuration.stake_for(input.role)
        {
            return Err(RegistryError::InvalidReporterStatus);
        }

        reporter.account = input.account;
        reporter.role = input.role;
        reporter.name = input.name;
        reporter.url = input.url;

        let mut batch = WriteBatch::new();
        batch.update(address, &reporter)?;
        self.store.commit(batch)?;

        info!(
            network = %network_name,
            reporter = %reporter.id,
            role = %reporter.role,
            "Reporter updated"
        );

        Ok(address)
    }

    /// Bond the role's stake and start reporting.
    pub fn activate_reporter(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        id: ReporterId,
        accounts: StakeAccounts,
    ) -> Result<EntityAddress> {
        let (network_address, network) = self.load_network(network_name)?;
        let (address, mut reporter) = self.acting_reporter(signer, &network_address, id)?;

        if reporter.status != ReporterStatus::Inactive {
            return Err(RegistryError::InvalidReporterStatus);
        }

        let source = self.token_account(&accounts.reporter, &network.stake_token, signer)?;
        self.token_account(
            &accounts.network,
            &network.stake_token,
            &network_address.as_owner(),
        )?;

        let stake = network.stake_configuration.stake_for(reporter.role);
        if source.amount < stake {
            return Err(RegistryError::InsufficientFunds {
                required: stake,
                available: source.amount,
            });
        }

        reporter.status = ReporterStatus::Active;
        reporter.stake = stake;

        let mut batch = WriteBatch::new();
        batch.update(address, &reporter)?;
        self.commit_with_transfer(batch, &accounts.reporter, &accounts.network, stake)?;

        info!(network = %network_name, reporter = %id, stake, "Reporter activated");

        Ok(address)
    }

    /// Stop reporting and start the unlock countdown.
    pub fn deactivate_reporter(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        id: ReporterId,
    ) -> Result<EntityAddress> {
        let (network_address, network) = self.load_network(network_name)?;
        let (address, mut reporter) = self.acting_reporter(signer, &network_address, id)?;

        if reporter.status != ReporterStatus::Active {
            return Err(RegistryError::InvalidReporterStatus);
        }

        let unlock_time = self
            .clock
            .now()
            .checked_add(network.stake_configuration.unlock_duration)
            .ok_or(RegistryError::ArithmeticOverflow)?;

        reporter.status = ReporterStatus::Unstaking;
        reporter.unlock_time = unlock_time;

        let mut batch = WriteBatch::new();
        batch.update(address, &reporter)?;
        self.store.commit(batch)?;

        info!(network = %network_name, reporter = %id, unlock_time, "Reporter deactivated");

        Ok(address)
    }

    /// Withdraw the stake once the unlock time has passed.
    pub fn unstake_reporter(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        id: ReporterId,
        accounts: StakeAccounts,
    ) -> Result<EntityAddress> {
        let (network_address, network) = self.load_network(network_name)?;
        let (address, mut reporter) = self.acting_reporter(signer, &network_address, id)?;

        if reporter.status != ReporterStatus::Unstaking {
            return Err(RegistryError::InvalidReporterStatus);
        }

        let now = self.clock.now();
        if now < reporter.unlock_time {
            return Err(RegistryError::ReleaseEpochInFuture {
                unlock_time: reporter.unlock_time,
                now,
            });
        }

        self.token_account(&accounts.reporter, &network.stake_token, signer)?;
        let custody = self.token_account(
            &accounts.network,
            &network.stake_token,
            &network_address.as_owner(),
        )?;

        let stake = reporter.stake;
        if custody.amount < stake {
            return Err(RegistryError::InsufficientFunds {
                required: stake,
                available: custody.amount,
            });
        }

        reporter.status = ReporterStatus::Inactive;
        reporter.stake = 0;
        reporter.unlock_time = 0;

        let mut batch = WriteBatch::new();
        batch.update(address, &reporter)?;
        self.commit_with_transfer(batch, &accounts.network, &accounts.reporter, stake)?;

        info!(network = %network_name, reporter = %id, stake, "Reporter unstaked");

        Ok(address)
    }

    /// Block every action of a reporter. Network authority only.
    pub fn freeze_reporter(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        id: ReporterId,
    ) -> Result<EntityAddress> {
        self.set_frozen(signer, network_name, id, true)
    }

    /// Lift a freeze. Network authority only.
    pub fn unfreeze_reporter(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        id: ReporterId,
    ) -> Result<EntityAddress> {
        self.set_frozen(signer, network_name, id, false)
    }

    fn set_frozen(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        id: ReporterId,
        frozen: bool,
    ) -> Result<EntityAddress> {
        let (network_address, network) = self.load_network(network_name)?;
        Self::require_network_authority(signer, &network)?;
        let (address, mut reporter) = self.load_reporter(&network_address, id)?;

        reporter.is_frozen = frozen;

        let mut batch = WriteBatch::new();
        batch.update(address, &reporter)?;
        self.store.commit(batch)?;

        if frozen {
            info!(network = %network_name, reporter = %id, "Reporter frozen");
        } else {
            info!(network = %network_name, reporter = %id, "Reporter unfrozen");
        }

        Ok(address)
    }

    /// Fetch a reporter.
    pub fn get_reporter(&self, network_name: &NetworkName, id: ReporterId) -> Result<Reporter> {
        let (network_address, _) = self.load_network(network_name)?;
        self.load_reporter(&network_address, id).map(|(_, reporter)| reporter)
    }
}
