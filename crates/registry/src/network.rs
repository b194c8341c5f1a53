//! Network registry operations.

use hapi_core::hashing::network_address;
use hapi_core::{
    AccountKey, EntityAddress, Network, NetworkName, NetworkSchema, RewardConfiguration,
    StakeConfiguration, TokenId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{RegistryError, Result};
use crate::ledger::TokenLedger;
use crate::registry::Registry;
use crate::store::{AccountStore, WriteBatch};

/// Parameters of a new network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNetworkInput {
    /// Unique network name.
    pub name: NetworkName,
    /// Address format family.
    pub schema: NetworkSchema,
    /// Key administering the network.
    pub authority: AccountKey,
    /// Token bonded as stake.
    pub stake_token: TokenId,
    /// Stake requirements.
    pub stake_configuration: StakeConfiguration,
    /// Token paid as rewards.
    pub reward_token: TokenId,
    /// Reward amounts.
    pub reward_configuration: RewardConfiguration,
}

impl<S, L, C> Registry<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    /// Create a network. Only the program authority may do this.
    pub fn create_network(
        &mut self,
        signer: &AccountKey,
        input: CreateNetworkInput,
    ) -> Result<EntityAddress> {
        if signer != self.program_authority() {
            return Err(RegistryError::AuthorityMismatch);
        }

        let address = network_address(&input.name);
        if self.store.contains(&address)? {
            return Err(RegistryError::DuplicateEntity(address));
        }

        let network = Network {
            authority: input.authority,
            name: input.name,
            schema: input.schema,
            stake_token: input.stake_token,
            stake_configuration: input.stake_configuration,
            reward_token: input.reward_token,
            reward_configuration: input.reward_configuration,
        };

        let mut batch = WriteBatch::new();
        batch.create(address, &network)?;
        self.store.commit(batch)?;

        info!(
            network = %network.name,
            schema = %network.schema,
            authority = %network.authority,
            "Network created"
        );

        Ok(address)
    }

    /// Hand the network over to a new authority.
    ///
    /// Allowed for the current network authority and the program authority.
    pub fn set_network_authority(
        &mut self,
        signer: &AccountKey,
        name: &NetworkName,
        new_authority: AccountKey,
    ) -> Result<EntityAddress> {
        let (address, mut network) = self.load_network(name)?;

        if network.authority != *signer && signer != self.program_authority() {
            return Err(RegistryError::AuthorityMismatch);
        }

        let previous = network.authority;
        network.authority = new_authority;

        let mut batch = WriteBatch::new();
        batch.update(address, &network)?;
        self.store.commit(batch)?;

        info!(network = %name, %previous, authority = %new_authority, "Network authority changed");

        Ok(address)
    }

    /// Replace the stake requirements.
    pub fn update_stake_configuration(
        &mut self,
        signer: &AccountKey,
        name: &NetworkName,
        configuration: StakeConfiguration,
    ) -> Result<EntityAddress> {
        let (address, mut network) = self.load_network(name)?;
        Self::require_network_authority(signer, &network)?;

        network.stake_configuration = configuration;

        let mut batch = WriteBatch::new();
        batch.update(address, &network)?;
        self.store.commit(batch)?;

        info!(network = %name, ?configuration, "Stake configuration updated");

        Ok(address)
    }

    /// Replace the reward amounts.
    pub fn update_reward_configuration(
        &mut self,
        signer: &AccountKey,
        name: &NetworkName,
        configuration: RewardConfiguration,
    ) -> Result<EntityAddress> {
        let (address, mut network) = self.load_network(name)?;
        Self::require_network_authority(signer, &network)?;

        network.reward_configuration = configuration;

        let mut batch = WriteBatch::new();
        batch.update(address, &network)?;
        self.store.commit(batch)?;

        info!(network = %name, ?configuration, "Reward configuration updated");

        Ok(address)
    }

    /// Fetch a network.
    pub fn get_network(&self, name: &NetworkName) -> Result<Network> {
        self.load_network(name).map(|(_, network)| network)
    }

    /// Current authority of a network.
    pub fn get_authority(&self, name: &NetworkName) -> Result<AccountKey> {
        self.load_network(name).map(|(_, network)| network.authority)
    }
}
