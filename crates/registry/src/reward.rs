//! Reward accounting.
//!
//! Reporting an address or asset credits the creator's tracer counter,
//! confirming one credits the confirmer's confirmation counter. Claiming pays
//! `counter * reward` for every counter out of reward custody and zeroes them.

use hapi_core::hashing::reporter_reward_address;
use hapi_core::{AccountKey, Amount, EntityAddress, NetworkName, ReporterId, ReporterReward};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{RegistryError, Result};
use crate::ledger::TokenLedger;
use crate::registry::Registry;
use crate::store::{AccountStore, WriteBatch};

/// Reward-bearing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardKind {
    /// An address was reported.
    AddressTracer,
    /// An address was confirmed.
    AddressConfirmation,
    /// An asset was reported.
    AssetTracer,
    /// An asset was confirmed.
    AssetConfirmation,
}

impl RewardKind {
    fn counter<'a>(&self, reward: &'a mut ReporterReward) -> &'a mut u64 {
        match self {
            RewardKind::AddressTracer => &mut reward.address_tracer_counter,
            RewardKind::AddressConfirmation => &mut reward.address_confirmation_counter,
            RewardKind::AssetTracer => &mut reward.asset_tracer_counter,
            RewardKind::AssetConfirmation => &mut reward.asset_confirmation_counter,
        }
    }
}

/// Token accounts paying a reward out of network custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccounts {
    /// Reporter's reward token account, owned by the reporter.
    pub reporter: AccountKey,
    /// Network reward custody, owned by the network address.
    pub network: AccountKey,
}

impl<S, L, C> Registry<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    /// Stage a counter increment, creating the reward record on first use.
    pub(crate) fn stage_reward(
        &self,
        batch: &mut WriteBatch,
        network: &EntityAddress,
        reporter_id: ReporterId,
        kind: RewardKind,
    ) -> Result<()> {
        let address = reporter_reward_address(network, reporter_id);
        let existing = self.load_record::<ReporterReward>(&address)?;
        let exists = existing.is_some();
        let mut reward = existing.unwrap_or_else(|| ReporterReward::new(*network, reporter_id));

        let counter = kind.counter(&mut reward);
        *counter = counter
            .checked_add(1)
            .ok_or(RegistryError::ArithmeticOverflow)?;

        batch.upsert(address, &reward, exists)
    }

    /// Pay out and reset a reporter's pending rewards.
    ///
    /// Returns the amount paid. Counters are only reset when the transfer
    /// succeeds.
    pub fn claim_reporter_reward(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        reporter_id: ReporterId,
        accounts: RewardAccounts,
    ) -> Result<Amount> {
        let (network_address, network) = self.load_network(network_name)?;
        self.acting_reporter(signer, &network_address, reporter_id)?;

        self.token_account(&accounts.reporter, &network.reward_token, signer)?;
        let custody = self.token_account(
            &accounts.network,
            &network.reward_token,
            &network_address.as_owner(),
        )?;

        let address = reporter_reward_address(&network_address, reporter_id);
        let Some(mut reward) = self.load_record::<ReporterReward>(&address)? else {
            info!(network = %network_name, reporter = %reporter_id, "Nothing to claim");
            return Ok(0);
        };
        if reward == ReporterReward::new(network_address, reporter_id) {
            info!(network = %network_name, reporter = %reporter_id, "Nothing to claim");
            return Ok(0);
        }

        let payout = reward
            .payout(&network.reward_configuration)
            .ok_or(RegistryError::ArithmeticOverflow)?;
        if custody.amount < payout {
            return Err(RegistryError::InsufficientFunds {
                required: payout,
                available: custody.amount,
            });
        }

        reward.reset();

        let mut batch = WriteBatch::new();
        batch.update(address, &reward)?;
        self.commit_with_transfer(batch, &accounts.network, &accounts.reporter, payout)?;

        info!(network = %network_name, reporter = %reporter_id, payout, "Reward claimed");

        Ok(payout)
    }

    /// Pending reward counters of a reporter; zero if nothing was earned yet.
    pub fn get_reporter_reward(
        &self,
        network_name: &NetworkName,
        reporter_id: ReporterId,
    ) -> Result<ReporterReward> {
        let (network_address, _) = self.load_network(network_name)?;
        let address = reporter_reward_address(&network_address, reporter_id);

        Ok(self
            .load_record::<ReporterReward>(&address)?
            .unwrap_or_else(|| ReporterReward::new(network_address, reporter_id)))
    }
}
