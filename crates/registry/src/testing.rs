//! Test fixtures shared by the unit tests.

use hapi_core::hashing::network_address;
use hapi_core::{
    AccountKey, CaseId, NetworkName, NetworkSchema, ReporterId, ReporterRole, RewardConfiguration,
    StakeConfiguration, TokenId,
};

use crate::case::CreateCaseInput;
use crate::clock::ManualClock;
use crate::ledger::MemoryLedger;
use crate::network::CreateNetworkInput;
use crate::registry::Registry;
use crate::reporter::{CreateReporterInput, StakeAccounts};
use crate::reward::RewardAccounts;
use crate::store::MemoryStore;

pub(crate) const START: u64 = 1_700_000_000;

pub(crate) fn key(tag: u8, index: u8) -> AccountKey {
    let mut bytes = [0u8; 32];
    bytes[0] = tag;
    bytes[1] = index;
    AccountKey::from(bytes)
}

pub(crate) fn program() -> AccountKey {
    key(0xff, 0)
}

pub(crate) fn authority() -> AccountKey {
    key(0xaa, 0)
}

pub(crate) fn stake_token() -> TokenId {
    TokenId::from([0x51; 32])
}

pub(crate) fn reward_token() -> TokenId {
    TokenId::from([0x52; 32])
}

pub(crate) fn stake_configuration() -> StakeConfiguration {
    StakeConfiguration {
        unlock_duration: 1000,
        validator_stake: 2000,
        tracer_stake: 3000,
        publisher_stake: 4000,
        authority_stake: 5000,
    }
}

pub(crate) fn reward_configuration() -> RewardConfiguration {
    RewardConfiguration {
        address_tracer_reward: 10,
        address_confirmation_reward: 1,
        asset_tracer_reward: 20,
        asset_confirmation_reward: 2,
    }
}

pub(crate) fn reporter_id(index: u8) -> ReporterId {
    ReporterId::parse(&format!("{index:08x}-0000-4000-8000-000000000000")).unwrap()
}

pub(crate) fn case_id(index: u8) -> CaseId {
    CaseId::parse(&format!("{index:08x}-1111-4000-8000-000000000000")).unwrap()
}

/// A reporter with its signer and token accounts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Actor {
    pub id: ReporterId,
    pub signer: AccountKey,
    pub stake: StakeAccounts,
    pub reward: RewardAccounts,
}

pub(crate) struct Harness {
    pub registry: Registry<MemoryStore, MemoryLedger, ManualClock>,
    pub clock: ManualClock,
    pub network: NetworkName,
    pub stake_custody: AccountKey,
    pub reward_custody: AccountKey,
}

impl Harness {
    pub fn new() -> Self {
        let clock = ManualClock::new(START);
        let mut registry = Registry::new(
            program(),
            MemoryStore::new(),
            MemoryLedger::new(),
            clock.clone(),
        );
        let network = NetworkName::new("ethereum").unwrap();

        registry
            .create_network(
                &program(),
                CreateNetworkInput {
                    name: network,
                    schema: NetworkSchema::Ethereum,
                    authority: authority(),
                    stake_token: stake_token(),
                    stake_configuration: stake_configuration(),
                    reward_token: reward_token(),
                    reward_configuration: reward_configuration(),
                },
            )
            .unwrap();

        let owner = network_address(&network).as_owner();
        let stake_custody = key(0xc0, 1);
        let reward_custody = key(0xc0, 2);
        let ledger = registry.ledger_mut();
        ledger.open_account(stake_custody, stake_token(), owner).unwrap();
        ledger.open_account(reward_custody, reward_token(), owner).unwrap();
        ledger.mint_to(&reward_custody, 1_000_000).unwrap();

        Self {
            registry,
            clock,
            network,
            stake_custody,
            reward_custody,
        }
    }

    /// Register an inactive reporter whose stake account holds `funds`.
    pub fn reporter_with_funds(&mut self, index: u8, role: ReporterRole, funds: u64) -> Actor {
        let actor = Actor {
            id: reporter_id(index),
            signer: key(0x01, index),
            stake: StakeAccounts {
                reporter: key(0x02, index),
                network: self.stake_custody,
            },
            reward: RewardAccounts {
                reporter: key(0x03, index),
                network: self.reward_custody,
            },
        };

        self.registry
            .create_reporter(
                &authority(),
                &self.network,
                CreateReporterInput {
                    id: actor.id,
                    account: actor.signer,
                    role,
                    name: format!("reporter {index}"),
                    url: format!("https://reporter-{index}.example"),
                },
            )
            .unwrap();

        let ledger = self.registry.ledger_mut();
        ledger
            .open_account(actor.stake.reporter, stake_token(), actor.signer)
            .unwrap();
        ledger
            .open_account(actor.reward.reporter, reward_token(), actor.signer)
            .unwrap();
        ledger.mint_to(&actor.stake.reporter, funds).unwrap();

        actor
    }

    /// Register and activate a reporter.
    pub fn active(&mut self, index: u8, role: ReporterRole) -> Actor {
        let funds = stake_configuration().stake_for(role);
        let actor = self.reporter_with_funds(index, role, funds);
        self.registry
            .activate_reporter(&actor.signer, &self.network, actor.id, actor.stake)
            .unwrap();
        actor
    }

    /// Open a case on behalf of `actor`.
    pub fn case(&mut self, actor: &Actor, index: u8) -> CaseId {
        let id = case_id(index);
        self.registry
            .create_case(
                &actor.signer,
                &self.network,
                actor.id,
                CreateCaseInput {
                    id,
                    name: format!("case {index}"),
                    url: format!("https://cases.example/{index}"),
                },
            )
            .unwrap();
        id
    }
}
