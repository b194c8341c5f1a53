#![allow(dead_code)]

use hapi_core::hashing::network_address;
use hapi_core::{
    AccountKey, CaseId, NetworkName, NetworkSchema, ReporterId, ReporterRole, RewardConfiguration,
    StakeConfiguration, TokenId,
};
use hapi_registry::{
    CreateCaseInput, CreateNetworkInput, CreateReporterInput, ManualClock, MemoryLedger,
    MemoryStore, Registry, RewardAccounts, StakeAccounts,
};

pub type TestRegistry = Registry<MemoryStore, MemoryLedger, ManualClock>;

pub const START: u64 = 1_700_000_000;
pub const REWARD_POOL: u64 = 1_000_000;

pub fn key(tag: u8, index: u8) -> AccountKey {
    let mut bytes = [0u8; 32];
    bytes[0] = tag;
    bytes[1] = index;
    AccountKey::from(bytes)
}

pub fn program() -> AccountKey {
    key(0xff, 0)
}

pub fn authority() -> AccountKey {
    key(0xaa, 0)
}

pub fn stake_token() -> TokenId {
    TokenId::from([0x51; 32])
}

pub fn reward_token() -> TokenId {
    TokenId::from([0x52; 32])
}

pub fn stake_configuration() -> StakeConfiguration {
    StakeConfiguration {
        unlock_duration: 1000,
        validator_stake: 2000,
        tracer_stake: 3000,
        publisher_stake: 4000,
        authority_stake: 5000,
    }
}

pub fn reward_configuration() -> RewardConfiguration {
    RewardConfiguration {
        address_tracer_reward: 10,
        address_confirmation_reward: 1,
        asset_tracer_reward: 20,
        asset_confirmation_reward: 2,
    }
}

pub fn case_id(index: u8) -> CaseId {
    CaseId::parse(&format!("{index:08x}-1111-4000-8000-000000000000")).unwrap()
}

#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: ReporterId,
    pub signer: AccountKey,
    pub stake: StakeAccounts,
    pub reward: RewardAccounts,
}

pub struct World {
    pub registry: TestRegistry,
    pub clock: ManualClock,
    pub network: NetworkName,
    pub stake_custody: AccountKey,
    pub reward_custody: AccountKey,
}

impl World {
    pub fn new(network: &str) -> Self {
        let clock = ManualClock::new(START);
        let mut registry = Registry::new(
            program(),
            MemoryStore::new(),
            MemoryLedger::new(),
            clock.clone(),
        );
        let name = NetworkName::new(network).unwrap();

        registry
            .create_network(
                &program(),
                CreateNetworkInput {
                    name,
                    schema: NetworkSchema::Ethereum,
                    authority: authority(),
                    stake_token: stake_token(),
                    stake_configuration: stake_configuration(),
                    reward_token: reward_token(),
                    reward_configuration: reward_configuration(),
                },
            )
            .unwrap();

        let owner = network_address(&name).as_owner();
        let stake_custody = key(0xc0, 1);
        let reward_custody = key(0xc0, 2);
        let ledger = registry.ledger_mut();
        ledger.open_account(stake_custody, stake_token(), owner).unwrap();
        ledger.open_account(reward_custody, reward_token(), owner).unwrap();
        ledger.mint_to(&reward_custody, REWARD_POOL).unwrap();

        Self {
            registry,
            clock,
            network: name,
            stake_custody,
            reward_custody,
        }
    }

    /// Register an inactive reporter whose stake account holds `funds`.
    pub fn reporter(&mut self, index: u8, role: ReporterRole, funds: u64) -> Actor {
        let actor = Actor {
            id: ReporterId::parse(&format!("{index:08x}-0000-4000-8000-000000000000")).unwrap(),
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
                    url: String::new(),
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

    /// Register and activate a reporter with exactly its role's stake.
    pub fn active(&mut self, index: u8, role: ReporterRole) -> Actor {
        let actor = self.reporter(index, role, stake_configuration().stake_for(role));
        self.registry
            .activate_reporter(&actor.signer, &self.network, actor.id, actor.stake)
            .unwrap();
        actor
    }

    pub fn open_case(&mut self, actor: &Actor, index: u8) -> CaseId {
        let id = case_id(index);
        self.registry
            .create_case(
                &actor.signer,
                &self.network,
                actor.id,
                CreateCaseInput {
                    id,
                    name: format!("case {index}"),
                    url: String::new(),
                },
            )
            .unwrap();
        id
    }

    pub fn balance(&self, account: &AccountKey) -> u64 {
        self.registry.ledger().balance(account)
    }
}
