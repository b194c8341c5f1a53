//! In-process client bound to a shared registry instance.

use std::sync::{Arc, Mutex, MutexGuard};

use hapi_core::{
    keccak256, AccountKey, AddressKey, AddressRecord, AssetId, AssetRecord, Case, CaseId,
    NetworkName, Reporter, ReporterId, ReporterReward, RewardConfiguration, StakeConfiguration,
};
use hapi_registry::{
    AccountStore, Clock, Registry, RewardAccounts, StakeAccounts, TokenLedger,
};
use tracing::{debug, info};

use crate::address::{address_format, AddressFormat};
use crate::error::{ClientError, Result};
use crate::input::{
    CreateAddressInput, CreateAssetInput, CreateCaseInput, CreateReporterInput,
    UpdateAddressInput, UpdateAssetInput, UpdateCaseInput, UpdateReporterInput,
};
use crate::interface::{HapiCore, Tx};

struct State<S, L, C> {
    registry: Registry<S, L, C>,
    nonce: u64,
}

/// A registry shared by any number of [`LocalClient`]s.
///
/// Operations are applied one at a time, in submission order.
pub struct LocalNetwork<S, L, C> {
    state: Mutex<State<S, L, C>>,
}

impl<S, L, C> LocalNetwork<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    /// Wrap a registry for sharing.
    pub fn new(registry: Registry<S, L, C>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State { registry, nonce: 0 }),
        })
    }

    /// Run `f` with exclusive access to the registry, e.g. to create
    /// networks or fund token accounts.
    pub fn with_registry<R>(&self, f: impl FnOnce(&mut Registry<S, L, C>) -> R) -> Result<R> {
        let mut state = self.lock()?;
        Ok(f(&mut state.registry))
    }

    fn lock(&self) -> Result<MutexGuard<'_, State<S, L, C>>> {
        self.state.lock().map_err(|_| ClientError::Poisoned)
    }
}

/// Identity and token accounts of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Network the client operates on
    pub network: NetworkName,
    /// Signing key
    pub signer: AccountKey,
    /// Accounts used to bond and withdraw stake
    pub stake_accounts: Option<StakeAccounts>,
    /// Accounts used to claim rewards
    pub reward_accounts: Option<RewardAccounts>,
}

impl ClientOptions {
    /// Options for a client that only reads or acts as an authority.
    pub fn new(network: NetworkName, signer: AccountKey) -> Self {
        Self {
            network,
            signer,
            stake_accounts: None,
            reward_accounts: None,
        }
    }

    /// Use `accounts` for staking.
    pub fn with_stake_accounts(mut self, accounts: StakeAccounts) -> Self {
        self.stake_accounts = Some(accounts);
        self
    }

    /// Use `accounts` for reward claims.
    pub fn with_reward_accounts(mut self, accounts: RewardAccounts) -> Self {
        self.reward_accounts = Some(accounts);
        self
    }
}

/// [`HapiCore`] over a [`LocalNetwork`].
pub struct LocalClient<S, L, C> {
    network: Arc<LocalNetwork<S, L, C>>,
    options: ClientOptions,
    format: Box<dyn AddressFormat>,
}

/// Connect to a network of `network`, validating addresses with the format
/// of its schema.
pub fn connect<S, L, C>(
    network: Arc<LocalNetwork<S, L, C>>,
    options: ClientOptions,
) -> Result<Box<dyn HapiCore + Send + Sync>>
where
    S: AccountStore + Send + 'static,
    L: TokenLedger + Send + 'static,
    C: Clock + Send + 'static,
{
    Ok(Box::new(LocalClient::new(network, options)?))
}

impl<S, L, C> LocalClient<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    /// Create a client. Fails if the network does not exist.
    pub fn new(network: Arc<LocalNetwork<S, L, C>>, options: ClientOptions) -> Result<Self> {
        let schema = network.with_registry(|registry| {
            registry
                .get_network(&options.network)
                .map(|network| network.schema)
        })??;

        debug!(network = %options.network, %schema, signer = %options.signer, "Client connected");

        Ok(Self {
            network,
            options,
            format: address_format(schema),
        })
    }

    /// Signing key of this client.
    pub fn signer(&self) -> &AccountKey {
        &self.options.signer
    }

    fn read<R>(&self, f: impl FnOnce(&Registry<S, L, C>, &NetworkName) -> Result<R>) -> Result<R> {
        let state = self.network.lock()?;
        f(&state.registry, &self.options.network)
    }

    /// Apply a state-changing operation and derive its transaction hash.
    fn submit(
        &self,
        method: &'static str,
        op: impl FnOnce(&mut Registry<S, L, C>, &NetworkName, &AccountKey) -> Result<()>,
    ) -> Result<Tx> {
        let mut state = self.network.lock()?;
        let signer = &self.options.signer;

        if let Err(err) = op(&mut state.registry, &self.options.network, signer) {
            debug!(method, network = %self.options.network, error = %err, "Operation rejected");
            return Err(err);
        }

        state.nonce += 1;
        let mut preimage = Vec::with_capacity(8 + 32 + method.len());
        preimage.extend_from_slice(&state.nonce.to_le_bytes());
        preimage.extend_from_slice(signer.as_bytes());
        preimage.extend_from_slice(method.as_bytes());
        let hash = format!("0x{}", hex::encode(keccak256(&preimage)));

        info!(method, network = %self.options.network, tx = %hash, "Operation committed");

        Ok(Tx { hash })
    }

    fn address_key(&self, address: &str) -> Result<AddressKey> {
        self.format.validate(address)?;
        Ok(AddressKey::new(address)?)
    }

    fn stake_accounts(&self) -> Result<StakeAccounts> {
        self.options
            .stake_accounts
            .ok_or(ClientError::AbsentTokenAccount("stake"))
    }

    fn reward_accounts(&self) -> Result<RewardAccounts> {
        self.options
            .reward_accounts
            .ok_or(ClientError::AbsentTokenAccount("reward"))
    }
}

/// Reporter registered for `signer`.
fn signer_reporter<S, L, C>(
    registry: &Registry<S, L, C>,
    network: &NetworkName,
    signer: &AccountKey,
) -> Result<ReporterId>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    let count = registry.get_reporter_count(network)?;
    registry
        .get_reporters(network, 0, count)?
        .into_iter()
        .find(|reporter| reporter.account == *signer)
        .map(|reporter| reporter.id)
        .ok_or(ClientError::InvalidReporter)
}

impl<S, L, C> HapiCore for LocalClient<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    fn is_valid_address(&self, address: &str) -> Result<()> {
        self.format.validate(address)
    }

    fn set_authority(&self, address: &str) -> Result<Tx> {
        let authority: AccountKey = address.parse()?;
        self.submit("set_authority", |registry, network, signer| {
            registry.set_network_authority(signer, network, authority)?;
            Ok(())
        })
    }

    fn get_authority(&self) -> Result<String> {
        self.read(|registry, network| Ok(registry.get_authority(network)?.to_string()))
    }

    fn update_stake_configuration(&self, configuration: StakeConfiguration) -> Result<Tx> {
        self.submit("update_stake_configuration", |registry, network, signer| {
            registry.update_stake_configuration(signer, network, configuration)?;
            Ok(())
        })
    }

    fn get_stake_configuration(&self) -> Result<StakeConfiguration> {
        self.read(|registry, network| Ok(registry.get_network(network)?.stake_configuration))
    }

    fn update_reward_configuration(&self, configuration: RewardConfiguration) -> Result<Tx> {
        self.submit("update_reward_configuration", |registry, network, signer| {
            registry.update_reward_configuration(signer, network, configuration)?;
            Ok(())
        })
    }

    fn get_reward_configuration(&self) -> Result<RewardConfiguration> {
        self.read(|registry, network| Ok(registry.get_network(network)?.reward_configuration))
    }

    fn create_reporter(&self, input: CreateReporterInput) -> Result<Tx> {
        let input = hapi_registry::CreateReporterInput {
            id: ReporterId::parse(&input.id)?,
            account: input.account.parse()?,
            role: input.role,
            name: input.name,
            url: input.url,
        };
        self.submit("create_reporter", |registry, network, signer| {
            registry.create_reporter(signer, network, input)?;
            Ok(())
        })
    }

    fn update_reporter(&self, input: UpdateReporterInput) -> Result<Tx> {
        let input = hapi_registry::UpdateReporterInput {
            id: ReporterId::parse(&input.id)?,
            account: input.account.parse()?,
            role: input.role,
            name: input.name,
            url: input.url,
        };
        self.submit("update_reporter", |registry, network, signer| {
            registry.update_reporter(signer, network, input)?;
            Ok(())
        })
    }

    fn get_reporter(&self, id: &str) -> Result<Reporter> {
        let id = ReporterId::parse(id)?;
        self.read(|registry, network| Ok(registry.get_reporter(network, id)?))
    }

    fn get_reporter_count(&self) -> Result<u64> {
        self.read(|registry, network| Ok(registry.get_reporter_count(network)?))
    }

    fn get_reporters(&self, skip: u64, take: u64) -> Result<Vec<Reporter>> {
        self.read(|registry, network| Ok(registry.get_reporters(network, skip, take)?))
    }

    fn activate_reporter(&self) -> Result<Tx> {
        let accounts = self.stake_accounts()?;
        self.submit("activate_reporter", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.activate_reporter(signer, network, id, accounts)?;
            Ok(())
        })
    }

    fn deactivate_reporter(&self) -> Result<Tx> {
        self.submit("deactivate_reporter", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.deactivate_reporter(signer, network, id)?;
            Ok(())
        })
    }

    fn unstake_reporter(&self) -> Result<Tx> {
        let accounts = self.stake_accounts()?;
        self.submit("unstake_reporter", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.unstake_reporter(signer, network, id, accounts)?;
            Ok(())
        })
    }

    fn freeze_reporter(&self, id: &str) -> Result<Tx> {
        let id = ReporterId::parse(id)?;
        self.submit("freeze_reporter", |registry, network, signer| {
            registry.freeze_reporter(signer, network, id)?;
            Ok(())
        })
    }

    fn unfreeze_reporter(&self, id: &str) -> Result<Tx> {
        let id = ReporterId::parse(id)?;
        self.submit("unfreeze_reporter", |registry, network, signer| {
            registry.unfreeze_reporter(signer, network, id)?;
            Ok(())
        })
    }

    fn get_reporter_reward(&self) -> Result<ReporterReward> {
        self.read(|registry, network| {
            let id = signer_reporter(registry, network, &self.options.signer)?;
            Ok(registry.get_reporter_reward(network, id)?)
        })
    }

    fn claim_reporter_reward(&self) -> Result<Tx> {
        let accounts = self.reward_accounts()?;
        self.submit("claim_reporter_reward", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.claim_reporter_reward(signer, network, id, accounts)?;
            Ok(())
        })
    }

    fn create_case(&self, input: CreateCaseInput) -> Result<Tx> {
        let input = hapi_registry::CreateCaseInput {
            id: CaseId::parse(&input.id)?,
            name: input.name,
            url: input.url,
        };
        self.submit("create_case", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.create_case(signer, network, id, input)?;
            Ok(())
        })
    }

    fn update_case(&self, input: UpdateCaseInput) -> Result<Tx> {
        let input = hapi_registry::UpdateCaseInput {
            id: CaseId::parse(&input.id)?,
            name: input.name,
            url: input.url,
            status: input.status,
        };
        self.submit("update_case", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.update_case(signer, network, id, input)?;
            Ok(())
        })
    }

    fn get_case(&self, id: &str) -> Result<Case> {
        let id = CaseId::parse(id)?;
        self.read(|registry, network| Ok(registry.get_case(network, id)?))
    }

    fn get_case_count(&self) -> Result<u64> {
        self.read(|registry, network| Ok(registry.get_case_count(network)?))
    }

    fn get_cases(&self, skip: u64, take: u64) -> Result<Vec<Case>> {
        self.read(|registry, network| Ok(registry.get_cases(network, skip, take)?))
    }

    fn create_address(&self, input: CreateAddressInput) -> Result<Tx> {
        let input = hapi_registry::CreateAddressInput {
            address: self.address_key(&input.address)?,
            case_id: CaseId::parse(&input.case_id)?,
            risk: input.risk,
            category: input.category,
        };
        self.submit("create_address", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.create_address(signer, network, id, input)?;
            Ok(())
        })
    }

    fn update_address(&self, input: UpdateAddressInput) -> Result<Tx> {
        let input = hapi_registry::UpdateAddressInput {
            address: self.address_key(&input.address)?,
            risk: input.risk,
            category: input.category,
        };
        self.submit("update_address", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.update_address(signer, network, id, input)?;
            Ok(())
        })
    }

    fn confirm_address(&self, address: &str) -> Result<Tx> {
        let address = self.address_key(address)?;
        self.submit("confirm_address", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            let case_id = registry.get_address(network, &address)?.case_id;
            registry.confirm_address(signer, network, id, case_id, &address)?;
            Ok(())
        })
    }

    fn get_address(&self, address: &str) -> Result<AddressRecord> {
        let address = self.address_key(address)?;
        self.read(|registry, network| Ok(registry.get_address(network, &address)?))
    }

    fn get_address_count(&self) -> Result<u64> {
        self.read(|registry, network| Ok(registry.get_address_count(network)?))
    }

    fn get_addresses(&self, skip: u64, take: u64) -> Result<Vec<AddressRecord>> {
        self.read(|registry, network| Ok(registry.get_addresses(network, skip, take)?))
    }

    fn create_asset(&self, input: CreateAssetInput) -> Result<Tx> {
        let input = hapi_registry::CreateAssetInput {
            address: self.address_key(&input.address)?,
            asset_id: AssetId::new(&input.asset_id)?,
            case_id: CaseId::parse(&input.case_id)?,
            risk: input.risk,
            category: input.category,
        };
        self.submit("create_asset", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.create_asset(signer, network, id, input)?;
            Ok(())
        })
    }

    fn update_asset(&self, input: UpdateAssetInput) -> Result<Tx> {
        let input = hapi_registry::UpdateAssetInput {
            address: self.address_key(&input.address)?,
            asset_id: AssetId::new(&input.asset_id)?,
            risk: input.risk,
            category: input.category,
        };
        self.submit("update_asset", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            registry.update_asset(signer, network, id, input)?;
            Ok(())
        })
    }

    fn confirm_asset(&self, address: &str, asset_id: &str) -> Result<Tx> {
        let address = self.address_key(address)?;
        let asset_id = AssetId::new(asset_id)?;
        self.submit("confirm_asset", |registry, network, signer| {
            let id = signer_reporter(registry, network, signer)?;
            let case_id = registry.get_asset(network, &address, &asset_id)?.case_id;
            registry.confirm_asset(signer, network, id, case_id, &address, &asset_id)?;
            Ok(())
        })
    }

    fn get_asset(&self, address: &str, asset_id: &str) -> Result<AssetRecord> {
        let address = self.address_key(address)?;
        let asset_id = AssetId::new(asset_id)?;
        self.read(|registry, network| Ok(registry.get_asset(network, &address, &asset_id)?))
    }

    fn get_asset_count(&self) -> Result<u64> {
        self.read(|registry, network| Ok(registry.get_asset_count(network)?))
    }

    fn get_assets(&self, skip: u64, take: u64) -> Result<Vec<AssetRecord>> {
        self.read(|registry, network| Ok(registry.get_assets(network, skip, take)?))
    }
}
