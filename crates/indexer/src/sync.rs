//! Mirroring registry records into the database.
//!
//! The registry keeps its state as fixed-layout records in an
//! [`AccountStore`]. A sync pass enumerates every record type by its
//! discriminator, decodes it and upserts it under its entity address, so
//! repeated passes converge on the store's current state.

use anyhow::{Context, Result};
use hapi_core::{
    AddressRecord, AssetRecord, Case, EntityAddress, Network, Record, Reporter, ReporterReward,
};
use hapi_registry::AccountStore;
use tracing::{debug, info};

use crate::storage::Storage;

/// Number of records mirrored per type by one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Networks upserted
    pub networks: u64,
    /// Reporters upserted
    pub reporters: u64,
    /// Cases upserted
    pub cases: u64,
    /// Addresses upserted
    pub addresses: u64,
    /// Assets upserted
    pub assets: u64,
    /// Reward counter records upserted
    pub rewards: u64,
}

impl SyncReport {
    /// Total number of records mirrored.
    pub fn total(&self) -> u64 {
        self.networks + self.reporters + self.cases + self.addresses + self.assets + self.rewards
    }
}

/// Mirrors an account store into [`Storage`].
#[derive(Debug, Clone)]
pub struct Indexer {
    storage: Storage,
}

impl Indexer {
    /// Create an indexer writing into `storage`.
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The storage this indexer writes into.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Snapshot every record of `store` into the database.
    pub async fn sync<S: AccountStore>(&self, store: &S) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for (entity, network) in decode_all::<Network, _>(store)? {
            self.storage.upsert_network(&entity, &network).await?;
            report.networks += 1;
        }
        for (entity, reporter) in decode_all::<Reporter, _>(store)? {
            self.storage.upsert_reporter(&entity, &reporter).await?;
            report.reporters += 1;
        }
        for (entity, case) in decode_all::<Case, _>(store)? {
            self.storage.upsert_case(&entity, &case).await?;
            report.cases += 1;
        }
        for (entity, record) in decode_all::<AddressRecord, _>(store)? {
            self.storage.upsert_address(&entity, &record).await?;
            report.addresses += 1;
        }
        for (entity, record) in decode_all::<AssetRecord, _>(store)? {
            self.storage.upsert_asset(&entity, &record).await?;
            report.assets += 1;
        }
        for (entity, reward) in decode_all::<ReporterReward, _>(store)? {
            self.storage.upsert_reporter_reward(&entity, &reward).await?;
            report.rewards += 1;
        }

        info!(
            networks = report.networks,
            reporters = report.reporters,
            cases = report.cases,
            addresses = report.addresses,
            assets = report.assets,
            rewards = report.rewards,
            "Sync pass completed"
        );

        Ok(report)
    }
}

fn decode_all<R: Record, S: AccountStore>(store: &S) -> Result<Vec<(EntityAddress, R)>> {
    let accounts = store
        .accounts(&R::discriminator())
        .with_context(|| format!("Failed to enumerate {} records", R::NAME))?;
    debug!(kind = R::NAME, count = accounts.len(), "Decoding records");

    accounts
        .into_iter()
        .map(|(entity, data)| {
            let record = R::decode(&data)
                .with_context(|| format!("Failed to decode {} record {}", R::NAME, entity))?;
            Ok((entity, record))
        })
        .collect()
}
