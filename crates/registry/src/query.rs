//! Paged reads and counts over a network's records.
//!
//! Paging is a plain offset/limit over the store's enumeration of a record
//! type, in creation order.

use hapi_core::{AddressRecord, AssetRecord, Case, EntityAddress, NetworkName, Record, Reporter};

use crate::clock::Clock;
use crate::error::Result;
use crate::ledger::TokenLedger;
use crate::registry::Registry;
use crate::store::AccountStore;

/// Records that belong to exactly one network.
pub trait NetworkScoped: Record {
    /// Network entity address of the record.
    fn network(&self) -> &EntityAddress;
}

impl NetworkScoped for Reporter {
    fn network(&self) -> &EntityAddress {
        &self.network
    }
}

impl NetworkScoped for Case {
    fn network(&self) -> &EntityAddress {
        &self.network
    }
}

impl NetworkScoped for AddressRecord {
    fn network(&self) -> &EntityAddress {
        &self.network
    }
}

impl NetworkScoped for AssetRecord {
    fn network(&self) -> &EntityAddress {
        &self.network
    }
}

impl<S, L, C> Registry<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    fn scan<R: NetworkScoped>(&self, network_name: &NetworkName) -> Result<Vec<R>> {
        let (network_address, _) = self.load_network(network_name)?;

        let mut records = Vec::new();
        for (_, data) in self.store.accounts(&R::discriminator())? {
            let record = R::decode(&data)?;
            if *record.network() == network_address {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn page<R: NetworkScoped>(&self, network_name: &NetworkName, skip: u64, take: u64) -> Result<Vec<R>> {
        Ok(self
            .scan::<R>(network_name)?
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(take).unwrap_or(usize::MAX))
            .collect())
    }

    fn count<R: NetworkScoped>(&self, network_name: &NetworkName) -> Result<u64> {
        Ok(self.scan::<R>(network_name)?.len() as u64)
    }

    /// Reporters of a network, paged.
    pub fn get_reporters(&self, network_name: &NetworkName, skip: u64, take: u64) -> Result<Vec<Reporter>> {
        self.page(network_name, skip, take)
    }

    /// Number of reporters of a network.
    pub fn get_reporter_count(&self, network_name: &NetworkName) -> Result<u64> {
        self.count::<Reporter>(network_name)
    }

    /// Cases of a network, paged.
    pub fn get_cases(&self, network_name: &NetworkName, skip: u64, take: u64) -> Result<Vec<Case>> {
        self.page(network_name, skip, take)
    }

    /// Number of cases of a network.
    pub fn get_case_count(&self, network_name: &NetworkName) -> Result<u64> {
        self.count::<Case>(network_name)
    }

    /// Reported addresses of a network, paged.
    pub fn get_addresses(
        &self,
        network_name: &NetworkName,
        skip: u64,
        take: u64,
    ) -> Result<Vec<AddressRecord>> {
        self.page(network_name, skip, take)
    }

    /// Number of reported addresses of a network.
    pub fn get_address_count(&self, network_name: &NetworkName) -> Result<u64> {
        self.count::<AddressRecord>(network_name)
    }

    /// Reported assets of a network, paged.
    pub fn get_assets(
        &self,
        network_name: &NetworkName,
        skip: u64,
        take: u64,
    ) -> Result<Vec<AssetRecord>> {
        self.page(network_name, skip, take)
    }

    /// Number of reported assets of a network.
    pub fn get_asset_count(&self, network_name: &NetworkName) -> Result<u64> {
        self.count::<AssetRecord>(network_name)
    }
}
