//! Account store: the opaque key-value space records live in.
//!
//! Records are addressed by their derived [`EntityAddress`]. A store applies a
//! [`WriteBatch`] all-or-nothing: if any create targets an occupied address or
//! any update targets an empty one, nothing is written.

use std::collections::{BTreeMap, BTreeSet};

use hapi_core::{EntityAddress, Record, DISCRIMINATOR_LENGTH};

use crate::error::{RegistryError, Result};

/// A single pending write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    /// Occupy an empty address.
    Create {
        /// Target address.
        address: EntityAddress,
        /// Encoded record.
        data: Vec<u8>,
    },
    /// Overwrite an occupied address.
    Update {
        /// Target address.
        address: EntityAddress,
        /// Encoded record.
        data: Vec<u8>,
    },
}

impl Write {
    /// Target address of the write.
    pub fn address(&self) -> &EntityAddress {
        match self {
            Write::Create { address, .. } | Write::Update { address, .. } => address,
        }
    }
}

/// Ordered set of writes committed as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage creation of a record.
    pub fn create<R: Record>(&mut self, address: EntityAddress, record: &R) -> Result<()> {
        self.writes.push(Write::Create {
            address,
            data: record.encode()?,
        });
        Ok(())
    }

    /// Stage an overwrite of a record.
    pub fn update<R: Record>(&mut self, address: EntityAddress, record: &R) -> Result<()> {
        self.writes.push(Write::Update {
            address,
            data: record.encode()?,
        });
        Ok(())
    }

    /// Stage a create or an update depending on `exists`.
    pub fn upsert<R: Record>(&mut self, address: EntityAddress, record: &R, exists: bool) -> Result<()> {
        if exists {
            self.update(address, record)
        } else {
            self.create(address, record)
        }
    }

    /// Staged writes in order.
    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    /// Number of staged writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Key-value account space.
pub trait AccountStore {
    /// Raw bytes stored at `address`, if occupied.
    fn load(&self, address: &EntityAddress) -> Result<Option<Vec<u8>>>;

    /// Apply every write of `batch`, or none of them.
    fn commit(&mut self, batch: WriteBatch) -> Result<()>;

    /// All accounts whose data starts with `discriminator`, in creation order.
    fn accounts(
        &self,
        discriminator: &[u8; DISCRIMINATOR_LENGTH],
    ) -> Result<Vec<(EntityAddress, Vec<u8>)>>;

    /// Whether `address` is occupied.
    fn contains(&self, address: &EntityAddress) -> Result<bool> {
        Ok(self.load(address)?.is_some())
    }
}

/// In-memory account store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    accounts: BTreeMap<EntityAddress, Vec<u8>>,
    order: Vec<EntityAddress>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied addresses.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn check(&self, batch: &WriteBatch) -> Result<()> {
        let mut created = BTreeSet::new();

        for write in batch.writes() {
            match write {
                Write::Create { address, .. } => {
                    if self.accounts.contains_key(address) || !created.insert(*address) {
                        return Err(RegistryError::DuplicateEntity(*address));
                    }
                }
                Write::Update { address, data } => {
                    let current = self
                        .accounts
                        .get(address)
                        .ok_or_else(|| RegistryError::NotFound(format!("account {address}")))?;
                    if current.len() != data.len() {
                        return Err(RegistryError::InvalidData(format!(
                            "account {address} cannot change size from {} to {}",
                            current.len(),
                            data.len()
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl AccountStore for MemoryStore {
    fn load(&self, address: &EntityAddress) -> Result<Option<Vec<u8>>> {
        Ok(self.accounts.get(address).cloned())
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<()> {
        self.check(&batch)?;

        for write in batch.writes {
            match write {
                Write::Create { address, data } => {
                    self.order.push(address);
                    self.accounts.insert(address, data);
                }
                Write::Update { address, data } => {
                    self.accounts.insert(address, data);
                }
            }
        }

        Ok(())
    }

    fn accounts(
        &self,
        discriminator: &[u8; DISCRIMINATOR_LENGTH],
    ) -> Result<Vec<(EntityAddress, Vec<u8>)>> {
        Ok(self
            .order
            .iter()
            .filter_map(|address| {
                self.accounts
                    .get(address)
                    .filter(|data| data.starts_with(discriminator))
                    .map(|data| (*address, data.clone()))
            })
            .collect())
    }
}
