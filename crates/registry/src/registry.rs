//! The registry handle and checks shared by every operation.

use hapi_core::hashing::{case_address, network_address, reporter_address};
use hapi_core::{
    AccountKey, Amount, Case, CaseId, EntityAddress, Network, NetworkName, Record, Reporter,
    ReporterId, ReporterStatus, TokenId,
};
use hapi_engine::{authorize, Action};
use tracing::warn;

use crate::clock::{Clock, SystemClock};
use crate::error::{RegistryError, Result};
use crate::ledger::{TokenAccount, TokenLedger};
use crate::store::{AccountStore, WriteBatch};

/// The HAPI registry state machine.
///
/// Operations are serialized through `&mut self`. Each one validates every
/// check first, then moves tokens (if any) and commits a single
/// [`WriteBatch`]. A failed check leaves both the store and the ledger
/// untouched.
#[derive(Debug)]
pub struct Registry<S, L, C = SystemClock> {
    program_authority: AccountKey,
    pub(crate) store: S,
    pub(crate) ledger: L,
    pub(crate) clock: C,
}

impl<S, L, C> Registry<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    /// Create a registry administered by `program_authority`.
    pub fn new(program_authority: AccountKey, store: S, ledger: L, clock: C) -> Self {
        Self {
            program_authority,
            store,
            ledger,
            clock,
        }
    }

    /// Key allowed to create networks.
    pub fn program_authority(&self) -> &AccountKey {
        &self.program_authority
    }

    /// Underlying account store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying token ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable token ledger, for funding accounts outside the registry.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn load_record<R: Record>(&self, address: &EntityAddress) -> Result<Option<R>> {
        match self.store.load(address)? {
            Some(data) => Ok(Some(R::decode(&data)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn load_network(&self, name: &NetworkName) -> Result<(EntityAddress, Network)> {
        let address = network_address(name);
        let network = self
            .load_record::<Network>(&address)?
            .ok_or_else(|| RegistryError::NotFound(format!("network {name}")))?;
        Ok((address, network))
    }

    pub(crate) fn load_reporter(
        &self,
        network: &EntityAddress,
        id: ReporterId,
    ) -> Result<(EntityAddress, Reporter)> {
        let address = reporter_address(network, id);
        let reporter = self
            .load_record::<Reporter>(&address)?
            .ok_or_else(|| RegistryError::NotFound(format!("reporter {id}")))?;
        Ok((address, reporter))
    }

    pub(crate) fn load_case(&self, network: &EntityAddress, id: CaseId) -> Result<(EntityAddress, Case)> {
        let address = case_address(network, id);
        let case = self
            .load_record::<Case>(&address)?
            .ok_or_else(|| RegistryError::NotFound(format!("case {id}")))?;
        Ok((address, case))
    }

    /// Load the reporter acting as `signer`, rejecting impostors and frozen reporters.
    pub(crate) fn acting_reporter(
        &self,
        signer: &AccountKey,
        network: &EntityAddress,
        id: ReporterId,
    ) -> Result<(EntityAddress, Reporter)> {
        let (address, reporter) = self.load_reporter(network, id)?;

        if reporter.account != *signer {
            return Err(RegistryError::InvalidReporter);
        }
        if reporter.is_frozen {
            return Err(RegistryError::FrozenReporter);
        }

        Ok((address, reporter))
    }

    /// Role check followed by the activity check.
    pub(crate) fn authorize_action(
        reporter: &Reporter,
        action: Action,
        is_owner: bool,
    ) -> Result<()> {
        if !authorize(reporter.role, action, is_owner) {
            return Err(RegistryError::Unauthorized);
        }
        if reporter.status != ReporterStatus::Active {
            return Err(RegistryError::InvalidReporterStatus);
        }
        Ok(())
    }

    pub(crate) fn require_network_authority(signer: &AccountKey, network: &Network) -> Result<()> {
        if network.authority != *signer {
            return Err(RegistryError::AuthorityMismatch);
        }
        Ok(())
    }

    /// Check that a supplied token account holds `mint` and belongs to `owner`.
    pub(crate) fn token_account(
        &self,
        id: &AccountKey,
        mint: &TokenId,
        owner: &AccountKey,
    ) -> Result<TokenAccount> {
        let account = self.ledger.account(id)?;

        if account.mint != *mint {
            return Err(RegistryError::InvalidToken);
        }
        if account.owner != *owner {
            return Err(RegistryError::IllegalOwner);
        }

        Ok(account)
    }

    /// Move tokens, then commit the batch; reverse the transfer if the commit fails.
    pub(crate) fn commit_with_transfer(
        &mut self,
        batch: WriteBatch,
        from: &AccountKey,
        to: &AccountKey,
        amount: Amount,
    ) -> Result<()> {
        if amount > 0 {
            self.ledger.transfer(from, to, amount)?;
        }

        if let Err(err) = self.store.commit(batch) {
            if amount > 0 {
                if let Err(revert) = self.ledger.transfer(to, from, amount) {
                    warn!(error = %revert, amount, "Failed to reverse transfer after rejected commit");
                }
            }
            return Err(err);
        }

        Ok(())
    }
}
