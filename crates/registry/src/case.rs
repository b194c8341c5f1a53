//! Case ledger.

use hapi_core::hashing::case_address;
use hapi_core::{AccountKey, Case, CaseId, CaseStatus, EntityAddress, NetworkName, ReporterId};
use hapi_engine::Action;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{RegistryError, Result};
use crate::ledger::TokenLedger;
use crate::registry::Registry;
use crate::store::{AccountStore, WriteBatch};

/// Parameters of a new case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCaseInput {
    /// Case UUID.
    pub id: CaseId,
    /// Short description.
    pub name: String,
    /// Link to case materials.
    pub url: String,
}

/// New content of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCaseInput {
    /// Case UUID.
    pub id: CaseId,
    /// New description.
    pub name: String,
    /// New link.
    pub url: String,
    /// New status; closing and reopening are both allowed.
    pub status: CaseStatus,
}

impl<S, L, C> Registry<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    /// Open a case as `reporter_id`.
    pub fn create_case(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        reporter_id: ReporterId,
        input: CreateCaseInput,
    ) -> Result<EntityAddress> {
        let (network_address, _) = self.load_network(network_name)?;
        let (_, reporter) = self.acting_reporter(signer, &network_address, reporter_id)?;
        Self::authorize_action(&reporter, Action::CreateCase, true)?;
        input.id.validate()?;

        let address = case_address(&network_address, input.id);
        if self.store.contains(&address)? {
            return Err(RegistryError::DuplicateEntity(address));
        }

        let case = Case {
            id: input.id,
            network: network_address,
            name: input.name,
            reporter_id,
            status: CaseStatus::Open,
            url: input.url,
        };

        let mut batch = WriteBatch::new();
        batch.create(address, &case)?;
        self.store.commit(batch)?;

        info!(network = %network_name, case = %case.id, reporter = %reporter_id, "Case created");

        Ok(address)
    }

    /// Rename, relink, close or reopen a case.
    pub fn update_case(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        reporter_id: ReporterId,
        input: UpdateCaseInput,
    ) -> Result<EntityAddress> {
        let (network_address, _) = self.load_network(network_name)?;
        let (_, reporter) = self.acting_reporter(signer, &network_address, reporter_id)?;
        let (address, mut case) = self.load_case(&network_address, input.id)?;
        Self::authorize_action(&reporter, Action::UpdateCase, case.reporter_id == reporter.id)?;

        let previous = case.status;
        case.name = input.name;
        case.url = input.url;
        case.status = input.status;

        let mut batch = WriteBatch::new();
        batch.update(address, &case)?;
        self.store.commit(batch)?;

        if previous != case.status {
            info!(network = %network_name, case = %case.id, status = %case.status, "Case status changed");
        } else {
            info!(network = %network_name, case = %case.id, "Case updated");
        }

        Ok(address)
    }

    /// Fetch a case.
    pub fn get_case(&self, network_name: &NetworkName, id: CaseId) -> Result<Case> {
        let (network_address, _) = self.load_network(network_name)?;
        self.load_case(&network_address, id).map(|(_, case)| case)
    }

    /// Load a case referenced by an address or asset and require it to be open.
    pub(crate) fn open_case(&self, network: &EntityAddress, id: CaseId) -> Result<Case> {
        let (_, case) = self.load_case(network, id)?;
        if case.status != CaseStatus::Open {
            return Err(RegistryError::CaseClosed);
        }
        Ok(case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{case_id, Harness};
    use hapi_core::ReporterRole;

    fn update(id: CaseId, status: CaseStatus) -> UpdateCaseInput {
        UpdateCaseInput {
            id,
            name: "renamed".to_string(),
            url: "https://cases.example/renamed".to_string(),
            status,
        }
    }

    #[test]
    fn test_create_case() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);
        let id = h.case(&publisher, 1);

        let case = h.registry.get_case(&h.network, id).unwrap();
        assert_eq!(case.status, CaseStatus::Open);
        assert_eq!(case.reporter_id, publisher.id);
        assert_eq!(case.name, "case 1");
    }

    #[test]
    fn test_case_creation_rights() {
        let mut h = Harness::new();
        for (index, role) in [(1, ReporterRole::Validator), (2, ReporterRole::Tracer)] {
            let actor = h.active(index, role);
            let input = CreateCaseInput {
                id: case_id(index),
                name: "nope".to_string(),
                url: String::new(),
            };
            assert_eq!(
                h.registry
                    .create_case(&actor.signer, &h.network, actor.id, input),
                Err(RegistryError::Unauthorized)
            );
        }

        let authority = h.active(3, ReporterRole::Authority);
        h.case(&authority, 3);
    }

    #[test]
    fn test_inactive_publisher_cannot_create_case() {
        let mut h = Harness::new();
        let actor = h.reporter_with_funds(1, ReporterRole::Publisher, 0);
        let input = CreateCaseInput {
            id: case_id(1),
            name: "case".to_string(),
            url: String::new(),
        };

        assert_eq!(
            h.registry
                .create_case(&actor.signer, &h.network, actor.id, input),
            Err(RegistryError::InvalidReporterStatus)
        );
    }

    #[test]
    fn test_case_id_must_be_v4() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);

        for key in [
            0x9b1deb4d_3b7d_1bad_9bdd_2b0d7b3dcb6d_u128,
            0x9b1deb4d_3b7d_4bad_1bdd_2b0d7b3dcb6d_u128,
        ] {
            let input = CreateCaseInput {
                id: CaseId::from(key),
                name: "case".to_string(),
                url: String::new(),
            };
            assert!(matches!(
                h.registry
                    .create_case(&publisher.signer, &h.network, publisher.id, input),
                Err(RegistryError::InvalidUuid(_))
            ));
        }
        assert_eq!(h.registry.get_case_count(&h.network).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_case() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);
        let other = h.active(2, ReporterRole::Publisher);
        h.case(&publisher, 1);

        let input = CreateCaseInput {
            id: case_id(1),
            name: "another".to_string(),
            url: String::new(),
        };
        assert!(matches!(
            h.registry
                .create_case(&other.signer, &h.network, other.id, input),
            Err(RegistryError::DuplicateEntity(_))
        ));
    }

    #[test]
    fn test_update_case_by_owner_and_authority() {
        let mut h = Harness::new();
        let owner = h.active(1, ReporterRole::Publisher);
        let stranger = h.active(2, ReporterRole::Publisher);
        let authority = h.active(3, ReporterRole::Authority);
        let id = h.case(&owner, 1);

        assert_eq!(
            h.registry.update_case(
                &stranger.signer,
                &h.network,
                stranger.id,
                update(id, CaseStatus::Closed)
            ),
            Err(RegistryError::Unauthorized)
        );

        h.registry
            .update_case(&owner.signer, &h.network, owner.id, update(id, CaseStatus::Closed))
            .unwrap();
        assert_eq!(
            h.registry.get_case(&h.network, id).unwrap().status,
            CaseStatus::Closed
        );

        // Authority can reopen a case it does not own
        h.registry
            .update_case(
                &authority.signer,
                &h.network,
                authority.id,
                update(id, CaseStatus::Open),
            )
            .unwrap();
        let case = h.registry.get_case(&h.network, id).unwrap();
        assert_eq!(case.status, CaseStatus::Open);
        assert_eq!(case.reporter_id, owner.id);
    }

    #[test]
    fn test_update_unknown_case() {
        let mut h = Harness::new();
        let owner = h.active(1, ReporterRole::Publisher);

        assert!(matches!(
            h.registry.update_case(
                &owner.signer,
                &h.network,
                owner.id,
                update(case_id(9), CaseStatus::Closed)
            ),
            Err(RegistryError::NotFound(_))
        ));
    }
}
