//! Address ledger and address confirmations.

use hapi_core::hashing::{address_address, confirmation_address};
use hapi_core::{
    AccountKey, AddressKey, AddressRecord, CaseId, Category, Confirmation, EntityAddress,
    NetworkName, ReporterId, RiskScore,
};
use hapi_engine::Action;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{RegistryError, Result};
use crate::ledger::TokenLedger;
use crate::registry::Registry;
use crate::reward::RewardKind;
use crate::store::{AccountStore, WriteBatch};

/// Parameters of a new address report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAddressInput {
    /// The flagged address.
    pub address: AddressKey,
    /// Case the address belongs to.
    pub case_id: CaseId,
    /// Risk score, `0..=10`.
    pub risk: u8,
    /// Primary category.
    pub category: Category,
}

/// New assessment of a reported address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAddressInput {
    /// The flagged address.
    pub address: AddressKey,
    /// New risk score, `0..=10`.
    pub risk: u8,
    /// New category.
    pub category: Category,
}

impl<S, L, C> Registry<S, L, C>
where
    S: AccountStore,
    L: TokenLedger,
    C: Clock,
{
    /// Report an address.
    pub fn create_address(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        reporter_id: ReporterId,
        input: CreateAddressInput,
    ) -> Result<EntityAddress> {
        let (network_address, _) = self.load_network(network_name)?;
        let (_, reporter) = self.acting_reporter(signer, &network_address, reporter_id)?;
        Self::authorize_action(&reporter, Action::CreateAddress, true)?;
        let risk = RiskScore::new(input.risk)?;
        self.open_case(&network_address, input.case_id)?;

        let address = address_address(&network_address, &input.address);
        if self.store.contains(&address)? {
            return Err(RegistryError::DuplicateEntity(address));
        }

        let record = AddressRecord {
            network: network_address,
            address: input.address,
            category: input.category,
            risk,
            case_id: input.case_id,
            reporter_id,
            confirmations: 0,
        };

        let mut batch = WriteBatch::new();
        batch.create(address, &record)?;
        self.stage_reward(&mut batch, &network_address, reporter_id, RewardKind::AddressTracer)?;
        self.store.commit(batch)?;

        info!(
            network = %network_name,
            address = %record.address,
            case = %record.case_id,
            reporter = %reporter_id,
            risk = %record.risk,
            category = %record.category,
            "Address created"
        );

        Ok(address)
    }

    /// Change the risk or category of a reported address.
    pub fn update_address(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        reporter_id: ReporterId,
        input: UpdateAddressInput,
    ) -> Result<EntityAddress> {
        let (network_address, _) = self.load_network(network_name)?;
        let (_, reporter) = self.acting_reporter(signer, &network_address, reporter_id)?;
        let (address, mut record) = self.load_address(&network_address, &input.address)?;
        Self::authorize_action(&reporter, Action::UpdateAddress, record.reporter_id == reporter.id)?;
        let risk = RiskScore::new(input.risk)?;
        self.open_case(&network_address, record.case_id)?;

        record.risk = risk;
        record.category = input.category;

        let mut batch = WriteBatch::new();
        batch.update(address, &record)?;
        self.store.commit(batch)?;

        info!(
            network = %network_name,
            address = %record.address,
            risk = %record.risk,
            category = %record.category,
            "Address updated"
        );

        Ok(address)
    }

    /// Corroborate an address reported by someone else.
    ///
    /// `case_id` must name the open case the address belongs to. Each reporter
    /// confirms a given address at most once.
    pub fn confirm_address(
        &mut self,
        signer: &AccountKey,
        network_name: &NetworkName,
        reporter_id: ReporterId,
        case_id: CaseId,
        address: &AddressKey,
    ) -> Result<EntityAddress> {
        let (network_address, _) = self.load_network(network_name)?;
        let (_, reporter) = self.acting_reporter(signer, &network_address, reporter_id)?;
        let (entity, mut record) = self.load_address(&network_address, address)?;
        Self::authorize_action(&reporter, Action::ConfirmAddress, record.reporter_id == reporter.id)?;
        let case = self.open_case(&network_address, case_id)?;
        if case.id != record.case_id {
            return Err(RegistryError::CaseMismatch);
        }

        let confirmation_key = confirmation_address(&entity, reporter_id);
        if self.store.contains(&confirmation_key)? {
            return Err(RegistryError::DuplicateEntity(confirmation_key));
        }

        record.confirmations = record
            .confirmations
            .checked_add(1)
            .ok_or(RegistryError::ArithmeticOverflow)?;

        let confirmation = Confirmation {
            network: network_address,
            account: entity,
            reporter_id,
        };

        let mut batch = WriteBatch::new();
        batch.create(confirmation_key, &confirmation)?;
        batch.update(entity, &record)?;
        self.stage_reward(
            &mut batch,
            &network_address,
            reporter_id,
            RewardKind::AddressConfirmation,
        )?;
        self.store.commit(batch)?;

        info!(
            network = %network_name,
            address = %record.address,
            reporter = %reporter_id,
            confirmations = record.confirmations,
            "Address confirmed"
        );

        Ok(confirmation_key)
    }

    /// Fetch a reported address.
    pub fn get_address(&self, network_name: &NetworkName, address: &AddressKey) -> Result<AddressRecord> {
        let (network_address, _) = self.load_network(network_name)?;
        self.load_address(&network_address, address).map(|(_, record)| record)
    }

    fn load_address(
        &self,
        network: &EntityAddress,
        address: &AddressKey,
    ) -> Result<(EntityAddress, AddressRecord)> {
        let entity = address_address(network, address);
        let record = self
            .load_record::<AddressRecord>(&entity)?
            .ok_or_else(|| RegistryError::NotFound(format!("address {address}")))?;
        Ok((entity, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::UpdateCaseInput;
    use crate::testing::{case_id, Actor, Harness};
    use hapi_core::{CaseStatus, ReporterRole};

    fn flagged() -> AddressKey {
        AddressKey::new("0x922ffdfcb57de5dd6f641f275e98b684ce5576a3").unwrap()
    }

    fn create(h: &mut Harness, actor: &Actor, case: CaseId, risk: u8) -> Result<EntityAddress> {
        h.registry.create_address(
            &actor.signer,
            &h.network,
            actor.id,
            CreateAddressInput {
                address: flagged(),
                case_id: case,
                risk,
                category: Category::Mixer,
            },
        )
    }

    fn update(h: &mut Harness, actor: &Actor, risk: u8) -> Result<EntityAddress> {
        h.registry.update_address(
            &actor.signer,
            &h.network,
            actor.id,
            UpdateAddressInput {
                address: flagged(),
                risk,
                category: Category::Scam,
            },
        )
    }

    fn confirm(h: &mut Harness, actor: &Actor, case: CaseId) -> Result<EntityAddress> {
        h.registry
            .confirm_address(&actor.signer, &h.network, actor.id, case, &flagged())
    }

    #[test]
    fn test_create_address() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);
        let case = h.case(&publisher, 1);

        create(&mut h, &publisher, case, 3).unwrap();

        let record = h.registry.get_address(&h.network, &flagged()).unwrap();
        assert_eq!(record.risk.value(), 3);
        assert_eq!(record.category, Category::Mixer);
        assert_eq!(record.confirmations, 0);
        assert_eq!(record.reporter_id, publisher.id);
        assert_eq!(record.case_id, case);

        let reward = h.registry.get_reporter_reward(&h.network, publisher.id).unwrap();
        assert_eq!(reward.address_tracer_counter, 1);
    }

    #[test]
    fn test_risk_bound() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);
        let case = h.case(&publisher, 1);

        assert_eq!(
            create(&mut h, &publisher, case, 11),
            Err(RegistryError::RiskOutOfRange(11))
        );
        create(&mut h, &publisher, case, 10).unwrap();

        assert_eq!(update(&mut h, &publisher, 11), Err(RegistryError::RiskOutOfRange(11)));
        update(&mut h, &publisher, 0).unwrap();
        assert_eq!(
            h.registry.get_address(&h.network, &flagged()).unwrap().risk.value(),
            0
        );
    }

    #[test]
    fn test_validator_cannot_create() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);
        let validator = h.active(2, ReporterRole::Validator);
        let case = h.case(&publisher, 1);

        assert_eq!(
            create(&mut h, &validator, case, 5),
            Err(RegistryError::Unauthorized)
        );
    }

    #[test]
    fn test_tracer_creates_but_cannot_update() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);
        let tracer = h.active(2, ReporterRole::Tracer);
        let case = h.case(&publisher, 1);

        create(&mut h, &tracer, case, 5).unwrap();
        assert_eq!(update(&mut h, &tracer, 6), Err(RegistryError::Unauthorized));
    }

    #[test]
    fn test_missing_case() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);

        assert!(matches!(
            create(&mut h, &publisher, case_id(42), 5),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_confirmation_protocol() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);
        let validator = h.active(2, ReporterRole::Validator);
        let tracer = h.active(3, ReporterRole::Tracer);
        let authority = h.active(4, ReporterRole::Authority);
        let case = h.case(&publisher, 1);
        create(&mut h, &publisher, case, 3).unwrap();

        assert_eq!(confirm(&mut h, &publisher, case), Err(RegistryError::Unauthorized));
        assert_eq!(confirm(&mut h, &authority, case), Err(RegistryError::Unauthorized));

        confirm(&mut h, &validator, case).unwrap();
        confirm(&mut h, &tracer, case).unwrap();
        assert!(matches!(
            confirm(&mut h, &validator, case),
            Err(RegistryError::DuplicateEntity(_))
        ));

        let record = h.registry.get_address(&h.network, &flagged()).unwrap();
        assert_eq!(record.confirmations, 2);

        let reward = h.registry.get_reporter_reward(&h.network, validator.id).unwrap();
        assert_eq!(reward.address_confirmation_counter, 1);
        assert_eq!(reward.address_tracer_counter, 0);
    }

    #[test]
    fn test_confirmation_case_checks() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);
        let validator = h.active(2, ReporterRole::Validator);
        let case = h.case(&publisher, 1);
        let other_case = h.case(&publisher, 2);
        create(&mut h, &publisher, case, 3).unwrap();

        assert_eq!(
            confirm(&mut h, &validator, other_case),
            Err(RegistryError::CaseMismatch)
        );

        h.registry
            .update_case(
                &publisher.signer,
                &h.network,
                publisher.id,
                UpdateCaseInput {
                    id: case,
                    name: "case 1".to_string(),
                    url: String::new(),
                    status: CaseStatus::Closed,
                },
            )
            .unwrap();
        assert_eq!(confirm(&mut h, &validator, case), Err(RegistryError::CaseClosed));
        assert_eq!(
            h.registry.get_address(&h.network, &flagged()).unwrap().confirmations,
            0
        );
    }

    #[test]
    fn test_frozen_reporter_is_blocked_before_role_checks() {
        let mut h = Harness::new();
        let publisher = h.active(1, ReporterRole::Publisher);
        let validator = h.active(2, ReporterRole::Validator);
        let case = h.case(&publisher, 1);

        h.registry
            .freeze_reporter(&crate::testing::authority(), &h.network, validator.id)
            .unwrap();
        assert_eq!(
            create(&mut h, &validator, case, 5),
            Err(RegistryError::FrozenReporter)
        );
    }
}
