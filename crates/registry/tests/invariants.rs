mod common;

use common::{case_id, World, REWARD_POOL};
use hapi_core::{AddressKey, AssetId, Category, ReporterRole};
use hapi_registry::{
    CreateAddressInput, CreateAssetInput, CreateCaseInput, CreateReporterInput, RegistryError,
};

fn address(index: u8) -> AddressKey {
    AddressKey::new(&format!("0x{index:040x}")).unwrap()
}

#[test]
fn second_create_always_fails() -> anyhow::Result<()> {
    let mut world = World::new("eth");
    let publisher = world.active(1, ReporterRole::Publisher);
    let tracer = world.active(2, ReporterRole::Tracer);
    let case = world.open_case(&publisher, 1);

    let duplicate_reporter = world.registry.create_reporter(
        &common::authority(),
        &world.network,
        CreateReporterInput {
            id: publisher.id,
            account: common::key(0x09, 9),
            role: ReporterRole::Validator,
            name: "copy".to_string(),
            url: String::new(),
        },
    );
    assert!(matches!(duplicate_reporter, Err(RegistryError::DuplicateEntity(_))));

    let duplicate_case = world.registry.create_case(
        &publisher.signer,
        &world.network,
        publisher.id,
        CreateCaseInput {
            id: case,
            name: "copy".to_string(),
            url: String::new(),
        },
    );
    assert!(matches!(duplicate_case, Err(RegistryError::DuplicateEntity(_))));

    for actor in [publisher, tracer] {
        let result = world.registry.create_address(
            &actor.signer,
            &world.network,
            actor.id,
            CreateAddressInput {
                address: address(7),
                case_id: case,
                risk: 4,
                category: Category::Scam,
            },
        );
        if actor.id == publisher.id {
            result?;
        } else {
            assert!(matches!(result, Err(RegistryError::DuplicateEntity(_))));
        }
    }

    assert_eq!(world.registry.get_address_count(&world.network)?, 1);
    Ok(())
}

#[test]
fn same_address_on_two_networks_is_independent() -> anyhow::Result<()> {
    let mut eth = World::new("ethereum");
    let mut near = World::new("near");

    for world in [&mut eth, &mut near] {
        let publisher = world.active(1, ReporterRole::Publisher);
        let case = world.open_case(&publisher, 1);
        world.registry.create_address(
            &publisher.signer,
            &world.network,
            publisher.id,
            CreateAddressInput {
                address: address(1),
                case_id: case,
                risk: 2,
                category: Category::Gambling,
            },
        )?;
        assert_eq!(world.registry.get_address_count(&world.network)?, 1);
    }

    Ok(())
}

#[test]
fn frozen_reporter_cannot_act_until_unfrozen() -> anyhow::Result<()> {
    let mut world = World::new("eth");
    let publisher = world.active(1, ReporterRole::Publisher);

    world
        .registry
        .freeze_reporter(&common::authority(), &world.network, publisher.id)?;

    let input = CreateCaseInput {
        id: case_id(1),
        name: "case".to_string(),
        url: String::new(),
    };
    assert_eq!(
        world
            .registry
            .create_case(&publisher.signer, &world.network, publisher.id, input.clone()),
        Err(RegistryError::FrozenReporter)
    );
    assert_eq!(
        world
            .registry
            .deactivate_reporter(&publisher.signer, &world.network, publisher.id),
        Err(RegistryError::FrozenReporter)
    );

    world
        .registry
        .unfreeze_reporter(&common::authority(), &world.network, publisher.id)?;
    world
        .registry
        .create_case(&publisher.signer, &world.network, publisher.id, input)?;

    Ok(())
}

#[test]
fn tokens_are_conserved() -> anyhow::Result<()> {
    let mut world = World::new("eth");
    let publisher = world.active(1, ReporterRole::Publisher);
    let validator = world.active(2, ReporterRole::Validator);
    let tracer = world.active(3, ReporterRole::Tracer);
    let case = world.open_case(&publisher, 1);
    let contract = address(0x20);

    for (index, actor) in [publisher, tracer].into_iter().enumerate() {
        world.registry.create_asset(
            &actor.signer,
            &world.network,
            actor.id,
            CreateAssetInput {
                address: contract,
                asset_id: AssetId::new(&index.to_string())?,
                case_id: case,
                risk: 6,
                category: Category::Theft,
            },
        )?;
    }
    for asset in ["0", "1"] {
        world.registry.confirm_asset(
            &validator.signer,
            &world.network,
            validator.id,
            case,
            &contract,
            &AssetId::new(asset)?,
        )?;
    }

    let staked = 4000 + 2000 + 3000;
    assert_eq!(world.balance(&world.stake_custody), staked);

    let mut paid = 0;
    for actor in [publisher, validator, tracer] {
        paid += world.registry.claim_reporter_reward(
            &actor.signer,
            &world.network,
            actor.id,
            actor.reward,
        )?;
    }
    // 20 per asset report, 2 per asset confirmation
    assert_eq!(paid, 20 + 20 + 2 * 2);
    assert_eq!(world.balance(&world.reward_custody), REWARD_POOL - paid);

    let rewards: u64 = [publisher, validator, tracer]
        .iter()
        .map(|actor| world.balance(&actor.reward.reporter))
        .sum();
    assert_eq!(rewards + world.balance(&world.reward_custody), REWARD_POOL);

    Ok(())
}

#[test]
fn nobody_confirms_their_own_report() -> anyhow::Result<()> {
    let mut world = World::new("eth");
    let tracer = world.active(1, ReporterRole::Tracer);
    let publisher = world.active(2, ReporterRole::Publisher);
    let case = world.open_case(&publisher, 1);

    world.registry.create_address(
        &tracer.signer,
        &world.network,
        tracer.id,
        CreateAddressInput {
            address: address(3),
            case_id: case,
            risk: 10,
            category: Category::Sanctions,
        },
    )?;

    assert_eq!(
        world
            .registry
            .confirm_address(&tracer.signer, &world.network, tracer.id, case, &address(3)),
        Err(RegistryError::Unauthorized)
    );
    world
        .registry
        .confirm_address(&publisher.signer, &world.network, publisher.id, case, &address(3))?;

    Ok(())
}
