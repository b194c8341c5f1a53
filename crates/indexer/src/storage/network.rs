//! Network storage operations.

use super::types::{key_column, now, parse_column};
use super::Storage;
use anyhow::{Context, Result};
use hapi_core::{
    AccountKey, EntityAddress, Network, NetworkName, RewardConfiguration, StakeConfiguration,
    TokenId,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const NETWORK_COLUMNS: &str = r#"
    name, authority, schema,
    stake_token, unlock_duration,
    validator_stake, tracer_stake, publisher_stake, authority_stake,
    reward_token,
    address_tracer_reward, address_confirmation_reward,
    asset_tracer_reward, asset_confirmation_reward
"#;

impl Storage {
    /// Insert or replace a network.
    pub async fn upsert_network(&self, entity: &EntityAddress, network: &Network) -> Result<()> {
        let stake = &network.stake_configuration;
        let reward = &network.reward_configuration;

        sqlx::query(
            r#"
            INSERT INTO networks (
                entity, name, authority, schema,
                stake_token, unlock_duration,
                validator_stake, tracer_stake, publisher_stake, authority_stake,
                reward_token,
                address_tracer_reward, address_confirmation_reward,
                asset_tracer_reward, asset_confirmation_reward,
                updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(entity) DO UPDATE SET
                authority = excluded.authority,
                schema = excluded.schema,
                stake_token = excluded.stake_token,
                unlock_duration = excluded.unlock_duration,
                validator_stake = excluded.validator_stake,
                tracer_stake = excluded.tracer_stake,
                publisher_stake = excluded.publisher_stake,
                authority_stake = excluded.authority_stake,
                reward_token = excluded.reward_token,
                address_tracer_reward = excluded.address_tracer_reward,
                address_confirmation_reward = excluded.address_confirmation_reward,
                asset_tracer_reward = excluded.asset_tracer_reward,
                asset_confirmation_reward = excluded.asset_confirmation_reward,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entity.as_bytes().as_slice())
        .bind(network.name.to_string())
        .bind(network.authority.as_bytes().as_slice())
        .bind(network.schema.as_str())
        .bind(network.stake_token.as_bytes().as_slice())
        .bind(stake.unlock_duration as i64)
        .bind(stake.validator_stake as i64)
        .bind(stake.tracer_stake as i64)
        .bind(stake.publisher_stake as i64)
        .bind(stake.authority_stake as i64)
        .bind(network.reward_token.as_bytes().as_slice())
        .bind(reward.address_tracer_reward as i64)
        .bind(reward.address_confirmation_reward as i64)
        .bind(reward.asset_tracer_reward as i64)
        .bind(reward.asset_confirmation_reward as i64)
        .bind(now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert network {}", network.name))?;

        Ok(())
    }

    /// Get a network by name.
    pub async fn get_network(&self, name: &NetworkName) -> Result<Option<Network>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM networks WHERE name = ?",
            NETWORK_COLUMNS
        ))
        .bind(name.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query network")?;

        row.map(|row| network_from_row(&row)).transpose()
    }

    /// All networks in first-seen order.
    pub async fn get_networks(&self) -> Result<Vec<Network>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM networks ORDER BY id ASC",
            NETWORK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to query networks")?;

        rows.iter().map(network_from_row).collect()
    }
}

fn network_from_row(row: &SqliteRow) -> Result<Network> {
    let name: String = row.get("name");
    let schema: String = row.get("schema");

    Ok(Network {
        authority: AccountKey::from(key_column(&row.get::<Vec<u8>, _>("authority"), "authority")?),
        name: parse_column::<NetworkName>(&name, "name")?,
        schema: parse_column(&schema, "schema")?,
        stake_token: TokenId::from(key_column(
            &row.get::<Vec<u8>, _>("stake_token"),
            "stake_token",
        )?),
        stake_configuration: StakeConfiguration {
            unlock_duration: row.get::<i64, _>("unlock_duration") as u64,
            validator_stake: row.get::<i64, _>("validator_stake") as u64,
            tracer_stake: row.get::<i64, _>("tracer_stake") as u64,
            publisher_stake: row.get::<i64, _>("publisher_stake") as u64,
            authority_stake: row.get::<i64, _>("authority_stake") as u64,
        },
        reward_token: TokenId::from(key_column(
            &row.get::<Vec<u8>, _>("reward_token"),
            "reward_token",
        )?),
        reward_configuration: RewardConfiguration {
            address_tracer_reward: row.get::<i64, _>("address_tracer_reward") as u64,
            address_confirmation_reward: row.get::<i64, _>("address_confirmation_reward") as u64,
            asset_tracer_reward: row.get::<i64, _>("asset_tracer_reward") as u64,
            asset_confirmation_reward: row.get::<i64, _>("asset_confirmation_reward") as u64,
        },
    })
}
