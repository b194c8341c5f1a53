//! Reporter reward counter storage.

use super::types::{key_column, now, parse_column};
use super::Storage;
use anyhow::{Context, Result};
use hapi_core::hashing::network_address;
use hapi_core::{EntityAddress, NetworkName, ReporterId, ReporterReward};
use sqlx::Row;

impl Storage {
    /// Insert or replace a reporter's reward counters.
    pub async fn upsert_reporter_reward(
        &self,
        entity: &EntityAddress,
        reward: &ReporterReward,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reporter_rewards (
                entity, network, reporter_id,
                address_tracer_counter, address_confirmation_counter,
                asset_tracer_counter, asset_confirmation_counter,
                updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(entity) DO UPDATE SET
                address_tracer_counter = excluded.address_tracer_counter,
                address_confirmation_counter = excluded.address_confirmation_counter,
                asset_tracer_counter = excluded.asset_tracer_counter,
                asset_confirmation_counter = excluded.asset_confirmation_counter,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entity.as_bytes().as_slice())
        .bind(reward.network.as_bytes().as_slice())
        .bind(reward.reporter_id.to_string())
        .bind(reward.address_tracer_counter as i64)
        .bind(reward.address_confirmation_counter as i64)
        .bind(reward.asset_tracer_counter as i64)
        .bind(reward.asset_confirmation_counter as i64)
        .bind(now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert reward of reporter {}", reward.reporter_id))?;

        Ok(())
    }

    /// Pending reward counters of a reporter, if any were mirrored.
    pub async fn get_reporter_reward(
        &self,
        network: &NetworkName,
        reporter_id: ReporterId,
    ) -> Result<Option<ReporterReward>> {
        let row = sqlx::query(
            "SELECT * FROM reporter_rewards WHERE network = ? AND reporter_id = ?",
        )
        .bind(network_address(network).as_bytes().as_slice())
        .bind(reporter_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query reporter reward")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let reporter_id: String = row.get("reporter_id");

        Ok(Some(ReporterReward {
            network: EntityAddress::from(key_column(
                &row.get::<Vec<u8>, _>("network"),
                "network",
            )?),
            reporter_id: parse_column(&reporter_id, "reporter_id")?,
            address_tracer_counter: row.get::<i64, _>("address_tracer_counter") as u64,
            address_confirmation_counter: row.get::<i64, _>("address_confirmation_counter") as u64,
            asset_tracer_counter: row.get::<i64, _>("asset_tracer_counter") as u64,
            asset_confirmation_counter: row.get::<i64, _>("asset_confirmation_counter") as u64,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::tests::storage;
    use hapi_core::hashing::{network_address, reporter_reward_address};
    use hapi_core::{NetworkName, ReporterId, ReporterReward};

    #[tokio::test]
    async fn test_reward_counters_roundtrip() {
        let (storage, _temp_db) = storage().await;
        let eth = NetworkName::new("ethereum").unwrap();
        let network = network_address(&eth);
        let id = ReporterId::parse("00000001-0000-4000-8000-000000000000").unwrap();

        assert_eq!(storage.get_reporter_reward(&eth, id).await.unwrap(), None);

        let mut reward = ReporterReward::new(network, id);
        reward.address_tracer_counter = 3;
        reward.asset_confirmation_counter = 1;
        let entity = reporter_reward_address(&network, id);
        storage.upsert_reporter_reward(&entity, &reward).await.unwrap();
        assert_eq!(
            storage.get_reporter_reward(&eth, id).await.unwrap(),
            Some(reward.clone())
        );

        reward.reset();
        storage.upsert_reporter_reward(&entity, &reward).await.unwrap();
        let stored = storage.get_reporter_reward(&eth, id).await.unwrap().unwrap();
        assert_eq!(stored.address_tracer_counter, 0);
        assert_eq!(stored.asset_confirmation_counter, 0);
    }
}
