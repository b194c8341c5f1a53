//! Reporter storage operations.

use super::types::{key_column, now, parse_column};
use super::Storage;
use anyhow::{Context, Result};
use hapi_core::hashing::network_address;
use hapi_core::{AccountKey, EntityAddress, NetworkName, Reporter, ReporterId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

impl Storage {
    /// Insert or replace a reporter.
    pub async fn upsert_reporter(&self, entity: &EntityAddress, reporter: &Reporter) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reporters (
                entity, network, reporter_id, account, name, role, status,
                stake, unlock_time, is_frozen, url, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(entity) DO UPDATE SET
                account = excluded.account,
                name = excluded.name,
                role = excluded.role,
                status = excluded.status,
                stake = excluded.stake,
                unlock_time = excluded.unlock_time,
                is_frozen = excluded.is_frozen,
                url = excluded.url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entity.as_bytes().as_slice())
        .bind(reporter.network.as_bytes().as_slice())
        .bind(reporter.id.to_string())
        .bind(reporter.account.as_bytes().as_slice())
        .bind(&reporter.name)
        .bind(reporter.role.as_str())
        .bind(reporter.status.as_str())
        .bind(reporter.stake as i64)
        .bind(reporter.unlock_time as i64)
        .bind(reporter.is_frozen)
        .bind(&reporter.url)
        .bind(now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert reporter {}", reporter.id))?;

        Ok(())
    }

    /// Get a reporter of a network.
    pub async fn get_reporter(
        &self,
        network: &NetworkName,
        id: ReporterId,
    ) -> Result<Option<Reporter>> {
        let row = sqlx::query("SELECT * FROM reporters WHERE network = ? AND reporter_id = ?")
            .bind(network_address(network).as_bytes().as_slice())
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query reporter")?;

        row.map(|row| reporter_from_row(&row)).transpose()
    }

    /// Reporters of a network in first-seen order.
    pub async fn get_reporters(
        &self,
        network: &NetworkName,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Reporter>> {
        let rows = sqlx::query(
            "SELECT * FROM reporters WHERE network = ? ORDER BY id ASC LIMIT ? OFFSET ?",
        )
        .bind(network_address(network).as_bytes().as_slice())
        .bind(take.min(i64::MAX as u64) as i64)
        .bind(skip.min(i64::MAX as u64) as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query reporters")?;

        rows.iter().map(reporter_from_row).collect()
    }

    /// Number of reporters of a network.
    pub async fn get_reporter_count(&self, network: &NetworkName) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reporters WHERE network = ?")
            .bind(network_address(network).as_bytes().as_slice())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count reporters")?;

        Ok(count as u64)
    }
}

fn reporter_from_row(row: &SqliteRow) -> Result<Reporter> {
    let reporter_id: String = row.get("reporter_id");
    let role: String = row.get("role");
    let status: String = row.get("status");

    Ok(Reporter {
        id: parse_column(&reporter_id, "reporter_id")?,
        network: EntityAddress::from(key_column(&row.get::<Vec<u8>, _>("network"), "network")?),
        account: AccountKey::from(key_column(&row.get::<Vec<u8>, _>("account"), "account")?),
        name: row.get("name"),
        role: parse_column(&role, "role")?,
        status: parse_column(&status, "status")?,
        stake: row.get::<i64, _>("stake") as u64,
        unlock_time: row.get::<i64, _>("unlock_time") as u64,
        is_frozen: row.get("is_frozen"),
        url: row.get("url"),
    })
}

#[cfg(test)]
mod tests {
    use crate::storage::tests::storage;
    use hapi_core::hashing::{network_address, reporter_address};
    use hapi_core::{NetworkName, Reporter, ReporterId, ReporterRole, ReporterStatus};

    fn reporter(network: &NetworkName, index: u8) -> Reporter {
        Reporter {
            id: ReporterId::parse(&format!("{index:08x}-0000-4000-8000-000000000000")).unwrap(),
            network: network_address(network),
            account: [index; 32].into(),
            name: format!("reporter {index}"),
            role: ReporterRole::Tracer,
            status: ReporterStatus::Inactive,
            stake: 0,
            unlock_time: 0,
            is_frozen: false,
            url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_reporter_upsert_keeps_order() {
        let (storage, _temp_db) = storage().await;
        let eth = NetworkName::new("ethereum").unwrap();

        let mut reporters: Vec<_> = (1..=3).map(|i| reporter(&eth, i)).collect();
        for r in &reporters {
            storage
                .upsert_reporter(&reporter_address(&r.network, r.id), r)
                .await
                .unwrap();
        }

        // Updating the first reporter must not move it to the end
        reporters[0].status = ReporterStatus::Active;
        reporters[0].stake = 3000;
        reporters[0].is_frozen = true;
        let first = &reporters[0];
        storage
            .upsert_reporter(&reporter_address(&first.network, first.id), first)
            .await
            .unwrap();

        assert_eq!(storage.get_reporter_count(&eth).await.unwrap(), 3);
        assert_eq!(storage.get_reporters(&eth, 0, 10).await.unwrap(), reporters);
        assert_eq!(
            storage.get_reporters(&eth, 1, 1).await.unwrap(),
            vec![reporters[1].clone()]
        );
        assert_eq!(
            storage.get_reporter(&eth, reporters[0].id).await.unwrap(),
            Some(reporters[0].clone())
        );

        let near = NetworkName::new("near").unwrap();
        assert_eq!(storage.get_reporter_count(&near).await.unwrap(), 0);
    }
}
