//! Case storage operations.

use super::types::{key_column, now, parse_column};
use super::Storage;
use anyhow::{Context, Result};
use hapi_core::hashing::network_address;
use hapi_core::{Case, CaseId, EntityAddress, NetworkName};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

impl Storage {
    /// Insert or replace a case.
    pub async fn upsert_case(&self, entity: &EntityAddress, case: &Case) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cases (
                entity, network, case_id, name, reporter_id, status, url, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(entity) DO UPDATE SET
                name = excluded.name,
                status = excluded.status,
                url = excluded.url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entity.as_bytes().as_slice())
        .bind(case.network.as_bytes().as_slice())
        .bind(case.id.to_string())
        .bind(&case.name)
        .bind(case.reporter_id.to_string())
        .bind(case.status.as_str())
        .bind(&case.url)
        .bind(now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert case {}", case.id))?;

        Ok(())
    }

    /// Get a case of a network.
    pub async fn get_case(&self, network: &NetworkName, id: CaseId) -> Result<Option<Case>> {
        let row = sqlx::query("SELECT * FROM cases WHERE network = ? AND case_id = ?")
            .bind(network_address(network).as_bytes().as_slice())
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query case")?;

        row.map(|row| case_from_row(&row)).transpose()
    }

    /// Cases of a network in first-seen order.
    pub async fn get_cases(&self, network: &NetworkName, skip: u64, take: u64) -> Result<Vec<Case>> {
        let rows =
            sqlx::query("SELECT * FROM cases WHERE network = ? ORDER BY id ASC LIMIT ? OFFSET ?")
                .bind(network_address(network).as_bytes().as_slice())
                .bind(take.min(i64::MAX as u64) as i64)
                .bind(skip.min(i64::MAX as u64) as i64)
                .fetch_all(&self.pool)
                .await
                .context("Failed to query cases")?;

        rows.iter().map(case_from_row).collect()
    }

    /// Number of cases of a network.
    pub async fn get_case_count(&self, network: &NetworkName) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cases WHERE network = ?")
            .bind(network_address(network).as_bytes().as_slice())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count cases")?;

        Ok(count as u64)
    }
}

fn case_from_row(row: &SqliteRow) -> Result<Case> {
    let case_id: String = row.get("case_id");
    let reporter_id: String = row.get("reporter_id");
    let status: String = row.get("status");

    Ok(Case {
        id: parse_column(&case_id, "case_id")?,
        network: EntityAddress::from(key_column(&row.get::<Vec<u8>, _>("network"), "network")?),
        name: row.get("name"),
        reporter_id: parse_column(&reporter_id, "reporter_id")?,
        status: parse_column(&status, "status")?,
        url: row.get("url"),
    })
}
