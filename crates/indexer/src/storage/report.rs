//! Address and asset storage operations, including consumer risk lookups.

use super::types::{key_column, now, parse_column, RiskReport};
use super::Storage;
use anyhow::{Context, Result};
use hapi_core::hashing::network_address;
use hapi_core::{
    AddressKey, AddressRecord, AssetId, AssetRecord, CaseStatus, EntityAddress, NetworkName,
    RiskScore,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

impl Storage {
    /// Insert or replace a reported address.
    pub async fn upsert_address(&self, entity: &EntityAddress, record: &AddressRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO addresses (
                entity, network, address, category, risk,
                case_id, reporter_id, confirmations, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(entity) DO UPDATE SET
                category = excluded.category,
                risk = excluded.risk,
                confirmations = excluded.confirmations,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entity.as_bytes().as_slice())
        .bind(record.network.as_bytes().as_slice())
        .bind(record.address.to_string())
        .bind(record.category.as_str())
        .bind(record.risk.value() as i32)
        .bind(record.case_id.to_string())
        .bind(record.reporter_id.to_string())
        .bind(record.confirmations as i64)
        .bind(now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert address {}", record.address))?;

        Ok(())
    }

    /// Insert or replace a reported asset.
    pub async fn upsert_asset(&self, entity: &EntityAddress, record: &AssetRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO assets (
                entity, network, address, asset_id, category, risk,
                case_id, reporter_id, confirmations, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(entity) DO UPDATE SET
                category = excluded.category,
                risk = excluded.risk,
                confirmations = excluded.confirmations,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entity.as_bytes().as_slice())
        .bind(record.network.as_bytes().as_slice())
        .bind(record.address.to_string())
        .bind(record.asset_id.to_string())
        .bind(record.category.as_str())
        .bind(record.risk.value() as i32)
        .bind(record.case_id.to_string())
        .bind(record.reporter_id.to_string())
        .bind(record.confirmations as i64)
        .bind(now())
        .execute(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to upsert asset {}/{}",
                record.address, record.asset_id
            )
        })?;

        Ok(())
    }

    /// Get a reported address.
    pub async fn get_address(
        &self,
        network: &NetworkName,
        address: &AddressKey,
    ) -> Result<Option<AddressRecord>> {
        let row = sqlx::query("SELECT * FROM addresses WHERE network = ? AND address = ?")
            .bind(network_address(network).as_bytes().as_slice())
            .bind(address.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query address")?;

        row.map(|row| address_from_row(&row)).transpose()
    }

    /// Reported addresses of a network in first-seen order.
    pub async fn get_addresses(
        &self,
        network: &NetworkName,
        skip: u64,
        take: u64,
    ) -> Result<Vec<AddressRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM addresses WHERE network = ? ORDER BY id ASC LIMIT ? OFFSET ?",
        )
        .bind(network_address(network).as_bytes().as_slice())
        .bind(take.min(i64::MAX as u64) as i64)
        .bind(skip.min(i64::MAX as u64) as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query addresses")?;

        rows.iter().map(address_from_row).collect()
    }

    /// Number of reported addresses of a network.
    pub async fn get_address_count(&self, network: &NetworkName) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE network = ?")
            .bind(network_address(network).as_bytes().as_slice())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count addresses")?;

        Ok(count as u64)
    }

    /// Get a reported asset.
    pub async fn get_asset(
        &self,
        network: &NetworkName,
        address: &AddressKey,
        asset_id: &AssetId,
    ) -> Result<Option<AssetRecord>> {
        let row = sqlx::query(
            "SELECT * FROM assets WHERE network = ? AND address = ? AND asset_id = ?",
        )
        .bind(network_address(network).as_bytes().as_slice())
        .bind(address.to_string())
        .bind(asset_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query asset")?;

        row.map(|row| asset_from_row(&row)).transpose()
    }

    /// Reported assets of a network in first-seen order.
    pub async fn get_assets(
        &self,
        network: &NetworkName,
        skip: u64,
        take: u64,
    ) -> Result<Vec<AssetRecord>> {
        let rows =
            sqlx::query("SELECT * FROM assets WHERE network = ? ORDER BY id ASC LIMIT ? OFFSET ?")
                .bind(network_address(network).as_bytes().as_slice())
                .bind(take.min(i64::MAX as u64) as i64)
                .bind(skip.min(i64::MAX as u64) as i64)
                .fetch_all(&self.pool)
                .await
                .context("Failed to query assets")?;

        rows.iter().map(asset_from_row).collect()
    }

    /// Number of reported assets of a network.
    pub async fn get_asset_count(&self, network: &NetworkName) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets WHERE network = ?")
            .bind(network_address(network).as_bytes().as_slice())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count assets")?;

        Ok(count as u64)
    }

    /// Risk assessment of an address, with the status of its case.
    ///
    /// Returns `None` for addresses nobody reported.
    pub async fn risk_of_address(
        &self,
        network: &NetworkName,
        address: &AddressKey,
    ) -> Result<Option<RiskReport>> {
        let Some(record) = self.get_address(network, address).await? else {
            return Ok(None);
        };
        let case_status = self.case_status(network, &record.case_id.to_string()).await?;

        Ok(Some(RiskReport {
            address: record.address,
            asset_id: None,
            category: record.category,
            risk: record.risk,
            confirmations: record.confirmations,
            reporter_id: record.reporter_id,
            case_id: record.case_id,
            case_status,
        }))
    }

    /// Risk assessment of an asset, with the status of its case.
    pub async fn risk_of_asset(
        &self,
        network: &NetworkName,
        address: &AddressKey,
        asset_id: &AssetId,
    ) -> Result<Option<RiskReport>> {
        let Some(record) = self.get_asset(network, address, asset_id).await? else {
            return Ok(None);
        };
        let case_status = self.case_status(network, &record.case_id.to_string()).await?;

        Ok(Some(RiskReport {
            address: record.address,
            asset_id: Some(record.asset_id),
            category: record.category,
            risk: record.risk,
            confirmations: record.confirmations,
            reporter_id: record.reporter_id,
            case_id: record.case_id,
            case_status,
        }))
    }

    async fn case_status(&self, network: &NetworkName, case_id: &str) -> Result<Option<CaseStatus>> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM cases WHERE network = ? AND case_id = ?")
                .bind(network_address(network).as_bytes().as_slice())
                .bind(case_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to query case status")?;

        status
            .map(|status| parse_column::<CaseStatus>(&status, "status"))
            .transpose()
    }
}

fn risk_column(row: &SqliteRow) -> Result<RiskScore> {
    let risk: i64 = row.get("risk");
    let risk = u8::try_from(risk).with_context(|| format!("Invalid risk value: {}", risk))?;
    RiskScore::new(risk).with_context(|| format!("Invalid risk value: {}", risk))
}

fn address_from_row(row: &SqliteRow) -> Result<AddressRecord> {
    let address: String = row.get("address");
    let category: String = row.get("category");
    let case_id: String = row.get("case_id");
    let reporter_id: String = row.get("reporter_id");

    Ok(AddressRecord {
        network: EntityAddress::from(key_column(&row.get::<Vec<u8>, _>("network"), "network")?),
        address: parse_column(&address, "address")?,
        category: parse_column(&category, "category")?,
        risk: risk_column(row)?,
        case_id: parse_column(&case_id, "case_id")?,
        reporter_id: parse_column(&reporter_id, "reporter_id")?,
        confirmations: row.get::<i64, _>("confirmations") as u32,
    })
}

fn asset_from_row(row: &SqliteRow) -> Result<AssetRecord> {
    let address: String = row.get("address");
    let asset_id: String = row.get("asset_id");
    let category: String = row.get("category");
    let case_id: String = row.get("case_id");
    let reporter_id: String = row.get("reporter_id");

    Ok(AssetRecord {
        network: EntityAddress::from(key_column(&row.get::<Vec<u8>, _>("network"), "network")?),
        address: parse_column(&address, "address")?,
        asset_id: parse_column(&asset_id, "asset_id")?,
        category: parse_column(&category, "category")?,
        risk: risk_column(row)?,
        case_id: parse_column(&case_id, "case_id")?,
        reporter_id: parse_column(&reporter_id, "reporter_id")?,
        confirmations: row.get::<i64, _>("confirmations") as u32,
    })
}

#[cfg(test)]
mod tests {
    use crate::storage::tests::storage;
    use hapi_core::hashing::{address_address, asset_address, case_address, network_address};
    use hapi_core::{
        AddressKey, AddressRecord, AssetId, AssetRecord, Case, CaseId, CaseStatus, Category,
        NetworkName, ReporterId, RiskScore,
    };

    fn ids() -> (ReporterId, CaseId) {
        (
            ReporterId::parse("00000001-0000-4000-8000-000000000000").unwrap(),
            CaseId::parse("00000001-1111-4000-8000-000000000000").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_risk_of_address() {
        let (storage, _temp_db) = storage().await;
        let eth = NetworkName::new("ethereum").unwrap();
        let network = network_address(&eth);
        let (reporter_id, case_id) = ids();
        let address = AddressKey::new("0x8589427373d6d84e98730d7795d8f6f8731fda16").unwrap();

        let unknown = AddressKey::new("0x0000000000000000000000000000000000000001").unwrap();
        assert!(storage.risk_of_address(&eth, &unknown).await.unwrap().is_none());

        let mut record = AddressRecord {
            network,
            address,
            category: Category::Mixer,
            risk: RiskScore::new(3).unwrap(),
            case_id,
            reporter_id,
            confirmations: 0,
        };
        let entity = address_address(&network, &address);
        storage.upsert_address(&entity, &record).await.unwrap();

        // Case not mirrored yet
        let report = storage.risk_of_address(&eth, &address).await.unwrap().unwrap();
        assert_eq!(report.risk.value(), 3);
        assert_eq!(report.case_status, None);

        let case = Case {
            id: case_id,
            network,
            name: "mixer".to_string(),
            reporter_id,
            status: CaseStatus::Closed,
            url: String::new(),
        };
        storage
            .upsert_case(&case_address(&network, case_id), &case)
            .await
            .unwrap();

        record.confirmations = 2;
        record.risk = RiskScore::new(10).unwrap();
        storage.upsert_address(&entity, &record).await.unwrap();

        let report = storage.risk_of_address(&eth, &address).await.unwrap().unwrap();
        assert_eq!(report.category, Category::Mixer);
        assert_eq!(report.risk.value(), 10);
        assert_eq!(report.confirmations, 2);
        assert_eq!(report.case_status, Some(CaseStatus::Closed));
        assert_eq!(storage.get_address_count(&eth).await.unwrap(), 1);
        assert_eq!(storage.get_addresses(&eth, 0, 5).await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_assets_by_contract_and_id() {
        let (storage, _temp_db) = storage().await;
        let eth = NetworkName::new("ethereum").unwrap();
        let network = network_address(&eth);
        let (reporter_id, case_id) = ids();
        let contract = AddressKey::new("0x5fbdb2315678afecb367f032d93f642f64180aa3").unwrap();

        for id in ["1", "2", "3"] {
            let record = AssetRecord {
                network,
                address: contract,
                asset_id: AssetId::new(id).unwrap(),
                category: Category::Counterfeit,
                risk: RiskScore::new(7).unwrap(),
                case_id,
                reporter_id,
                confirmations: 0,
            };
            storage
                .upsert_asset(&asset_address(&network, &contract, &record.asset_id), &record)
                .await
                .unwrap();
        }

        assert_eq!(storage.get_asset_count(&eth).await.unwrap(), 3);
        let page = storage.get_assets(&eth, 2, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].asset_id.to_string(), "3");

        let report = storage
            .risk_of_asset(&eth, &contract, &AssetId::new("2").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.asset_id, Some(AssetId::new("2").unwrap()));
        assert_eq!(report.category, Category::Counterfeit);

        let missing = storage
            .risk_of_asset(&eth, &contract, &AssetId::new("4").unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
