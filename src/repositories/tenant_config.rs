//! # Tenant Config Repository
//!
//! Versioned per-tenant configuration with exactly-one-active-version
//! semantics. Activation is a single transaction: deactivate the current
//! row, insert the successor with version = max + 1. The partial unique
//! index idx_tenant_configs_one_active backs the invariant declaratively,
//! so a losing concurrent activation fails with Conflict at commit and is
//! retried by the caller instead of double-activating.

use crate::config_split::{SplitSide, derive_if_absent, split_config};
use crate::error::RepositoryError;
use crate::models::tenant::Entity as Tenant;
use crate::models::tenant_config::{
    ActiveModel as TenantConfigActiveModel, Column as TenantConfigColumn, Entity as TenantConfig,
    Model as TenantConfigModel,
};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::Value;
use uuid::Uuid;

/// Version metadata without the payload bodies, for listings.
#[derive(Debug, Clone, FromQueryResult)]
pub struct ConfigVersion {
    pub id: Uuid,
    pub version: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

/// The active configuration for a tenant, with the derived split payloads
/// always populated. Rows written before the split migration carry NULL
/// derived columns; those are computed here at read time and not written
/// back.
#[derive(Debug, Clone)]
pub struct ActiveConfig {
    pub tenant_id: Uuid,
    pub version: i32,
    pub config: Value,
    pub app_config: Value,
    pub sim_config: Value,
    pub created_at: DateTimeWithTimeZone,
}

/// Repository for TenantConfig database operations
pub struct TenantConfigRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TenantConfigRepository<'a> {
    /// Create a new TenantConfigRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Activate a new configuration version for a tenant.
    ///
    /// Computes the next version number (max existing + 1, or 1),
    /// deactivates the currently active row, and inserts the new active
    /// row, all in one transaction. Concurrent activations for the same
    /// tenant serialize on the partial unique index: the loser gets a
    /// [`RepositoryError::Conflict`] and should retry.
    pub async fn activate_config(
        &self,
        tenant_id: Uuid,
        payload: Value,
    ) -> Result<TenantConfigModel, RepositoryError> {
        if !payload.is_object() {
            return Err(RepositoryError::validation_error(
                "Config payload must be a JSON object",
            ));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let tenant = Tenant::find_by_id(tenant_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        if tenant.is_none() {
            return Err(RepositoryError::NotFound(format!(
                "Tenant {tenant_id} not found"
            )));
        }

        let latest = TenantConfig::find()
            .filter(TenantConfigColumn::TenantId.eq(tenant_id))
            .order_by_desc(TenantConfigColumn::Version)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        let next_version = latest.as_ref().map_or(1, |m| m.version + 1);

        let current_active = TenantConfig::find()
            .filter(TenantConfigColumn::TenantId.eq(tenant_id))
            .filter(TenantConfigColumn::IsActive.eq(true))
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        if let Some(active) = current_active {
            let mut deactivated = active.into_active_model();
            deactivated.is_active = Set(false);
            deactivated
                .update(&txn)
                .await
                .map_err(RepositoryError::database_error)?;
        }

        let (app_config, sim_config) = split_config(&payload);
        let inserted = TenantConfigActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            version: Set(next_version),
            is_active: Set(true),
            config: Set(payload),
            app_config: Set(Some(app_config)),
            sim_config: Set(Some(sim_config)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(
            tenant_id = %tenant_id,
            version = next_version,
            "activated tenant config"
        );

        Ok(inserted)
    }

    /// Get the unique active configuration for a tenant.
    pub async fn get_active_config(
        &self,
        tenant_id: Uuid,
    ) -> Result<ActiveConfig, RepositoryError> {
        let row = TenantConfig::find()
            .filter(TenantConfigColumn::TenantId.eq(tenant_id))
            .filter(TenantConfigColumn::IsActive.eq(true))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("No active config for tenant {tenant_id}"))
            })?;

        // Rows that predate the split migration are derived here, never
        // written back by the read path.
        let app_config = match derive_if_absent(row.app_config.as_ref(), &row.config, SplitSide::App)
        {
            Some(derived) => derived,
            None => row.app_config.clone().unwrap_or(Value::Null),
        };
        let sim_config = match derive_if_absent(row.sim_config.as_ref(), &row.config, SplitSide::Sim)
        {
            Some(derived) => derived,
            None => row.sim_config.clone().unwrap_or(Value::Null),
        };

        Ok(ActiveConfig {
            tenant_id: row.tenant_id,
            version: row.version,
            config: row.config,
            app_config,
            sim_config,
            created_at: row.created_at,
        })
    }

    /// List version metadata for a tenant, descending by version. Payload
    /// bodies are not selected.
    pub async fn list_versions(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<ConfigVersion>, RepositoryError> {
        TenantConfig::find()
            .select_only()
            .column(TenantConfigColumn::Id)
            .column(TenantConfigColumn::Version)
            .column(TenantConfigColumn::IsActive)
            .column(TenantConfigColumn::CreatedAt)
            .filter(TenantConfigColumn::TenantId.eq(tenant_id))
            .order_by_desc(TenantConfigColumn::Version)
            .into_model::<ConfigVersion>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup_test_db;
    use crate::repositories::{CreateTenantRequest, TenantRepository};
    use sea_orm::{ConnectionTrait, PaginatorTrait, Statement};
    use serde_json::json;

    async fn setup_tenant(db: &DatabaseConnection) -> Uuid {
        TenantRepository::new(db)
            .create_tenant(CreateTenantRequest {
                name: "Acme Motors".to_string(),
                slug: "acme".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_first_activation_is_version_one() {
        let db = setup_test_db().await;
        let tenant_id = setup_tenant(&db).await;
        let repo = TenantConfigRepository::new(&db);

        let model = repo
            .activate_config(tenant_id, json!({"ui": {"theme": "dark"}}))
            .await
            .unwrap();

        assert_eq!(model.version, 1);
        assert!(model.is_active);
    }

    #[tokio::test]
    async fn test_activation_supersedes_previous_version() {
        let db = setup_test_db().await;
        let tenant_id = setup_tenant(&db).await;
        let repo = TenantConfigRepository::new(&db);

        let v1 = repo
            .activate_config(tenant_id, json!({"payload": "A"}))
            .await
            .unwrap();
        let v2 = repo
            .activate_config(tenant_id, json!({"payload": "B"}))
            .await
            .unwrap();

        assert_eq!(v1.version, 1);
        assert_eq!(v2.version, 2);
        assert!(v2.is_active);

        let v1_row = TenantConfig::find_by_id(v1.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(!v1_row.is_active);

        let active = repo.get_active_config(tenant_id).await.unwrap();
        assert_eq!(active.version, 2);
        assert_eq!(active.config, json!({"payload": "B"}));
    }

    #[tokio::test]
    async fn test_at_most_one_active_row() {
        let db = setup_test_db().await;
        let tenant_id = setup_tenant(&db).await;
        let repo = TenantConfigRepository::new(&db);

        for i in 0..5 {
            repo.activate_config(tenant_id, json!({"round": i}))
                .await
                .unwrap();
        }

        let active_count = TenantConfig::find()
            .filter(TenantConfigColumn::TenantId.eq(tenant_id))
            .filter(TenantConfigColumn::IsActive.eq(true))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(active_count, 1);

        let versions = repo.list_versions(tenant_id).await.unwrap();
        assert_eq!(
            versions.iter().map(|v| v.version).collect::<Vec<_>>(),
            vec![5, 4, 3, 2, 1]
        );
    }

    #[tokio::test]
    async fn test_activation_for_unknown_tenant_is_not_found() {
        let db = setup_test_db().await;
        let repo = TenantConfigRepository::new(&db);

        let err = repo
            .activate_config(Uuid::new_v4(), json!({}))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_non_object_payload_is_validation_error() {
        let db = setup_test_db().await;
        let tenant_id = setup_tenant(&db).await;
        let repo = TenantConfigRepository::new(&db);

        let err = repo
            .activate_config(tenant_id, json!(["not", "an", "object"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_activation_splits_payload() {
        let db = setup_test_db().await;
        let tenant_id = setup_tenant(&db).await;
        let repo = TenantConfigRepository::new(&db);

        repo.activate_config(
            tenant_id,
            json!({"carla": {"port": 2000}, "dashboard": {"rows": 4}}),
        )
        .await
        .unwrap();

        let active = repo.get_active_config(tenant_id).await.unwrap();
        assert_eq!(active.app_config, json!({"dashboard": {"rows": 4}}));
        assert_eq!(active.sim_config, json!({"carla": {"port": 2000}}));
    }

    #[tokio::test]
    async fn test_get_active_config_derives_for_legacy_rows() {
        let db = setup_test_db().await;
        let tenant_id = setup_tenant(&db).await;

        // Simulate a row written before the split migration: combined
        // blob only, derived columns NULL. Bind the UUIDs so they are
        // stored with the same encoding the entities use.
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO tenant_configs (id, tenant_id, version, is_active, config, created_at) \
             VALUES (?, ?, 1, true, '{\"carla\":{\"port\":2000},\"ui\":{\"theme\":\"dark\"}}', CURRENT_TIMESTAMP)",
            [Uuid::new_v4().into(), tenant_id.into()],
        ))
        .await
        .unwrap();

        let repo = TenantConfigRepository::new(&db);
        let active = repo.get_active_config(tenant_id).await.unwrap();
        assert_eq!(active.app_config, json!({"ui": {"theme": "dark"}}));
        assert_eq!(active.sim_config, json!({"carla": {"port": 2000}}));
    }

    #[tokio::test]
    async fn test_get_active_config_missing_is_not_found() {
        let db = setup_test_db().await;
        let tenant_id = setup_tenant(&db).await;
        let repo = TenantConfigRepository::new(&db);

        let err = repo.get_active_config(tenant_id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
