//! # Ops Repository
//!
//! Append-only operational records: application log lines persisted for
//! the admin UI, and rendered simulation reports. Both are optionally
//! scoped to a tenant; rows with no tenant are platform-wide.

use crate::error::RepositoryError;
use crate::models::app_log::{
    ActiveModel as AppLogActiveModel, Column as AppLogColumn, Entity as AppLog,
    Model as AppLogModel,
};
use crate::models::simulation_report::{
    ActiveModel as ReportActiveModel, Column as ReportColumn, Entity as SimulationReport,
    Model as ReportModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde_json::Value;
use uuid::Uuid;

const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Repository for persisted logs and simulation reports
pub struct OpsRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OpsRepository<'a> {
    /// Create a new OpsRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append one log record.
    pub async fn append_log(
        &self,
        tenant_id: Option<Uuid>,
        level: &str,
        message: &str,
        extra: Option<Value>,
    ) -> Result<AppLogModel, RepositoryError> {
        let level = level.to_ascii_lowercase();
        if !KNOWN_LEVELS.contains(&level.as_str()) {
            return Err(RepositoryError::validation_error(format!(
                "Unknown log level '{level}'"
            )));
        }

        AppLogActiveModel {
            id: NotSet,
            tenant_id: Set(tenant_id),
            level: Set(level),
            message: Set(message.to_string()),
            extra: Set(extra),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// List the most recent log records for a tenant, newest first.
    pub async fn list_logs(
        &self,
        tenant_id: Option<Uuid>,
        limit: u64,
    ) -> Result<Vec<AppLogModel>, RepositoryError> {
        let mut query = AppLog::find();
        query = match tenant_id {
            Some(tenant_id) => query.filter(AppLogColumn::TenantId.eq(tenant_id)),
            None => query.filter(AppLogColumn::TenantId.is_null()),
        };

        query
            .order_by_desc(AppLogColumn::CreatedAt)
            .limit(limit)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Store a rendered simulation report.
    pub async fn append_report(
        &self,
        tenant_id: Option<Uuid>,
        name: &str,
        html: &str,
    ) -> Result<ReportModel, RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Report name cannot be empty",
            ));
        }

        ReportActiveModel {
            id: NotSet,
            tenant_id: Set(tenant_id),
            name: Set(name.to_string()),
            html: Set(html.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// List reports for a tenant, newest first.
    pub async fn list_reports(
        &self,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<ReportModel>, RepositoryError> {
        let mut query = SimulationReport::find();
        query = match tenant_id {
            Some(tenant_id) => query.filter(ReportColumn::TenantId.eq(tenant_id)),
            None => query.filter(ReportColumn::TenantId.is_null()),
        };

        query
            .order_by_desc(ReportColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
