//! # Drift Migrator
//!
//! Convergence pass that runs after the baseline migrations and brings a
//! live database up to the current expected shape without keeping its own
//! ledger. Every step probes the database catalog first and only applies
//! what is missing, so running the pass twice is identical to running it
//! once. Steps are ordered; a hard failure stops the pass and reports
//! which step failed.
//!
//! The pass covers the schema changes that accreted on production
//! databases after their baseline was cut: the app/sim config split
//! columns and their backfill, the one-active-config guard index, the
//! descending telemetry indexes, the active-config view, and role grants
//! on backends that have roles.

pub mod probes;

use crate::config_split::{SplitSide, derive_if_absent};
use crate::models::tenant_config::{Column as ConfigColumn, Entity as TenantConfig};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, RuntimeErr, Set, Statement,
    TransactionTrait,
};
use thiserror::Error;

/// Composite telemetry indexes the pass maintains, newest-first reads.
const TELEMETRY_INDEXES: &[(&str, &str)] = &[
    ("idx_vehicle_data_scenario_ts", "vehicle_data"),
    ("idx_sensor_data_scenario_ts", "sensor_data"),
    ("idx_simulation_metrics_scenario_ts", "simulation_metrics"),
];

const ONE_ACTIVE_INDEX: &str = "idx_tenant_configs_one_active";
const ACTIVE_CONFIGS_VIEW: &str = "v_active_tenant_configs";

#[derive(Debug, Error)]
pub enum DriftError {
    #[error("drift step '{step}' failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: DbErr,
    },
}

/// What one step did (or would do, for a dry run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step found drift and fixed it.
    Applied,
    /// The database already matched; nothing to do.
    AlreadyPresent,
    /// The backend cannot express this step; skipped without error.
    SkippedUnsupported,
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: &'static str,
    pub outcome: StepOutcome,
}

/// Outcome of a full pass, one entry per step in execution order.
#[derive(Debug, Clone, Default)]
pub struct DriftReport {
    pub steps: Vec<StepReport>,
}

impl DriftReport {
    fn record(&mut self, name: &'static str, outcome: StepOutcome) {
        tracing::info!(step = name, ?outcome, "drift step finished");
        self.steps.push(StepReport { name, outcome });
    }

    pub fn applied(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Applied)
            .count()
    }

    pub fn outcome_of(&self, name: &str) -> Option<StepOutcome> {
        self.steps.iter().find(|s| s.name == name).map(|s| s.outcome)
    }
}

/// Probe-before-apply schema convergence for a single database.
pub struct DriftMigrator<'a> {
    db: &'a DatabaseConnection,
    app_role: Option<String>,
}

impl<'a> DriftMigrator<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db, app_role: None }
    }

    /// Set the database role that should receive grants on Postgres.
    pub fn with_app_role(mut self, role: impl Into<String>) -> Self {
        self.app_role = Some(role.into());
        self
    }

    /// Run the full pass, applying whatever is missing.
    pub async fn run(&self) -> Result<DriftReport, DriftError> {
        let mut report = DriftReport::default();

        report.record("config_split_columns", self.ensure_split_columns().await?);
        report.record("config_split_backfill", self.backfill_split_columns().await?);
        report.record("one_active_guard", self.ensure_one_active_guard().await?);
        report.record("telemetry_indexes", self.ensure_telemetry_indexes().await?);
        report.record("active_configs_view", self.ensure_active_configs_view().await?);
        report.record("role_grants", self.ensure_role_grants().await?);

        Ok(report)
    }

    /// Dry run: probe every step and report what `run` would do, without
    /// touching the database.
    pub async fn plan(&self) -> Result<DriftReport, DriftError> {
        let mut report = DriftReport::default();

        let columns_missing = !probes::column_exists(self.db, "tenant_configs", "app_config")
            .await
            .map_err(step_err("config_split_columns"))?
            || !probes::column_exists(self.db, "tenant_configs", "sim_config")
                .await
                .map_err(step_err("config_split_columns"))?;
        report.record(
            "config_split_columns",
            if columns_missing {
                StepOutcome::Applied
            } else {
                StepOutcome::AlreadyPresent
            },
        );

        let backfill_outcome = if columns_missing {
            // Columns do not exist yet, so every row would be backfilled.
            StepOutcome::Applied
        } else {
            let pending = TenantConfig::find()
                .filter(
                    Condition::any()
                        .add(ConfigColumn::AppConfig.is_null())
                        .add(ConfigColumn::SimConfig.is_null()),
                )
                .count(self.db)
                .await
                .map_err(step_err("config_split_backfill"))?;
            if pending > 0 {
                StepOutcome::Applied
            } else {
                StepOutcome::AlreadyPresent
            }
        };
        report.record("config_split_backfill", backfill_outcome);

        let guard_missing = !probes::index_exists(self.db, ONE_ACTIVE_INDEX)
            .await
            .map_err(step_err("one_active_guard"))?;
        report.record(
            "one_active_guard",
            if guard_missing {
                StepOutcome::Applied
            } else {
                StepOutcome::AlreadyPresent
            },
        );

        let mut any_index_missing = false;
        for (name, _table) in TELEMETRY_INDEXES {
            if !probes::index_exists(self.db, name)
                .await
                .map_err(step_err("telemetry_indexes"))?
            {
                any_index_missing = true;
            }
        }
        report.record(
            "telemetry_indexes",
            if any_index_missing {
                StepOutcome::Applied
            } else {
                StepOutcome::AlreadyPresent
            },
        );

        let view_missing = !probes::view_exists(self.db, ACTIVE_CONFIGS_VIEW)
            .await
            .map_err(step_err("active_configs_view"))?;
        report.record(
            "active_configs_view",
            if view_missing {
                StepOutcome::Applied
            } else {
                StepOutcome::AlreadyPresent
            },
        );

        report.record("role_grants", self.plan_role_grants().await?);

        Ok(report)
    }

    /// Add the app_config / sim_config columns when missing.
    async fn ensure_split_columns(&self) -> Result<StepOutcome, DriftError> {
        let step = "config_split_columns";
        let json_type = match self.db.get_database_backend() {
            DatabaseBackend::Postgres => "jsonb",
            _ => "json",
        };

        let mut added = false;
        for column in ["app_config", "sim_config"] {
            let exists = probes::column_exists(self.db, "tenant_configs", column)
                .await
                .map_err(step_err(step))?;
            if exists {
                continue;
            }
            self.execute(
                step,
                &format!("ALTER TABLE tenant_configs ADD COLUMN {column} {json_type}"),
            )
            .await?;
            added = true;
        }

        Ok(if added {
            StepOutcome::Applied
        } else {
            StepOutcome::AlreadyPresent
        })
    }

    /// Derive app/sim splits for rows that predate the split columns.
    ///
    /// Never clobbers a non-null split value. Runs in a single
    /// transaction so a crash mid-backfill leaves the database either
    /// fully converged or exactly as before.
    async fn backfill_split_columns(&self) -> Result<StepOutcome, DriftError> {
        let step = "config_split_backfill";
        let txn = self.db.begin().await.map_err(step_err(step))?;

        let pending = TenantConfig::find()
            .filter(
                Condition::any()
                    .add(ConfigColumn::AppConfig.is_null())
                    .add(ConfigColumn::SimConfig.is_null()),
            )
            .all(&txn)
            .await
            .map_err(step_err(step))?;

        let mut updated = 0usize;
        for row in pending {
            let app = derive_if_absent(row.app_config.as_ref(), &row.config, SplitSide::App);
            let sim = derive_if_absent(row.sim_config.as_ref(), &row.config, SplitSide::Sim);
            if app.is_none() && sim.is_none() {
                continue;
            }

            let mut active = row.into_active_model();
            if let Some(value) = app {
                active.app_config = Set(Some(value));
            }
            if let Some(value) = sim {
                active.sim_config = Set(Some(value));
            }
            sea_orm::ActiveModelTrait::update(active, &txn)
                .await
                .map_err(step_err(step))?;
            updated += 1;
        }

        txn.commit().await.map_err(step_err(step))?;

        if updated > 0 {
            tracing::info!(rows = updated, "backfilled config split columns");
            Ok(StepOutcome::Applied)
        } else {
            Ok(StepOutcome::AlreadyPresent)
        }
    }

    /// Partial unique index enforcing at most one active config per tenant.
    async fn ensure_one_active_guard(&self) -> Result<StepOutcome, DriftError> {
        let step = "one_active_guard";
        if probes::index_exists(self.db, ONE_ACTIVE_INDEX)
            .await
            .map_err(step_err(step))?
        {
            return Ok(StepOutcome::AlreadyPresent);
        }

        self.execute(
            step,
            &format!(
                "CREATE UNIQUE INDEX {ONE_ACTIVE_INDEX} \
                 ON tenant_configs (tenant_id) WHERE is_active"
            ),
        )
        .await?;
        Ok(StepOutcome::Applied)
    }

    /// Composite (scenario_id, timestamp DESC) indexes, best-effort.
    ///
    /// Index creation failures with a known-benign SQLSTATE are logged
    /// and skipped rather than failing the pass; the store works without
    /// these indexes, just slower.
    async fn ensure_telemetry_indexes(&self) -> Result<StepOutcome, DriftError> {
        let step = "telemetry_indexes";
        let mut applied = false;
        let mut skipped = false;

        for (name, table) in TELEMETRY_INDEXES {
            if probes::index_exists(self.db, name)
                .await
                .map_err(step_err(step))?
            {
                continue;
            }

            let sql = format!("CREATE INDEX {name} ON {table} (scenario_id, timestamp DESC)");
            let stmt = Statement::from_string(self.db.get_database_backend(), sql);
            match self.db.execute(stmt).await {
                Ok(_) => applied = true,
                Err(err) => match sql_state(&err).as_deref() {
                    // 42P07: someone else created it concurrently.
                    Some("42P07") => {}
                    // 42704 / 0A000: target missing or descending
                    // composite indexes unsupported on this backend.
                    Some(code @ ("42704" | "0A000")) => {
                        tracing::warn!(index = name, code, "skipping telemetry index");
                        skipped = true;
                    }
                    _ => return Err(DriftError::Step { step, source: err }),
                },
            }
        }

        Ok(if applied {
            StepOutcome::Applied
        } else if skipped {
            StepOutcome::SkippedUnsupported
        } else {
            StepOutcome::AlreadyPresent
        })
    }

    /// Read-model view joining each tenant to its active config.
    async fn ensure_active_configs_view(&self) -> Result<StepOutcome, DriftError> {
        let step = "active_configs_view";
        if probes::view_exists(self.db, ACTIVE_CONFIGS_VIEW)
            .await
            .map_err(step_err(step))?
        {
            return Ok(StepOutcome::AlreadyPresent);
        }

        self.execute(
            step,
            &format!(
                "CREATE VIEW {ACTIVE_CONFIGS_VIEW} AS \
                 SELECT t.slug AS tenant_slug, c.tenant_id, c.id AS config_id, \
                        c.version, c.config, c.app_config, c.sim_config, c.created_at \
                 FROM tenant_configs c \
                 JOIN tenants t ON t.id = c.tenant_id \
                 WHERE c.is_active"
            ),
        )
        .await?;
        Ok(StepOutcome::Applied)
    }

    /// Grant the application role read/write on the data tables.
    /// Postgres only; other backends have no role system.
    async fn ensure_role_grants(&self) -> Result<StepOutcome, DriftError> {
        let step = "role_grants";
        if self.db.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(StepOutcome::SkippedUnsupported);
        }
        let Some(role) = self.app_role.as_deref() else {
            return Ok(StepOutcome::SkippedUnsupported);
        };
        if !probes::role_exists(self.db, role)
            .await
            .map_err(step_err(step))?
        {
            tracing::warn!(role, "application role does not exist, skipping grants");
            return Ok(StepOutcome::SkippedUnsupported);
        }

        for table in [
            "tenants",
            "tenant_configs",
            "scenarios",
            "vehicle_data",
            "sensor_data",
            "simulation_metrics",
            "carla_metadata",
            "app_logs",
            "simulation_reports",
        ] {
            self.execute(
                step,
                &format!("GRANT SELECT, INSERT, UPDATE, DELETE ON {table} TO \"{role}\""),
            )
            .await?;
        }
        self.execute(step, &format!("GRANT SELECT ON {ACTIVE_CONFIGS_VIEW} TO \"{role}\""))
            .await?;

        Ok(StepOutcome::Applied)
    }

    async fn plan_role_grants(&self) -> Result<StepOutcome, DriftError> {
        if self.db.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(StepOutcome::SkippedUnsupported);
        }
        let Some(role) = self.app_role.as_deref() else {
            return Ok(StepOutcome::SkippedUnsupported);
        };
        if probes::role_exists(self.db, role)
            .await
            .map_err(step_err("role_grants"))?
        {
            Ok(StepOutcome::Applied)
        } else {
            Ok(StepOutcome::SkippedUnsupported)
        }
    }

    async fn execute(&self, step: &'static str, sql: &str) -> Result<(), DriftError> {
        let stmt = Statement::from_string(self.db.get_database_backend(), sql.to_string());
        self.db
            .execute(stmt)
            .await
            .map(|_| ())
            .map_err(|source| DriftError::Step { step, source })
    }
}

fn step_err(step: &'static str) -> impl Fn(DbErr) -> DriftError {
    move |source| DriftError::Step { step, source }
}

/// Pull the backend SQLSTATE out of a driver error, when there is one.
fn sql_state(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(error)) | DbErr::Query(RuntimeErr::SqlxError(error)) => {
            error
                .as_database_error()
                .and_then(|db_err| db_err.code().map(|code| code.to_string()))
        }
        _ => None,
    }
}
