//! # Telemetry Repository
//!
//! Append-only time-series storage scoped to a scenario run: vehicle
//! state, schema-less sensor readings, and derived simulation metrics.
//! Appends are independent single-row inserts with no cross-row locking;
//! range queries read descending by timestamp, matching the composite
//! (scenario_id, timestamp DESC) indexes maintained by the drift
//! migrator.

use crate::error::RepositoryError;
use crate::models::scenario::{
    ActiveModel as ScenarioActiveModel, Entity as Scenario, Model as ScenarioModel, ScenarioStatus,
};
use crate::models::{sensor_data, simulation_metric, vehicle_data};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    NotSet, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;
use uuid::Uuid;

/// Request data for opening a new scenario run
#[derive(Debug, Clone)]
pub struct NewScenario {
    pub session_id: String,
    pub scenario_name: String,
    pub start_time: DateTimeWithTimeZone,
    pub metadata: Option<Value>,
}

/// One vehicle state sample
#[derive(Debug, Clone)]
pub struct VehicleSample {
    pub timestamp: DateTimeWithTimeZone,
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    pub yaw: f64,
    pub speed_kmh: f64,
    pub throttle: f64,
    pub brake: f64,
    pub steer: f64,
    pub gear: i32,
    pub handbrake: bool,
}

/// One schema-less sensor sample
#[derive(Debug, Clone)]
pub struct SensorSample {
    pub sensor_type: String,
    pub timestamp: DateTimeWithTimeZone,
    pub readings: Value,
}

/// One derived metrics sample
#[derive(Debug, Clone)]
pub struct MetricSample {
    pub timestamp: DateTimeWithTimeZone,
    pub fps: f64,
    pub delta_seconds: f64,
    pub collision_count: i32,
    pub lane_invasion_count: i32,
}

/// Which telemetry table a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Vehicle,
    Sensor,
    Metric,
}

/// Optional half-open `[start, end)` bounds for range queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRange {
    pub start: Option<DateTimeWithTimeZone>,
    pub end: Option<DateTimeWithTimeZone>,
}

/// Typed result of a range query, descending by timestamp.
#[derive(Debug, Clone)]
pub enum SampleBatch {
    Vehicle(Vec<vehicle_data::Model>),
    Sensor(Vec<sensor_data::Model>),
    Metric(Vec<simulation_metric::Model>),
}

impl SampleBatch {
    pub fn len(&self) -> usize {
        match self {
            SampleBatch::Vehicle(rows) => rows.len(),
            SampleBatch::Sensor(rows) => rows.len(),
            SampleBatch::Metric(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Repository for scenario and telemetry database operations
pub struct TelemetryRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TelemetryRepository<'a> {
    /// Create a new TelemetryRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a new scenario run with status `running`.
    pub async fn append_scenario(
        &self,
        request: NewScenario,
    ) -> Result<ScenarioModel, RepositoryError> {
        if request.session_id.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Session id cannot be empty",
            ));
        }
        if request.scenario_name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Scenario name cannot be empty",
            ));
        }

        ScenarioActiveModel {
            scenario_id: Set(Uuid::new_v4()),
            session_id: Set(request.session_id),
            scenario_name: Set(request.scenario_name),
            start_time: Set(request.start_time),
            end_time: Set(None),
            status: Set(ScenarioStatus::Running.as_str().to_string()),
            scenario_metadata: Set(request.metadata),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Fetch a scenario, failing with NotFound when it does not exist.
    pub async fn get_scenario(&self, scenario_id: Uuid) -> Result<ScenarioModel, RepositoryError> {
        Scenario::find_by_id(scenario_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound(format!("Scenario {scenario_id} not found")))
    }

    /// Append a vehicle state sample, returning the assigned row id.
    pub async fn append_vehicle_sample(
        &self,
        scenario_id: Uuid,
        sample: VehicleSample,
    ) -> Result<i64, RepositoryError> {
        let scenario = self.get_scenario(scenario_id).await?;

        let inserted = vehicle_data::ActiveModel {
            id: NotSet,
            scenario_id: Set(scenario_id),
            session_id: Set(scenario.session_id),
            timestamp: Set(sample.timestamp),
            position_x: Set(sample.position_x),
            position_y: Set(sample.position_y),
            position_z: Set(sample.position_z),
            yaw: Set(sample.yaw),
            speed_kmh: Set(sample.speed_kmh),
            throttle: Set(sample.throttle),
            brake: Set(sample.brake),
            steer: Set(sample.steer),
            gear: Set(sample.gear),
            handbrake: Set(sample.handbrake),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;

        Ok(inserted.id)
    }

    /// Append a sensor sample, returning the assigned row id.
    pub async fn append_sensor_sample(
        &self,
        scenario_id: Uuid,
        sample: SensorSample,
    ) -> Result<i64, RepositoryError> {
        if sample.sensor_type.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Sensor type cannot be empty",
            ));
        }

        let scenario = self.get_scenario(scenario_id).await?;

        let inserted = sensor_data::ActiveModel {
            id: NotSet,
            scenario_id: Set(scenario_id),
            session_id: Set(scenario.session_id),
            sensor_type: Set(sample.sensor_type),
            timestamp: Set(sample.timestamp),
            readings: Set(sample.readings),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;

        Ok(inserted.id)
    }

    /// Append a derived metrics sample, returning the assigned row id.
    pub async fn append_metric_sample(
        &self,
        scenario_id: Uuid,
        sample: MetricSample,
    ) -> Result<i64, RepositoryError> {
        let scenario = self.get_scenario(scenario_id).await?;

        let inserted = simulation_metric::ActiveModel {
            id: NotSet,
            scenario_id: Set(scenario_id),
            session_id: Set(scenario.session_id),
            timestamp: Set(sample.timestamp),
            fps: Set(sample.fps),
            delta_seconds: Set(sample.delta_seconds),
            collision_count: Set(sample.collision_count),
            lane_invasion_count: Set(sample.lane_invasion_count),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;

        Ok(inserted.id)
    }

    /// Transition a running scenario to a terminal status.
    ///
    /// Duplicate "end" signals are tolerated: when the scenario is
    /// already closed, the stored terminal state is returned unchanged
    /// regardless of the arguments of the second call.
    pub async fn close_scenario(
        &self,
        scenario_id: Uuid,
        status: ScenarioStatus,
        end_time: DateTimeWithTimeZone,
    ) -> Result<ScenarioModel, RepositoryError> {
        let scenario = self.get_scenario(scenario_id).await?;

        let current = ScenarioStatus::parse(&scenario.status);
        if current.is_some_and(|s| s.is_terminal()) {
            tracing::debug!(
                scenario_id = %scenario_id,
                status = %scenario.status,
                "scenario already closed, ignoring duplicate close"
            );
            return Ok(scenario);
        }

        if !status.is_terminal() {
            return Err(RepositoryError::validation_error(
                "Scenario can only be closed with a terminal status",
            ));
        }
        if end_time < scenario.start_time {
            return Err(RepositoryError::validation_error(
                "Scenario end time cannot precede its start time",
            ));
        }

        let mut closing = scenario.into_active_model();
        closing.status = Set(status.as_str().to_string());
        closing.end_time = Set(Some(end_time));

        closing
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Range query over one telemetry table, descending by timestamp.
    pub async fn query_samples(
        &self,
        scenario_id: Uuid,
        kind: SampleKind,
        range: TimeRange,
    ) -> Result<SampleBatch, RepositoryError> {
        // Fail early on unknown scenarios instead of returning an empty
        // batch the caller cannot distinguish from "no samples".
        self.get_scenario(scenario_id).await?;

        match kind {
            SampleKind::Vehicle => {
                let mut query = vehicle_data::Entity::find()
                    .filter(vehicle_data::Column::ScenarioId.eq(scenario_id));
                if let Some(start) = range.start {
                    query = query.filter(vehicle_data::Column::Timestamp.gte(start));
                }
                if let Some(end) = range.end {
                    query = query.filter(vehicle_data::Column::Timestamp.lt(end));
                }
                let rows = query
                    .order_by_desc(vehicle_data::Column::Timestamp)
                    .all(self.db)
                    .await
                    .map_err(RepositoryError::database_error)?;
                Ok(SampleBatch::Vehicle(rows))
            }
            SampleKind::Sensor => {
                let mut query = sensor_data::Entity::find()
                    .filter(sensor_data::Column::ScenarioId.eq(scenario_id));
                if let Some(start) = range.start {
                    query = query.filter(sensor_data::Column::Timestamp.gte(start));
                }
                if let Some(end) = range.end {
                    query = query.filter(sensor_data::Column::Timestamp.lt(end));
                }
                let rows = query
                    .order_by_desc(sensor_data::Column::Timestamp)
                    .all(self.db)
                    .await
                    .map_err(RepositoryError::database_error)?;
                Ok(SampleBatch::Sensor(rows))
            }
            SampleKind::Metric => {
                let mut query = simulation_metric::Entity::find()
                    .filter(simulation_metric::Column::ScenarioId.eq(scenario_id));
                if let Some(start) = range.start {
                    query = query.filter(simulation_metric::Column::Timestamp.gte(start));
                }
                if let Some(end) = range.end {
                    query = query.filter(simulation_metric::Column::Timestamp.lt(end));
                }
                let rows = query
                    .order_by_desc(simulation_metric::Column::Timestamp)
                    .all(self.db)
                    .await
                    .map_err(RepositoryError::database_error)?;
                Ok(SampleBatch::Metric(rows))
            }
        }
    }

    /// Delete a scenario; the owned telemetry rows cascade with it.
    pub async fn delete_scenario(&self, scenario_id: Uuid) -> Result<(), RepositoryError> {
        let scenario = self.get_scenario(scenario_id).await?;

        scenario
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup_test_db;
    use chrono::{Duration, Utc};
    use sea_orm::PaginatorTrait;
    use serde_json::json;

    fn new_scenario(name: &str) -> NewScenario {
        NewScenario {
            session_id: "session-1".to_string(),
            scenario_name: name.to_string(),
            start_time: Utc::now().into(),
            metadata: Some(json!({"town": "Town01"})),
        }
    }

    fn vehicle_sample(at: DateTimeWithTimeZone, speed: f64) -> VehicleSample {
        VehicleSample {
            timestamp: at,
            position_x: 1.0,
            position_y: 2.0,
            position_z: 0.0,
            yaw: 90.0,
            speed_kmh: speed,
            throttle: 0.4,
            brake: 0.0,
            steer: 0.05,
            gear: 3,
            handbrake: false,
        }
    }

    #[tokio::test]
    async fn test_append_scenario_starts_running() {
        let db = setup_test_db().await;
        let repo = TelemetryRepository::new(&db);

        let scenario = repo.append_scenario(new_scenario("lane-keep")).await.unwrap();
        assert_eq!(scenario.status, "running");
        assert!(scenario.end_time.is_none());
    }

    #[tokio::test]
    async fn test_append_sample_for_unknown_scenario_is_not_found() {
        let db = setup_test_db().await;
        let repo = TelemetryRepository::new(&db);

        let err = repo
            .append_vehicle_sample(Uuid::new_v4(), vehicle_sample(Utc::now().into(), 30.0))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_samples_copy_session_id_from_scenario() {
        let db = setup_test_db().await;
        let repo = TelemetryRepository::new(&db);

        let scenario = repo.append_scenario(new_scenario("lane-keep")).await.unwrap();
        repo.append_sensor_sample(
            scenario.scenario_id,
            SensorSample {
                sensor_type: "collision".to_string(),
                timestamp: Utc::now().into(),
                readings: json!({"intensity": 0.8}),
            },
        )
        .await
        .unwrap();

        let batch = repo
            .query_samples(scenario.scenario_id, SampleKind::Sensor, TimeRange::default())
            .await
            .unwrap();
        let SampleBatch::Sensor(rows) = batch else {
            panic!("expected sensor batch");
        };
        assert_eq!(rows[0].session_id, "session-1");
    }

    #[tokio::test]
    async fn test_close_scenario_is_idempotent() {
        let db = setup_test_db().await;
        let repo = TelemetryRepository::new(&db);

        let scenario = repo.append_scenario(new_scenario("lane-keep")).await.unwrap();
        let end: DateTimeWithTimeZone = (Utc::now() + Duration::seconds(60)).into();

        let closed = repo
            .close_scenario(scenario.scenario_id, ScenarioStatus::Completed, end)
            .await
            .unwrap();
        assert_eq!(closed.status, "completed");

        // A duplicate end signal with different arguments is a no-op.
        let later: DateTimeWithTimeZone = (Utc::now() + Duration::seconds(300)).into();
        let second = repo
            .close_scenario(scenario.scenario_id, ScenarioStatus::Failed, later)
            .await
            .unwrap();
        assert_eq!(second.status, "completed");
        assert_eq!(second.end_time, closed.end_time);
    }

    #[tokio::test]
    async fn test_close_scenario_rejects_bad_arguments() {
        let db = setup_test_db().await;
        let repo = TelemetryRepository::new(&db);

        let scenario = repo.append_scenario(new_scenario("lane-keep")).await.unwrap();

        let err = repo
            .close_scenario(
                scenario.scenario_id,
                ScenarioStatus::Running,
                Utc::now().into(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));

        let before_start: DateTimeWithTimeZone =
            (scenario.start_time - Duration::seconds(10)).into();
        let err = repo
            .close_scenario(
                scenario.scenario_id,
                ScenarioStatus::Completed,
                before_start,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_query_samples_descending_order() {
        let db = setup_test_db().await;
        let repo = TelemetryRepository::new(&db);

        let scenario = repo.append_scenario(new_scenario("lane-keep")).await.unwrap();
        let base = Utc::now();
        for i in 0..50 {
            repo.append_vehicle_sample(
                scenario.scenario_id,
                vehicle_sample((base + Duration::milliseconds(i * 50)).into(), i as f64),
            )
            .await
            .unwrap();
        }

        let batch = repo
            .query_samples(
                scenario.scenario_id,
                SampleKind::Vehicle,
                TimeRange::default(),
            )
            .await
            .unwrap();
        let SampleBatch::Vehicle(rows) = batch else {
            panic!("expected vehicle batch");
        };
        assert_eq!(rows.len(), 50);
        for pair in rows.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
        assert_eq!(rows[0].speed_kmh, 49.0);
    }

    #[tokio::test]
    async fn test_query_samples_respects_time_range() {
        let db = setup_test_db().await;
        let repo = TelemetryRepository::new(&db);

        let scenario = repo.append_scenario(new_scenario("lane-keep")).await.unwrap();
        let base = Utc::now();
        for i in 0..10 {
            repo.append_metric_sample(
                scenario.scenario_id,
                MetricSample {
                    timestamp: (base + Duration::seconds(i)).into(),
                    fps: 60.0,
                    delta_seconds: 0.016,
                    collision_count: 0,
                    lane_invasion_count: 0,
                },
            )
            .await
            .unwrap();
        }

        // Half-open range: samples 2..=5 fall in [2s, 6s).
        let range = TimeRange {
            start: Some((base + Duration::seconds(2)).into()),
            end: Some((base + Duration::seconds(6)).into()),
        };
        let batch = repo
            .query_samples(scenario.scenario_id, SampleKind::Metric, range)
            .await
            .unwrap();
        assert_eq!(batch.len(), 4);
    }

    #[tokio::test]
    async fn test_delete_scenario_cascades_telemetry() {
        let db = setup_test_db().await;
        let repo = TelemetryRepository::new(&db);

        let scenario = repo.append_scenario(new_scenario("lane-keep")).await.unwrap();
        let now: DateTimeWithTimeZone = Utc::now().into();
        repo.append_vehicle_sample(scenario.scenario_id, vehicle_sample(now, 10.0))
            .await
            .unwrap();
        repo.append_sensor_sample(
            scenario.scenario_id,
            SensorSample {
                sensor_type: "gnss".to_string(),
                timestamp: now,
                readings: json!({"lat": 48.0, "lon": 11.0}),
            },
        )
        .await
        .unwrap();
        repo.append_metric_sample(
            scenario.scenario_id,
            MetricSample {
                timestamp: now,
                fps: 60.0,
                delta_seconds: 0.016,
                collision_count: 1,
                lane_invasion_count: 0,
            },
        )
        .await
        .unwrap();

        repo.delete_scenario(scenario.scenario_id).await.unwrap();

        assert_eq!(vehicle_data::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(sensor_data::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(
            simulation_metric::Entity::find().count(&db).await.unwrap(),
            0
        );
        let err = repo.get_scenario(scenario.scenario_id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
