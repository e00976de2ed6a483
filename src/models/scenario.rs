//! Scenario entity model
//!
//! One row per simulation run. Telemetry rows reference scenario_id with
//! cascade delete, so dropping a scenario removes its samples.

use sea_orm::{ActiveModelBehavior, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scenarios")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub scenario_id: Uuid,

    pub session_id: String,

    pub scenario_name: String,

    pub start_time: DateTimeWithTimeZone,

    /// Set when the run reaches a terminal status; always >= start_time
    pub end_time: Option<DateTimeWithTimeZone>,

    /// One of running/completed/failed/aborted, stored as text
    pub status: String,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub scenario_metadata: Option<Json>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicle_data::Entity")]
    VehicleData,
    #[sea_orm(has_many = "super::sensor_data::Entity")]
    SensorData,
    #[sea_orm(has_many = "super::simulation_metric::Entity")]
    SimulationMetrics,
}

impl Related<super::vehicle_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleData.def()
    }
}

impl Related<super::sensor_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SensorData.def()
    }
}

impl Related<super::simulation_metric::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SimulationMetrics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lifecycle status of a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Running,
    Completed,
    Failed,
    Aborted,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Running => "running",
            ScenarioStatus::Completed => "completed",
            ScenarioStatus::Failed => "failed",
            ScenarioStatus::Aborted => "aborted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "running" => Some(ScenarioStatus::Running),
            "completed" => Some(ScenarioStatus::Completed),
            "failed" => Some(ScenarioStatus::Failed),
            "aborted" => Some(ScenarioStatus::Aborted),
            _ => None,
        }
    }

    /// Terminal statuses end a run; close_scenario only accepts these.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScenarioStatus::Running)
    }
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
