//! Vehicle telemetry entity model
//!
//! Per-tick vehicle state samples. Append-only; rows are never updated.

use sea_orm::{ActiveModelBehavior, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub scenario_id: Uuid,

    pub session_id: String,

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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scenario::Entity",
        from = "Column::ScenarioId",
        to = "super::scenario::Column::ScenarioId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Scenario,
}

impl Related<super::scenario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scenario.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
