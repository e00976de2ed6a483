//! Sensor telemetry entity model
//!
//! Schema-less sensor readings keyed by sensor type; the payload shape
//! varies per sensor (lidar, radar, collision, gnss, ...).

use sea_orm::{ActiveModelBehavior, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sensor_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub scenario_id: Uuid,

    pub session_id: String,

    pub sensor_type: String,

    pub timestamp: DateTimeWithTimeZone,

    #[sea_orm(column_type = "JsonBinary")]
    pub readings: Json,
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
