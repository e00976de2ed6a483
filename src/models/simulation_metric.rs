//! Simulation metrics entity model
//!
//! Derived per-tick metrics (frame rate, collision counters) for a run.

use sea_orm::{ActiveModelBehavior, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "simulation_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub scenario_id: Uuid,

    pub session_id: String,

    pub timestamp: DateTimeWithTimeZone,

    pub fps: f64,
    pub delta_seconds: f64,
    pub collision_count: i32,
    pub lane_invasion_count: i32,
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
