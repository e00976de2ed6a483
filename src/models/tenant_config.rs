//! Tenant configuration entity model
//!
//! One row per configuration version. Rows are immutable after creation
//! except for the is_active flip performed during activation of a newer
//! version. The partial unique index idx_tenant_configs_one_active keeps
//! at most one row active per tenant.
//!
//! app_config and sim_config are derived splits of the legacy combined
//! config blob. They are nullable because rows written before the split
//! migration carry only the combined blob; the drift backfill and the
//! read path fill them in.

use sea_orm::{ActiveModelBehavior, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenant_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    /// Monotonically increasing per tenant, starting at 1
    pub version: i32,

    pub is_active: bool,

    /// Legacy combined configuration blob
    #[sea_orm(column_type = "JsonBinary")]
    pub config: Json,

    /// Application-facing subset of the combined blob
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub app_config: Option<Json>,

    /// Simulator-facing subset of the combined blob
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub sim_config: Option<Json>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Tenant,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
