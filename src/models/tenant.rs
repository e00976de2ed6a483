//! Tenant entity model
//!
//! This module contains the SeaORM entity model for the tenants table,
//! the multi-tenancy root. Slugs are unique and treated as immutable once
//! anything references them; tenants are soft-disabled via is_active
//! rather than deleted while referenced.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    /// Unique identifier for the tenant (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name, unique across tenants
    #[sea_orm(unique)]
    pub name: String,

    /// URL-safe identifier, unique and immutable once referenced
    #[sea_orm(unique)]
    pub slug: String,

    /// Soft-disable flag; disabled tenants are never hard-deleted while referenced
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tenant_config::Entity")]
    TenantConfigs,
}

impl Related<super::tenant_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenantConfigs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
