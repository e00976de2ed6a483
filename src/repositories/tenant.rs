//! # Tenant Repository
//!
//! This module contains the repository implementation for Tenant entities,
//! providing provisioning and lookup operations for tenant management.
//! Tenants are soft-disabled rather than deleted while anything still
//! references them.

use crate::error::RepositoryError;
use crate::models::tenant::{
    ActiveModel as TenantActiveModel, Column as TenantColumn, Entity as Tenant,
    Model as TenantModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// Request data for provisioning a new tenant
#[derive(Debug, Clone)]
pub struct CreateTenantRequest {
    /// Display name, unique across tenants
    pub name: String,
    /// URL-safe identifier, unique and immutable once referenced
    pub slug: String,
}

/// Repository for Tenant database operations
pub struct TenantRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TenantRepository<'a> {
    /// Create a new TenantRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Provision a new tenant. Duplicate name or slug surfaces as Conflict.
    pub async fn create_tenant(
        &self,
        request: CreateTenantRequest,
    ) -> Result<TenantModel, RepositoryError> {
        self.validate_name(&request.name)?;
        self.validate_slug(&request.slug)?;

        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            slug: Set(request.slug),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        tenant
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get tenant by ID
    pub async fn get_tenant_by_id(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        Tenant::find_by_id(tenant_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get tenant by slug
    pub async fn get_tenant_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        Tenant::find()
            .filter(TenantColumn::Slug.eq(slug))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List all tenants, newest first
    pub async fn list_tenants(&self) -> Result<Vec<TenantModel>, RepositoryError> {
        Tenant::find()
            .order_by_desc(TenantColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Soft-disable a tenant. The row is kept so configs, logs and reports
    /// referencing it stay resolvable.
    pub async fn disable_tenant(&self, tenant_id: Uuid) -> Result<TenantModel, RepositoryError> {
        let tenant = self
            .get_tenant_by_id(tenant_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Tenant not found".to_string()))?;

        let mut active_tenant = tenant.into_active_model();
        active_tenant.is_active = Set(false);

        active_tenant
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Check if a tenant exists
    pub async fn tenant_exists(&self, tenant_id: Uuid) -> Result<bool, RepositoryError> {
        let exists = Tenant::find_by_id(tenant_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .is_some();

        Ok(exists)
    }

    /// Get tenant count
    pub async fn get_tenant_count(&self) -> Result<u64, RepositoryError> {
        Tenant::find()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    fn validate_name(&self, name: &str) -> Result<(), RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Tenant name cannot be empty",
            ));
        }

        if name.len() > 255 {
            return Err(RepositoryError::validation_error(
                "Tenant name cannot exceed 255 characters",
            ));
        }

        Ok(())
    }

    fn validate_slug(&self, slug: &str) -> Result<(), RepositoryError> {
        if slug.is_empty() || slug.len() > 64 {
            return Err(RepositoryError::validation_error(
                "Tenant slug must be between 1 and 64 characters",
            ));
        }

        if !slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(RepositoryError::validation_error(
                "Tenant slug can only contain lowercase letters, digits, and hyphens",
            ));
        }

        Ok(())
    }
}
