//! # CARLA Metadata Repository
//!
//! Small catalog of static simulator facts (available maps, weather
//! presets, sensor types) keyed by simulator version string. Writes are
//! last-writer-wins upserts so a refreshed catalog can be republished
//! without coordinating with readers.

use crate::error::RepositoryError;
use crate::models::carla_metadata::{ActiveModel, Column, Entity as CarlaMetadata, Model};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set};
use serde_json::Value;

/// Repository for versioned simulator catalog entries
pub struct CarlaMetadataRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CarlaMetadataRepository<'a> {
    /// Create a new CarlaMetadataRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert or replace the catalog entry for a simulator version.
    ///
    /// On conflict the stored payload is replaced wholesale and
    /// `updated_at` is bumped; `created_at` keeps its original value.
    pub async fn upsert(&self, version: &str, data: Value) -> Result<Model, RepositoryError> {
        if version.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Simulator version cannot be empty",
            ));
        }

        let now = Utc::now();
        let entry = ActiveModel {
            id: NotSet,
            version: Set(version.to_string()),
            data: Set(data),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        CarlaMetadata::insert(entry)
            .on_conflict(
                OnConflict::column(Column::Version)
                    .update_columns([Column::Data, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        self.get(version).await
    }

    /// Fetch the catalog entry for a simulator version.
    pub async fn get(&self, version: &str) -> Result<Model, RepositoryError> {
        CarlaMetadata::find()
            .filter(Column::Version.eq(version))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("No catalog entry for CARLA version {version}"))
            })
    }

    /// List all known simulator versions.
    pub async fn list_versions(&self) -> Result<Vec<String>, RepositoryError> {
        let entries = CarlaMetadata::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(entries.into_iter().map(|entry| entry.version).collect())
    }
}
