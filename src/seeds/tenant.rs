//! Default tenant seeding functionality
//!
//! Guarantees a usable tenant exists on a fresh deployment so the web
//! app has somewhere to attach sessions and configuration before an
//! administrator provisions real tenants.

use anyhow::Result;

use crate::repositories::{CreateTenantRequest, TenantRepository};

/// Seeds the default tenant if no tenant with the given slug exists.
///
/// Safe to run on every startup: the slug lookup makes the common path a
/// no-op, and a concurrent seeder losing the unique-slug race is treated
/// as success since the tenant exists either way.
pub async fn seed_default_tenant(
    repo: &TenantRepository<'_>,
    name: &str,
    slug: &str,
) -> Result<()> {
    match repo.get_tenant_by_slug(slug).await? {
        Some(tenant) => {
            log::info!("Default tenant '{}' already exists, skipping", tenant.slug);
            Ok(())
        }
        None => {
            log::info!("Creating default tenant: {slug}");
            match repo
                .create_tenant(CreateTenantRequest {
                    name: name.to_string(),
                    slug: slug.to_string(),
                })
                .await
            {
                Ok(tenant) => {
                    log::info!("Successfully created default tenant: {}", tenant.slug);
                    Ok(())
                }
                // Another instance seeded it between our lookup and insert.
                Err(e) if e.is_conflict() => {
                    log::info!("Default tenant '{slug}' created concurrently, skipping");
                    Ok(())
                }
                Err(e) => {
                    log::error!("Failed to create default tenant '{slug}': {e}");
                    Err(e.into())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup_test_db;

    #[tokio::test]
    async fn test_seed_default_tenant_is_idempotent() {
        let db = setup_test_db().await;
        let repo = TenantRepository::new(&db);

        seed_default_tenant(&repo, "Default", "default").await.unwrap();
        seed_default_tenant(&repo, "Default", "default").await.unwrap();

        assert_eq!(repo.get_tenant_count().await.unwrap(), 1);
        let tenant = repo.get_tenant_by_slug("default").await.unwrap().unwrap();
        assert_eq!(tenant.name, "Default");
    }
}
