//! Backend-aware catalog probes used by the drift migrator to decide
//! whether a step still needs to run. Every probe is a read-only query
//! against the database's own catalog, so probing never mutates state.
//! Postgres probes are scoped to the current schema; a same-named object
//! in another schema must not mask a missing one here.

use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};

fn column_probe(backend: DatabaseBackend, table: &str, column: &str) -> Statement {
    match backend {
        DatabaseBackend::Postgres => Statement::from_sql_and_values(
            backend,
            "SELECT 1 FROM information_schema.columns \
             WHERE table_schema = current_schema() \
               AND table_name = $1 AND column_name = $2",
            [table.into(), column.into()],
        ),
        _ => Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT 1 FROM pragma_table_info('{table}') WHERE name = ?"),
            [column.into()],
        ),
    }
}

fn index_probe(backend: DatabaseBackend, name: &str) -> Statement {
    match backend {
        DatabaseBackend::Postgres => Statement::from_sql_and_values(
            backend,
            "SELECT 1 FROM pg_indexes \
             WHERE schemaname = current_schema() AND indexname = $1",
            [name.into()],
        ),
        _ => Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?",
            [name.into()],
        ),
    }
}

fn view_probe(backend: DatabaseBackend, name: &str) -> Statement {
    match backend {
        DatabaseBackend::Postgres => Statement::from_sql_and_values(
            backend,
            "SELECT 1 FROM information_schema.views \
             WHERE table_schema = current_schema() AND table_name = $1",
            [name.into()],
        ),
        _ => Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT 1 FROM sqlite_master WHERE type = 'view' AND name = ?",
            [name.into()],
        ),
    }
}

/// Check whether `table`.`column` exists.
pub async fn column_exists<C: ConnectionTrait>(
    db: &C,
    table: &str,
    column: &str,
) -> Result<bool, DbErr> {
    let stmt = column_probe(db.get_database_backend(), table, column);
    Ok(db.query_one(stmt).await?.is_some())
}

/// Check whether an index with the given name exists.
pub async fn index_exists<C: ConnectionTrait>(db: &C, name: &str) -> Result<bool, DbErr> {
    let stmt = index_probe(db.get_database_backend(), name);
    Ok(db.query_one(stmt).await?.is_some())
}

/// Check whether a view with the given name exists.
pub async fn view_exists<C: ConnectionTrait>(db: &C, name: &str) -> Result<bool, DbErr> {
    let stmt = view_probe(db.get_database_backend(), name);
    Ok(db.query_one(stmt).await?.is_some())
}

/// Check whether a database role exists. Always false on backends
/// without a role system.
pub async fn role_exists<C: ConnectionTrait>(db: &C, role: &str) -> Result<bool, DbErr> {
    if db.get_database_backend() != DatabaseBackend::Postgres {
        return Ok(false);
    }
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "SELECT 1 FROM pg_roles WHERE rolname = $1",
        [role.into()],
    );
    Ok(db.query_one(stmt).await?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup_test_db;

    #[tokio::test]
    async fn test_column_probe_sqlite() {
        let db = setup_test_db().await;
        assert!(column_exists(&db, "tenants", "slug").await.unwrap());
        assert!(!column_exists(&db, "tenants", "no_such_column").await.unwrap());
        assert!(!column_exists(&db, "no_such_table", "slug").await.unwrap());
    }

    #[tokio::test]
    async fn test_index_probe_sqlite() {
        let db = setup_test_db().await;
        assert!(index_exists(&db, "idx_scenarios_session_id").await.unwrap());
        assert!(!index_exists(&db, "idx_missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_role_probe_is_false_on_sqlite() {
        let db = setup_test_db().await;
        assert!(!role_exists(&db, "anyone").await.unwrap());
    }

    #[test]
    fn test_postgres_probes_are_schema_scoped() {
        let column = column_probe(DatabaseBackend::Postgres, "tenant_configs", "app_config");
        assert!(column.sql.contains("table_schema = current_schema()"));

        let index = index_probe(DatabaseBackend::Postgres, "idx_tenant_configs_one_active");
        assert!(index.sql.contains("schemaname = current_schema()"));

        let view = view_probe(DatabaseBackend::Postgres, "v_active_tenant_configs");
        assert!(view.sql.contains("table_schema = current_schema()"));
    }
}
