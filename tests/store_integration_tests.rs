//! End-to-end tests driving the store the way the web app does: bootstrap
//! a fresh database, then exercise tenants, config activation, telemetry,
//! and the metadata catalog together.

use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::json;
use simstore::bootstrap::bootstrap;
use simstore::config::AppConfig;
use simstore::models::scenario::ScenarioStatus;
use simstore::repositories::{
    CarlaMetadataRepository, CreateTenantRequest, TelemetryRepository, TenantConfigRepository,
    TenantRepository,
};
use simstore::repositories::telemetry::{
    MetricSample, NewScenario, SampleBatch, SampleKind, TimeRange, VehicleSample,
};

async fn bootstrapped_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_string(),
    ))
    .await
    .expect("enable foreign keys");

    bootstrap(&db, &AppConfig::default())
        .await
        .expect("bootstrap");
    db
}

fn vehicle_sample(at: chrono::DateTime<chrono::Utc>, speed: f64) -> VehicleSample {
    VehicleSample {
        timestamp: at.into(),
        position_x: 10.0,
        position_y: -3.5,
        position_z: 0.2,
        yaw: 45.0,
        speed_kmh: speed,
        throttle: 0.6,
        brake: 0.0,
        steer: -0.1,
        gear: 4,
        handbrake: false,
    }
}

#[tokio::test]
async fn config_versions_supersede_and_only_one_is_active() {
    let db = bootstrapped_db().await;
    let tenants = TenantRepository::new(&db);
    let configs = TenantConfigRepository::new(&db);

    let acme = tenants
        .create_tenant(CreateTenantRequest {
            name: "Acme Motors".to_string(),
            slug: "acme".to_string(),
        })
        .await
        .unwrap();

    configs
        .activate_config(acme.id, json!({"theme": "dark", "carla": {"town": "Town01"}}))
        .await
        .unwrap();
    configs
        .activate_config(
            acme.id,
            json!({"theme": "light", "carla": {"town": "Town05"}, "weather": {"preset": "WetNoon"}}),
        )
        .await
        .unwrap();

    let active = configs.get_active_config(acme.id).await.unwrap();
    assert_eq!(active.version, 2);
    assert_eq!(active.app_config["theme"], "light");
    assert_eq!(active.sim_config["carla"]["town"], "Town05");
    assert_eq!(active.sim_config["weather"]["preset"], "WetNoon");
    assert!(active.app_config.get("carla").is_none());

    let versions = configs.list_versions(acme.id).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions.iter().filter(|v| v.is_active).count(), 1);
    // Default tenant from seeding never sees acme's configs.
    let default = tenants.get_tenant_by_slug("default").await.unwrap().unwrap();
    assert!(configs.get_active_config(default.id).await.is_err());
}

#[tokio::test]
async fn telemetry_lifecycle_appends_queries_and_closes() {
    let db = bootstrapped_db().await;
    let telemetry = TelemetryRepository::new(&db);

    let scenario = telemetry
        .append_scenario(NewScenario {
            session_id: "sess-7".to_string(),
            scenario_name: "highway-merge".to_string(),
            start_time: Utc::now().into(),
            metadata: Some(json!({"town": "Town04", "vehicles": 20})),
        })
        .await
        .unwrap();

    let base = Utc::now();
    for i in 0..1000i64 {
        telemetry
            .append_vehicle_sample(
                scenario.scenario_id,
                vehicle_sample(base + Duration::milliseconds(i * 10), i as f64 / 10.0),
            )
            .await
            .unwrap();
    }

    let batch = telemetry
        .query_samples(
            scenario.scenario_id,
            SampleKind::Vehicle,
            TimeRange::default(),
        )
        .await
        .unwrap();
    assert_eq!(batch.len(), 1000);
    let SampleBatch::Vehicle(rows) = batch else {
        panic!("expected vehicle batch");
    };
    for pair in rows.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp, "must read newest first");
    }

    let end = base + Duration::seconds(30);
    let closed = telemetry
        .close_scenario(scenario.scenario_id, ScenarioStatus::Completed, end.into())
        .await
        .unwrap();
    assert_eq!(closed.status, "completed");

    // A duplicate end signal leaves the stored terminal state untouched.
    let reclosed = telemetry
        .close_scenario(
            scenario.scenario_id,
            ScenarioStatus::Aborted,
            (end + Duration::seconds(60)).into(),
        )
        .await
        .unwrap();
    assert_eq!(reclosed.status, "completed");
    assert_eq!(reclosed.end_time, closed.end_time);
}

#[tokio::test]
async fn deleting_a_scenario_cascades_to_all_samples() {
    let db = bootstrapped_db().await;
    let telemetry = TelemetryRepository::new(&db);

    let scenario = telemetry
        .append_scenario(NewScenario {
            session_id: "sess-9".to_string(),
            scenario_name: "roundabout".to_string(),
            start_time: Utc::now().into(),
            metadata: None,
        })
        .await
        .unwrap();
    let keeper = telemetry
        .append_scenario(NewScenario {
            session_id: "sess-9".to_string(),
            scenario_name: "roundabout-2".to_string(),
            start_time: Utc::now().into(),
            metadata: None,
        })
        .await
        .unwrap();

    for target in [&scenario, &keeper] {
        telemetry
            .append_vehicle_sample(target.scenario_id, vehicle_sample(Utc::now(), 25.0))
            .await
            .unwrap();
        telemetry
            .append_metric_sample(
                target.scenario_id,
                MetricSample {
                    timestamp: Utc::now().into(),
                    fps: 59.8,
                    delta_seconds: 0.0167,
                    collision_count: 0,
                    lane_invasion_count: 1,
                },
            )
            .await
            .unwrap();
    }

    telemetry.delete_scenario(scenario.scenario_id).await.unwrap();

    assert!(telemetry.get_scenario(scenario.scenario_id).await.is_err());
    // Sibling scenario keeps its telemetry.
    let remaining = telemetry
        .query_samples(keeper.scenario_id, SampleKind::Metric, TimeRange::default())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
}

#[tokio::test]
async fn metadata_catalog_upsert_is_last_writer_wins() {
    let db = bootstrapped_db().await;
    let catalog = CarlaMetadataRepository::new(&db);

    catalog
        .upsert("0.9.15", json!({"maps": ["Town01", "Town02"]}))
        .await
        .unwrap();
    let refreshed = catalog
        .upsert("0.9.15", json!({"maps": ["Town01", "Town02", "Town10HD"]}))
        .await
        .unwrap();

    assert_eq!(refreshed.data["maps"].as_array().unwrap().len(), 3);
    let fetched = catalog.get("0.9.15").await.unwrap();
    assert_eq!(fetched.data, refreshed.data);
}

#[tokio::test]
async fn auth_tables_enforce_their_foreign_keys() {
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
    use simstore::models::{user, user_session};
    use uuid::Uuid;

    let db = bootstrapped_db().await;
    let tenants = TenantRepository::new(&db);
    let tenant = tenants.get_tenant_by_slug("default").await.unwrap().unwrap();

    let account = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set("operator".to_string()),
        password_hash: Set("$argon2id$stub".to_string()),
        tenant_id: Set(Some(tenant.id)),
        is_admin: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(&db)
    .await
    .unwrap();

    user_session::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(account.id),
        token: Set("tok-1".to_string()),
        expires_at: Set((Utc::now() + Duration::hours(8)).into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&db)
    .await
    .unwrap();

    // Removing the user takes its sessions with it.
    user::Entity::delete_by_id(account.id).exec(&db).await.unwrap();
    assert_eq!(user_session::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn bootstrap_twice_is_equivalent_to_once() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_string(),
    ))
    .await
    .unwrap();

    let config = AppConfig::default();
    let first = bootstrap(&db, &config).await.unwrap();
    assert!(first.applied() > 0);

    let second = bootstrap(&db, &config).await.unwrap();
    assert_eq!(second.applied(), 0, "second pass must find nothing to do");

    // Seeding stayed idempotent too.
    let tenants = TenantRepository::new(&db);
    assert_eq!(tenants.get_tenant_count().await.unwrap(), 1);
}
