//! Migration to create the telemetry tables.
//!
//! vehicle_data, sensor_data and simulation_metrics are append-only
//! time-series tables scoped to a scenario. Rows are immutable once
//! written and removed only via cascade when the owning scenario is
//! deleted. The baseline carries plain scenario_id indexes; the composite
//! (scenario_id, timestamp DESC) indexes used by range queries were added
//! later and are maintained by the drift migrator.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleData::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VehicleData::ScenarioId).uuid().not_null())
                    .col(ColumnDef::new(VehicleData::SessionId).text().not_null())
                    .col(
                        ColumnDef::new(VehicleData::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleData::PositionX).double().not_null())
                    .col(ColumnDef::new(VehicleData::PositionY).double().not_null())
                    .col(ColumnDef::new(VehicleData::PositionZ).double().not_null())
                    .col(ColumnDef::new(VehicleData::Yaw).double().not_null())
                    .col(ColumnDef::new(VehicleData::SpeedKmh).double().not_null())
                    .col(ColumnDef::new(VehicleData::Throttle).double().not_null())
                    .col(ColumnDef::new(VehicleData::Brake).double().not_null())
                    .col(ColumnDef::new(VehicleData::Steer).double().not_null())
                    .col(ColumnDef::new(VehicleData::Gear).integer().not_null())
                    .col(
                        ColumnDef::new(VehicleData::Handbrake)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_data_scenario_id")
                            .from(VehicleData::Table, VehicleData::ScenarioId)
                            .to(Scenarios::Table, Scenarios::ScenarioId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_data_scenario_id")
                    .table(VehicleData::Table)
                    .col(VehicleData::ScenarioId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SensorData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SensorData::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SensorData::ScenarioId).uuid().not_null())
                    .col(ColumnDef::new(SensorData::SessionId).text().not_null())
                    .col(ColumnDef::new(SensorData::SensorType).text().not_null())
                    .col(
                        ColumnDef::new(SensorData::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SensorData::Readings).json_binary().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sensor_data_scenario_id")
                            .from(SensorData::Table, SensorData::ScenarioId)
                            .to(Scenarios::Table, Scenarios::ScenarioId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sensor_data_scenario_id")
                    .table(SensorData::Table)
                    .col(SensorData::ScenarioId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SimulationMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SimulationMetrics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SimulationMetrics::ScenarioId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SimulationMetrics::SessionId)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SimulationMetrics::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SimulationMetrics::Fps).double().not_null())
                    .col(
                        ColumnDef::new(SimulationMetrics::DeltaSeconds)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SimulationMetrics::CollisionCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SimulationMetrics::LaneInvasionCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_simulation_metrics_scenario_id")
                            .from(SimulationMetrics::Table, SimulationMetrics::ScenarioId)
                            .to(Scenarios::Table, Scenarios::ScenarioId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_simulation_metrics_scenario_id")
                    .table(SimulationMetrics::Table)
                    .col(SimulationMetrics::ScenarioId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SimulationMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SensorData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleData::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VehicleData {
    Table,
    Id,
    ScenarioId,
    SessionId,
    Timestamp,
    PositionX,
    PositionY,
    PositionZ,
    Yaw,
    SpeedKmh,
    Throttle,
    Brake,
    Steer,
    Gear,
    Handbrake,
}

#[derive(DeriveIden)]
enum SensorData {
    Table,
    Id,
    ScenarioId,
    SessionId,
    SensorType,
    Timestamp,
    Readings,
}

#[derive(DeriveIden)]
enum SimulationMetrics {
    Table,
    Id,
    ScenarioId,
    SessionId,
    Timestamp,
    Fps,
    DeltaSeconds,
    CollisionCount,
    LaneInvasionCount,
}

#[derive(DeriveIden)]
enum Scenarios {
    Table,
    ScenarioId,
}
