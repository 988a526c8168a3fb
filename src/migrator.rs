use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_catalog_tables::Migration),
            Box::new(m20240301_000002_create_build_tables::Migration),
            Box::new(m20240301_000003_create_inventory_tables::Migration),
            Box::new(m20240301_000004_create_work_order_tables::Migration),
        ]
    }
}

fn id_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn qty_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .decimal_len(16, 4)
        .not_null()
        .default(0)
        .to_owned()
}

fn timestamp_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

mod m20240301_000001_create_catalog_tables {
    use super::{id_column, qty_column};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Phases::Table)
                        .if_not_exists()
                        .col(&mut id_column(Phases::Id))
                        .col(ColumnDef::new(Phases::Name).string().not_null())
                        .col(ColumnDef::new(Phases::Seq).integer().not_null().default(0))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Technicians::Table)
                        .if_not_exists()
                        .col(&mut id_column(Technicians::Id))
                        .col(ColumnDef::new(Technicians::DisplayName).string().not_null())
                        .col(ColumnDef::new(Technicians::Title).string().null())
                        .col(
                            ColumnDef::new(Technicians::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PartMaster::Table)
                        .if_not_exists()
                        .col(&mut id_column(PartMaster::Id))
                        .col(
                            ColumnDef::new(PartMaster::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PartMaster::Name).string().not_null())
                        .col(
                            ColumnDef::new(PartMaster::PartType)
                                .string()
                                .not_null()
                                .default("COMPONENT"),
                        )
                        .col(ColumnDef::new(PartMaster::MakeBuy).string().null())
                        .col(
                            ColumnDef::new(PartMaster::IsSerialized)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(PartMaster::Uom).string().null())
                        .col(
                            ColumnDef::new(PartMaster::ItemType)
                                .string()
                                .not_null()
                                .default("SKU"),
                        )
                        .col(ColumnDef::new(PartMaster::Criticality).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(KitComponents::Table)
                        .if_not_exists()
                        .col(&mut id_column(KitComponents::Id))
                        .col(
                            ColumnDef::new(KitComponents::ParentItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitComponents::ChildItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(&mut qty_column(KitComponents::QtyPerParent))
                        .col(ColumnDef::new(KitComponents::InstanceStatus).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_kit_components_parent")
                                .from(KitComponents::Table, KitComponents::ParentItemId)
                                .to(PartMaster::Table, PartMaster::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_kit_components_child")
                                .from(KitComponents::Table, KitComponents::ChildItemId)
                                .to(PartMaster::Table, PartMaster::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(KitComponents::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PartMaster::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Technicians::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Phases::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Phases {
        Table,
        Id,
        Name,
        Seq,
    }

    #[derive(DeriveIden)]
    pub(super) enum Technicians {
        Table,
        Id,
        DisplayName,
        Title,
        Active,
    }

    #[derive(DeriveIden)]
    pub(super) enum PartMaster {
        Table,
        Id,
        Sku,
        Name,
        PartType,
        MakeBuy,
        IsSerialized,
        Uom,
        ItemType,
        Criticality,
    }

    #[derive(DeriveIden)]
    enum KitComponents {
        Table,
        Id,
        ParentItemId,
        ChildItemId,
        QtyPerParent,
        InstanceStatus,
    }
}

mod m20240301_000002_create_build_tables {
    use super::m20240301_000001_create_catalog_tables::{PartMaster, Phases, Technicians};
    use super::{id_column, qty_column, timestamp_column};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_build_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Builds::Table)
                        .if_not_exists()
                        .col(&mut id_column(Builds::Id))
                        .col(ColumnDef::new(Builds::Code).string().not_null().unique_key())
                        .col(ColumnDef::new(Builds::Model).string().null())
                        .col(
                            ColumnDef::new(Builds::Status)
                                .string()
                                .not_null()
                                .default("PLANNED"),
                        )
                        .col(ColumnDef::new(Builds::EtaDate).date().null())
                        .col(ColumnDef::new(Builds::SpecJson).json().null())
                        .col(&mut timestamp_column(Builds::CreatedAt))
                        .col(&mut timestamp_column(Builds::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Tasks::Table)
                        .if_not_exists()
                        .col(&mut id_column(Tasks::Id))
                        .col(ColumnDef::new(Tasks::BuildId).big_integer().not_null())
                        .col(ColumnDef::new(Tasks::PhaseId).big_integer().null())
                        .col(ColumnDef::new(Tasks::Name).string().not_null())
                        .col(
                            ColumnDef::new(Tasks::Status)
                                .string()
                                .not_null()
                                .default("NOT_STARTED"),
                        )
                        .col(ColumnDef::new(Tasks::Owner).string().null())
                        .col(ColumnDef::new(Tasks::StartedAt).timestamp_with_time_zone().null())
                        .col(
                            ColumnDef::new(Tasks::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(&mut timestamp_column(Tasks::CreatedAt))
                        .col(&mut timestamp_column(Tasks::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tasks_build")
                                .from(Tasks::Table, Tasks::BuildId)
                                .to(Builds::Table, Builds::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tasks_phase")
                                .from(Tasks::Table, Tasks::PhaseId)
                                .to(Phases::Table, Phases::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tasks_status")
                        .table(Tasks::Table)
                        .col(Tasks::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TaskEvents::Table)
                        .if_not_exists()
                        .col(&mut id_column(TaskEvents::Id))
                        .col(ColumnDef::new(TaskEvents::TaskId).big_integer().not_null())
                        .col(ColumnDef::new(TaskEvents::EventType).string().not_null())
                        .col(ColumnDef::new(TaskEvents::Note).text().null())
                        .col(ColumnDef::new(TaskEvents::TechnicianId).big_integer().null())
                        .col(&mut timestamp_column(TaskEvents::OccurredAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_task_events_task")
                                .from(TaskEvents::Table, TaskEvents::TaskId)
                                .to(Tasks::Table, Tasks::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_task_events_task_id")
                        .table(TaskEvents::Table)
                        .col(TaskEvents::TaskId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TaskAssignments::Table)
                        .if_not_exists()
                        .col(&mut id_column(TaskAssignments::Id))
                        .col(
                            ColumnDef::new(TaskAssignments::TaskId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TaskAssignments::TechnicianId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(&mut timestamp_column(TaskAssignments::AssignedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_task_assignments_task")
                                .from(TaskAssignments::Table, TaskAssignments::TaskId)
                                .to(Tasks::Table, Tasks::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_task_assignments_technician")
                                .from(TaskAssignments::Table, TaskAssignments::TechnicianId)
                                .to(Technicians::Table, Technicians::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkSessions::Table)
                        .if_not_exists()
                        .col(&mut id_column(WorkSessions::Id))
                        .col(
                            ColumnDef::new(WorkSessions::TechnicianId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkSessions::TaskId).big_integer().not_null())
                        .col(ColumnDef::new(WorkSessions::Station).string().null())
                        .col(&mut timestamp_column(WorkSessions::StartedAt))
                        .col(
                            ColumnDef::new(WorkSessions::EndedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_sessions_technician")
                                .from(WorkSessions::Table, WorkSessions::TechnicianId)
                                .to(Technicians::Table, Technicians::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_sessions_task")
                                .from(WorkSessions::Table, WorkSessions::TaskId)
                                .to(Tasks::Table, Tasks::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TaskRequirements::Table)
                        .if_not_exists()
                        .col(&mut id_column(TaskRequirements::Id))
                        .col(
                            ColumnDef::new(TaskRequirements::TaskId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TaskRequirements::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(&mut qty_column(TaskRequirements::RequiredQty))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_task_requirements_task")
                                .from(TaskRequirements::Table, TaskRequirements::TaskId)
                                .to(Tasks::Table, Tasks::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_task_requirements_item")
                                .from(TaskRequirements::Table, TaskRequirements::ItemId)
                                .to(PartMaster::Table, PartMaster::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for statement in [
                Table::drop().table(TaskRequirements::Table).to_owned(),
                Table::drop().table(WorkSessions::Table).to_owned(),
                Table::drop().table(TaskAssignments::Table).to_owned(),
                Table::drop().table(TaskEvents::Table).to_owned(),
                Table::drop().table(Tasks::Table).to_owned(),
                Table::drop().table(Builds::Table).to_owned(),
            ] {
                manager.drop_table(statement).await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Builds {
        Table,
        Id,
        Code,
        Model,
        Status,
        EtaDate,
        SpecJson,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Tasks {
        Table,
        Id,
        BuildId,
        PhaseId,
        Name,
        Status,
        Owner,
        StartedAt,
        CompletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum TaskEvents {
        Table,
        Id,
        TaskId,
        EventType,
        Note,
        TechnicianId,
        OccurredAt,
    }

    #[derive(DeriveIden)]
    enum TaskAssignments {
        Table,
        Id,
        TaskId,
        TechnicianId,
        AssignedAt,
    }

    #[derive(DeriveIden)]
    enum WorkSessions {
        Table,
        Id,
        TechnicianId,
        TaskId,
        Station,
        StartedAt,
        EndedAt,
    }

    #[derive(DeriveIden)]
    enum TaskRequirements {
        Table,
        Id,
        TaskId,
        ItemId,
        RequiredQty,
    }
}

mod m20240301_000003_create_inventory_tables {
    use super::m20240301_000001_create_catalog_tables::PartMaster;
    use super::m20240301_000002_create_build_tables::Builds;
    use super::{id_column, qty_column, timestamp_column};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryBalance::Table)
                        .if_not_exists()
                        .col(&mut id_column(InventoryBalance::Id))
                        .col(
                            ColumnDef::new(InventoryBalance::ItemId)
                                .big_integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(&mut qty_column(InventoryBalance::OnHandQty))
                        .col(&mut qty_column(InventoryBalance::AllocatedQty))
                        .col(&mut timestamp_column(InventoryBalance::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_balance_item")
                                .from(InventoryBalance::Table, InventoryBalance::ItemId)
                                .to(PartMaster::Table, PartMaster::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryLot::Table)
                        .if_not_exists()
                        .col(&mut id_column(InventoryLot::Id))
                        .col(ColumnDef::new(InventoryLot::ItemId).big_integer().not_null())
                        .col(ColumnDef::new(InventoryLot::LotCode).string().not_null())
                        .col(&mut qty_column(InventoryLot::Qty))
                        .col(&mut timestamp_column(InventoryLot::ReceivedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_lot_item")
                                .from(InventoryLot::Table, InventoryLot::ItemId)
                                .to(PartMaster::Table, PartMaster::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockReceipts::Table)
                        .if_not_exists()
                        .col(&mut id_column(StockReceipts::Id))
                        .col(ColumnDef::new(StockReceipts::ItemId).big_integer().not_null())
                        .col(&mut qty_column(StockReceipts::Qty))
                        .col(ColumnDef::new(StockReceipts::Note).text().null())
                        .col(&mut timestamp_column(StockReceipts::ReceivedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Allocations::Table)
                        .if_not_exists()
                        .col(&mut id_column(Allocations::Id))
                        .col(ColumnDef::new(Allocations::BuildId).big_integer().not_null())
                        .col(ColumnDef::new(Allocations::StageId).big_integer().not_null())
                        .col(ColumnDef::new(Allocations::ItemId).big_integer().not_null())
                        .col(&mut qty_column(Allocations::Qty))
                        .col(
                            ColumnDef::new(Allocations::Status)
                                .string()
                                .not_null()
                                .default("reserved"),
                        )
                        .col(&mut timestamp_column(Allocations::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_allocations_build")
                                .from(Allocations::Table, Allocations::BuildId)
                                .to(Builds::Table, Builds::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BuildBomLine::Table)
                        .if_not_exists()
                        .col(&mut id_column(BuildBomLine::Id))
                        .col(ColumnDef::new(BuildBomLine::BuildId).big_integer().not_null())
                        .col(ColumnDef::new(BuildBomLine::PartId).big_integer().not_null())
                        .col(&mut qty_column(BuildBomLine::RequiredQty))
                        .col(&mut qty_column(BuildBomLine::AllocatedQty))
                        .col(&mut qty_column(BuildBomLine::ConsumedQty))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_build_bom_line_build")
                                .from(BuildBomLine::Table, BuildBomLine::BuildId)
                                .to(Builds::Table, Builds::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for statement in [
                Table::drop().table(BuildBomLine::Table).to_owned(),
                Table::drop().table(Allocations::Table).to_owned(),
                Table::drop().table(StockReceipts::Table).to_owned(),
                Table::drop().table(InventoryLot::Table).to_owned(),
                Table::drop().table(InventoryBalance::Table).to_owned(),
            ] {
                manager.drop_table(statement).await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum InventoryBalance {
        Table,
        Id,
        ItemId,
        OnHandQty,
        AllocatedQty,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryLot {
        Table,
        Id,
        ItemId,
        LotCode,
        Qty,
        ReceivedAt,
    }

    #[derive(DeriveIden)]
    enum StockReceipts {
        Table,
        Id,
        ItemId,
        Qty,
        Note,
        ReceivedAt,
    }

    #[derive(DeriveIden)]
    enum Allocations {
        Table,
        Id,
        BuildId,
        StageId,
        ItemId,
        Qty,
        Status,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum BuildBomLine {
        Table,
        Id,
        BuildId,
        PartId,
        RequiredQty,
        AllocatedQty,
        ConsumedQty,
    }
}

mod m20240301_000004_create_work_order_tables {
    use super::m20240301_000002_create_build_tables::Builds;
    use super::{id_column, qty_column, timestamp_column};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_work_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BuildDocuments::Table)
                        .if_not_exists()
                        .col(&mut id_column(BuildDocuments::Id))
                        .col(
                            ColumnDef::new(BuildDocuments::BuildId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BuildDocuments::Filename).string().not_null())
                        .col(ColumnDef::new(BuildDocuments::StorageUrl).string().null())
                        .col(ColumnDef::new(BuildDocuments::DocType).string().null())
                        .col(&mut timestamp_column(BuildDocuments::UploadedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_build_documents_build")
                                .from(BuildDocuments::Table, BuildDocuments::BuildId)
                                .to(Builds::Table, Builds::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkOrders::Table)
                        .if_not_exists()
                        .col(&mut id_column(WorkOrders::Id))
                        .col(ColumnDef::new(WorkOrders::WoType).string().not_null())
                        .col(ColumnDef::new(WorkOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(WorkOrders::TargetPartId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkOrders::ForBuildId).big_integer().null())
                        .col(ColumnDef::new(WorkOrders::Notes).text().null())
                        .col(&mut timestamp_column(WorkOrders::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WoConsumption::Table)
                        .if_not_exists()
                        .col(&mut id_column(WoConsumption::Id))
                        .col(
                            ColumnDef::new(WoConsumption::WorkOrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WoConsumption::PartId).big_integer().not_null())
                        .col(&mut qty_column(WoConsumption::Qty))
                        .col(&mut timestamp_column(WoConsumption::ConsumedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_wo_consumption_work_order")
                                .from(WoConsumption::Table, WoConsumption::WorkOrderId)
                                .to(WorkOrders::Table, WorkOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InspectionRecords::Table)
                        .if_not_exists()
                        .col(&mut id_column(InspectionRecords::Id))
                        .col(
                            ColumnDef::new(InspectionRecords::WorkOrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InspectionRecords::Result).string().not_null())
                        .col(ColumnDef::new(InspectionRecords::Notes).text().null())
                        .col(&mut timestamp_column(InspectionRecords::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inspection_records_work_order")
                                .from(InspectionRecords::Table, InspectionRecords::WorkOrderId)
                                .to(WorkOrders::Table, WorkOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for statement in [
                Table::drop().table(InspectionRecords::Table).to_owned(),
                Table::drop().table(WoConsumption::Table).to_owned(),
                Table::drop().table(WorkOrders::Table).to_owned(),
                Table::drop().table(BuildDocuments::Table).to_owned(),
            ] {
                manager.drop_table(statement).await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum BuildDocuments {
        Table,
        Id,
        BuildId,
        Filename,
        StorageUrl,
        DocType,
        UploadedAt,
    }

    #[derive(DeriveIden)]
    enum WorkOrders {
        Table,
        Id,
        WoType,
        Status,
        TargetPartId,
        ForBuildId,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum WoConsumption {
        Table,
        Id,
        WorkOrderId,
        PartId,
        Qty,
        ConsumedAt,
    }

    #[derive(DeriveIden)]
    enum InspectionRecords {
        Table,
        Id,
        WorkOrderId,
        Result,
        Notes,
        CreatedAt,
    }
}
