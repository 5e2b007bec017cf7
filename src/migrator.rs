use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240801_000001_create_identity_tables::Migration),
            Box::new(m20240801_000002_create_location_tables::Migration),
            Box::new(m20240801_000003_create_items_table::Migration),
            Box::new(m20240801_000004_create_placement_tables::Migration),
            Box::new(m20240801_000005_create_workflow_tables::Migration),
            Box::new(m20240801_000006_create_structure_mappings_table::Migration),
            Box::new(m20240801_000007_create_stocktake_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240801_000001_create_identity_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000001_create_identity_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::ExternalId).string().not_null())
                        .col(ColumnDef::new(Users::LastLogin).timestamp().null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Roles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Roles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Roles::Name).string().not_null())
                        .col(
                            ColumnDef::new(Roles::GroupId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RolePermissions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RolePermissions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RolePermissions::RoleId).uuid().not_null())
                        .col(
                            ColumnDef::new(RolePermissions::Permission)
                                .string()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_role_permissions_role")
                                .from(RolePermissions::Table, RolePermissions::RoleId)
                                .to(Roles::Table, Roles::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_role_permissions_role_id")
                        .table(RolePermissions::Table)
                        .col(RolePermissions::RoleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RolePermissions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Roles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Name,
        Email,
        ExternalId,
        LastLogin,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Roles {
        Table,
        Id,
        Name,
        GroupId,
    }

    #[derive(DeriveIden)]
    pub(super) enum RolePermissions {
        Table,
        Id,
        RoleId,
        Permission,
    }
}

mod m20240801_000002_create_location_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000002_create_location_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Models::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Models::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Models::Brand).string().not_null())
                        .col(ColumnDef::new(Models::Name).string().not_null())
                        .col(ColumnDef::new(Models::Category).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Rooms::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Rooms::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Rooms::Description).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Cabinets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Cabinets::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Cabinets::Description).string().not_null())
                        .col(ColumnDef::new(Cabinets::RoomId).uuid().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cabinets_room")
                                .from(Cabinets::Table, Cabinets::RoomId)
                                .to(Rooms::Table, Rooms::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Toolbooks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Toolbooks::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Toolbooks::UserId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Toolbooks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Cabinets::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Rooms::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Models::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Models {
        Table,
        Id,
        Brand,
        Name,
        Category,
    }

    #[derive(DeriveIden)]
    pub(super) enum Rooms {
        Table,
        Id,
        Description,
    }

    #[derive(DeriveIden)]
    pub(super) enum Cabinets {
        Table,
        Id,
        Description,
        RoomId,
    }

    #[derive(DeriveIden)]
    pub(super) enum Toolbooks {
        Table,
        Id,
        UserId,
    }
}

mod m20240801_000003_create_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000003_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Items::Eid).string().null())
                        .col(ColumnDef::new(Items::Description).string().not_null())
                        .col(ColumnDef::new(Items::ModelId).uuid().not_null())
                        .col(ColumnDef::new(Items::SerialNumber).string().null())
                        .col(ColumnDef::new(Items::Status).string().not_null())
                        .col(ColumnDef::new(Items::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Items::CreatedBy).uuid().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_status")
                        .table(Items::Table)
                        .col(Items::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_model_id")
                        .table(Items::Table)
                        .col(Items::ModelId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Items {
        Table,
        Id,
        Eid,
        Description,
        ModelId,
        SerialNumber,
        Status,
        CreatedAt,
        CreatedBy,
    }
}

mod m20240801_000004_create_placement_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000004_create_placement_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ItemPlaces::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemPlaces::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ItemPlaces::ItemId).string().not_null())
                        .col(ColumnDef::new(ItemPlaces::RoomId).uuid().null())
                        .col(ColumnDef::new(ItemPlaces::CabinetId).uuid().null())
                        .col(
                            ColumnDef::new(ItemPlaces::IsStored)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ItemPlaces::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(ItemPlaces::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(ItemPlaces::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(ItemPlaces::DeactivatedAt).timestamp().null())
                        .col(ColumnDef::new(ItemPlaces::DeactivatedBy).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_places_item_id")
                        .table(ItemPlaces::Table)
                        .col(ItemPlaces::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_places_item_active")
                        .table(ItemPlaces::Table)
                        .col(ItemPlaces::ItemId)
                        .col(ItemPlaces::IsActive)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ToolbookItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ToolbookItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ToolbookItems::ItemId).string().not_null())
                        .col(ColumnDef::new(ToolbookItems::ToolbookId).uuid().not_null())
                        .col(
                            ColumnDef::new(ToolbookItems::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ToolbookItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ToolbookItems::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(ToolbookItems::DeactivatedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(ColumnDef::new(ToolbookItems::DeactivatedBy).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_toolbook_items_item_active")
                        .table(ToolbookItems::Table)
                        .col(ToolbookItems::ItemId)
                        .col(ToolbookItems::IsActive)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ToolbookItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ItemPlaces::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ItemPlaces {
        Table,
        Id,
        ItemId,
        RoomId,
        CabinetId,
        IsStored,
        IsActive,
        CreatedAt,
        CreatedBy,
        DeactivatedAt,
        DeactivatedBy,
    }

    #[derive(DeriveIden)]
    pub(super) enum ToolbookItems {
        Table,
        Id,
        ItemId,
        ToolbookId,
        IsActive,
        CreatedAt,
        CreatedBy,
        DeactivatedAt,
        DeactivatedBy,
    }
}

mod m20240801_000005_create_workflow_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000005_create_workflow_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Moves::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Moves::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Moves::ItemId).string().not_null())
                        .col(ColumnDef::new(Moves::FromRoomId).uuid().null())
                        .col(ColumnDef::new(Moves::FromToolbookId).uuid().null())
                        .col(ColumnDef::new(Moves::ToRoomId).uuid().null())
                        .col(ColumnDef::new(Moves::ToToolbookId).uuid().null())
                        .col(ColumnDef::new(Moves::Description).string().null())
                        .col(
                            ColumnDef::new(Moves::IsFinished)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Moves::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Moves::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Moves::ClosedAt).timestamp().null())
                        .col(ColumnDef::new(Moves::ClosedBy).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_moves_item_id")
                        .table(Moves::Table)
                        .col(Moves::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_moves_is_finished")
                        .table(Moves::Table)
                        .col(Moves::IsFinished)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Scrappages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Scrappages::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Scrappages::ItemId).string().not_null())
                        .col(ColumnDef::new(Scrappages::Description).string().null())
                        .col(
                            ColumnDef::new(Scrappages::IsFinished)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Scrappages::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Scrappages::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Scrappages::ClosedAt).timestamp().null())
                        .col(ColumnDef::new(Scrappages::ClosedBy).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_scrappages_item_id")
                        .table(Scrappages::Table)
                        .col(Scrappages::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_scrappages_is_finished")
                        .table(Scrappages::Table)
                        .col(Scrappages::IsFinished)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Scrappages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Moves::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Moves {
        Table,
        Id,
        ItemId,
        FromRoomId,
        FromToolbookId,
        ToRoomId,
        ToToolbookId,
        Description,
        IsFinished,
        CreatedAt,
        CreatedBy,
        ClosedAt,
        ClosedBy,
    }

    #[derive(DeriveIden)]
    pub(super) enum Scrappages {
        Table,
        Id,
        ItemId,
        Description,
        IsFinished,
        CreatedAt,
        CreatedBy,
        ClosedAt,
        ClosedBy,
    }
}

mod m20240801_000006_create_structure_mappings_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000006_create_structure_mappings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StructureMappings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StructureMappings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StructureMappings::ParentItemId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StructureMappings::ChildItemId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StructureMappings::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(StructureMappings::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StructureMappings::CreatedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StructureMappings::DeactivatedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StructureMappings::DeactivatedBy)
                                .uuid()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_structure_mappings_parent")
                        .table(StructureMappings::Table)
                        .col(StructureMappings::ParentItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_structure_mappings_child")
                        .table(StructureMappings::Table)
                        .col(StructureMappings::ChildItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StructureMappings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StructureMappings {
        Table,
        Id,
        ParentItemId,
        ChildItemId,
        IsActive,
        CreatedAt,
        CreatedBy,
        DeactivatedAt,
        DeactivatedBy,
    }
}

mod m20240801_000007_create_stocktake_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000007_create_stocktake_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inventories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Inventories::Description)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Inventories::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Inventories::CreatedBy).uuid().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::InventoryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::ItemId).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::CreatedBy).uuid().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_items_inventory")
                                .from(InventoryItems::Table, InventoryItems::InventoryId)
                                .to(Inventories::Table, Inventories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_item_id")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ItemMetadata::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemMetadata::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ItemMetadata::ItemId).string().not_null())
                        .col(ColumnDef::new(ItemMetadata::Notes).string().not_null())
                        .col(
                            ColumnDef::new(ItemMetadata::ModifiedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ItemMetadata::ModifiedBy).uuid().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_metadata_item_id")
                        .table(ItemMetadata::Table)
                        .col(ItemMetadata::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ItemMetadata::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Inventories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Inventories {
        Table,
        Id,
        Description,
        CreatedAt,
        CreatedBy,
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryItems {
        Table,
        Id,
        InventoryId,
        ItemId,
        CreatedAt,
        CreatedBy,
    }

    #[derive(DeriveIden)]
    pub(super) enum ItemMetadata {
        Table,
        Id,
        ItemId,
        Notes,
        ModifiedAt,
        ModifiedBy,
    }
}
