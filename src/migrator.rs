use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250201_000001_create_users_table::Migration),
            Box::new(m20250201_000002_create_suppliers_table::Migration),
            Box::new(m20250201_000003_create_spare_parts_table::Migration),
            Box::new(m20250201_000004_create_stock_transactions_table::Migration),
            Box::new(m20250201_000005_create_alerts_table::Migration),
        ]
    }
}

mod m20250201_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250201_000001_create_users_table"
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
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string_len(80)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string_len(20)
                                .not_null()
                                .default("technician"),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_username")
                        .table(Users::Table)
                        .col(Users::Username)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Username,
        PasswordHash,
        Role,
        CreatedAt,
    }
}

mod m20250201_000002_create_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250201_000002_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Suppliers::ContactPerson).string_len(200).null())
                        .col(ColumnDef::new(Suppliers::Email).string_len(120).null())
                        .col(ColumnDef::new(Suppliers::Phone).string_len(50).null())
                        .col(ColumnDef::new(Suppliers::Address).text().null())
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_suppliers_name")
                        .table(Suppliers::Table)
                        .col(Suppliers::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Suppliers {
        Table,
        Id,
        Name,
        ContactPerson,
        Email,
        Phone,
        Address,
        CreatedAt,
    }
}

mod m20250201_000003_create_spare_parts_table {
    use sea_orm_migration::prelude::*;

    use super::m20250201_000002_create_suppliers_table::Suppliers;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250201_000003_create_spare_parts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SpareParts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SpareParts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SpareParts::Name).string_len(200).not_null())
                        .col(ColumnDef::new(SpareParts::Description).text().null())
                        .col(
                            ColumnDef::new(SpareParts::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SpareParts::MinQuantity)
                                .integer()
                                .not_null()
                                .default(10),
                        )
                        .col(ColumnDef::new(SpareParts::Location).string_len(100).null())
                        .col(ColumnDef::new(SpareParts::Category).string_len(100).null())
                        .col(ColumnDef::new(SpareParts::ImageUrl).string_len(500).null())
                        .col(ColumnDef::new(SpareParts::QrCodeUrl).string_len(500).null())
                        .col(ColumnDef::new(SpareParts::SupplierId).integer().null())
                        .col(ColumnDef::new(SpareParts::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(SpareParts::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_spare_parts_supplier")
                                .from(SpareParts::Table, SpareParts::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_spare_parts_name")
                        .table(SpareParts::Table)
                        .col(SpareParts::Name)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_spare_parts_category")
                        .table(SpareParts::Table)
                        .col(SpareParts::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SpareParts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum SpareParts {
        Table,
        Id,
        Name,
        Description,
        Quantity,
        MinQuantity,
        Location,
        Category,
        ImageUrl,
        QrCodeUrl,
        SupplierId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250201_000004_create_stock_transactions_table {
    use sea_orm_migration::prelude::*;

    use super::m20250201_000001_create_users_table::Users;
    use super::m20250201_000003_create_spare_parts_table::SpareParts;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250201_000004_create_stock_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockTransactions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(StockTransactions::UserId).integer().not_null())
                        .col(ColumnDef::new(StockTransactions::PartId).integer().not_null())
                        .col(
                            ColumnDef::new(StockTransactions::Movement)
                                .string_len(10)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockTransactions::Quantity).integer().not_null())
                        .col(ColumnDef::new(StockTransactions::Machine).string_len(100).null())
                        .col(ColumnDef::new(StockTransactions::Notes).text().null())
                        .col(
                            ColumnDef::new(StockTransactions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_transactions_user")
                                .from(StockTransactions::Table, StockTransactions::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_transactions_part")
                                .from(StockTransactions::Table, StockTransactions::PartId)
                                .to(SpareParts::Table, SpareParts::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_transactions_part_id")
                        .table(StockTransactions::Table)
                        .col(StockTransactions::PartId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_transactions_user_id")
                        .table(StockTransactions::Table)
                        .col(StockTransactions::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_transactions_created_at")
                        .table(StockTransactions::Table)
                        .col(StockTransactions::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockTransactions {
        Table,
        Id,
        UserId,
        PartId,
        Movement,
        Quantity,
        Machine,
        Notes,
        CreatedAt,
    }
}

mod m20250201_000005_create_alerts_table {
    use sea_orm_migration::prelude::*;

    use super::m20250201_000003_create_spare_parts_table::SpareParts;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250201_000005_create_alerts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Alerts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Alerts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Alerts::PartId).integer().not_null())
                        .col(ColumnDef::new(Alerts::Message).string_len(500).not_null())
                        .col(
                            ColumnDef::new(Alerts::Seen)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Alerts::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_alerts_part")
                                .from(Alerts::Table, Alerts::PartId)
                                .to(SpareParts::Table, SpareParts::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_alerts_part_id_seen")
                        .table(Alerts::Table)
                        .col(Alerts::PartId)
                        .col(Alerts::Seen)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Alerts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Alerts {
        Table,
        Id,
        PartId,
        Message,
        Seen,
        CreatedAt,
    }
}
