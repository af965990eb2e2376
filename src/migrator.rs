use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users_table::Migration),
            Box::new(m20240601_000002_create_catalog_tables::Migration),
            Box::new(m20240601_000003_create_orders_tables::Migration),
            Box::new(m20240601_000004_create_custom_order_tables::Migration),
            Box::new(m20240601_000005_create_site_tables::Migration),
        ]
    }
}

mod m20240601_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_users_table"
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
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Name).string_len(120).null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::IsSuperadmin)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Users::ProfileImage).string().null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::LastLogin)
                                .timestamp_with_time_zone()
                                .null(),
                        )
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
    enum Users {
        Table,
        Id,
        Username,
        Name,
        PasswordHash,
        IsSuperadmin,
        ProfileImage,
        CreatedAt,
        LastLogin,
    }
}

mod m20240601_000002_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Categories::Slug).string_len(120).not_null())
                        .col(ColumnDef::new(Categories::Description).text().null())
                        .col(
                            ColumnDef::new(Categories::Icon)
                                .string_len(50)
                                .not_null()
                                .default("bi-tag"),
                        )
                        .col(
                            ColumnDef::new(Categories::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Categories::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Categories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Products::Slug).string_len(220).not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::Price).decimal_len(10, 2).not_null())
                        .col(
                            ColumnDef::new(Products::OriginalPrice)
                                .decimal_len(10, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Products::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::Sku).string_len(50).null())
                        .col(ColumnDef::new(Products::CategoryId).integer().null())
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::IsNew)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::IsTrending)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::IsFeatured)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::Views)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category_id")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category_id")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductImages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductImages::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ProductImages::ProductId).integer().not_null())
                        .col(ColumnDef::new(ProductImages::Filename).string().not_null())
                        .col(
                            ColumnDef::new(ProductImages::IsMain)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ProductImages::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductImages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_images_product_id")
                                .from(ProductImages::Table, ProductImages::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_images_product_id")
                        .table(ProductImages::Table)
                        .col(ProductImages::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductImages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
        Name,
        Slug,
        Description,
        Icon,
        SortOrder,
        IsActive,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        Slug,
        Description,
        Price,
        OriginalPrice,
        Stock,
        Sku,
        CategoryId,
        IsActive,
        IsNew,
        IsTrending,
        IsFeatured,
        Views,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductImages {
        Table,
        Id,
        ProductId,
        Filename,
        IsMain,
        SortOrder,
        CreatedAt,
    }
}

mod m20240601_000003_create_orders_tables {
    use super::m20240601_000002_create_catalog_tables::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Orders::OrderCode)
                                .string_len(20)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::ProductId).integer().not_null())
                        .col(ColumnDef::new(Orders::PaymentMethod).string_len(16).not_null())
                        .col(ColumnDef::new(Orders::Total).decimal_len(10, 2).not_null())
                        .col(ColumnDef::new(Orders::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Orders::ImageUrl).string().null())
                        .col(ColumnDef::new(Orders::Notes).text().null())
                        .col(ColumnDef::new(Orders::PaymentReference).string_len(64).null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_product_id")
                                .from(Orders::Table, Orders::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderHistory::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderHistory::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderHistory::Status).string_len(32).not_null())
                        .col(ColumnDef::new(OrderHistory::Note).text().null())
                        .col(ColumnDef::new(OrderHistory::Actor).string_len(120).not_null())
                        .col(ColumnDef::new(OrderHistory::ActorId).integer().null())
                        .col(
                            ColumnDef::new(OrderHistory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_history_order_id")
                                .from(OrderHistory::Table, OrderHistory::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_history_order_id")
                        .table(OrderHistory::Table)
                        .col(OrderHistory::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderHistory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderCode,
        ProductId,
        PaymentMethod,
        Total,
        Status,
        ImageUrl,
        Notes,
        PaymentReference,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderHistory {
        Table,
        Id,
        OrderId,
        Status,
        Note,
        Actor,
        ActorId,
        CreatedAt,
    }
}

mod m20240601_000004_create_custom_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_custom_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Clients::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Clients::Name).string_len(120).not_null())
                        .col(
                            ColumnDef::new(Clients::Phone)
                                .string_len(30)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Clients::Measurements).json().not_null())
                        .col(
                            ColumnDef::new(Clients::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Clients::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CustomOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomOrders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CustomOrders::Code)
                                .string_len(20)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(CustomOrders::ClientId).integer().not_null())
                        .col(ColumnDef::new(CustomOrders::Status).string_len(32).not_null())
                        .col(ColumnDef::new(CustomOrders::DeliveryDate).date().null())
                        .col(
                            ColumnDef::new(CustomOrders::Deposit)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CustomOrders::Total)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CustomOrders::IsUrgent)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(CustomOrders::Notes).text().null())
                        .col(
                            ColumnDef::new(CustomOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_custom_orders_client_id")
                                .from(CustomOrders::Table, CustomOrders::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CustomOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomOrderItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CustomOrderItems::CustomOrderId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomOrderItems::GarmentType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomOrderItems::Measurements)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomOrderItems::Notes).text().null())
                        .col(
                            ColumnDef::new(CustomOrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomOrderItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_custom_order_items_order_id")
                                .from(CustomOrderItems::Table, CustomOrderItems::CustomOrderId)
                                .to(CustomOrders::Table, CustomOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CustomOrderHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomOrderHistory::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CustomOrderHistory::CustomOrderId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomOrderHistory::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomOrderHistory::Note).text().not_null())
                        .col(
                            ColumnDef::new(CustomOrderHistory::Actor)
                                .string_len(120)
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomOrderHistory::ActorId).integer().null())
                        .col(
                            ColumnDef::new(CustomOrderHistory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_custom_order_history_order_id")
                                .from(
                                    CustomOrderHistory::Table,
                                    CustomOrderHistory::CustomOrderId,
                                )
                                .to(CustomOrders::Table, CustomOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_custom_order_items_order_id")
                        .table(CustomOrderItems::Table)
                        .col(CustomOrderItems::CustomOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_custom_order_history_order_id")
                        .table(CustomOrderHistory::Table)
                        .col(CustomOrderHistory::CustomOrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CustomOrderHistory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CustomOrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CustomOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Clients {
        Table,
        Id,
        Name,
        Phone,
        Measurements,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CustomOrders {
        Table,
        Id,
        Code,
        ClientId,
        Status,
        DeliveryDate,
        Deposit,
        Total,
        IsUrgent,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CustomOrderItems {
        Table,
        Id,
        CustomOrderId,
        GarmentType,
        Measurements,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CustomOrderHistory {
        Table,
        Id,
        CustomOrderId,
        Status,
        Note,
        Actor,
        ActorId,
        CreatedAt,
    }
}

mod m20240601_000005_create_site_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_site_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Themes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Themes::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Themes::Name)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Themes::PrimaryColor).string_len(7).not_null())
                        .col(ColumnDef::new(Themes::SecondaryColor).string_len(7).not_null())
                        .col(ColumnDef::new(Themes::AccentColor).string_len(7).not_null())
                        .col(ColumnDef::new(Themes::TextColor).string_len(7).not_null())
                        .col(ColumnDef::new(Themes::BgColor).string_len(7).not_null())
                        .col(ColumnDef::new(Themes::SuccessColor).string_len(7).not_null())
                        .col(ColumnDef::new(Themes::ErrorColor).string_len(7).not_null())
                        .col(
                            ColumnDef::new(Themes::IsDefault)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Themes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ContactInfo::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ContactInfo::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ContactInfo::Whatsapp).string_len(20).null())
                        .col(ColumnDef::new(ContactInfo::Phone).string_len(20).null())
                        .col(ColumnDef::new(ContactInfo::Email).string_len(120).null())
                        .col(ColumnDef::new(ContactInfo::Tiktok).string().null())
                        .col(ColumnDef::new(ContactInfo::Facebook).string().null())
                        .col(ColumnDef::new(ContactInfo::Instagram).string().null())
                        .col(ColumnDef::new(ContactInfo::Youtube).string().null())
                        .col(ColumnDef::new(ContactInfo::Telegram).string().null())
                        .col(ColumnDef::new(ContactInfo::Address).string().null())
                        .col(ColumnDef::new(ContactInfo::City).string_len(100).null())
                        .col(ColumnDef::new(ContactInfo::Schedule).string().null())
                        .col(ColumnDef::new(ContactInfo::MapEmbed).text().null())
                        .col(
                            ColumnDef::new(ContactInfo::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SiteSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SiteSettings::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SiteSettings::SiteName).string_len(100).not_null())
                        .col(ColumnDef::new(SiteSettings::Tagline).string().null())
                        .col(ColumnDef::new(SiteSettings::Logo).string().null())
                        .col(ColumnDef::new(SiteSettings::Favicon).string().null())
                        .col(ColumnDef::new(SiteSettings::MetaDescription).text().null())
                        .col(ColumnDef::new(SiteSettings::MetaKeywords).string().null())
                        .col(
                            ColumnDef::new(SiteSettings::ShowPrices)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(SiteSettings::MaintenanceMode)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(SiteSettings::ExchangeRate)
                                .decimal_len(10, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(SiteSettings::QrImage).string().null())
                        .col(
                            ColumnDef::new(SiteSettings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Notifications::Message).string().not_null())
                        .col(ColumnDef::new(Notifications::Kind).string_len(16).not_null())
                        .col(ColumnDef::new(Notifications::AdminName).string_len(120).null())
                        .col(
                            ColumnDef::new(Notifications::IsRead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SiteSettings::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ContactInfo::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Themes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Themes {
        Table,
        Id,
        Name,
        PrimaryColor,
        SecondaryColor,
        AccentColor,
        TextColor,
        BgColor,
        SuccessColor,
        ErrorColor,
        IsDefault,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ContactInfo {
        Table,
        Id,
        Whatsapp,
        Phone,
        Email,
        Tiktok,
        Facebook,
        Instagram,
        Youtube,
        Telegram,
        Address,
        City,
        Schedule,
        MapEmbed,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SiteSettings {
        Table,
        Id,
        SiteName,
        Tagline,
        Logo,
        Favicon,
        MetaDescription,
        MetaKeywords,
        ShowPrices,
        MaintenanceMode,
        ExchangeRate,
        QrImage,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Notifications {
        Table,
        Id,
        Message,
        Kind,
        AdminName,
        IsRead,
        CreatedAt,
    }
}
