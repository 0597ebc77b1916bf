use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_geo_references_table::Migration),
            Box::new(m20250601_000002_create_postal_codes_table::Migration),
            Box::new(m20250601_000003_create_profiles_table::Migration),
            Box::new(m20250601_000004_create_bookings_table::Migration),
            Box::new(m20250601_000005_create_interests_table::Migration),
        ]
    }
}

mod m20250601_000001_create_geo_references_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000001_create_geo_references_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(GeoReferences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GeoReferences::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GeoReferences::City).string().not_null())
                        .col(ColumnDef::new(GeoReferences::State).string_len(2).not_null())
                        .col(
                            ColumnDef::new(GeoReferences::NormalizedCity)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GeoReferences::Latitude).double().not_null())
                        .col(ColumnDef::new(GeoReferences::Longitude).double().not_null())
                        .col(
                            ColumnDef::new(GeoReferences::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("ux_geo_references_city_state")
                        .table(GeoReferences::Table)
                        .col(GeoReferences::City)
                        .col(GeoReferences::State)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_geo_references_normalized")
                        .table(GeoReferences::Table)
                        .col(GeoReferences::NormalizedCity)
                        .col(GeoReferences::State)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(GeoReferences::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum GeoReferences {
        Table,
        Id,
        City,
        State,
        NormalizedCity,
        Latitude,
        Longitude,
        UpdatedAt,
    }
}

mod m20250601_000002_create_postal_codes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000002_create_postal_codes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PostalCodes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PostalCodes::Code)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PostalCodes::City).string().not_null())
                        .col(ColumnDef::new(PostalCodes::State).string_len(2).not_null())
                        .col(
                            ColumnDef::new(PostalCodes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PostalCodes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PostalCodes {
        Table,
        Code,
        City,
        State,
        UpdatedAt,
    }
}

mod m20250601_000003_create_profiles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000003_create_profiles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Profiles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Profiles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Profiles::Kind).string_len(16).not_null())
                        .col(ColumnDef::new(Profiles::DisplayName).string().not_null())
                        .col(ColumnDef::new(Profiles::City).string().null())
                        .col(ColumnDef::new(Profiles::State).string_len(2).null())
                        .col(ColumnDef::new(Profiles::PostalCode).string().null())
                        .col(ColumnDef::new(Profiles::Latitude).double().null())
                        .col(ColumnDef::new(Profiles::Longitude).double().null())
                        .col(ColumnDef::new(Profiles::ServiceRadiusKm).double().null())
                        .col(
                            ColumnDef::new(Profiles::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Profiles::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_profiles_kind_location")
                        .table(Profiles::Table)
                        .col(Profiles::Kind)
                        .col(Profiles::Latitude)
                        .col(Profiles::Longitude)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Profiles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Profiles {
        Table,
        Id,
        Kind,
        DisplayName,
        City,
        State,
        PostalCode,
        Latitude,
        Longitude,
        ServiceRadiusKm,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250601_000004_create_bookings_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000004_create_bookings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Bookings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Bookings::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Bookings::OwnerProfileId).uuid().not_null())
                        .col(ColumnDef::new(Bookings::EntityId).uuid().not_null())
                        .col(ColumnDef::new(Bookings::EntityKind).string_len(16).not_null())
                        .col(ColumnDef::new(Bookings::StartDate).date().not_null())
                        .col(ColumnDef::new(Bookings::StartTime).time().not_null())
                        .col(ColumnDef::new(Bookings::EndDate).date().not_null())
                        .col(ColumnDef::new(Bookings::EndTime).time().not_null())
                        .col(ColumnDef::new(Bookings::InterestId).uuid().null())
                        .col(
                            ColumnDef::new(Bookings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Bookings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bookings_entity_id")
                        .table(Bookings::Table)
                        .col(Bookings::EntityId)
                        .col(Bookings::StartDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Bookings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Bookings {
        Table,
        Id,
        OwnerProfileId,
        EntityId,
        EntityKind,
        StartDate,
        StartTime,
        EndDate,
        EndTime,
        InterestId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250601_000005_create_interests_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000005_create_interests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Interests::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Interests::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Interests::InterestedProfileId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Interests::TargetProfileId).uuid().not_null())
                        .col(ColumnDef::new(Interests::ProposedDate).date().not_null())
                        .col(ColumnDef::new(Interests::ProposedStartTime).time().not_null())
                        .col(ColumnDef::new(Interests::DurationHours).double().not_null())
                        .col(
                            ColumnDef::new(Interests::OfferedHourlyRate)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Interests::OfferedCoverCharge)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Interests::Message).text().null())
                        .col(
                            ColumnDef::new(Interests::Status)
                                .string_len(32)
                                .not_null()
                                .default("AWAITING_CONFIRMATION"),
                        )
                        .col(
                            ColumnDef::new(Interests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Interests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_interests_target_profile_id")
                        .table(Interests::Table)
                        .col(Interests::TargetProfileId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Interests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Interests {
        Table,
        Id,
        InterestedProfileId,
        TargetProfileId,
        ProposedDate,
        ProposedStartTime,
        DurationHours,
        OfferedHourlyRate,
        OfferedCoverCharge,
        Message,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}
