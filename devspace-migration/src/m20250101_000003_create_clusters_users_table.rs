use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250101_000003_create_clusters_users_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClustersUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClustersUsers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClustersUsers::ClusterId).big_integer().not_null())
                    .col(ColumnDef::new(ClustersUsers::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ClustersUsers::Namespace).string_len(63).not_null())
                    .col(ColumnDef::new(ClustersUsers::SpaceName).string_len(255).not_null())
                    .col(
                        ColumnDef::new(ClustersUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ClustersUsers::DeletedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clusters_users_cluster")
                            .from(ClustersUsers::Table, ClustersUsers::ClusterId)
                            .to(Clusters::Table, Clusters::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clusters_users_user")
                            .from(ClustersUsers::Table, ClustersUsers::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clusters_users_cluster_namespace")
                    .table(ClustersUsers::Table)
                    .col(ClustersUsers::ClusterId)
                    .col(ClustersUsers::Namespace)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clusters_users_user")
                    .table(ClustersUsers::Table)
                    .col(ClustersUsers::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClustersUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClustersUsers {
    Table,
    Id,
    ClusterId,
    UserId,
    Namespace,
    SpaceName,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Clusters {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
