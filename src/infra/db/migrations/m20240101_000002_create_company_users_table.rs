//! Migration: Create company_users table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_companies_table::Companies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CompanyUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CompanyUsers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CompanyUsers::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(CompanyUsers::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(CompanyUsers::Name).string().not_null())
                    .col(ColumnDef::new(CompanyUsers::Picture).string().null())
                    .col(
                        ColumnDef::new(CompanyUsers::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(CompanyUsers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CompanyUsers::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CompanyUsers::LastLogin)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_company_users_company")
                            .from(CompanyUsers::Table, CompanyUsers::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_company_users_company_id")
                    .table(CompanyUsers::Table)
                    .col(CompanyUsers::CompanyId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompanyUsers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CompanyUsers {
    Table,
    Id,
    CompanyId,
    Email,
    Name,
    Picture,
    Role,
    IsActive,
    JoinedAt,
    LastLogin,
}
