//! Migration: Create use_cases table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_companies_table::Companies;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn json_array(col: UseCases) -> ColumnDef {
    ColumnDef::new(col)
        .json_binary()
        .not_null()
        .default(Expr::cust("'[]'::jsonb"))
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UseCases::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UseCases::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(UseCases::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(UseCases::Title).string().not_null())
                    .col(ColumnDef::new(UseCases::Description).text().not_null())
                    .col(ColumnDef::new(UseCases::OriginalText).text().not_null())
                    .col(ColumnDef::new(UseCases::Objective).text().null())
                    .col(&mut json_array(UseCases::Actors))
                    .col(&mut json_array(UseCases::Flows))
                    .col(&mut json_array(UseCases::BusinessRules))
                    .col(
                        ColumnDef::new(UseCases::Status)
                            .string_len(32)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(UseCases::AiAnalysis).json_binary().null())
                    .col(&mut json_array(UseCases::SelectedDomains))
                    .col(&mut json_array(UseCases::SelectedApis))
                    .col(&mut json_array(UseCases::CustomSchemas))
                    .col(&mut json_array(UseCases::DataSources))
                    .col(ColumnDef::new(UseCases::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(UseCases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UseCases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_use_cases_company")
                            .from(UseCases::Table, UseCases::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UseCases::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum UseCases {
    Table,
    Id,
    CompanyId,
    Title,
    Description,
    OriginalText,
    Objective,
    Actors,
    Flows,
    BusinessRules,
    Status,
    AiAnalysis,
    SelectedDomains,
    SelectedApis,
    CustomSchemas,
    DataSources,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
