//! Migration: Index use cases by company for listing and filtering.

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_use_cases_table::UseCases;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listing filters by company, optionally by status, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_use_cases_company_status")
                    .table(UseCases::Table)
                    .col(UseCases::CompanyId)
                    .col(UseCases::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_use_cases_company_created_at")
                    .table(UseCases::Table)
                    .col(UseCases::CompanyId)
                    .col(UseCases::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_use_cases_company_created_at")
                    .table(UseCases::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_use_cases_company_status")
                    .table(UseCases::Table)
                    .to_owned(),
            )
            .await
    }
}
