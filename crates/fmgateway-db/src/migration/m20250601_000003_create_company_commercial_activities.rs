//! create company_commercial_activities table migration.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_companies::Companies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CompanyCommercialActivities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompanyCommercialActivities::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CompanyCommercialActivities::CompanyId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompanyCommercialActivities::Code)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompanyCommercialActivities::Description)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_company_commercial_activities_company")
                            .from(
                                CompanyCommercialActivities::Table,
                                CompanyCommercialActivities::CompanyId,
                            )
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_company_commercial_activities_company_id")
                    .table(CompanyCommercialActivities::Table)
                    .col(CompanyCommercialActivities::CompanyId)
                    .to_owned(),
            )
            .await?;

        // one activity code at most once per company
        manager
            .create_index(
                Index::create()
                    .name("idx_company_commercial_activities_company_code")
                    .table(CompanyCommercialActivities::Table)
                    .col(CompanyCommercialActivities::CompanyId)
                    .col(CompanyCommercialActivities::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(CompanyCommercialActivities::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
pub enum CompanyCommercialActivities {
    #[sea_orm(iden = "company_commercial_activities")]
    Table,
    Id,
    CompanyId,
    Code,
    Description,
}
