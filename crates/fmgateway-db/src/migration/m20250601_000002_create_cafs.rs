//! create cafs table migration.

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
                    .table(Cafs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cafs::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Cafs::Raw).blob().not_null())
                    .col(ColumnDef::new(Cafs::CompanyId).string().not_null())
                    .col(ColumnDef::new(Cafs::CompanyCode).string().not_null())
                    .col(ColumnDef::new(Cafs::CompanyName).string().not_null())
                    .col(
                        ColumnDef::new(Cafs::DocumentType)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Cafs::InitialFolio).big_integer().not_null())
                    .col(ColumnDef::new(Cafs::FinalFolio).big_integer().not_null())
                    .col(ColumnDef::new(Cafs::CurrentFolio).big_integer().not_null())
                    .col(ColumnDef::new(Cafs::AuthorizationDate).date().not_null())
                    .col(ColumnDef::new(Cafs::ExpirationDate).date().not_null())
                    .col(
                        ColumnDef::new(Cafs::Status)
                            .string()
                            .not_null()
                            .default("OPEN"),
                    )
                    .col(ColumnDef::new(Cafs::Signature).text().not_null())
                    .col(ColumnDef::new(Cafs::RsaPkM).text().not_null())
                    .col(ColumnDef::new(Cafs::RsaPkE).text().not_null())
                    .col(ColumnDef::new(Cafs::Idk).string().not_null())
                    .col(ColumnDef::new(Cafs::PrivateKey).text().not_null())
                    .col(
                        ColumnDef::new(Cafs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cafs_company")
                            .from(Cafs::Table, Cafs::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // index for listing a company's CAFs
        manager
            .create_index(
                Index::create()
                    .name("idx_cafs_company_id")
                    .table(Cafs::Table)
                    .col(Cafs::CompanyId)
                    .to_owned(),
            )
            .await?;

        // covering index for the folio reservation predicate
        manager
            .create_index(
                Index::create()
                    .name("idx_cafs_reservation")
                    .table(Cafs::Table)
                    .col(Cafs::CompanyId)
                    .col(Cafs::DocumentType)
                    .col(Cafs::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cafs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Cafs {
    #[sea_orm(iden = "cafs")]
    Table,
    Id,
    Raw,
    CompanyId,
    CompanyCode,
    CompanyName,
    DocumentType,
    InitialFolio,
    FinalFolio,
    CurrentFolio,
    AuthorizationDate,
    ExpirationDate,
    Status,
    Signature,
    RsaPkM,
    RsaPkE,
    Idk,
    PrivateKey,
    CreatedAt,
}
