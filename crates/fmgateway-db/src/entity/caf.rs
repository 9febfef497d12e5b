//! CAF entity for database storage.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use fmgateway_types::{Caf, CafStatus};

/// CAF database model.
///
/// `current_folio` and `status` are the only mutable columns; everything
/// else is written once at ingestion.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cafs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Blob")]
    pub raw: Vec<u8>,
    pub company_id: String,
    pub company_code: String,
    pub company_name: String,
    pub document_type: i16,
    pub initial_folio: i64,
    pub final_folio: i64,
    pub current_folio: i64,
    pub authorization_date: NaiveDate,
    pub expiration_date: NaiveDate,
    /// "OPEN" or "CLOSED".
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub signature: String,
    #[sea_orm(column_type = "Text")]
    pub rsa_pk_m: String,
    #[sea_orm(column_type = "Text")]
    pub rsa_pk_e: String,
    pub idk: String,
    #[sea_orm(column_type = "Text")]
    pub private_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Caf {
    fn from(model: Model) -> Self {
        Caf {
            id: model.id,
            raw: model.raw,
            company_id: model.company_id,
            company_code: model.company_code,
            company_name: model.company_name,
            document_type: model.document_type as u8,
            initial_folio: model.initial_folio,
            final_folio: model.final_folio,
            current_folio: model.current_folio,
            authorization_date: model.authorization_date,
            expiration_date: model.expiration_date,
            status: CafStatus::from_str_lossy(&model.status),
            signature: model.signature,
            rsa_pk_m: model.rsa_pk_m,
            rsa_pk_e: model.rsa_pk_e,
            idk: model.idk,
            private_key: model.private_key,
            created_at: model.created_at,
        }
    }
}

impl From<&Caf> for ActiveModel {
    fn from(caf: &Caf) -> Self {
        ActiveModel {
            id: Set(caf.id.clone()),
            raw: Set(caf.raw.clone()),
            company_id: Set(caf.company_id.clone()),
            company_code: Set(caf.company_code.clone()),
            company_name: Set(caf.company_name.clone()),
            document_type: Set(caf.document_type as i16),
            initial_folio: Set(caf.initial_folio),
            final_folio: Set(caf.final_folio),
            current_folio: Set(caf.current_folio),
            authorization_date: Set(caf.authorization_date),
            expiration_date: Set(caf.expiration_date),
            status: Set(caf.status.as_str().to_string()),
            signature: Set(caf.signature.clone()),
            rsa_pk_m: Set(caf.rsa_pk_m.clone()),
            rsa_pk_e: Set(caf.rsa_pk_e.clone()),
            idk: Set(caf.idk.clone()),
            private_key: Set(caf.private_key.clone()),
            created_at: Set(caf.created_at),
        }
    }
}
