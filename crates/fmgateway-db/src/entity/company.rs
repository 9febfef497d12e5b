//! company entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use fmgateway_types::Company;

/// company database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// taxpayer code (RUT), unique.
    pub code: String,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::caf::Entity")]
    Cafs,
    #[sea_orm(has_many = "super::commercial_activity::Entity")]
    CommercialActivities,
}

impl Related<super::caf::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cafs.def()
    }
}

impl Related<super::commercial_activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommercialActivities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Company {
    fn from(model: Model) -> Self {
        Company {
            id: model.id,
            code: model.code,
            name: model.name,
            address: model.address,
            // activities live in their own table; callers attach them
            commercial_activities: Vec::new(),
            created_at: model.created_at,
        }
    }
}

impl From<&Company> for ActiveModel {
    fn from(company: &Company) -> Self {
        ActiveModel {
            id: Set(company.id.clone()),
            code: Set(company.code.clone()),
            name: Set(company.name.clone()),
            address: Set(company.address.clone()),
            created_at: Set(company.created_at),
        }
    }
}
