//! commercial activity entity (giros comerciales) for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use fmgateway_types::CommercialActivity;

/// commercial activity database model. each row belongs to one company.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "company_commercial_activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub company_id: String,
    pub code: String,
    pub description: String,
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

impl From<Model> for CommercialActivity {
    fn from(model: Model) -> Self {
        CommercialActivity {
            id: model.id,
            code: model.code,
            description: model.description,
        }
    }
}

impl Model {
    /// build an active model binding an activity to a company.
    pub fn active_for(company_id: &str, activity: &CommercialActivity) -> ActiveModel {
        ActiveModel {
            id: Set(activity.id.clone()),
            company_id: Set(company_id.to_string()),
            code: Set(activity.code.clone()),
            description: Set(activity.description.clone()),
        }
    }
}
