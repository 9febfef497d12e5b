//! company management service.

use fmgateway_db::{Database, FmgDb};
use fmgateway_types::{CommercialActivity, Company};

use crate::error::ServiceError;

/// CRUD operations over local taxpayers and their commercial activities.
#[derive(Clone)]
pub struct CompanyService {
    db: FmgDb,
}

impl CompanyService {
    /// create a service over the store.
    pub fn new(db: FmgDb) -> Self {
        Self { db }
    }

    /// persist a new company.
    pub async fn save(&self, company: &Company) -> Result<Company, ServiceError> {
        Ok(self.db.create_company(company).await?)
    }

    /// list every company.
    pub async fn find_all(&self) -> Result<Vec<Company>, ServiceError> {
        Ok(self.db.list_companies().await?)
    }

    /// list companies whose name contains `filter` (case-insensitive).
    pub async fn find_by_name_filter(&self, filter: &str) -> Result<Vec<Company>, ServiceError> {
        Ok(self.db.list_companies_by_name(filter).await?)
    }

    /// fetch a company by id.
    pub async fn find_by_id(&self, id: &str) -> Result<Company, ServiceError> {
        self.db
            .get_company(id)
            .await?
            .ok_or_else(|| ServiceError::CompanyNotFound(id.to_string()))
    }

    /// fetch a company by taxpayer code. this is the lookup the pipeline
    /// uses to resolve a DTE's issuer; an unknown code is a recoverable
    /// error, not a crash.
    pub async fn find_by_code(&self, code: &str) -> Result<Company, ServiceError> {
        self.db
            .get_company_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::CompanyNotFound(code.to_string()))
    }

    /// update a company's fields.
    pub async fn update(&self, company: &Company) -> Result<Company, ServiceError> {
        Ok(self.db.update_company(company).await?)
    }

    /// attach a commercial activity.
    pub async fn add_commercial_activity(
        &self,
        company_id: &str,
        activity: &CommercialActivity,
    ) -> Result<(), ServiceError> {
        // ensure the company exists so the caller gets a 404, not an fk error
        self.find_by_id(company_id).await?;
        Ok(self.db.add_commercial_activity(company_id, activity).await?)
    }

    /// detach a commercial activity.
    pub async fn remove_commercial_activity(
        &self,
        company_id: &str,
        activity_id: &str,
    ) -> Result<(), ServiceError> {
        self.find_by_id(company_id).await?;
        Ok(self
            .db
            .remove_commercial_activity(company_id, activity_id)
            .await?)
    }

    /// list a company's commercial activities.
    pub async fn commercial_activities(
        &self,
        company_id: &str,
    ) -> Result<Vec<CommercialActivity>, ServiceError> {
        self.find_by_id(company_id).await?;
        Ok(self.db.list_commercial_activities(company_id).await?)
    }
}
