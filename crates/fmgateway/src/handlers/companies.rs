//! company management endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use fmgateway_types::{CommercialActivity, Company};

use crate::handlers::error::ApiError;
use crate::AppState;

/// body for POST /companies.
#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    /// taxpayer code (RUT).
    pub code: String,
    /// legal name.
    pub name: String,
    /// postal address.
    #[serde(default)]
    pub address: String,
}

/// query parameters for GET /companies.
#[derive(Debug, Deserialize)]
pub struct ListCompaniesQuery {
    /// optional case-insensitive name filter.
    pub name: Option<String>,
}

/// POST /companies - register a taxpayer.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    if body.code.trim().is_empty() || body.name.trim().is_empty() {
        return Err(ApiError::bad_request("code and name are required"));
    }
    let company = Company::new(body.code, body.name, body.address);
    let created = state.companies.save(&company).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /companies - list taxpayers, optionally filtered by name.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListCompaniesQuery>,
) -> Result<Json<Vec<Company>>, ApiError> {
    let companies = match query.name.as_deref() {
        Some(filter) if !filter.is_empty() => {
            state.companies.find_by_name_filter(filter).await?
        }
        _ => state.companies.find_all().await?,
    };
    Ok(Json(companies))
}

/// GET /companies/{id} - fetch one taxpayer with its activities.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Company>, ApiError> {
    Ok(Json(state.companies.find_by_id(&id).await?))
}

/// body for POST /companies/{id}/activities.
#[derive(Debug, Deserialize)]
pub struct AddActivityRequest {
    /// activity code, e.g. "523930".
    pub code: String,
    /// human-readable description.
    #[serde(default)]
    pub description: String,
}

/// POST /companies/{id}/activities - attach a commercial activity.
pub async fn add_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddActivityRequest>,
) -> Result<(StatusCode, Json<CommercialActivity>), ApiError> {
    if body.code.trim().is_empty() {
        return Err(ApiError::bad_request("activity code is required"));
    }
    let activity = CommercialActivity::new(body.code, body.description);
    state.companies.add_commercial_activity(&id, &activity).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// DELETE /companies/{id}/activities/{activity_id}.
pub async fn remove_activity(
    State(state): State<AppState>,
    Path((id, activity_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .companies
        .remove_commercial_activity(&id, &activity_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /companies/{id}/activities.
pub async fn list_activities(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CommercialActivity>>, ApiError> {
    Ok(Json(state.companies.commercial_activities(&id).await?))
}
