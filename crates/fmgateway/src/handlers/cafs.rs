//! CAF ingestion endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use fmgateway_types::{Caf, CafStatus};

use crate::handlers::error::ApiError;
use crate::AppState;

/// public view of a CAF row. the signing key and raw XML stay server-side.
#[derive(Debug, Serialize)]
pub struct CafResponse {
    /// CAF id.
    pub id: String,
    /// owning company id.
    pub company_id: String,
    /// taxpayer code inside the CAF.
    pub company_code: String,
    /// document type.
    pub document_type: u8,
    /// first folio of the range.
    pub initial_folio: i64,
    /// last folio of the range.
    pub final_folio: i64,
    /// next folio to issue.
    pub current_folio: i64,
    /// authorization date.
    pub authorization_date: NaiveDate,
    /// derived expiration date.
    pub expiration_date: NaiveDate,
    /// OPEN or CLOSED.
    pub status: CafStatus,
}

impl From<Caf> for CafResponse {
    fn from(caf: Caf) -> Self {
        CafResponse {
            id: caf.id,
            company_id: caf.company_id,
            company_code: caf.company_code,
            document_type: caf.document_type,
            initial_folio: caf.initial_folio,
            final_folio: caf.final_folio,
            current_folio: caf.current_folio,
            authorization_date: caf.authorization_date,
            expiration_date: caf.expiration_date,
            status: caf.status,
        }
    }
}

/// POST /companies/{id}/cafs - ingest an authority CAF document.
///
/// the body is the raw authorization XML, usually ISO-8859-1. it is read
/// as bytes so the declared encoding decides decoding - transcoding it at
/// the http layer would damage the embedded key material.
pub async fn create(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<CafResponse>), ApiError> {
    let company = state.companies.find_by_id(&company_id).await?;

    let document = fmgateway_dte::parse_caf(&body)
        .map_err(|e| ApiError::bad_request(format!("failed to parse CAF: {e}")))?;
    debug!(
        company = %company.code,
        document_type = document.td,
        initial_folio = document.rng_d,
        final_folio = document.rng_h,
        key_length = document.rsask.len(),
        "parsed CAF upload"
    );

    let caf = document.into_caf(&company.id, body.to_vec());
    let created = state.cafs.create(&company, caf).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /companies/{id}/cafs - list a company's CAFs.
pub async fn list(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<CafResponse>>, ApiError> {
    state.companies.find_by_id(&company_id).await?;
    let cafs = state.cafs.find_by_company_id(&company_id).await?;
    Ok(Json(cafs.into_iter().map(Into::into).collect()))
}
