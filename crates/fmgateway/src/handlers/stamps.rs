//! stamp generation endpoint.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use fmgateway_stamp::pdf417;
use fmgateway_types::Invoice;

use crate::handlers::error::ApiError;
use crate::AppState;

/// query parameters for POST /companies/{id}/stamps.
#[derive(Debug, Default, Deserialize)]
pub struct StampQuery {
    /// "pdf417" to receive the barcode PNG instead of TED XML.
    pub format: Option<String>,
    /// when true, return a JSON envelope with both renderings.
    #[serde(default)]
    pub include_barcode: bool,
}

/// JSON envelope returned when `include_barcode=true`.
#[derive(Debug, Serialize)]
pub struct StampResponse {
    /// reserved folio.
    pub folio: i64,
    /// full TED XML.
    pub ted_xml: String,
    /// PDF417 PNG, base64.
    pub pdf417_png: String,
}

/// POST /companies/{id}/stamps - stamp an invoice-shaped JSON body.
///
/// returns TED XML by default, a PNG when `?format=pdf417`, or a JSON
/// envelope with both when `?include_barcode=true`. note that the folio
/// is consumed even when a later rendering step fails.
pub async fn create(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(query): Query<StampQuery>,
    Json(invoice): Json<Invoice>,
) -> Result<Response, ApiError> {
    let company = state.companies.find_by_id(&company_id).await?;

    let stamp = state
        .documents
        .stamp_for(&company, &invoice)
        .await?;
    let ted = fmgateway_dte::ted_xml(&stamp).map_err(ApiError::internal)?;

    if query.include_barcode {
        let png = pdf417::encode_ted(&ted).map_err(ApiError::internal)?;
        return Ok(Json(StampResponse {
            folio: stamp.dd.f,
            ted_xml: ted,
            pdf417_png: BASE64.encode(png),
        })
        .into_response());
    }

    match query.format.as_deref() {
        Some("pdf417") => {
            let png = pdf417::encode_ted(&ted).map_err(ApiError::internal)?;
            Ok((
                StatusCode::CREATED,
                [(header::CONTENT_TYPE, "image/png")],
                png,
            )
                .into_response())
        }
        _ => Ok((
            StatusCode::CREATED,
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            ted,
        )
            .into_response()),
    }
}
