//! service-level error type.
//!
//! every boundary wraps its cause with a context phrase; the handlers map
//! these onto http statuses and the pipeline maps them onto quarantine
//! events.

use thiserror::Error;

/// errors surfaced by the gateway's service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// a company id or taxpayer code did not resolve.
    #[error("company not found: {0}")]
    CompanyNotFound(String),

    /// no OPEN CAF with available folios matches the request.
    #[error("no available CAF for company {company_id} and document type {document_type}")]
    NoAvailableCaf {
        /// company the reservation was for.
        company_id: String,
        /// requested document type.
        document_type: u8,
    },

    /// a CAF or DTE document was rejected by parsing.
    #[error("parsing document: {0}")]
    Parse(#[from] fmgateway_dte::Error),

    /// key handling, signing or barcode generation failed.
    /// when this happens after reservation, the folio is already burned.
    #[error("stamping: {0}")]
    Stamp(fmgateway_stamp::Error),

    /// relational store failure.
    #[error("database: {0}")]
    Database(fmgateway_db::Error),

    /// blob store failure.
    #[error("blob storage: {0}")]
    Storage(String),

    /// thermal receipt rendering failure.
    #[error("rendering receipt: {0}")]
    Receipt(String),

    /// filesystem failure inside the file worker.
    #[error("pipeline: {0}")]
    Pipeline(String),
}

impl From<fmgateway_db::Error> for ServiceError {
    fn from(err: fmgateway_db::Error) -> Self {
        match err {
            fmgateway_db::Error::NoAvailableCaf {
                company_id,
                document_type,
            } => ServiceError::NoAvailableCaf {
                company_id,
                document_type,
            },
            other => ServiceError::Database(other),
        }
    }
}

impl From<fmgateway_stamp::Error> for ServiceError {
    fn from(err: fmgateway_stamp::Error) -> Self {
        match err {
            fmgateway_stamp::Error::NoAvailableCaf {
                company_id,
                document_type,
            } => ServiceError::NoAvailableCaf {
                company_id,
                document_type,
            },
            other => ServiceError::Stamp(other),
        }
    }
}
