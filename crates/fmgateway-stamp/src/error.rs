//! stamping error types.

use thiserror::Error;

/// errors that can occur while generating a stamp.
#[derive(Debug, Error)]
pub enum Error {
    /// no OPEN CAF with available folios matches the request.
    #[error("no available CAF for company {company_id} and document type {document_type}")]
    NoAvailableCaf {
        /// company the reservation was for.
        company_id: String,
        /// requested document type.
        document_type: u8,
    },

    /// the folio store failed for a reason other than exhaustion.
    #[error("reserving folio: {0}")]
    Folio(String),

    /// the private key is empty or not recognizable as PEM.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// the signing operation itself was rejected.
    #[error("signing DD with private key: {0}")]
    Signing(String),

    /// signature verification failed.
    #[error("signature verification failed: {0}")]
    Verification(String),

    /// serializing the DD or TED failed.
    #[error("serializing stamp: {0}")]
    Serialize(#[from] fmgateway_dte::Error),

    /// the PDF417 library rejected the payload (near the symbol's limit).
    #[error("TED payload too large for PDF417: {0}")]
    EncodingTooLarge(String),

    /// the barcode could not be rendered at the requested dimensions.
    #[error("scaling PDF417 symbol: {0}")]
    ScaleError(String),
}
