//! wire format error types.

use thiserror::Error;

/// errors that can occur while reading or writing DTE wire formats.
#[derive(Debug, Error)]
pub enum Error {
    /// the document is not well-formed xml.
    #[error("malformed xml: {0}")]
    MalformedXml(String),

    /// the document's bytes do not decode under its declared encoding.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// a required element was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// a date field did not parse as YYYY-MM-DD.
    #[error("bad date in {field}: {value:?}")]
    BadDate {
        /// element the value came from.
        field: &'static str,
        /// offending text.
        value: String,
    },

    /// a numeric field did not parse.
    #[error("bad number in {field}: {value:?}")]
    BadNumber {
        /// element the value came from.
        field: &'static str,
        /// offending text.
        value: String,
    },

    /// the folio range is inverted (D > H).
    #[error("bad folio range: initial folio {d} greater than final folio {h}")]
    BadFolioRange {
        /// range start.
        d: i64,
        /// range end.
        h: i64,
    },

    /// serializing a TED failed.
    #[error("writing xml: {0}")]
    Write(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedXml(err.to_string())
    }
}
