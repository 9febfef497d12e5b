//! wire formats for the DTE gateway.
//!
//! three formats cross this boundary:
//! - the authority's CAF authorization XML (`<AUTORIZACION>`, ISO-8859-1),
//! - outbound DTE invoice documents (`<DTE>`, ISO-8859-1),
//! - the TED stamp the gateway emits (`<TED>`, UTF-8).
//!
//! readers follow the document's XML declaration, so ISO-8859-1 input
//! reaches the domain types as proper Unicode.

#![warn(missing_docs)]

mod caf_xml;
mod dte;
mod error;
mod ted;

pub use caf_xml::{parse_caf, CafDocument};
pub use dte::{parse_dte, DteDetail, DteDocument};
pub use error::Error;
pub use ted::{canonical_dd, ted_xml};

/// result type for wire format operations.
pub type Result<T> = std::result::Result<T, Error>;
