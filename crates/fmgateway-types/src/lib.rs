//! core types for fmgateway - a gateway for Chilean electronic tax documents (DTE).
//!
//! this crate provides the fundamental data structures used throughout the gateway:
//! - [`Caf`]: an authority-issued folio authorization with its signing key
//! - [`Company`]: a local taxpayer
//! - [`Invoice`]: a parsed DTE document
//! - [`Stamp`]: the signed TED stamp attached to an issued document
//! - [`Config`]: application configuration

#![warn(missing_docs)]

mod caf;
mod company;
mod config;
mod invoice;
mod stamp;

pub use caf::{Caf, CafStatus, caf_validity_days, document_type_name};
pub use company::{CommercialActivity, Company};
pub use config::{Config, DatabaseConfig, ProcessorConfig, parse_interval};
pub use invoice::{Invoice, InvoiceDetail, InvoiceParty, InvoiceTotals};
pub use stamp::{Dd, Stamp, TedCaf, TedDa, TedRng, TedRsaPk, SIGNATURE_ALGORITHM, TED_VERSION};
