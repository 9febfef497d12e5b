//! TED stamp generation for the DTE gateway.
//!
//! this crate owns everything between a parsed invoice and a signed stamp:
//! - [`pem`]: normalization of the CAF's whitespace-damaged private keys
//! - [`signer`]: SHA1withRSA signing and verification
//! - [`StampEngine`]: DD assembly and signing, fed by a [`FolioSource`]
//! - [`pdf417`]: encoding a TED into a scannable PDF417 symbol

#![warn(missing_docs)]

mod engine;
mod error;
pub mod pdf417;
pub mod pem;
pub mod signer;

pub use engine::{FolioSource, StampEngine};
pub use error::Error;

/// result type for stamping operations.
pub type Result<T> = std::result::Result<T, Error>;
