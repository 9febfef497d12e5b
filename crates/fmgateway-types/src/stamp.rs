//! the TED (Timbre Electrónico del Documento) stamp structures.
//!
//! the element names mirror the authority's wire format: `DD` is the signed
//! data block, `FRMT` its signature, and the embedded `CAF` subtree is a
//! verbatim projection of the authorization the folio came from.

use serde::{Deserialize, Serialize};

/// TED schema version written to the `version` attribute.
pub const TED_VERSION: &str = "1.0";

/// the literal algorithm attribute value used for both FRMA and FRMT.
pub const SIGNATURE_ALGORITHM: &str = "SHA1withRSA";

/// folio range subtree (`RNG`) of the CAF projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TedRng {
    /// first folio (desde).
    pub d: i64,
    /// last folio (hasta).
    pub h: i64,
}

/// RSA public key subtree (`RSAPK`) of the CAF projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TedRsaPk {
    /// modulus, base64.
    pub m: String,
    /// exponent, base64.
    pub e: String,
}

/// authorization data subtree (`DA`) of the CAF projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TedDa {
    /// issuer taxpayer code.
    pub re: String,
    /// issuer name.
    pub rs: String,
    /// document type.
    pub td: u8,
    /// authorized folio range.
    pub rng: TedRng,
    /// authorization date, `YYYY-MM-DD`.
    pub fa: String,
    /// the CAF public key.
    pub rsapk: TedRsaPk,
    /// key identifier.
    pub idk: String,
}

/// the CAF projection (`CAF`) embedded in every TED: the DA block followed
/// by the authority's FRMA signature, copied unmodified from the CAF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TedCaf {
    /// CAF schema version attribute.
    pub version: String,
    /// authorization data.
    pub da: TedDa,
    /// algorithm attribute of the FRMA element (`algoritmo`).
    pub frma_algorithm: String,
    /// the authority signature over DA, base64.
    pub frma: String,
}

/// the signed data block (`DD`) of a TED.
///
/// element order on the wire is fixed: RE, TD, F, FE, RR, RSR, MNT, IT1,
/// CAF, TSTED. the canonical serialization of this struct is the exact byte
/// sequence covered by [`Stamp::frmt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dd {
    /// issuer taxpayer code (RUT emisor).
    pub re: String,
    /// document type.
    pub td: u8,
    /// folio assigned by the gateway.
    pub f: i64,
    /// issue date, `YYYY-MM-DD`.
    pub fe: String,
    /// receiver taxpayer code, empty when absent.
    pub rr: String,
    /// receiver name, empty when absent.
    pub rsr: String,
    /// total amount in whole units.
    pub mnt: u64,
    /// first detail line description.
    pub it1: String,
    /// projection of the authorizing CAF.
    pub caf: TedCaf,
    /// stamping timestamp, local time `YYYY-MM-DDTHH:MM:SS`.
    pub tsted: String,
}

/// a complete stamp: the data block plus its signature.
///
/// stamps are immutable artifacts; their identity is `(caf id, folio)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamp {
    /// the signed data block.
    pub dd: Dd,
    /// SHA1withRSA signature over the canonical DD bytes, base64.
    pub frmt: String,
}
