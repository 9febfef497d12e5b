//! invoice model parsed from DTE documents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// issuer or receiver as named inside a DTE document.
///
/// this is not a local [`crate::Company`] record - the issuer must still be
/// resolved by taxpayer code before stamping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceParty {
    /// taxpayer code (RUT).
    pub code: String,
    /// legal name.
    pub name: String,
    /// joined address ("street, commune, city", empty parts dropped).
    pub address: String,
}

/// one detail line of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetail {
    /// quantity of the item.
    pub quantity: f64,
    /// item name, optionally suffixed with " - " and the long description.
    pub description: String,
    /// unit price.
    pub unit_price: f64,
    /// line total.
    pub line_total: f64,
}

/// totalization block of an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// net (taxable) amount.
    pub taxable: f64,
    /// tax amount (IVA).
    pub tax: f64,
    /// grand total.
    pub total: f64,
}

/// a parsed DTE document, transient per request or per pipeline file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// DTE document type (33 invoice, 34 exempt, ...).
    pub document_type: u8,

    /// folio as present in the source document. for the stamping use-case
    /// the effective folio is assigned by the gateway, not taken from here.
    pub folio: i64,

    /// issue date.
    pub issue_date: NaiveDate,

    /// issuing party.
    pub issuer: InvoiceParty,

    /// receiving party, when present.
    pub receiver: Option<InvoiceParty>,

    /// ordered detail lines.
    pub details: Vec<InvoiceDetail>,

    /// totals block.
    pub totals: InvoiceTotals,
}

impl Invoice {
    /// total amount in whole currency units, as stamped into the TED MNT field.
    pub fn total_units(&self) -> u64 {
        if self.totals.total <= 0.0 {
            return 0;
        }
        self.totals.total.round() as u64
    }

    /// description of the first detail line, used for the TED IT1 field.
    pub fn first_item_description(&self) -> &str {
        self.details.first().map(|d| d.description.as_str()).unwrap_or("")
    }
}
