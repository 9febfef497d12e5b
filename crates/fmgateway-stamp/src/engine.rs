//! the stamp engine: folio reservation, DD assembly, signing.

use std::future::Future;

use chrono::Local;
use tracing::debug;

use fmgateway_dte::canonical_dd;
use fmgateway_types::{Caf, Company, Dd, Invoice, Stamp};

use crate::signer;
use crate::Result;

/// the narrow capability the engine needs from the CAF subsystem:
/// atomically reserve the next folio for a company and document type,
/// returning the folio together with a snapshot of the CAF it came from.
pub trait FolioSource: Send + Sync {
    /// reserve the next folio. fails with
    /// [`crate::Error::NoAvailableCaf`] when no OPEN CAF has folios left.
    fn reserve_folio(
        &self,
        company_id: &str,
        document_type: u8,
    ) -> impl Future<Output = Result<(Caf, i64)>> + Send;
}

/// generates signed TED stamps for invoices.
#[derive(Clone)]
pub struct StampEngine<S> {
    folios: S,
}

impl<S: FolioSource> StampEngine<S> {
    /// create an engine over a folio source.
    pub fn new(folios: S) -> Self {
        Self { folios }
    }

    /// produce a stamp for `invoice` issued by `company`.
    ///
    /// the folio counter advances durably before signing; if signing then
    /// fails the folio is burned, as the authority model requires - a folio
    /// is never reused, even when no artifact was produced for it.
    pub async fn generate(&self, company: &Company, invoice: &Invoice) -> Result<Stamp> {
        let (caf, folio) = self
            .folios
            .reserve_folio(&company.id, invoice.document_type)
            .await?;

        debug!(
            company = %company.code,
            document_type = invoice.document_type,
            folio,
            caf_id = %caf.id,
            "reserved folio for stamp"
        );

        let (rr, rsr) = match &invoice.receiver {
            Some(receiver) => (receiver.code.clone(), receiver.name.clone()),
            None => (String::new(), String::new()),
        };

        let dd = Dd {
            re: company.code.clone(),
            td: invoice.document_type,
            f: folio,
            fe: invoice.issue_date.format("%Y-%m-%d").to_string(),
            rr,
            rsr,
            mnt: invoice.total_units(),
            it1: invoice.first_item_description().to_string(),
            caf: caf.ted_projection(),
            tsted: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        };

        let canonical = canonical_dd(&dd)?;
        let frmt = signer::sign_sha1_rsa(canonical.as_bytes(), &caf.private_key)?;

        Ok(Stamp { dd, frmt })
    }
}
