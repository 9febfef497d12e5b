//! CAF lifecycle service: ingestion and folio consumption.

use fmgateway_db::{Database, FmgDb};
use fmgateway_stamp::FolioSource;
use fmgateway_types::{Caf, Company};
use tracing::{error, info};

use crate::blob_store::BlobStore;
use crate::error::ServiceError;

/// orchestrates CAF storage: metadata in the relational store, raw XML in
/// the blob store, folio reservation through the repository's critical
/// section.
#[derive(Clone)]
pub struct CafService<B> {
    db: FmgDb,
    blobs: B,
}

impl<B: BlobStore> CafService<B> {
    /// create a service over the store and blob sink.
    pub fn new(db: FmgDb, blobs: B) -> Self {
        Self { db, blobs }
    }

    /// ingest an authority-issued CAF for a company.
    ///
    /// the metadata row commits first; the raw XML then goes to the blob
    /// store at `caf/{company_id}/{caf_id}.xml`. a blob failure after the
    /// commit is reported to the caller - the row stays, and re-upload is
    /// an operator action.
    pub async fn create(&self, company: &Company, caf: Caf) -> Result<Caf, ServiceError> {
        let caf = self
            .db
            .create_caf(&caf)
            .await
            .map_err(ServiceError::from)?;

        let key = format!("caf/{}/{}.xml", company.id, caf.id);
        if let Err(e) = self.blobs.upload(&key, &caf.raw).await {
            error!(key, error = %e, "CAF metadata committed but blob upload failed");
            return Err(e);
        }

        info!(
            caf_id = %caf.id,
            company = %company.code,
            document_type = caf.document_type,
            initial_folio = caf.initial_folio,
            final_folio = caf.final_folio,
            "CAF ingested"
        );
        Ok(caf)
    }

    /// list the CAFs registered for a company.
    pub async fn find_by_company_id(&self, company_id: &str) -> Result<Vec<Caf>, ServiceError> {
        Ok(self.db.list_cafs_for_company(company_id).await?)
    }

    /// reserve the next folio for `(company_id, document_type)`.
    ///
    /// returns the CAF snapshot at the point of reservation together with
    /// the folio; the snapshot carries the key material and range the
    /// stamp engine embeds into the TED.
    pub async fn reserve_folio(
        &self,
        company_id: &str,
        document_type: u8,
    ) -> Result<(Caf, i64), ServiceError> {
        Ok(self.db.reserve_next_folio(company_id, document_type).await?)
    }
}

impl<B: BlobStore> FolioSource for CafService<B> {
    async fn reserve_folio(
        &self,
        company_id: &str,
        document_type: u8,
    ) -> fmgateway_stamp::Result<(Caf, i64)> {
        self.db
            .reserve_next_folio(company_id, document_type)
            .await
            .map_err(|e| match e {
                fmgateway_db::Error::NoAvailableCaf {
                    company_id,
                    document_type,
                } => fmgateway_stamp::Error::NoAvailableCaf {
                    company_id,
                    document_type,
                },
                other => fmgateway_stamp::Error::Folio(other.to_string()),
            })
    }
}
