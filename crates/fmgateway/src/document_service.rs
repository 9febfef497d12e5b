//! per-invoice document processing: stamp, barcode, receipt.

use fmgateway_stamp::{pdf417, StampEngine};
use fmgateway_types::{Invoice, Stamp};
use tracing::debug;

use crate::blob_store::BlobStore;
use crate::caf_service::CafService;
use crate::company_service::CompanyService;
use crate::error::ServiceError;
use crate::thermal;

/// the artifacts produced for one invoice.
pub struct ProcessedDocument {
    /// the signed stamp.
    pub stamp: Stamp,
    /// full TED XML document.
    pub stamp_xml: String,
    /// PDF417 rendering of the TED, PNG bytes.
    pub pdf417_png: Vec<u8>,
    /// thermal receipt with the embedded barcode, PDF bytes.
    pub thermal_pdf: Vec<u8>,
}

/// runs an invoice through the complete stamping workflow.
///
/// this is the unit of work behind both the stamps endpoint and each file
/// the integration pipeline picks up.
#[derive(Clone)]
pub struct DocumentService<B> {
    companies: CompanyService,
    engine: StampEngine<CafService<B>>,
}

impl<B: BlobStore> DocumentService<B> {
    /// create a document service.
    pub fn new(companies: CompanyService, cafs: CafService<B>) -> Self {
        Self {
            companies,
            engine: StampEngine::new(cafs),
        }
    }

    /// stamp `invoice` for an already-resolved company, without rendering
    /// the artifacts. backs the stamps endpoint, where the caller chooses
    /// the output format.
    pub async fn stamp_for(
        &self,
        company: &fmgateway_types::Company,
        invoice: &Invoice,
    ) -> Result<Stamp, ServiceError> {
        Ok(self.engine.generate(company, invoice).await?)
    }

    /// stamp `invoice` and render every artifact.
    ///
    /// the issuer must exist as a local company (resolved by taxpayer
    /// code); otherwise the invoice is rejected before any folio is
    /// consumed.
    pub async fn process_invoice(&self, invoice: &Invoice) -> Result<ProcessedDocument, ServiceError> {
        let company = self.companies.find_by_code(&invoice.issuer.code).await?;

        let stamp = self.engine.generate(&company, invoice).await?;
        let stamp_xml = fmgateway_dte::ted_xml(&stamp).map_err(ServiceError::Parse)?;

        let (width, height) = pdf417::symbol_dimensions(stamp_xml.len());
        let barcode = pdf417::encode_to_image(&stamp_xml, width, height)
            .map_err(ServiceError::from)?;
        let pdf417_png = pdf417::image_to_png(&barcode).map_err(ServiceError::from)?;

        let thermal_pdf = thermal::render_receipt(invoice, &barcode)?;

        debug!(
            folio = stamp.dd.f,
            stamp_bytes = stamp_xml.len(),
            png_bytes = pdf417_png.len(),
            pdf_bytes = thermal_pdf.len(),
            "processed invoice"
        );

        Ok(ProcessedDocument {
            stamp,
            stamp_xml,
            pdf417_png,
            thermal_pdf,
        })
    }
}
