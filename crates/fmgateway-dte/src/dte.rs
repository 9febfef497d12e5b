//! parser for outbound DTE invoice documents.
//!
//! reads `<DTE><Documento>…` with encoding awareness and normalizes the
//! header, totals and detail lines into a domain [`Invoice`].

use chrono::{NaiveDate, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use fmgateway_types::{Invoice, InvoiceDetail, InvoiceParty, InvoiceTotals};

use crate::error::Error;
use crate::Result;

/// one raw `<Detalle>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DteDetail {
    /// line number (NroLinDet).
    pub line_number: i64,
    /// item code value (CdgItem/VlrCodigo).
    pub item_code: String,
    /// item name (NmbItem), whitespace preserved.
    pub item_name: String,
    /// long description (DscItem), empty when absent.
    pub description: String,
    /// quantity (QtyItem).
    pub quantity: f64,
    /// unit of measure (UnmdItem).
    pub unit: String,
    /// unit price (PrcItem).
    pub unit_price: f64,
    /// line total (MontoItem).
    pub line_total: f64,
}

/// the raw wire view of a DTE document.
#[derive(Debug, Clone, Default)]
pub struct DteDocument {
    /// `version` attribute of the DTE root.
    pub version: String,
    /// `ID` attribute of the Documento element.
    pub id: String,
    /// document type (IdDoc/TipoDTE).
    pub document_type: u8,
    /// folio as present in the document (IdDoc/Folio).
    pub folio: i64,
    /// issue date text (IdDoc/FchEmis).
    pub issue_date: String,
    /// issuer RUT (Emisor/RUTEmisor).
    pub issuer_code: String,
    /// issuer name (Emisor/RznSoc).
    pub issuer_name: String,
    /// issuer street address (Emisor/DirOrigen).
    pub issuer_address: String,
    /// issuer commune (Emisor/CmnaOrigen).
    pub issuer_commune: String,
    /// issuer city (Emisor/CiudadOrigen).
    pub issuer_city: String,
    /// receiver RUT (Receptor/RUTRecep).
    pub receiver_code: String,
    /// receiver name (Receptor/RznSocRecep).
    pub receiver_name: String,
    /// receiver street address (Receptor/DirRecep).
    pub receiver_address: String,
    /// receiver commune (Receptor/CmnaRecep).
    pub receiver_commune: String,
    /// receiver city (Receptor/CiudadRecep).
    pub receiver_city: String,
    /// net amount (Totales/MntNeto).
    pub net_amount: f64,
    /// tax rate percent (Totales/TasaIVA).
    pub tax_rate: f64,
    /// tax amount (Totales/IVA).
    pub tax_amount: f64,
    /// grand total (Totales/MntTotal).
    pub total: f64,
    /// detail lines in document order.
    pub details: Vec<DteDetail>,
}

impl DteDocument {
    /// normalize into the domain invoice model.
    ///
    /// the parsed detail list always has the same length as the document's
    /// `<Detalle>` list. a malformed issue date falls back to today, with a
    /// warning, so a sloppy upstream cannot stall the pipeline.
    pub fn to_invoice(&self) -> Invoice {
        let issue_date = match NaiveDate::parse_from_str(self.issue_date.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                warn!(value = %self.issue_date, "unparseable FchEmis, falling back to today");
                Utc::now().date_naive()
            }
        };

        let receiver = if self.receiver_code.is_empty() && self.receiver_name.is_empty() {
            None
        } else {
            Some(InvoiceParty {
                code: self.receiver_code.clone(),
                name: self.receiver_name.clone(),
                address: join_address(
                    &self.receiver_address,
                    &self.receiver_commune,
                    &self.receiver_city,
                ),
            })
        };

        Invoice {
            document_type: self.document_type,
            folio: self.folio,
            issue_date,
            issuer: InvoiceParty {
                code: self.issuer_code.clone(),
                name: self.issuer_name.clone(),
                address: join_address(
                    &self.issuer_address,
                    &self.issuer_commune,
                    &self.issuer_city,
                ),
            },
            receiver,
            details: self.details.iter().map(detail_to_domain).collect(),
            totals: InvoiceTotals {
                taxable: self.net_amount,
                tax: self.tax_amount,
                total: self.total,
            },
        }
    }
}

fn detail_to_domain(detail: &DteDetail) -> InvoiceDetail {
    let description = if detail.description.is_empty() {
        detail.item_name.clone()
    } else {
        format!("{} - {}", detail.item_name, detail.description)
    };
    InvoiceDetail {
        quantity: detail.quantity,
        description,
        unit_price: detail.unit_price,
        line_total: detail.line_total,
    }
}

/// join address components with ", ", dropping empty parts.
fn join_address(address: &str, commune: &str, city: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    let mut joined = address.to_string();
    for part in [commune, city] {
        if !part.is_empty() {
            joined.push_str(", ");
            joined.push_str(part);
        }
    }
    joined
}

/// parse a DTE document from its raw bytes, honoring the declared encoding.
pub fn parse_dte(bytes: &[u8]) -> Result<DteDocument> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut doc = DteDocument::default();
    let mut current_detail: Option<DteDetail> = None;
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !saw_root {
                    if name != "DTE" {
                        return Err(Error::MalformedXml(format!(
                            "expected DTE root, found {name}"
                        )));
                    }
                    saw_root = true;
                    if let Ok(Some(attr)) = e.try_get_attribute("version") {
                        doc.version = attr
                            .decode_and_unescape_value(reader.decoder())
                            .map_err(|e| Error::InvalidEncoding(e.to_string()))?
                            .into_owned();
                    }
                }
                match name.as_str() {
                    "Documento" => {
                        if let Ok(Some(attr)) = e.try_get_attribute("ID") {
                            doc.id = attr
                                .decode_and_unescape_value(reader.decoder())
                                .map_err(|e| Error::InvalidEncoding(e.to_string()))?
                                .into_owned();
                        }
                    }
                    "Detalle" => current_detail = Some(DteDetail::default()),
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                path.pop();
                if name == "Detalle" {
                    if let Some(detail) = current_detail.take() {
                        doc.details.push(detail);
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let decoded = reader
                    .decoder()
                    .decode(e.as_ref())
                    .map_err(|e| Error::InvalidEncoding(e.to_string()))?;
                if decoded.trim().is_empty() {
                    continue;
                }
                let text = quick_xml::escape::unescape(&decoded)
                    .map_err(|e| Error::MalformedXml(e.to_string()))?;
                handle_text(&path, &text, &mut doc, &mut current_detail)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::MalformedXml(e.to_string())),
        }
        buf.clear();
    }

    if !saw_root {
        return Err(Error::MalformedXml("empty document".to_string()));
    }

    Ok(doc)
}

fn handle_text(
    path: &[String],
    text: &str,
    doc: &mut DteDocument,
    current_detail: &mut Option<DteDetail>,
) -> Result<()> {
    let Some(name) = path.last() else {
        return Ok(());
    };
    let in_ted = path.iter().any(|p| p == "TED");
    if in_ted {
        // an already-stamped TED inside the document is not ours to read
        return Ok(());
    }

    let parent = path.len().checked_sub(2).map(|i| path[i].as_str());

    if let Some(detail) = current_detail.as_mut() {
        match name.as_str() {
            "NroLinDet" => detail.line_number = int(text, "NroLinDet")?,
            "VlrCodigo" => detail.item_code = text.to_string(),
            // item text keeps its exact whitespace, the TED IT1 field depends on it
            "NmbItem" => detail.item_name = text.to_string(),
            "DscItem" => detail.description = text.to_string(),
            "QtyItem" => detail.quantity = float(text, "QtyItem")?,
            "UnmdItem" => detail.unit = text.to_string(),
            "PrcItem" => detail.unit_price = float(text, "PrcItem")?,
            "MontoItem" => detail.line_total = float(text, "MontoItem")?,
            _ => {}
        }
        return Ok(());
    }

    match (parent, name.as_str()) {
        (Some("IdDoc"), "TipoDTE") => {
            doc.document_type = int(text, "TipoDTE")? as u8;
        }
        (Some("IdDoc"), "Folio") => doc.folio = int(text, "Folio")?,
        (Some("IdDoc"), "FchEmis") => doc.issue_date = text.trim().to_string(),
        (Some("Emisor"), "RUTEmisor") => doc.issuer_code = text.trim().to_string(),
        (Some("Emisor"), "RznSoc") => doc.issuer_name = text.trim().to_string(),
        (Some("Emisor"), "DirOrigen") => doc.issuer_address = text.trim().to_string(),
        (Some("Emisor"), "CmnaOrigen") => doc.issuer_commune = text.trim().to_string(),
        (Some("Emisor"), "CiudadOrigen") => doc.issuer_city = text.trim().to_string(),
        (Some("Receptor"), "RUTRecep") => doc.receiver_code = text.trim().to_string(),
        (Some("Receptor"), "RznSocRecep") => doc.receiver_name = text.trim().to_string(),
        (Some("Receptor"), "DirRecep") => doc.receiver_address = text.trim().to_string(),
        (Some("Receptor"), "CmnaRecep") => doc.receiver_commune = text.trim().to_string(),
        (Some("Receptor"), "CiudadRecep") => doc.receiver_city = text.trim().to_string(),
        (Some("Totales"), "MntNeto") => doc.net_amount = float(text, "MntNeto")?,
        (Some("Totales"), "TasaIVA") => doc.tax_rate = float(text, "TasaIVA")?,
        (Some("Totales"), "IVA") => doc.tax_amount = float(text, "IVA")?,
        (Some("Totales"), "MntTotal") => doc.total = float(text, "MntTotal")?,
        _ => {}
    }
    Ok(())
}

fn int(text: &str, field: &'static str) -> Result<i64> {
    text.trim().parse::<i64>().map_err(|_| Error::BadNumber {
        field,
        value: text.to_string(),
    })
}

fn float(text: &str, field: &'static str) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|_| Error::BadNumber {
        field,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// encode a unicode string as ISO-8859-1 bytes (all fixture chars fit).
    fn latin1(s: &str) -> Vec<u8> {
        s.chars().map(|c| c as u32 as u8).collect()
    }

    const DTE_FIXTURE: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" standalone="no"?>
<DTE version="1.0">
  <Documento ID="DOC_29_33_2404">
    <Encabezado>
      <IdDoc>
        <TipoDTE>33</TipoDTE>
        <Folio>2404</Folio>
        <FchEmis>2025-05-05</FchEmis>
        <FmaPago>2</FmaPago>
        <FchVenc>2025-05-31</FchVenc>
      </IdDoc>
      <Emisor>
        <RUTEmisor>76212889-6</RUTEmisor>
        <RznSoc>FACTURA MOVIL SPA</RznSoc>
        <GiroEmis>COMERCIO AL POR MENOR DE COMPUTADORAS, SOFTWARES Y SUMINISTROS</GiroEmis>
        <CorreoEmisor>rfernandez@facturamovil.cl</CorreoEmisor>
        <Acteco>523930</Acteco>
        <Acteco>726000</Acteco>
        <DirOrigen>Vicuña Mackenna 9705</DirOrigen>
        <CmnaOrigen>La Florida</CmnaOrigen>
        <CiudadOrigen>Santiago</CiudadOrigen>
      </Emisor>
      <Receptor>
        <RUTRecep>77371419-3</RUTRecep>
        <RznSocRecep>AGRICOLA PAINE LTDA</RznSocRecep>
        <GiroRecep>Agricola</GiroRecep>
        <DirRecep>AVDA. VITACURA 2771 OF 1201</DirRecep>
        <CmnaRecep>Las Condes</CmnaRecep>
        <CiudadRecep>Santiago</CiudadRecep>
      </Receptor>
      <Totales>
        <MntNeto>35197</MntNeto>
        <TasaIVA>19</TasaIVA>
        <IVA>6687</IVA>
        <MntTotal>41884</MntTotal>
      </Totales>
    </Encabezado>
    <Detalle>
      <NroLinDet>1</NroLinDet>
      <CdgItem>
        <TpoCodigo>Interna</TpoCodigo>
        <VlrCodigo>EMP21</VlrCodigo>
      </CdgItem>
      <NmbItem>Plan Emprendedor </NmbItem>
      <DscItem>Abril 2025</DscItem>
      <QtyItem>0.90</QtyItem>
      <UnmdItem>Unid</UnmdItem>
      <PrcItem>39107.900000</PrcItem>
      <MontoItem>35197</MontoItem>
    </Detalle>
  </Documento>
</DTE>"#;

    #[test]
    fn test_parse_dte_raw_fields() {
        let doc = parse_dte(&latin1(DTE_FIXTURE)).unwrap();
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.id, "DOC_29_33_2404");
        assert_eq!(doc.document_type, 33);
        assert_eq!(doc.folio, 2404);
        assert_eq!(doc.issue_date, "2025-05-05");
        assert_eq!(doc.issuer_code, "76212889-6");
        assert_eq!(doc.issuer_name, "FACTURA MOVIL SPA");
        assert_eq!(doc.receiver_code, "77371419-3");
        assert_eq!(doc.receiver_name, "AGRICOLA PAINE LTDA");
        assert_eq!(doc.net_amount, 35197.0);
        assert_eq!(doc.tax_rate, 19.0);
        assert_eq!(doc.tax_amount, 6687.0);
        assert_eq!(doc.total, 41884.0);

        assert_eq!(doc.details.len(), 1);
        let detail = &doc.details[0];
        assert_eq!(detail.line_number, 1);
        assert_eq!(detail.item_code, "EMP21");
        // trailing space inside NmbItem is significant
        assert_eq!(detail.item_name, "Plan Emprendedor ");
        assert_eq!(detail.description, "Abril 2025");
        assert_eq!(detail.quantity, 0.9);
        assert_eq!(detail.unit, "Unid");
        assert_eq!(detail.unit_price, 39107.9);
        assert_eq!(detail.line_total, 35197.0);
    }

    #[test]
    fn test_to_invoice_round_trips_iso_8859_1() {
        let invoice = parse_dte(&latin1(DTE_FIXTURE)).unwrap().to_invoice();

        assert_eq!(invoice.document_type, 33);
        assert_eq!(invoice.folio, 2404);
        assert_eq!(
            invoice.issue_date,
            NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
        );
        // the ñ survives transcoding and the address parts are comma-joined
        assert_eq!(
            invoice.issuer.address,
            "Vicuña Mackenna 9705, La Florida, Santiago"
        );
        let receiver = invoice.receiver.as_ref().unwrap();
        assert_eq!(receiver.code, "77371419-3");
        assert_eq!(receiver.name, "AGRICOLA PAINE LTDA");
        assert_eq!(
            receiver.address,
            "AVDA. VITACURA 2771 OF 1201, Las Condes, Santiago"
        );

        assert_eq!(invoice.details.len(), 1);
        assert_eq!(
            invoice.details[0].description,
            "Plan Emprendedor  - Abril 2025"
        );
        assert_eq!(invoice.totals.taxable, 35197.0);
        assert_eq!(invoice.totals.tax, 6687.0);
        assert_eq!(invoice.totals.total, 41884.0);
        assert_eq!(invoice.total_units(), 41884);
    }

    #[test]
    fn test_detail_description_without_dsc_item() {
        let fixture = DTE_FIXTURE.replace("<DscItem>Abril 2025</DscItem>", "");
        let invoice = parse_dte(&latin1(&fixture)).unwrap().to_invoice();
        assert_eq!(invoice.details[0].description, "Plan Emprendedor ");
    }

    #[test]
    fn test_detail_count_matches_document() {
        let extra = DTE_FIXTURE.replace(
            "</Detalle>",
            "</Detalle>\n    <Detalle><NroLinDet>2</NroLinDet><NmbItem>Otro</NmbItem><QtyItem>1</QtyItem><PrcItem>10</PrcItem><MontoItem>10</MontoItem></Detalle>",
        );
        let doc = parse_dte(&latin1(&extra)).unwrap();
        assert_eq!(doc.details.len(), 2);
        assert_eq!(doc.to_invoice().details.len(), 2);
    }

    #[test]
    fn test_malformed_date_falls_back_to_today() {
        let fixture = DTE_FIXTURE.replace("2025-05-05", "05/05/2025");
        let invoice = parse_dte(&latin1(&fixture)).unwrap().to_invoice();
        assert_eq!(invoice.issue_date, Utc::now().date_naive());
    }

    #[test]
    fn test_address_joining_drops_empty_parts() {
        assert_eq!(join_address("Street 1", "", ""), "Street 1");
        assert_eq!(join_address("Street 1", "Commune", ""), "Street 1, Commune");
        assert_eq!(join_address("Street 1", "", "City"), "Street 1, City");
        assert_eq!(join_address("", "Commune", "City"), "");
    }

    #[test]
    fn test_broken_xml_is_rejected() {
        let err = parse_dte(b"this is not xml at all").unwrap_err();
        assert!(matches!(err, Error::MalformedXml(_)), "{err}");
    }
}
