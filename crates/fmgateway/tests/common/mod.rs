//! shared fixtures for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::LineEnding;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tempfile::TempDir;

use fmgateway::blob_store::LocalBlobStore;
use fmgateway::AppState;
use fmgateway_db::FmgDb;
use fmgateway_types::{Caf, Company, Config, ProcessorConfig};

/// encode a unicode string as ISO-8859-1 bytes (all fixture chars fit).
pub fn latin1(s: &str) -> Vec<u8> {
    s.chars().map(|c| c as u32 as u8).collect()
}

/// a generated CAF authorization document plus its verification key.
pub struct TestCaf {
    /// ISO-8859-1 encoded authorization XML.
    pub xml: Vec<u8>,
    /// public key matching the embedded RSASK.
    pub public: RsaPublicKey,
}

/// build an authority CAF document with a freshly generated RSA key.
pub fn test_caf_xml(
    company_code: &str,
    company_name: &str,
    document_type: u8,
    initial_folio: i64,
    final_folio: i64,
) -> TestCaf {
    let mut rng = rand::thread_rng();
    let key = RsaPrivateKey::new(&mut rng, 1024).unwrap();
    let public = RsaPublicKey::from(&key);
    let pem = key.to_pkcs1_pem(LineEnding::LF).unwrap();
    let modulus = BASE64.encode(public.n().to_bytes_be());
    let exponent = BASE64.encode(public.e().to_bytes_be());

    let xml = format!(
        r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<AUTORIZACION>
  <CAF version="1.0">
    <DA>
      <RE>{company_code}</RE>
      <RS>{company_name}</RS>
      <TD>{document_type}</TD>
      <RNG>
        <D>{initial_folio}</D>
        <H>{final_folio}</H>
      </RNG>
      <FA>2025-01-15</FA>
      <RSAPK>
        <M>{modulus}</M>
        <E>{exponent}</E>
      </RSAPK>
      <IDK>100</IDK>
    </DA>
    <FRMA algoritmo="SHA1withRSA">YXV0aG9yaXR5c2ln</FRMA>
  </CAF>
  <RSASK>{pem}</RSASK>
</AUTORIZACION>"#,
        pem = pem.as_str(),
    );

    TestCaf {
        xml: latin1(&xml),
        public,
    }
}

/// the sample DTE used across tests (ISO-8859-1 with an accented address).
pub const DTE_FIXTURE: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" standalone="no"?>
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

/// pipeline directory quartet inside a temp dir, with a fast tick.
pub fn processor_config(dir: &TempDir) -> ProcessorConfig {
    ProcessorConfig {
        source_dir: dir.path().join("source"),
        inprogress_dir: dir.path().join("inprogress"),
        destination_dir: dir.path().join("destination"),
        error_dir: dir.path().join("errors"),
        interval: Duration::from_millis(100),
    }
}

/// in-memory application state rooted in a temp dir.
pub async fn setup_state(dir: &TempDir) -> AppState {
    let db = FmgDb::new_in_memory().await.unwrap();
    let blobs = LocalBlobStore::new(dir.path().join("blobs")).await.unwrap();
    let config = Config {
        blob_base_path: dir.path().join("blobs"),
        processor: processor_config(dir),
        ..Config::default()
    };
    AppState::new(db, blobs, config)
}

/// register a company through the service layer.
pub async fn register_company(state: &AppState, code: &str, name: &str) -> Company {
    state
        .companies
        .save(&Company::new(
            code.to_string(),
            name.to_string(),
            "Vicuña Mackenna 9705".to_string(),
        ))
        .await
        .unwrap()
}

/// ingest a generated CAF for `company`, returning the stored CAF and the
/// key to verify its stamps.
pub async fn ingest_caf(
    state: &AppState,
    company: &Company,
    document_type: u8,
    initial_folio: i64,
    final_folio: i64,
) -> (Caf, RsaPublicKey) {
    let generated = test_caf_xml(
        &company.code,
        &company.name,
        document_type,
        initial_folio,
        final_folio,
    );
    let document = fmgateway_dte::parse_caf(&generated.xml).unwrap();
    let caf = document.into_caf(&company.id, generated.xml.clone());
    let stored = state.cafs.create(company, caf).await.unwrap();
    (stored, generated.public)
}
