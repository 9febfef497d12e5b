//! TED stamp serialization.
//!
//! two renderings matter:
//! - [`canonical_dd`]: the exact byte sequence the stamp signature covers.
//!   marshal the `DD` subtree, strip every `\n`, `\r` and `\t`, trim.
//! - [`ted_xml`]: the full `<TED>` document written to disk and encoded
//!   into the PDF417 barcode.
//!
//! element order is fixed by the authority schema and must never depend on
//! struct field iteration: RE, TD, F, FE, RR, RSR, MNT, IT1, CAF, TSTED,
//! with the CAF subtree as DA(RE, RS, TD, RNG(D, H), FA, RSAPK(M, E), IDK)
//! followed by FRMA.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use fmgateway_types::{Dd, Stamp, TedCaf, SIGNATURE_ALGORITHM, TED_VERSION};

use crate::error::Error;
use crate::Result;

struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    fn declaration(&mut self) -> Result<&mut Self> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_err)?;
        Ok(self)
    }

    fn start(&mut self, name: &str) -> Result<&mut Self> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(write_err)?;
        Ok(self)
    }

    fn start_with_attrs(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(write_err)?;
        Ok(self)
    }

    fn end(&mut self, name: &str) -> Result<&mut Self> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(write_err)?;
        Ok(self)
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self> {
        self.start(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_err)?;
        self.end(name)
    }

    fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self> {
        self.start_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_err)?;
        self.end(name)
    }

    fn into_string(self) -> Result<String> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| Error::Write(e.to_string()))
    }
}

fn write_err(e: std::io::Error) -> Error {
    Error::Write(e.to_string())
}

fn write_caf(w: &mut XmlWriter, caf: &TedCaf) -> Result<()> {
    w.start_with_attrs("CAF", &[("version", caf.version.as_str())])?;
    w.start("DA")?;
    w.text_element("RE", &caf.da.re)?;
    w.text_element("RS", &caf.da.rs)?;
    w.text_element("TD", &caf.da.td.to_string())?;
    w.start("RNG")?;
    w.text_element("D", &caf.da.rng.d.to_string())?;
    w.text_element("H", &caf.da.rng.h.to_string())?;
    w.end("RNG")?;
    w.text_element("FA", &caf.da.fa)?;
    w.start("RSAPK")?;
    w.text_element("M", &caf.da.rsapk.m)?;
    w.text_element("E", &caf.da.rsapk.e)?;
    w.end("RSAPK")?;
    w.text_element("IDK", &caf.da.idk)?;
    w.end("DA")?;
    w.text_element_with_attrs("FRMA", &caf.frma, &[("algoritmo", caf.frma_algorithm.as_str())])?;
    w.end("CAF")?;
    Ok(())
}

fn write_dd(w: &mut XmlWriter, dd: &Dd) -> Result<()> {
    w.start("DD")?;
    w.text_element("RE", &dd.re)?;
    w.text_element("TD", &dd.td.to_string())?;
    w.text_element("F", &dd.f.to_string())?;
    w.text_element("FE", &dd.fe)?;
    w.text_element("RR", &dd.rr)?;
    w.text_element("RSR", &dd.rsr)?;
    w.text_element("MNT", &dd.mnt.to_string())?;
    w.text_element("IT1", &dd.it1)?;
    write_caf(w, &dd.caf)?;
    w.text_element("TSTED", &dd.tsted)?;
    w.end("DD")?;
    Ok(())
}

/// serialize the `DD` subtree to its canonical signed form.
///
/// the output is deterministic: the same DD always yields the same bytes,
/// and any `\n`, `\r` or `\t` that entered through chardata (multi-line
/// FRMA signatures are common) is removed before signing.
pub fn canonical_dd(dd: &Dd) -> Result<String> {
    let mut w = XmlWriter::new();
    write_dd(&mut w, dd)?;
    let rendered = w.into_string()?;
    let stripped: String = rendered
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect();
    Ok(stripped.trim().to_string())
}

/// render a complete `<TED>` document for a stamp.
///
/// UTF-8 with declaration; this is the artifact written alongside the
/// original invoice and the payload encoded into the PDF417 symbol.
pub fn ted_xml(stamp: &Stamp) -> Result<String> {
    let mut w = XmlWriter::new();
    w.declaration()?;
    w.start_with_attrs("TED", &[("version", TED_VERSION)])?;
    write_dd(&mut w, &stamp.dd)?;
    w.text_element_with_attrs(
        "FRMT",
        &stamp.frmt,
        &[("algoritmo", SIGNATURE_ALGORITHM)],
    )?;
    w.end("TED")?;
    w.into_string()
}
