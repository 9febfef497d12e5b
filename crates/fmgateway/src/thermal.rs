//! thermal receipt rendering.
//!
//! produces the 80 mm receipt PDF written next to each stamped invoice:
//! issuer header, document identification, receiver, detail lines, totals
//! and the SII legend, with the PDF417 stamp embedded as a grayscale
//! image. layout is presentation-only; nothing downstream parses it.

use image::GrayImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use fmgateway_types::{document_type_name, Invoice};

use crate::error::ServiceError;

/// 80 mm page width in points.
const PAGE_WIDTH: f32 = 226.77;
/// inner margin in points (~3 mm).
const MARGIN: f32 = 8.5;
/// characters per separator row at the receipt's font size.
const SEPARATOR_WIDTH: usize = 48;

#[derive(Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
    Right,
}

enum Line {
    Text {
        text: String,
        size: f32,
        bold: bool,
        align: Align,
    },
    Pair {
        left: String,
        right: String,
        size: f32,
        bold: bool,
    },
    Gap(f32),
    Barcode,
}

impl Line {
    fn height(&self, barcode_height: f32) -> f32 {
        match self {
            Line::Text { size, .. } => size * 1.35,
            Line::Pair { size, .. } => size * 1.35,
            Line::Gap(h) => *h,
            Line::Barcode => barcode_height + 6.0,
        }
    }
}

fn text(text: impl Into<String>, size: f32, bold: bool, align: Align) -> Line {
    Line::Text {
        text: text.into(),
        size,
        bold,
        align,
    }
}

fn separator() -> Line {
    text("-".repeat(SEPARATOR_WIDTH), 6.0, false, Align::Center)
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

/// replace characters outside the standard font encoding with ASCII
/// equivalents; thermal firmware fonts render little else reliably.
fn fold_ascii(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'Ñ' => 'N',
            '°' | 'º' => 'o',
            'ª' => 'a',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

/// format an amount with Chilean dot thousand separators: 41884 -> "$41.884".
fn format_clp(amount: f64) -> String {
    let whole = format!("{:.0}", amount.max(0.0));
    let mut out = String::with_capacity(whole.len() + whole.len() / 3 + 1);
    let digits: Vec<char> = whole.chars().collect();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(*digit);
    }
    format!("${out}")
}

/// wrap a long line at word boundaries, `limit` characters per row.
fn wrap(textual: &str, limit: usize) -> Vec<String> {
    if textual.len() <= limit {
        return vec![textual.to_string()];
    }
    let mut rows = Vec::new();
    let mut current = String::new();
    for word in textual.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= limit {
            current.push(' ');
            current.push_str(word);
        } else {
            rows.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

fn layout(invoice: &Invoice) -> Vec<Line> {
    let mut lines = Vec::new();

    // issuer header
    lines.push(text(fold_ascii(&invoice.issuer.name), 10.0, true, Align::Center));
    lines.push(text(
        format!("RUT: {}", invoice.issuer.code),
        8.0,
        false,
        Align::Center,
    ));
    if !invoice.issuer.address.is_empty() {
        for row in wrap(&fold_ascii(&invoice.issuer.address), 35) {
            lines.push(text(row, 8.0, false, Align::Center));
        }
    }
    lines.push(Line::Gap(4.0));

    // document identification
    lines.push(text(
        fold_ascii(&document_type_name(invoice.document_type)),
        9.0,
        true,
        Align::Center,
    ));
    lines.push(text(
        format!("No. {}", invoice.folio),
        9.0,
        true,
        Align::Center,
    ));
    lines.push(text(
        format!("Fecha: {}", invoice.issue_date.format("%d/%m/%Y")),
        8.0,
        false,
        Align::Center,
    ));
    lines.push(Line::Gap(3.0));
    lines.push(separator());

    // receiver block
    if let Some(receiver) = &invoice.receiver {
        lines.push(text("CLIENTE:", 8.0, true, Align::Left));
        for row in wrap(&fold_ascii(&receiver.name), 40) {
            lines.push(text(row, 7.0, false, Align::Left));
        }
        if !receiver.code.is_empty() {
            lines.push(text(
                format!("RUT: {}", receiver.code),
                7.0,
                false,
                Align::Left,
            ));
        }
        lines.push(Line::Gap(3.0));
        lines.push(separator());
    }

    // detail lines
    lines.push(text("DETALLE", 7.0, true, Align::Left));
    for detail in &invoice.details {
        let mut description = fold_ascii(&detail.description);
        if description.len() > 38 {
            description.truncate(35);
            description.push_str("...");
        }
        lines.push(text(description, 7.0, false, Align::Left));
        lines.push(Line::Pair {
            left: format!(
                "{:.0} x {}",
                detail.quantity,
                format_clp(detail.unit_price)
            ),
            right: format_clp(detail.line_total),
            size: 7.0,
            bold: false,
        });
    }
    lines.push(Line::Gap(3.0));
    lines.push(separator());

    // totals
    if invoice.totals.taxable > 0.0 {
        lines.push(Line::Pair {
            left: "Subtotal:".to_string(),
            right: format_clp(invoice.totals.taxable),
            size: 8.0,
            bold: false,
        });
    }
    if invoice.totals.tax > 0.0 {
        lines.push(Line::Pair {
            left: "IVA (19%):".to_string(),
            right: format_clp(invoice.totals.tax),
            size: 8.0,
            bold: false,
        });
    }
    lines.push(Line::Pair {
        left: "TOTAL:".to_string(),
        right: format_clp(invoice.totals.total),
        size: 9.0,
        bold: true,
    });
    lines.push(Line::Gap(3.0));
    lines.push(text("=".repeat(SEPARATOR_WIDTH), 6.0, false, Align::Center));
    lines.push(Line::Gap(4.0));

    // stamp section
    lines.push(text("TIMBRE ELECTRONICO SII", 8.0, true, Align::Center));
    lines.push(text("Res. 80 de 2014", 7.0, false, Align::Center));
    lines.push(text("Verifique en www.sii.cl", 7.0, false, Align::Center));
    lines.push(Line::Gap(4.0));
    lines.push(Line::Barcode);

    lines
}

/// render the receipt for `invoice`, embedding the PDF417 `barcode`.
pub fn render_receipt(invoice: &Invoice, barcode: &GrayImage) -> Result<Vec<u8>, ServiceError> {
    let barcode_width = (PAGE_WIDTH - 2.0 * MARGIN) * 0.9;
    let aspect = barcode.height() as f32 / barcode.width() as f32;
    let barcode_height = barcode_width * aspect;

    let lines = layout(invoice);
    let content_height: f32 = lines.iter().map(|l| l.height(barcode_height)).sum();
    let page_height = content_height + 2.0 * MARGIN;

    let mut operations = Vec::new();
    let mut y = page_height - MARGIN;

    for line in &lines {
        y -= line.height(barcode_height);
        match line {
            Line::Text {
                text,
                size,
                bold,
                align,
            } => {
                operations.extend(text_ops(text, *size, *bold, *align, y));
            }
            Line::Pair {
                left,
                right,
                size,
                bold,
            } => {
                operations.extend(text_ops(left, *size, *bold, Align::Left, y));
                operations.extend(text_ops(right, *size, *bold, Align::Right, y));
            }
            Line::Gap(_) => {}
            Line::Barcode => {
                let x = (PAGE_WIDTH - barcode_width) / 2.0;
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![
                        real(barcode_width),
                        0.into(),
                        0.into(),
                        real(barcode_height),
                        real(x),
                        real(y),
                    ],
                ));
                operations.push(Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]));
                operations.push(Operation::new("Q", vec![]));
            }
        }
    }

    build_document(operations, barcode, page_height)
}

fn text_ops(textual: &str, size: f32, bold: bool, align: Align, y: f32) -> Vec<Operation> {
    // Helvetica averages about half an em per character, close enough for
    // centering on a receipt
    let width = textual.len() as f32 * size * 0.5;
    let x = match align {
        Align::Left => MARGIN,
        Align::Center => ((PAGE_WIDTH - width) / 2.0).max(MARGIN),
        Align::Right => (PAGE_WIDTH - MARGIN - width).max(MARGIN),
    };
    let font = if bold { "F2" } else { "F1" };
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), real(size)]),
        Operation::new("Td", vec![real(x), real(y)]),
        Operation::new("Tj", vec![Object::string_literal(textual)]),
        Operation::new("ET", vec![]),
    ]
}

fn build_document(
    operations: Vec<Operation>,
    barcode: &GrayImage,
    page_height: f32,
) -> Result<Vec<u8>, ServiceError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let font_bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    // the barcode rides along as a raw 8-bit grayscale image xobject
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => barcode.width() as i64,
            "Height" => barcode.height() as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        barcode.as_raw().clone(),
    ));

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
            "F2" => font_bold_id,
        },
        "XObject" => dictionary! {
            "Im1" => image_id,
        },
    });

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ServiceError::Receipt(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                real(PAGE_WIDTH),
                real(page_height),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ServiceError::Receipt(e.to_string()))?;
    Ok(bytes)
}
