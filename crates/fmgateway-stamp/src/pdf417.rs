//! PDF417 encoding of TED stamps.
//!
//! the TED XML is encoded at error-correction level 2 and rendered to a
//! black/white PNG. pixel dimensions follow a size table keyed by payload
//! length, generous enough that the scaler never rejects a symbol the
//! encoder accepted.

use std::collections::HashMap;
use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use rxing::{
    BarcodeFormat, EncodeHintType, EncodeHintValue, EncodingHintDictionary, MultiFormatWriter,
    Writer,
};

use crate::error::Error;
use crate::Result;

/// PDF417 error-correction level used for stamps.
pub const ERROR_CORRECTION_LEVEL: u32 = 2;

/// pick pixel dimensions for a payload of `len` bytes.
///
/// the steps leave margin over the symbol's native size at every payload
/// length the TED can reach (the symbol's own limit is near 1.8 KB).
pub fn symbol_dimensions(len: usize) -> (u32, u32) {
    if len > 2000 {
        (700, 300)
    } else if len > 1500 {
        (600, 250)
    } else if len > 1000 {
        (550, 220)
    } else if len > 500 {
        (500, 200)
    } else {
        (450, 180)
    }
}

/// encode a TED XML string, choosing dimensions from the size table.
/// returns PNG bytes.
pub fn encode_ted(ted_xml: &str) -> Result<Vec<u8>> {
    let (width, height) = symbol_dimensions(ted_xml.len());
    encode_to_png(ted_xml, width, height)
}

/// encode a payload into a black/white grayscale image of roughly the
/// requested dimensions.
pub fn encode_to_image(payload: &str, width: u32, height: u32) -> Result<GrayImage> {
    if width == 0 || height == 0 {
        return Err(Error::ScaleError(format!(
            "invalid dimensions {width}x{height}"
        )));
    }

    let mut hints: EncodingHintDictionary = HashMap::new();
    hints.insert(
        EncodeHintType::ERROR_CORRECTION,
        EncodeHintValue::ErrorCorrection(ERROR_CORRECTION_LEVEL.to_string()),
    );

    let matrix = MultiFormatWriter
        .encode_with_hints(
            payload,
            &BarcodeFormat::PDF_417,
            width as i32,
            height as i32,
            &hints,
        )
        .map_err(|e| Error::EncodingTooLarge(e.to_string()))?;

    let (w, h) = (matrix.getWidth(), matrix.getHeight());
    if w == 0 || h == 0 {
        return Err(Error::ScaleError("encoder produced an empty symbol".into()));
    }

    Ok(GrayImage::from_fn(w, h, |x, y| {
        if matrix.get(x, y) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    }))
}

/// encode a payload and render it as PNG bytes.
pub fn encode_to_png(payload: &str, width: u32, height: u32) -> Result<Vec<u8>> {
    let img = encode_to_image(payload, width, height)?;
    image_to_png(&img)
}

/// render an already-encoded symbol image as PNG bytes.
pub fn image_to_png(img: &GrayImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| Error::ScaleError(e.to_string()))?;
    Ok(bytes)
}
