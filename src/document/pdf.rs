//! Serialized-access PDF wrapper over MuPDF
//!
//! MuPDF documents are not thread-safe. Instead of holding a live `Document`
//! across awaits, this wrapper keeps the raw bytes and opens a fresh document
//! for each operation while holding a mutex. No MuPDF handle ever escapes the
//! closure scope, so the wrapper stays Send + Sync through its plain fields.

use std::io::Cursor;
use std::sync::Arc;

use image::DynamicImage;
use mupdf::{Colorspace, Document, Matrix, TextPageOptions};
use parking_lot::Mutex;

use super::ExtractError;

pub struct PdfDocument {
    data: Arc<Vec<u8>>,
    page_count: usize,
    lock: Mutex<()>,
}

impl PdfDocument {
    /// Open from raw bytes, validating that MuPDF can parse the document.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ExtractError> {
        let doc = Document::from_bytes(&data, "application/pdf")
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| ExtractError::Pdf(e.to_string()))? as usize;

        Ok(Self {
            data: Arc::new(data),
            page_count,
            lock: Mutex::new(()),
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Execute a closure against a freshly opened document. Access is
    /// serialized; each operation gets a clean document state.
    fn with_doc<F, R>(&self, f: F) -> Result<R, ExtractError>
    where
        F: FnOnce(&Document) -> Result<R, mupdf::Error>,
    {
        let _guard = self.lock.lock();
        let doc = Document::from_bytes(&self.data, "application/pdf")
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;
        f(&doc).map_err(|e| ExtractError::Pdf(e.to_string()))
    }

    /// Concatenated text of every page.
    pub fn extract_text(&self) -> Result<String, ExtractError> {
        let page_count = self.page_count;
        self.with_doc(|doc| {
            let mut text = String::new();
            for index in 0..page_count {
                let page = doc.load_page(index as i32)?;
                let text_page = page.to_text_page(TextPageOptions::empty())?;
                text.push_str(&text_page.to_text()?);
            }
            Ok(text)
        })
    }

    /// Render one page to PNG at the given scale.
    pub fn render_page(&self, index: usize, scale: f32) -> Result<Vec<u8>, ExtractError> {
        let pixmap = self.with_doc(|doc| {
            let page = doc.load_page(index as i32)?;
            let matrix = Matrix::new_scale(scale, scale);
            let colorspace = Colorspace::device_rgb();
            page.to_pixmap(&matrix, &colorspace, true, true)
        })?;

        encode_pixmap_png(&pixmap)
    }
}

fn encode_pixmap_png(pixmap: &mupdf::Pixmap) -> Result<Vec<u8>, ExtractError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    // Convert to RGBA regardless of the pixmap component count
    let mut rgba_buffer = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            let a = if n >= 4 {
                samples.get(offset + 3).copied().unwrap_or(255)
            } else {
                255
            };
            rgba_buffer.extend_from_slice(&[r, g, b, a]);
        }
    }

    let img = image::RgbaImage::from_raw(width, height, rgba_buffer)
        .ok_or_else(|| ExtractError::Image("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| ExtractError::Image(e.to_string()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    // Parsing and rendering tests would require actual PDF fixtures; the
    // dispatch and fallback decisions around this wrapper are covered in the
    // parent module with mock OCR providers.
}
