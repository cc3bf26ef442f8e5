//! Document text extraction
//!
//! Dispatches on file extension: images go straight to OCR, PDFs try the
//! embedded text layer first and fall back to rendering pages for OCR when
//! the direct extraction comes back blank.

pub mod pdf;

use std::sync::Arc;

use crate::ocr::{OcrError, OcrService};
use pdf::PdfDocument;

/// Scale used when rasterizing PDF pages for OCR.
const OCR_RENDER_SCALE: f32 = 2.0;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Image,
}

impl SourceFormat {
    /// Detect from the filename extension, case-insensitive.
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = std::path::Path::new(name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" | "png" | "bmp" | "tiff" => Some(Self::Image),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported file format")]
    UnsupportedFormat,

    #[error("Empty file")]
    EmptyFile,

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Extraction task failed: {0}")]
    TaskJoin(String),
}

/// Outcome of one extraction.
#[derive(Debug)]
pub struct ExtractedText {
    pub text: String,
    /// ISO 639-3 code, falls back to "eng".
    pub language: String,
}

/// Extraction orchestrator: owns the extension dispatch and the OCR fallback.
pub struct TextExtractor {
    ocr: Arc<OcrService>,
}

impl TextExtractor {
    pub fn new(ocr: Arc<OcrService>) -> Self {
        Self { ocr }
    }

    /// Extract text from an uploaded file.
    ///
    /// Unsupported extensions are rejected before the bytes are looked at.
    pub async fn extract(
        &self,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<ExtractedText, ExtractError> {
        let format =
            SourceFormat::from_filename(filename).ok_or(ExtractError::UnsupportedFormat)?;
        if data.is_empty() {
            return Err(ExtractError::EmptyFile);
        }

        let text = match format {
            SourceFormat::Image => self.ocr.recognize(&data, None).await?.text,
            SourceFormat::Pdf => self.extract_pdf(data).await?,
        };

        let language = detect_language(&text);
        Ok(ExtractedText { text, language })
    }

    /// PDF path: direct text layer, then a deterministic OCR fallback when
    /// the result is blank.
    async fn extract_pdf(&self, data: Vec<u8>) -> Result<String, ExtractError> {
        let doc = tokio::task::spawn_blocking(move || PdfDocument::from_bytes(data))
            .await
            .map_err(|e| ExtractError::TaskJoin(e.to_string()))??;
        let doc = Arc::new(doc);

        let direct = {
            let doc = doc.clone();
            tokio::task::spawn_blocking(move || doc.extract_text())
                .await
                .map_err(|e| ExtractError::TaskJoin(e.to_string()))??
        };

        if !is_blank(&direct) {
            return Ok(direct);
        }

        tracing::info!(
            pages = doc.page_count(),
            "PDF has no text layer, running OCR fallback"
        );

        let pages = {
            let doc = doc.clone();
            tokio::task::spawn_blocking(move || {
                (0..doc.page_count())
                    .map(|index| doc.render_page(index, OCR_RENDER_SCALE))
                    .collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(|e| ExtractError::TaskJoin(e.to_string()))??
        };

        Ok(self.ocr.recognize_pages(&pages, None).await?)
    }
}

/// Whitespace-only extraction counts as no text layer.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn detect_language(text: &str) -> String {
    whatlang::detect_lang(text)
        .unwrap_or(whatlang::Lang::Eng)
        .code()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{MockProvider, OcrProvider, OcrServiceConfig};

    fn extractor_with_text(text: &str) -> TextExtractor {
        let service = OcrService::with_providers(
            OcrServiceConfig::default(),
            vec![Arc::new(MockProvider {
                provider: OcrProvider::Tesseract,
                text: Some(text.to_string()),
                available: true,
            })],
        );
        TextExtractor::new(Arc::new(service))
    }

    fn extractor_without_providers() -> TextExtractor {
        let service = OcrService::with_providers(OcrServiceConfig::default(), Vec::new());
        TextExtractor::new(Arc::new(service))
    }

    /// Builds a valid one-page PDF. With `page_text` the page carries a real
    /// text layer; without it the page is content-free, like a scan whose
    /// text only exists as pixels.
    fn build_pdf(page_text: Option<&str>) -> Vec<u8> {
        let content = match page_text {
            Some(text) => format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET"),
            None => String::new(),
        };
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, body).as_bytes());
        }
        let xref_offset = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_format_from_filename() {
        assert_eq!(SourceFormat::from_filename("a.pdf"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_filename("a.PDF"), Some(SourceFormat::Pdf));
        assert_eq!(
            SourceFormat::from_filename("scan.jpeg"),
            Some(SourceFormat::Image)
        );
        assert_eq!(
            SourceFormat::from_filename("photo.TIFF"),
            Some(SourceFormat::Image)
        );
        assert_eq!(SourceFormat::from_filename("notes.txt"), None);
        assert_eq!(SourceFormat::from_filename("no_extension"), None);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  \n\t  "));
        assert!(!is_blank("  word  "));
    }

    #[test]
    fn test_detect_language_falls_back_to_english() {
        assert_eq!(detect_language(""), "eng");
    }

    #[tokio::test]
    async fn test_image_goes_through_ocr() {
        let extractor = extractor_with_text("recognized words");
        let result = extractor
            .extract("photo.png", vec![0u8; 16])
            .await
            .unwrap();
        assert_eq!(result.text, "recognized words");
    }

    #[tokio::test]
    async fn test_unsupported_extension_rejected_before_extraction() {
        // No providers configured: reaching OCR would fail differently, so an
        // UnsupportedFormat error proves extraction never started.
        let extractor = extractor_without_providers();
        let result = extractor.extract("notes.txt", vec![1, 2, 3]).await;
        assert!(matches!(result, Err(ExtractError::UnsupportedFormat)));
    }

    #[tokio::test]
    async fn test_textless_pdf_falls_back_to_ocr() {
        let extractor = extractor_with_text("rescued by ocr");
        let result = extractor
            .extract("scan.pdf", build_pdf(None))
            .await
            .unwrap();
        assert_eq!(result.text, "rescued by ocr");
        assert!(!result.text.trim().is_empty());
    }

    #[tokio::test]
    async fn test_pdf_text_layer_bypasses_ocr() {
        // No providers configured: taking the fallback would fail with a
        // provider error, so a successful extraction proves the text layer
        // was used directly.
        let extractor = extractor_without_providers();
        let result = extractor
            .extract("report.pdf", build_pdf(Some("Hello PDF")))
            .await
            .unwrap();
        assert!(result.text.contains("Hello PDF"));
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let extractor = extractor_without_providers();
        let result = extractor.extract("scan.pdf", Vec::new()).await;
        assert!(matches!(result, Err(ExtractError::EmptyFile)));
    }
}
