//! Session slot for the most recently extracted document

use std::sync::Arc;
use tokio::sync::RwLock;

/// Text extracted from one uploaded document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub filename: String,
    /// ISO 639-3 code detected from the text.
    pub language: String,
}

/// Process-wide slot holding the last successful extraction.
///
/// Overwritten on every successful upload, last writer wins. Readers treat a
/// whitespace-only text as absent, so an OCR run that produced nothing leaves
/// the summarize and read-aloud endpoints reporting "no text extracted".
#[derive(Clone, Default)]
pub struct DocumentSession {
    inner: Arc<RwLock<Option<ExtractedDocument>>>,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot contents.
    pub async fn store(&self, doc: ExtractedDocument) {
        let mut slot = self.inner.write().await;
        *slot = Some(doc);
    }

    /// Current document, if one with non-blank text has been stored.
    pub async fn current(&self) -> Option<ExtractedDocument> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|doc| !doc.text.trim().is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, filename: &str) -> ExtractedDocument {
        ExtractedDocument {
            text: text.to_string(),
            filename: filename.to_string(),
            language: "eng".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_session_has_no_document() {
        let session = DocumentSession::new();
        assert!(session.current().await.is_none());
    }

    #[tokio::test]
    async fn test_store_and_read_back() {
        let session = DocumentSession::new();
        session.store(doc("Hello world", "page.pdf")).await;

        let current = session.current().await.unwrap();
        assert_eq!(current.text, "Hello world");
        assert_eq!(current.filename, "page.pdf");
    }

    #[tokio::test]
    async fn test_overwrite_keeps_latest() {
        let session = DocumentSession::new();
        session.store(doc("first", "a.pdf")).await;
        session.store(doc("second", "b.png")).await;

        let current = session.current().await.unwrap();
        assert_eq!(current.text, "second");
        assert_eq!(current.filename, "b.png");
    }

    #[tokio::test]
    async fn test_blank_text_reads_as_absent() {
        let session = DocumentSession::new();
        session.store(doc("   \n\t ", "scan.pdf")).await;
        assert!(session.current().await.is_none());
    }
}
