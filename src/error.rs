//! Error types for the checklist-splitter library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SplitError`]: **Fatal**: the run cannot proceed at all (unreadable
//!   input, wrong password, pdfium missing, OCR backend not configured).
//!   Returned as `Err(SplitError)` from the top-level `split*` functions and
//!   never accompanied by a partial archive.
//!
//! * [`ChecklistIssue`]: **Non-fatal**: a single header candidate or range
//!   was rejected (title could not be captured, two headers on one page, OCR
//!   call failed). Stored in [`crate::output::SplitOutput::issues`] so callers
//!   can show what was skipped while every other checklist is still exported.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the checklist-splitter library.
///
/// Per-checklist anomalies use [`ChecklistIssue`] and are reported in the
/// run output rather than propagated here.
#[derive(Debug, Error)]
pub enum SplitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The input was read, but is not a PDF.
    #[error("Input is not a valid PDF: '{source_name}'\nFirst bytes: {magic:?}")]
    NotAPdf { source_name: String, magic: Vec<u8> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF")]
    WrongPassword,

    /// The document opened but contains no pages.
    #[error("PDF contains no pages")]
    EmptyDocument,

    /// pdfium could not produce the text layer of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// pdfium could not rasterise a page for OCR.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Copying a page range into a new document failed.
    #[error("Could not copy pages {start}-{end} into a new document: {detail}")]
    PageCopyFailed {
        start: usize,
        end: usize,
        detail: String,
    },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// OCR was requested by provider name but the provider cannot be built.
    #[error("OCR provider '{provider}' is not configured.\n{hint}")]
    OcrNotConfigured { provider: String, hint: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Writing an entry into the output archive failed.
    #[error("Failed to write archive entry '{entry}': {detail}")]
    ArchiveWriteFailed { entry: String, detail: String },

    /// Could not create or write the output archive file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium or point PDFIUM_LIB_PATH at a directory (or file) containing it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal anomaly found while detecting, partitioning, or exporting.
///
/// Page numbers are 0-based indices into the source document.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ChecklistIssue {
    /// The page carries a header signature but no title could be captured.
    #[error("Page {}: header fields found but no title could be captured: {detail}", page + 1)]
    MalformedHeaderSpan { page: usize, detail: String },

    /// Two headers land on the same page, so this one would export nothing.
    #[error("Page {}: checklist '{title}' has no pages (next header starts on the same page)", page + 1)]
    DegenerateRange { page: usize, title: String },

    /// A header points past the end of the document.
    #[error("Page {}: checklist '{title}' starts beyond the last page ({total_pages} pages)", page + 1)]
    HeaderOutOfRange {
        page: usize,
        title: String,
        total_pages: usize,
    },

    /// The OCR backend failed; detection degraded to zero checklists.
    #[error("Page {}: OCR failed: {detail}", page + 1)]
    OcrFailed { page: usize, detail: String },
}

/// Failure reported by a [`crate::pipeline::ocr::PageOcr`] implementation.
#[derive(Debug, Clone, Error)]
#[error("OCR failed on page {}: {detail}", page + 1)]
pub struct OcrError {
    /// 0-based page index.
    pub page: usize,
    pub detail: String,
}

impl From<OcrError> for ChecklistIssue {
    fn from(e: OcrError) -> Self {
        ChecklistIssue::OcrFailed {
            page: e.page,
            detail: e.detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_range_display_is_one_based() {
        let e = ChecklistIssue::DegenerateRange {
            page: 4,
            title: "Pump Check".into(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Page 5:"), "got: {msg}");
        assert!(msg.contains("Pump Check"));
    }

    #[test]
    fn ocr_error_converts_to_issue() {
        let issue: ChecklistIssue = OcrError {
            page: 2,
            detail: "backend offline".into(),
        }
        .into();
        assert_eq!(
            issue,
            ChecklistIssue::OcrFailed {
                page: 2,
                detail: "backend offline".into()
            }
        );
    }

    #[test]
    fn page_copy_failed_display() {
        let e = SplitError::PageCopyFailed {
            start: 3,
            end: 7,
            detail: "boom".into(),
        };
        assert!(e.to_string().contains("3-7"));
    }

    #[test]
    fn not_a_pdf_display() {
        let e = SplitError::NotAPdf {
            source_name: "report.docx".into(),
            magic: b"PK\x03\x04".to_vec(),
        };
        assert!(e.to_string().contains("report.docx"));
    }
}
