//! # checklist-splitter
//!
//! Split a multi-checklist PDF report into one PDF per checklist.
//!
//! Inspection tools export many checklists as a single report. Each
//! checklist starts on a page carrying a recognisable header block (`Name`,
//! `ID`, `Company`, `Checklist Status`, ...). This crate finds those header
//! pages, cuts the page sequence into contiguous ranges, names every range
//! after its title, and packs the pieces into a zip archive, optionally
//! foldered by the `Location` hierarchy.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Extract    per-page text via pdfium (spawn_blocking)
//!  ├─ 3. OCR        blank pages only, title band → vision LLM (optional)
//!  ├─ 4. Detect     header pages + title / location / equipment
//!  ├─ 5. Partition  header pages → [start, end) ranges
//!  └─ 6. Export     copy ranges, sanitise names, write zip + summary
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use checklist_splitter::{split_to_file, SplitConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SplitConfig::default();
//!     let output = split_to_file("report.pdf", "CHECKLISTS.zip", &config).await?;
//!     println!("{}", output.status_message());
//!     println!("{}", output.summary_table());
//!     Ok(())
//! }
//! ```
//!
//! The pure stages ([`detect_headers`], [`partition`], the sanitisers) need
//! neither pdfium nor a runtime and can be driven with plain page text.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `checklist-split` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod split;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{HeaderStrategy, PageBands, SplitConfig, SplitConfigBuilder, TitleStop};
pub use error::{ChecklistIssue, OcrError, SplitError};
pub use output::{
    ChecklistHeader, ChecklistRange, ExportedChecklist, SplitOutput, SplitStats, SummaryRow,
};
pub use pipeline::archive::{ArchiveSink, MemorySink, ZipSink};
pub use pipeline::detect::{detect_headers, Detection, HeaderDetector};
pub use pipeline::extract::{PdfiumSource, SourceDocument};
pub use pipeline::ocr::{PageOcr, VisionOcr};
pub use pipeline::partition::{partition, Partition};
pub use pipeline::sanitize::{folder_path, sanitize_filename, sanitize_folder};
pub use progress::{NoopProgressCallback, ProgressCallback, SplitProgressCallback};
pub use split::{
    inspect, inspect_bytes, inspect_document, split, split_bytes, split_document,
    split_from_bytes, split_sync, split_to_file,
};
