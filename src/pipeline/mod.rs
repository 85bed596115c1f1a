//! Pipeline stages for splitting a checklist report.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ [ocr] ──▶ detect ──▶ partition ──▶ export ──▶ archive
//! (URL/path) (pdfium)   (VLM)     (fields)   (ranges)     (sanitize)  (zip)
//! ```
//!
//! 1. [`input`]: read or download the PDF and check its magic bytes
//! 2. [`extract`]: per-page text, rasterisation and page-range copies
//! 3. [`ocr`]: transcribe the cropped title band ([`encode`]) of blank
//!    pages
//! 4. [`detect`]: classify each page, reading fields through [`fields`]
//! 5. [`partition`]: header pages → contiguous `[start, end)` ranges
//! 6. [`export`]: copy each range and name it with [`sanitize`]
//! 7. [`archive`]: collect the entries in a zip

pub mod archive;
pub mod detect;
pub mod encode;
pub mod export;
pub mod extract;
pub mod fields;
pub mod input;
pub mod ocr;
pub mod partition;
pub mod sanitize;
