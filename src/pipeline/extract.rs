//! PDF access: per-page text, rasterisation, and page-range copies via pdfium.
//!
//! Everything here is blocking and `PdfDocument` is not `Send`, so the whole
//! split runs inside one `tokio::task::spawn_blocking` closure (see
//! [`crate::split`]). The [`SourceDocument`] trait is the seam the rest of the
//! pipeline sees; tests implement it over plain strings.

use crate::config::PageBands;
use crate::error::SplitError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::ops::Range;
use tracing::{debug, info};

/// Environment variable naming a pdfium library file or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Read-only view of a paged document plus the one write operation the
/// exporter needs.
pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// Plain text of page `index` (0-based). Blank pages return `""`.
    fn page_text(&self, index: usize) -> Result<String, SplitError>;

    /// Rasterise page `index` with its longest edge capped at `max_pixels`.
    fn render_page(&self, index: usize, max_pixels: u32) -> Result<DynamicImage, SplitError>;

    /// Serialise pages `range` into a new standalone document, in order.
    /// With `bands`, every copied page gets white bands over its top and
    /// bottom edges.
    fn copy_pages(
        &self,
        range: Range<usize>,
        bands: Option<&PageBands>,
    ) -> Result<Vec<u8>, SplitError>;
}

/// Bind to a pdfium shared library.
///
/// Search order: `$PDFIUM_LIB_PATH` (a file, or a directory holding the
/// platform library), the working directory, then the system library path.
pub fn bind_pdfium() -> Result<Pdfium, SplitError> {
    let from_env = std::env::var(PDFIUM_LIB_PATH_ENV).ok().map(|p| {
        if std::path::Path::new(&p).is_dir() {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(p.as_str()))
        } else {
            Pdfium::bind_to_library(p)
        }
    });

    let bindings = match from_env {
        Some(Ok(bindings)) => Ok(bindings),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| SplitError::PdfiumBindingFailed(format!("{:?}", e)))?;

    debug!("pdfium bound");
    Ok(Pdfium::new(bindings))
}

/// A PDF opened by pdfium from an in-memory byte slice.
pub struct PdfiumSource<'a> {
    pdfium: &'a Pdfium,
    document: PdfDocument<'a>,
}

impl<'a> PdfiumSource<'a> {
    /// Open `bytes` as a PDF, mapping pdfium's load errors onto
    /// [`SplitError`] variants.
    pub fn load(
        pdfium: &'a Pdfium,
        bytes: &'a [u8],
        password: Option<&str>,
    ) -> Result<Self, SplitError> {
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    if password.is_some() {
                        SplitError::WrongPassword
                    } else {
                        SplitError::PasswordRequired
                    }
                } else {
                    SplitError::CorruptPdf { detail: err_str }
                }
            })?;

        info!("PDF loaded: {} pages", document.pages().len());
        Ok(Self { pdfium, document })
    }

    fn page(&self, index: usize) -> Result<PdfPage<'_>, PdfiumError> {
        let idx = u16::try_from(index).map_err(|_| PdfiumError::PageIndexOutOfBounds)?;
        self.document.pages().get(idx)
    }
}

impl SourceDocument for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, index: usize) -> Result<String, SplitError> {
        let fail = |e: PdfiumError| SplitError::TextExtractionFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        };
        let page = self.page(index).map_err(fail)?;
        let text = page.text().map_err(fail)?.all();
        debug!("Page {}: {} chars of text", index + 1, text.len());
        Ok(text)
    }

    fn render_page(&self, index: usize, max_pixels: u32) -> Result<DynamicImage, SplitError> {
        let fail = |e: PdfiumError| SplitError::RasterisationFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        };
        let render_config = PdfRenderConfig::new()
            .set_target_width(max_pixels as i32)
            .set_maximum_height(max_pixels as i32);

        let page = self.page(index).map_err(fail)?;
        let image = page
            .render_with_config(&render_config)
            .map_err(fail)?
            .as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    fn copy_pages(
        &self,
        range: Range<usize>,
        bands: Option<&PageBands>,
    ) -> Result<Vec<u8>, SplitError> {
        let fail = |detail: String| SplitError::PageCopyFailed {
            start: range.start + 1,
            end: range.end,
            detail,
        };
        if range.is_empty() || range.end > self.page_count() {
            return Err(fail(format!(
                "range outside document of {} pages",
                self.page_count()
            )));
        }

        // Bounded by page_count(), which is a u16.
        let first = range.start as u16;
        let last = (range.end - 1) as u16;

        let mut target = self
            .pdfium
            .create_new_pdf()
            .map_err(|e| fail(format!("{:?}", e)))?;
        target
            .pages_mut()
            .copy_page_range_from_document(&self.document, first..=last, 0)
            .map_err(|e| fail(format!("{:?}", e)))?;

        if let Some(bands) = bands {
            for mut page in target.pages().iter() {
                white_out_bands(&mut page, bands).map_err(|e| fail(format!("{:?}", e)))?;
            }
        }

        target.save_to_bytes().map_err(|e| fail(format!("{:?}", e)))
    }
}

fn white_out_bands(page: &mut PdfPage, bands: &PageBands) -> Result<(), PdfiumError> {
    let width = page.width().value;
    let height = page.height().value;

    let mut paint = |bottom: f32, top: f32| -> Result<(), PdfiumError> {
        if top > bottom {
            page.objects_mut().create_path_object_rect(
                PdfRect::new_from_values(bottom, 0.0, top, width),
                None,
                None,
                Some(PdfColor::WHITE),
            )?;
        }
        Ok(())
    };

    paint((height - bands.header_pt).max(0.0), height)?;
    paint(0.0, bands.footer_pt.min(height))?;
    Ok(())
}
