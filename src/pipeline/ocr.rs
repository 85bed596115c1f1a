//! OCR fallback for pages without a text layer.
//!
//! Scanned checklist reports have no extractable text, so the detector would
//! see nothing. For every blank page the top band is rasterised and handed to
//! a [`PageOcr`] backend; whatever it transcribes becomes that page's text.
//!
//! The call is one-shot with no retry. The first failure stops OCR for the
//! run and the caller reports zero checklists instead of a partial split.

use crate::config::SplitConfig;
use crate::error::{ChecklistIssue, OcrError, SplitError};
use crate::pipeline::encode::{crop_title_band, encode_page};
use crate::pipeline::extract::SourceDocument;
use crate::prompts::{normalise_ocr_reply, OCR_SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use image::DynamicImage;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info, warn};

/// Model used when OCR is requested by provider name without a model.
pub const DEFAULT_OCR_MODEL: &str = "gpt-4.1-nano";

/// Provider name that asks for auto-detection from the environment.
pub const AUTO_PROVIDER: &str = "auto";

/// Turns a page image into text.
pub trait PageOcr: Send + Sync {
    /// Transcribe the title band of page `page` (0-based). `Ok(None)` means
    /// the image holds no readable text.
    fn extract_title(&self, page: usize, image: &DynamicImage) -> Result<Option<String>, OcrError>;
}

enum OcrRuntime {
    Shared(Handle),
    Owned(Runtime),
}

/// [`PageOcr`] backed by a vision LLM through `edgequake-llm`.
///
/// The provider API is async. Calls are driven with `block_on`, so
/// `extract_title` must run on a blocking thread (`spawn_blocking`) or
/// outside any runtime, never on an async worker.
pub struct VisionOcr {
    provider: Arc<dyn LLMProvider>,
    runtime: OcrRuntime,
    max_tokens: usize,
}

impl VisionOcr {
    /// Use the ambient Tokio runtime when there is one, else start a small
    /// current-thread runtime of our own.
    pub fn new(provider: Arc<dyn LLMProvider>) -> Result<Self, SplitError> {
        let runtime = match Handle::try_current() {
            Ok(handle) => OcrRuntime::Shared(handle),
            Err(_) => OcrRuntime::Owned(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(|e| SplitError::Internal(format!("OCR runtime: {e}")))?,
            ),
        };
        Ok(Self {
            provider,
            runtime,
            max_tokens: 1024,
        })
    }

    pub fn with_handle(provider: Arc<dyn LLMProvider>, handle: Handle) -> Self {
        Self {
            provider,
            runtime: OcrRuntime::Shared(handle),
            max_tokens: 1024,
        }
    }

    fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        match &self.runtime {
            OcrRuntime::Shared(handle) => handle.block_on(fut),
            OcrRuntime::Owned(rt) => rt.block_on(fut),
        }
    }
}

impl PageOcr for VisionOcr {
    fn extract_title(&self, page: usize, image: &DynamicImage) -> Result<Option<String>, OcrError> {
        let image_data = encode_page(image).map_err(|e| OcrError {
            page,
            detail: format!("PNG encoding failed: {e}"),
        })?;

        let messages = vec![
            ChatMessage::system(OCR_SYSTEM_PROMPT),
            ChatMessage::user_with_images("", vec![image_data]),
        ];
        let options = CompletionOptions {
            temperature: Some(0.0),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let response = self
            .block_on(self.provider.chat(&messages, Some(&options)))
            .map_err(|e| OcrError {
                page,
                detail: e.to_string(),
            })?;

        debug!(
            "Page {}: OCR used {} input / {} output tokens",
            page + 1,
            response.prompt_tokens,
            response.completion_tokens
        );
        Ok(normalise_ocr_reply(&response.content))
    }
}

/// Pick the OCR backend for a run: an injected one wins, then a provider
/// named in the config. `None` when OCR is off.
///
/// A named provider that cannot be constructed is fatal.
pub fn resolve_ocr(config: &SplitConfig) -> Result<Option<Arc<dyn PageOcr>>, SplitError> {
    if let Some(ref ocr) = config.ocr {
        return Ok(Some(Arc::clone(ocr)));
    }
    let Some(ref name) = config.ocr_provider_name else {
        return Ok(None);
    };

    let provider: Arc<dyn LLMProvider> = if name.eq_ignore_ascii_case(AUTO_PROVIDER) {
        let (llm, _embedding) =
            ProviderFactory::from_env().map_err(|e| SplitError::OcrNotConfigured {
                provider: AUTO_PROVIDER.to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                    Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --ocr-provider.\n\
                    Error: {e}"
                ),
            })?;
        llm
    } else {
        let model = config.ocr_model.as_deref().unwrap_or(DEFAULT_OCR_MODEL);
        ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            SplitError::OcrNotConfigured {
                provider: name.clone(),
                hint: format!("{e}"),
            }
        })?
    };

    info!("OCR fallback enabled via provider '{}'", name);
    Ok(Some(Arc::new(VisionOcr::new(provider)?)))
}

/// Per-page text for the detector, with OCR filling blank pages.
#[derive(Debug, Clone, Default)]
pub struct PageTexts {
    pub pages: Vec<String>,
    /// Pages whose text came from OCR.
    pub ocr_pages: usize,
    /// Set when OCR failed; the run must then report zero checklists.
    pub ocr_failure: Option<ChecklistIssue>,
}

/// Read every page's text layer, falling back to OCR on blank pages.
pub fn read_page_texts(
    doc: &dyn SourceDocument,
    ocr: Option<&dyn PageOcr>,
    title_band: f32,
    max_pixels: u32,
) -> Result<PageTexts, SplitError> {
    let total = doc.page_count();
    let mut out = PageTexts {
        pages: Vec::with_capacity(total),
        ..Default::default()
    };

    for index in 0..total {
        let mut text = doc.page_text(index)?;

        if text.trim().is_empty() {
            if let Some(ocr) = ocr {
                let image = doc.render_page(index, max_pixels)?;
                let band = crop_title_band(&image, title_band);
                match ocr.extract_title(index, &band) {
                    Ok(Some(found)) => {
                        debug!("Page {}: OCR produced {} chars", index + 1, found.len());
                        text = found;
                        out.ocr_pages += 1;
                    }
                    Ok(None) => debug!("Page {}: OCR found no text", index + 1),
                    Err(e) => {
                        let issue = ChecklistIssue::from(e);
                        warn!("{}; reporting zero checklists", issue);
                        out.ocr_failure = Some(issue);
                        return Ok(out);
                    }
                }
            }
        }

        out.pages.push(text);
    }

    if out.ocr_pages > 0 {
        info!("OCR supplied text for {}/{} pages", out.ocr_pages, total);
    }
    Ok(out)
}
