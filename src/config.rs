//! Configuration types for checklist splitting.
//!
//! All splitting behaviour is controlled through [`SplitConfig`], built via
//! its [`SplitConfigBuilder`]. Detection strategy, title clean-up, naming,
//! foldering, cosmetic cleaning and the OCR fallback are all knobs here, so
//! two report families can be handled by two configs instead of two
//! pipelines.

use crate::error::SplitError;
use crate::pipeline::ocr::PageOcr;
use crate::pipeline::sanitize::DEFAULT_MAX_NAME_LEN;
use crate::progress::ProgressCallback;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Field labels that must all be present for [`HeaderStrategy::StrictFields`].
pub const DEFAULT_REQUIRED_FIELDS: &[&str] =
    &["ID", "Name", "Description", "Company", "Checklist Status"];

/// Code-like checklist title prefix, e.g. `T12.BESS.04:`.
pub const DEFAULT_TITLE_PATTERN: &str = r"T\d+\.BESS\.\d+:";

/// `Name ... Checklist` on a single line; the `title` group is the title.
pub const DEFAULT_PHRASE_PATTERN: &str =
    r"(?im)\bName\b[ \t]*[:\-]?[ \t]*(?P<title>[^\n]*?\bChecklist\b[^\n]*)";

pub const DEFAULT_UNKNOWN_LOCATION: &str = "UNKNOWN_LOCATION";
pub const DEFAULT_UNKNOWN_EQUIPMENT: &str = "UNKNOWN_EQUIPMENT";

/// Configuration for splitting a checklist report.
///
/// Built via [`SplitConfig::builder()`] or using [`SplitConfig::default()`].
///
/// # Example
/// ```rust
/// use checklist_splitter::{HeaderStrategy, SplitConfig};
///
/// let config = SplitConfig::builder()
///     .strategy(HeaderStrategy::TitlePattern)
///     .max_name_len(Some(80))
///     .folder_by_location(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SplitConfig {
    /// How header pages are recognised. Default: [`HeaderStrategy::StrictFields`].
    pub strategy: HeaderStrategy,

    /// Labels that must all appear on a page for the strict strategy.
    pub required_fields: Vec<String>,

    /// Regex for [`HeaderStrategy::TitlePattern`]. Default: `T\d+\.BESS\.\d+:`.
    pub title_pattern: String,

    /// Regex for [`HeaderStrategy::PhrasePattern`]. Must contain a `title` group.
    pub phrase_pattern: String,

    /// Where a `Name` value ends. Default: [`TitleStop::Keywords`].
    pub title_stop: TitleStop,

    /// Remove a dangling `Priority` token at the end of a title. Default: true.
    ///
    /// Some report layouts place the `Priority` label right after the name
    /// value on the same line, so it ends up inside the captured span.
    pub strip_trailing_priority: bool,

    /// Cap on sanitised name length in characters. `None` disables. Default: 100.
    pub max_name_len: Option<usize>,

    /// Put each checklist under folders derived from its `Location`. Default: true.
    pub folder_by_location: bool,

    /// Sentinel shown when a header has no `Location`.
    pub unknown_location: String,

    /// Sentinel shown when a header has no `Equipment Name`.
    pub unknown_equipment: String,

    /// White out header/footer bands on exported pages. Default: None.
    pub clean_output: Option<PageBands>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Pre-constructed OCR backend used for pages without a text layer.
    /// Takes precedence over `ocr_provider_name`.
    pub ocr: Option<Arc<dyn PageOcr>>,

    /// Vision LLM provider name for the built-in OCR backend (e.g. "openai").
    pub ocr_provider_name: Option<String>,

    /// Vision LLM model for the built-in OCR backend.
    pub ocr_model: Option<String>,

    /// Fraction of the page height, from the top, sent to OCR. Default: 0.25.
    pub ocr_title_band: f32,

    /// Longest rendered edge in pixels when rasterising for OCR. Default: 2000.
    pub max_rendered_pixels: u32,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Receives per-checklist export events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            strategy: HeaderStrategy::default(),
            required_fields: DEFAULT_REQUIRED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            title_pattern: DEFAULT_TITLE_PATTERN.to_string(),
            phrase_pattern: DEFAULT_PHRASE_PATTERN.to_string(),
            title_stop: TitleStop::default(),
            strip_trailing_priority: true,
            max_name_len: Some(DEFAULT_MAX_NAME_LEN),
            folder_by_location: true,
            unknown_location: DEFAULT_UNKNOWN_LOCATION.to_string(),
            unknown_equipment: DEFAULT_UNKNOWN_EQUIPMENT.to_string(),
            clean_output: None,
            password: None,
            ocr: None,
            ocr_provider_name: None,
            ocr_model: None,
            ocr_title_band: 0.25,
            max_rendered_pixels: 2000,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SplitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitConfig")
            .field("strategy", &self.strategy)
            .field("required_fields", &self.required_fields)
            .field("title_pattern", &self.title_pattern)
            .field("phrase_pattern", &self.phrase_pattern)
            .field("title_stop", &self.title_stop)
            .field("strip_trailing_priority", &self.strip_trailing_priority)
            .field("max_name_len", &self.max_name_len)
            .field("folder_by_location", &self.folder_by_location)
            .field("clean_output", &self.clean_output)
            .field("ocr", &self.ocr.as_ref().map(|_| "<dyn PageOcr>"))
            .field("ocr_provider_name", &self.ocr_provider_name)
            .field("ocr_model", &self.ocr_model)
            .field("ocr_title_band", &self.ocr_title_band)
            .finish()
    }
}

impl SplitConfig {
    /// Create a new builder for `SplitConfig`.
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether any OCR backend is configured, injected or by name.
    pub fn ocr_enabled(&self) -> bool {
        self.ocr.is_some() || self.ocr_provider_name.is_some()
    }
}

/// Builder for [`SplitConfig`].
pub struct SplitConfigBuilder {
    config: SplitConfig,
}

impl fmt::Debug for SplitConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl SplitConfigBuilder {
    pub fn strategy(mut self, strategy: HeaderStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn title_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.title_pattern = pattern.into();
        self
    }

    pub fn phrase_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.phrase_pattern = pattern.into();
        self
    }

    pub fn title_stop(mut self, stop: TitleStop) -> Self {
        self.config.title_stop = stop;
        self
    }

    pub fn strip_trailing_priority(mut self, v: bool) -> Self {
        self.config.strip_trailing_priority = v;
        self
    }

    pub fn max_name_len(mut self, len: Option<usize>) -> Self {
        self.config.max_name_len = len;
        self
    }

    pub fn folder_by_location(mut self, v: bool) -> Self {
        self.config.folder_by_location = v;
        self
    }

    pub fn unknown_location(mut self, sentinel: impl Into<String>) -> Self {
        self.config.unknown_location = sentinel.into();
        self
    }

    pub fn unknown_equipment(mut self, sentinel: impl Into<String>) -> Self {
        self.config.unknown_equipment = sentinel.into();
        self
    }

    pub fn clean_output(mut self, bands: Option<PageBands>) -> Self {
        self.config.clean_output = bands;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn ocr(mut self, ocr: Arc<dyn PageOcr>) -> Self {
        self.config.ocr = Some(ocr);
        self
    }

    pub fn ocr_provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.ocr_provider_name = Some(name.into());
        self
    }

    pub fn ocr_model(mut self, model: impl Into<String>) -> Self {
        self.config.ocr_model = Some(model.into());
        self
    }

    pub fn ocr_title_band(mut self, fraction: f32) -> Self {
        self.config.ocr_title_band = fraction;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SplitConfig, SplitError> {
        let c = &self.config;

        if c.strategy == HeaderStrategy::StrictFields
            && c.required_fields.iter().all(|f| f.trim().is_empty())
        {
            return Err(SplitError::InvalidConfig(
                "StrictFields strategy needs at least one required field".into(),
            ));
        }

        Regex::new(&c.title_pattern).map_err(|e| {
            SplitError::InvalidConfig(format!("title pattern does not compile: {e}"))
        })?;

        let phrase = Regex::new(&c.phrase_pattern).map_err(|e| {
            SplitError::InvalidConfig(format!("phrase pattern does not compile: {e}"))
        })?;
        if !phrase.capture_names().any(|n| n == Some("title")) {
            return Err(SplitError::InvalidConfig(
                "phrase pattern must contain a named group `title`".into(),
            ));
        }

        if c.max_name_len == Some(0) {
            return Err(SplitError::InvalidConfig(
                "max_name_len must be ≥ 1 (use None to disable truncation)".into(),
            ));
        }

        if !(c.ocr_title_band > 0.0 && c.ocr_title_band <= 1.0) {
            return Err(SplitError::InvalidConfig(format!(
                "OCR title band must be in (0, 1], got {}",
                c.ocr_title_band
            )));
        }

        if let Some(bands) = &c.clean_output {
            let valid = |pt: f32| pt.is_finite() && pt >= 0.0;
            if !valid(bands.header_pt) || !valid(bands.footer_pt) {
                return Err(SplitError::InvalidConfig(format!(
                    "clean-output bands must be finite and non-negative, got {} / {}",
                    bands.header_pt, bands.footer_pt
                )));
            }
        }

        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How a page is recognised as the first page of a checklist.
///
/// | Strategy | Header page when | Title from |
/// |----------|------------------|------------|
/// | `StrictFields` | every required label is present | `Name` label |
/// | `TitlePattern` | `title_pattern` matches | `Name` label, else the matched line |
/// | `PhrasePattern` | `phrase_pattern` matches | the `title` group |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeaderStrategy {
    /// All of `required_fields` must appear on the page. (default)
    #[default]
    StrictFields,
    /// A code-like title prefix such as `T12.BESS.04:`; suited to OCR text.
    TitlePattern,
    /// A `Name ... Checklist` line.
    PhrasePattern,
}

/// Where the value after a `Name` label ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TitleStop {
    /// At the next field label; the value may span several lines. (default)
    #[default]
    Keywords,
    /// At the first line break.
    LineBreak,
}

/// Heights, in PDF points, of the bands whited out on every exported page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBands {
    pub header_pt: f32,
    pub footer_pt: f32,
}

impl Default for PageBands {
    fn default() -> Self {
        Self {
            header_pt: 40.0,
            footer_pt: 40.0,
        }
    }
}
