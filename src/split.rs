//! Top-level split entry points.
//!
//! The synchronous core, [`split_document`], works on any
//! [`SourceDocument`] and writes into any [`ArchiveSink`]. The byte and path
//! based functions wrap it with pdfium and a zip archive. The async functions
//! add input resolution and move the pdfium work onto a blocking thread.

use crate::config::SplitConfig;
use crate::error::{ChecklistIssue, SplitError};
use crate::output::{ChecklistRange, ExportedChecklist, SplitOutput, SplitStats};
use crate::pipeline::archive::{ArchiveSink, ZipSink};
use crate::pipeline::detect::HeaderDetector;
use crate::pipeline::export::export_ranges;
use crate::pipeline::extract::{bind_pdfium, PdfiumSource, SourceDocument};
use crate::pipeline::input::{self, check_magic};
use crate::pipeline::ocr::{read_page_texts, resolve_ocr};
use crate::pipeline::partition::partition;
use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Ranges ready for export plus everything reported on the way there.
#[derive(Debug, Clone, Default)]
pub struct SplitPlan {
    pub ranges: Vec<ChecklistRange>,
    pub issues: Vec<ChecklistIssue>,
    pub stats: SplitStats,
}

/// Read, detect and partition without copying any page.
///
/// # Errors
/// [`SplitError::EmptyDocument`] for a zero-page document; extraction and
/// OCR-setup failures as returned by the collaborators. A failing OCR call is
/// not an error: the plan is empty and carries [`ChecklistIssue::OcrFailed`].
pub fn plan_document(
    doc: &dyn SourceDocument,
    config: &SplitConfig,
) -> Result<SplitPlan, SplitError> {
    let start = Instant::now();
    let total_pages = doc.page_count();
    if total_pages == 0 {
        return Err(SplitError::EmptyDocument);
    }

    let detector = HeaderDetector::new(config)?;
    let ocr = resolve_ocr(config)?;
    let texts = read_page_texts(
        doc,
        ocr.as_deref(),
        config.ocr_title_band,
        config.max_rendered_pixels,
    )?;

    let mut plan = SplitPlan {
        stats: SplitStats {
            total_pages,
            ocr_pages: texts.ocr_pages,
            ..Default::default()
        },
        ..Default::default()
    };

    if let Some(issue) = texts.ocr_failure {
        plan.issues.push(issue);
        plan.stats.detect_duration_ms = start.elapsed().as_millis() as u64;
        return Ok(plan);
    }

    let detection = detector.detect(&texts.pages);
    let parts = partition(&detection.headers, total_pages);

    plan.stats.detected = detection.headers.len();
    plan.stats.skipped = parts.issues.len();
    plan.issues.extend(detection.issues);
    plan.issues.extend(parts.issues);
    plan.ranges = parts.ranges;
    plan.stats.detect_duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "{} checklist range(s) over {} pages ({} issue(s))",
        plan.ranges.len(),
        total_pages,
        plan.issues.len()
    );
    Ok(plan)
}

/// Split `doc` into one archive entry per checklist.
///
/// Nothing is written to `sink` when no checklist is found.
pub fn split_document(
    doc: &dyn SourceDocument,
    config: &SplitConfig,
    sink: &mut dyn ArchiveSink,
) -> Result<SplitOutput, SplitError> {
    let total_start = Instant::now();
    let plan = plan_document(doc, config)?;
    let progress = config.progress_callback.as_deref();

    if let Some(cb) = progress {
        cb.on_split_start(plan.ranges.len());
        let skipped: Vec<_> = plan
            .issues
            .iter()
            .filter(|i| {
                matches!(
                    i,
                    ChecklistIssue::DegenerateRange { .. } | ChecklistIssue::HeaderOutOfRange { .. }
                )
            })
            .collect();
        for (i, issue) in skipped.iter().enumerate() {
            cb.on_checklist_skipped(i + 1, skipped.len(), &issue.to_string());
        }
    }

    let export_start = Instant::now();
    let checklists = export_ranges(doc, &plan.ranges, config, sink, progress)?;

    let mut stats = plan.stats;
    stats.exported = checklists.len();
    stats.export_duration_ms = export_start.elapsed().as_millis() as u64;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    if let Some(cb) = progress {
        cb.on_split_complete(plan.ranges.len(), checklists.len());
    }

    Ok(SplitOutput {
        checklists,
        issues: plan.issues,
        stats,
        archive: None,
    })
}

/// Detection and partitioning only; the summary rows have no archive path.
pub fn inspect_document(
    doc: &dyn SourceDocument,
    config: &SplitConfig,
) -> Result<SplitOutput, SplitError> {
    let start = Instant::now();
    let plan = plan_document(doc, config)?;

    let checklists = plan
        .ranges
        .iter()
        .map(|r| ExportedChecklist {
            row: r.summary(&config.unknown_location, &config.unknown_equipment),
            archive_path: None,
            size_bytes: 0,
        })
        .collect();

    let mut stats = plan.stats;
    stats.total_duration_ms = start.elapsed().as_millis() as u64;

    Ok(SplitOutput {
        checklists,
        issues: plan.issues,
        stats,
        archive: None,
    })
}

/// Split an in-memory PDF into a zip archive held in
/// [`SplitOutput::archive`].
///
/// Blocking: binds pdfium and does all page work on the calling thread.
/// From async code use [`split_from_bytes`].
pub fn split_bytes(bytes: &[u8], config: &SplitConfig) -> Result<SplitOutput, SplitError> {
    check_magic("<bytes>", bytes)?;
    let pdfium = bind_pdfium()?;
    let doc = PdfiumSource::load(&pdfium, bytes, config.password.as_deref())?;

    let mut sink = ZipSink::new(Cursor::new(Vec::new()));
    let mut output = split_document(&doc, config, &mut sink)?;

    if output.count() > 0 {
        let archive = sink.finish()?.into_inner();
        debug!("Archive assembled: {} bytes", archive.len());
        output.archive = Some(archive);
    }
    Ok(output)
}

/// Blocking counterpart of [`inspect`] for bytes already in memory.
pub fn inspect_bytes(bytes: &[u8], config: &SplitConfig) -> Result<SplitOutput, SplitError> {
    check_magic("<bytes>", bytes)?;
    let pdfium = bind_pdfium()?;
    let doc = PdfiumSource::load(&pdfium, bytes, config.password.as_deref())?;
    inspect_document(&doc, config)
}

/// Split a PDF file or URL.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(SplitOutput)` whenever the document could be read, including when
/// zero checklists were found (check `output.count()` and `output.issues`).
///
/// # Errors
/// Only fatal errors: unreadable or non-PDF input, wrong password, zero
/// pages, pdfium unavailable, OCR requested but not constructible.
pub async fn split(
    input_str: impl AsRef<str>,
    config: &SplitConfig,
) -> Result<SplitOutput, SplitError> {
    let input_str = input_str.as_ref();
    info!("Starting split: {}", input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let config = config.clone();
    tokio::task::spawn_blocking(move || split_bytes(&resolved.bytes, &config))
        .await
        .map_err(|e| SplitError::Internal(format!("Split task panicked: {}", e)))?
}

/// Split PDF bytes already in memory.
pub async fn split_from_bytes(
    bytes: &[u8],
    config: &SplitConfig,
) -> Result<SplitOutput, SplitError> {
    let bytes = bytes.to_vec();
    let config = config.clone();
    tokio::task::spawn_blocking(move || split_bytes(&bytes, &config))
        .await
        .map_err(|e| SplitError::Internal(format!("Split task panicked: {}", e)))?
}

/// Detect and summarise checklists without writing an archive.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &SplitConfig,
) -> Result<SplitOutput, SplitError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let config = config.clone();
    tokio::task::spawn_blocking(move || inspect_bytes(&resolved.bytes, &config))
        .await
        .map_err(|e| SplitError::Internal(format!("Inspect task panicked: {}", e)))?
}

/// Split `input` and write the zip archive to `output_path`.
///
/// The archive is written to a temporary file next to `output_path` and
/// renamed into place, so a failed run never leaves a truncated archive.
/// With zero checklists nothing is written and any existing file is left
/// alone.
pub async fn split_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &SplitConfig,
) -> Result<SplitOutput, SplitError> {
    let output = split(input_str, config).await?;
    let Some(archive) = output.archive.as_ref() else {
        info!("No checklists found; nothing written");
        return Ok(output);
    };

    let path = output_path.as_ref().to_path_buf();
    let archive = archive.clone();
    tokio::task::spawn_blocking(move || write_atomic(&path, &archive))
        .await
        .map_err(|e| SplitError::Internal(format!("Write task panicked: {}", e)))??;

    Ok(output)
}

/// Synchronous wrapper around [`split`].
///
/// Creates a temporary tokio runtime internally.
pub fn split_sync(
    input_str: impl AsRef<str>,
    config: &SplitConfig,
) -> Result<SplitOutput, SplitError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SplitError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(split(input_str, config))
}

/// Write `bytes` to `path` via a sibling temp file and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SplitError> {
    let fail = |source: std::io::Error| SplitError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(fail)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;

    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out.zip");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"second");
        let leftovers = std::fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn split_bytes_rejects_non_pdf_before_binding() {
        let err = split_bytes(b"GIF89a", &SplitConfig::default()).unwrap_err();
        assert!(matches!(err, SplitError::NotAPdf { .. }));
    }
}
