//! Export: one archive entry per checklist range.
//!
//! For each range the exporter copies the pages into a new document, derives
//! the destination path from the header metadata and writes the bytes to the
//! [`ArchiveSink`]. Ranges are written in document order and every range gets
//! exactly one entry, so two checklists with the same name still produce two
//! files.

use crate::config::SplitConfig;
use crate::error::SplitError;
use crate::output::{ChecklistRange, ExportedChecklist};
use crate::pipeline::archive::ArchiveSink;
use crate::pipeline::extract::SourceDocument;
use crate::pipeline::sanitize::{folder_path, sanitize_filename};
use crate::progress::SplitProgressCallback;
use std::collections::HashSet;
use tracing::{debug, info};

/// Hands out archive paths, never the same one twice.
///
/// Comparison is case-insensitive so the archive also extracts cleanly on
/// case-folding filesystems. A taken `name.pdf` becomes `name_2.pdf`, then
/// `name_3.pdf`, in allocation order.
#[derive(Debug, Default)]
pub struct PathAllocator {
    taken: HashSet<String>,
}

impl PathAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, folder: &str, stem: &str) -> String {
        let mut candidate = format!("{folder}{stem}.pdf");
        let mut n = 2;
        while !self.taken.insert(candidate.to_lowercase()) {
            candidate = format!("{folder}{stem}_{n}.pdf");
            n += 1;
        }
        candidate
    }
}

/// Folder prefix and file stem for a range, before collision handling.
///
/// `ordinal` is 1-based and only used when the title sanitises to nothing.
pub fn destination(range: &ChecklistRange, ordinal: usize, config: &SplitConfig) -> (String, String) {
    let folder = match (&range.header.location, config.folder_by_location) {
        (Some(location), true) => folder_path(location, config.max_name_len),
        _ => String::new(),
    };

    let mut stem = sanitize_filename(&range.header.title, config.max_name_len);
    if stem.is_empty() {
        stem = format!("checklist_{ordinal}");
    }
    (folder, stem)
}

/// Copy and archive every range, in order.
pub fn export_ranges(
    doc: &dyn SourceDocument,
    ranges: &[ChecklistRange],
    config: &SplitConfig,
    sink: &mut dyn ArchiveSink,
    progress: Option<&dyn SplitProgressCallback>,
) -> Result<Vec<ExportedChecklist>, SplitError> {
    let total = ranges.len();
    let mut paths = PathAllocator::new();
    let mut exported = Vec::with_capacity(total);

    for (i, range) in ranges.iter().enumerate() {
        let ordinal = i + 1;
        let (folder, stem) = destination(range, ordinal, config);
        let path = paths.allocate(&folder, &stem);

        let bytes = doc.copy_pages(range.start..range.end, config.clean_output.as_ref())?;
        sink.write_entry(&path, &bytes)?;

        debug!(
            "[{}/{}] {} ← pages {}-{}",
            ordinal,
            total,
            path,
            range.start + 1,
            range.end
        );
        if let Some(cb) = progress {
            cb.on_checklist_exported(ordinal, total, &path, range.page_count());
        }

        exported.push(ExportedChecklist {
            row: range.summary(&config.unknown_location, &config.unknown_equipment),
            archive_path: Some(path),
            size_bytes: bytes.len(),
        });
    }

    info!("Exported {} checklist(s)", exported.len());
    Ok(exported)
}
