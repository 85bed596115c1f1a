//! Result types produced by a split run.
//!
//! Everything here is plain data: the detector produces
//! [`ChecklistHeader`]s, the partitioner turns them into
//! [`ChecklistRange`]s, and the exporter reports one [`ExportedChecklist`]
//! per written archive entry. [`SplitOutput`] is what the top-level entry
//! points return and what the CLI prints or serialises with `--json`.

use crate::error::ChecklistIssue;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// The first page of a checklist together with the metadata read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistHeader {
    /// 0-based index of the header page.
    pub page: usize,
    /// Raw title, whitespace-flattened but not sanitised.
    pub title: String,
    /// Raw `Location` value; `None` when the label is missing or empty.
    pub location: Option<String>,
    /// Raw `Equipment Name` value; `None` when the label is missing or empty.
    pub equipment: Option<String>,
}

impl ChecklistHeader {
    pub fn location_or<'a>(&'a self, sentinel: &'a str) -> &'a str {
        self.location.as_deref().unwrap_or(sentinel)
    }

    pub fn equipment_or<'a>(&'a self, sentinel: &'a str) -> &'a str {
        self.equipment.as_deref().unwrap_or(sentinel)
    }
}

/// A half-open span of source pages `[start, end)` belonging to one checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistRange {
    pub header: ChecklistHeader,
    pub start: usize,
    pub end: usize,
}

impl ChecklistRange {
    pub fn page_count(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Project onto a summary row, substituting sentinels for missing fields.
    pub fn summary(&self, unknown_location: &str, unknown_equipment: &str) -> SummaryRow {
        SummaryRow {
            title: self.header.title.clone(),
            location: self.header.location_or(unknown_location).to_string(),
            equipment: self.header.equipment_or(unknown_equipment).to_string(),
            start_page: self.start + 1,
            end_page: self.end,
        }
    }
}

/// One line of the summary table. Page numbers are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub title: String,
    pub location: String,
    pub equipment: String,
    pub start_page: usize,
    pub end_page: usize,
}

/// A checklist that made it through partitioning.
///
/// `archive_path` is `None` in inspect mode, where nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedChecklist {
    #[serde(flatten)]
    pub row: SummaryRow,
    pub archive_path: Option<String>,
    pub size_bytes: usize,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitStats {
    pub total_pages: usize,
    /// Header pages accepted by the detector.
    pub detected: usize,
    /// Archive entries written (0 in inspect mode).
    pub exported: usize,
    /// Headers dropped by the partitioner.
    pub skipped: usize,
    /// Pages whose text came from OCR.
    pub ocr_pages: usize,
    pub detect_duration_ms: u64,
    pub export_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a split run produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitOutput {
    pub checklists: Vec<ExportedChecklist>,
    pub issues: Vec<ChecklistIssue>,
    pub stats: SplitStats,
    /// The zip archive; `None` when no checklist was exported.
    #[serde(skip)]
    pub archive: Option<Vec<u8>>,
}

impl SplitOutput {
    /// Number of checklists in the result.
    pub fn count(&self) -> usize {
        self.checklists.len()
    }

    pub fn summary_rows(&self) -> Vec<&SummaryRow> {
        self.checklists.iter().map(|c| &c.row).collect()
    }

    /// "N checklists detected"; zero is reported the same way.
    pub fn status_message(&self) -> String {
        match self.count() {
            1 => "1 checklist detected".to_string(),
            n => format!("{n} checklists detected"),
        }
    }

    /// The summary rendered as a fixed-width text table.
    pub fn summary_table(&self) -> String {
        render_summary_table(self.summary_rows())
    }
}

const TABLE_HEADERS: [&str; 5] = [
    "Checklist Name",
    "Location",
    "Equipment Name",
    "Start Page",
    "End Page",
];

/// Render summary rows as a plain-text table with a header and rule line.
pub fn render_summary_table<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a SummaryRow>,
{
    let cells: Vec<[String; 5]> = rows
        .into_iter()
        .map(|r| {
            [
                r.title.clone(),
                r.location.clone(),
                r.equipment.clone(),
                r.start_page.to_string(),
                r.end_page.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &TABLE_HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &cells {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(i, (cell, &w))| {
            // Page columns are right-aligned.
            if i >= 3 {
                format!("{cell:>w$}")
            } else {
                format!("{cell:<w$}")
            }
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(page: usize, title: &str) -> ChecklistHeader {
        ChecklistHeader {
            page,
            title: title.to_string(),
            location: None,
            equipment: Some("Pump 7".to_string()),
        }
    }

    #[test]
    fn summary_is_one_based_inclusive() {
        let range = ChecklistRange {
            header: header(5, "Valve Check"),
            start: 5,
            end: 12,
        };
        let row = range.summary("UNKNOWN_LOCATION", "UNKNOWN_EQUIPMENT");
        assert_eq!(row.start_page, 6);
        assert_eq!(row.end_page, 12);
        assert_eq!(row.location, "UNKNOWN_LOCATION");
        assert_eq!(row.equipment, "Pump 7");
        assert_eq!(range.page_count(), 7);
    }

    #[test]
    fn status_message_reports_zero() {
        let out = SplitOutput::default();
        assert_eq!(out.status_message(), "0 checklists detected");
    }

    #[test]
    fn table_has_header_and_rows() {
        let rows = [SummaryRow {
            title: "Acme Pump Inspection".into(),
            location: "Plant A".into(),
            equipment: "P-101".into(),
            start_page: 1,
            end_page: 4,
        }];
        let table = render_summary_table(rows.iter());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Checklist Name"));
        assert!(lines[1].starts_with("----"));
        assert!(lines[2].contains("Acme Pump Inspection"));
        assert!(lines[2].ends_with('4'));
    }

    #[test]
    fn archive_bytes_are_not_serialised() {
        let out = SplitOutput {
            archive: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("archive\""));
    }
}
