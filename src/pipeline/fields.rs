//! Field extraction from the text of a single page.
//!
//! Each field has its own function with the same contract: page text in,
//! optional captured span out. `None` means "label absent or value empty";
//! callers decide whether that is fatal (title) or substituted by a
//! sentinel (location, equipment).
//!
//! Label matching is case-insensitive, allows any whitespace between the
//! words of a multi-word label, and accepts an optional `:` or `-` after it.
//! A label word counts only where it opens a line or carries that separator.

use crate::config::TitleStop;
use once_cell::sync::Lazy;
use regex::Regex;

/// Labels that end a `Name` value. `Checklist Status` precedes `Status` so
/// the longer label wins when both start at the same place.
pub const STOP_LABELS: &[&str] = &[
    "ID",
    "Description",
    "Author",
    "Created On",
    "Tags",
    "Custom Properties",
    "Company",
    "Priority",
    "Checklist Status",
    "Status",
    "Location",
    "Equipment Name",
    "Equipment Barcode",
];

/// Regex source for a label: words escaped, joined by `\s+`.
pub fn label_pattern(label: &str) -> String {
    label
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// A case-insensitive, word-bounded matcher for one label.
pub fn label_regex(label: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)\b{}\b", label_pattern(label)))
}

// A stop label counts when it opens a line, or when a colon follows it
// anywhere else. A bare word like "status" inside a title does not end it,
// and neither does "Status - board check": a mid-line dash is title text.
static RE_STOP: Lazy<Regex> = Lazy::new(|| {
    let alternation = STOP_LABELS
        .iter()
        .map(|l| label_pattern(l))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?im)^[ \t]*(?:{alternation})\b|\b(?:{alternation})[ \t]*:"
    ))
    .unwrap()
});

static RE_NAME_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bName\b").unwrap());

static RE_LOCATION_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bLocation\b").unwrap());

static RE_EQUIPMENT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bEquipment[ \t]+Name\b").unwrap());

// `:` or a dash followed by a blank or the end of the line.
static RE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)\A[ \t]*(?::|-(?:[ \t]|$))[ \t]*").unwrap());

static RE_TRAILING_PRIORITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[\s:|\-]*\bPriority\b[\s:\-]*$").unwrap());

/// Whether `text` contains `label` as a field label.
pub fn has_label(text: &str, label: &Regex) -> bool {
    label.is_match(text)
}

/// Capture the checklist title after the `Name` label.
///
/// Only a `Name` that opens its line is a label, so `Equipment Name` and
/// `Company Name` never are. One followed by a separator is preferred over a
/// bare one. With [`TitleStop::Keywords`] the value runs to the next field
/// label and may cross lines; with [`TitleStop::LineBreak`] it is the first
/// non-empty line. The result is whitespace-flattened.
pub fn extract_title(text: &str, stop: TitleStop) -> Option<String> {
    title_from(text, name_value_start(text, false)?, stop)
}

/// Like [`extract_title`], but a `Name` without a `:` or `-` after it is
/// ignored. Used where the title may come from elsewhere on the page and a
/// bare word "name" is more likely prose than a label.
pub fn extract_labelled_title(text: &str, stop: TitleStop) -> Option<String> {
    title_from(text, name_value_start(text, true)?, stop)
}

/// Capture the `Location` value up to the end of its line.
pub fn extract_location(text: &str) -> Option<String> {
    labelled_line_value(&RE_LOCATION_LABEL, text)
}

/// Capture the `Equipment Name` value up to the end of its line.
pub fn extract_equipment(text: &str) -> Option<String> {
    labelled_line_value(&RE_EQUIPMENT_LABEL, text)
}

/// The whole line containing byte offset `at`, trimmed.
pub fn line_at(text: &str, at: usize) -> &str {
    let start = text[..at].rfind('\n').map_or(0, |i| i + 1);
    let end = text[at..].find('\n').map_or(text.len(), |i| at + i);
    text[start..end].trim()
}

/// Collapse every whitespace run, line breaks included, to one space.
pub fn flatten_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a standalone `Priority` token (and its separator) at the end.
pub fn strip_trailing_priority(title: &str) -> String {
    RE_TRAILING_PRIORITY.replace(title, "").trim().to_string()
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// One occurrence of a label word that reads as a field label.
struct LabelHit {
    value_start: usize,
    separated: bool,
    line_start: bool,
}

/// Occurrences of `label` that open their line or carry a separator.
fn label_hits<'t>(label: &'t Regex, text: &'t str) -> impl Iterator<Item = LabelHit> + 't {
    label.find_iter(text).filter_map(move |m| {
        let line_start = opens_line(text, m.start());
        let rest = &text[m.end()..];
        let sep = RE_SEPARATOR.find(rest).map(|s| s.end());
        if !line_start && sep.is_none() {
            return None;
        }
        Some(LabelHit {
            value_start: m.end() + sep.unwrap_or(0),
            separated: sep.is_some(),
            line_start,
        })
    })
}

fn opens_line(text: &str, at: usize) -> bool {
    let line = text[..at].rsplit('\n').next().unwrap_or("");
    line.chars().all(|c| c == ' ' || c == '\t')
}

fn name_value_start(text: &str, require_separator: bool) -> Option<usize> {
    let mut bare = None;

    for hit in label_hits(&RE_NAME_LABEL, text).filter(|h| h.line_start) {
        if hit.separated {
            return Some(hit.value_start);
        }
        if !require_separator {
            bare.get_or_insert(hit.value_start);
        }
    }

    bare
}

fn title_from(text: &str, value_start: usize, stop: TitleStop) -> Option<String> {
    let span = match stop {
        TitleStop::Keywords => match RE_STOP.find_at(text, value_start) {
            Some(m) => &text[value_start..m.start()],
            None => first_non_empty_line(&text[value_start..]),
        },
        TitleStop::LineBreak => first_non_empty_line(&text[value_start..]),
    };

    non_empty(flatten_whitespace(span))
}

fn first_non_empty_line(s: &str) -> &str {
    s.lines().find(|l| !l.trim().is_empty()).unwrap_or("")
}

fn labelled_line_value(label: &Regex, text: &str) -> Option<String> {
    let mut bare = None;

    for hit in label_hits(label, text) {
        let Some(value) = line_value(&text[hit.value_start..]) else {
            continue;
        };
        if hit.separated {
            return Some(value);
        }
        bare.get_or_insert(value);
    }

    bare
}

fn line_value(rest: &str) -> Option<String> {
    let line = rest.split('\n').next().unwrap_or("");
    let line = match RE_STOP.find(line) {
        // Another label later on the same line ends this value.
        Some(m) if m.start() > 0 => &line[..m.start()],
        _ => line,
    };
    non_empty(flatten_whitespace(line))
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
