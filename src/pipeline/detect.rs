//! Checklist boundary detection: per-page text → ordered header list.
//!
//! Each page is classified on its own text only; a header block split over
//! two pages is not recognised. Pages are visited in order and yield at most
//! one header, so header pages come out strictly increasing.

use crate::config::{HeaderStrategy, SplitConfig, TitleStop};
use crate::error::{ChecklistIssue, SplitError};
use crate::output::ChecklistHeader;
use crate::pipeline::fields;
use regex::Regex;
use tracing::{debug, info, warn};

/// Outcome of running the detector over a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    pub headers: Vec<ChecklistHeader>,
    /// Pages that carried a header signature but were rejected.
    pub issues: Vec<ChecklistIssue>,
}

/// What a single page turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageClass {
    Continuation,
    Header(ChecklistHeader),
    Malformed(ChecklistIssue),
}

/// Compiled form of the detection settings in [`SplitConfig`].
#[derive(Debug, Clone)]
pub struct HeaderDetector {
    strategy: HeaderStrategy,
    required: Vec<Regex>,
    title_pattern: Regex,
    phrase_pattern: Regex,
    title_stop: TitleStop,
    strip_priority: bool,
}

impl HeaderDetector {
    pub fn new(config: &SplitConfig) -> Result<Self, SplitError> {
        let required = config
            .required_fields
            .iter()
            .filter(|f| !f.trim().is_empty())
            .map(|f| {
                fields::label_regex(f).map_err(|e| {
                    SplitError::InvalidConfig(format!("required field '{f}' does not compile: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let title_pattern = Regex::new(&config.title_pattern)
            .map_err(|e| SplitError::InvalidConfig(format!("title pattern: {e}")))?;
        let phrase_pattern = Regex::new(&config.phrase_pattern)
            .map_err(|e| SplitError::InvalidConfig(format!("phrase pattern: {e}")))?;

        Ok(Self {
            strategy: config.strategy,
            required,
            title_pattern,
            phrase_pattern,
            title_stop: config.title_stop,
            strip_priority: config.strip_trailing_priority,
        })
    }

    /// Whether the page text carries this strategy's header signature.
    pub fn is_header_page(&self, text: &str) -> bool {
        match self.strategy {
            HeaderStrategy::StrictFields => {
                !self.required.is_empty()
                    && self.required.iter().all(|re| fields::has_label(text, re))
            }
            HeaderStrategy::TitlePattern => self.title_pattern.is_match(text),
            HeaderStrategy::PhrasePattern => self.phrase_pattern.is_match(text),
        }
    }

    /// Classify one page and, for header pages, read its metadata.
    pub fn classify(&self, page: usize, text: &str) -> PageClass {
        if !self.is_header_page(text) {
            return PageClass::Continuation;
        }

        let raw_title = match self.strategy {
            HeaderStrategy::StrictFields => fields::extract_title(text, self.title_stop),
            HeaderStrategy::TitlePattern => fields::extract_labelled_title(text, self.title_stop)
                .or_else(|| {
                    self.title_pattern
                        .find(text)
                        .map(|m| fields::line_at(text, m.start()).to_string())
                }),
            HeaderStrategy::PhrasePattern => self
                .phrase_pattern
                .captures(text)
                .and_then(|c| c.name("title"))
                .map(|m| m.as_str().to_string()),
        };

        let title = raw_title
            .map(|t| self.clean_title(&t))
            .filter(|t| !t.is_empty());

        match title {
            Some(title) => PageClass::Header(ChecklistHeader {
                page,
                title,
                location: fields::extract_location(text),
                equipment: fields::extract_equipment(text),
            }),
            None => PageClass::Malformed(ChecklistIssue::MalformedHeaderSpan {
                page,
                detail: format!(
                    "{:?} signature matched but the title span is empty",
                    self.strategy
                ),
            }),
        }
    }

    /// Run the detector over every page in order.
    pub fn detect<S: AsRef<str>>(&self, pages: &[S]) -> Detection {
        let mut detection = Detection::default();

        for (page, text) in pages.iter().enumerate() {
            match self.classify(page, text.as_ref()) {
                PageClass::Continuation => {}
                PageClass::Header(header) => {
                    debug!("Page {}: header '{}'", page + 1, header.title);
                    detection.headers.push(header);
                }
                PageClass::Malformed(issue) => {
                    warn!("{}", issue);
                    detection.issues.push(issue);
                }
            }
        }

        info!(
            "Detected {} checklist header(s) in {} pages",
            detection.headers.len(),
            pages.len()
        );
        detection
    }

    fn clean_title(&self, raw: &str) -> String {
        let flat = fields::flatten_whitespace(raw);
        if self.strip_priority {
            fields::strip_trailing_priority(&flat)
        } else {
            flat
        }
    }
}

/// Detect checklist headers in `pages` using the settings in `config`.
pub fn detect_headers<S: AsRef<str>>(
    pages: &[S],
    config: &SplitConfig,
) -> Result<Detection, SplitError> {
    Ok(HeaderDetector::new(config)?.detect(pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strict_header(name: &str) -> String {
        format!(
            "Checklist Details\nName: {name}\nID: 123\nDescription: walkdown\n\
             Company: Acme\nChecklist Status: Open\nLocation: Plant A > Room 1\n\
             Equipment Name: P-101\n"
        )
    }

    fn detector(strategy: HeaderStrategy) -> HeaderDetector {
        let config = SplitConfig::builder().strategy(strategy).build().unwrap();
        HeaderDetector::new(&config).unwrap()
    }

    #[test]
    fn strict_extracts_title_and_fields() {
        let pages = vec![
            strict_header("Acme Pump Inspection"),
            "Item 1: OK\nItem 2: OK".to_string(),
        ];
        let d = detector(HeaderStrategy::StrictFields).detect(&pages);
        assert_eq!(
            d.headers,
            vec![ChecklistHeader {
                page: 0,
                title: "Acme Pump Inspection".into(),
                location: Some("Plant A > Room 1".into()),
                equipment: Some("P-101".into()),
            }]
        );
        assert!(d.issues.is_empty());
    }

    #[test]
    fn strict_requires_every_field() {
        // Equipment section mentioning "Name" is not a header.
        let body = "Equipment Name: P-101\nName: Impeller\nDescription: wear";
        assert!(!detector(HeaderStrategy::StrictFields).is_header_page(body));
    }

    #[test]
    fn strict_rejects_fields_split_across_pages() {
        let pages = [
            "Name: Split Header\nID: 1\nDescription: d",
            "Company: Acme\nChecklist Status: Open",
        ];
        let d = detector(HeaderStrategy::StrictFields).detect(&pages);
        assert!(d.headers.is_empty());
    }

    #[test]
    fn strict_strips_leaked_priority() {
        let text = strict_header("Inverter Walkdown Priority");
        match detector(HeaderStrategy::StrictFields).classify(0, &text) {
            PageClass::Header(h) => assert_eq!(h.title, "Inverter Walkdown"),
            other => panic!("expected header, got {other:?}"),
        }
    }

    #[test]
    fn priority_kept_when_disabled() {
        let config = SplitConfig::builder()
            .strip_trailing_priority(false)
            .title_stop(TitleStop::LineBreak)
            .build()
            .unwrap();
        let d = detect_headers(&[strict_header("Inverter Walkdown Priority")], &config).unwrap();
        assert_eq!(d.headers[0].title, "Inverter Walkdown Priority");
    }

    #[test]
    fn malformed_header_is_reported_not_fabricated() {
        let text = "Name:\nID: 1\nDescription: x\nCompany: y\nChecklist Status: Open";
        let d = detector(HeaderStrategy::StrictFields).detect(&[text]);
        assert!(d.headers.is_empty());
        assert!(matches!(
            d.issues.as_slice(),
            [ChecklistIssue::MalformedHeaderSpan { page: 0, .. }]
        ));
    }

    #[test]
    fn title_pattern_uses_matched_line() {
        let pages = [
            "T12.BESS.04: Battery Rack Inspection\nRow 1 ok",
            "continued",
            "T12.BESS.05: HVAC Check\nLocation: Container 2",
        ];
        let d = detector(HeaderStrategy::TitlePattern).detect(&pages);
        let titles: Vec<(usize, &str)> = d.headers.iter().map(|h| (h.page, h.title.as_str())).collect();
        assert_eq!(
            titles,
            vec![
                (0, "T12.BESS.04: Battery Rack Inspection"),
                (2, "T12.BESS.05: HVAC Check")
            ]
        );
        assert_eq!(d.headers[1].location.as_deref(), Some("Container 2"));
        assert_eq!(d.headers[0].location, None);
    }

    #[test]
    fn title_pattern_ignores_bare_name_in_title_line() {
        let pages = ["T12.BESS.04: Battery name plate inspection\nRow 1 ok"];
        let d = detector(HeaderStrategy::TitlePattern).detect(&pages);
        assert_eq!(d.headers[0].title, "T12.BESS.04: Battery name plate inspection");
    }

    #[test]
    fn label_words_inside_title_do_not_leak_into_fields() {
        let text = "Checklist Details\nName: Location Marker Check\nID: 1\nDescription: d\n\
                    Company: Acme\nChecklist Status: Open\nLocation: Plant A > Room 1\n\
                    Equipment Name: P-101\n";
        match detector(HeaderStrategy::StrictFields).classify(0, text) {
            PageClass::Header(h) => {
                assert_eq!(h.title, "Location Marker Check");
                assert_eq!(h.location.as_deref(), Some("Plant A > Room 1"));
                assert_eq!(h.equipment.as_deref(), Some("P-101"));
            }
            other => panic!("expected header, got {other:?}"),
        }
    }

    #[test]
    fn phrase_pattern_captures_checklist_line() {
        let pages = ["Name: Fire Pump Weekly Checklist\nitems...", "Name of tech: Bob"];
        let d = detector(HeaderStrategy::PhrasePattern).detect(&pages);
        assert_eq!(d.headers.len(), 1);
        assert_eq!(d.headers[0].title, "Fire Pump Weekly Checklist");
    }

    #[test]
    fn no_headers_is_empty_not_error() {
        let pages = ["", "just text", ""];
        let d = detect_headers(&pages, &SplitConfig::default()).unwrap();
        assert_eq!(d, Detection::default());
    }

    #[test]
    fn header_pages_strictly_increase() {
        let pages: Vec<String> = (0..6)
            .map(|i| {
                if i % 2 == 0 {
                    strict_header(&format!("Check {i}"))
                } else {
                    String::new()
                }
            })
            .collect();
        let d = detector(HeaderStrategy::StrictFields).detect(&pages);
        let pages: Vec<usize> = d.headers.iter().map(|h| h.page).collect();
        assert_eq!(pages, vec![0, 2, 4]);
    }
}
