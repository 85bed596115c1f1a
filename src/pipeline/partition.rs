//! Range partitioning: header pages → contiguous `[start, end)` page spans.
//!
//! Purely positional; no text is inspected here. Each header's range ends
//! where the next header begins (or at the last page). Headers are stably
//! ordered by page first, so the emitted ranges never overlap even when the
//! input is out of order.
//!
//! Pages before the first header belong to the first checklist. Together
//! with the positional rule this makes the emitted ranges cover
//! `[0, total_pages)` exactly whenever at least one range is emitted.

use crate::error::ChecklistIssue;
use crate::output::{ChecklistHeader, ChecklistRange};
use tracing::{debug, warn};

/// Ranges to export plus the headers that had to be dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub ranges: Vec<ChecklistRange>,
    pub issues: Vec<ChecklistIssue>,
}

/// Split `[0, total_pages)` at each header page.
///
/// A header sharing its page with the next header would get zero pages; it
/// is skipped and reported as [`ChecklistIssue::DegenerateRange`]. A header
/// past the last page is reported as [`ChecklistIssue::HeaderOutOfRange`].
pub fn partition(headers: &[ChecklistHeader], total_pages: usize) -> Partition {
    let mut ordered: Vec<&ChecklistHeader> = headers.iter().collect();
    ordered.sort_by_key(|h| h.page);

    let mut out = Partition::default();

    for (i, header) in ordered.iter().enumerate() {
        if header.page >= total_pages {
            let issue = ChecklistIssue::HeaderOutOfRange {
                page: header.page,
                title: header.title.clone(),
                total_pages,
            };
            warn!("{}", issue);
            out.issues.push(issue);
            continue;
        }

        let start = header.page;
        let end = ordered
            .get(i + 1)
            .map_or(total_pages, |next| next.page.min(total_pages));

        if end <= start {
            let issue = ChecklistIssue::DegenerateRange {
                page: header.page,
                title: header.title.clone(),
            };
            warn!("{}", issue);
            out.issues.push(issue);
            continue;
        }

        out.ranges.push(ChecklistRange {
            header: (*header).clone(),
            start,
            end,
        });
    }

    if let Some(first) = out.ranges.first_mut() {
        if first.start > 0 {
            debug!(
                "Attaching {} leading page(s) to '{}'",
                first.start, first.header.title
            );
            first.start = 0;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn headers(pages: &[usize]) -> Vec<ChecklistHeader> {
        pages
            .iter()
            .enumerate()
            .map(|(i, &page)| ChecklistHeader {
                page,
                title: format!("Checklist {i}"),
                location: None,
                equipment: None,
            })
            .collect()
    }

    fn spans(p: &Partition) -> Vec<(usize, usize)> {
        p.ranges.iter().map(|r| (r.start, r.end)).collect()
    }

    #[test]
    fn splits_at_each_header() {
        let p = partition(&headers(&[0, 5, 12]), 20);
        assert_eq!(spans(&p), vec![(0, 5), (5, 12), (12, 20)]);
        assert!(p.issues.is_empty());
    }

    #[test]
    fn single_header_covers_document() {
        let p = partition(&headers(&[0]), 3);
        assert_eq!(spans(&p), vec![(0, 3)]);
    }

    #[test]
    fn header_on_last_page_gets_one_page() {
        let p = partition(&headers(&[0, 4]), 5);
        assert_eq!(spans(&p), vec![(0, 4), (4, 5)]);
    }

    #[test]
    fn no_headers_no_ranges() {
        assert_eq!(partition(&[], 10), Partition::default());
    }

    #[test]
    fn duplicate_page_is_skipped_and_reported() {
        let p = partition(&headers(&[0, 5, 5, 9]), 12);
        assert_eq!(spans(&p), vec![(0, 5), (5, 9), (9, 12)]);
        assert_eq!(p.ranges[1].header.title, "Checklist 2");
        assert_eq!(
            p.issues,
            vec![ChecklistIssue::DegenerateRange {
                page: 5,
                title: "Checklist 1".into()
            }]
        );
    }

    #[test]
    fn leading_pages_join_first_checklist() {
        let p = partition(&headers(&[2, 6]), 8);
        assert_eq!(spans(&p), vec![(0, 6), (6, 8)]);
        assert_eq!(p.ranges[0].header.page, 2);
    }

    #[test]
    fn out_of_range_header_is_reported() {
        let p = partition(&headers(&[0, 15]), 10);
        assert_eq!(spans(&p), vec![(0, 10)]);
        assert!(matches!(
            p.issues.as_slice(),
            [ChecklistIssue::HeaderOutOfRange { page: 15, total_pages: 10, .. }]
        ));
    }

    proptest! {
        #[test]
        fn ranges_cover_all_pages_exactly(
            total in 1usize..200,
            raw in proptest::collection::vec(0usize..400, 1..30),
        ) {
            let pages: Vec<usize> = raw.iter().map(|p| p % total).collect();
            let p = partition(&headers(&pages), total);

            prop_assert!(!p.ranges.is_empty());
            let mut cursor = 0;
            for r in &p.ranges {
                prop_assert_eq!(r.start, cursor);
                prop_assert!(r.start < r.end);
                cursor = r.end;
            }
            prop_assert_eq!(cursor, total);
            prop_assert_eq!(p.ranges.len() + p.issues.len(), pages.len());
        }
    }
}
