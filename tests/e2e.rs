//! End-to-end tests for checklist-splitter against real PDFs and pdfium.
//!
//! These tests use real checklist reports in `./test_cases/` and need a
//! pdfium shared library (`PDFIUM_LIB_PATH`, the working directory, or the
//! system path). They are gated behind the `E2E_ENABLED` environment variable
//! so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=. cargo test --test e2e -- --nocapture
//!
//! Point `E2E_REPORT` at another report to override the default
//! `test_cases/checklist_report.pdf`. The tests under "Generated report" build
//! their own PDF with pdfium and only need `E2E_ENABLED`.

use checklist_splitter::pipeline::extract::bind_pdfium;
use checklist_splitter::{
    inspect, split_document, split_from_bytes, split_to_file, MemorySink, PageBands,
    PdfiumSource, SourceDocument, SplitConfig, SplitError,
};
use pdfium_render::prelude::*;
use std::io::{Cursor, Read};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn report_path() -> PathBuf {
    std::env::var("E2E_REPORT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| test_cases_dir().join("checklist_report.pdf"))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("checklist_splitter=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_ranges_cover_report() {
    let path = e2e_skip_unless_ready!(report_path());

    let out = inspect(path.to_str().unwrap(), &SplitConfig::default())
        .await
        .expect("inspect() should succeed");

    println!("{}", out.status_message());
    println!("{}", out.summary_table());

    if out.count() == 0 {
        return;
    }
    let rows = out.summary_rows();
    assert_eq!(rows[0].start_page, 1);
    for pair in rows.windows(2) {
        assert_eq!(pair[1].start_page, pair[0].end_page + 1);
    }
    assert_eq!(rows[rows.len() - 1].end_page, out.stats.total_pages);
    assert!(out.checklists.iter().all(|c| c.archive_path.is_none()));
}

#[tokio::test]
async fn test_inspect_nonexistent() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP");
        return;
    }

    let result = inspect("/definitely/not/a/real/file.pdf", &SplitConfig::default()).await;
    assert!(matches!(result, Err(SplitError::FileNotFound { .. })));
}

// ── Split ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_split_to_file_writes_valid_archive() {
    let path = e2e_skip_unless_ready!(report_path());
    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("CHECKLISTS.zip");

    let out = split_to_file(path.to_str().unwrap(), &zip_path, &SplitConfig::default())
        .await
        .expect("split_to_file() should succeed");

    if out.count() == 0 {
        assert!(!zip_path.exists(), "no archive expected for zero checklists");
        return;
    }

    let bytes = std::fs::read(&zip_path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), out.count());

    let mut total_pages = 0;
    for checklist in &out.checklists {
        let name = checklist.archive_path.as_deref().unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut head = [0u8; 4];
        entry.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"%PDF", "{name} is not a PDF");
        total_pages += checklist.row.end_page + 1 - checklist.row.start_page;
    }
    assert_eq!(total_pages, out.stats.total_pages);
}

#[tokio::test]
async fn test_split_with_clean_output() {
    let path = e2e_skip_unless_ready!(report_path());
    let bytes = std::fs::read(&path).unwrap();
    let config = SplitConfig::builder()
        .clean_output(Some(Default::default()))
        .build()
        .unwrap();

    let out = split_from_bytes(&bytes, &config)
        .await
        .expect("split_from_bytes() should succeed");
    assert_eq!(out.archive.is_some(), out.count() > 0);
}

#[tokio::test]
async fn test_split_rejects_non_pdf() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP");
        return;
    }

    let result = split_from_bytes(b"PK\x03\x04 not a pdf", &SplitConfig::default()).await;
    assert!(matches!(result, Err(SplitError::NotAPdf { .. })));
}

// ── Generated report ─────────────────────────────────────────────────────────

fn header_lines(name: &str, location: &str) -> Vec<String> {
    vec![
        "Checklist Details".to_string(),
        format!("Name: {name}"),
        "ID: 17".to_string(),
        "Description: monthly walkdown".to_string(),
        "Company: Acme".to_string(),
        "Checklist Status: Open".to_string(),
        format!("Location: {location}"),
        "Equipment Name: P-101".to_string(),
    ]
}

/// A five-page report: checklists start on pages 1 and 3.
fn build_report(pdfium: &Pdfium) -> Vec<u8> {
    let pages = vec![
        header_lines("Pump Seal Check", "Plant A"),
        vec!["Item 1: OK".to_string(), "Item 2: OK".to_string()],
        header_lines("Fan Belt Survey", "Plant B"),
        vec!["Item 1: worn".to_string()],
        vec!["Signed off".to_string()],
    ];

    let mut document = pdfium.create_new_pdf().unwrap();
    let font = document.fonts_mut().helvetica();
    for lines in &pages {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .unwrap();
        for (i, line) in lines.iter().enumerate() {
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(72.0),
                    PdfPoints::new(700.0 - 20.0 * i as f32),
                    line,
                    font,
                    PdfPoints::new(12.0),
                )
                .unwrap();
        }
    }
    document.save_to_bytes().unwrap()
}

fn path_objects(page: &PdfPage) -> usize {
    page.objects()
        .iter()
        .filter(|o| o.object_type() == PdfPageObjectType::Path)
        .count()
}

#[test]
fn test_generated_report_splits_into_cleaned_pdfs() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    init_tracing();

    let pdfium = bind_pdfium().expect("pdfium should bind");
    let bytes = build_report(&pdfium);
    let source = PdfiumSource::load(&pdfium, &bytes, None).unwrap();
    assert_eq!(source.page_count(), 5);
    assert!(source.page_text(0).unwrap().contains("Pump Seal Check"));

    let config = SplitConfig::builder()
        .clean_output(Some(PageBands::default()))
        .build()
        .unwrap();
    let mut sink = MemorySink::default();
    let out = split_document(&source, &config, &mut sink).unwrap();

    let titles: Vec<&str> = out.checklists.iter().map(|c| c.row.title.as_str()).collect();
    assert_eq!(titles, vec!["Pump Seal Check", "Fan Belt Survey"]);
    assert_eq!(sink.entries.len(), 2);

    let expected_pages = [2, 3];
    for ((path, pdf), expected) in sink.entries.iter().zip(expected_pages) {
        let copy = pdfium.load_pdf_from_byte_slice(pdf, None).unwrap();
        assert_eq!(copy.pages().len() as usize, expected, "{path}");
        for page in copy.pages().iter() {
            // One white band at the top and one at the bottom.
            assert_eq!(path_objects(&page), 2, "{path}");
        }
    }
}

#[test]
fn test_generated_report_copy_without_bands_adds_nothing() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
        return;
    }

    let pdfium = bind_pdfium().expect("pdfium should bind");
    let bytes = build_report(&pdfium);
    let source = PdfiumSource::load(&pdfium, &bytes, None).unwrap();

    let tail = source.copy_pages(2..5, None).unwrap();
    let copy = pdfium.load_pdf_from_byte_slice(&tail, None).unwrap();
    assert_eq!(copy.pages().len(), 3);
    assert!(copy.pages().iter().all(|p| path_objects(&p) == 0));
    assert!(copy.pages().get(0).unwrap().text().unwrap().all().contains("Fan Belt Survey"));

    assert!(matches!(
        source.copy_pages(4..6, None),
        Err(SplitError::PageCopyFailed { .. })
    ));
}
