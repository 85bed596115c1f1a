//! CLI binary for checklist-splitter.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SplitConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use checklist_splitter::{
    inspect, split_to_file, HeaderStrategy, PageBands, ProgressCallback, SplitConfig,
    SplitOutput, SplitProgressCallback, TitleStop,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the PDF is read and scanned, then a bar over the
/// checklists being exported.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Reading pages…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }
}

impl SplitProgressCallback for CliProgressCallback {
    fn on_split_start(&self, total_checklists: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} checklists  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_checklists as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Exporting");
        self.bar.reset_eta();
    }

    fn on_checklist_exported(&self, ordinal: usize, total: usize, path: &str, pages: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            ordinal,
            total,
            path,
            dim(&format!("{pages} page(s)")),
        ));
        self.bar.inc(1);
    }

    fn on_checklist_skipped(&self, _ordinal: usize, _total: usize, reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!("  {} {}", yellow("⚠"), yellow(reason)));
    }

    fn on_split_complete(&self, _total: usize, exported: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        if skipped == 0 {
            eprintln!("{} {} checklist(s) exported", green("✔"), bold(&exported.to_string()));
        } else {
            eprintln!(
                "{} {} checklist(s) exported  ({} skipped)",
                cyan("⚠"),
                bold(&exported.to_string()),
                yellow(&skipped.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Split a report into CHECKLISTS.zip, foldered by location
  checklist-split report.pdf

  # Custom output, flat layout, no truncation
  checklist-split report.pdf -o out/site-7.zip --flat --max-name-len 0

  # Reports whose titles look like "T12.BESS.04: ..."
  checklist-split --strategy title report.pdf

  # White out the repeated banner and footer on every exported page
  checklist-split --clean --header-band 50 --footer-band 30 report.pdf

  # Scanned report: OCR blank pages with a vision model
  checklist-split --ocr --ocr-provider openai --ocr-model gpt-4.1-mini scan.pdf

  # Show what would be exported, as JSON
  checklist-split --inspect-only --json report.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         pdfium library file, or directory containing it
  OPENAI_API_KEY          API key for --ocr with the openai provider
  ANTHROPIC_API_KEY       API key for --ocr with the anthropic provider
  RUST_LOG                Log filter (overrides -v / -q)
  Every flag also reads CHECKLIST_SPLIT_<FLAG>, e.g. CHECKLIST_SPLIT_STRATEGY=title.
"#;

/// Split a multi-checklist PDF report into one PDF per checklist.
#[derive(Parser, Debug)]
#[command(
    name = "checklist-split",
    version,
    about = "Split a multi-checklist PDF report into one PDF per checklist",
    long_about = "Detect checklist header pages in a PDF report, cut the report into one PDF \
per checklist named after its title, and pack them into a zip archive foldered by location.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Zip archive to write.
    #[arg(short, long, env = "CHECKLIST_SPLIT_OUTPUT", default_value = "CHECKLISTS.zip")]
    output: PathBuf,

    /// How header pages are recognised.
    #[arg(long, env = "CHECKLIST_SPLIT_STRATEGY", value_enum, default_value = "strict")]
    strategy: StrategyArg,

    /// Regex marking a header page for --strategy title.
    #[arg(long, env = "CHECKLIST_SPLIT_TITLE_PATTERN")]
    title_pattern: Option<String>,

    /// Regex with a `title` group for --strategy phrase.
    #[arg(long, env = "CHECKLIST_SPLIT_PHRASE_PATTERN")]
    phrase_pattern: Option<String>,

    /// End the title at the first line break instead of the next field label.
    #[arg(long, env = "CHECKLIST_SPLIT_STOP_AT_LINE_BREAK")]
    stop_at_line_break: bool,

    /// Keep a trailing "Priority" word in titles.
    #[arg(long, env = "CHECKLIST_SPLIT_KEEP_PRIORITY")]
    keep_priority: bool,

    /// Maximum characters per file or folder name (0 = unlimited).
    #[arg(long, env = "CHECKLIST_SPLIT_MAX_NAME_LEN", default_value_t = 100)]
    max_name_len: usize,

    /// Put every checklist at the archive root instead of location folders.
    #[arg(long, env = "CHECKLIST_SPLIT_FLAT")]
    flat: bool,

    /// White out the header and footer bands of every exported page.
    #[arg(long, env = "CHECKLIST_SPLIT_CLEAN")]
    clean: bool,

    /// Header band height in points (with --clean).
    #[arg(long, env = "CHECKLIST_SPLIT_HEADER_BAND", default_value_t = 40.0)]
    header_band: f32,

    /// Footer band height in points (with --clean).
    #[arg(long, env = "CHECKLIST_SPLIT_FOOTER_BAND", default_value_t = 40.0)]
    footer_band: f32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "CHECKLIST_SPLIT_PASSWORD")]
    password: Option<String>,

    /// OCR pages without a text layer (provider auto-detected).
    #[arg(long, env = "CHECKLIST_SPLIT_OCR")]
    ocr: bool,

    /// OCR provider: openai, anthropic, gemini, ollama, ... (implies --ocr).
    #[arg(long, env = "CHECKLIST_SPLIT_OCR_PROVIDER")]
    ocr_provider: Option<String>,

    /// OCR model ID (default gpt-4.1-nano).
    #[arg(long, env = "CHECKLIST_SPLIT_OCR_MODEL")]
    ocr_model: Option<String>,

    /// Top fraction of the page sent to OCR, in (0, 1].
    #[arg(long, env = "CHECKLIST_SPLIT_OCR_BAND", default_value_t = 0.25)]
    ocr_band: f32,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "CHECKLIST_SPLIT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Detect and summarise only; write no archive.
    #[arg(long)]
    inspect_only: bool,

    /// Print the run result as JSON on stdout.
    #[arg(long, env = "CHECKLIST_SPLIT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CHECKLIST_SPLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CHECKLIST_SPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CHECKLIST_SPLIT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Strict,
    Title,
    Phrase,
}

impl From<StrategyArg> for HeaderStrategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::Strict => HeaderStrategy::StrictFields,
            StrategyArg::Title => HeaderStrategy::TitlePattern,
            StrategyArg::Phrase => HeaderStrategy::PhrasePattern,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; -v always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress && !cli.inspect_only {
        Some(CliProgressCallback::new() as Arc<dyn SplitProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let output = inspect(&cli.input, &config)
            .await
            .context("Failed to inspect PDF")?;
        report(&cli, &output, None)?;
        return Ok(());
    }

    // ── Split ────────────────────────────────────────────────────────────
    let output = split_to_file(&cli.input, &cli.output, &config)
        .await
        .context("Split failed")?;
    let written = output.archive.is_some().then_some(&cli.output);
    report(&cli, &output, written)?;

    Ok(())
}

/// Print the run result: JSON, or status line + table + issues.
fn report(cli: &Cli, output: &SplitOutput, archive: Option<&PathBuf>) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    println!("{}", bold(&output.status_message()));
    if output.count() > 0 {
        println!();
        print!("{}", output.summary_table());
    }

    for issue in &output.issues {
        eprintln!("{} {}", yellow("⚠"), issue);
    }

    match archive {
        Some(path) => eprintln!(
            "{}  {} checklist(s)  {}ms  →  {}",
            green("✔"),
            output.stats.exported,
            output.stats.total_duration_ms,
            bold(&path.display().to_string()),
        ),
        None if output.count() == 0 => {
            eprintln!("{}", dim("No archive written."));
        }
        None => {}
    }
    if output.stats.ocr_pages > 0 {
        eprintln!("   {}", dim(&format!("{} page(s) read by OCR", output.stats.ocr_pages)));
    }
    if output.count() == 0 && output.issues.is_empty() && !cli.inspect_only {
        eprintln!(
            "{}",
            red("Hint: try --strategy title or --strategy phrase, or --ocr for scanned reports.")
        );
    }
    Ok(())
}

/// Map CLI args to `SplitConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SplitConfig> {
    let mut builder = SplitConfig::builder()
        .strategy(cli.strategy.into())
        .title_stop(if cli.stop_at_line_break {
            TitleStop::LineBreak
        } else {
            TitleStop::Keywords
        })
        .strip_trailing_priority(!cli.keep_priority)
        .max_name_len((cli.max_name_len > 0).then_some(cli.max_name_len))
        .folder_by_location(!cli.flat)
        .ocr_title_band(cli.ocr_band)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref re) = cli.title_pattern {
        builder = builder.title_pattern(re);
    }
    if let Some(ref re) = cli.phrase_pattern {
        builder = builder.phrase_pattern(re);
    }
    if cli.clean {
        builder = builder.clean_output(Some(PageBands {
            header_pt: cli.header_band,
            footer_pt: cli.footer_band,
        }));
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    match (&cli.ocr_provider, cli.ocr) {
        (Some(name), _) => builder = builder.ocr_provider_name(name),
        (None, true) => builder = builder.ocr_provider_name("auto"),
        (None, false) => {}
    }
    if let Some(ref model) = cli.ocr_model {
        builder = builder.ocr_model(model);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
