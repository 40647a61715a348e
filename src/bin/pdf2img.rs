//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and writes the artifacts to a directory.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img::{
    convert_to_dir, inspect_sync, AccessCodes, AuthResult, ContainerMode, ConversionConfig,
    ConversionProgressCallback, OutputFormat, PageRange, ProgressCallback, Resolution, Session,
    DECK_DPI,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

/// Terminal progress callback: a live bar plus one log line per page.
///
/// Deck builds report no per-page events, so they keep the spinner.
struct CliProgressCallback {
    bar: ProgressBar,
    deck: bool,
}

impl CliProgressCallback {
    fn new(deck: bool) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar, deck })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        if self.deck {
            self.bar.set_prefix("Deck");
            self.bar
                .set_message(format!("building {total_pages} slides at {DECK_DPI} dpi…"));
        } else {
            self.activate_bar(total_pages);
        }
    }

    fn on_page_complete(&self, page_num: usize, completed: usize, total: usize, byte_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}  {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            completed,
            total,
            dim(&format!("{:>9} bytes", byte_len)),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        let noun = if self.deck { "slides" } else { "pages" };
        eprintln!(
            "{} {} {noun} converted",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every page as 300 dpi PNG, plus a zip, into the current directory
  pdf2img report.pdf

  # Pages 3-5 as JPEG into ./out
  pdf2img report.pdf --start 3 --end 5 --format jpeg -o out

  # Print-grade 600 dpi
  pdf2img report.pdf --quality high

  # Whole document as a slide deck (always every page, 150 dpi)
  pdf2img report.pdf --pptx -o slides

  # Inspect PDF metadata
  pdf2img --inspect-only report.pdf

  # Gate use behind an access code table
  pdf2img report.pdf --access-codes codes.json --access-code 1234

OUTPUT FILES:
  page_{n}.{png|jpeg}                   one per page in the range
  {file}_pages_{start}_to_{end}.zip     all of the above
  converted.pptx                        deck mode only

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Override the log filter
"#;

/// Render PDF pages to images, zip archives, or slide decks.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Render PDF pages to PNG/JPEG images, a zip archive, or a slide deck",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory to write the artifacts into.
    #[arg(short, long, env = "PDF2IMG_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// First page to convert (1-based). Default: 1.
    #[arg(long, env = "PDF2IMG_START")]
    start: Option<usize>,

    /// Last page to convert (inclusive). Default: the last page.
    #[arg(long, env = "PDF2IMG_END")]
    end: Option<usize>,

    /// Output image format.
    #[arg(long, env = "PDF2IMG_FORMAT", value_enum, default_value = "png")]
    format: FormatArg,

    /// Resolution tier: normal (300 dpi) or high (600 dpi).
    #[arg(long, env = "PDF2IMG_QUALITY", value_enum, default_value = "normal")]
    quality: QualityArg,

    /// Explicit DPI; overrides --quality.
    #[arg(long, env = "PDF2IMG_DPI", value_parser = clap::value_parser!(u32).range(1..))]
    dpi: Option<u32>,

    /// Build a slide deck of the whole document instead of images.
    #[arg(long, env = "PDF2IMG_PPTX")]
    pptx: bool,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDF2IMG_JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2IMG_PASSWORD")]
    password: Option<String>,

    /// JSON file of `"code": "greeting"` pairs; enables the access gate.
    #[arg(long, env = "PDF2IMG_ACCESS_CODES")]
    access_codes: Option<PathBuf>,

    /// Access code checked against --access-codes.
    #[arg(long, env = "PDF2IMG_ACCESS_CODE")]
    access_code: Option<String>,

    /// Print a JSON manifest instead of a file list.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpeg => OutputFormat::Jpeg,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum QualityArg {
    Normal,
    High,
}

impl From<QualityArg> for Resolution {
    fn from(v: QualityArg) -> Self {
        match v {
            QualityArg::Normal => Resolution::Normal,
            QualityArg::High => Resolution::High,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters, so library INFO
    // logs are muted while it is shown.
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

    // ── Access gate ──────────────────────────────────────────────────────
    if let Some(ref table) = cli.access_codes {
        let codes = AccessCodes::from_json_file(table).context("Failed to load access codes")?;
        let mut session = Session::new();
        match session.authorize(&codes, cli.access_code.as_deref().unwrap_or("")) {
            AuthResult::Granted(greeting) => {
                if !cli.quiet {
                    eprintln!("{} {}", cyan("◆"), greeting);
                }
            }
            AuthResult::Rejected => bail!("Access code rejected"),
            AuthResult::Empty => bail!("An access code is required (--access-code)"),
        }
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = tokio::task::block_in_place(|| {
            inspect_sync(&cli.input, cli.password.as_deref())
        })
        .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let range = resolve_range(&cli)?;
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new(cli.pptx);
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, range, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let saved = convert_to_dir(&cli.input, &cli.output, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&saved).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        for file in &saved.files {
            println!("{}", file.display());
        }
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            saved.stats.converted_pages,
            saved.stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(
    cli: &Cli,
    range: Option<PageRange>,
    progress: Option<ProgressCallback>,
) -> Result<ConversionConfig> {
    let resolution = match cli.dpi {
        Some(dpi) => Resolution::from_dpi(dpi),
        None => cli.quality.into(),
    };
    let container = if cli.pptx {
        ContainerMode::Pptx
    } else {
        ContainerMode::None
    };

    let mut builder = ConversionConfig::builder()
        .format(cli.format.into())
        .resolution(resolution)
        .container(container)
        .jpeg_quality(cli.jpeg_quality);

    if let Some(range) = range {
        builder = builder.range(range);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Turn `--start` / `--end` into a range; neither flag selects every page.
/// Decks ignore both flags.
///
/// A missing `--end` means the last page, which needs the page count, so the
/// document is opened once up front in that case.
fn resolve_range(cli: &Cli) -> Result<Option<PageRange>> {
    if cli.pptx {
        return Ok(None);
    }
    let end = match (cli.start, cli.end) {
        (None, None) => return Ok(None),
        (_, Some(end)) => end,
        (Some(_), None) => {
            tokio::task::block_in_place(|| inspect_sync(&cli.input, cli.password.as_deref()))
                .context("Failed to read page count")?
                .page_count
        }
    };
    let start = cli.start.unwrap_or(1);

    if start < 1 {
        bail!("Pages are 1-indexed, minimum is 1 (got {start})");
    }
    if start > end {
        bail!("Invalid page range {start}-{end}: --start must be <= --end");
    }
    Ok(Some(PageRange::new(start, end)))
}
