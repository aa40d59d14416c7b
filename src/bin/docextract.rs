//! CLI binary for docextract.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints the extracted record as JSON.

use anyhow::{bail, Context, Result};
use clap::Parser;
use docextract::{
    Dependencies, DependencyContract, DocumentType, ExtractedDocument, ExtractionConfig,
    Extractor, Provider,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Aadhaar front from a phone photo
  docextract --doc-type aadhaar_front card.jpg

  # PAN card with known values, validated, pretty-printed
  docextract --doc-type pan --deps '{"name":"ASHA RAO"}' --validate --pretty pan.png

  # Form 16 PDF with Anthropic, written to a file
  docextract --doc-type form16 --provider anthropic form16.pdf -o form16.json

  # Dependencies from a file
  docextract --doc-type form16 --deps @known.json form16.pdf

DOCUMENT TYPES:
  aadhaar_front   name, dob, gender, address, aadhaar_number, pincode
  aadhaar_back    aadhaar_number, address, pincode, vid
  pan             pan_number, name, dob, gender, father_name
  form16          deductor / deductee / certificate / verification details,
                  payment, TDS and deposit tables

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  DOCEXTRACT_API_KEY      Explicit key for the selected provider
  PDFIUM_LIB_PATH         Directory containing libpdfium
  RUST_LOG                Overrides -v / -q log filtering

EXIT STATUS:
  0  success
  1  extraction failed
  2  --validate was given and the record failed validation
"#;

/// Extract structured fields from identity documents and tax certificates.
#[derive(Parser, Debug)]
#[command(
    name = "docextract",
    version,
    about = "Extract structured fields from Aadhaar, PAN and Form 16 documents",
    long_about = "Extract structured fields from Aadhaar (front/back), PAN card and Form 16 \
documents. Images are OCR'd with Tesseract, PDFs are read with pdfium, and an LLM \
(OpenAI, Anthropic) turns the text into a typed JSON record.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF / JPEG / PNG path or HTTP/HTTPS URL.
    input: String,

    /// Document type: aadhaar_front, aadhaar_back, pan, form16.
    #[arg(short = 't', long, env = "DOCEXTRACT_DOC_TYPE")]
    doc_type: DocumentType,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long, env = "DOCEXTRACT_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM provider: openai, anthropic.
    #[arg(long, env = "DOCEXTRACT_PROVIDER", default_value = "openai")]
    provider: Provider,

    /// Model ID. Default: gpt-4.1-mini (openai), claude-sonnet-4-20250514 (anthropic).
    #[arg(long, env = "DOCEXTRACT_MODEL")]
    model: Option<String>,

    /// API key for the provider. Falls back to the vendor's own variable.
    #[arg(long, env = "DOCEXTRACT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "DOCEXTRACT_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "DOCEXTRACT_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Characters of PDF text per model call.
    #[arg(long, env = "DOCEXTRACT_CHUNK_SIZE", default_value_t = 4000)]
    chunk_size: usize,

    /// Known values as a JSON object, or @FILE to read one.
    #[arg(long)]
    deps: Option<String>,

    /// Dependency contract (typed list or JSON schema), or @FILE.
    /// Replaces the document type's built-in contract.
    #[arg(long)]
    deps_contract: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "DOCEXTRACT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Tesseract language(s), e.g. eng or eng+hin.
    #[arg(long, env = "DOCEXTRACT_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Run the document's field checks; exit 2 when they fail.
    #[arg(long)]
    validate: bool,

    /// Pretty-print the JSON.
    #[arg(long)]
    pretty: bool,

    /// Disable the spinner.
    #[arg(long, env = "DOCEXTRACT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCEXTRACT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCEXTRACT_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCEXTRACT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-call LLM timeout in seconds.
    #[arg(long, env = "DOCEXTRACT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the feedback in normal mode; library INFO logs would
    // tear through it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.verbose;
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

    let config = build_config(&cli).await?;
    let dependencies = match cli.deps {
        Some(ref arg) => parse_dependencies(&read_json_arg(arg).await?)?,
        None => Dependencies::new(),
    };

    // ── Run extraction ───────────────────────────────────────────────────
    let spinner = show_progress.then(|| start_spinner(cli.doc_type, &cli.input));
    let start = Instant::now();
    let result = Extractor::new(config)
        .extract_record(&cli.input, cli.doc_type, &dependencies)
        .await;
    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let record = result.context("Extraction failed")?;

    let json = record.to_json(cli.pretty).context("Failed to serialise output")?;
    match cli.output {
        Some(ref path) => write_atomically(path, &json).await?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(json.as_bytes())
                .context("Failed to write to stdout")?;
            handle.write_all(b"\n").ok();
        }
    }

    if !cli.quiet {
        let target = cli
            .output
            .as_ref()
            .map(|p| format!("  →  {}", p.display()))
            .unwrap_or_default();
        eprintln!(
            "{} {} extracted in {}{}",
            green("✔"),
            cli.doc_type,
            dim(&format!("{}ms", start.elapsed().as_millis())),
            target
        );
    }

    if cli.validate {
        report_validation(&record, cli.quiet);
    }
    Ok(())
}

fn report_validation(record: &ExtractedDocument, quiet: bool) {
    if record.validate() {
        if !quiet {
            eprintln!("{} validation passed", green("✔"));
        }
    } else {
        eprintln!(
            "{} validation failed for {} (run with -v for details)",
            red("✘"),
            record.doc_type()
        );
        std::process::exit(2);
    }
}

fn start_spinner(doc_type: DocumentType, input: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Extracting");
    bar.set_message(format!("{doc_type} from {input}"));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .provider(cli.provider)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .chunk_size(cli.chunk_size)
        .ocr_language(cli.ocr_lang.clone())
        .request_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref dir) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(dir.clone());
    }
    if let Some(ref arg) = cli.deps_contract {
        let contract = DependencyContract::from_value(read_json_arg(arg).await?)
            .context("Invalid --deps-contract")?;
        builder = builder.dependencies(contract);
    }

    builder.build().context("Invalid configuration")
}

/// Parse a JSON argument given inline or as `@path`.
async fn read_json_arg(arg: &str) -> Result<Value> {
    let text = match arg.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {path:?}"))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).context("Argument is not valid JSON")
}

fn parse_dependencies(value: &Value) -> Result<Dependencies> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        _ => bail!("--deps must be a JSON object"),
    }
}

/// Write via a temp file and rename so readers never see partial output.
async fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
    }
    let tmp_path = path.with_extension("json.tmp");
    let mut body = contents.to_string();
    body.push('\n');
    tokio::fs::write(&tmp_path, body)
        .await
        .with_context(|| format!("Failed to write {:?}", tmp_path))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
