//! Runtime configuration.
//!
//! Defaults match the values the capture agent was tuned against. Environment variables
//! override the defaults, and `--data-dir` / `--bind` flags override the environment.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Pause after each OCR or codec call.
pub const FILE_DELAY: Duration = Duration::from_secs(1);
/// Idle time between two pipeline passes.
pub const PASS_INTERVAL: Duration = Duration::from_secs(10);
/// Images above this size (bytes) are compressed lossy; small PNGs often grow under lossy WebP.
pub const BIG_FILE_THRESHOLD: u64 = 1_000_000;
pub const RESULTS_SHOWN: usize = 12;

#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Shared directory where the capture agent drops `.txt`/`.png` files.
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub file_delay: Duration,
    pub pass_interval: Duration,
    pub big_file_threshold: u64,
    pub results_shown: usize,
    pub tesseract_program: PathBuf,
    pub ocr_language: String,
    pub cwebp_program: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("capture-indexer");

        Self {
            data_dir,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            file_delay: FILE_DELAY,
            pass_interval: PASS_INTERVAL,
            big_file_threshold: BIG_FILE_THRESHOLD,
            results_shown: RESULTS_SHOWN,
            tesseract_program: PathBuf::from("tesseract"),
            ocr_language: "eng".to_string(),
            cwebp_program: PathBuf::from("cwebp"),
        }
    }
}

impl ArchiveConfig {
    /// Builds the configuration from defaults, then `CAPTURE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ArchiveConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("CAPTURE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup("CAPTURE_BIND") {
            config.bind_addr = bind
                .parse()
                .with_context(|| format!("CAPTURE_BIND is not a socket address: {}", bind))?;
        }
        if let Some(ms) = lookup("CAPTURE_FILE_DELAY_MS") {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("CAPTURE_FILE_DELAY_MS is not a number: {}", ms))?;
            config.file_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = lookup("CAPTURE_PASS_INTERVAL_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("CAPTURE_PASS_INTERVAL_SECS is not a number: {}", secs))?;
            config.pass_interval = Duration::from_secs(secs);
        }
        if let Some(bytes) = lookup("CAPTURE_BIG_FILE_THRESHOLD") {
            config.big_file_threshold = bytes.parse().with_context(|| {
                format!("CAPTURE_BIG_FILE_THRESHOLD is not a number: {}", bytes)
            })?;
            if config.big_file_threshold == 0 {
                anyhow::bail!("CAPTURE_BIG_FILE_THRESHOLD must be positive");
            }
        }
        if let Some(n) = lookup("CAPTURE_RESULTS_SHOWN") {
            config.results_shown = n
                .parse()
                .with_context(|| format!("CAPTURE_RESULTS_SHOWN is not a number: {}", n))?;
        }
        if let Some(program) = lookup("CAPTURE_TESSERACT") {
            config.tesseract_program = PathBuf::from(program);
        }
        if let Some(lang) = lookup("CAPTURE_OCR_LANG") {
            config.ocr_language = lang;
        }
        if let Some(program) = lookup("CAPTURE_CWEBP") {
            config.cwebp_program = PathBuf::from(program);
        }

        Ok(config)
    }

    /// Applies `--data-dir <path>` and `--bind <addr:port>` from the command line.
    /// Unknown arguments are ignored.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--data-dir" => {
                    let value = args.get(i + 1).context("--data-dir requires a path")?;
                    self.data_dir = PathBuf::from(value);
                    i += 2;
                }
                "--bind" => {
                    let value = args.get(i + 1).context("--bind requires <addr:port>")?;
                    self.bind_addr = value
                        .parse()
                        .with_context(|| format!("--bind is not a socket address: {}", value))?;
                    i += 2;
                }
                _ => {
                    i += 1;
                }
            }
        }
        Ok(())
    }
}
