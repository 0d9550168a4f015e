//! External capabilities the pipeline drives: OCR and image compression.
//!
//! Both are synchronous and may take seconds per file; the scheduler runs them on a blocking
//! thread and throttles calls with a fixed per-file delay.

use super::types::CompressionMode;
use crate::error::{ArchiveError, ArchiveResult};

use std::path::{Path, PathBuf};
use std::process::Command;

/// Recovers on-screen text from a screenshot.
pub trait OcrEngine: Send + Sync {
    /// Text found in `image`. Empty output is a valid result.
    fn recognize(&self, image: &Path) -> ArchiveResult<String>;
}

/// Writes a compressed copy of a screenshot.
pub trait ImageCodec: Send + Sync {
    fn compress(&self, source: &Path, target: &Path, mode: CompressionMode) -> ArchiveResult<()>;
}

/// Tesseract command-line OCR (`tesseract <image> stdout -l <lang>`).
pub struct TesseractCli {
    program: PathBuf,
    language: String,
}

impl TesseractCli {
    pub fn new(program: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
        }
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &Path) -> ArchiveResult<String> {
        let output = Command::new(&self.program)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| ArchiveError::Ocr {
                path: image.to_path_buf(),
                message: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            return Err(ArchiveError::Ocr {
                path: image.to_path_buf(),
                message: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// libwebp's `cwebp` encoder.
pub struct CwebpCli {
    program: PathBuf,
}

impl CwebpCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(mode: CompressionMode) -> Vec<String> {
        match mode {
            CompressionMode::Lossless { effort } => {
                vec!["-lossless".to_string(), "-q".to_string(), format!("{:.0}", effort)]
            }
            CompressionMode::Lossy { quality } => vec!["-q".to_string(), format!("{:.1}", quality)],
        }
    }
}

impl ImageCodec for CwebpCli {
    fn compress(&self, source: &Path, target: &Path, mode: CompressionMode) -> ArchiveResult<()> {
        let output = Command::new(&self.program)
            .arg("-quiet")
            .args(Self::args(mode))
            .arg(source)
            .arg("-o")
            .arg(target)
            .output()
            .map_err(|e| ArchiveError::Codec {
                path: source.to_path_buf(),
                message: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            return Err(ArchiveError::Codec {
                path: source.to_path_buf(),
                message: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(())
    }
}
