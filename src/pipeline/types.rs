use serde::{Deserialize, Serialize};

/// Outcome counters for one stage of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Files (or pages) the stage acted on successfully.
    pub processed: usize,
    /// Files that failed and stay candidates for the next pass.
    pub failed: usize,
    /// Page records whose state changed without a file operation.
    pub transitions: usize,
}

impl StageReport {
    /// Whether the stage mutated the archive state and snapshots need rewriting.
    pub fn changed_state(&self) -> bool {
        self.processed > 0 || self.transitions > 0
    }
}

/// Per-stage reports of one full pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub text: StageReport,
    pub ocr: StageReport,
    pub archive: StageReport,
    pub retention: StageReport,
}

/// How the codec should encode one screenshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompressionMode {
    /// Lossless; `effort` trades encode time for size.
    Lossless { effort: f32 },
    /// Lossy with the given quality in `[20, 100]`.
    Lossy { quality: f32 },
}

/// Encoder effort used for lossless output.
pub const LOSSLESS_EFFORT: f32 = 80.0;
/// Lossy quality never drops below this.
pub const MIN_LOSSY_QUALITY: f32 = 20.0;

impl CompressionMode {
    /// Lossless up to `threshold` bytes; above it, quality falls by 5 points per threshold
    /// multiple, floored at 20.
    pub fn for_size(size: u64, threshold: u64) -> Self {
        if size <= threshold {
            return CompressionMode::Lossless {
                effort: LOSSLESS_EFFORT,
            };
        }
        let ratio = size as f64 / threshold.max(1) as f64;
        let quality = (100.0 - 5.0 * ratio).max(MIN_LOSSY_QUALITY as f64) as f32;
        CompressionMode::Lossy { quality }
    }

    pub fn is_lossless(&self) -> bool {
        matches!(self, CompressionMode::Lossless { .. })
    }
}
