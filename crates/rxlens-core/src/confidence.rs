//! OCR confidence aggregation for diagnostics.

use crate::models::OcrConfidenceScores;
use crate::ocr::OcrLine;

/// How many lines the diagnostics preview keeps.
pub const SAMPLE_LIMIT: usize = 10;

/// Arithmetic mean of line confidences plus a bounded preview.
///
/// An empty line list yields average 0.0 and no samples; downstream
/// treats that identically to a zero-confidence list.
pub fn summarize(lines: &[OcrLine]) -> OcrConfidenceScores {
    let average = if lines.is_empty() {
        0.0
    } else {
        lines.iter().map(|l| l.confidence).sum::<f64>() / lines.len() as f64
    };
    OcrConfidenceScores {
        average: round3(average),
        samples: lines.iter().take(SAMPLE_LIMIT).cloned().collect(),
    }
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
