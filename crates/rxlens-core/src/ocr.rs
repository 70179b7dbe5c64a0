//! OCR results-document parsing.
//!
//! The external OCR engine writes a nested JSON document:
//! `{image_name: [{page, text_lines: [{text, confidence, ...}]}]}`.
//! This module is the collaborator boundary: it flattens that document
//! into ordered [`OcrLine`]s and never looks at image content.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::confidence::round3;

/// One recognized line with its OCR confidence in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub confidence: f64,
}

/// OCR document errors.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid results document: {0}")]
    InvalidFormat(String),
}

pub type OcrResult<T> = Result<T, OcrError>;

/// Flatten a results document into ordered lines.
///
/// Line order follows the source document; blank lines are skipped and
/// text is trimmed. Confidences are rounded to 3 decimals on ingest and
/// default to 0.0 when the engine omitted them.
pub fn parse_lines(raw: &str) -> OcrResult<Vec<OcrLine>> {
    let doc: Value = serde_json::from_str(raw)?;
    let images = doc.as_object().ok_or_else(|| {
        OcrError::InvalidFormat("top level must be an object keyed by image name".into())
    })?;

    let mut lines = Vec::new();
    for (image, pages) in images {
        let pages = pages.as_array().ok_or_else(|| {
            OcrError::InvalidFormat(format!("value for {image} must be a list of pages"))
        })?;
        for page in pages {
            let text_lines = page
                .get("text_lines")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    OcrError::InvalidFormat(format!("page in {image} missing text_lines"))
                })?;
            for line in text_lines {
                let text = line.get("text").and_then(Value::as_str).ok_or_else(|| {
                    OcrError::InvalidFormat(format!("text line in {image} missing text"))
                })?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let confidence = line.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
                lines.push(OcrLine {
                    text: text.to_string(),
                    confidence: round3(confidence),
                });
            }
        }
    }
    Ok(lines)
}

/// The newline-joined text handed to the LLM.
pub fn joined_text(lines: &[OcrLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_DOC: &str = r#"{
        "rx_front.png": [
            {
                "page": 0,
                "text_lines": [
                    {"text": "  OD -1.00 -0.75 180 ", "confidence": 0.9312},
                    {"text": "", "confidence": 0.5},
                    {"text": "OS -1.25", "confidence": 0.87}
                ]
            }
        ],
        "rx_back.png": [
            {
                "page": 0,
                "text_lines": [
                    {"text": "PD 62/60", "confidence": 0.8001},
                    {"text": "Dr. Chen"}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_lines_order_and_trimming() {
        let lines = parse_lines(RESULTS_DOC).unwrap();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].text, "OD -1.00 -0.75 180");
        assert_eq!(lines[0].confidence, 0.931);
        assert_eq!(lines[1].text, "OS -1.25");
        assert_eq!(lines[2].text, "PD 62/60");
        assert_eq!(lines[2].confidence, 0.8);
        // Missing confidence defaults to 0.0
        assert_eq!(lines[3].confidence, 0.0);
    }

    #[test]
    fn test_joined_text() {
        let lines = parse_lines(RESULTS_DOC).unwrap();
        assert_eq!(
            joined_text(&lines),
            "OD -1.00 -0.75 180\nOS -1.25\nPD 62/60\nDr. Chen"
        );
        assert_eq!(joined_text(&[]), "");
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            parse_lines("[]"),
            Err(OcrError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_lines(r#"{"img.png": {}}"#),
            Err(OcrError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_lines(r#"{"img.png": [{"page": 0}]}"#),
            Err(OcrError::InvalidFormat(_))
        ));
        assert!(matches!(parse_lines("not json"), Err(OcrError::JsonParse(_))));
    }
}
