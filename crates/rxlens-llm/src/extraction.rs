//! Reply handling for the extraction model, plus a deterministic mock.

use rxlens_core::ocr::OcrLine;
use rxlens_core::pipeline::{Extractor, ExtractorError};
use serde_json::{json, Value};

/// Parse the model's reply text into JSON.
///
/// Models sometimes wrap the JSON object in prose; the slice from the
/// first `{` to the last `}` is taken before parsing.
pub fn parse_reply(raw: &str) -> Result<Value, ExtractorError> {
    let start = raw
        .find('{')
        .ok_or_else(|| ExtractorError::InvalidReply("no JSON object found in reply".into()))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| ExtractorError::InvalidReply("no closing brace found in reply".into()))?;
    serde_json::from_str(&raw[start..=end])
        .map_err(|e| ExtractorError::InvalidReply(e.to_string()))
}

/// Deterministic extractor for tests and offline runs.
///
/// Scans OCR lines for OD/OS rows and reads up to four numeric columns as
/// sphere, cylinder, axis and add; picks up PD rows and doctor lines. Far
/// cruder than the real model, but produces the same reply shape without
/// network access.
pub struct MockExtractor;

impl Extractor for MockExtractor {
    fn extract(&self, ocr_text: &str, _lines: &[OcrLine]) -> Result<Value, ExtractorError> {
        Ok(json!({
            "status": "ok",
            "message": "mock extraction",
            "data": {
                "right_eye": scan_eye_row(ocr_text, "OD"),
                "left_eye": scan_eye_row(ocr_text, "OS"),
                "pupillary_distance": scan_pd(ocr_text),
                "doctor_name": scan_doctor(ocr_text),
                "date": Value::Null,
            },
            "diagnostics": {
                "uncertain_fields": [],
                "reasons": {},
                "confidence": "medium"
            }
        }))
    }
}

fn scan_eye_row(text: &str, marker: &str) -> Value {
    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.to_uppercase().starts_with(marker) {
            continue;
        }
        let mut numbers = trimmed[marker.len()..]
            .split_whitespace()
            .filter_map(parse_number);
        return json!({
            "sphere": numbers.next(),
            "cylinder": numbers.next(),
            "axis": numbers.next(),
            "add": numbers.next(),
        });
    }
    Value::Null
}

fn scan_pd(text: &str) -> Value {
    for line in text.lines() {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("PD") else {
            continue;
        };
        let candidate = rest.trim_start_matches([':', ' ']).trim();
        if !candidate.is_empty() {
            return json!(candidate);
        }
    }
    Value::Null
}

fn scan_doctor(text: &str) -> Value {
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("Dr.") || trimmed.starts_with("Doctor") {
            return json!(trimmed);
        }
    }
    Value::Null
}

fn parse_number(token: &str) -> Option<f64> {
    token
        .trim_matches(|c: char| !c.is_ascii_digit() && c != '-' && c != '+' && c != '.')
        .parse::<f64>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxlens_core::models::Status;
    use rxlens_core::pipeline::Pipeline;

    #[test]
    fn test_parse_reply() {
        let reply = parse_reply(r#"{"status": "ok", "data": null}"#).unwrap();
        assert_eq!(reply["status"], "ok");
    }

    #[test]
    fn test_parse_reply_with_prose_wrapper() {
        let raw = "Here is the extracted prescription:\n```json\n{\"status\": \"ok\", \"data\": null}\n```\nLet me know if you need more.";
        let reply = parse_reply(raw).unwrap();
        assert_eq!(reply["status"], "ok");
    }

    #[test]
    fn test_parse_reply_without_json() {
        assert!(matches!(
            parse_reply("I could not read the image."),
            Err(ExtractorError::InvalidReply(_))
        ));
    }

    #[test]
    fn test_mock_extractor_reads_eye_rows() {
        let text = "OD -1.00 -0.75 180 +2.50\nOS -1.25\nPD 62/60\nDr. Chen";
        let reply = MockExtractor.extract(text, &[]).unwrap();

        assert_eq!(reply["data"]["right_eye"]["sphere"], json!(-1.0));
        assert_eq!(reply["data"]["right_eye"]["cylinder"], json!(-0.75));
        assert_eq!(reply["data"]["right_eye"]["axis"], json!(180.0));
        assert_eq!(reply["data"]["right_eye"]["add"], json!(2.5));
        assert_eq!(reply["data"]["left_eye"]["sphere"], json!(-1.25));
        assert_eq!(reply["data"]["left_eye"]["cylinder"], Value::Null);
        assert_eq!(reply["data"]["pupillary_distance"], json!("62/60"));
        assert_eq!(reply["data"]["doctor_name"], json!("Dr. Chen"));
    }

    #[test]
    fn test_mock_extractor_missing_rows() {
        let reply = MockExtractor.extract("nothing legible", &[]).unwrap();
        assert_eq!(reply["data"]["right_eye"], Value::Null);
        assert_eq!(reply["data"]["pupillary_distance"], Value::Null);
    }

    #[test]
    fn test_mock_extractor_drives_the_pipeline() {
        let text = "OD -1.00 -0.75 180\nOS -1.25\nPD 62/60";
        let lines: Vec<OcrLine> = text
            .lines()
            .map(|l| OcrLine {
                text: l.to_string(),
                confidence: 0.9,
            })
            .collect();

        let extractor = MockExtractor;
        let envelope = Pipeline::new(&extractor).process(text, &lines).unwrap();

        assert_eq!(envelope.status, Status::Ok);
        let record = envelope.data.unwrap();
        assert_eq!(record.right_eye.sphere, Some(-1.0));
        assert_eq!(record.right_eye.axis, Some(180));
        assert_eq!(record.left_eye.sphere, Some(-1.25));
        assert_eq!(envelope.diagnostics.ocr_confidence_scores.average, 0.9);
    }
}
