//! Response envelope, status codes and diagnostics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::prescription::PrescriptionRecord;
use crate::ocr::OcrLine;

/// Overall result status.
///
/// Variants are declared in escalation order so the derived `Ord` gives
/// the total order `ok < needs_review < reupload_required`; combining two
/// statuses is always a plain `max`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Extraction complete and validation clean
    Ok,
    /// Usable extraction, but a human should look at it
    NeedsReview,
    /// The source image gave nothing usable
    ReuploadRequired,
}

impl Status {
    /// Combine with another status; escalation only, never a downgrade.
    pub fn escalate(self, other: Status) -> Status {
        self.max(other)
    }

    /// Interpret the LLM's claimed status. Unrecognized hints come from
    /// an untrusted collaborator and map to `NeedsReview`.
    pub fn from_hint(hint: &str) -> Status {
        match hint.trim() {
            "ok" => Status::Ok,
            "needs_review" => Status::NeedsReview,
            "reupload_required" => Status::ReuploadRequired,
            _ => Status::NeedsReview,
        }
    }
}

/// Categorical extraction confidence claimed by the LLM.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

impl Confidence {
    pub fn from_hint(hint: &str) -> Confidence {
        match hint.trim() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

/// Whether validation altered or rejected anything.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Clean,
    Warnings,
}

/// Average OCR confidence plus a bounded line preview, embedded in
/// diagnostics on every path so OCR quality is assessable even on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OcrConfidenceScores {
    pub average: f64,
    pub samples: Vec<OcrLine>,
}

/// Per-request diagnostics attached to the envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Diagnostics {
    /// Fields the LLM flagged as uncertain
    pub uncertain_fields: Vec<String>,
    /// LLM's stated reason per uncertain field
    pub reasons: BTreeMap<String, String>,
    /// LLM's categorical confidence label
    pub confidence: Confidence,
    /// Ordered warnings recorded by validation
    pub validation_notes: Vec<String>,
    pub validation_status: ValidationStatus,
    pub ocr_confidence_scores: OcrConfidenceScores,
}

impl Diagnostics {
    /// Lift the LLM's diagnostics fragment, dropping anything that is not
    /// the expected shape. Validation fields are filled in by the pipeline.
    pub fn from_llm(fragment: Option<&Value>) -> Self {
        let mut diagnostics = Diagnostics::default();
        let Some(obj) = fragment.and_then(Value::as_object) else {
            return diagnostics;
        };
        if let Some(fields) = obj.get("uncertain_fields").and_then(Value::as_array) {
            diagnostics.uncertain_fields = fields
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
        if let Some(reasons) = obj.get("reasons").and_then(Value::as_object) {
            diagnostics.reasons = reasons
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect();
        }
        if let Some(label) = obj.get("confidence").and_then(Value::as_str) {
            diagnostics.confidence = Confidence::from_hint(label);
        }
        diagnostics
    }
}

/// The envelope returned to the web/CLI caller for every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultEnvelope {
    pub status: Status,
    pub message: String,
    pub data: Option<PrescriptionRecord>,
    pub diagnostics: Diagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_total_order() {
        assert!(Status::Ok < Status::NeedsReview);
        assert!(Status::NeedsReview < Status::ReuploadRequired);
    }

    #[test]
    fn test_status_escalate_never_downgrades() {
        assert_eq!(Status::Ok.escalate(Status::NeedsReview), Status::NeedsReview);
        assert_eq!(Status::NeedsReview.escalate(Status::Ok), Status::NeedsReview);
        assert_eq!(
            Status::ReuploadRequired.escalate(Status::Ok),
            Status::ReuploadRequired
        );
        assert_eq!(Status::Ok.escalate(Status::Ok), Status::Ok);
    }

    #[test]
    fn test_status_from_hint() {
        assert_eq!(Status::from_hint("ok"), Status::Ok);
        assert_eq!(Status::from_hint("needs_review"), Status::NeedsReview);
        assert_eq!(
            Status::from_hint("reupload_required"),
            Status::ReuploadRequired
        );
        // Untrusted hint never unlocks ok
        assert_eq!(Status::from_hint("great success"), Status::NeedsReview);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(Status::Ok).unwrap(), json!("ok"));
        assert_eq!(
            serde_json::to_value(Status::ReuploadRequired).unwrap(),
            json!("reupload_required")
        );
    }

    #[test]
    fn test_diagnostics_from_llm_fragment() {
        let diagnostics = Diagnostics::from_llm(Some(&json!({
            "uncertain_fields": ["axis", 7, "date"],
            "reasons": {"axis": "smudged digits", "date": 3},
            "confidence": "medium"
        })));

        assert_eq!(diagnostics.uncertain_fields, vec!["axis", "date"]);
        assert_eq!(diagnostics.reasons.len(), 1);
        assert_eq!(diagnostics.reasons["axis"], "smudged digits");
        assert_eq!(diagnostics.confidence, Confidence::Medium);
        assert!(diagnostics.validation_notes.is_empty());
    }

    #[test]
    fn test_diagnostics_from_llm_garbage() {
        assert_eq!(Diagnostics::from_llm(None), Diagnostics::default());
        assert_eq!(
            Diagnostics::from_llm(Some(&json!("low"))),
            Diagnostics::default()
        );
    }
}
