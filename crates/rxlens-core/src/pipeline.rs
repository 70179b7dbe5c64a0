//! Prescription processing pipeline.
//!
//! Per-request state machine: empty OCR text short-circuits to a
//! reupload envelope; otherwise the injected extractor is invoked, its
//! reply structure is checked, and the payload is validated and folded
//! into the final envelope. The LLM's claimed status can only be
//! escalated by validation warnings, never downgraded.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::confidence;
use crate::models::{Confidence, Diagnostics, RawExtraction, ResultEnvelope, Status, ValidationStatus};
use crate::ocr::OcrLine;
use crate::validator::{self, ValidationOutcome};

/// Fixed message for the empty-OCR terminal state.
pub const EMPTY_OCR_MESSAGE: &str = "OCR text is empty. Please upload a clearer image.";

/// Errors an [`Extractor`] implementation can signal.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid reply: {0}")]
    InvalidReply(String),
}

/// Pipeline failures. These are distinct from the envelope statuses: a
/// broken collaborator is an error, never silently mapped to `ok`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractorError),

    #[error("LLM reply is not a JSON object")]
    ReplyNotAnObject,

    #[error("LLM reply missing required key: {0}")]
    MissingKey(&'static str),

    #[error("LLM reply data is neither null nor an object")]
    InvalidData,
}

/// External LLM extraction capability.
///
/// Implementations take the OCR text (and the per-line confidences, for
/// backends that embed them) and return the model's raw JSON reply. The
/// pipeline trusts none of it and re-validates every field, so tests run
/// against deterministic fakes.
pub trait Extractor {
    fn extract(&self, ocr_text: &str, lines: &[OcrLine]) -> Result<Value, ExtractorError>;
}

/// Sequences extraction, validation and confidence aggregation into one
/// envelope. Stateless per request; safe to share across threads as long
/// as the extractor is.
pub struct Pipeline<'a> {
    extractor: &'a dyn Extractor,
}

impl<'a> Pipeline<'a> {
    pub fn new(extractor: &'a dyn Extractor) -> Self {
        Self { extractor }
    }

    /// Process one request: OCR line list plus joined OCR text in, result
    /// envelope out. OCR confidence scores are embedded in diagnostics on
    /// every path, including the reupload short-circuit.
    pub fn process(
        &self,
        ocr_text: &str,
        lines: &[OcrLine],
    ) -> Result<ResultEnvelope, PipelineError> {
        let scores = confidence::summarize(lines);

        if ocr_text.trim().is_empty() {
            debug!("OCR text empty, requesting reupload");
            return Ok(ResultEnvelope {
                status: Status::ReuploadRequired,
                message: EMPTY_OCR_MESSAGE.to_string(),
                data: None,
                diagnostics: Diagnostics {
                    confidence: Confidence::Low,
                    ocr_confidence_scores: scores,
                    ..Diagnostics::default()
                },
            });
        }

        debug!(lines = lines.len(), "invoking extractor");
        let reply = LlmReply::from_value(self.extractor.extract(ocr_text, lines)?)?;

        let outcome = match &reply.data {
            Some(extraction) => validator::validate(extraction),
            None => ValidationOutcome::empty(),
        };
        if !outcome.notes.is_empty() {
            warn!(notes = outcome.notes.len(), "validation recorded warnings");
        }

        let escalation = match outcome.status {
            ValidationStatus::Clean => Status::Ok,
            ValidationStatus::Warnings => Status::NeedsReview,
        };
        let status = reply.status.escalate(escalation);

        let mut diagnostics = reply.diagnostics;
        diagnostics.validation_notes = outcome.notes;
        diagnostics.validation_status = outcome.status;
        diagnostics.ocr_confidence_scores = scores;

        Ok(ResultEnvelope {
            status,
            message: reply.message,
            data: outcome.record,
            diagnostics,
        })
    }
}

/// The LLM reply after structural checks: `status` and `data` keys must
/// exist; everything else degrades gracefully.
struct LlmReply {
    status: Status,
    message: String,
    data: Option<RawExtraction>,
    diagnostics: Diagnostics,
}

impl LlmReply {
    fn from_value(value: Value) -> Result<Self, PipelineError> {
        let obj = value.as_object().ok_or(PipelineError::ReplyNotAnObject)?;
        let status_hint = obj.get("status").ok_or(PipelineError::MissingKey("status"))?;
        let data_value = obj.get("data").ok_or(PipelineError::MissingKey("data"))?;

        let data = if data_value.is_null() {
            None
        } else {
            Some(RawExtraction::from_value(data_value).ok_or(PipelineError::InvalidData)?)
        };

        Ok(Self {
            status: Status::from_hint(status_hint.as_str().unwrap_or("")),
            message: obj
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            data,
            diagnostics: Diagnostics::from_llm(obj.get("diagnostics")),
        })
    }
}
