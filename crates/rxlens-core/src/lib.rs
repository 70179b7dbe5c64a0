//! Rxlens Core Library
//!
//! Validation and normalization engine for photographed eyeglass
//! prescriptions.
//!
//! # Architecture
//!
//! ```text
//! Image → OCR engine → results.json
//!                          │
//!                 ┌────────┴────────┐
//!                 │                 │
//!           OCR lines           OCR text
//!                 │                 │
//!     ConfidenceAggregation   LLM extraction (injected Extractor)
//!                 │                 │
//!                 │          RawExtraction (untrusted)
//!                 │                 │
//!                 │        PrescriptionValidator
//!                 │                 │
//!                 └──── Pipeline ───┘
//!                          │
//!                    ResultEnvelope
//! ```
//!
//! # Core Principle
//!
//! **The LLM's claimed values are never trusted.** Every field is
//! re-parsed, range-checked and canonicalized; anything malformed becomes
//! null plus a recorded warning, and accumulated warnings escalate the
//! overall status so a clean `ok` is only possible when validation found
//! nothing to fix.
//!
//! # Modules
//!
//! - [`ocr`]: OCR results-document parsing ([`ocr::OcrLine`] ingestion)
//! - [`models`]: domain types (PrescriptionRecord, Diagnostics, ResultEnvelope)
//! - [`validator`]: per-field normalization and whole-record validation
//! - [`confidence`]: OCR confidence aggregation for diagnostics
//! - [`pipeline`]: request orchestration over an injected LLM extractor

pub mod confidence;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod validator;

// Re-export commonly used types
pub use models::{
    Confidence, Diagnostics, EyeFields, OcrConfidenceScores, PdValue, PrescriptionRecord,
    RawExtraction, RawEyeFields, ResultEnvelope, Status, ValidationStatus,
};
pub use ocr::OcrLine;
pub use pipeline::{Extractor, ExtractorError, Pipeline, PipelineError};
pub use validator::ValidationOutcome;
