//! LLM extraction collaborator for prescription OCR text.
//!
//! The default build ships the master prompt, reply parsing and a
//! deterministic mock extractor; the real Gemini client sits behind the
//! `gemini` feature so core logic builds and tests without network
//! dependencies.

pub mod extraction;
pub mod prompts;

#[cfg(feature = "gemini")]
pub mod gemini;

pub use extraction::*;
pub use prompts::*;

#[cfg(feature = "gemini")]
pub use gemini::GeminiExtractor;
