//! Domain models for prescription extraction.

mod prescription;
mod report;

pub use prescription::*;
pub use report::*;
