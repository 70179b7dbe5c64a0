//! Whole-record prescription validation.
//!
//! Applies the field normalizer across both eyes and the shared fields,
//! enforces the axis/cylinder cross-field rule, and collects every
//! warning in processing order: right eye [sphere, cylinder, axis, add],
//! left eye in the same order, then pupillary distance, then date.

mod normalizer;

pub use normalizer::*;

use serde_json::Value;

use crate::models::{
    EyeFields, PrescriptionRecord, RawExtraction, RawEyeFields, ValidationStatus,
};

/// Result of validating one raw extraction. Validation itself never
/// fails: malformed fields become null with a recorded warning.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// The validated record; `None` only when the raw payload was null.
    pub record: Option<PrescriptionRecord>,
    /// Warnings in processing order.
    pub notes: Vec<String>,
    pub status: ValidationStatus,
}

impl ValidationOutcome {
    /// Outcome for a request whose extraction carried no data at all.
    pub fn empty() -> Self {
        Self {
            record: None,
            notes: Vec::new(),
            status: ValidationStatus::Clean,
        }
    }
}

/// Validate and normalize a full two-eye extraction.
pub fn validate(raw: &RawExtraction) -> ValidationOutcome {
    let mut notes = Vec::new();

    let right_eye = validate_eye(&raw.right_eye, "right_eye", &mut notes);
    let left_eye = validate_eye(&raw.left_eye, "left_eye", &mut notes);

    let (pupillary_distance, pd_warnings) = check_pupillary_distance(&raw.pupillary_distance);
    notes.extend(pd_warnings);

    let date = take(normalize_date(&raw.date), &mut notes);
    let doctor_name = doctor_name(&raw.doctor_name);

    let status = if notes.is_empty() {
        ValidationStatus::Clean
    } else {
        ValidationStatus::Warnings
    };

    ValidationOutcome {
        record: Some(PrescriptionRecord {
            right_eye,
            left_eye,
            pupillary_distance,
            doctor_name,
            date,
        }),
        notes,
        status,
    }
}

fn validate_eye(raw: &RawEyeFields, eye: &str, notes: &mut Vec<String>) -> EyeFields {
    let sphere = take(normalize_power(&raw.sphere, &format!("{eye} sphere")), notes);
    let cylinder = take(
        normalize_power(&raw.cylinder, &format!("{eye} cylinder")),
        notes,
    );
    let mut axis = take(normalize_axis(&raw.axis, &format!("{eye} axis")), notes);

    // An axis is meaningless without cylinder power, whatever its own
    // validity.
    if axis.is_some() && cylinder.map_or(true, |c| c == 0.0) {
        axis = None;
        notes.push(format!("{eye} axis nullified: no cylinder power"));
    }

    let add = take(normalize_add(&raw.add, eye), notes);

    EyeFields {
        sphere,
        cylinder,
        axis,
        add,
    }
}

fn take<T>(outcome: Outcome<T>, notes: &mut Vec<String>) -> Option<T> {
    if let Some(warning) = outcome.warning {
        notes.push(warning);
    }
    outcome.value
}

/// Doctor name is passed through verbatim apart from trimming; an empty
/// or non-string value becomes null with no warning.
fn doctor_name(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}
