//! Prescription record models: the untrusted extraction payload and the
//! validated record built from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw extraction payload from the LLM, before any validation.
///
/// Every field is kept as raw JSON: missing, null, wrongly typed and
/// symbol-laden values are all representable. No invariants hold here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawExtraction {
    pub right_eye: RawEyeFields,
    pub left_eye: RawEyeFields,
    pub pupillary_distance: Value,
    pub doctor_name: Value,
    pub date: Value,
}

impl RawExtraction {
    /// Lenient ingestion of the LLM's `data` object. Returns `None` only
    /// when the value is not a JSON object; fields of the wrong shape
    /// degrade to null rather than failing the whole payload.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            right_eye: RawEyeFields::from_value(obj.get("right_eye")),
            left_eye: RawEyeFields::from_value(obj.get("left_eye")),
            pupillary_distance: field(obj, "pupillary_distance"),
            doctor_name: field(obj, "doctor_name"),
            date: field(obj, "date"),
        })
    }
}

/// Raw per-eye fields as extracted, untyped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEyeFields {
    pub sphere: Value,
    pub cylinder: Value,
    pub axis: Value,
    pub add: Value,
}

impl RawEyeFields {
    fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_object) {
            Some(obj) => Self {
                sphere: field(obj, "sphere"),
                cylinder: field(obj, "cylinder"),
                axis: field(obj, "axis"),
                add: field(obj, "add"),
            },
            None => Self::default(),
        }
    }
}

fn field(obj: &serde_json::Map<String, Value>, key: &str) -> Value {
    obj.get(key).cloned().unwrap_or(Value::Null)
}

/// Validated lens powers for one eye.
///
/// After validation: sphere and cylinder are exact 0.25 multiples within
/// [-20.00, +20.00]; axis is an integer in [0, 180] and null whenever the
/// cylinder is null or zero; add is positive (the typical band 0.75-3.50
/// is advisory only).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EyeFields {
    /// Spherical power in diopters
    pub sphere: Option<f64>,
    /// Cylindrical power in diopters
    pub cylinder: Option<f64>,
    /// Astigmatism axis in degrees
    pub axis: Option<i32>,
    /// Near-vision add power in diopters
    pub add: Option<f64>,
}

/// Pupillary distance: a single millimeter value or a slash-separated
/// OD/OS pair kept as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PdValue {
    Millimeters(f64),
    Text(String),
}

/// A validated, canonically formatted prescription record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionRecord {
    /// OD (right eye) fields
    pub right_eye: EyeFields,
    /// OS (left eye) fields
    pub left_eye: EyeFields,
    /// Pupillary distance, preserved as given (advisory checks only)
    pub pupillary_distance: Option<PdValue>,
    /// Prescribing doctor, trimmed passthrough
    pub doctor_name: Option<String>,
    /// Prescription date in canonical YYYY-MM-DD form
    pub date: Option<String>,
}
