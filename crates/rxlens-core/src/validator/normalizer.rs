//! Per-field normalization.
//!
//! Handles:
//! - Sphere/cylinder quantization (0.25 diopter steps, range checks)
//! - Axis integer coercion
//! - Add-power positivity and advisory range checks
//! - Pupillary-distance advisory checks
//! - Multi-format date canonicalization
//!
//! Nothing here ever fails: every function returns a value-or-null
//! outcome with an optional warning describing what was altered or
//! rejected, so one bad field never aborts the rest of the record.

use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::models::PdValue;

/// Outcome of normalizing a single raw field.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: Option<T>,
    pub warning: Option<String>,
}

impl<T> Outcome<T> {
    /// Field was missing or null: no value, no warning.
    fn absent() -> Self {
        Self {
            value: None,
            warning: None,
        }
    }

    fn accept(value: T) -> Self {
        Self {
            value: Some(value),
            warning: None,
        }
    }

    fn adjust(value: T, warning: String) -> Self {
        Self {
            value: Some(value),
            warning: Some(warning),
        }
    }

    fn reject(warning: String) -> Self {
        Self {
            value: None,
            warning: Some(warning),
        }
    }
}

/// Tolerance for deciding a value already sits on a 0.25 step, absorbing
/// float representation jitter without accepting real OCR drift.
const STEP_TOLERANCE: f64 = 1e-6;

const POWER_MIN: f64 = -20.0;
const POWER_MAX: f64 = 20.0;

const AXIS_MIN: i32 = 0;
const AXIS_MAX: i32 = 180;

const ADD_TYPICAL_MIN: f64 = 0.75;
const ADD_TYPICAL_MAX: f64 = 3.50;

const PD_TYPICAL_MIN: f64 = 50.0;
const PD_TYPICAL_MAX: f64 = 75.0;

/// Normalize a sphere or cylinder power to a 0.25 diopter step within
/// [-20.00, +20.00]. Off-step values are rounded to the nearest step;
/// exact half-step ties round away from zero (the documented tie-break,
/// which `f64::round` provides).
pub fn normalize_power(raw: &Value, field: &str) -> Outcome<f64> {
    if raw.is_null() {
        return Outcome::absent();
    }
    let Some(value) = parse_f64(raw) else {
        return Outcome::reject(format!("{field} unparsable: {}", display(raw)));
    };
    if !(POWER_MIN..=POWER_MAX).contains(&value) {
        return Outcome::reject(format!("{field} out of range: {value}"));
    }
    let quantized = (value * 4.0).round() / 4.0;
    if (quantized - value).abs() > STEP_TOLERANCE {
        return Outcome::adjust(
            quantized,
            format!("{field} rounded from {} to {quantized:.2}", display(raw)),
        );
    }
    Outcome::accept(quantized)
}

/// Normalize an astigmatism axis to an integer in [0, 180]. Fractional
/// input is truncated toward zero before the range check. The sibling
/// cylinder rule lives in the validator, not here.
pub fn normalize_axis(raw: &Value, field: &str) -> Outcome<i32> {
    if raw.is_null() {
        return Outcome::absent();
    }
    let Some(value) = parse_f64(raw) else {
        return Outcome::reject(format!("{field} unparsable: {}", display(raw)));
    };
    let axis = value.trunc() as i32;
    if !(AXIS_MIN..=AXIS_MAX).contains(&axis) {
        return Outcome::reject(format!("{field} out of range: {axis}"));
    }
    Outcome::accept(axis)
}

/// Normalize an add power: must be strictly positive; values outside the
/// typical band [0.75, 3.50] are kept with an advisory warning and no
/// step rounding is applied.
pub fn normalize_add(raw: &Value, eye: &str) -> Outcome<f64> {
    if raw.is_null() {
        return Outcome::absent();
    }
    let Some(value) = parse_f64(raw) else {
        return Outcome::reject(format!("{eye} add unparsable: {}", display(raw)));
    };
    if value <= 0.0 {
        return Outcome::reject(format!("{eye} add power must be positive"));
    }
    if !(ADD_TYPICAL_MIN..=ADD_TYPICAL_MAX).contains(&value) {
        return Outcome::adjust(
            value,
            format!("{eye} add {value:.2} outside typical range (0.75-3.50)"),
        );
    }
    Outcome::accept(value)
}

/// Advisory check of a pupillary distance: a bare millimeter value or a
/// slash-separated OD/OS pair. Out-of-range or unparsable sides warn,
/// but the raw value is always preserved unmodified.
pub fn check_pupillary_distance(raw: &Value) -> (Option<PdValue>, Vec<String>) {
    let mut warnings = Vec::new();
    match raw {
        Value::Null => (None, warnings),
        Value::Number(n) => {
            let Some(value) = n.as_f64() else {
                warnings.push(format!("pupillary_distance unparsable: {n}"));
                return (None, warnings);
            };
            check_pd_side(value, &mut warnings);
            (Some(PdValue::Millimeters(value)), warnings)
        }
        Value::String(s) => {
            let text = s.trim();
            if text.is_empty() {
                return (None, warnings);
            }
            for side in text.split('/') {
                let side = side.trim();
                if side.is_empty() {
                    continue;
                }
                match side.parse::<f64>() {
                    Ok(value) => check_pd_side(value, &mut warnings),
                    Err(_) => warnings.push(format!("pupillary_distance unparsable: {side}")),
                }
            }
            (Some(PdValue::Text(text.to_string())), warnings)
        }
        other => {
            warnings.push(format!("pupillary_distance unparsable: {other}"));
            (None, warnings)
        }
    }
}

fn check_pd_side(value: f64, warnings: &mut Vec<String>) {
    if !(PD_TYPICAL_MIN..=PD_TYPICAL_MAX).contains(&value) {
        warnings.push(format!(
            "pupillary_distance {value} outside typical range (50-75mm)"
        ));
    }
}

/// Accepted date formats in fixed priority order. The order is the
/// disambiguation policy for MM/DD vs DD/MM input: the first structurally
/// valid parse wins, with no locale detection. The bool marks two-digit
/// year formats.
const DATE_FORMATS: [(&str, bool); 10] = [
    ("%m/%d/%Y", false),
    ("%m-%d-%Y", false),
    ("%d/%m/%Y", false),
    ("%d-%m-%Y", false),
    ("%Y/%m/%d", false),
    ("%Y-%m-%d", false),
    ("%m/%d/%y", true),
    ("%m-%d-%y", true),
    ("%d/%m/%y", true),
    ("%d-%m-%y", true),
];

/// Canonicalize a date to YYYY-MM-DD via the fixed format priority list.
/// Two-digit years map to the 2000s. Already-canonical input is returned
/// unchanged with no warning.
pub fn normalize_date(raw: &Value) -> Outcome<String> {
    if raw.is_null() {
        return Outcome::absent();
    }
    let text = display(raw);
    for (format, two_digit_year) in DATE_FORMATS {
        let Ok(mut date) = NaiveDate::parse_from_str(&text, format) else {
            continue;
        };
        if two_digit_year {
            // chrono's POSIX pivot puts 69-99 in the 1900s
            if date.year() < 2000 {
                match date.with_year(date.year() + 100) {
                    Some(shifted) => date = shifted,
                    None => continue,
                }
            }
        } else if date.year() < 1000 {
            // A two-digit year must not satisfy a four-digit format
            continue;
        }
        let canonical = date.format("%Y-%m-%d").to_string();
        if canonical == text {
            return Outcome::accept(canonical);
        }
        return Outcome::adjust(
            canonical.clone(),
            format!("date {text} converted to ISO format {canonical}"),
        );
    }
    Outcome::reject(format!("date format unrecognized: {text}"))
}

fn parse_f64(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn display(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
