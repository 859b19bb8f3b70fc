use chrono::NaiveDateTime;
use serde_json::{Number, Value};

use crate::ngsild::attribute::Property;

/// Separator between occurrences of a multi-valued metric.
pub const VALUES_SEPARATOR: &str = ",";

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

const INPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const DISPLAY_TIMESTAMP_FORMAT: &str = "%-d %b %Y %H:%M:%S";

/// Primary fields of one attribute occurrence, rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Core {
    pub value: String,
    pub unit_code: String,
    pub created_at: String,
    pub modified_at: String,
}

/// Metadata selector lookup result for one attribute occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub found: bool,
    pub value: String,
    pub unit_code: String,
}

/// Render a JSON value for display.
///
/// Strings lose their quotes, null renders empty and containers fall back to
/// compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => stringify_number(n),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Integral floats render without a trailing `.0`.
fn stringify_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT_INT => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

fn stringify_opt(value: Option<&Value>) -> String {
    value.map(stringify).unwrap_or_default()
}

/// Value (or relationship target), unit code and raw timestamps.
pub fn extract_core(property: &Property<'_>) -> Core {
    Core {
        value: stringify_opt(property.value().or_else(|| property.object())),
        unit_code: stringify_opt(property.unit_code()),
        created_at: stringify_opt(property.created_at()),
        modified_at: stringify_opt(property.modified_at()),
    }
}

/// Look up the `selector` sub-property and return its value and unit code.
pub fn extract_metadata(property: &Property<'_>, selector: &str) -> Metadata {
    if selector.is_empty() {
        return Metadata::default();
    }

    match property.field(selector) {
        Some(Value::Object(nested)) => Metadata {
            found: true,
            value: stringify_opt(nested.get("value")),
            unit_code: stringify_opt(nested.get("unitCode")),
        },
        Some(other) => {
            log::warn!(
                "Metadata selector {} is not a property: {}",
                selector,
                other
            );
            Metadata::default()
        }
        None => Metadata::default(),
    }
}

/// Compose `value[ unit][ (metaValue[ metaUnit])]`, appended to `accumulator`
/// with `separator` when it is not empty.
///
/// ```
/// use ngsild_datasource::ngsild::format::build_display_string;
///
/// assert_eq!(build_display_string("", "10", "CEL", "20", "MTR", ","), "10 CEL (20 MTR)");
/// assert_eq!(build_display_string("10 CEL", "5", "", "", "", ","), "10 CEL, 5");
/// ```
pub fn build_display_string(
    accumulator: &str,
    value: &str,
    unit_code: &str,
    meta_value: &str,
    meta_unit_code: &str,
    separator: &str,
) -> String {
    let mut segment = String::from(value);
    if !unit_code.is_empty() {
        segment.push(' ');
        segment.push_str(unit_code);
    }
    if !meta_value.is_empty() {
        segment.push_str(" (");
        segment.push_str(meta_value);
        if !meta_unit_code.is_empty() {
            segment.push(' ');
            segment.push_str(meta_unit_code);
        }
        segment.push(')');
    }

    if accumulator.is_empty() {
        segment
    } else {
        format!("{}{} {}", accumulator, separator, segment)
    }
}

/// Reformat an NGSI-LD timestamp as `D Mon YYYY HH:MM:SS`.
///
/// Empty input stays empty. Unparseable input is logged and rendered empty.
pub fn format_timestamp(iso: &str) -> String {
    if iso.is_empty() {
        return String::new();
    }

    match NaiveDateTime::parse_from_str(iso, INPUT_TIMESTAMP_FORMAT) {
        Ok(parsed) => parsed.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
        Err(e) => {
            log::warn!("Unable to parse timestamp {:?}: {}", iso, e);
            String::new()
        }
    }
}
