//! Tolerant JSON Extraction
//!
//! Text-generation services frequently emit near-valid JSON with a small,
//! recurring set of defects: fenced code blocks, unquoted property names,
//! trailing commas, missing commas between objects, single quotes, and
//! bare scalar values. Each defect gets a targeted rewrite rule.
//!
//! Rules are ordered and run in two passes; order matters because the
//! second pass assumes the first already normalized property quoting and
//! commas. A parse is attempted before any rewriting and between passes.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, error};

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

static UNQUOTED_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s*)([a-zA-Z_][a-zA-Z0-9_\s]*)\s*:").unwrap());

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

static MISSING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\}\s*)(\s*"[^"]*"\s*:)"#).unwrap());

static UNQUOTED_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#":\s*([^",\[\{\s][^",\[\{]*[^",\[\}\s])\s*([,\}])"#).unwrap());

/// A single named rewrite applied to the candidate text
struct RepairRule {
    name: &'static str,
    apply: fn(&str) -> String,
}

/// First pass: quoting and comma normalization
const FIRST_PASS: [RepairRule; 3] = [
    RepairRule {
        name: "quote-property-names",
        apply: quote_property_names,
    },
    RepairRule {
        name: "strip-trailing-commas",
        apply: strip_trailing_commas,
    },
    RepairRule {
        name: "insert-missing-commas",
        apply: insert_missing_commas,
    },
];

/// Second pass: aggressive quote normalization, assumes the first pass ran
const SECOND_PASS: [RepairRule; 2] = [
    RepairRule {
        name: "normalize-single-quotes",
        apply: normalize_single_quotes,
    },
    RepairRule {
        name: "quote-bare-values",
        apply: quote_bare_values,
    },
];

/// Extract and parse a JSON object from model output, repairing common
/// defects. Returns `None` when no stage produces a parseable object; the
/// failure is logged, never propagated.
pub fn extract_object(text: &str) -> Option<Map<String, Value>> {
    let candidate = isolate_json(text);

    if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
        return into_object(value);
    }

    let mut repaired = candidate;
    for rule in &FIRST_PASS {
        repaired = (rule.apply)(&repaired);
        debug!(rule = rule.name, "applied repair rule");
    }
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        return into_object(value);
    }

    for rule in &SECOND_PASS {
        repaired = (rule.apply)(&repaired);
        debug!(rule = rule.name, "applied repair rule");
    }
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => into_object(value),
        Err(err) => {
            error!(error = %err, "failed to parse response after repair");
            debug!(text, "unparseable response text");
            None
        }
    }
}

/// Prefer the interior of a fenced code block; otherwise slice from the
/// first `{` to the last `}`.
fn isolate_json(text: &str) -> String {
    if let Some(caps) = CODE_FENCE_RE.captures(text) {
        return caps[1].to_string();
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

fn into_object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            error!(kind = json_kind(&other), "response is not a JSON object");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `{name: "x"}` → `{"name": "x"}`
fn quote_property_names(s: &str) -> String {
    UNQUOTED_KEY_RE.replace_all(s, "$1\"$2\":").into_owned()
}

/// `{"a": 1,}` → `{"a": 1}`
fn strip_trailing_commas(s: &str) -> String {
    TRAILING_COMMA_RE.replace_all(s, "$1").into_owned()
}

/// `{"a": {}"b": 1}` → `{"a": {},\n"b": 1}`
fn insert_missing_commas(s: &str) -> String {
    MISSING_COMMA_RE.replace_all(s, "$1,\n$2").into_owned()
}

/// `{'a': 'x'}` → `{"a": "x"}`
fn normalize_single_quotes(s: &str) -> String {
    s.replace('\'', "\"")
}

/// `{"a": bare text}` → `{"a": "bare text"}`
fn quote_bare_values(s: &str) -> String {
    UNQUOTED_VALUE_RE.replace_all(s, ": \"$1\"$2").into_owned()
}
