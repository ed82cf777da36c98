use crate::calc::{self, CalcError};
use crate::model::ScoreInput;
use serde_json::Value;

const COMPONENT_FIELDS: [&str; 4] = ["ca1", "ca2", "examScore", "ltc"];

// Older simple-grade records carried one out-of-100 number.
const LEGACY_FIELDS: [&str; 2] = ["value", "overallScore"];

fn is_supplied(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Rewrite a legacy simple-grade record into the component schema.
///
/// The legacy number moves into `ltc`, which makes it the overall score on
/// its own. Records that already carry any component are returned as `None`
/// and their legacy fields are ignored.
pub fn upgrade_legacy_record(raw: &Value) -> Option<Value> {
    let obj = raw.as_object()?;
    if COMPONENT_FIELDS.iter().any(|f| is_supplied(obj.get(*f))) {
        return None;
    }
    let legacy = LEGACY_FIELDS
        .iter()
        .find_map(|f| obj.get(*f).filter(|v| is_supplied(Some(v))))?
        .clone();

    let mut upgraded = obj.clone();
    for f in LEGACY_FIELDS {
        upgraded.remove(f);
    }
    upgraded.insert("ltc".to_string(), legacy);
    Some(Value::Object(upgraded))
}

/// Normalize a record, upgrading it first if it uses the legacy shape.
pub fn normalize_record(raw: &Value) -> Result<ScoreInput, CalcError> {
    match upgrade_legacy_record(raw) {
        Some(upgraded) => {
            tracing::debug!("upgraded legacy simple-grade record");
            calc::normalize(&upgraded)
        }
        None => calc::normalize(raw),
    }
}
