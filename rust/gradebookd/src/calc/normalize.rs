use super::{CalcError, ValidationReason};
use crate::model::{AcademicYear, ScoreInput, Term};
use serde_json::{Map, Value};

pub const CA_MAX: f64 = 20.0;
pub const EXAM_MAX: f64 = 60.0;
pub const LTC_MAX: f64 = 100.0;

/// Turn a raw record (numbers or numeric strings, blanks meaning "not
/// entered") into a validated `ScoreInput`.
pub fn normalize(raw: &Value) -> Result<ScoreInput, CalcError> {
    let Some(obj) = raw.as_object() else {
        return Err(CalcError::validation(
            "record",
            ValidationReason::Malformed("must be an object".to_string()),
        ));
    };

    Ok(ScoreInput {
        student_id: parse_id("studentId", obj.get("studentId"))?,
        subject_id: parse_id("subjectId", obj.get("subjectId"))?,
        class_id: parse_id("classId", obj.get("classId"))?,
        academic_year: parse_academic_year(obj.get("academicYear"))?,
        term: parse_term(obj.get("term"))?,
        ca1: bounded(obj, "ca1", CA_MAX)?,
        ca2: bounded(obj, "ca2", CA_MAX)?,
        exam_score: bounded(obj, "examScore", EXAM_MAX)?,
        ltc: bounded(obj, "ltc", LTC_MAX)?,
        remark: parse_remark(obj.get("remark"))?,
    })
}

fn bounded(obj: &Map<String, Value>, field: &str, max: f64) -> Result<Option<f64>, CalcError> {
    let Some(value) = parse_number(field, obj.get(field))? else {
        return Ok(None);
    };
    if !(0.0..=max).contains(&value) {
        return Err(CalcError::validation(
            field,
            ValidationReason::OutOfRange {
                value,
                min: 0.0,
                max,
            },
        ));
    }
    Ok(Some(value))
}

fn parse_number(field: &str, raw: Option<&Value>) -> Result<Option<f64>, CalcError> {
    let not_numeric = || CalcError::validation(field, ValidationReason::NotNumeric);
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(not_numeric),
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() {
                return Ok(None);
            }
            t.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(not_numeric)
        }
        Some(_) => Err(not_numeric()),
    }
}

pub fn parse_id(field: &str, raw: Option<&Value>) -> Result<i64, CalcError> {
    let malformed = || {
        CalcError::validation(
            field,
            ValidationReason::Malformed("must be a non-negative integer".to_string()),
        )
    };
    let id = match raw {
        None | Some(Value::Null) => {
            return Err(CalcError::validation(field, ValidationReason::Required))
        }
        Some(Value::Number(n)) => n.as_i64().ok_or_else(malformed)?,
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(CalcError::validation(field, ValidationReason::Required))
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| malformed())?,
        Some(_) => return Err(malformed()),
    };
    if id < 0 {
        return Err(malformed());
    }
    Ok(id)
}

pub fn parse_academic_year(raw: Option<&Value>) -> Result<AcademicYear, CalcError> {
    match raw {
        None | Some(Value::Null) => Err(CalcError::validation(
            "academicYear",
            ValidationReason::Required,
        )),
        Some(Value::String(s)) => s
            .parse::<AcademicYear>()
            .map_err(|msg| CalcError::validation("academicYear", ValidationReason::Malformed(msg))),
        Some(_) => Err(CalcError::validation(
            "academicYear",
            ValidationReason::Malformed("must be a string".to_string()),
        )),
    }
}

pub fn parse_term(raw: Option<&Value>) -> Result<Term, CalcError> {
    match raw {
        None | Some(Value::Null) => Err(CalcError::validation("term", ValidationReason::Required)),
        Some(Value::String(s)) => s
            .parse::<Term>()
            .map_err(|msg| CalcError::validation("term", ValidationReason::Malformed(msg))),
        Some(_) => Err(CalcError::validation(
            "term",
            ValidationReason::Malformed("must be a string".to_string()),
        )),
    }
}

fn parse_remark(raw: Option<&Value>) -> Result<Option<String>, CalcError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let t = s.trim();
            Ok((!t.is_empty()).then(|| t.to_string()))
        }
        Some(_) => Err(CalcError::validation(
            "remark",
            ValidationReason::Malformed("must be a string".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(extra: Value) -> Value {
        let mut base = json!({
            "studentId": 1,
            "subjectId": 2,
            "classId": 3,
            "academicYear": "2024/2025",
            "term": "FIRST",
        });
        for (k, v) in extra.as_object().expect("object").clone() {
            base[k] = v;
        }
        base
    }

    fn field_of(e: &CalcError) -> &str {
        match e {
            CalcError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn ca_bounds_are_inclusive() {
        let ok = normalize(&record(json!({ "ca1": 0, "ca2": 20 }))).expect("bounds accepted");
        assert_eq!(ok.ca1, Some(0.0));
        assert_eq!(ok.ca2, Some(20.0));

        for bad in [-0.5, 20.01, 21.0, 100.0] {
            let e = normalize(&record(json!({ "ca1": bad }))).expect_err("out of range");
            assert_eq!(field_of(&e), "ca1");
            assert!(matches!(
                e,
                CalcError::Validation {
                    reason: ValidationReason::OutOfRange { .. },
                    ..
                }
            ));
        }
    }

    #[test]
    fn exam_and_ltc_ranges_are_enforced() {
        assert!(normalize(&record(json!({ "examScore": 60 }))).is_ok());
        let e = normalize(&record(json!({ "examScore": 61 }))).expect_err("exam over");
        assert_eq!(e.to_string(), "examScore must be at most 60 (got 61)");

        assert!(normalize(&record(json!({ "ltc": 100 }))).is_ok());
        let e = normalize(&record(json!({ "ltc": -1 }))).expect_err("ltc under");
        assert_eq!(e.to_string(), "ltc must be at least 0 (got -1)");
    }

    #[test]
    fn blank_strings_are_not_supplied_but_zero_is() {
        let n = normalize(&record(json!({ "ca1": "", "ca2": "  ", "examScore": "0", "ltc": null })))
            .expect("normalize");
        assert_eq!(n.ca1, None);
        assert_eq!(n.ca2, None);
        assert_eq!(n.exam_score, Some(0.0));
        assert_eq!(n.ltc, None);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let n = normalize(&record(json!({ "ca1": " 12.5 ", "studentId": "44" }))).expect("normalize");
        assert_eq!(n.ca1, Some(12.5));
        assert_eq!(n.student_id, 44);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        for bad in [json!("abc"), json!(true), json!([1]), json!("NaN"), json!("inf")] {
            let e = normalize(&record(json!({ "ca2": bad }))).expect_err("non numeric");
            assert_eq!(e.to_string(), "ca2 must be numeric");
        }
    }

    #[test]
    fn identifiers_and_keys_are_required() {
        let mut r = record(json!({}));
        r.as_object_mut().expect("object").remove("classId");
        let e = normalize(&r).expect_err("missing class");
        assert_eq!(e.to_string(), "classId is required");

        let e = normalize(&record(json!({ "studentId": -4 }))).expect_err("negative id");
        assert_eq!(field_of(&e), "studentId");

        let e = normalize(&record(json!({ "term": "FOURTH" }))).expect_err("bad term");
        assert_eq!(field_of(&e), "term");

        let e = normalize(&record(json!({ "academicYear": "24/25" }))).expect_err("bad year");
        assert_eq!(field_of(&e), "academicYear");

        assert!(normalize(&json!([1, 2])).is_err());
    }

    #[test]
    fn remark_is_trimmed_and_blank_dropped() {
        let n = normalize(&record(json!({ "remark": "  Good effort " }))).expect("normalize");
        assert_eq!(n.remark.as_deref(), Some("Good effort"));
        let n = normalize(&record(json!({ "remark": "   " }))).expect("normalize");
        assert_eq!(n.remark, None);
    }
}
