use crate::calc::{self, CalcError, GradeScale};
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::model::{AcademicYear, CohortKey, Term};
use serde_json::{json, Value};

/// Handlers build either a full ok envelope or a full error envelope.
pub type HandlerResult = Result<Value, Value>;

pub fn bad_params(req: &Request, e: &CalcError) -> Value {
    err(&req.id, "bad_params", e.to_string(), Some(e.details()))
}

pub fn required_id(req: &Request, key: &str) -> Result<i64, Value> {
    calc::parse_id(key, req.params.get(key)).map_err(|e| bad_params(req, &e))
}

pub fn required_year(req: &Request) -> Result<AcademicYear, Value> {
    calc::parse_academic_year(req.params.get("academicYear")).map_err(|e| bad_params(req, &e))
}

pub fn required_term(req: &Request) -> Result<Term, Value> {
    calc::parse_term(req.params.get("term")).map_err(|e| bad_params(req, &e))
}

pub fn cohort_key(req: &Request) -> Result<CohortKey, Value> {
    Ok(CohortKey {
        subject_id: required_id(req, "subjectId")?,
        class_id: required_id(req, "classId")?,
        academic_year: required_year(req)?,
        term: required_term(req)?,
    })
}

/// `params.scale` when given, otherwise the configured default.
pub fn scale_param(state: &AppState, req: &Request) -> Result<GradeScale, Value> {
    match req.params.get("scale") {
        None | Some(Value::Null) => Ok(state.config.grading.default_scale),
        Some(Value::String(s)) => s.parse::<GradeScale>().map_err(|msg| {
            err(&req.id, "bad_params", msg, Some(json!({ "scale": s })))
        }),
        Some(other) => Err(err(
            &req.id,
            "bad_params",
            "scale must be a string",
            Some(json!({ "scale": other })),
        )),
    }
}

pub fn required_object<'a>(req: &'a Request, key: &str) -> Result<&'a Value, Value> {
    req.params
        .get(key)
        .filter(|v| v.is_object())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {} object", key), None))
}

pub fn required_array<'a>(req: &'a Request, key: &str) -> Result<&'a Vec<Value>, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {} array", key), None))
}
