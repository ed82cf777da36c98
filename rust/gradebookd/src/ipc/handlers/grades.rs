use crate::calc::{self, GradeScale};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{scale_param, HandlerResult};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};

fn handle_scales(state: &mut AppState, req: &Request) -> HandlerResult {
    let scales: Vec<Value> = GradeScale::ALL
        .iter()
        .map(|s| json!({ "name": s, "bands": s.bands() }))
        .collect();
    Ok(ok(
        &req.id,
        json!({
            "defaultScale": state.config.grading.default_scale,
            "scales": scales,
        }),
    ))
}

fn handle_classify(state: &mut AppState, req: &Request) -> HandlerResult {
    let scale = scale_param(state, req)?;
    let overall = match req.params.get("overallScore") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_f64().filter(|x| x.is_finite()) {
            Some(x) => Some(x),
            None => {
                return Err(err(
                    &req.id,
                    "bad_params",
                    "overallScore must be numeric or null",
                    Some(json!({ "overallScore": v })),
                ))
            }
        },
    };
    Ok(ok(
        &req.id,
        json!({
            "scale": scale,
            "overallScore": overall,
            "grade": calc::classify(scale, overall),
        }),
    ))
}

fn handle_ordinal(_state: &mut AppState, req: &Request) -> HandlerResult {
    let position = req
        .params
        .get("position")
        .and_then(|v| v.as_u64())
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| err(&req.id, "bad_params", "position must be a positive integer", None))?;
    Ok(ok(
        &req.id,
        json!({ "position": position, "text": calc::ordinal(position) }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "grades.scales" => handle_scales(state, req),
        "grades.classify" => handle_classify(state, req),
        "grades.ordinal" => handle_ordinal(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
