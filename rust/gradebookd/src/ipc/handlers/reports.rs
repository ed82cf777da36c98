use crate::calc;
use crate::ipc::error::{calc_err, err, ok};
use crate::ipc::helpers::{
    required_array, required_id, required_term, required_year, scale_param, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::ScoreResult;
use serde_json::json;

/// Assemble from caller-supplied results. Positions and averages are taken
/// as given.
fn handle_assemble(_state: &mut AppState, req: &Request) -> HandlerResult {
    let student_id = required_id(req, "studentId")?;
    let academic_year = required_year(req)?;
    let term = required_term(req)?;
    let raw = required_array(req, "results")?;
    let results: Vec<ScoreResult> = raw
        .iter()
        .enumerate()
        .map(|(i, v)| {
            serde_json::from_value::<ScoreResult>(v.clone()).map_err(|e| {
                err(
                    &req.id,
                    "bad_params",
                    format!("results[{}]: {}", i, e),
                    Some(json!({ "index": i })),
                )
            })
        })
        .collect::<Result<_, _>>()?;
    let card = calc::assemble_report_card(student_id, academic_year, term, &results)
        .map_err(|e| calc_err(&req.id, &e))?;
    Ok(ok(&req.id, json!(card)))
}

fn handle_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let scale = scale_param(state, req)?;
    let student_id = required_id(req, "studentId")?;
    let academic_year = required_year(req)?;
    let term = required_term(req)?;
    let card = state
        .book
        .report_card(student_id, academic_year, term, scale)
        .map_err(|e| calc_err(&req.id, &e))?;
    Ok(ok(&req.id, json!(card)))
}

fn handle_class(state: &mut AppState, req: &Request) -> HandlerResult {
    let scale = scale_param(state, req)?;
    let class_id = required_id(req, "classId")?;
    let academic_year = required_year(req)?;
    let term = required_term(req)?;
    let cards = state
        .book
        .class_report_cards(class_id, academic_year, term, scale)
        .map_err(|e| calc_err(&req.id, &e))?;
    Ok(ok(
        &req.id,
        json!({
            "classId": class_id,
            "academicYear": academic_year,
            "term": term,
            "reportCards": cards,
        }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "reportCard.assemble" => handle_assemble(state, req),
        "reportCard.get" => handle_get(state, req),
        "reportCard.class" => handle_class(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
