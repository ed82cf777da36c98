use crate::calc;
use crate::ipc::error::{calc_err, err, ok};
use crate::ipc::helpers::{required_array, required_id, required_object, scale_param, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::legacy;
use serde_json::json;

fn handle_normalize(_state: &mut AppState, req: &Request) -> HandlerResult {
    let raw = required_object(req, "record")?;
    let input = legacy::normalize_record(raw).map_err(|e| calc_err(&req.id, &e))?;
    Ok(ok(&req.id, json!({ "input": input })))
}

fn handle_compute(state: &mut AppState, req: &Request) -> HandlerResult {
    let scale = scale_param(state, req)?;
    let raw = required_object(req, "record")?;
    let input = legacy::normalize_record(raw).map_err(|e| calc_err(&req.id, &e))?;
    Ok(ok(
        &req.id,
        json!({ "result": calc::compute_result(input, scale) }),
    ))
}

fn handle_upsert(state: &mut AppState, req: &Request) -> HandlerResult {
    let raw = required_object(req, "record")?;
    let input = legacy::normalize_record(raw).map_err(|e| calc_err(&req.id, &e))?;
    let key = input.key();
    let report = state.book.upsert(input);
    tracing::debug!(
        student = key.student_id,
        subject = key.subject_id,
        outcome = ?report.outcome,
        "score upserted"
    );
    Ok(ok(&req.id, json!(report)))
}

fn handle_bulk_upsert(state: &mut AppState, req: &Request) -> HandlerResult {
    let records = required_array(req, "records")?;
    let limit = state.config.limits.max_batch_entries;
    let outcome = state
        .book
        .upsert_batch(records, limit)
        .map_err(|e| calc_err(&req.id, &e))?;
    tracing::info!(
        created = outcome.created,
        updated = outcome.updated,
        cohorts = outcome.affected_cohorts.len(),
        "bulk upsert applied"
    );
    Ok(ok(&req.id, json!(outcome)))
}

fn handle_roster_set(state: &mut AppState, req: &Request) -> HandlerResult {
    let class_id = required_id(req, "classId")?;
    let raw = required_array(req, "studentIds")?;
    let mut student_ids = Vec::with_capacity(raw.len());
    for (i, v) in raw.iter().enumerate() {
        let id = calc::parse_id("studentId", Some(v)).map_err(|e| {
            err(
                &req.id,
                "bad_params",
                format!("studentIds[{}]: {}", i, e),
                Some(json!({ "index": i })),
            )
        })?;
        student_ids.push(id);
    }
    let size = state.book.set_roster(class_id, student_ids);
    Ok(ok(&req.id, json!({ "classId": class_id, "rosterSize": size })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "scores.normalize" => handle_normalize(state, req),
        "scores.compute" => handle_compute(state, req),
        "scores.upsert" => handle_upsert(state, req),
        "scores.bulkUpsert" => handle_bulk_upsert(state, req),
        "roster.set" => handle_roster_set(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
