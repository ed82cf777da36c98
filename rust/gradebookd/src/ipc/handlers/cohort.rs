use crate::calc::{self, CalcError};
use crate::ipc::error::{calc_err, ok};
use crate::ipc::helpers::{cohort_key, required_array, scale_param, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::legacy;
use crate::model::ScoreResult;
use serde_json::json;

fn ranked_view(results: &[ScoreResult]) -> serde_json::Value {
    json!({
        "results": results,
        "statistics": calc::cohort_statistics(results),
    })
}

/// Rank a cohort sent inline. Nothing is stored.
fn handle_rank(state: &mut AppState, req: &Request) -> HandlerResult {
    let scale = scale_param(state, req)?;
    let records = required_array(req, "records")?;
    let results = records
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            legacy::normalize_record(raw)
                .map(|input| calc::compute_result(input, scale))
                .map_err(|e| e.at_index(i))
        })
        .collect::<Result<Vec<_>, CalcError>>()
        .and_then(calc::rank_cohort)
        .map_err(|e| calc_err(&req.id, &e))?;
    Ok(ok(&req.id, ranked_view(&results)))
}

fn handle_results(state: &mut AppState, req: &Request) -> HandlerResult {
    let scale = scale_param(state, req)?;
    let key = cohort_key(req)?;
    let results = state
        .book
        .cohort_results(&key, scale)
        .map_err(|e| calc_err(&req.id, &e))?;
    let mut view = ranked_view(&results);
    view["cohort"] = json!(key);
    Ok(ok(&req.id, view))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "cohort.rank" => handle_rank(state, req),
        "cohort.results" => handle_results(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
