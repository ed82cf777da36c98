use crate::calc::GradeScale;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::HandlerResult;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn config_view(state: &AppState) -> serde_json::Value {
    json!({
        "defaultScale": state.config.grading.default_scale,
        "maxBatchEntries": state.config.limits.max_batch_entries,
    })
}

fn handle_health(state: &mut AppState, req: &Request) -> HandlerResult {
    Ok(ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "defaultScale": state.config.grading.default_scale,
            "entryCount": state.book.len(),
        }),
    ))
}

fn handle_config_get(state: &mut AppState, req: &Request) -> HandlerResult {
    Ok(ok(&req.id, config_view(state)))
}

// Only the default scale is adjustable at runtime; limits come from the
// config file.
fn handle_config_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let Some(raw) = req.params.get("defaultScale").and_then(|v| v.as_str()) else {
        return Err(err(&req.id, "bad_params", "missing defaultScale", None));
    };
    let scale = raw.parse::<GradeScale>().map_err(|msg| {
        err(
            &req.id,
            "bad_params",
            msg,
            Some(json!({ "defaultScale": raw })),
        )
    })?;
    state.config.grading.default_scale = scale;
    tracing::info!(scale = scale.as_str(), "default grade scale changed");
    Ok(ok(&req.id, config_view(state)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "health" => handle_health(state, req),
        "calc.config.get" => handle_config_get(state, req),
        "calc.config.update" => handle_config_update(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
