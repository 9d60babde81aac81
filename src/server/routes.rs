use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::server::server::AppState;
use crate::store::{LogFilter, LogSort, NotificationType, PageRequest};
use crate::utils::constants::DEFAULT_PAGE_SIZE;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub s: Option<String>,
    pub orderby: Option<String>,
    pub order: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub url: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub subject_type: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list_logs))
        .route("/logs", delete(delete_logs))
        .route("/logs/subjects/{subject_id}/latest", get(latest_for_subject))
        .route("/notify", post(notify))
}

async fn list_logs(State(state): State<AppState>, Query(query): Query<LogsQuery>) -> Response {
    let filter = LogFilter { search_term: query.s };
    let sort = LogSort::from_params(query.orderby.as_deref(), query.order.as_deref());
    let page_number = query.page.unwrap_or(1).max(1);
    let page = PageRequest::page(page_number, query.per_page.unwrap_or(DEFAULT_PAGE_SIZE));

    match state.app.store.query(&filter, sort, page) {
        Ok(result) => {
            let total_pages = result.total_count.div_ceil(page.size as u64);
            Json(json!({
                "items": result.items,
                "total_count": result.total_count,
                "page": page_number,
                "per_page": page.size,
                "total_pages": total_pages,
            }))
            .into_response()
        }
        Err(err) => storage_failure(err),
    }
}

async fn latest_for_subject(State(state): State<AppState>, Path(subject_id): Path<u64>) -> Response {
    match state.app.store.latest_for_subject(subject_id) {
        Ok(Some(entry)) => Json(entry).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({"error": "no log entry for subject"}))).into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn delete_logs(State(state): State<AppState>) -> Response {
    match state.app.store.delete_all() {
        Ok(deleted) => Json(json!({ "deleted": deleted })).into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn notify(State(state): State<AppState>, Json(request): Json<NotifyRequest>) -> Response {
    if let Some(kind) = &request.subject_type {
        if !state.app.config.indexing.is_target_subject_type(kind) {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"error": format!("subject type '{}' is not targeted", kind)})),
            )
                .into_response();
        }
    }

    match state.app.dispatcher.send(&request.url, request.notification_type).await {
        Ok(outcome) => Json(json!({
            "status": outcome.status,
            "metadata_url": outcome.metadata_url,
            "log_id": outcome.log_id,
        }))
        .into_response(),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"status": err.status_tag(), "error": err.to_string()})),
        )
            .into_response(),
    }
}

fn storage_failure(err: impl std::fmt::Display) -> Response {
    error!("log store request failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": err.to_string()}))).into_response()
}
