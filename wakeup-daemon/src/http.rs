//! JSON control surface over the registry.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use futures_util::stream::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use wakeup_core::{Resource, ResourceId, Settings};

use crate::error::ApiError;
use crate::registry::Registry;
use crate::status_log::StatusLog;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub status_log: StatusLog,
    pub log_tail_lines: usize,
    /// Open event streams end when this fires.
    pub shutdown: broadcast::Sender<()>,
}

#[derive(Debug, Deserialize)]
struct UrlBody {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsBody {
    ping_interval: i64,
}

/// `null` (or an absent key) clears the override.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntervalBody {
    #[serde(default)]
    ping_interval: Option<i64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/resources", get(list_resources).post(add_resource))
        .route(
            "/api/resources/{id}",
            put(update_resource_url).delete(delete_resource),
        )
        .route(
            "/api/resources/{id}/interval",
            post(set_resource_interval).delete(clear_resource_interval),
        )
        .route("/api/settings", get(get_settings).post(update_settings))
        .route("/api/logs", get(recent_logs))
        .route("/api/events", get(events))
        .with_state(state)
}

async fn list_resources(State(state): State<AppState>) -> Json<Vec<Resource>> {
    Json(state.registry.list_resources().await)
}

async fn add_resource(
    State(state): State<AppState>,
    body: Result<Json<UrlBody>, JsonRejection>,
) -> Result<Json<Resource>, ApiError> {
    let Json(body) = body?;
    Ok(Json(state.registry.add_resource(&body.url).await?))
}

async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.registry.delete_resource(&ResourceId::from(id)).await?;
    Ok(Json(json!({ "success": true })))
}

async fn update_resource_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UrlBody>, JsonRejection>,
) -> Result<Json<Resource>, ApiError> {
    let Json(body) = body?;
    let resource = state
        .registry
        .update_resource_url(&ResourceId::from(id), &body.url)
        .await?;
    Ok(Json(resource))
}

async fn set_resource_interval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<IntervalBody>, JsonRejection>,
) -> Result<Json<Resource>, ApiError> {
    let Json(body) = body?;
    let resource = state
        .registry
        .set_resource_interval(&ResourceId::from(id), body.ping_interval)
        .await?;
    Ok(Json(resource))
}

async fn clear_resource_interval(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Resource>, ApiError> {
    let resource = state
        .registry
        .set_resource_interval(&ResourceId::from(id), None)
        .await?;
    Ok(Json(resource))
}

async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.registry.get_settings().await)
}

async fn update_settings(
    State(state): State<AppState>,
    body: Result<Json<SettingsBody>, JsonRejection>,
) -> Result<Json<Settings>, ApiError> {
    let Json(body) = body?;
    Ok(Json(state.registry.update_settings(body.ping_interval).await?))
}

async fn recent_logs(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let log = state.status_log.clone();
    let lines = state.log_tail_lines;
    let logs = tokio::task::spawn_blocking(move || log.tail(lines))
        .await
        .map_err(|err| ApiError::Internal(format!("log reader join error: {err}")))?
        .map_err(|err| ApiError::Internal(format!("failed to read status log: {err}")))?;
    Ok(Json(json!({ "logs": logs })))
}

async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut shutdown_rx = state.shutdown.subscribe();
    let stream = BroadcastStream::new(state.registry.subscribe())
        .filter_map(|change| async move {
            // lagged receivers skip what they missed
            let change = change.ok()?;
            Event::default().event("status").json_data(&change).ok()
        })
        .map(Ok::<_, Infallible>)
        .take_until(async move {
            let _ = shutdown_rx.recv().await;
        });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
