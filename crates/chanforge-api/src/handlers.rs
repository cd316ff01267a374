use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chanforge_domain::{Assignable, ChannelMetadata, ChannelStatus};
use chanforge_reconciler::{reconcile_failed, ReconcileReport};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn ready(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.repository.list_failed(1).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// The core `MetadataRepository` contract has no list-all operation (only
/// `findByContentId`/`upsert`/`listFailed`), so this surfaces the same
/// bounded `failed`-status scan the reconciliation loop uses.
pub async fn list_channels(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let records = state.repository.list_failed(q.limit.unwrap_or(20)).await?;
    Ok(Json(json!(records)))
}

pub async fn get_channel(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> Result<Json<ChannelMetadata>, ApiError> {
    let record = state
        .repository
        .find_by_content_id(&content_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("channel '{content_id}' not found")))?;
    Ok(Json(record))
}

pub async fn retire_channel(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> Result<Json<ChannelMetadata>, ApiError> {
    let mut record = state
        .repository
        .find_by_content_id(&content_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("channel '{content_id}' not found")))?;

    if record.status != ChannelStatus::Ready {
        return Err(ApiError::bad_request(format!(
            "channel '{content_id}' is {:?}, only ready channels can be retired",
            record.status
        )));
    }

    record.status = ChannelStatus::Retired;
    record.last_provisioned_at = Utc::now();
    state.repository.upsert(&record).await?;
    Ok(Json(record))
}

pub async fn rotate_key(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> Result<Json<ChannelMetadata>, ApiError> {
    let mut record = state
        .repository
        .find_by_content_id(&content_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("channel '{content_id}' not found")))?;

    let channel_id = match &record.channel_id {
        Assignable::Assigned(id) => id.clone(),
        Assignable::Pending => {
            return Err(ApiError::bad_request(format!(
                "channel '{content_id}' has no assigned channelId yet"
            )))
        }
    };

    state.engine.rotate_ingest_key(&channel_id).await?;
    record.last_provisioned_at = Utc::now();
    state.repository.upsert(&record).await?;
    Ok(Json(record))
}

/// `DELETE /channels/:contentId` — calls the engine's deleteChannel then
/// marks the record `retired`. The repository contract has no delete
/// primitive (spec.md's `MetadataRepository` stays `findByContentId` /
/// `upsert` / `listFailed` only), so "purge" approximates removal with the
/// state machine's other terminal status.
pub async fn purge_channel(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> Result<Json<ChannelMetadata>, ApiError> {
    let mut record = state
        .repository
        .find_by_content_id(&content_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("channel '{content_id}' not found")))?;

    if let Assignable::Assigned(channel_id) = &record.channel_id {
        state.engine.delete_channel(channel_id).await?;
    }

    record.status = ChannelStatus::Retired;
    record.last_provisioned_at = Utc::now();
    state.repository.upsert(&record).await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct ReconcileQuery {
    pub limit: Option<u32>,
}

pub async fn post_reconcile(
    State(state): State<AppState>,
    Query(q): Query<ReconcileQuery>,
) -> Result<Json<ReconcileReport>, ApiError> {
    let report = reconcile_failed(
        state.repository.as_ref(),
        &state.provisioner,
        state.alerter.as_ref(),
        &state.config,
        q.limit,
    )
    .await?;
    Ok(Json(report))
}
