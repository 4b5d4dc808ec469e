use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{AppState, RequestContext};
use crate::errors::AppError;
use crate::models::{
    DistanceFeedRequest, HistoryParams, Job, JobCreateRequest, JobEmailRequest, JobIdRequest,
    JobListParams, JobPage, JobRefRequest, JobUpdateRequest, JobWithTranslator,
};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<JobListParams>,
) -> Result<Json<JobPage>, AppError> {
    let page = state.booking.list(ctx.caller, &params).await?;
    Ok(Json(page))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobWithTranslator>, AppError> {
    let job = state.booking.get(id).await?;
    Ok(Json(job))
}

pub async fn create_job(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<JobCreateRequest>,
) -> Result<Json<Job>, AppError> {
    let job = state.booking.create(ctx.caller, &payload).await?;
    Ok(Json(job))
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<JobUpdateRequest>,
) -> Result<Json<Job>, AppError> {
    let job = state.booking.update(id, &payload, ctx.caller).await?;
    Ok(Json(job))
}

pub async fn immediate_job_email(
    State(state): State<AppState>,
    Json(payload): Json<JobEmailRequest>,
) -> Result<Json<Value>, AppError> {
    state.booking.store_job_email(&payload).await?;
    Ok(Json(json!({ "message": "Email notice sent" })))
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<JobPage>, AppError> {
    let page = state.booking.get_history(&params).await?;
    Ok(Json(page))
}

pub async fn accept_job(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<JobIdRequest>,
) -> Result<Json<Job>, AppError> {
    let job = state.booking.accept_job(payload.job_id, ctx.caller).await?;
    Ok(Json(job))
}

/// Legacy route with a divergent payload shape; adapts onto the same accept
/// operation.
pub async fn accept_job_with_id(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<JobIdRequest>,
) -> Result<Json<Job>, AppError> {
    let job = state.booking.accept_job(payload.job_id, ctx.caller).await?;
    Ok(Json(job))
}

pub async fn cancel_job(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<JobIdRequest>,
) -> Result<Json<Value>, AppError> {
    state.booking.cancel_job(payload.job_id, ctx.caller).await?;
    Ok(Json(json!({ "message": "Job cancelled" })))
}

pub async fn start_job(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<JobIdRequest>,
) -> Result<Json<Value>, AppError> {
    state.booking.start_job(payload.job_id, ctx.caller).await?;
    Ok(Json(json!({ "message": "Job started" })))
}

pub async fn end_job(
    State(state): State<AppState>,
    Json(payload): Json<JobIdRequest>,
) -> Result<Json<Value>, AppError> {
    state.booking.end_job(payload.job_id).await?;
    Ok(Json(json!({ "message": "Job ended" })))
}

pub async fn customer_not_call(
    State(state): State<AppState>,
    Json(payload): Json<JobIdRequest>,
) -> Result<Json<Value>, AppError> {
    state.booking.customer_not_call(payload.job_id).await?;
    Ok(Json(json!({ "message": "No-show recorded" })))
}

pub async fn get_potential_jobs(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = state.booking.get_potential_jobs(ctx.caller).await?;
    Ok(Json(jobs))
}

pub async fn distance_feed(
    State(state): State<AppState>,
    Json(payload): Json<DistanceFeedRequest>,
) -> Result<Json<Value>, AppError> {
    state.booking.patch_distance_and_status(&payload).await?;
    Ok(Json(json!({ "message": "Record updated!" })))
}

pub async fn reopen_job(
    State(state): State<AppState>,
    Json(payload): Json<JobIdRequest>,
) -> Result<Json<Job>, AppError> {
    let job = state.booking.reopen(payload.job_id).await?;
    Ok(Json(job))
}

pub async fn resend_notifications(
    State(state): State<AppState>,
    Json(payload): Json<JobRefRequest>,
) -> Result<Json<Value>, AppError> {
    state.booking.resend_notifications(payload.jobid).await?;
    Ok(Json(json!({ "success": "Push sent" })))
}

pub async fn resend_sms_notifications(
    State(state): State<AppState>,
    Json(payload): Json<JobRefRequest>,
) -> Result<Json<Value>, AppError> {
    state.booking.resend_sms_notifications(payload.jobid).await?;
    Ok(Json(json!({ "success": "SMS sent" })))
}
