use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{ActivityResponse, ChartParams, ChartsResponse, DashboardResponse};
use crate::startup::AppState;

pub async fn dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = state.dashboard.stats().await?;
    Ok(Json(DashboardResponse::from(stats)))
}

pub async fn dashboard_activity(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let feed = state.dashboard.activity().await?;
    Ok(Json(ActivityResponse::from(feed)))
}

pub async fn dashboard_charts(
    State(state): State<AppState>,
    Query(params): Query<ChartParams>,
) -> Result<impl IntoResponse, AppError> {
    let charts = state.dashboard.charts(params.period()).await?;
    Ok(Json(ChartsResponse::from(charts)))
}
