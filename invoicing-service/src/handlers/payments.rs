use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{ListResponse, PaymentListParams, PaymentOutcomeResponse, PaymentResponse};
use crate::models::{CreatePayment, UpdatePayment};
use crate::startup::AppState;

pub async fn list_payments(
    State(state): State<AppState>,
    Query(params): Query<PaymentListParams>,
) -> Result<impl IntoResponse, AppError> {
    let (query, invoice_id) = params.into_parts();
    let page = state.payments.list(&query, invoice_id.as_deref()).await?;
    Ok(Json(ListResponse::<PaymentResponse>::from(page)))
}

pub async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<CreatePayment>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.payments.create(payload).await?;
    Ok((StatusCode::CREATED, Json(PaymentOutcomeResponse::from(outcome))))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state.payments.get(&id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePayment>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.payments.update(&id, payload).await?;
    Ok(Json(PaymentOutcomeResponse::from(outcome)))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.payments.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
