use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{InvoiceResponse, ListParams, ListResponse};
use crate::models::{CreateInvoice, UpdateInvoice};
use crate::startup::AppState;

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.invoices.list(&params.into()).await?;
    Ok(Json(ListResponse::<InvoiceResponse>::from(page)))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoice>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state.invoices.create(payload).await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(invoice))))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state.invoices.get(&id).await?;
    Ok(Json(InvoiceResponse::from(invoice)))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateInvoice>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state.invoices.update(&id, payload).await?;
    Ok(Json(InvoiceResponse::from(invoice)))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.invoices.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reconcile_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state.invoices.reconcile(&id).await?;
    Ok(Json(InvoiceResponse::from(invoice)))
}
