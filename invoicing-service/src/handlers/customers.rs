use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{CustomerResponse, ListParams, ListResponse};
use crate::models::{CreateCustomer, UpdateCustomer};
use crate::startup::AppState;

pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.customers.list(&params.into()).await?;
    Ok(Json(ListResponse::<CustomerResponse>::from(page)))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomer>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state.customers.create(payload).await?;
    Ok((StatusCode::CREATED, Json(CustomerResponse::from(customer))))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state.customers.get(&id).await?;
    Ok(Json(CustomerResponse::from(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCustomer>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state.customers.update(&id, payload).await?;
    Ok(Json(CustomerResponse::from(customer)))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.customers.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
