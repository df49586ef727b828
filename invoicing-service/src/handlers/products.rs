use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{ListParams, ListResponse, ProductResponse};
use crate::models::{CreateProduct, UpdateProduct};
use crate::startup::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.products.list(&params.into()).await?;
    Ok(Json(ListResponse::<ProductResponse>::from(page)))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.products.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.products.get(&id).await?;
    Ok(Json(ProductResponse::from(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProduct>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.products.update(&id, payload).await?;
    Ok(Json(ProductResponse::from(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.products.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
