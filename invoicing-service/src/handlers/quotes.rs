use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{QuoteResponse, ListParams, ListResponse};
use crate::models::{CreateQuote, UpdateQuote};
use crate::startup::AppState;

pub async fn list_quotes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.quotes.list(&params.into()).await?;
    Ok(Json(ListResponse::<QuoteResponse>::from(page)))
}

pub async fn create_quote(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuote>,
) -> Result<impl IntoResponse, AppError> {
    let quote = state.quotes.create(payload).await?;
    Ok((StatusCode::CREATED, Json(QuoteResponse::from(quote))))
}

pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quote = state.quotes.get(&id).await?;
    Ok(Json(QuoteResponse::from(quote)))
}

pub async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuote>,
) -> Result<impl IntoResponse, AppError> {
    let quote = state.quotes.update(&id, payload).await?;
    Ok(Json(QuoteResponse::from(quote)))
}

pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.quotes.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
