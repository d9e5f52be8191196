use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for sale endpoints
pub fn sales_routes() -> Router<AppState> {
    Router::new().route("/", get(list_sales).post(create_sale))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleRequest {
    /// Product the stock leaves from
    pub product: Uuid,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
    pub sales_date: DateTime<Utc>,
}

/// Record a sale; rejected with 422 when it would overdraw inventory
async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let sale = state
        .services
        .sales
        .create_sale(payload.product, payload.quantity, payload.sales_date)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(sale))
}

/// List all sales
async fn list_sales(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let sales = state
        .services
        .sales
        .list_sales()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(sales))
}
