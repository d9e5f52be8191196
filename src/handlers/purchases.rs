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

/// Creates the router for purchase endpoints
pub fn purchases_routes() -> Router<AppState> {
    Router::new().route("/", get(list_purchases).post(create_purchase))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePurchaseRequest {
    /// Product the stock is received for
    pub product: Uuid,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
    pub purchase_date: DateTime<Utc>,
}

/// Record a stock intake
async fn create_purchase(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let purchase = state
        .services
        .purchases
        .create_purchase(payload.product, payload.quantity, payload.purchase_date)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(purchase))
}

/// List all purchases
async fn list_purchases(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let purchases = state
        .services
        .purchases
        .list_purchases()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(purchases))
}
