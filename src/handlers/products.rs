use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

fn ensure_price_non_negative(value: &Decimal) -> Result<(), ApiError> {
    if *value < Decimal::ZERO {
        Err(ApiError::ValidationError(
            "price cannot be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "name must be between 1 and 255 characters"
    ))]
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "name must be between 1 and 255 characters"
    ))]
    pub name: String,
    pub price: Decimal,
}

/// Create a new product
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::ValidationError(
            "name cannot be blank".to_string(),
        ));
    }
    ensure_price_non_negative(&payload.price)?;

    let product = state
        .services
        .products
        .create_product(name, payload.price)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(product))
}

/// List all products
async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .list_products()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Get a single product by id
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product(id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Product with ID {id} not found")))?;

    Ok(success_response(product))
}

/// Full update of a product
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::ValidationError(
            "name cannot be blank".to_string(),
        ));
    }
    ensure_price_non_negative(&payload.price)?;

    let product = state
        .services
        .products
        .update_product(id, name, payload.price)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

/// Delete a product
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({ "deleted": id })))
}
