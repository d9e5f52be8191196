use crate::handlers::common::{map_service_error, success_response};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

/// Creates the router for the inventory ledger endpoint
pub fn inventory_routes() -> Router<AppState> {
    Router::new().route("/", get(get_ledger))
}

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    pub id: Option<Uuid>,
}

/// Reconstruct the chronological ledger for a product. The `id` query
/// parameter is required; there is no default product.
async fn get_ledger(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let product_id = query.id.ok_or(ApiError::MissingParameter("id".into()))?;

    let entries = state
        .services
        .inventory
        .ledger(product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(entries))
}
