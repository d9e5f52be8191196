use crate::{
    db::DbPool,
    entities::{
        product::Entity as Product,
        purchase::{self, Entity as Purchase, Column as PurchaseColumn},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Service for recording purchases. Purchases are append-only: once a stock
/// intake is on the books it stays there.
#[derive(Clone)]
pub struct PurchaseService {
    db_pool: Arc<DbPool>,
}

impl PurchaseService {
    /// Creates a new purchase service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Record a stock intake for a product
    #[instrument(skip(self))]
    pub async fn create_purchase(
        &self,
        product_id: Uuid,
        quantity: i32,
        purchase_date: DateTime<Utc>,
    ) -> Result<purchase::Model, ServiceError> {
        let db = &*self.db_pool;

        Product::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {product_id} not found"))
            })?;

        let purchase = purchase::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            quantity: Set(quantity),
            purchase_date: Set(purchase_date),
            created_at: Set(Utc::now()),
        };

        let created = purchase.insert(db).await?;
        info!(purchase_id = %created.id, product_id = %product_id, quantity, "purchase recorded");

        Ok(created)
    }

    /// List all purchases, oldest first
    #[instrument(skip(self))]
    pub async fn list_purchases(&self) -> Result<Vec<purchase::Model>, ServiceError> {
        let db = &*self.db_pool;
        let purchases = Purchase::find()
            .order_by_asc(PurchaseColumn::PurchaseDate)
            .all(db)
            .await?;
        Ok(purchases)
    }
}
