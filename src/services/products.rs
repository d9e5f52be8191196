use crate::{
    db::DbPool,
    entities::product::{self, Entity as Product, Column as ProductColumn},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Service for managing products
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    /// Creates a new product service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Create a new product
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        name: String,
        price: Decimal,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db_pool;

        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            price: Set(price),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = product.insert(db).await?;
        info!(product_id = %created.id, name = %name, "product created");

        Ok(created)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        let product = Product::find_by_id(id).one(db).await?;
        Ok(product)
    }

    /// List all products, most recently created first
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        let products = Product::find()
            .order_by_desc(ProductColumn::CreatedAt)
            .all(db)
            .await?;
        Ok(products)
    }

    /// Full update of a product
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: Uuid,
        name: String,
        price: Decimal,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db_pool;

        let product = Product::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with ID {id} not found")))?;

        let mut product: product::ActiveModel = product.into();
        product.name = Set(name);
        product.price = Set(price);
        product.updated_at = Set(Some(Utc::now()));

        let updated = product.update(db).await?;
        info!(product_id = %updated.id, "product updated");

        Ok(updated)
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let product = Product::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with ID {id} not found")))?;

        product.delete(db).await?;
        info!(product_id = %id, "product deleted");

        Ok(())
    }
}
