use crate::{
    db::DbPool,
    entities::{
        product::Entity as Product,
        purchase::{Column as PurchaseColumn, Entity as Purchase},
        sale::{self, Column as SaleColumn, Entity as Sale},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Returns true when a sale of `requested` units is covered by stock on
/// hand. A product with no purchase history can never cover a positive
/// request.
pub(crate) fn stock_is_sufficient(total_purchased: i64, total_sold: i64, requested: i64) -> bool {
    total_purchased >= total_sold + requested
}

/// Service for recording sales. Every insert passes the stock-sufficiency
/// check first, and check-then-insert is serialized per product so two
/// concurrent sales cannot both clear a stale total.
#[derive(Clone)]
pub struct SaleService {
    db_pool: Arc<DbPool>,
    product_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SaleService {
    /// Creates a new sale service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            db_pool,
            product_locks: Arc::new(DashMap::new()),
        }
    }

    fn lock_for(&self, product_id: Uuid) -> Arc<Mutex<()>> {
        self.product_locks
            .entry(product_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Record a sale after verifying it will not overdraw inventory
    #[instrument(skip(self))]
    pub async fn create_sale(
        &self,
        product_id: Uuid,
        quantity: i32,
        sales_date: DateTime<Utc>,
    ) -> Result<sale::Model, ServiceError> {
        let db = &*self.db_pool;

        Product::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {product_id} not found"))
            })?;

        let lock = self.lock_for(product_id);
        let _guard = lock.lock().await;

        let total_purchased = quantity_total::<Purchase>(
            db,
            PurchaseColumn::ProductId,
            PurchaseColumn::Quantity,
            product_id,
        )
        .await?;
        let total_sold =
            quantity_total::<Sale>(db, SaleColumn::ProductId, SaleColumn::Quantity, product_id)
                .await?;

        if !stock_is_sufficient(total_purchased, total_sold, i64::from(quantity)) {
            warn!(
                %product_id,
                total_purchased, total_sold, requested = quantity,
                "sale rejected: insufficient stock"
            );
            return Err(ServiceError::InsufficientStock(
                "requested quantity exceeds available stock".to_string(),
            ));
        }

        let sale = sale::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            quantity: Set(quantity),
            sales_date: Set(sales_date),
            created_at: Set(Utc::now()),
        };

        let created = sale.insert(db).await?;
        info!(sale_id = %created.id, product_id = %product_id, quantity, "sale recorded");

        Ok(created)
    }

    /// List all sales, oldest first
    #[instrument(skip(self))]
    pub async fn list_sales(&self) -> Result<Vec<sale::Model>, ServiceError> {
        let db = &*self.db_pool;
        let sales = Sale::find()
            .order_by_asc(SaleColumn::SalesDate)
            .all(db)
            .await?;
        Ok(sales)
    }
}

/// Sum of a quantity column over the rows matching a product. SUM over an
/// empty set is NULL, which maps to 0 here.
async fn quantity_total<E: EntityTrait>(
    db: &DbPool,
    product_column: E::Column,
    quantity_column: E::Column,
    product_id: Uuid,
) -> Result<i64, ServiceError> {
    let total: Option<Option<i64>> = E::find()
        .select_only()
        .column_as(quantity_column.sum(), "total")
        .filter(product_column.eq(product_id))
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_stock_is_sufficient() {
        // 10 purchased, 3 sold, 7 requested: 10 >= 3 + 7
        assert!(stock_is_sufficient(10, 3, 7));
    }

    #[test]
    fn one_over_stock_is_rejected() {
        assert!(!stock_is_sufficient(10, 3, 8));
    }

    #[test]
    fn no_purchase_history_rejects_any_positive_request() {
        assert!(!stock_is_sufficient(0, 0, 1));
        assert!(!stock_is_sufficient(0, 0, 1000));
    }

    proptest! {
        /// Any sequence of sales admitted by the guard keeps cumulative
        /// sold at or below cumulative purchased.
        #[test]
        fn admitted_sales_never_overdraw(
            total_purchased in 0i64..10_000,
            requests in proptest::collection::vec(1i64..500, 0..50),
        ) {
            let mut total_sold = 0i64;
            for requested in requests {
                if stock_is_sufficient(total_purchased, total_sold, requested) {
                    total_sold += requested;
                }
                prop_assert!(total_sold <= total_purchased);
            }
        }
    }
}
