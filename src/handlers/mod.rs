pub mod common;
pub mod inventory;
pub mod products;
pub mod purchases;
pub mod sales;

use crate::db::DbPool;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<crate::services::products::ProductService>,
    pub purchases: Arc<crate::services::purchases::PurchaseService>,
    pub sales: Arc<crate::services::sales::SaleService>,
    pub inventory: Arc<crate::services::inventory::InventoryService>,
}

impl AppServices {
    /// Build the AppServices container over one shared connection pool
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            products: Arc::new(crate::services::products::ProductService::new(
                db_pool.clone(),
            )),
            purchases: Arc::new(crate::services::purchases::PurchaseService::new(
                db_pool.clone(),
            )),
            sales: Arc::new(crate::services::sales::SaleService::new(db_pool.clone())),
            inventory: Arc::new(crate::services::inventory::InventoryService::new(db_pool)),
        }
    }
}
