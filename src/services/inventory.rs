use crate::{
    db::DbPool,
    entities::{
        product::Entity as Product,
        purchase::{Column as PurchaseColumn, Entity as Purchase},
        sale::{Column as SaleColumn, Entity as Sale},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Which side of the ledger an entry sits on. Ordering matters: entries on
/// the same date list purchases before sales.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryKind {
    Purchase,
    Sale,
}

/// A single event in a product's reconstructed inventory ledger. Derived on
/// demand, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub quantity: i32,
    #[serde(rename = "type")]
    pub kind: LedgerEntryKind,
    pub date: DateTime<Utc>,
    /// The product's unit price at read time, not at event time
    pub unit: Decimal,
}

/// Sorts ledger entries chronologically. Same-date entries order purchases
/// before sales, then by id, so the sequence is fully deterministic.
pub(crate) fn chronological(mut entries: Vec<LedgerEntry>) -> Vec<LedgerEntry> {
    entries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.id.cmp(&b.id))
    });
    entries
}

/// Service reconstructing per-product inventory ledgers
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Merge a product's purchases and sales into one chronologically
    /// ordered event stream. A product with no history (including an
    /// unknown product id) yields an empty ledger rather than an error.
    /// Read-only and idempotent.
    #[instrument(skip(self))]
    pub async fn ledger(&self, product_id: Uuid) -> Result<Vec<LedgerEntry>, ServiceError> {
        let db = &*self.db_pool;

        let Some(product) = Product::find_by_id(product_id).one(db).await? else {
            return Ok(Vec::new());
        };
        let unit = product.price;

        let purchases = Purchase::find()
            .filter(PurchaseColumn::ProductId.eq(product_id))
            .order_by_asc(PurchaseColumn::PurchaseDate)
            .all(db)
            .await?;

        let sales = Sale::find()
            .filter(SaleColumn::ProductId.eq(product_id))
            .order_by_asc(SaleColumn::SalesDate)
            .all(db)
            .await?;

        let entries = purchases
            .into_iter()
            .map(|p| LedgerEntry {
                id: p.id,
                quantity: p.quantity,
                kind: LedgerEntryKind::Purchase,
                date: p.purchase_date,
                unit,
            })
            .chain(sales.into_iter().map(|s| LedgerEntry {
                id: s.id,
                quantity: s.quantity,
                kind: LedgerEntryKind::Sale,
                date: s.sales_date,
                unit,
            }))
            .collect();

        Ok(chronological(entries))
    }
}
