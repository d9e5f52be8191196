pub mod inventory;
pub mod products;
pub mod purchases;
pub mod sales;
