//! Stock opname: mass stock reset ahead of a physical recount.
//!
//! Zeroes the stock of every catalog product in one transaction and
//! leaves an opname log plus an activity entry behind.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use dagang_core::types::{ActivityLog, StockOpnameLog};
use dagang_store::{names, Batch, Store};

use crate::error::ImportResult;

/// Resets every product's stock to zero.
///
/// Products are rewritten wholesale rather than patched so a product
/// edited mid-recount still ends at zero. Returns the log entry.
pub async fn zero_all_stock(store: &Store) -> ImportResult<StockOpnameLog> {
    let mut products = store.products().list().await?;
    let now = Utc::now();

    let mut batch = Batch::new();
    for product in &mut products {
        product.stock = 0;
        batch.put(names::PRODUCTS, &product.id, product)?;
    }

    let log = StockOpnameLog {
        id: Uuid::new_v4().to_string(),
        products_affected: products.len(),
        date: now,
    };
    batch.put(names::STOCK_OPNAME_LOGS, &log.id, &log)?;

    let activity = ActivityLog {
        id: Uuid::new_v4().to_string(),
        action: "stock_opname".to_string(),
        detail: format!("Stock zeroed for {} products", products.len()),
        date: now,
    };
    batch.put(names::ACTIVITY_LOGS, &activity.id, &activity)?;

    store.commit_batch(batch).await?;

    info!(products = products.len(), "Stock opname completed");
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagang_core::money::Money;
    use dagang_core::types::Product;
    use dagang_store::StoreConfig;

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            cost_price: Money::from_units(1000),
            selling_price: Money::from_units(1500),
            stock,
            category: "Test".to_string(),
            subcategory: None,
        }
    }

    #[tokio::test]
    async fn test_zero_all_stock() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        for p in [product("p-1", 12), product("p-2", -3), product("p-3", 0)] {
            store.products().put(&p.id, &p).await.unwrap();
        }

        let log = zero_all_stock(&store).await.unwrap();
        assert_eq!(log.products_affected, 3);

        for p in store.products().list().await.unwrap() {
            assert_eq!(p.stock, 0);
        }
        assert_eq!(store.stock_opname_logs().count().await.unwrap(), 1);
        assert_eq!(store.activity_logs().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_a_noop_log() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let log = zero_all_stock(&store).await.unwrap();
        assert_eq!(log.products_affected, 0);
    }
}
