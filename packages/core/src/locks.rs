use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per product id.
///
/// Holders of the same product's guard run one at a time; different products
/// never contend.
#[derive(Clone, Default)]
pub struct ProductLocks(Arc<DashMap<i32, Arc<Mutex<()>>>>);

impl ProductLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a product.
    pub async fn acquire(&self, product_id: i32) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await.
        let lock = self
            .0
            .entry(product_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry of a deleted product.
    pub fn forget(&self, product_id: i32) {
        self.0.remove(&product_id);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_product_is_exclusive() {
        let locks = ProductLocks::new();
        let guard = locks.acquire(1).await;

        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1)).await;
        assert!(waiting.is_err());

        drop(guard);
        let _again = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn different_products_do_not_block() {
        let locks = ProductLocks::new();
        let _a = locks.acquire(1).await;
        let _b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(2))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn forget_removes_entry() {
        let locks = ProductLocks::new();
        drop(locks.acquire(9).await);
        locks.forget(9);
        assert!(locks.is_empty());
    }
}
