use std::sync::Arc;
use std::time::Duration;

use ::common::storage::{AssetKind, AssetRef, AssetStore, FilesystemAssetStore, StorageError};
use async_trait::async_trait;
use inventory_core::models::{HistoryWindow, NewProduct, StockWarning};
use inventory_core::{Direction, InventoryError, TransactionKind};

use crate::common::TestApp;

mod adjust_quantity {
    use super::*;

    #[tokio::test]
    async fn direction_sets_sign() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 0, 0).await;

        let added = app
            .service
            .adjust_quantity(product.id, 5, Direction::In)
            .await
            .unwrap();
        assert_eq!(added.entry.change_amount, 5);
        assert_eq!(added.entry.kind, TransactionKind::Add);

        let removed = app
            .service
            .adjust_quantity(product.id, 2, Direction::Out)
            .await
            .unwrap();
        assert_eq!(removed.entry.change_amount, -2);
        assert_eq!(removed.entry.kind, TransactionKind::Remove);
        assert_eq!(removed.product.quantity, 3);
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 3, 0).await;

        for amount in [0, -1] {
            let err = app
                .service
                .adjust_quantity(product.id, amount, Direction::Out)
                .await
                .unwrap_err();
            assert!(matches!(err, InventoryError::Validation(_)));
        }
        assert_eq!(app.service.get_product(product.id).await.unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn over_removal_is_permitted_and_flagged() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 1, 0).await;

        let snapshot = app
            .service
            .adjust_quantity(product.id, 4, Direction::Out)
            .await
            .unwrap();

        assert_eq!(snapshot.product.quantity, -3);
        assert_eq!(snapshot.warning, Some(StockWarning::NegativeQuantity));
        app.assert_ledger_matches(product.id).await;
    }

    #[tokio::test]
    async fn ledger_matches_quantity_after_mixed_activity() {
        let app = TestApp::spawn().await;
        let a = app.create("A", 10, 0).await;
        let b = app.create("B", 0, 0).await;

        let moves = [
            (a.id, 3, Direction::Out),
            (b.id, 7, Direction::In),
            (a.id, 12, Direction::In),
            (b.id, 9, Direction::Out),
            (a.id, 1, Direction::Out),
        ];
        for (id, amount, direction) in moves {
            app.service.adjust_quantity(id, amount, direction).await.unwrap();
            app.assert_ledger_matches(a.id).await;
            app.assert_ledger_matches(b.id).await;
        }

        assert_eq!(app.service.get_product(a.id).await.unwrap().quantity, 18);
        assert_eq!(app.service.get_product(b.id).await.unwrap().quantity, -2);
        assert!(app.service.reconcile(false).await.unwrap().is_consistent());
    }
}

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn hundred_concurrent_additions_are_all_counted() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 7, 0).await;

        let mut handles = Vec::new();
        for _ in 0..100 {
            let service = app.service.clone();
            handles.push(tokio::spawn(async move {
                service.adjust_quantity(product.id, 1, Direction::In).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(app.service.get_product(product.id).await.unwrap().quantity, 107);
        app.assert_ledger_matches(product.id).await;
        let history = app
            .service
            .get_history(product.id, HistoryWindow::default())
            .await
            .unwrap();
        assert_eq!(history.len(), 101);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn interleaved_products_stay_independent() {
        let app = TestApp::spawn().await;
        let a = app.create("A", 50, 0).await;
        let b = app.create("B", 0, 0).await;

        let mut handles = Vec::new();
        for i in 0..40 {
            let service = app.service.clone();
            let (id, direction) = if i % 2 == 0 {
                (a.id, Direction::Out)
            } else {
                (b.id, Direction::In)
            };
            handles.push(tokio::spawn(async move {
                service.adjust_quantity(id, 2, direction).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(app.service.get_product(a.id).await.unwrap().quantity, 10);
        assert_eq!(app.service.get_product(b.id).await.unwrap().quantity, 40);
        app.assert_ledger_matches(a.id).await;
        app.assert_ledger_matches(b.id).await;
    }
}

mod history {
    use super::*;

    #[tokio::test]
    async fn newest_first_with_limit() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 1, 0).await;
        for amount in 2..=4 {
            app.service
                .adjust_quantity(product.id, amount, Direction::In)
                .await
                .unwrap();
        }

        let latest = app
            .service
            .get_history(product.id, HistoryWindow::latest(2))
            .await
            .unwrap();
        let amounts: Vec<_> = latest.iter().map(|e| e.change_amount).collect();
        assert_eq!(amounts, [4, 3]);
    }
}

/// Asset store whose writes take far longer than any sane timeout.
struct SlowStore(FilesystemAssetStore);

#[async_trait]
impl AssetStore for SlowStore {
    async fn put(&self, asset: &AssetRef, data: &[u8]) -> Result<(), StorageError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        self.0.put(asset, data).await
    }

    async fn get(&self, asset: &AssetRef) -> Result<Vec<u8>, StorageError> {
        self.0.get(asset).await
    }

    async fn exists(&self, asset: &AssetRef) -> Result<bool, StorageError> {
        self.0.exists(asset).await
    }

    async fn delete(&self, asset: &AssetRef) -> Result<bool, StorageError> {
        self.0.delete(asset).await
    }

    async fn list(&self, kind: AssetKind) -> Result<Vec<AssetRef>, StorageError> {
        self.0.list(kind).await
    }
}

mod timeouts {
    use super::*;

    #[tokio::test]
    async fn slow_storage_surfaces_as_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemAssetStore::new(dir.path().join("static"), 1024 * 1024)
            .await
            .unwrap();
        let (service, _db_dir) = TestApp::spawn_with_store(Arc::new(SlowStore(store))).await;
        let service = service.with_timeout(Duration::from_millis(50));

        let err = service
            .create_product(NewProduct::new("Widget", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::StorageUnavailable(_)));
        assert!(service.search_products("").await.unwrap().is_empty());
    }
}
