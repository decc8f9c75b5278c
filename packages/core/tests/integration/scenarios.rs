use ::common::storage::AssetKind;
use inventory_core::models::{HistoryWindow, NewProduct, PhotoUpload};
use inventory_core::{Direction, InventoryError};

use crate::common::TestApp;

mod low_stock_transition {
    use super::*;

    #[tokio::test]
    async fn removal_crosses_threshold() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 10, 5).await;

        let low = app.service.list_low_stock().await.unwrap();
        assert!(low.iter().all(|p| p.id != product.id));

        let snapshot = app
            .service
            .adjust_quantity(product.id, 6, Direction::Out)
            .await
            .unwrap();
        assert_eq!(snapshot.product.quantity, 4);
        assert!(snapshot.warning.is_none());

        let low = app.service.list_low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, product.id);
        assert_eq!(low[0].quantity, 4);
        app.assert_ledger_matches(product.id).await;
    }

    #[tokio::test]
    async fn restocking_clears_low_stock() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 2, 5).await;
        assert_eq!(app.service.list_low_stock().await.unwrap().len(), 1);

        app.service
            .adjust_quantity(product.id, 4, Direction::In)
            .await
            .unwrap();

        assert!(app.service.list_low_stock().await.unwrap().is_empty());
    }
}

mod create_then_delete {
    use super::*;

    #[tokio::test]
    async fn leaves_nothing_behind() {
        let app = TestApp::spawn().await;
        let product = app
            .service
            .create_product(
                NewProduct::new("Widget", 8)
                    .threshold(2)
                    .photo(PhotoUpload::new("widget.png", b"PNG".to_vec())),
            )
            .await
            .unwrap();
        app.service
            .adjust_quantity(product.id, 3, Direction::Out)
            .await
            .unwrap();
        assert!(app.barcode_stored(&product).await);
        assert_eq!(app.stored(AssetKind::Photo).await.len(), 1);

        app.service.delete_product(product.id).await.unwrap();

        assert!(matches!(
            app.service.get_product(product.id).await,
            Err(InventoryError::NotFound(_))
        ));
        assert!(matches!(
            app.service.find_by_code(&product.barcode).await,
            Err(InventoryError::NotFound(_))
        ));
        assert!(app.stored(AssetKind::Barcode).await.is_empty());
        assert!(app.stored(AssetKind::Photo).await.is_empty());
        let history = app
            .service
            .get_history(product.id, HistoryWindow::default())
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn other_products_are_untouched() {
        let app = TestApp::spawn().await;
        let doomed = app.create("Doomed", 1, 0).await;
        let kept = app.create("Kept", 4, 0).await;

        app.service.delete_product(doomed.id).await.unwrap();

        assert!(app.barcode_stored(&kept).await);
        assert_eq!(app.service.get_product(kept.id).await.unwrap().quantity, 4);
        let history = app
            .service
            .get_history(kept.id, HistoryWindow::default())
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn adjusting_deleted_product_fails() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 1, 0).await;
        app.service.delete_product(product.id).await.unwrap();

        let err = app
            .service
            .adjust_quantity(product.id, 1, Direction::In)
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
        assert_eq!(app.service.ledger_sum(product.id).await.unwrap(), 0);
    }
}
