use ::common::storage::{AssetKind, AssetRef, AssetStore};
use inventory_core::models::{NewProduct, PhotoUpload, ProductUpdate};
use inventory_core::InventoryError;

use crate::common::TestApp;

mod create_product {
    use super::*;

    #[tokio::test]
    async fn opening_quantity_is_recorded_in_ledger() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 12, 3).await;

        let history = app
            .service
            .get_history(product.id, Default::default())
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].change_amount, 12);
        app.assert_ledger_matches(product.id).await;
        assert!(app.barcode_stored(&product).await);
    }

    #[tokio::test]
    async fn category_must_exist() {
        let app = TestApp::spawn().await;
        let err = app
            .service
            .create_product(NewProduct::new("Widget", 1).category(12345))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
        assert!(app.stored(AssetKind::Barcode).await.is_empty());

        let tools = app.service.create_category("Tools").await.unwrap();
        let product = app
            .service
            .create_product(NewProduct::new("Widget", 1).category(tools.id))
            .await
            .unwrap();
        assert_eq!(product.category_id, Some(tools.id));
        let listed = app.service.list_products(Some(tools.id)).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn oversized_photo_rejected_without_side_effects() {
        let app = TestApp::spawn_with(|config| config.storage.max_asset_size = 8192).await;

        let err = app
            .service
            .create_product(
                NewProduct::new("Widget", 1).photo(PhotoUpload::new("huge.jpg", vec![7u8; 16_384])),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, InventoryError::Validation(_)));
        assert!(app.service.search_products("").await.unwrap().is_empty());
        assert!(app.stored(AssetKind::Barcode).await.is_empty());
        assert!(app.stored(AssetKind::Photo).await.is_empty());
    }
}

mod edit_product {
    use super::*;

    #[tokio::test]
    async fn photo_replacement_removes_old_photo() {
        let app = TestApp::spawn().await;
        let product = app
            .service
            .create_product(
                NewProduct::new("Widget", 1).photo(PhotoUpload::new("front.jpg", b"front".to_vec())),
            )
            .await
            .unwrap();

        let updated = app
            .service
            .edit_product(
                product.id,
                ProductUpdate::default(),
                Some(PhotoUpload::new("back.jpg", b"back".to_vec())),
            )
            .await
            .unwrap();

        let photos = app.stored(AssetKind::Photo).await;
        assert_eq!(photos.len(), 1);
        assert_eq!(Some(photos[0].name()), updated.image_path.as_deref());
        assert_eq!(app.assets.get(&photos[0]).await.unwrap(), b"back");
        assert_eq!(updated.barcode, product.barcode);
    }

    #[tokio::test]
    async fn same_filename_reupload_replaces_photo() {
        let app = TestApp::spawn().await;
        let product = app
            .service
            .create_product(
                NewProduct::new("Widget", 1).photo(PhotoUpload::new("p.jpg", b"v1".to_vec())),
            )
            .await
            .unwrap();

        let updated = app
            .service
            .edit_product(
                product.id,
                ProductUpdate::default(),
                Some(PhotoUpload::new("p.jpg", b"v2".to_vec())),
            )
            .await
            .unwrap();

        assert_ne!(updated.image_path, product.image_path);
        let photo = AssetRef::new(AssetKind::Photo, updated.image_path.unwrap()).unwrap();
        assert_eq!(app.assets.get(&photo).await.unwrap(), b"v2");
        assert_eq!(app.stored(AssetKind::Photo).await, [photo]);
    }

    #[tokio::test]
    async fn invalid_fields_rejected() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 1, 1).await;

        for update in [
            ProductUpdate {
                name: Some(" ".into()),
                ..Default::default()
            },
            ProductUpdate {
                low_stock_threshold: Some(-1),
                ..Default::default()
            },
        ] {
            let err = app
                .service
                .edit_product(product.id, update, None)
                .await
                .unwrap_err();
            assert!(matches!(err, InventoryError::Validation(_)));
        }

        assert_eq!(app.service.get_product(product.id).await.unwrap(), product);
    }
}

mod lookup {
    use super::*;

    #[tokio::test]
    async fn find_by_scanned_code() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 1, 1).await;

        let found = app.service.find_by_code(&product.barcode).await.unwrap();
        assert_eq!(found.id, product.id);
    }

    #[tokio::test]
    async fn search_by_name_fragment_case_insensitive() {
        let app = TestApp::spawn().await;
        let bolt = app.create("Hex Bolt M8", 1, 1).await;
        app.create("Wood Screw", 1, 1).await;

        let hits = app.service.search_products("BOLT").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, bolt.id);
        assert!(app.service.search_products("nothing-like-this").await.unwrap().is_empty());
    }
}
