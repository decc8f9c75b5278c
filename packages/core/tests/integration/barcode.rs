use std::collections::HashSet;

use ::common::barcode::{BarcodeCode, scan_png};
use inventory_core::InventoryError;

use crate::common::TestApp;

mod rendering {
    use super::*;

    #[tokio::test]
    async fn rendered_image_scans_back_to_code() {
        let app = TestApp::spawn().await;
        for code in ["000000000000", "123456789012", "990000000099"] {
            let png = app.service.render_barcode_image(code).unwrap();
            assert_eq!(scan_png(&png).unwrap().as_str(), code);
        }
    }

    #[tokio::test]
    async fn rendering_is_byte_stable() {
        let app = TestApp::spawn().await;
        let first = app.service.render_barcode_image("555555555555").unwrap();
        let second = app.service.render_barcode_image("555555555555").unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn image_is_a_grayscale_png_of_configured_height() {
        let app = TestApp::spawn().await;
        let png_bytes = app.service.render_barcode_image("123456789012").unwrap();

        let decoder = png::Decoder::new(png_bytes.as_slice());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!(info.height, app.config.barcode.height_px);
        assert_eq!(info.color_type, png::ColorType::Grayscale);
    }

    #[tokio::test]
    async fn stored_barcode_matches_render() {
        let app = TestApp::spawn().await;
        let product = app.create("Widget", 1, 0).await;

        let stored = ::common::storage::AssetStore::get(
            app.assets.as_ref(),
            &::common::storage::AssetRef::barcode(&product.barcode).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(stored, app.service.render_barcode_image(&product.barcode).unwrap());
        assert_eq!(scan_png(&stored).unwrap().as_str(), product.barcode);
    }

    #[tokio::test]
    async fn malformed_codes_rejected() {
        let app = TestApp::spawn().await;
        for code in ["", "12345", "1234567890123", "12345678901x"] {
            assert!(matches!(
                app.service.render_barcode_image(code),
                Err(InventoryError::Validation(_))
            ));
        }
    }
}

mod uniqueness {
    use super::*;

    #[tokio::test]
    async fn every_product_gets_a_distinct_valid_code() {
        let app = TestApp::spawn().await;
        let mut seen = HashSet::new();
        for i in 0..40 {
            let product = app.create(&format!("Item {i}"), 0, 0).await;
            assert!(BarcodeCode::parse(&product.barcode).is_ok());
            assert!(seen.insert(product.barcode));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creations_get_distinct_codes() {
        let app = TestApp::spawn().await;
        let mut handles = Vec::new();
        for i in 0..20 {
            let service = app.service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .create_product(inventory_core::models::NewProduct::new(
                        format!("Item {i}"),
                        1,
                    ))
                    .await
            }));
        }

        let mut codes = HashSet::new();
        for handle in handles {
            let product = handle.await.unwrap().unwrap();
            assert!(codes.insert(product.barcode));
        }
        assert_eq!(codes.len(), 20);
    }
}
