use reqwest::multipart::Form;

use crate::common::{TestApp, png, routes};

async fn create_image_record(app: &TestApp, collection: &str, alt: &str) -> String {
    let res = app
        .post_form(
            collection,
            Form::new()
                .text("alt", alt.to_string())
                .part("image", png("logo.png")),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(res.status, 201, "create failed: {}", res.text);
    res.id()
}

mod banners {
    use super::*;

    #[tokio::test]
    async fn create_and_fetch() {
        let app = TestApp::spawn().await;

        let id = create_image_record(&app, routes::BANNERS, "Kampanye Gizi").await;

        let res = app.get_as_admin(&routes::banner(&id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["alt"], "Kampanye Gizi");
        assert!(res.data()["link"].is_null());
        let keys = app.stored_keys().await;
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("banners/"));
    }

    #[tokio::test]
    async fn listing_is_admin_only() {
        let app = TestApp::spawn().await;
        create_image_record(&app, routes::BANNERS, "Satu").await;

        assert_eq!(app.get(routes::BANNERS).await.status, 401);
        let res = app.get_as_admin(routes::BANNERS).await;
        assert_eq!(res.data()["total"], 1);
    }

    #[tokio::test]
    async fn new_image_replaces_old_blob() {
        let app = TestApp::spawn().await;
        let id = create_image_record(&app, routes::BANNERS, "Lama").await;
        let old = app.stored_keys().await;

        let res = app
            .patch_form(
                &routes::banner(&id),
                Form::new()
                    .text("link", "https://contoh.org/donasi")
                    .part("image", png("baru.png")),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["alt"], "Lama");
        assert_eq!(res.data()["link"], "https://contoh.org/donasi");
        let keys = app.stored_keys().await;
        assert_eq!(keys.len(), 1);
        assert!(!keys.contains(&old[0]));
        assert!(res.data()["image_url"].as_str().unwrap().ends_with(&keys[0]));
    }

    #[tokio::test]
    async fn failed_upload_keeps_old_image() {
        let app = TestApp::spawn().await;
        let id = create_image_record(&app, routes::BANNERS, "Tetap").await;
        let old = app.stored_keys().await;
        app.blobs.fail_uploads_containing("rusak").await;

        let res = app
            .patch_form(
                &routes::banner(&id),
                Form::new()
                    .text("alt", "Berubah")
                    .part("image", png("rusak.png")),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 502);
        assert_eq!(app.stored_keys().await, old);
        let current = app.get_as_admin(&routes::banner(&id)).await;
        assert_eq!(current.data()["alt"], "Tetap");
    }

    #[tokio::test]
    async fn delete_removes_image() {
        let app = TestApp::spawn().await;
        let id = create_image_record(&app, routes::BANNERS, "Hapus").await;

        let res = app.delete(&routes::banner(&id), &app.admin_token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(app.stored_keys().await.is_empty());
        assert_eq!(app.get_as_admin(&routes::banner(&id)).await.status, 404);
    }
}

mod partners {
    use super::*;

    #[tokio::test]
    async fn create_requires_image() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::PARTNERS,
                Form::new().text("alt", "Tanpa Logo"),
                Some(&app.admin_token),
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(app.stored_keys().await.is_empty());
    }

    #[tokio::test]
    async fn create_replace_delete() {
        let app = TestApp::spawn().await;

        let id = create_image_record(&app, routes::PARTNERS, "Yayasan Mitra").await;
        let created = app.stored_keys().await;
        assert_eq!(created.len(), 1);
        assert!(created[0].starts_with("partners/"));

        let updated = app
            .patch_form(
                &routes::partner(&id),
                Form::new().part("image", png("logo-baru.png")),
                &app.admin_token,
            )
            .await;
        assert_eq!(updated.status, 200, "{}", updated.text);
        let replaced = app.stored_keys().await;
        assert_eq!(replaced.len(), 1);
        assert_ne!(replaced, created);
        assert!(replaced[0].starts_with("partners/"));

        let listed = app.get_as_admin(routes::PARTNERS).await;
        assert_eq!(listed.data()["items"][0]["alt"], "Yayasan Mitra");

        let deleted = app.delete(&routes::partner(&id), &app.admin_token).await;
        assert_eq!(deleted.status, 200, "{}", deleted.text);
        assert!(app.stored_keys().await.is_empty());
        assert_eq!(app.get_as_admin(&routes::partner(&id)).await.status, 404);
    }

    #[tokio::test]
    async fn homepage_lists_partners() {
        let app = TestApp::spawn().await;
        create_image_record(&app, routes::PARTNERS, "Mitra A").await;

        let res = app.get(routes::HOMEPAGE).await;

        assert_eq!(res.data()["partners"].as_array().unwrap().len(), 1);
    }
}
