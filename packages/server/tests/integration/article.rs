use reqwest::multipart::Form;

use crate::common::{TestApp, png, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn stores_cover_and_slug() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::ARTICLES,
                Form::new()
                    .text("title", "Hari Kesehatan Nasional")
                    .text("content", "<p>Isi</p>")
                    .part("image", png("cover.png")),
                Some(&app.admin_token),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let data = res.data();
        assert_eq!(data["slug"], "hari-kesehatan-nasional");
        assert_eq!(data["pillar"], "Lainnya");
        assert_eq!(data["reading_time"], "1 minute read");
        assert_eq!(data["created_by"], crate::common::ADMIN_ID);

        let keys = app.stored_keys().await;
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("articles/"), "{keys:?}");
        assert!(data["image_url"].as_str().unwrap().ends_with(&keys[0]));
    }

    #[tokio::test]
    async fn duplicate_titles_get_numbered_slugs() {
        let app = TestApp::spawn().await;

        let first = app.create_article("Jalan Sehat", &[]).await;
        let second = app.create_article("Jalan Sehat", &[]).await;

        let a = app.get(&routes::article(&first)).await;
        let b = app.get(&routes::article(&second)).await;
        assert_eq!(a.data()["slug"], "jalan-sehat");
        assert_eq!(b.data()["slug"], "jalan-sehat-2");

        let by_slug = app.get(&routes::article("jalan-sehat-2")).await;
        assert_eq!(by_slug.status, 200);
        assert_eq!(by_slug.id(), second);
    }

    #[tokio::test]
    async fn failed_upload_writes_nothing() {
        let app = TestApp::spawn().await;
        app.blobs.fail_uploads_containing("articles/").await;

        let res = app
            .post_form(
                routes::ARTICLES,
                Form::new()
                    .text("title", "Gagal")
                    .text("content", "x")
                    .part("image", png("cover.png")),
                Some(&app.admin_token),
            )
            .await;

        assert_eq!(res.status, 502, "{}", res.text);
        assert_eq!(res.code(), "STORAGE_ERROR");
        assert!(app.stored_keys().await.is_empty());

        let list = app.get_as_admin(routes::ARTICLES).await;
        assert_eq!(list.data()["total"], 0);
    }

    #[tokio::test]
    async fn missing_image_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::ARTICLES,
                Form::new().text("title", "Tanpa Gambar").text("content", "x"),
                Some(&app.admin_token),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_pillar_is_rejected_before_upload() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::ARTICLES,
                Form::new()
                    .text("title", "Salah Pilar")
                    .text("content", "x")
                    .text("pillar_id", "JPSPLR0000")
                    .part("image", png("cover.png")),
                Some(&app.admin_token),
            )
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert!(app.stored_keys().await.is_empty());
    }

    #[tokio::test]
    async fn requires_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::ARTICLES,
                Form::new().text("title", "x").text("content", "x"),
                None,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_MISSING");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn new_image_replaces_old_blob() {
        let app = TestApp::spawn().await;
        let id = app.create_article("Ganti Sampul", &[]).await;
        let old = app.stored_keys().await;

        let res = app
            .patch_form(
                &routes::article(&id),
                Form::new().part("image", png("new.png")),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let keys = app.stored_keys().await;
        assert_eq!(keys.len(), 1);
        assert_ne!(keys, old);
        assert!(res.data()["image_url"].as_str().unwrap().ends_with(&keys[0]));
    }

    #[tokio::test]
    async fn failed_upload_keeps_old_blob_and_row() {
        let app = TestApp::spawn().await;
        let id = app.create_article("Tetap", &[]).await;
        let old = app.stored_keys().await;
        app.blobs.fail_uploads_containing("broken").await;

        let res = app
            .patch_form(
                &routes::article(&id),
                Form::new()
                    .text("title", "Berubah")
                    .part("image", png("broken.png")),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 502);
        assert_eq!(app.stored_keys().await, old);
        let current = app.get(&routes::article(&id)).await;
        assert_eq!(current.data()["title"], "Tetap");
    }

    #[tokio::test]
    async fn title_change_reslugs() {
        let app = TestApp::spawn().await;
        let id = app.create_article("Judul Lama", &[]).await;

        let res = app
            .patch_form(
                &routes::article(&id),
                Form::new().text("title", "Judul Baru"),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["slug"], "judul-baru");
        assert_eq!(app.stored_keys().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_article_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .patch_form(
                &routes::article("JPSARC000000"),
                Form::new().text("title", "x"),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn removes_blob_and_row() {
        let app = TestApp::spawn().await;
        let id = app.create_article("Hapus", &[]).await;

        let res = app.delete(&routes::article(&id), &app.admin_token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.id(), id);
        assert!(app.stored_keys().await.is_empty());
        assert_eq!(app.get(&routes::article(&id)).await.status, 404);
    }

    #[tokio::test]
    async fn missing_blob_does_not_block_delete() {
        let app = TestApp::spawn().await;
        let id = app.create_article("Yatim", &[]).await;
        let keys = app.stored_keys().await;
        common::storage::BlobStore::delete(app.blobs.as_ref(), crate::common::BUCKET, &keys[0])
            .await
            .unwrap();

        let res = app.delete(&routes::article(&id), &app.admin_token).await;

        assert_eq!(res.status, 200, "{}", res.text);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn inactive_articles_are_hidden_from_public() {
        let app = TestApp::spawn().await;
        let hidden = app.create_article("Draf", &[("is_active", "false")]).await;
        app.create_article("Terbit", &[]).await;

        let public = app.get(routes::ARTICLES).await;
        assert_eq!(public.status, 200);
        assert_eq!(public.data()["total"], 1);
        assert_eq!(public.data()["items"][0]["title"], "Terbit");
        assert!(public.data()["items"][0].get("is_active").is_none());
        assert_eq!(app.get(&routes::article(&hidden)).await.status, 404);

        let admin = app.get_as_admin(routes::ARTICLES).await;
        assert_eq!(admin.data()["total"], 2);
        assert_eq!(app.get_as_admin(&routes::article(&hidden)).await.status, 200);
    }

    #[tokio::test]
    async fn pages_hold_eight_newest_first() {
        let app = TestApp::spawn().await;
        for n in 1..=9 {
            app.create_article(&format!("Artikel {n}"), &[]).await;
        }

        let first = app.get(&format!("{}?page=1", routes::ARTICLES)).await;
        assert_eq!(first.data()["items"].as_array().unwrap().len(), 8);
        assert_eq!(first.data()["items"][0]["title"], "Artikel 9");
        assert_eq!(first.data()["page"], 1);
        assert_eq!(first.data()["total"], 9);
        assert_eq!(first.data()["total_pages"], 2);

        let second = app.get(&format!("{}?page=2", routes::ARTICLES)).await;
        assert_eq!(second.data()["items"].as_array().unwrap().len(), 1);
        assert_eq!(second.data()["items"][0]["title"], "Artikel 1");

        let past = app.get(&format!("{}?page=5", routes::ARTICLES)).await;
        assert_eq!(past.status, 200);
        assert!(past.data()["items"].as_array().unwrap().is_empty());
        assert_eq!(past.data()["page"], 0);
        assert_eq!(past.data()["total"], 9);

        let garbage = app.get(&format!("{}?page=abc", routes::ARTICLES)).await;
        assert_eq!(garbage.data()["page"], 1);
    }

    #[tokio::test]
    async fn huge_page_is_past_the_end() {
        let app = TestApp::spawn().await;
        app.create_article("Satu-satunya", &[]).await;

        for page in ["1152921504606846977", "18446744073709551615"] {
            let res = app.get(&format!("{}?page={page}", routes::ARTICLES)).await;
            assert_eq!(res.status, 200, "page={page}: {}", res.text);
            assert!(res.data()["items"].as_array().unwrap().is_empty());
            assert_eq!(res.data()["page"], 0);
            assert_eq!(res.data()["total"], 1);
            assert_eq!(res.data()["total_pages"], 1);
        }

        let admin = app
            .get_as_admin(&format!("{}?page=1152921504606846977", routes::ARTICLES))
            .await;
        assert_eq!(admin.status, 200, "{}", admin.text);
        assert_eq!(admin.data()["page"], 0);
    }

    #[tokio::test]
    async fn sort_filter_reverses_order() {
        let app = TestApp::spawn().await;
        app.create_article("Pertama", &[]).await;
        app.create_article("Kedua", &[]).await;

        let asc = app.get(&format!("{}?filter=asc", routes::ARTICLES)).await;
        assert_eq!(asc.data()["items"][0]["title"], "Pertama");
        let desc = app.get(&format!("{}?filter=desc", routes::ARTICLES)).await;
        assert_eq!(desc.data()["items"][0]["title"], "Kedua");
    }

    #[tokio::test]
    async fn filter_by_category_and_uncategorized() {
        let app = TestApp::spawn().await;
        let (pillar_id, sub_id) = app.create_pillar("Kesehatan", "Gizi Anak").await;
        app.create_article(
            "Makanan Bergizi",
            &[("pillar_id", &pillar_id), ("sub_pillar_id", &sub_id)],
        )
        .await;
        app.create_article("Pengumuman", &[]).await;

        let by_pillar = app
            .get(&format!("{}?filter=kesehatan", routes::ARTICLES))
            .await;
        assert_eq!(by_pillar.data()["total"], 1);
        assert_eq!(by_pillar.data()["items"][0]["pillar"], "Kesehatan");
        assert_eq!(by_pillar.data()["items"][0]["subpillar"], "Gizi Anak");

        let by_sub = app
            .get(&format!("{}?filter=gizi-anak", routes::ARTICLES))
            .await;
        assert_eq!(by_sub.data()["total"], 1);

        let other = app
            .get(&format!("{}?filter=Lainnya", routes::ARTICLES))
            .await;
        assert_eq!(other.data()["total"], 1);
        assert_eq!(other.data()["items"][0]["title"], "Pengumuman");
    }

    #[tokio::test]
    async fn admin_search_is_case_insensitive() {
        let app = TestApp::spawn().await;
        app.create_article("Donor Darah", &[]).await;
        app.create_article("Senam Pagi", &[]).await;

        let res = app
            .get_as_admin(&format!("{}?q=DARAH", routes::ARTICLES))
            .await;

        assert_eq!(res.data()["total"], 1);
        assert_eq!(res.data()["items"][0]["title"], "Donor Darah");
        assert_eq!(res.data()["items"][0]["is_active"], true);
    }

    #[tokio::test]
    async fn admin_view_requires_token() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::ARTICLES))
            .header("x-role", "admin")
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 401);
    }
}
