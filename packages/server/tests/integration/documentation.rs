use reqwest::multipart::Form;

use crate::common::{TestApp, png, routes};

async fn create_gallery(app: &TestApp, images: usize) -> String {
    let mut form = Form::new()
        .text("title", "Bakti Sosial")
        .part("thumbnail", png("thumb.png"));
    for n in 0..images {
        form = form.part("images", png(&format!("photo-{n}.png")));
    }
    let res = app
        .post_form(routes::DOCS, form, Some(&app.admin_token))
        .await;
    assert_eq!(res.status, 201, "create documentation failed: {}", res.text);
    res.id()
}

#[tokio::test]
async fn create_stores_thumbnail_and_gallery() {
    let app = TestApp::spawn().await;

    let id = create_gallery(&app, 2).await;

    let keys = app.stored_keys().await;
    assert_eq!(keys.len(), 3);
    assert_eq!(keys.iter().filter(|k| k.starts_with("doc_images/")).count(), 2);
    assert_eq!(keys.iter().filter(|k| k.starts_with("doc_thumbnails/")).count(), 1);

    let detail = app.get(&routes::doc(&id)).await;
    assert_eq!(detail.status, 200);
    assert_eq!(detail.data()["images"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn failed_gallery_upload_discards_thumbnail() {
    let app = TestApp::spawn().await;
    app.blobs.fail_uploads_containing("doc_images/").await;

    let res = app
        .post_form(
            routes::DOCS,
            Form::new()
                .text("title", "Gagal")
                .part("thumbnail", png("thumb.png"))
                .part("images", png("photo.png")),
            Some(&app.admin_token),
        )
        .await;

    assert_eq!(res.status, 502, "{}", res.text);
    assert!(app.stored_keys().await.is_empty());
    assert_eq!(app.get_as_admin(routes::DOCS).await.data()["total"], 0);
}

#[tokio::test]
async fn non_image_gallery_file_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(
            routes::DOCS,
            Form::new()
                .text("title", "Salah Berkas")
                .part("thumbnail", png("thumb.png"))
                .part("images", crate::common::pdf("notes.pdf")),
            Some(&app.admin_token),
        )
        .await;

    assert_eq!(res.status, 400);
    assert!(app.stored_keys().await.is_empty());
}

#[tokio::test]
async fn images_can_be_added_and_removed() {
    let app = TestApp::spawn().await;
    let id = create_gallery(&app, 1).await;

    let added = app
        .post_form(
            &routes::doc_images(&id),
            Form::new().part("images", png("extra.png")),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(added.status, 201, "{}", added.text);
    let image_id = added.data()[0]["id"].as_str().unwrap().to_string();
    assert_eq!(app.stored_keys().await.len(), 3);

    let removed = app
        .delete(
            &format!("{}/{image_id}", routes::doc_images(&id)),
            &app.admin_token,
        )
        .await;
    assert_eq!(removed.status, 200, "{}", removed.text);
    assert_eq!(app.stored_keys().await.len(), 2);

    let detail = app.get(&routes::doc(&id)).await;
    assert_eq!(detail.data()["images"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn removing_an_image_of_another_entry_is_not_found() {
    let app = TestApp::spawn().await;
    let first = create_gallery(&app, 1).await;
    let second = create_gallery(&app, 0).await;
    let detail = app.get(&routes::doc(&first)).await;
    let image_id = detail.data()["images"][0]["id"].as_str().unwrap().to_string();

    let res = app
        .delete(
            &format!("{}/{image_id}", routes::doc_images(&second)),
            &app.admin_token,
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(app.stored_keys().await.len(), 3);
}

#[tokio::test]
async fn delete_clears_every_blob() {
    let app = TestApp::spawn().await;
    let id = create_gallery(&app, 3).await;
    assert_eq!(app.stored_keys().await.len(), 4);

    let res = app.delete(&routes::doc(&id), &app.admin_token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert!(app.stored_keys().await.is_empty());
    assert_eq!(app.get(&routes::doc(&id)).await.status, 404);
}

#[tokio::test]
async fn thumbnail_replacement_removes_old_thumbnail() {
    let app = TestApp::spawn().await;
    let id = create_gallery(&app, 1).await;

    let res = app
        .patch_form(
            &routes::doc(&id),
            Form::new().part("thumbnail", png("thumb-2.png")),
            &app.admin_token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let keys = app.stored_keys().await;
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().any(|k| k.ends_with("thumb-2.png")), "{keys:?}");
}
