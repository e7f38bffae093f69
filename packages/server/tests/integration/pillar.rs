use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn pillar_needs_a_subpillar() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(
            routes::PILLARS,
            &json!({ "name": "Kesehatan", "subpillars": [] }),
            &app.admin_token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn public_listing_is_a_tree() {
    let app = TestApp::spawn().await;
    app.create_pillar("Pendidikan", "Literasi").await;
    app.create_pillar("Kesehatan", "Gizi Anak").await;

    let res = app.get(routes::PILLARS).await;

    assert_eq!(res.status, 200);
    let tree = res.data().as_array().expect("public listing is an array");
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0]["name"], "Kesehatan");
    assert_eq!(tree[0]["subpillars"][0]["slug"], "gizi-anak");

    let admin = app.get_as_admin(routes::PILLARS).await;
    assert_eq!(admin.data()["total"], 2);
}

#[tokio::test]
async fn update_renames_and_adds_subpillars() {
    let app = TestApp::spawn().await;
    let (id, sub_id) = app.create_pillar("Lingkungan", "Sampah").await;

    let res = app
        .patch_json(
            &routes::pillar(&id),
            &json!({
                "name": "Lingkungan Hidup",
                "subpillars": [
                    { "id": sub_id, "name": "Pengelolaan Sampah" },
                    { "name": "Air Bersih" },
                ],
            }),
            &app.admin_token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.data()["slug"], "lingkungan-hidup");
    let subs = res.data()["subpillars"].as_array().unwrap();
    assert_eq!(subs.len(), 2);
    let renamed = subs.iter().find(|s| s["id"] == sub_id.as_str()).unwrap();
    assert_eq!(renamed["name"], "Pengelolaan Sampah");
    assert_eq!(renamed["slug"], "pengelolaan-sampah");
}

#[tokio::test]
async fn deleting_pillar_uncategorizes_records() {
    let app = TestApp::spawn().await;
    let (pillar_id, sub_id) = app.create_pillar("Kesehatan", "Gizi Anak").await;
    let article = app
        .create_article(
            "Makanan Bergizi",
            &[("pillar_id", &pillar_id), ("sub_pillar_id", &sub_id)],
        )
        .await;

    let res = app
        .delete(&routes::pillar(&pillar_id), &app.admin_token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let detail = app.get_as_admin(&routes::article(&article)).await;
    assert_eq!(detail.data()["pillar"], "Lainnya");
    assert_eq!(detail.data()["subpillar"], "Lainnya");
    assert!(detail.data()["pillar_id"].is_null());
    assert!(detail.data()["sub_pillar_id"].is_null());

    let uncategorized = app.get(routes::ARTICLES).await;
    assert_eq!(uncategorized.data()["total"], 1);
}

#[tokio::test]
async fn deleting_subpillar_keeps_pillar_reference() {
    let app = TestApp::spawn().await;
    let (pillar_id, sub_id) = app.create_pillar("Kesehatan", "Gizi Anak").await;
    let article = app
        .create_article(
            "Makanan Bergizi",
            &[("pillar_id", &pillar_id), ("sub_pillar_id", &sub_id)],
        )
        .await;

    let res = app
        .delete(
            &format!("{}/subpillars/{sub_id}", routes::pillar(&pillar_id)),
            &app.admin_token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let detail = app.get_as_admin(&routes::article(&article)).await;
    assert_eq!(detail.data()["pillar"], "Kesehatan");
    assert_eq!(detail.data()["subpillar"], "Lainnya");
}

#[tokio::test]
async fn subpillar_of_another_pillar_is_rejected() {
    let app = TestApp::spawn().await;
    let (pillar_id, _) = app.create_pillar("Kesehatan", "Gizi Anak").await;
    let (_, foreign_sub) = app.create_pillar("Pendidikan", "Literasi").await;

    let res = app
        .post_form(
            routes::ARTICLES,
            reqwest::multipart::Form::new()
                .text("title", "Campur")
                .text("content", "x")
                .text("pillar_id", pillar_id)
                .text("sub_pillar_id", foreign_sub)
                .part("image", crate::common::png("cover.png")),
            Some(&app.admin_token),
        )
        .await;

    assert_eq!(res.status, 400);
}
