use reqwest::multipart::Form;

use crate::common::{TestApp, pdf, png, routes};

#[tokio::test]
async fn homepage_shows_three_latest_active_articles() {
    let app = TestApp::spawn().await;
    for n in 1..=4 {
        app.create_article(&format!("Artikel {n}"), &[]).await;
    }
    app.create_article("Draf", &[("is_active", "false")]).await;
    let banner = app
        .post_form(
            routes::BANNERS,
            Form::new()
                .text("alt", "Banner utama")
                .part("image", png("banner.png")),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(banner.status, 201, "{}", banner.text);

    let res = app.get(routes::HOMEPAGE).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let articles = res.data()["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 3);
    assert_eq!(articles[0]["title"], "Artikel 4");
    assert_eq!(articles[2]["title"], "Artikel 2");
    assert_eq!(res.data()["banners"].as_array().unwrap().len(), 1);
    assert!(res.data()["events"].as_array().unwrap().is_empty());
    assert!(res.data()["teams"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn homepage_shows_upcoming_event() {
    let app = TestApp::spawn().await;

    let created = app
        .post_form(
            routes::EVENTS,
            Form::new()
                .text("title", "Senam Bersama")
                .text("start", "2099-01-01T07:00:00Z")
                .text("end", "2099-01-01T09:00:00Z")
                .text("type", "free")
                .text("location", "Monas")
                .text("detail", "Bawa air minum")
                .part("image", png("poster.png")),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(created.status, 201, "{}", created.text);

    let res = app.get(routes::HOMEPAGE).await;
    let events = res.data()["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "free");
}

#[tokio::test]
async fn dashboard_counts_records() {
    let app = TestApp::spawn().await;
    app.create_article("Satu", &[]).await;
    app.create_article("Dua", &[("is_active", "false")]).await;

    let res = app.get_with_token(routes::DASHBOARD, &app.admin_token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.data()["articles"], 2);
    assert_eq!(res.data()["events"], 0);
    assert_eq!(res.data()["volunteer_applicants"], 0);
    assert_eq!(res.data()["career_applicants"], 0);
}

#[tokio::test]
async fn dashboard_requires_token() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::DASHBOARD).await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn content_image_is_stored_without_a_record() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(
            routes::CONTENTS,
            Form::new().part("image", png("inline.png")),
            Some(&app.admin_token),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    let url = res.data()["url"].as_str().unwrap();
    assert!(url.contains("/contents/"), "{url}");
    let keys = app.stored_keys().await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("contents/"));
}

#[tokio::test]
async fn content_upload_must_be_an_image() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(
            routes::CONTENTS,
            Form::new().part("image", pdf("notes.pdf")),
            Some(&app.admin_token),
        )
        .await;

    assert_eq!(res.status, 400);
    assert!(app.stored_keys().await.is_empty());
}
