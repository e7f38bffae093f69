use reqwest::multipart::Form;

use crate::common::{TestApp, png, routes};

async fn create_event(app: &TestApp, title: &str, start: &str, end: &str) -> String {
    let res = app
        .post_form(
            routes::EVENTS,
            Form::new()
                .text("title", title.to_string())
                .text("start", start.to_string())
                .text("end", end.to_string())
                .text("type", "paid")
                .text("location", "Balai Warga")
                .text("detail", "Registrasi di tempat")
                .part("image", png("poster.png")),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(res.status, 201, "create event failed: {}", res.text);
    res.id()
}

mod create {
    use super::*;

    #[tokio::test]
    async fn stores_poster_and_slug() {
        let app = TestApp::spawn().await;

        let id = create_event(
            &app,
            "Donor Darah Akbar",
            "2099-03-01T08:00:00Z",
            "2099-03-01T12:00:00Z",
        )
        .await;

        let res = app.get(&routes::event("donor-darah-akbar")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["id"], id.as_str());
        assert_eq!(res.data()["type"], "paid");
        assert_eq!(res.data()["status"], "not started");
        let keys = app.stored_keys().await;
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("events/"));
    }

    #[tokio::test]
    async fn reversed_schedule_uploads_nothing() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::EVENTS,
                Form::new()
                    .text("title", "Terbalik")
                    .text("start", "2099-03-01T12:00:00Z")
                    .text("end", "2099-03-01T08:00:00Z")
                    .text("type", "free")
                    .text("location", "Aula")
                    .text("detail", "x")
                    .part("image", png("poster.png")),
                Some(&app.admin_token),
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(app.stored_keys().await.is_empty());
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn new_poster_replaces_old_blob() {
        let app = TestApp::spawn().await;
        let id = create_event(
            &app,
            "Jalan Sehat",
            "2099-05-01T06:00:00Z",
            "2099-05-01T09:00:00Z",
        )
        .await;
        let old = app.stored_keys().await;

        let res = app
            .patch_form(
                &routes::event(&id),
                Form::new()
                    .text("location", "Lapangan Banteng")
                    .part("image", png("poster-baru.png")),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["location"], "Lapangan Banteng");
        let keys = app.stored_keys().await;
        assert_eq!(keys.len(), 1);
        assert!(!keys.contains(&old[0]));
        assert!(keys[0].starts_with("events/"));
        assert!(res.data()["image_url"].as_str().unwrap().ends_with(&keys[0]));
    }

    #[tokio::test]
    async fn end_before_existing_start_is_rejected() {
        let app = TestApp::spawn().await;
        let id = create_event(
            &app,
            "Seminar Gizi",
            "2099-06-01T09:00:00Z",
            "2099-06-01T11:00:00Z",
        )
        .await;
        let old = app.stored_keys().await;

        let res = app
            .patch_form(
                &routes::event(&id),
                Form::new()
                    .text("end", "2099-05-31T09:00:00Z")
                    .part("image", png("ignored.png")),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.stored_keys().await, old);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn removes_poster_and_row() {
        let app = TestApp::spawn().await;
        let id = create_event(
            &app,
            "Bazar Amal",
            "2099-07-01T09:00:00Z",
            "2099-07-01T17:00:00Z",
        )
        .await;

        let res = app.delete(&routes::event(&id), &app.admin_token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(app.stored_keys().await.is_empty());
        assert_eq!(app.get(&routes::event(&id)).await.status, 404);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn items_carry_schedule_status() {
        let app = TestApp::spawn().await;
        create_event(&app, "Sudah Lewat", "2000-01-01T08:00:00Z", "2000-01-01T10:00:00Z").await;
        create_event(&app, "Sedang Jalan", "2000-01-01T08:00:00Z", "2099-12-31T10:00:00Z").await;
        create_event(&app, "Akan Datang", "2099-01-01T08:00:00Z", "2099-01-01T10:00:00Z").await;

        let res = app.get(routes::EVENTS).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["total"], 3);
        let items = res.data()["items"].as_array().unwrap();
        let status_of = |title: &str| {
            items
                .iter()
                .find(|item| item["title"] == title)
                .map(|item| item["status"].clone())
                .unwrap()
        };
        assert_eq!(status_of("Sudah Lewat"), "ended");
        assert_eq!(status_of("Sedang Jalan"), "ongoing");
        assert_eq!(status_of("Akan Datang"), "not started");
    }
}
