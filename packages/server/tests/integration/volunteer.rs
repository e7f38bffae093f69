use reqwest::multipart::Form;
use serde_json::json;

use crate::common::{ADMIN_ID, TestApp, TestResponse, pdf, png, routes};

fn application(email: &str) -> Form {
    Form::new()
        .text("fullname", "Siti Rahma")
        .text("email", email.to_string())
        .text("institution", "Universitas Indonesia")
        .text("level", "S1")
        .text("study_program", "Gizi")
        .text("reason", "Ingin membantu")
        .part("cv", pdf("cv.pdf"))
        .part("follow_proof", png("follow.png"))
}

async fn apply(app: &TestApp, id: &str) -> TestResponse {
    app.post_form(
        &routes::volunteer_applicants(id),
        application("siti@example.org"),
        None,
    )
    .await
}

mod postings {
    use super::*;

    #[tokio::test]
    async fn create_and_fetch_by_slug() {
        let app = TestApp::spawn().await;
        app.create_volunteer("Relawan Posyandu", true).await;

        let res = app.get(&routes::volunteer("relawan-posyandu")).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["requirements"], "Mahasiswa aktif");
        assert_eq!(res.data()["pillar"], "Lainnya");
        assert!(res.data().get("applicant_count").is_none());
    }

    #[tokio::test]
    async fn blank_requirements_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::VOLUNTEERS,
                &json!({ "title": "Relawan", "requirements": "   " }),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn rename_reslugs() {
        let app = TestApp::spawn().await;
        let id = app.create_volunteer("Relawan Lama", true).await;

        let res = app
            .patch_json(
                &routes::volunteer(&id),
                &json!({ "title": "Relawan Baru", "responsibilities": null }),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["slug"], "relawan-baru");
        assert!(res.data()["responsibilities"].is_null());
    }
}

mod applications {
    use super::*;

    #[tokio::test]
    async fn apply_stores_cv_and_proof() {
        let app = TestApp::spawn().await;
        let id = app.create_volunteer("Relawan Edukasi", true).await;

        let res = apply(&app, &id).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.data()["is_approved"], false);
        assert_eq!(res.data()["level"], "S1");
        let keys = app.stored_keys().await;
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().any(|k| k.starts_with("vol_cvs/")));
        assert!(keys.iter().any(|k| k.starts_with("vol_proofs/")));

        let list = app.get_as_admin(routes::VOLUNTEERS).await;
        assert_eq!(list.data()["items"][0]["applicant_count"], 1);
    }

    #[tokio::test]
    async fn closed_posting_is_not_found() {
        let app = TestApp::spawn().await;
        let id = app.create_volunteer("Relawan Tutup", false).await;

        let res = apply(&app, &id).await;

        assert_eq!(res.status, 404);
        assert!(app.stored_keys().await.is_empty());
    }

    #[tokio::test]
    async fn invalid_email_uploads_nothing() {
        let app = TestApp::spawn().await;
        let id = app.create_volunteer("Relawan Surel", true).await;

        let res = app
            .post_form(
                &routes::volunteer_applicants(&id),
                application("bukan-email"),
                None,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert!(app.stored_keys().await.is_empty());
    }

    #[tokio::test]
    async fn failed_proof_upload_discards_cv() {
        let app = TestApp::spawn().await;
        let id = app.create_volunteer("Relawan Gagal", true).await;
        app.blobs.fail_uploads_containing("vol_proofs/").await;

        let res = apply(&app, &id).await;

        assert_eq!(res.status, 502);
        assert!(app.stored_keys().await.is_empty());
        let applicants = app
            .get_with_token(&routes::volunteer_applicants(&id), &app.admin_token)
            .await;
        assert!(applicants.data().as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn approval_toggles_and_records_admin() {
        let app = TestApp::spawn().await;
        let id = app.create_volunteer("Relawan Setuju", true).await;
        let applicant = apply(&app, &id).await.id();
        let path = routes::volunteer_approval(&id, &applicant);

        let approved = app.patch_json(&path, &json!({}), &app.admin_token).await;
        assert_eq!(approved.status, 200, "{}", approved.text);
        assert_eq!(approved.data()["is_approved"], true);
        assert_eq!(approved.data()["approved_by"], ADMIN_ID);

        let revoked = app.patch_json(&path, &json!({}), &app.admin_token).await;
        assert_eq!(revoked.data()["is_approved"], false);
        assert!(revoked.data()["approved_by"].is_null());
    }

    #[tokio::test]
    async fn deleting_posting_removes_applicant_files() {
        let app = TestApp::spawn().await;
        let id = app.create_volunteer("Relawan Hapus", true).await;
        apply(&app, &id).await;
        apply(&app, &id).await;
        assert_eq!(app.stored_keys().await.len(), 4);

        let res = app.delete(&routes::volunteer(&id), &app.admin_token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(app.stored_keys().await.is_empty());
        assert_eq!(app.get(&routes::volunteer(&id)).await.status, 404);
    }
}

mod careers {
    use super::*;

    async fn create_career(app: &TestApp, title: &str) -> String {
        let res = app
            .post_json(
                routes::CAREERS,
                &json!({
                    "title": title,
                    "location": "onsite",
                    "type": "internship",
                    "requirements": "Mahasiswa tingkat akhir",
                }),
                &app.admin_token,
            )
            .await;
        assert_eq!(res.status, 201, "create career failed: {}", res.text);
        res.id()
    }

    async fn apply_career(app: &TestApp, id: &str, fullname: &str) {
        let res = app
            .post_form(
                &routes::career_applicants(id),
                Form::new()
                    .text("fullname", fullname.to_string())
                    .text("email", "pelamar@example.org")
                    .text("phone_number", "08111111111")
                    .text("address", "Bandung")
                    .part("cv", pdf("cv.pdf")),
                None,
            )
            .await;
        assert_eq!(res.status, 201, "apply failed: {}", res.text);
    }

    #[tokio::test]
    async fn deleting_posting_removes_every_applicant_cv() {
        let app = TestApp::spawn().await;
        let id = create_career(&app, "Staf Lapangan").await;
        let other = create_career(&app, "Staf Keuangan").await;
        for name in ["Andi", "Budi", "Citra"] {
            apply_career(&app, &id, name).await;
        }
        apply_career(&app, &other, "Dewi").await;
        assert_eq!(app.stored_keys().await.len(), 4);

        let res = app.delete(&routes::career(&id), &app.admin_token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let left = app.stored_keys().await;
        assert_eq!(left.len(), 1);
        assert!(left[0].starts_with("career_cvs/"));
        assert_eq!(app.get(&routes::career(&id)).await.status, 404);
        let remaining = app
            .get_with_token(&routes::career_applicants(&other), &app.admin_token)
            .await;
        assert_eq!(remaining.data().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn apply_stores_cv() {
        let app = TestApp::spawn().await;
        let posting = app
            .post_json(
                routes::CAREERS,
                &json!({
                    "title": "Program Officer",
                    "location": "hybrid",
                    "type": "fulltime",
                    "requirements": "S1 Kesehatan Masyarakat",
                }),
                &app.admin_token,
            )
            .await;
        assert_eq!(posting.status, 201, "{}", posting.text);
        assert_eq!(posting.data()["type"], "fulltime");
        let id = posting.id();

        let res = app
            .post_form(
                &routes::career_applicants(&id),
                Form::new()
                    .text("fullname", "Andi")
                    .text("email", "andi@example.org")
                    .text("phone_number", "08123456789")
                    .text("address", "Jakarta")
                    .part("cv", pdf("cv.pdf")),
                None,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let keys = app.stored_keys().await;
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("career_cvs/"));

        let deleted = app
            .delete(&routes::career(&id), &app.admin_token)
            .await;
        assert_eq!(deleted.status, 200);
        assert!(app.stored_keys().await.is_empty());
    }
}
