use reqwest::multipart::Form;
use serde_json::json;

use crate::common::{TestApp, png, routes};

async fn create_member(app: &TestApp, fullname: &str, position_id: &str) -> String {
    let res = app
        .post_form(
            routes::TEAMS,
            Form::new()
                .text("fullname", fullname.to_string())
                .text("position_id", position_id.to_string())
                .text(
                    "educations",
                    json!([{ "name": "Universitas Indonesia", "level": "S1" }]).to_string(),
                )
                .text(
                    "socials",
                    json!([{ "platform": "INSTAGRAM", "url": "https://instagram.com/x" }])
                        .to_string(),
                )
                .part("image", png("face.png")),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(res.status, 201, "create team member failed: {}", res.text);
    res.id()
}

mod teams {
    use super::*;

    #[tokio::test]
    async fn create_with_children() {
        let app = TestApp::spawn().await;
        let position = app.create_position("Ketua").await;

        let id = create_member(&app, "Budi Santoso", &position).await;

        let res = app.get(&routes::team(&id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.data()["position"]["name"], "Ketua");
        assert_eq!(res.data()["educations"][0]["level"], "S1");
        assert_eq!(res.data()["socials"][0]["platform"], "INSTAGRAM");
        assert_eq!(app.stored_keys().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_position_is_rejected_before_upload() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::TEAMS,
                Form::new()
                    .text("fullname", "Tanpa Jabatan")
                    .text("position_id", "JPSPOS0000")
                    .part("image", png("face.png")),
                Some(&app.admin_token),
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(app.stored_keys().await.is_empty());
    }

    #[tokio::test]
    async fn public_roster_and_admin_table() {
        let app = TestApp::spawn().await;
        let position = app.create_position("Anggota").await;
        create_member(&app, "Pertama", &position).await;
        create_member(&app, "Kedua", &position).await;

        let roster = app.get(routes::TEAMS).await;
        let members = roster.data().as_array().expect("public roster is an array");
        assert_eq!(members.len(), 2);
        assert_eq!(members[0]["fullname"], "Pertama");

        let table = app.get_as_admin(routes::TEAMS).await;
        assert_eq!(table.data()["total"], 2);
        assert_eq!(table.data()["items"][0]["position"], "Anggota");
    }

    #[tokio::test]
    async fn education_can_be_removed() {
        let app = TestApp::spawn().await;
        let position = app.create_position("Bendahara").await;
        let id = create_member(&app, "Citra", &position).await;
        let detail = app.get(&routes::team(&id)).await;
        let education = detail.data()["educations"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let res = app
            .delete(&routes::team_education(&id, &education), &app.admin_token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let again = app
            .delete(&routes::team_education(&id, &education), &app.admin_token)
            .await;
        assert_eq!(again.status, 404);

        let detail = app.get(&routes::team(&id)).await;
        assert!(detail.data()["educations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_photo() {
        let app = TestApp::spawn().await;
        let position = app.create_position("Sekretaris").await;
        let id = create_member(&app, "Dewi", &position).await;

        let res = app.delete(&routes::team(&id), &app.admin_token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(app.stored_keys().await.is_empty());
        assert_eq!(app.get(&routes::team(&id)).await.status, 404);
    }
}

mod positions {
    use super::*;

    #[tokio::test]
    async fn position_in_use_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let position = app.create_position("Koordinator").await;
        let member = create_member(&app, "Eka", &position).await;

        let listed = app.get_with_token(routes::POSITIONS, &app.admin_token).await;
        assert_eq!(listed.data()[0]["can_delete"], false);

        let res = app
            .delete(&routes::position(&position), &app.admin_token)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CONFLICT");

        app.delete(&routes::team(&member), &app.admin_token).await;
        let res = app
            .delete(&routes::position(&position), &app.admin_token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn rename_position() {
        let app = TestApp::spawn().await;
        let position = app.create_position("Wakil").await;

        let res = app
            .patch_json(
                &routes::position(&position),
                &json!({ "name": "Wakil Ketua" }),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["name"], "Wakil Ketua");
    }
}
