use serde_json::json;

use crate::common::{ACCESS_KEY, SUPERADMIN_ID, TestApp, routes};

mod keys {
    use super::*;

    #[tokio::test]
    async fn create_list_delete() {
        let app = TestApp::spawn().await;

        let created = app
            .post_json(
                routes::KEYS,
                &json!({ "access_key": ACCESS_KEY, "value": "kunci-baru" }),
                &app.superadmin_token,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        assert_eq!(created.data()["created_by"], SUPERADMIN_ID);
        let id = created.id();

        let listed = app
            .get_with_token(routes::KEYS, &app.superadmin_token)
            .await;
        assert_eq!(listed.data().as_array().unwrap().len(), 1);

        let deleted = app
            .delete_json(
                &routes::key(&id),
                &json!({ "access_key": ACCESS_KEY }),
                &app.superadmin_token,
            )
            .await;
        assert_eq!(deleted.status, 200, "{}", deleted.text);

        let missing = app
            .delete_json(
                &routes::key(&id),
                &json!({ "access_key": ACCESS_KEY }),
                &app.superadmin_token,
            )
            .await;
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn wrong_access_key_is_forbidden() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::KEYS,
                &json!({ "access_key": "tebakan", "value": "kunci" }),
                &app.superadmin_token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn plain_admin_is_denied() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::KEYS,
                &json!({ "access_key": ACCESS_KEY, "value": "kunci" }),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::KEYS, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_INVALID");
    }
}

mod admins {
    use super::*;

    async fn create_admin(app: &TestApp, fullname: &str) -> String {
        let res = app
            .post_json(
                routes::ADMINS,
                &json!({
                    "fullname": fullname,
                    "password": "rahasia-sekali",
                    "role": "admin",
                    "access_key": ACCESS_KEY,
                }),
                &app.superadmin_token,
            )
            .await;
        assert_eq!(res.status, 201, "create admin failed: {}", res.text);
        res.id()
    }

    #[tokio::test]
    async fn fullname_is_normalised_and_id_follows_role() {
        let app = TestApp::spawn().await;

        let id = create_admin(&app, "  bUDI   santoso ").await;

        assert!(id.starts_with("JPSA"), "{id}");
        assert!(!id.starts_with("JPSSA"), "{id}");
        let res = app
            .get_with_token(&routes::admin(&id), &app.superadmin_token)
            .await;
        assert_eq!(res.data()["fullname"], "Budi Santoso");
        assert!(res.data().get("password_hash").is_none());
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::ADMINS,
                &json!({
                    "fullname": "Siti",
                    "password": "pendek",
                    "role": "admin",
                    "access_key": ACCESS_KEY,
                }),
                &app.superadmin_token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn root_account_is_hidden() {
        let app = TestApp::spawn().await;

        let res = app
            .get_with_token(&routes::admin("JPSSA1"), &app.superadmin_token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn cannot_delete_self() {
        let app = TestApp::spawn().await;

        let res = app
            .delete(&routes::admin(SUPERADMIN_ID), &app.superadmin_token)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let app = TestApp::spawn().await;
        let id = create_admin(&app, "citra lestari").await;

        let updated = app
            .patch_json(
                &routes::admin(&id),
                &json!({ "role": "superadmin", "access_key": ACCESS_KEY }),
                &app.superadmin_token,
            )
            .await;
        assert_eq!(updated.status, 200, "{}", updated.text);
        assert_eq!(updated.data()["role"], "superadmin");

        let deleted = app
            .delete(&routes::admin(&id), &app.superadmin_token)
            .await;
        assert_eq!(deleted.status, 200);

        let listed = app
            .get_with_token(routes::ADMINS, &app.superadmin_token)
            .await;
        assert!(listed.data().as_array().unwrap().is_empty());
    }
}
