use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    handler::Handler,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    adapters::http::{
        app_state::AppState,
        middleware::require_admin,
        routes::Envelope,
    },
    app_error::AppResult,
    use_cases::{auth::Requester, user::UpdateUserInput},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_users.layer(middleware::from_fn(require_admin))),
        )
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn list_users(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let users = app_state.user_use_cases.list().await?;
    Ok(Json(Envelope::data(users)))
}

async fn get_user(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user = app_state.user_use_cases.get(id, &requester).await?;
    Ok(Json(Envelope::data(user)))
}

async fn update_user(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<impl IntoResponse> {
    let user = app_state
        .user_use_cases
        .update(id, &requester, input)
        .await?;
    Ok(Json(Envelope::message_with_data(
        "User updated successfully",
        user,
    )))
}

async fn delete_user(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    app_state.user_use_cases.delete(id, &requester).await?;
    Ok(Json(Envelope::message("User deleted successfully")))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        adapters::http::routes,
        test_utils::{ADMIN_EMAIL, TestAppStateBuilder, create_test_user, test_token},
    };

    fn server(app_state: crate::adapters::http::app_state::AppState) -> TestServer {
        TestServer::new(routes::router(app_state)).unwrap()
    }

    #[tokio::test]
    async fn list_users_without_token_is_unauthorized() {
        let server = server(TestAppStateBuilder::new().build());

        server.get("/users").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_users_is_admin_only() {
        let user = create_test_user(|_| {});
        let token = test_token(user.id);
        let server = server(TestAppStateBuilder::new().with_user(user).build());

        let response = server.get("/users").authorization_bearer(&token).await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["error"], "Access denied. Admins only.");
    }

    #[tokio::test]
    async fn list_users_as_admin_excludes_password() {
        let admin = create_test_user(|u| u.email = ADMIN_EMAIL.into());
        let other = create_test_user(|u| u.email = "other@example.com".into());
        let token = test_token(admin.id);
        let server = server(
            TestAppStateBuilder::new()
                .with_user(admin)
                .with_user(other)
                .build(),
        );

        let response = server.get("/users").authorization_bearer(&token).await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let users = body["data"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        for user in users {
            assert!(user.get("password").is_none());
            assert!(user.get("passwordHash").is_none());
        }
    }

    #[tokio::test]
    async fn get_own_user_succeeds() {
        let user = create_test_user(|_| {});
        let token = test_token(user.id);
        let user_id = user.id;
        let server = server(TestAppStateBuilder::new().with_user(user).build());

        let response = server
            .get(&format!("/users/{user_id}"))
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["id"], user_id.to_string());
    }

    #[tokio::test]
    async fn get_other_user_is_forbidden_for_non_admin() {
        let user = create_test_user(|_| {});
        let other = create_test_user(|u| u.email = "other@example.com".into());
        let token = test_token(user.id);
        let other_id = other.id;
        let server = server(
            TestAppStateBuilder::new()
                .with_user(user)
                .with_user(other)
                .build(),
        );

        server
            .get(&format!("/users/{other_id}"))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_can_read_any_user() {
        let admin = create_test_user(|u| u.email = ADMIN_EMAIL.into());
        let other = create_test_user(|u| u.email = "other@example.com".into());
        let token = test_token(admin.id);
        let other_id = other.id;
        let server = server(
            TestAppStateBuilder::new()
                .with_user(admin)
                .with_user(other)
                .build(),
        );

        server
            .get(&format!("/users/{other_id}"))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn update_own_user_changes_name() {
        let user = create_test_user(|_| {});
        let token = test_token(user.id);
        let user_id = user.id;
        let server = server(TestAppStateBuilder::new().with_user(user).build());

        let response = server
            .put(&format!("/users/{user_id}"))
            .authorization_bearer(&token)
            .json(&json!({ "name": "New Name" }))
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["name"], "New Name");
    }

    #[tokio::test]
    async fn delete_own_user_succeeds() {
        let user = create_test_user(|_| {});
        let token = test_token(user.id);
        let user_id = user.id;
        let server = server(TestAppStateBuilder::new().with_user(user).build());

        let response = server
            .delete(&format!("/users/{user_id}"))
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
    }
}
