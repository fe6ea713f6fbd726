use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    handler::Handler,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    adapters::http::{
        app_state::AppState,
        middleware::require_admin,
        routes::Envelope,
    },
    app_error::AppResult,
    use_cases::{
        auth::Requester,
        subscription::{CreateSubscriptionInput, SubscriptionPatch},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(all_subscriptions.layer(middleware::from_fn(require_admin)))
                .post(create_subscription),
        )
        .route("/upcoming-renewals", get(upcoming_renewals))
        .route("/user/{id}", get(user_subscriptions))
        .route(
            "/{id}",
            get(subscription_details)
                .put(update_subscription)
                .delete(delete_subscription),
        )
        .route("/{id}/cancel", put(cancel_subscription))
}

// Only admins may list every subscription; the guard layered on the route
// enforces it.
async fn all_subscriptions(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let subscriptions = app_state.subscription_use_cases.list_all().await?;
    Ok(Json(Envelope::data(subscriptions)))
}

async fn create_subscription(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Json(input): Json<CreateSubscriptionInput>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state
        .subscription_use_cases
        .create(requester.id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(Envelope::data(subscription))))
}

async fn subscription_details(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state
        .subscription_use_cases
        .get(id, &requester)
        .await?;
    Ok(Json(Envelope::data(subscription)))
}

async fn update_subscription(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
    Json(patch): Json<SubscriptionPatch>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state
        .subscription_use_cases
        .update(id, &requester, patch)
        .await?;
    Ok(Json(Envelope::message_with_data(
        "Subscription updated successfully",
        subscription,
    )))
}

async fn delete_subscription(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    app_state
        .subscription_use_cases
        .delete(id, &requester)
        .await?;
    Ok(Json(Envelope::message("Subscription deleted successfully")))
}

async fn cancel_subscription(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state
        .subscription_use_cases
        .cancel(id, &requester)
        .await?;
    Ok(Json(Envelope::message_with_data(
        "Subscription cancelled successfully",
        subscription,
    )))
}

async fn upcoming_renewals(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> AppResult<impl IntoResponse> {
    let subscriptions = app_state
        .subscription_use_cases
        .list_upcoming_renewals(&requester)
        .await?;
    Ok(Json(Envelope::data(subscriptions)))
}

async fn user_subscriptions(
    State(app_state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let subscriptions = app_state
        .subscription_use_cases
        .list_for_user(id, &requester)
        .await?;
    Ok(Json(Envelope::data(subscriptions)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};

    use crate::{
        adapters::http::routes,
        test_utils::{
            ADMIN_EMAIL, TestAppStateBuilder, create_test_subscription, create_test_user,
            test_token,
        },
    };

    fn server(app_state: crate::adapters::http::app_state::AppState) -> TestServer {
        TestServer::new(routes::router(app_state)).unwrap()
    }

    fn create_payload() -> Value {
        json!({
            "name": "Netflix",
            "price": 15.99,
            "frequency": "monthly",
            "category": "entertainment",
            "paymentMethod": "Credit Card",
            "startDate": (Utc::now() - Duration::days(1)).to_rfc3339(),
        })
    }

    #[tokio::test]
    async fn create_requires_authentication() {
        let server = server(TestAppStateBuilder::new().build());

        server
            .post("/subscriptions")
            .json(&create_payload())
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_persists_and_triggers_reminder() {
        let user = create_test_user(|_| {});
        let token = test_token(user.id);
        let (app_state, _, scheduler) = TestAppStateBuilder::new()
            .with_user(user)
            .build_with_mocks();
        let server = server(app_state);

        let response = server
            .post("/subscriptions")
            .authorization_bearer(&token)
            .json(&create_payload())
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "active");
        // renewalDate was derived: 30 days after startDate
        assert!(body["data"]["renewalDate"].is_string());

        let created_id: uuid::Uuid =
            body["data"]["id"].as_str().unwrap().parse().unwrap();
        assert_eq!(scheduler.triggered(), vec![created_id]);
    }

    #[tokio::test]
    async fn create_with_unknown_frequency_is_rejected() {
        let user = create_test_user(|_| {});
        let token = test_token(user.id);
        let server = server(TestAppStateBuilder::new().with_user(user).build());

        let mut payload = create_payload();
        payload["frequency"] = json!("fortnightly");

        let response = server
            .post("/subscriptions")
            .authorization_bearer(&token)
            .json(&payload)
            .await;

        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn foreign_subscription_is_forbidden_with_envelope() {
        let owner = create_test_user(|_| {});
        let stranger = create_test_user(|u| u.email = "stranger@example.com".into());
        let subscription = create_test_subscription(owner.id, |_| {});
        let sub_id = subscription.id;
        let token = test_token(stranger.id);
        let server = server(
            TestAppStateBuilder::new()
                .with_user(owner)
                .with_user(stranger)
                .with_subscription(subscription)
                .build(),
        );

        let response = server
            .get(&format!("/subscriptions/{sub_id}"))
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "You are not authorized to view this subscription"
        );
    }

    #[tokio::test]
    async fn owner_reads_own_subscription() {
        let owner = create_test_user(|_| {});
        let subscription = create_test_subscription(owner.id, |_| {});
        let sub_id = subscription.id;
        let token = test_token(owner.id);
        let server = server(
            TestAppStateBuilder::new()
                .with_user(owner)
                .with_subscription(subscription)
                .build(),
        );

        let response = server
            .get(&format!("/subscriptions/{sub_id}"))
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["id"], sub_id.to_string());
    }

    #[tokio::test]
    async fn unknown_subscription_is_not_found() {
        let user = create_test_user(|_| {});
        let token = test_token(user.id);
        let server = server(TestAppStateBuilder::new().with_user(user).build());

        server
            .get(&format!("/subscriptions/{}", uuid::Uuid::new_v4()))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_all_is_admin_only() {
        let user = create_test_user(|_| {});
        let admin = create_test_user(|u| u.email = ADMIN_EMAIL.into());
        let user_token = test_token(user.id);
        let admin_token = test_token(admin.id);
        let subscription = create_test_subscription(user.id, |_| {});
        let server = server(
            TestAppStateBuilder::new()
                .with_user(user)
                .with_user(admin)
                .with_subscription(subscription)
                .build(),
        );

        server
            .get("/subscriptions")
            .authorization_bearer(&user_token)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = server
            .get("/subscriptions")
            .authorization_bearer(&admin_token)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_renewal_before_start() {
        let owner = create_test_user(|_| {});
        let subscription = create_test_subscription(owner.id, |_| {});
        let sub_id = subscription.id;
        let bad_renewal = (subscription.start_date - Duration::days(1)).to_rfc3339();
        let token = test_token(owner.id);
        let server = server(
            TestAppStateBuilder::new()
                .with_user(owner)
                .with_subscription(subscription)
                .build(),
        );

        let response = server
            .put(&format!("/subscriptions/{sub_id}"))
            .authorization_bearer(&token)
            .json(&json!({ "renewalDate": bad_renewal }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn cancel_marks_subscription_cancelled() {
        let owner = create_test_user(|_| {});
        let subscription = create_test_subscription(owner.id, |_| {});
        let sub_id = subscription.id;
        let token = test_token(owner.id);
        let server = server(
            TestAppStateBuilder::new()
                .with_user(owner)
                .with_subscription(subscription)
                .build(),
        );

        let response = server
            .put(&format!("/subscriptions/{sub_id}/cancel"))
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "cancelled");
        assert!(body["data"]["cancellationDate"].is_string());
    }

    #[tokio::test]
    async fn delete_removes_subscription() {
        let owner = create_test_user(|_| {});
        let subscription = create_test_subscription(owner.id, |_| {});
        let sub_id = subscription.id;
        let token = test_token(owner.id);
        let server = server(
            TestAppStateBuilder::new()
                .with_user(owner)
                .with_subscription(subscription)
                .build(),
        );

        server
            .delete(&format!("/subscriptions/{sub_id}"))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::OK);

        server
            .get(&format!("/subscriptions/{sub_id}"))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upcoming_renewals_scopes_to_owner() {
        let owner = create_test_user(|_| {});
        let other = create_test_user(|u| u.email = "other@example.com".into());
        let mine = create_test_subscription(owner.id, |s| {
            s.renewal_date = Utc::now() + Duration::days(3);
        });
        let theirs = create_test_subscription(other.id, |s| {
            s.renewal_date = Utc::now() + Duration::days(3);
        });
        let token = test_token(owner.id);
        let mine_id = mine.id;
        let server = server(
            TestAppStateBuilder::new()
                .with_user(owner)
                .with_user(other)
                .with_subscription(mine)
                .with_subscription(theirs)
                .build(),
        );

        let response = server
            .get("/subscriptions/upcoming-renewals")
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let listed = body["data"].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], mine_id.to_string());
    }

    #[tokio::test]
    async fn user_subscriptions_require_self_or_admin() {
        let owner = create_test_user(|_| {});
        let stranger = create_test_user(|u| u.email = "stranger@example.com".into());
        let subscription = create_test_subscription(owner.id, |_| {});
        let owner_id = owner.id;
        let owner_token = test_token(owner.id);
        let stranger_token = test_token(stranger.id);
        let server = server(
            TestAppStateBuilder::new()
                .with_user(owner)
                .with_user(stranger)
                .with_subscription(subscription)
                .build(),
        );

        server
            .get(&format!("/subscriptions/user/{owner_id}"))
            .authorization_bearer(&owner_token)
            .await
            .assert_status(StatusCode::OK);

        server
            .get(&format!("/subscriptions/user/{owner_id}"))
            .authorization_bearer(&stranger_token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
