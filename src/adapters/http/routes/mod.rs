pub mod auth;
pub mod subscription;
pub mod user;

use axum::{Router, middleware};
use serde::Serialize;

use crate::adapters::http::{app_state::AppState, middleware::authorize};

/// The response envelope every endpoint speaks: `{success, message?, data?}`
/// on the happy path, `{success:false, error}` from the error mapper.
#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn message_with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

pub fn router(app_state: AppState) -> Router {
    let users = user::router().route_layer(middleware::from_fn_with_state(
        app_state.clone(),
        authorize,
    ));
    let subscriptions = subscription::router().route_layer(middleware::from_fn_with_state(
        app_state.clone(),
        authorize,
    ));

    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users)
        .nest("/subscriptions", subscriptions)
        .with_state(app_state)
}
