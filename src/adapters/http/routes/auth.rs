use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, routes::Envelope},
    app_error::{AppError, AppResult},
    use_cases::user::UserProfile,
};

#[derive(Deserialize)]
struct SignUpPayload {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct SignInPayload {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct AuthData {
    token: String,
    user: UserProfile,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/sign-out", post(sign_out))
}

async fn sign_up(
    State(app_state): State<AppState>,
    Json(payload): Json<SignUpPayload>,
) -> AppResult<impl IntoResponse> {
    let (token, user) = app_state
        .auth_use_cases
        .sign_up(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::message_with_data(
            "User created successfully",
            AuthData { token, user },
        )),
    ))
}

async fn sign_in(
    State(app_state): State<AppState>,
    Json(payload): Json<SignInPayload>,
) -> AppResult<impl IntoResponse> {
    let (token, user) = app_state
        .auth_use_cases
        .sign_in(&payload.email, &payload.password)
        .await?;

    Ok(Json(Envelope::message_with_data(
        "User signed in successfully",
        AuthData { token, user },
    )))
}

/// Sign-out deliberately skips the Authorization Guard: an expired token must
/// still be revocable, so only the bearer header's presence is required.
async fn sign_out(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> AppResult<impl IntoResponse> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(AppError::Validation("No token provided".into()));
    };

    app_state.auth_use_cases.sign_out(bearer.token()).await?;

    Ok(Json(Envelope::message("User signed out successfully")))
}
