use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Extension, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppError,
    use_cases::auth::Requester,
};

/// Authorization Guard: bearer token -> verify -> revocation check -> user
/// lookup. On success the resolved `Requester` is attached to the request
/// extensions; every failure collapses to 401.
pub async fn authorize(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(AppError::unauthorized());
    };

    let requester = app_state.auth_use_cases.authenticate(bearer.token()).await?;
    request.extensions_mut().insert(requester);

    Ok(next.run(request).await)
}

/// Admin guard. Runs only on an already-authorized context (layered inside
/// `authorize`), so the `Requester` extension is always present.
pub async fn require_admin(
    Extension(requester): Extension<Requester>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !requester.is_admin {
        return Err(AppError::Forbidden("Access denied. Admins only.".into()));
    }
    Ok(next.run(request).await)
}

pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Only trust forwarded headers if explicitly configured (when behind a reverse proxy)
    let ip = if app_state.config.trust_proxy {
        forwarded_ip(&request).unwrap_or_else(|| addr.ip().to_string())
    } else {
        addr.ip().to_string()
    };

    tracing::debug!(
        trust_proxy = app_state.config.trust_proxy,
        connect_ip = %addr.ip(),
        forwarded_ip = ?forwarded_ip(&request),
        using_ip = %ip,
        "Rate limiting request"
    );

    app_state.rate_limiter.check(&ip).await?;

    Ok(next.run(request).await)
}

fn forwarded_ip(req: &Request) -> Option<String> {
    // Extract IP from X-Forwarded-For or X-Real-IP headers
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(real) = req.headers().get("x-real-ip")
        && let Ok(val) = real.to_str()
        && !val.trim().is_empty()
    {
        return Some(val.trim().to_string());
    }
    None
}
