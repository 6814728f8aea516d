use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::web::{AppState, error::AppError};

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Resolves the console token on every request and attaches the caller's
/// [`ConsoleIdentity`](crate::web::models::ConsoleIdentity).
pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    // Try to get token from Authorization header first, then fall back to cookie
    let token = bearer_token(req.headers())
        .map(str::to_string)
        .or_else(|| jar.get("token").map(|c| c.value().to_string()));

    let identity = state.identity_resolver.resolve(token.as_deref()).await?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Guards the bot-facing endpoints with the configured shared token, if any.
pub async fn bot_auth(
    State(state): State<Arc<AppState>>,
    req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.config.bot_access_token.as_deref() {
        match bearer_token(req.headers()) {
            Some(token) if token == expected => {}
            Some(_) => return Err(AppError::TokenNotFound),
            None => return Err(AppError::Unauthenticated),
        }
    }
    Ok(next.run(req).await)
}
