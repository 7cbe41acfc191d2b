use std::sync::Arc;

use axum::{
    extract::State,
    http::{self, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::{error::ApiError, model::User, store, token, AppState};

// Bearer-auth middleware: resolves the token to a full user record and
// stashes it as a request extension for the handlers behind it.
pub async fn mw_require_auth<B>(
    State(state): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, ApiError> {
    let bearer = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "));

    let user = match bearer {
        Some(token) => resolve(&state, token).await?,
        None => {
            tracing::debug!("request without a bearer credential");
            return Err(ApiError::Unauthenticated);
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Every rejection collapses to the same 401; the cause is only logged, so
// callers can't probe which check failed.
async fn resolve(state: &AppState, token: &str) -> Result<User, ApiError> {
    let subject = match token::verify(&state.keys, token, Utc::now()) {
        Ok(subject) => subject,
        Err(err) => {
            tracing::debug!(error = %err, "token rejected");
            return Err(ApiError::Unauthenticated);
        }
    };

    // The token can outlive its account; a structurally valid token whose
    // subject is gone resolves to nothing.
    match store::find_user_by_username(&state.db, &subject).await? {
        Some(user) => Ok(user),
        None => {
            tracing::debug!(%subject, "token subject no longer exists");
            Err(ApiError::Unauthenticated)
        }
    }
}
