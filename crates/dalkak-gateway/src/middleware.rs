use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::{self, Identity};
use crate::error::ApiError;
use crate::state::AppState;

/// Extractor that authenticates via Bearer header, session lookup, or the
/// `?token=` query parameter.
pub struct Authenticated(pub Identity);

impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(auth::extract_bearer)
            .map(|s| s.to_string());

        let query = parts.uri.query().unwrap_or("");
        let query_token = auth::extract_token_from_query(query).map(|s| s.to_string());

        let state = state.clone();

        async move {
            auth::authenticate(
                &state.config,
                state.sessions.as_deref(),
                bearer.as_deref(),
                query_token.as_deref(),
            )
            .await
            .map(Authenticated)
            .ok_or_else(ApiError::unauthorized)
        }
    }
}
