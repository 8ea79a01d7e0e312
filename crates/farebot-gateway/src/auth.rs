// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication middleware for the admin gateway.
//!
//! A single shared token is accepted either as an `x-admin-token` header or
//! an `adminToken` query parameter. When no token is configured, all
//! requests are rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use percent_encoding::percent_decode_str;

/// Authentication configuration for the admin surface.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected admin token. `None` disables the whole admin surface.
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware that validates the admin token.
///
/// The header is checked first; the query parameter exists for tools that
/// cannot set headers.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = auth.admin_token.as_deref() else {
        tracing::error!("gateway has no admin token configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let header_token = request
        .headers()
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok());
    if header_token == Some(expected) {
        return Ok(next.run(request).await);
    }

    if let Some(query) = request.uri().query() {
        if query_param_token(query).as_deref() == Some(expected) {
            return Ok(next.run(request).await);
        }
    }

    Err(StatusCode::UNAUTHORIZED)
}

/// Extract and percent-decode the `adminToken` query parameter. `+` decodes
/// to a space, as form-encoding clients send it.
fn query_param_token(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let raw = pair.strip_prefix("adminToken=")?;
        percent_decode_str(&raw.replace('+', " "))
            .decode_utf8()
            .ok()
            .map(|decoded| decoded.into_owned())
    })
}
