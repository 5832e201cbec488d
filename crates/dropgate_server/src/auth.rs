use crate::state::AdminState;
use dropgate_core::prelude::*;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use subtle::ConstantTimeEq;

/// A wrapper struct indicating a request has been authenticated.
#[derive(Clone, Debug)]
pub struct AuthenticatedAdmin(pub AdminUser);

impl<S, A> FromRequestParts<AdminState<S, A>> for AuthenticatedAdmin
where
    S: ObjectStore,
    A: AdminAuth,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AdminState<S, A>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|auth_header| {
                auth_header
                    .to_str()
                    .map(|header_str| {
                        header_str
                            .strip_prefix("Bearer ")
                            .unwrap_or(header_str)
                            .trim()
                    })
                    .ok()
            })
            .unwrap_or("");

        match state.auth.verify(token).await {
            Ok(admin) => Ok(AuthenticatedAdmin(admin)),
            Err(_) => Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string())),
        }
    }
}

/// Shared-secret admin auth: one configured bearer token, one identity.
/// Stands in for whatever session mechanism fronts the admin surface in a
/// larger deployment.
#[derive(Clone)]
pub struct StaticTokenAuth {
    token: String,
    admin_id: String,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>, admin_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            admin_id: admin_id.into(),
        }
    }
}

impl AdminAuth for StaticTokenAuth {
    async fn verify(&self, token: &str) -> Result<AdminUser, AuthError> {
        if token.as_bytes().ct_eq(self.token.as_bytes()).into() {
            Ok(AdminUser {
                id: self.admin_id.clone(),
            })
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}
