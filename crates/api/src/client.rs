//! Requester identity for the client-facing endpoints.
//!
//! The SMS-verification gateway in front of this service authenticates
//! clients and forwards the verified phone number in the
//! `X-Client-Phone` header. Handlers that act on behalf of a client
//! extract it with [`ClientPhone`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

pub const CLIENT_PHONE_HEADER: &str = "x-client-phone";

/// The verified phone number of the requesting client.
#[derive(Debug, Clone)]
pub struct ClientPhone(pub String);

impl<S> FromRequestParts<S> for ClientPhone
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let phone = parts
            .headers
            .get(CLIENT_PHONE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::BadRequest(format!("missing {CLIENT_PHONE_HEADER} header"))
            })?;
        Ok(ClientPhone(phone.to_string()))
    }
}
