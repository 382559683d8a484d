//! Client tag extraction: User-Agent and originating address.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;

use warden_entity::session::ClientTag;

/// Who is on the other end of the request. Diagnostic only; never used
/// for authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo(pub ClientTag);

impl ClientInfo {
    /// Builds the tag from headers, falling back to the socket peer for
    /// the address.
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(String::from);

        let ip_address = forwarded.or_else(|| peer.map(|addr| addr.ip().to_string()));

        Self(ClientTag::new(user_agent, ip_address))
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_parts(&parts.headers, peer))
    }
}
