use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};
use rolegate_application::RequestContext;

use crate::state::AppState;

/// Where the client address used for rate limiting and auth events comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientAddressSource {
    /// The TCP peer. Forwarding headers are ignored.
    #[default]
    Peer,
    /// The last `x-forwarded-for` hop, which the reverse proxy in front of
    /// the API appends. Earlier hops are client-supplied.
    TrustedProxy,
}

/// Caller metadata for auth events and rate limiting.
pub struct ClientContext(pub RequestContext);

impl FromRequestParts<AppState> for ClientContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(client_context(
            &parts.headers,
            &parts.extensions,
            state.client_address_source,
        )))
    }
}

/// Resolves the context from request headers and the `ConnectInfo` extension.
pub fn client_context(
    headers: &HeaderMap,
    extensions: &Extensions,
    source: ClientAddressSource,
) -> RequestContext {
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| *address);
    request_context(headers, peer, source)
}

pub fn request_context(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    source: ClientAddressSource,
) -> RequestContext {
    let forwarded = match source {
        ClientAddressSource::Peer => None,
        ClientAddressSource::TrustedProxy => headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.rsplit(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned),
    };
    let ip_address = forwarded.or_else(|| peer.map(|address| address.ip().to_string()));

    let user_agent = headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    RequestContext {
        ip_address,
        user_agent,
    }
}
