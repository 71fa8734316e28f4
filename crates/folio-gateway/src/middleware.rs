//! Gateway middleware: client identification and request throttling.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};

use folio_core::types::ClientIdentity;

use crate::response::ApiError;
use crate::server::GatewayState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Extractor yielding the caller's [`ClientIdentity`].
///
/// Prefers the first `X-Forwarded-For` entry, then the peer address from
/// `ConnectInfo`, then `unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub ClientIdentity);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts.extensions.get::<ConnectInfo<SocketAddr>>();
        Ok(Self(client_identity(&parts.headers, peer)))
    }
}

fn client_identity(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> ClientIdentity {
    let forwarded = headers.get(FORWARDED_FOR).and_then(|v| v.to_str().ok());
    ClientIdentity::resolve(forwarded, peer.map(|ConnectInfo(addr)| addr.ip()))
}

/// Per-client request throttle for the API routes.
pub struct RequestThrottle {
    limiter: RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>,
}

impl RequestThrottle {
    /// Allow `requests_per_minute` requests per client, with an equal burst.
    #[must_use]
    pub fn per_minute(requests_per_minute: NonZeroU32) -> Self {
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(requests_per_minute)),
        }
    }

    /// Build from a configured quota; 0 disables throttling.
    #[must_use]
    pub fn from_quota(requests_per_minute: u32) -> Option<Self> {
        NonZeroU32::new(requests_per_minute).map(Self::per_minute)
    }

    /// Check if a request is allowed.
    #[must_use]
    pub fn check(&self, identity: &ClientIdentity) -> bool {
        self.limiter.check_key(&identity.0).is_ok()
    }

    /// Forget clients whose quota has fully replenished.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }

    /// Number of clients currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.limiter.len()
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle").finish_non_exhaustive()
    }
}

/// Reject callers that exceed the request throttle.
pub(crate) async fn throttle_requests(
    State(state): State<Arc<GatewayState>>,
    ClientAddr(identity): ClientAddr,
    request: Request,
    next: Next,
) -> Response {
    if let Some(throttle) = &state.throttle {
        if !throttle.check(&identity) {
            tracing::warn!(client = %identity, path = %request.uri().path(), "Request throttled");
            return ApiError::Throttled.into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::time::Duration;

    #[test]
    fn test_identity_from_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        let peer = ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000)));

        assert_eq!(
            client_identity(&headers, Some(&peer)),
            ClientIdentity::new("203.0.113.9")
        );
    }

    #[test]
    fn test_identity_from_peer() {
        let headers = HeaderMap::new();
        let peer = ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 40000)));

        assert_eq!(client_identity(&headers, Some(&peer)).as_ref(), "192.0.2.4");
        assert_eq!(client_identity(&headers, None), ClientIdentity::unknown());
    }

    #[test]
    fn test_throttle_quota() {
        let throttle = RequestThrottle::from_quota(2).unwrap();
        let a = ClientIdentity::new("a");
        let b = ClientIdentity::new("b");

        assert!(throttle.check(&a));
        assert!(throttle.check(&a));
        assert!(!throttle.check(&a));
        assert!(throttle.check(&b));

        assert!(RequestThrottle::from_quota(0).is_none());
    }

    #[test]
    fn test_throttle_forgets_idle_clients() {
        let quota = Quota::with_period(Duration::from_millis(1)).unwrap();
        let throttle = RequestThrottle {
            limiter: RateLimiter::keyed(quota),
        };
        assert!(throttle.check(&ClientIdentity::new("a")));
        assert!(throttle.check(&ClientIdentity::new("b")));
        assert_eq!(throttle.tracked(), 2);

        std::thread::sleep(Duration::from_millis(20));
        throttle.retain_recent();
        assert_eq!(throttle.tracked(), 0);
    }
}
