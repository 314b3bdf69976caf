//! Request context enrichment.
//!
//! # Responsibilities
//! - Assign the correlation id (`X-Request-Id` or a fresh UUID v4)
//! - Record the caller-declared IP (`X-Ip`)
//! - Resolve the client IP through the trusted proxy hops
//!
//! # Design Decisions
//! - Runs before routing so even rejected requests carry an id
//! - Header values are trusted as sent; no format validation
//! - The context is immutable once attached to the request

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

/// Header carrying an upstream correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";
/// Header carrying a caller-declared client IP.
pub const X_IP: &str = "x-ip";
/// Proxy chain header.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Fallback address when nothing better is known.
pub const UNKNOWN_IP: &str = "0.0.0.0";

/// Per-request identity shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation id echoed in logs and response bodies.
    pub request_id: String,
    /// IP declared by the caller through `X-Ip`.
    pub req_ip: String,
    /// IP resolved from the peer address and trusted proxy hops.
    pub client_ip: String,
}

impl RequestContext {
    /// Derive the context from request headers and the peer address.
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy_hops: usize) -> Self {
        let request_id = header_str(headers, X_REQUEST_ID)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let req_ip = header_str(headers, X_IP)
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        let client_ip = resolve_client_ip(headers, peer.map(|addr| addr.ip()), trust_proxy_hops)
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        Self {
            request_id,
            req_ip,
            client_ip,
        }
    }
}

/// Header value as text. Non-ASCII bytes are decoded lossily rather than
/// discarding the whole value.
fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Pick the client address out of `X-Forwarded-For` + peer.
///
/// The chain is read right to left starting at the peer; each trusted hop
/// moves one entry further left. Running out of entries yields the
/// leftmost one.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trust_proxy_hops: usize) -> Option<String> {
    let mut chain: Vec<String> = peer.map(|ip| ip.to_string()).into_iter().collect();

    if trust_proxy_hops > 0 {
        if let Some(forwarded) = header_str(headers, X_FORWARDED_FOR) {
            chain.extend(
                forwarded
                    .rsplit(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string),
            );
        }
    }

    // without a peer, the first forwarded entry already sits one hop away
    let index = if peer.is_some() { trust_proxy_hops } else { trust_proxy_hops.saturating_sub(1) };
    chain.get(index).or_else(|| chain.last()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn test_request_id_from_header() {
        let ctx = RequestContext::from_headers(&headers(&[("x-request-id", "abc")]), None, 1);
        assert_eq!(ctx.request_id, "abc");
    }

    #[test]
    fn test_non_ascii_request_id_kept() {
        let mut map = HeaderMap::new();
        map.insert("x-request-id", HeaderValue::from_bytes(b"req-\xe9").unwrap());
        let ctx = RequestContext::from_headers(&map, None, 1);
        assert_eq!(ctx.request_id, "req-\u{FFFD}");
    }

    #[test]
    fn test_request_id_generated_and_unique() {
        let a = RequestContext::from_headers(&HeaderMap::new(), None, 1);
        let b = RequestContext::from_headers(&HeaderMap::new(), None, 1);
        assert_ne!(a.request_id, b.request_id);
        assert!(uuid::Uuid::parse_str(&a.request_id).is_ok());
    }

    #[test]
    fn test_req_ip_header_or_default() {
        let ctx = RequestContext::from_headers(&headers(&[("x-ip", "10.1.1.1")]), None, 1);
        assert_eq!(ctx.req_ip, "10.1.1.1");

        let ctx = RequestContext::from_headers(&HeaderMap::new(), None, 1);
        assert_eq!(ctx.req_ip, "0.0.0.0");
        assert_eq!(ctx.client_ip, "0.0.0.0");
    }

    #[test]
    fn test_client_ip_trusts_one_hop() {
        let peer: IpAddr = "10.0.0.2".parse().unwrap();
        let h = headers(&[("x-forwarded-for", "1.1.1.1, 203.0.113.9")]);

        assert_eq!(resolve_client_ip(&h, Some(peer), 0).as_deref(), Some("10.0.0.2"));
        assert_eq!(resolve_client_ip(&h, Some(peer), 1).as_deref(), Some("203.0.113.9"));
        assert_eq!(resolve_client_ip(&h, Some(peer), 2).as_deref(), Some("1.1.1.1"));
        assert_eq!(resolve_client_ip(&h, Some(peer), 9).as_deref(), Some("1.1.1.1"));
    }

    #[test]
    fn test_client_ip_without_forwarded_header() {
        let peer: IpAddr = "192.168.1.5".parse().unwrap();
        assert_eq!(
            resolve_client_ip(&HeaderMap::new(), Some(peer), 1).as_deref(),
            Some("192.168.1.5")
        );
    }
}
