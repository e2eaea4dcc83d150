//! Per-IP rate limiting for the form endpoints using governor and
//! `tower_governor`.
//!
//! The relay runs behind a proxy, so the client IP comes from forwarding
//! headers first and the socket peer address only as a fallback.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Headers consulted for the client IP, in order.
const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Key extractor that reads the client IP from proxy headers.
///
/// `X-Forwarded-For` contributes its first (left-most) address. Without any
/// proxy header the peer address from `ConnectInfo` is used.
#[derive(Clone, Copy)]
pub struct ForwardedIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ForwardedIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ForwardedIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Seconds to refill one submission slot.
const REFILL_SECS: u64 = 6;

/// Submissions a single client may send back to back.
const BURST: u32 = 5;

/// Throttle `/api/send-rebate` and `/api/quote` per client IP.
///
/// Every accepted submission costs a SendGrid send and a Shopify write. A
/// visitor gets five quick submissions, then one more every six seconds.
///
/// # Panics
///
/// Only if `REFILL_SECS` or `BURST` is zero.
#[must_use]
pub fn form_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ForwardedIpKeyExtractor)
        .per_second(REFILL_SECS)
        .burst_size(BURST)
        .finish()
        .expect("non-zero refill period and burst size");
    GovernorLayer::new(Arc::new(config))
}
