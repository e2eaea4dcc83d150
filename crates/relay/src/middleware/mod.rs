//! HTTP middleware for the relay.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. Panic catcher (JSON 500)
//! 3. CORS
//! 4. `TraceLayer` (request span)
//! 5. Request ID (recorded into the span)
//! 6. Rate limiting on the form routes (governor)

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{RateLimiterLayer, form_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
