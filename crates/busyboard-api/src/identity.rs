//! # Source Identity Resolution
//!
//! Resolves the submitting address from request headers with a fixed
//! precedence: `X-Forwarded-For` (whole value must parse as one
//! address), then `CF-Connecting-IP` (comma-separated list, first
//! parseable entry wins), then the socket peer address. The first value
//! that parses as a valid IP address is the identity used for rate
//! limiting and the trusted-network check.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;
use thiserror::Error;

/// No source address could be resolved. Treated as a server-side fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no valid source address found")]
pub struct NoIdentity;

/// Resolve the source identity for a request.
///
/// `remote` is the socket peer address when the listener provides one;
/// it is the last-resort fallback behind the proxy headers.
pub fn extract_source_identity(
    headers: &HeaderMap,
    remote: Option<SocketAddr>,
) -> Result<String, NoIdentity> {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        // The whole header value must be a single address; proxies that
        // append chains fall through to the next source.
        if forwarded.parse::<IpAddr>().is_ok() {
            return Ok(forwarded.to_string());
        }
    }

    if let Some(connecting) = header_str(headers, "cf-connecting-ip") {
        for candidate in connecting.split(',') {
            if candidate.parse::<IpAddr>().is_ok() {
                return Ok(candidate.to_string());
            }
        }
    }

    if let Some(addr) = remote {
        tracing::warn!("no proxy header resolved, using socket address");
        return Ok(addr.ip().to_string());
    }

    Err(NoIdentity)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
