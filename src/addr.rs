//! Target address normalization.

use url::Url;

use crate::error::ExtractError;

/// Turns a raw target string into a `host:port` address.
///
/// Accepts a bare hostname, a `host:port` pair, or a URL-like string:
///
/// - `example.com` becomes `example.com:443`
/// - `example.com:8443` is returned unchanged
/// - `https://example.com/path` becomes `example.com:443`
/// - `tcp://example.com:8443` becomes `example.com:8443`
///
/// A URL without an explicit port always falls back to `443`, whatever
/// its scheme. Pure string transformation; no name resolution happens
/// here. Only an empty (or all-whitespace) target is rejected.
pub fn normalize(target: &str) -> Result<String, ExtractError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(ExtractError::Address {
            target: target.to_string(),
            reason: "empty target".to_string(),
        });
    }

    // Bare hostname, no port and nothing URL-like about it.
    if !target.contains(':') {
        return Ok(format!("{target}:443"));
    }

    if let Ok(url) = Url::parse(target) {
        if let Some(host) = url.host_str() {
            if !host.is_empty() {
                let port = url.port().unwrap_or(443);
                return Ok(format!("{host}:{port}"));
            }
        }
    }

    // Either not a URL at all, or a bare `host:port` that the parser
    // read as `scheme:opaque`. Keep the string as-is when it already
    // ends in a port, otherwise inject the default.
    match target.rsplit_once(':') {
        Some((_, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
            Ok(target.to_string())
        }
        _ => Ok(format!("{target}:443")),
    }
}
