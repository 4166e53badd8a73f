//! Client address extraction and normalization.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Key used when no client address is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Headers consulted, in order, before falling back to the peer address.
const CLIENT_IP_HEADERS: [&str; 5] = [
    "x-client-ip",
    "x-forwarded-for",
    "cf-connecting-ip",
    "true-client-ip",
    "x-real-ip",
];

/// The caller's address as reported by proxy headers or the socket.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    for name in CLIENT_IP_HEADERS {
        let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) else {
            continue;
        };
        // x-forwarded-for lists the originating client first
        let candidate = value.split(',').next().unwrap_or_default().trim();
        if candidate.parse::<IpAddr>().is_ok() {
            return Some(candidate.to_string());
        }
    }
    peer.map(|addr| addr.ip().to_string())
}

/// Stable rate-limit and logging key for a client address.
///
/// Strips the IPv4-mapped IPv6 prefix, maps `::1` to `127.0.0.1`, and drops
/// a trailing all-digit group from IPv6-looking addresses of four or more
/// groups.
pub fn normalize_client_ip(ip: Option<&str>) -> String {
    let Some(ip) = ip.map(str::trim).filter(|ip| !ip.is_empty()) else {
        return UNKNOWN_CLIENT.to_string();
    };

    let mut cleaned = ip.strip_prefix("::ffff:").unwrap_or(ip).to_string();
    if cleaned == "::1" {
        cleaned = "127.0.0.1".to_string();
    }

    if cleaned.contains(':') {
        let parts: Vec<&str> = cleaned.split(':').collect();
        if let Some((last, rest)) = parts.split_last() {
            if parts.len() >= 4 && !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
                cleaned = rest.join(":");
            }
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_normalize_mapped_and_loopback() {
        assert_eq!(normalize_client_ip(Some("::ffff:192.0.2.1")), "192.0.2.1");
        assert_eq!(normalize_client_ip(Some("::1")), "127.0.0.1");
        assert_eq!(normalize_client_ip(Some("203.0.113.9")), "203.0.113.9");
        assert_eq!(normalize_client_ip(None), "unknown");
        assert_eq!(normalize_client_ip(Some("  ")), "unknown");
    }

    #[test]
    fn test_normalize_truncates_trailing_numeric_group() {
        assert_eq!(
            normalize_client_ip(Some("2001:db8:85a3:8d3:1319:8a2e:370:7348")),
            "2001:db8:85a3:8d3:1319:8a2e:370"
        );
        // Last group has hex letters
        assert_eq!(
            normalize_client_ip(Some("2001:db8:85a3:8d3:1319:8a2e:370:73af")),
            "2001:db8:85a3:8d3:1319:8a2e:370:73af"
        );
        // Fewer than four groups
        assert_eq!(normalize_client_ip(Some("fe80::1")), "fe80::1");
    }

    #[test]
    fn test_client_ip_prefers_forwarding_headers() {
        let peer: SocketAddr = "10.0.0.2:4000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("10.0.0.2"));

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        );
        assert_eq!(
            client_ip(&headers, Some(peer)).as_deref(),
            Some("203.0.113.5")
        );

        headers.insert("x-client-ip", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(
            client_ip(&headers, Some(peer)).as_deref(),
            Some("198.51.100.1")
        );
    }

    #[test]
    fn test_client_ip_skips_invalid_header_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("not-an-ip"));
        assert!(client_ip(&headers, None).is_none());
    }
}
