//! Where credentials travel on a request.
//!
//! The gate does not care whether the principal and token came from custom
//! headers or from cookies; each transport only knows how to pull the pair out.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use axum_extra::extract::cookie::Cookie;
use serde::Deserialize;

pub const USER_HEADER: &str = "x-auth-user";
pub const TOKEN_HEADER: &str = "x-auth-token";
pub const USER_COOKIE: &str = "dialogue_user";
pub const TOKEN_COOKIE: &str = "dialogue_token";

/// Principal and token as presented by the client, not yet verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

/// Header values are raw bytes; usernames may be any UTF-8, not only visible
/// ASCII, so decode them as UTF-8 rather than with `HeaderValue::to_str`.
fn header_text(value: &HeaderValue) -> Option<&str> {
    std::str::from_utf8(value.as_bytes()).ok()
}

pub trait CredentialTransport: Send + Sync {
    /// Both fields must be present and non-empty, otherwise `None`.
    fn extract(&self, headers: &HeaderMap) -> Option<Credentials>;

    fn name(&self) -> &'static str;
}

/// `X-Auth-User` / `X-Auth-Token`
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderTransport;

impl CredentialTransport for HeaderTransport {
    fn extract(&self, headers: &HeaderMap) -> Option<Credentials> {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(header_text)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Credentials {
            username: read(USER_HEADER)?,
            token: read(TOKEN_HEADER)?,
        })
    }

    fn name(&self) -> &'static str {
        "header"
    }
}

/// `dialogue_user` / `dialogue_token` cookies
#[derive(Debug, Default, Clone, Copy)]
pub struct CookieTransport;

impl CredentialTransport for CookieTransport {
    fn extract(&self, headers: &HeaderMap) -> Option<Credentials> {
        let cookies: Vec<Cookie<'static>> = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(header_text)
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| Cookie::parse_encoded(pair.trim().to_owned()).ok())
            .collect();

        let read = |name: &str| {
            cookies
                .iter()
                .find(|c| c.name() == name)
                .map(|c| c.value().to_string())
                .filter(|s| !s.is_empty())
        };

        Some(Credentials {
            username: read(USER_COOKIE)?,
            token: read(TOKEN_COOKIE)?,
        })
    }

    fn name(&self) -> &'static str {
        "cookie"
    }
}

/// 凭据传输方式（配置项 security.credential_transport）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Header,
    Cookie,
}

impl TransportKind {
    pub fn build(self) -> Box<dyn CredentialTransport> {
        match self {
            TransportKind::Header => Box::new(HeaderTransport),
            TransportKind::Cookie => Box::new(CookieTransport),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_transport_reads_both_fields() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, "alice".parse().unwrap());
        headers.insert(TOKEN_HEADER, "abc123".parse().unwrap());

        let creds = HeaderTransport.extract(&headers).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.token, "abc123");
    }

    #[test]
    fn test_header_transport_requires_both_fields() {
        let mut headers = HeaderMap::new();
        assert!(HeaderTransport.extract(&headers).is_none());

        headers.insert(USER_HEADER, "alice".parse().unwrap());
        assert!(HeaderTransport.extract(&headers).is_none());

        headers.insert(TOKEN_HEADER, "".parse().unwrap());
        assert!(HeaderTransport.extract(&headers).is_none());
    }

    #[test]
    fn test_cookie_transport() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            "theme=dark; dialogue_user=bob; dialogue_token=t0k3n".parse().unwrap(),
        );

        let creds = CookieTransport.extract(&headers).unwrap();
        assert_eq!(creds.username, "bob");
        assert_eq!(creds.token, "t0k3n");

        // Custom headers are ignored by the cookie transport
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, "bob".parse().unwrap());
        headers.insert(TOKEN_HEADER, "t0k3n".parse().unwrap());
        assert!(CookieTransport.extract(&headers).is_none());
    }

    #[test]
    fn test_non_ascii_username() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_bytes("josé".as_bytes()).unwrap());
        headers.insert(TOKEN_HEADER, "abc123".parse().unwrap());

        let creds = HeaderTransport.extract(&headers).unwrap();
        assert_eq!(creds.username, "josé");

        // Raw UTF-8 and percent-encoded cookie values both decode
        for cookie in ["dialogue_user=josé; dialogue_token=t1", "dialogue_user=jos%C3%A9; dialogue_token=t1"] {
            let mut headers = HeaderMap::new();
            headers.insert(COOKIE, HeaderValue::from_bytes(cookie.as_bytes()).unwrap());
            let creds = CookieTransport.extract(&headers).unwrap();
            assert_eq!(creds.username, "josé");
        }
    }

    #[test]
    fn test_transport_kind_builds_matching_transport() {
        assert_eq!(TransportKind::Header.build().name(), "header");
        assert_eq!(TransportKind::Cookie.build().name(), "cookie");
    }

    #[test]
    fn test_invalid_utf8_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        headers.insert(TOKEN_HEADER, "abc123".parse().unwrap());
        assert!(HeaderTransport.extract(&headers).is_none());
    }
}
