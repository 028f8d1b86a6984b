//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe the single POST a remote call makes, and its
//! response, as plain data. `CallCodec` builds `HttpRequest` values and
//! parses `HttpResponse` values without touching the network; a `Transport`
//! performs the actual round-trip. Keeping the codec pure makes every
//! classification rule testable from JSON vectors alone.

/// A POST request described as plain data.
///
/// Every remote call targets the same endpoint with the same method, so only
/// the URL, headers and body vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by a `Transport` after executing an `HttpRequest`, then passed
/// to `CallCodec::parse_result` for classification.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty when unknown.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
