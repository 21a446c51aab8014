//! Helpers for sanitizing data before it enters logs, span attributes or
//! the stored source error text.
//!
//! Request URLs carry API keys as query parameters; these functions make
//! sure they never leave the process.

use url::Url;

/// Query parameters whose values are always masked.
const SECRET_PARAMS: &[&str] = &["key", "api_key", "apikey", "token", "access_token"];

/// Maximum length for response bodies quoted in errors.
const MAX_BODY_LENGTH: usize = 200;

/// Masks secret query parameters and userinfo in a URL.
///
/// - `https://maps.example/geocode?address=x&key=abc` → `https://maps.example/geocode?address=x&key=****`
/// - `https://user:pw@host/path` → `https://****@host/path`
///
/// Unparseable input is returned as `<invalid url>` since it may contain
/// anything.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return "<invalid url>".to_string();
    };

    let had_userinfo = !url.username().is_empty() || url.password().is_some();
    if had_userinfo {
        let _ = url.set_username("");
        let _ = url.set_password(None);
    }

    if url.query().is_some() {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let masked = SECRET_PARAMS.contains(&k.to_ascii_lowercase().as_str());
                (k.into_owned(), if masked { "****".to_string() } else { v.into_owned() })
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    let out = url.to_string();
    if had_userinfo {
        if let Some(scheme_end) = out.find("://") {
            return format!("{}****@{}", &out[..scheme_end + 3], &out[scheme_end + 3..]);
        }
    }
    out
}

/// Removes every occurrence of `secret` from `text`.
///
/// Transport errors from reqwest embed the full request URL, key included.
pub fn scrub_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, "****")
}

/// Truncates a response body to a length that is safe to log.
pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
