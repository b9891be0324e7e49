//! `Cookie` header parsing and `Set-Cookie` construction.

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;

/// Parse a `Cookie` header into name/value pairs.
///
/// Pairs are split on `;`, then on the first `=`. Names and values are
/// trimmed and values are percent-decoded. Fragments without `=` are skipped.
#[must_use]
pub fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = percent_decode_str(value.trim())
                .decode_utf8_lossy()
                .into_owned();
            Some((name.to_string(), value))
        })
        .collect()
}

/// Find the first cookie called `name` across any number of `Cookie` headers.
#[must_use]
pub fn find_cookie(headers: &[&str], name: &str) -> Option<String> {
    headers
        .iter()
        .flat_map(|header| parse_cookies(header))
        .find(|(candidate, _)| candidate == name)
        .map(|(_, value)| value)
}

/// Build the `Set-Cookie` value that installs a session.
#[must_use]
pub fn session_cookie(name: &str, token: &str, expires_at: DateTime<Utc>, max_age: u64) -> String {
    format!(
        "{name}={token}; Path=/; HttpOnly; SameSite=Lax; Expires={}; Max-Age={max_age}",
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// Build the `Set-Cookie` value that clears a session.
#[must_use]
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
