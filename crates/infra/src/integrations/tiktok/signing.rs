//! Request signing for the TikTok Shop partner API.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sign a request per the partner API scheme.
///
/// The string to sign is `METHOD\npath\nquery\ntimestamp\nbody` where
/// `query` is the request's query parameters (excluding `sign`) sorted
/// by key and URL-encoded. The signature is the hex HMAC-SHA256 under
/// the app secret.
pub fn sign_request(
    secret: &str,
    method: &str,
    path: &str,
    params: &[(String, String)],
    timestamp_ms: i64,
    body: &str,
) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let query: String = sorted
        .iter()
        .map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&");

    let string_to_sign = format!("{method}\n{path}\n{query}\n{timestamp_ms}\n{body}");

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(string_to_sign.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
