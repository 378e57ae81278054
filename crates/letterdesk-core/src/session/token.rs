//! `<uuid>.<signature>` session tokens, signed with HMAC-SHA256.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::SessionId;

type HmacSha256 = Hmac<Sha256>;

#[allow(clippy::expect_used)]
fn mac(secret: &str, id: &SessionId) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(id.as_str().as_bytes());
    mac
}

pub(super) fn sign(secret: &str, id: &SessionId) -> String {
    let tag = mac(secret, id).finalize().into_bytes();
    format!("{}.{}", id, URL_SAFE_NO_PAD.encode(tag))
}

pub(super) fn verify(secret: &str, token: &str) -> Option<SessionId> {
    let (raw_id, sig) = token.split_once('.')?;
    let id = SessionId::parse(raw_id)?;
    let provided = URL_SAFE_NO_PAD.decode(sig).ok()?;
    // verify_slice compares in constant time.
    mac(secret, &id).verify_slice(&provided).ok().map(|()| id)
}

/// Value of cookie `name` in a `Cookie` header.
pub(super) fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
}
