//! Browser sessions.
//!
//! A session is an opaque signed token in a cookie. It is used as the
//! rate-limit identity fallback and to redisplay previously entered field
//! values across the letter pages. It is not an authentication mechanism.

mod token;


use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use letterdesk_types::models::SessionConfig;
use letterdesk_types::{LetterFields, LetterKind};

use crate::store::KvStore;

/// Random per-browser identifier (UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accept only well-formed UUIDs so arbitrary cookie text never becomes a store key.
    pub fn parse(raw: &str) -> Option<Self> {
        uuid::Uuid::parse_str(raw).ok().map(|u| Self(u.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct SessionManager {
    store: Arc<dyn KvStore>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KvStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// New session and its signed cookie token.
    pub fn issue(&self) -> (SessionId, String) {
        let id = SessionId::new();
        let token = token::sign(&self.config.secret, &id);
        (id, token)
    }

    /// Session named by a cookie token, if the signature checks out.
    pub fn verify(&self, token: &str) -> Option<SessionId> {
        token::verify(&self.config.secret, token)
    }

    /// Session from a raw `Cookie` header value.
    pub fn from_cookie_header(&self, header: &str) -> Option<SessionId> {
        token::find_cookie(header, &self.config.cookie_name).and_then(|t| self.verify(t))
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn set_cookie_value(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.config.cookie_name, token, self.config.ttl_secs
        );
        if self.config.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Previously saved fields for one letter page; empty when nothing is saved
    /// or the store cannot be read.
    pub async fn load_fields(&self, session: &SessionId, kind: LetterKind) -> LetterFields {
        let key = fields_key(session, kind);
        match self.store.get(&key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable saved fields for {}: {}", kind, e);
                LetterFields::new()
            }),
            Ok(None) => LetterFields::new(),
            Err(e) => {
                tracing::warn!("Could not load saved fields for {}: {}", kind, e);
                LetterFields::new()
            },
        }
    }

    /// Remember `fields` for the page of `kind`. Failures are logged only.
    pub async fn save_fields(&self, session: &SessionId, kind: LetterKind, fields: &LetterFields) {
        let raw = match serde_json::to_string(fields) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Could not serialize fields for {}: {}", kind, e);
                return;
            },
        };
        let ttl = Duration::from_secs(self.config.ttl_secs);
        if let Err(e) = self.store.set_with_expiry(&fields_key(session, kind), &raw, ttl).await {
            tracing::warn!("Could not save fields for {}: {}", kind, e);
        }
    }
}

fn fields_key(session: &SessionId, kind: LetterKind) -> String {
    format!("session:{}:fields:{}", session, kind.as_str())
}
