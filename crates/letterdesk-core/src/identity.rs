//! Client identity used as the rate-limit partition key.

use std::fmt;
use std::net::IpAddr;

use crate::session::SessionId;

/// Who is making a request, re-derived on every call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientIdentity {
    Peer(IpAddr),
    Session(SessionId),
    Anonymous,
}

impl ClientIdentity {
    /// Network origin wins; the session token is the fallback when no address
    /// is known (unix sockets, test harnesses).
    pub fn resolve(peer: Option<IpAddr>, session: Option<&SessionId>) -> Self {
        match (peer, session) {
            (Some(ip), _) => Self::Peer(ip),
            (None, Some(id)) => Self::Session(id.clone()),
            (None, None) => Self::Anonymous,
        }
    }

    pub fn as_key(&self) -> String {
        match self {
            Self::Peer(ip) => format!("ip:{}", ip),
            Self::Session(id) => format!("session:{}", id),
            Self::Anonymous => "anonymous".to_string(),
        }
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}
