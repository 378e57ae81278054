//! Per-request session and client identity, plus page-class admission.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, SocketAddr};

use letterdesk_core::{Admission, ClientIdentity, EndpointClass, SessionId};
use letterdesk_types::LetterError;

use crate::api::ApiError;
use crate::state::AppState;

/// Who is calling, attached to every request by [`session_middleware`].
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session: SessionId,
    pub identity: ClientIdentity,
}

/// Resolve or issue the session cookie and derive the client identity.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = request
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| state.sessions().from_cookie_header(cookies));

    let (session, new_token) = match existing {
        Some(session) => (session, None),
        None => {
            let (session, token) = state.sessions().issue();
            tracing::debug!("Issued new session {}", session);
            (session, Some(token))
        },
    };

    let peer = extract_client_ip(&request, state.rate_limit_config().trust_forwarded_headers);
    let identity = ClientIdentity::resolve(peer, Some(&session));
    request.extensions_mut().insert(RequestContext { session, identity });

    let mut response = next.run(request).await;

    if let Some(token) = new_token {
        match HeaderValue::from_str(&state.sessions().set_cookie_value(&token)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            },
            Err(e) => tracing::error!("Session cookie is not a valid header value: {}", e),
        }
    }
    response
}

/// Admission for the `page` class (form pages, session reads).
pub async fn page_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(identity) = request.extensions().get::<RequestContext>().map(|c| c.identity.clone())
    else {
        return next.run(request).await;
    };

    match state.limiter().admit(&identity, EndpointClass::Page).await {
        Admission::Allowed { .. } => next.run(request).await,
        Admission::Denied { retry_after, .. } => {
            ApiError(LetterError::RateLimited { retry_after_secs: retry_after.as_secs().max(1) })
                .into_response()
        },
    }
}

/// Peer address, or the first forwarded hop when the deployment sits behind
/// a trusted proxy.
fn extract_client_ip(request: &Request, trust_forwarded: bool) -> Option<IpAddr> {
    let forwarded = if trust_forwarded { forwarded_ip(request.headers()) } else { None };
    forwarded.or_else(|| {
        request.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip())
    })
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
        })
}
