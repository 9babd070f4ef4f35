use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use ipnet::IpNet;
use warden_application::{RateLimitDecision, TokenRejection};
use warden_core::AuthContext;
use warden_domain::AdminPermission;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Middleware state for one endpoint: shared services plus the permission
/// the endpoint demands, if any.
#[derive(Clone)]
pub struct PermissionGate {
    pub state: AppState,
    pub required: Option<AdminPermission>,
}

/// Admits or rejects the request by client address before any other work.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let client_key = client_key(&request, &state.trusted_proxies);

    match state
        .rate_limit_service
        .check_rate_limit(client_key.as_str())
        .await?
    {
        RateLimitDecision::Allowed => Ok(next.run(request).await),
        RateLimitDecision::Limited { retry_after } => {
            Err(ApiError::rate_limit_exceeded(retry_after))
        }
    }
}

/// Authenticates the bearer token, resolves the subject's permissions, and
/// enforces the endpoint's required permission.
///
/// On success the request carries the [`AuthContext`] and the resolved
/// `EffectivePermissions` as extensions.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers()).inspect_err(|error| {
        tracing::warn!(code = error.code(), "rejected request without usable credentials");
    })?;

    let claims = gate
        .state
        .token_verifier
        .verify(token)
        .map_err(|rejection| {
            tracing::warn!(reason = %rejection, "rejected bearer token");
            match rejection {
                TokenRejection::InvalidToken(_) => ApiError::invalid_token(),
                TokenRejection::InvalidClaims(_) => ApiError::invalid_claims(),
            }
        })?;

    if claims.is_expired_at(Utc::now().timestamp()) {
        tracing::warn!(subject = %claims.subject, "rejected expired token");
        return Err(ApiError::token_expired());
    }

    let effective = gate
        .state
        .permission_resolution_service
        .resolve(claims.subject)
        .await
        .map_err(|error| {
            tracing::error!(subject = %claims.subject, %error, "permission resolution failed");
            ApiError::permission_load_error()
        })?;

    let context = AuthContext::new(claims.subject, claims.username, effective.permission_names());

    if let Some(required) = gate.required
        && !context.has_permission(required.as_str())
    {
        tracing::warn!(
            subject = %claims.subject,
            required = required.as_str(),
            "rejected request lacking permission"
        );
        return Err(ApiError::insufficient_permissions(required.as_str()));
    }

    tracing::debug!(subject = %claims.subject, "admitted request");
    request.extensions_mut().insert(context);
    request.extensions_mut().insert(effective);

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> ApiResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(ApiError::auth_header_missing)?;
    let value = value.to_str().map_err(|_| ApiError::invalid_auth_format())?;

    match value.split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer")
                && !token.is_empty()
                && !token.contains(char::is_whitespace) =>
        {
            Ok(token)
        }
        _ => Err(ApiError::invalid_auth_format()),
    }
}

/// Peer address of the request, or the nearest untrusted `X-Forwarded-For`
/// hop when the peer is one of `trusted_proxies`. `"unknown"` without a peer.
fn client_key(request: &Request, trusted_proxies: &[IpNet]) -> String {
    let Some(peer) = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip())
    else {
        return "unknown".to_owned();
    };

    if !is_trusted(peer, trusted_proxies) {
        return peer.to_string();
    }

    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    // Walk right to left; hops appended by our own proxies are skipped.
    let mut client = peer;
    for hop in forwarded.rsplit(',').map(str::trim) {
        match IpAddr::from_str(hop) {
            Ok(address) if is_trusted(address, trusted_proxies) => client = address,
            Ok(address) => return address.to_string(),
            Err(_) => break,
        }
    }

    client.to_string()
}

fn is_trusted(address: IpAddr, trusted_proxies: &[IpNet]) -> bool {
    trusted_proxies
        .iter()
        .any(|network| network.contains(&address))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::body::Body;
    use axum::extract::{ConnectInfo, Request};
    use axum::http::{HeaderMap, HeaderValue, header};
    use ipnet::IpNet;

    use super::{bearer_token, client_key};

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_token_requires_scheme_and_single_token() {
        assert!(matches!(bearer_token(&headers_with("Bearer abc.def")), Ok("abc.def")));
        assert!(matches!(bearer_token(&headers_with("bearer abc")), Ok("abc")));

        for value in ["Bearer", "Bearer ", "Basic abc", "Bearer a b", "abc"] {
            let headers = headers_with(value);
            let result = bearer_token(&headers);
            assert!(matches!(result, Err(error) if error.code() == "INVALID_AUTH_FORMAT"));
        }

        let empty = HeaderMap::new();
        let missing = bearer_token(&empty);
        assert!(matches!(missing, Err(error) if error.code() == "AUTH_HEADER_MISSING"));
    }

    fn request_from(peer: [u8; 4], forwarded: Option<&'static str>) -> Request {
        let mut builder = Request::builder();
        if let Some(forwarded) = forwarded {
            builder = builder.header("x-forwarded-for", forwarded);
        }
        let mut request = match builder.body(Body::empty()) {
            Ok(request) => request,
            Err(error) => panic!("failed to build request: {error}"),
        };
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 4000))));
        request
    }

    fn proxies() -> Vec<IpNet> {
        ["10.0.0.0/8"]
            .iter()
            .filter_map(|network| network.parse().ok())
            .collect()
    }

    #[test]
    fn client_key_ignores_forwarded_header_from_untrusted_peer() {
        let request = request_from([192, 0, 2, 1], Some("203.0.113.7"));

        assert_eq!(client_key(&request, &proxies()), "192.0.2.1");
        assert_eq!(client_key(&request, &[]), "192.0.2.1");
    }

    #[test]
    fn client_key_takes_nearest_untrusted_hop_behind_trusted_proxy() {
        let request = request_from([10, 0, 0, 5], Some("198.51.100.1, 203.0.113.7, 10.0.0.9"));

        assert_eq!(client_key(&request, &proxies()), "203.0.113.7");
    }

    #[test]
    fn client_key_falls_back_to_proxy_when_forwarded_chain_is_unusable() {
        let missing = request_from([10, 0, 0, 5], None);
        let garbage = request_from([10, 0, 0, 5], Some("not-an-address"));

        assert_eq!(client_key(&missing, &proxies()), "10.0.0.5");
        assert_eq!(client_key(&garbage, &proxies()), "10.0.0.5");
    }

    #[test]
    fn client_key_is_unknown_without_peer_address() {
        let request = match Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
        {
            Ok(request) => request,
            Err(error) => panic!("failed to build request: {error}"),
        };

        assert_eq!(client_key(&request, &proxies()), "unknown");
    }
}
