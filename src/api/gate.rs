//! Request gate applied to every route: geolocation, then usage limiting.

use axum::{
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use tracing::{info, warn};

use super::client::{client_ip, normalize_client_ip};
use super::error::ApiError;
use super::state::AppState;

/// Caller identity resolved by the gate, available to handlers as an extension.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientContext {
    pub client_key: String,
    /// Country used for currency selection; the `userIp` override when it
    /// geolocates, the caller's own country otherwise.
    pub country: String,
}

#[derive(Debug, Deserialize)]
struct GateQuery {
    #[serde(rename = "userIp")]
    user_ip: Option<String>,
}

pub async fn request_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let raw_ip = client_ip(request.headers(), peer);
    let client_key = normalize_client_ip(raw_ip.as_deref());

    let Some(own_country) = state.geo.country(&client_key).await else {
        warn!(client = %client_key, "Couldn't detect origin");
        return Err(ApiError::Geolocation);
    };

    let admission = state.limiter.admit(&client_key).await;
    let now = Utc::now();
    info!(
        client = %client_key,
        country = %own_country,
        usage = admission.count,
        allowed = admission.allowed,
        date = %now.format("%a %b %d %Y"),
        time = %now.format("%H:%M:%S"),
        "Admission"
    );
    if !admission.allowed {
        return Err(ApiError::RateLimited);
    }

    // Only well-formed addresses reach the geolocation provider
    let override_ip = Query::<GateQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.user_ip)
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok());
    let override_country = match override_ip {
        Some(ip) => state.geo.country(&ip.to_string()).await,
        None => None,
    };

    request.extensions_mut().insert(ClientContext {
        client_key,
        country: override_country.unwrap_or(own_country),
    });
    Ok(next.run(request).await)
}

/// Allows browser callers from any origin.
pub async fn allow_any_origin(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
