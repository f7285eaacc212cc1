use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::{adapters::http::app_state::AppState, app_error::AppError};

/// Address of the caller as resolved by [`client_ip_middleware`].
#[derive(Clone, Debug)]
pub struct ClientIp(pub String);

/// Resolves the caller's IP, rate limits submissions by it and exposes it to
/// handlers as a [`ClientIp`] extension.
pub async fn client_ip_middleware(
    State(app_state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Only trust forwarded headers if explicitly configured (when behind a reverse proxy)
    let ip = if app_state.config.trust_proxy {
        forwarded_ip(&request).unwrap_or_else(|| addr.ip().to_string())
    } else {
        addr.ip().to_string()
    };

    if request.method() == Method::POST {
        tracing::debug!(
            trust_proxy = app_state.config.trust_proxy,
            connect_ip = %addr.ip(),
            using_ip = %ip,
            "Rate limiting submission"
        );
        app_state.rate_limiter.check(&ip).await?;
    }

    request.extensions_mut().insert(ClientIp(ip));

    Ok(next.run(request).await)
}

fn forwarded_ip(req: &Request) -> Option<String> {
    // Extract IP from X-Forwarded-For or X-Real-IP headers
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(real) = req.headers().get("x-real-ip")
        && let Ok(val) = real.to_str()
        && !val.trim().is_empty()
    {
        return Some(val.trim().to_string());
    }
    None
}
