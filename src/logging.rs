use axum::{extract::Request, middleware::Next, response::Response};
use chrono::Utc;
use std::time::Instant;
use tracing::info;

use crate::forms::FormKind;
use crate::startup::API_PREFIX;

/// Writes one `access_log` line per request, tagged with the form being
/// validated when the path names one.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let locale = request
        .uri()
        .query()
        .and_then(locale_param)
        .unwrap_or("-")
        .to_string();
    let remote_addr = header_value(&request, "x-forwarded-for")
        .or_else(|| header_value(&request, "x-real-ip"))
        .unwrap_or("-")
        .to_string();
    let user_agent = header_value(&request, "user-agent")
        .unwrap_or("-")
        .to_string();

    let response = next.run(request).await;

    let form = form_of(&path).map_or("-", |kind| kind.as_str());
    let length = response
        .headers()
        .get("content-length")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    info!(
        target: "access_log",
        time = %Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
        remote = %remote_addr,
        %method,
        %path,
        form,
        locale = %locale,
        status = response.status().as_u16(),
        length,
        elapsed_ms = start.elapsed().as_millis() as u64,
        agent = %user_agent,
    );

    response
}

fn header_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|h| h.to_str().ok())
}

/// The form named by a `/api/v1/validate/{form}` path, if it is a known one.
fn form_of(path: &str) -> Option<FormKind> {
    path.strip_prefix(API_PREFIX)?
        .strip_prefix("/validate/")?
        .parse()
        .ok()
}

fn locale_param(query: &str) -> Option<&str> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("locale="))
}
