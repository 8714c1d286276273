use super::errors::ServerError;
use axum::{
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Component renders come back from handlers as plain strings; promote
/// those to text/html. Responses that already declare a real content-type
/// (the JSON API, the map script) pass through untouched.
pub async fn html_headers<B>(
    request: Request<B>,
    next: Next<B>,
) -> Result<Response, ServerError> {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    let is_plain_text = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/plain"))
        .unwrap_or(true);
    if is_plain_text {
        headers.insert("content-type", HeaderValue::from_str("text/html")?);
    }

    Ok(response)
}
