//! Conditional Responses
//!
//! Writes an encoded body under its ETag, honouring `If-Match` and
//! `If-None-Match`. No modification time is tracked, so
//! `If-Modified-Since` never applies.

use axum::{
    body::Body,
    http::{
        header::{self, HeaderMap, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
};

/// Serve `body` with `etag`, or 304/412 when the request validators say so.
///
/// `headers` carries the response headers prepared by the caller.
pub fn serve_content(
    request_headers: &HeaderMap,
    mut headers: HeaderMap,
    etag: &str,
    body: Vec<u8>,
) -> Response {
    if let Ok(value) = HeaderValue::from_str(etag) {
        headers.insert(header::ETAG, value);
    }

    if let Some(false) = any_matches(request_headers, header::IF_MATCH, etag, strong_match) {
        return (StatusCode::PRECONDITION_FAILED, headers).into_response();
    }

    if let Some(true) = any_matches(request_headers, header::IF_NONE_MATCH, etag, weak_match) {
        headers.remove(header::CONTENT_TYPE);
        headers.remove(header::CONTENT_LENGTH);
        return (StatusCode::NOT_MODIFIED, headers).into_response();
    }

    (StatusCode::OK, headers, Body::from(body)).into_response()
}

/// `None` when the request carries no candidate tag for `name`
fn any_matches(
    request_headers: &HeaderMap,
    name: header::HeaderName,
    etag: &str,
    compare: fn(&str, &str) -> bool,
) -> Option<bool> {
    let mut candidates = request_headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|list| list.split(','))
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .peekable();
    candidates.peek()?;

    Some(candidates.any(|candidate| candidate == "*" || compare(candidate, etag)))
}

fn strong_match(candidate: &str, etag: &str) -> bool {
    !candidate.starts_with("W/") && !etag.starts_with("W/") && candidate == etag
}

fn weak_match(candidate: &str, etag: &str) -> bool {
    candidate.trim_start_matches("W/") == etag.trim_start_matches("W/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETAG: &str = "\"b90956c775a41001\"";

    fn request(name: header::HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    fn response_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers
    }

    #[test]
    fn test_plain_request() {
        let response = serve_content(&HeaderMap::new(), response_headers(), ETAG, b"{}".to_vec());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ETAG], ETAG);
    }

    #[test]
    fn test_if_none_match_hit() {
        let response = serve_content(
            &request(header::IF_NONE_MATCH, "\"0\", \"b90956c775a41001\""),
            response_headers(),
            ETAG,
            b"{}".to_vec(),
        );
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert_eq!(response.headers()[header::ETAG], ETAG);
    }

    #[test]
    fn test_if_none_match_weak_and_star() {
        let weak = serve_content(
            &request(header::IF_NONE_MATCH, "W/\"b90956c775a41001\""),
            response_headers(),
            ETAG,
            b"{}".to_vec(),
        );
        assert_eq!(weak.status(), StatusCode::NOT_MODIFIED);

        let star = serve_content(&request(header::IF_NONE_MATCH, "*"), response_headers(), ETAG, b"{}".to_vec());
        assert_eq!(star.status(), StatusCode::NOT_MODIFIED);
    }

    #[test]
    fn test_if_none_match_miss() {
        let response = serve_content(
            &request(header::IF_NONE_MATCH, "\"deadbeef\""),
            response_headers(),
            ETAG,
            b"{}".to_vec(),
        );
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_if_match() {
        let hit = serve_content(&request(header::IF_MATCH, ETAG), response_headers(), ETAG, b"{}".to_vec());
        assert_eq!(hit.status(), StatusCode::OK);

        let weak = serve_content(
            &request(header::IF_MATCH, "W/\"b90956c775a41001\""),
            response_headers(),
            ETAG,
            b"{}".to_vec(),
        );
        assert_eq!(weak.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[test]
    fn test_empty_if_match_is_no_condition() {
        let response = serve_content(&request(header::IF_MATCH, ""), response_headers(), ETAG, b"{}".to_vec());
        assert_eq!(response.status(), StatusCode::OK);

        let response = serve_content(&request(header::IF_MATCH, " , "), response_headers(), ETAG, b"{}".to_vec());
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_if_modified_since_ignored() {
        let response = serve_content(
            &request(header::IF_MODIFIED_SINCE, "Mon, 01 Jan 2024 00:00:00 GMT"),
            response_headers(),
            ETAG,
            b"{}".to_vec(),
        );
        assert_eq!(response.status(), StatusCode::OK);
    }
}
