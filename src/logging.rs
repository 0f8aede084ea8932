//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bodies longer than this many bytes are truncated at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values never reach the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in submitted forms and cookie headers are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if is_form_post(&parts) {
        let display_text = REDACTED_FIELDS
            .iter()
            .fold(body_text.clone(), |text, field| redact_field(&text, field));
        log_request(&parts, &display_text);
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

fn is_form_post(parts: &axum::http::request::Parts) -> bool {
    parts.method == Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|content_type| content_type.to_str().ok())
            .is_some_and(|content_type| {
                content_type.starts_with("application/x-www-form-urlencoded")
            })
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name == field_name => format!("{name}={REDACTED_VALUE}"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

async fn read_body_text(body: Body) -> Result<String, axum::Error> {
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

fn truncate(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

/// A copy of `headers` with the session cookies replaced by a placeholder.
fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    for name in [COOKIE, SET_COOKIE] {
        if headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(REDACTED_VALUE));
        }
    }

    headers
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    let method = &parts.method;
    let uri = &parts.uri;
    let headers = redact_headers(&parts.headers);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {method} {uri}\nheaders: {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {method} {uri}\nheaders: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    let status = parts.status;
    let headers = redact_headers(&parts.headers);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {status}\nheaders: {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {status}\nheaders: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use axum::http::{
        HeaderMap, HeaderValue,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    };

    use super::{
        LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_field, redact_headers, truncate,
    };

    #[test]
    fn redacts_only_named_field() {
        let form = "email=test%40example.com&password=hunter2&confirm_password=hunter2";

        let redacted = redact_field(form, "password");

        assert_eq!(
            redacted,
            "email=test%40example.com&password=********&confirm_password=hunter2"
        );
    }

    #[test]
    fn redact_leaves_form_without_field_unchanged() {
        assert_eq!(redact_field("email=a&name=b", "password"), "email=a&name=b");
    }

    #[test]
    fn redacts_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session-sign-id=secret"));
        headers.append(SET_COOKIE, HeaderValue::from_static("session-sign-id=a"));
        headers.append(SET_COOKIE, HeaderValue::from_static("other=b"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));

        let redacted = redact_headers(&headers);

        assert_eq!(redacted.get(COOKIE).unwrap(), "********");
        let set_cookies = redacted.get_all(SET_COOKIE).iter().collect::<Vec<_>>();
        assert_eq!(set_cookies, vec!["********"]);
        assert_eq!(redacted.get(CONTENT_TYPE).unwrap(), "text/html");
        assert!(
            !format!("{redacted:?}").contains("secret"),
            "cookie value leaked: {redacted:?}"
        );
    }

    #[test]
    fn redact_headers_leaves_headers_without_cookies_unchanged() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));

        assert_eq!(redact_headers(&headers), headers);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate(&body);

        assert!(truncated.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(body.starts_with(truncated));
    }

    #[tokio::test]
    async fn middleware_passes_body_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .form(&[("email", "test@example.com"), ("password", "hunter2")])
            .await;

        response.assert_status_ok();
        response.assert_text("email=test%40example.com&password=hunter2");
    }
}
