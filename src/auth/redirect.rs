//! Helpers for redirect URLs during authentication flows.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN_VIEW
}

/// Reduce `raw_url` to a same-origin path and query.
///
/// Returns `None` for absolute URLs, protocol relative URLs and the log-in page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in page URL that sends the user back to the page `request` asked for.
///
/// Falls back to the home page if the requested URL is not a safe target.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    let redirect_target = request
        .uri()
        .path_and_query()
        .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
        .unwrap_or_else(|| {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to home page.");
            endpoints::ROOT.to_owned()
        });

    build_log_in_redirect_url_from_target(&redirect_target)
}

fn build_log_in_redirect_url_from_target(redirect_target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => format!("{}?{}", endpoints::LOG_IN_VIEW, param),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

#[cfg(test)]
mod redirect_tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    fn request_to(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn accepts_relative_paths_with_query() {
        assert_eq!(
            normalize_redirect_url("/statements?page=2"),
            Some("/statements?page=2".to_owned())
        );
    }

    #[test]
    fn rejects_unsafe_targets() {
        for url in [
            "https://example.com",
            "//example.com/evil",
            "relative/path",
            endpoints::LOG_IN_VIEW,
            "/auth?redirect_url=%2F",
        ] {
            assert_eq!(normalize_redirect_url(url), None, "accepted {url}");
        }
    }

    #[test]
    fn home_page_redirect_url() {
        assert_eq!(
            build_log_in_redirect_url(&request_to("/")),
            "/auth?redirect_url=%2F"
        );
    }

    #[test]
    fn redirect_url_keeps_query() {
        assert_eq!(
            build_log_in_redirect_url(&request_to("/?tab=recent")),
            "/auth?redirect_url=%2F%3Ftab%3Drecent"
        );
    }
}
