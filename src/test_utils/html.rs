use axum::{body::Body, response::Response};
use scraper::Html;

async fn response_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    String::from_utf8(bytes.to_vec()).expect("Response body is not UTF-8")
}

/// Parse a full page, e.g. the log-in page.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&response_text(response).await)
}

/// Parse a partial page, e.g. a form re-rendered after a failed HTMX request.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&response_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(html.errors.is_empty(), "invalid HTML: {:?}", html.errors);
}
