//! The 404 page for paths and resources that do not exist.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Something's missing.",
            "Sorry, we can't find that page. You'll find lots to explore on the home page.",
        ),
    )
        .into_response()
}

#[cfg(test)]
mod not_found_tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::get_404_not_found;

    #[tokio::test]
    async fn renders_404_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let h1 = scraper::Selector::parse("h1").unwrap();
        let header = document.select(&h1).next().expect("No h1 found");
        assert_eq!(header.text().collect::<String>().trim(), "404");
    }
}
