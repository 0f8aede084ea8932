use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|error| panic!("Bad selector {css:?}: {error}"))
}

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&selector("form")).next().expect("No form found")
}

/// Check that `form` sends its HTMX request to `endpoint`, e.g. with `attribute` set to "hx-post".
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    assert_eq!(
        form.value().attr(attribute),
        Some(endpoint),
        "want form with {attribute}=\"{endpoint}\""
    );
}

/// Check that `form` has a required input called `name` of type `type_`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = form
        .select(&selector("input"))
        .find(|input| input.value().attr("name") == Some(name))
        .unwrap_or_else(|| panic!("No input named {name:?}"));

    assert_eq!(
        input.value().attr("type"),
        Some(type_),
        "wrong type for input {name:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "input {name:?} should be required"
    );
}

#[track_caller]
fn must_get_submit_button<'a>(form: &ElementRef<'a>) -> ElementRef<'a> {
    let button = form
        .select(&selector("button"))
        .next()
        .expect("No button found");

    assert_eq!(
        button.value().attr("type"),
        Some("submit"),
        "want a button with type=\"submit\""
    );

    button
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    must_get_submit_button(form);
}

#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let button = must_get_submit_button(form);

    assert_eq!(button.text().collect::<String>().trim(), text);
}
