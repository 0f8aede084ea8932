#![allow(missing_docs)]

pub(crate) mod cookie;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use cookie::{encrypted_cookie, get_session_value};
pub(crate) use form::{
    assert_form_input, assert_form_submit_button, assert_form_submit_button_with_text,
    assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::assert_hx_redirect;
