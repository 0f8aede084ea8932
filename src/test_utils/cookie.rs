use axum::{
    body::Body,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};

use crate::auth::SESSION_KEY;

/// A cookie named `name` holding `value`, encrypted with `key` the same way the server does it.
pub(crate) fn encrypted_cookie(key: &Key, name: &str, value: &str) -> Cookie<'static> {
    let jar =
        PrivateCookieJar::new(key.clone()).add(Cookie::new(name.to_owned(), value.to_owned()));
    let response = jar.into_response();
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("Set-Cookie header missing")
        .to_str()
        .expect("Could not convert Set-Cookie to str")
        .to_owned();

    Cookie::parse(set_cookie).expect("Could not parse encrypted cookie")
}

/// The decrypted session value set by `response`, if any.
pub(crate) fn get_session_value(response: &Response<Body>, key: &Key) -> Option<String> {
    let mut headers = HeaderMap::new();

    for set_cookie in response.headers().get_all(SET_COOKIE) {
        let cookie = Cookie::parse(set_cookie.to_str().ok()?).ok()?;
        let pair = format!("{}={}", cookie.name(), cookie.value());
        headers.append(COOKIE, HeaderValue::from_str(&pair).ok()?);
    }

    PrivateCookieJar::from_headers(&headers, key.clone())
        .get(SESSION_KEY)
        .map(|cookie| cookie.value().to_owned())
}
