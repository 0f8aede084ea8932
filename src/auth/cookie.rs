//! Stores and clears the session cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{auth::SESSION_KEY, session::encode_session_id};

/// The default duration for which session cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::days(1);

/// Add the session cookie for `raw_session_id` to the cookie jar.
///
/// The cookie holds the base64 encoding of the identifier and expires
/// `duration` from now.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    raw_session_id: &str,
    duration: Duration,
) -> PrivateCookieJar {
    jar.add(
        Cookie::build((SESSION_KEY, encode_session_id(raw_session_id)))
            .path("/")
            .expires(OffsetDateTime::now_utc() + duration)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((SESSION_KEY, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}
