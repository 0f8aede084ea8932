//! Log-out route handler that ends the session and redirects users.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{AuthState, GateDecision, SessionValues, authenticate, invalidate_session_cookie},
    endpoints,
    user::{SQLiteUserStore, set_session_id},
};

/// Clear the stored session, invalidate the session cookie and redirect the client to the log-in page.
///
/// The stored session is only cleared if the cookie held a valid session,
/// the cookie is invalidated either way.
pub async fn get_log_out(State(state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    let session_values = SessionValues::from_jar(&jar);
    let store = SQLiteUserStore::new(state.db_connection.clone());

    if let GateDecision::Proceed(user) = authenticate(&session_values, &store) {
        match state.db_connection.lock() {
            Ok(connection) => {
                if let Err(error) = set_session_id(user.id, None, &connection) {
                    tracing::error!("Could not clear session for user {}: {error}", user.id);
                } else {
                    tracing::info!("User {} logged out", user.id);
                }
            }
            Err(error) => tracing::error!("Could not acquire database lock: {error}"),
        }
    }

    let jar = invalidate_session_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{AuthState, DEFAULT_COOKIE_DURATION, SESSION_KEY, set_session_cookie},
        db::initialize,
        endpoints,
        user::{User, get_user_by_id, insert_test_user},
    };

    use super::get_log_out;

    fn get_test_state() -> (AuthState, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = insert_test_user(
            "Test User",
            "test@example.com",
            Some("test_session_123"),
            &connection,
        );

        let state = AuthState {
            cookie_key: Key::from(&Sha512::digest("42")),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user)
    }

    #[tokio::test]
    async fn log_out_clears_session_and_redirects() {
        let (state, user) = get_test_state();
        let jar = set_session_cookie(
            PrivateCookieJar::new(state.cookie_key.clone()),
            "test_session_123",
            DEFAULT_COOKIE_DURATION,
        );
        let connection = state.db_connection.clone();

        let response = get_log_out(State(state), jar).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        assert_cookie_expired(&response);
        let stored_user = get_user_by_id(user.id, &connection.lock().unwrap()).unwrap();
        assert_eq!(stored_user.session_id, None);
    }

    #[tokio::test]
    async fn log_out_without_session_still_expires_cookie() {
        let (state, user) = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let connection = state.db_connection.clone();

        let response = get_log_out(State(state), jar).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        assert_cookie_expired(&response);
        let stored_user = get_user_by_id(user.id, &connection.lock().unwrap()).unwrap();
        assert_eq!(stored_user.session_id.as_deref(), Some("test_session_123"));
    }

    #[track_caller]
    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    #[track_caller]
    fn assert_cookie_expired(response: &Response<Body>) {
        let mut found_session_cookie = false;

        for cookie_header in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_header.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            if cookie.name() != SESSION_KEY {
                continue;
            }

            found_session_cookie = true;

            assert_eq!(
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
                "got expires {:?}, want {:?}",
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
            );

            assert_eq!(
                cookie.max_age(),
                Some(Duration::ZERO),
                "got max age {:?}, want {:?}",
                cookie.max_age(),
                Some(Duration::ZERO),
            );
        }

        assert!(found_session_cookie, "session cookie was not set");
    }
}
