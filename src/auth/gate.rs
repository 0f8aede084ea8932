//! The session gate that decides whether a request belongs to a logged in user.

use std::collections::HashMap;

use axum_extra::extract::PrivateCookieJar;

use crate::{
    session::decode_session_id,
    user::{User, UserStore},
};

/// The key the base64 encoded session identifier is stored under.
pub const SESSION_KEY: &str = "session-sign-id";

/// A read-only snapshot of the session values sent with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionValues(HashMap<String, String>);

impl SessionValues {
    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Collect the values of every cookie in `jar` that decrypted successfully.
    pub fn from_jar(jar: &PrivateCookieJar) -> Self {
        jar.iter()
            .map(|cookie| (cookie.name().to_owned(), cookie.value().to_owned()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for SessionValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// What the gate decided to do with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// The session matched this user.
    Proceed(User),
    /// The session is missing, malformed or unknown.
    Redirect,
}

/// Match the session in `session_values` against the users in `store`.
///
/// A missing value, a value that is not valid base64, an empty identifier,
/// an identifier no user holds and a failed lookup all give
/// [GateDecision::Redirect]. Lookup failures are logged.
pub fn authenticate(session_values: &SessionValues, store: &impl UserStore) -> GateDecision {
    let Some(session_token) = session_values.get(SESSION_KEY) else {
        tracing::debug!("No session value in request.");
        return GateDecision::Redirect;
    };

    let raw_session_id = match decode_session_id(session_token) {
        Ok(raw_session_id) if !raw_session_id.is_empty() => raw_session_id,
        Ok(_) => {
            tracing::debug!("Empty session identifier in request.");
            return GateDecision::Redirect;
        }
        Err(error) => {
            tracing::debug!("Could not decode session value: {error}");
            return GateDecision::Redirect;
        }
    };

    match store.find_user_by_session_id(&raw_session_id) {
        Ok(Some(user)) => GateDecision::Proceed(user),
        Ok(None) => {
            tracing::debug!("No user with the requested session.");
            GateDecision::Redirect
        }
        Err(error) => {
            tracing::error!("Could not look up user by session: {error}");
            GateDecision::Redirect
        }
    }
}
