//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! A successful log-in starts a new session, replacing the user's previous one.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{normalize_redirect_url, set_session_cookie},
    endpoints,
    html::{LINK_STYLE, auth_card, base, password_input, submit_button, text_input},
    session::generate_session_id,
    user::{get_user_by_email, set_session_id},
};

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (text_input("Email", "email", "email", email, None))
            (password_input("Password", "password", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            (submit_button("Log in"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a href=(endpoints::REGISTER_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Register here"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = auth_card("Log in to your account", &log_in_form);
    base("Log In", &content).into_response()
}

/// How long the session cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session cookie lives when the user does not ask to be remembered.
    pub cookie_duration: Duration,
    /// The database connection for looking up users and storing their session.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// Shown for both an unknown email and a wrong password.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, a new session is stored for the user, the
/// session cookie is set and the client is redirected to the requested page
/// or the home page. Otherwise, the form is returned with an error message
/// explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let render_error =
        |message: &str| log_in_form(&user_data.email, Some(message), redirect_url).into_response();

    let Ok(email) = user_data.email.trim().parse::<EmailAddress>() else {
        return render_error(INVALID_CREDENTIALS_ERROR_MSG);
    };

    let Ok(connection) = state.db_connection.lock() else {
        tracing::error!("Could not acquire database lock during log-in");
        return render_error(INTERNAL_ERROR_MSG);
    };

    let user = match get_user_by_email(&email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return render_error(INVALID_CREDENTIALS_ERROR_MSG),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_error(INTERNAL_ERROR_MSG);
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => {}
        Ok(false) => return render_error(INVALID_CREDENTIALS_ERROR_MSG),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_error(INTERNAL_ERROR_MSG);
        }
    }

    let session_id = generate_session_id();

    if let Err(error) = set_session_id(user.id, Some(&session_id), &connection) {
        tracing::error!("Could not store session for user {}: {error}", user.id);
        return render_error(INTERNAL_ERROR_MSG);
    }

    tracing::info!("User {} logged in", user.id);

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    (
        StatusCode::SEE_OTHER,
        HxRedirect(redirect_url.unwrap_or(endpoints::ROOT).to_owned()),
        set_session_cookie(jar, &session_id, cookie_duration),
    )
        .into_response()
}

/// The query parameters accepted by the log-in page.
#[derive(Deserialize)]
pub struct RedirectQuery {
    /// The page to return to after logging in.
    pub redirect_url: Option<String>,
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password hash in the database.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial session cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{
        extract::Query,
        http::{StatusCode, header::CONTENT_TYPE},
    };

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::{RedirectQuery, get_log_in_page};

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page(Query(RedirectQuery { redirect_url: None })).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::LOG_IN_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_submit_button(&form);

        let link_selector = scraper::Selector::parse("a[href]").unwrap();
        let links = form.select(&link_selector).collect::<Vec<_>>();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        assert_eq!(links[0].value().attr("href"), Some(endpoints::REGISTER_VIEW));
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let redirect_url = "/?tab=recent".to_string();
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some(redirect_url.clone()),
        }))
        .await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let input_selector = scraper::Selector::parse("input[name=redirect_url]").unwrap();
        let inputs = document.select(&input_selector).collect::<Vec<_>>();
        assert_eq!(
            inputs.len(),
            1,
            "want 1 redirect_url input, got {}",
            inputs.len()
        );
        assert_eq!(
            inputs[0].value().attr("value"),
            Some(redirect_url.as_str()),
            "expected redirect_url value to be preserved"
        );
    }

    #[tokio::test]
    async fn log_in_page_drops_unsafe_redirect_url() {
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some("https://example.com".to_owned()),
        }))
        .await;

        let document = parse_html_document(response).await;

        let input_selector = scraper::Selector::parse("input[name=redirect_url]").unwrap();
        assert_eq!(document.select(&input_selector).count(), 0);
    }
}
