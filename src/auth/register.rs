//! The registration page for creating an account, which also starts the user's first session.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
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
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::set_session_cookie,
    endpoints,
    html::{LINK_STYLE, auth_card, base, password_input, submit_button, text_input},
    internal_server_error::get_internal_server_error_redirect,
    session::generate_session_id,
    user::{NewUser, create_user, set_session_id},
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

/// Per-field error messages for the registration form.
#[derive(Debug, Default)]
struct RegistrationErrors<'a> {
    name: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(name: &str, email: &str, errors: RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#name, #email, #password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("Name", "name", "text", name, errors.name))
            (text_input("Email", "email", "email", email, errors.email))
            (password_input("Password", "password", PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (password_input(
                "Confirm Password",
                "confirm_password",
                PASSWORD_INPUT_MIN_LENGTH,
                errors.confirm_password,
            ))

            (submit_button("Create Account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", "", RegistrationErrors::default());
    let content = auth_card("Create Account", &registration_form);
    base("Register", &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long the first session cookie lives.
    pub cookie_duration: Duration,
    /// The database connection for storing the new user.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a new user and log them in.
///
/// Validation errors are shown next to the offending field in a re-rendered form.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let name = user_data.name.trim();
    let raw_email = user_data.email.trim();
    let render_errors = |errors: RegistrationErrors| {
        registration_form(name, raw_email, errors).into_response()
    };

    if name.is_empty() {
        return render_errors(RegistrationErrors {
            name: Some("Name cannot be empty"),
            ..Default::default()
        });
    }

    let email = match raw_email.parse::<EmailAddress>() {
        Ok(email) => email,
        Err(_) => {
            return render_errors(RegistrationErrors {
                email: Some("Enter a valid email address"),
                ..Default::default()
            });
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password, &[name, raw_email])
    {
        Ok(password) => password,
        Err(error) => {
            return render_errors(RegistrationErrors {
                password: Some(&error.to_string()),
                ..Default::default()
            });
        }
    };

    if user_data.password != user_data.confirm_password {
        return render_errors(RegistrationErrors {
            confirm_password: Some("Passwords do not match"),
            ..Default::default()
        });
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("an error occurred while hashing a password: {e}");

            return get_internal_server_error_redirect();
        }
    };

    let Ok(connection) = state.db_connection.lock() else {
        tracing::error!("Could not acquire database lock during registration");
        return get_internal_server_error_redirect();
    };

    let user = match create_user(
        NewUser {
            name: name.to_owned(),
            email,
            password_hash,
        },
        &connection,
    ) {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return render_errors(RegistrationErrors {
                email: Some("An account with this email already exists, log in instead"),
                ..Default::default()
            });
        }
        Err(e) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {e}");

            return get_internal_server_error_redirect();
        }
    };

    let session_id = generate_session_id();

    if let Err(e) = set_session_id(user.id, Some(&session_id), &connection) {
        tracing::error!("Could not store session for new user {}: {e}", user.id);

        return get_internal_server_error_redirect();
    }

    tracing::info!("Registered user {}", user.id);

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::ROOT.to_owned()),
        set_session_cookie(jar, &session_id, state.cookie_duration),
    )
        .into_response()
}
