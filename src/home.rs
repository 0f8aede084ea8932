//! The home page that shows the logged in user's balance and statements.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState, Error, endpoints,
    html::{
        LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    statement::{Statement, compute_balance, list_statements_for_user},
    timezone::get_local_offset,
    user::User,
};

/// The state needed for the home page.
#[derive(Debug, Clone)]
pub struct HomeState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading the user's statements.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn amount_style(amount: f64) -> &'static str {
    if amount < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    }
}

fn statements_table(statements: &[Statement], local_offset: UtcOffset) -> Markup {
    html! {
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                }
            }

            tbody
            {
                @for statement in statements {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE)
                        {
                            (statement.operation_time.to_offset(local_offset).date().to_string())
                        }
                        td class=(TABLE_CELL_STYLE) { (statement.description) }
                        td class={ (TABLE_CELL_STYLE) " " (amount_style(statement.amount)) }
                        {
                            (format_currency(statement.amount))
                        }
                    }
                }
            }
        }
    }
}

fn home_view(user: &User, statements: &[Statement], local_offset: UtcOffset) -> Markup {
    let balance = compute_balance(statements);

    let content = html! {
        nav class="flex justify-between items-center px-6 py-4 bg-white dark:bg-gray-800 shadow"
        {
            span class="text-xl font-semibold text-gray-900 dark:text-white" { "Expense Tracker" }
            a href=(endpoints::LOG_OUT) class=(LINK_STYLE) { "Log out" }
        }

        main class="flex flex-col items-center px-6 py-8 mx-auto max-w-screen-lg gap-6"
        {
            h1 class="text-2xl font-bold text-gray-900 dark:text-white"
            {
                "Welcome, " span id="user-name" { (user.name) }
            }

            section class="w-full p-6 bg-white rounded-lg shadow dark:bg-gray-800"
            {
                h2 class="text-sm font-medium text-gray-500 dark:text-gray-400" { "Balance" }
                p id="balance" class={ "text-3xl font-bold " (amount_style(balance)) }
                {
                    (format_currency(balance))
                }
            }

            section class="w-full overflow-x-auto bg-white rounded-lg shadow dark:bg-gray-800"
            {
                @if statements.is_empty() {
                    p class="p-6 text-gray-500 dark:text-gray-400"
                    {
                        "No statements yet."
                    }
                } @else {
                    (statements_table(statements, local_offset))
                }
            }
        }
    };

    base("Home", &content)
}

/// Display the logged in user's name, balance and statements.
///
/// # Errors
///
/// Returns an [Error::InvalidTimezoneError] if the server timezone is invalid,
/// or an error if the statements could not be read.
pub async fn get_home_page(
    State(state): State<HomeState>,
    Extension(user): Extension<User>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)?;

    let statements = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        list_statements_for_user(user.id, &connection)?
    };

    Ok(home_view(&user, &statements, local_offset).into_response())
}
