//! The API endpoints URIs.

/// The home page with the logged in user's statements and balance.
pub const ROOT: &str = "/";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/auth";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/auth/register";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
