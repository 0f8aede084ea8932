//! Session authentication: the gate that guards protected pages and the
//! routes that start and end sessions.

mod cookie;
mod gate;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod register;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_session_cookie, set_session_cookie};
pub use gate::{GateDecision, SESSION_KEY, SessionValues, authenticate};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard};
pub use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub use register::{get_register_page, register_user};
