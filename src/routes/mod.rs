pub mod forgot_password;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

/// JSON adapter, mounted under `/rest{route}`.
pub fn rest_routes(route: &str) -> Router<SharedState> {
    Router::new()
        .route(&format!("/rest{route}"), post(forgot_password::request_reset))
        .route(
            &format!("/rest{route}/{{token}}"),
            get(forgot_password::check_token).post(forgot_password::reset_password),
        )
}
