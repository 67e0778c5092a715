pub mod forgot_password;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

/// HTML pages, mounted under `{route}`.
pub fn view_routes(route: &str) -> Router<SharedState> {
    Router::new()
        .route(
            route,
            get(forgot_password::request_page).post(forgot_password::request_submit),
        )
        .route(
            &format!("{route}/{{token}}"),
            get(forgot_password::new_password_page).post(forgot_password::new_password_submit),
        )
}
