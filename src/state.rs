use std::sync::Arc;

use crate::config::Config;
use crate::reset::PasswordResetCoordinator;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub coordinator: PasswordResetCoordinator,
    pub config: Config,
}
