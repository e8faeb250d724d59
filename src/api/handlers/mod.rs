mod admin;
mod auth;
mod catalog;
mod content;
mod uploads;

use crate::api::response::ApiError;
use crate::auth::AuthError;

pub use admin::{
    create_user, delete_software, delete_user, health, list_users, set_user_admin, settings,
    stats_daily, stats_overview, update_software,
};
pub use auth::{current_session, get_theme, set_theme, sign_in, sign_out};
pub use catalog::{
    category_software, get_software, list_categories, list_software, record_download,
};
pub use content::serve_object;
pub use uploads::create_software;

/// Map an AuthError to an ApiError
fn auth_error(e: AuthError) -> ApiError {
    match e {
        AuthError::InvalidCredentials => ApiError::unauthorized("Invalid email or password"),
        _ => ApiError::internal(e.to_string()),
    }
}
