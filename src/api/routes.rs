use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::response::ApiError;
use crate::auth;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.uploads.max_upload_size as usize;

    let admin_routes = Router::new()
        .route(
            "/software",
            post(handlers::create_software).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/software/:id", patch(handlers::update_software))
        .route("/software/:id", delete(handlers::delete_software))
        .route("/users", get(handlers::list_users))
        .route("/users", post(handlers::create_user))
        .route("/users/:id", delete(handlers::delete_user))
        .route("/users/:id/admin", put(handlers::set_user_admin))
        .route("/stats/overview", get(handlers::stats_overview))
        .route("/stats/daily", get(handlers::stats_daily))
        .route("/settings", get(handlers::settings))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_admin,
        ));

    Router::new()
        // Catalog
        .route("/software", get(handlers::list_software))
        .route("/software/:id", get(handlers::get_software))
        .route("/software/:id/download", post(handlers::record_download))
        .route("/categories", get(handlers::list_categories))
        .route(
            "/categories/:name/software",
            get(handlers::category_software),
        )
        // Sessions
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/auth/session", get(handlers::current_session))
        // Per-profile preferences
        .route("/profile/theme", get(handlers::get_theme))
        .route("/profile/theme", put(handlers::set_theme))
        // Stored content (served for the local backend)
        .route("/files/:bucket/*key", get(handlers::serve_object))
        // Internal
        .route("/_internal/health", get(handlers::health))
        // Back office
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Gate for /admin routes: resolves the bearer session, requires the
/// administrator flag, and hands the user to handlers via extensions.
/// Missing or dead sessions read as 401, non-admin sessions as 403.
async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?
        .to_string();

    let user = auth::resolve_token(&state.db, &token)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("Session is invalid or expired"))?;

    if !user.is_admin() {
        return Err(ApiError::forbidden("Administrator access required"));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
