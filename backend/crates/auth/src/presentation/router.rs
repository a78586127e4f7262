//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::repository::UserRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router for any credential store
///
/// Mounts `/auth/*` and `/users/*`. The caller must wrap the final router in
/// [`resolve_request_context`](crate::presentation::middleware::resolve_request_context)
/// with the same state.
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/login", post(handlers::login::<R>))
        .route("/auth/register", post(handlers::register::<R>))
        .route("/auth/test-token", post(handlers::test_token::<R>))
        .route("/users", get(handlers::list_users::<R>))
        .route(
            "/users/me",
            get(handlers::read_me::<R>).put(handlers::update_me::<R>),
        )
        .route(
            "/users/{id}",
            get(handlers::read_user::<R>)
                .put(handlers::update_user::<R>)
                .delete(handlers::delete_user::<R>),
        )
        .with_state(state)
}
