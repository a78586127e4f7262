//! Cases Router

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};

use crate::domain::repository::{CaseRepository, DocumentRepository};
use crate::presentation::handlers::{self, CasesAppState};

/// Create the Cases router for any repository implementation
///
/// Mounts `/cases/*` and `/documents/*`. Handlers read the caller from
/// `auth::RequestContext`, so the final router must run the auth
/// request-context middleware.
pub fn cases_router<R>(state: CasesAppState<R>) -> Router
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let body_limit = state.config.body_limit();

    Router::new()
        .route(
            "/cases",
            get(handlers::list_cases::<R>).post(handlers::create_case::<R>),
        )
        .route(
            "/cases/{id}",
            get(handlers::read_case::<R>)
                .put(handlers::update_case::<R>)
                .delete(handlers::delete_case::<R>),
        )
        .route(
            "/cases/{id}/documents",
            get(handlers::list_documents::<R>)
                .post(handlers::upload_document::<R>)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/documents/{id}",
            get(handlers::read_document::<R>)
                .put(handlers::update_document::<R>)
                .delete(handlers::delete_document::<R>),
        )
        .route(
            "/documents/{id}/download",
            get(handlers::download_document::<R>),
        )
        .with_state(state)
}
