//! Request Context Middleware
//!
//! Resolves the caller once per request and stores the result in the request
//! extensions. Handlers read it back through the [`RequestContext`] extractor
//! and pass it to the access policy; nothing is cached across requests.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::bearer::extract_bearer;

use crate::application::ResolvePrincipalUseCase;
use crate::domain::entity::Principal;
use crate::domain::repository::UserRepository;
use crate::presentation::handlers::AuthAppState;

/// Caller identity for the current request. `None` means anonymous.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
}

impl RequestContext {
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

/// Missing middleware yields an anonymous context
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Bearer token → [`RequestContext`]
///
/// Invalid, expired and orphaned tokens produce an anonymous context; the
/// policy turns that into 401 where a principal is required. Only a store
/// failure aborts the request.
pub async fn resolve_request_context<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
{
    let token = extract_bearer(req.headers()).map(str::to_owned);

    let use_case = ResolvePrincipalUseCase::new(state.repo.clone(), state.config.clone());
    let principal = match use_case.execute(token.as_deref()).await {
        Ok(principal) => principal,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(RequestContext { principal });
    next.run(req).await
}
