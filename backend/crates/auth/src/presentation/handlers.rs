//! HTTP Handlers

use axum::extract::{Path, Query, State};
use axum::{Form, Json};
use kernel::id::UserId;
use kernel::page::Page;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AdminChanges, LoginInput, LoginUseCase, ManageUsersUseCase, ProfileChanges, RegisterInput,
    RegisterUseCase,
};
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{
    LoginForm, RegisterRequest, TokenResponse, UpdateMeRequest, UpdateUserRequest, UserResponse,
};
use crate::presentation::middleware::RequestContext;

/// Shared state for auth handlers and the request context middleware
pub struct AuthAppState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> AuthAppState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
        }
    }

    fn users(&self) -> ManageUsersUseCase<R> {
        ManageUsersUseCase::new(self.repo.clone(), self.config.clone())
    }
}

// manual impl: no `R: Clone` bound
impl<R> Clone for AuthAppState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

/// POST /auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Form(form): Form<LoginForm>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            username: form.username,
            password: form.password,
        })
        .await?;

    Ok(Json(TokenResponse::bearer(output.access_token)))
}

/// POST /auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    ctx: RequestContext,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let user = use_case
        .execute(
            ctx.principal(),
            RegisterInput {
                username: req.username,
                email: req.email,
                password: req.password,
                role: req.role,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

/// POST /auth/test-token
pub async fn test_token<R>(
    State(state): State<AuthAppState<R>>,
    ctx: RequestContext,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = state.users().me(ctx.principal()).await?;
    Ok(Json(user.into()))
}

// ============================================================================
// Users
// ============================================================================

/// GET /users
pub async fn list_users<R>(
    State(state): State<AuthAppState<R>>,
    ctx: RequestContext,
    Query(page): Query<Page>,
) -> AuthResult<Json<Vec<UserResponse>>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let users = state.users().list(ctx.principal(), page).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/me
pub async fn read_me<R>(
    State(state): State<AuthAppState<R>>,
    ctx: RequestContext,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = state.users().me(ctx.principal()).await?;
    Ok(Json(user.into()))
}

/// PUT /users/me
pub async fn update_me<R>(
    State(state): State<AuthAppState<R>>,
    ctx: RequestContext,
    Json(req): Json<UpdateMeRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let changes = ProfileChanges {
        username: req.username,
        email: req.email,
        password: req.password,
    };

    let user = state.users().update_me(ctx.principal(), changes).await?;
    Ok(Json(user.into()))
}

/// GET /users/{id}
pub async fn read_user<R>(
    State(state): State<AuthAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<UserId>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = state.users().get(ctx.principal(), id).await?;
    Ok(Json(user.into()))
}

/// PUT /users/{id}
pub async fn update_user<R>(
    State(state): State<AuthAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateUserRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let changes = AdminChanges {
        profile: ProfileChanges {
            username: req.username,
            email: req.email,
            password: req.password,
        },
        role: req.role,
        is_active: req.is_active,
    };

    let user = state.users().update(ctx.principal(), id, changes).await?;
    Ok(Json(user.into()))
}

/// DELETE /users/{id}
pub async fn delete_user<R>(
    State(state): State<AuthAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<UserId>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = state.users().delete(ctx.principal(), id).await?;
    Ok(Json(user.into()))
}
