//! HTTP API for recipes, ingredients and tags.
//!
//! # Endpoints
//!
//! - `GET /health`: Health check endpoint (no auth required)
//! - `GET /me`: Returns current user info
//! - `GET /ingredients`, `PATCH|PUT|DELETE /ingredients/{id}`
//! - `GET /tags`, `PATCH|PUT|DELETE /tags/{id}`
//! - `GET|POST /recipes`, `GET|PATCH|PUT|DELETE /recipes/{id}`
//!
//! Everything except `/health` requires `Authorization: Bearer <token>`.

pub mod attrs;
pub mod auth;
pub mod error;
pub mod recipes;

pub use auth::AuthUser;
pub use error::{ApiError, ApiResult};

use axum::{extract::State, middleware, routing::get, Extension, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::db::{AttrRepository, RecipeRepository, TokenRepository, UserRepository};
use crate::models::AttrKind;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn attrs(&self, kind: AttrKind) -> AttrRepository {
        AttrRepository::new(self.pool.clone(), kind)
    }

    pub fn recipes(&self) -> RecipeRepository {
        RecipeRepository::new(self.pool.clone())
    }

    pub fn tokens(&self) -> TokenRepository {
        TokenRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    let protected_routes = Router::new()
        .route("/me", get(me))
        .merge(attrs::routes(AttrKind::Ingredient))
        .merge(attrs::routes(AttrKind::Tag))
        .merge(recipes::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required)
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::version(),
    })
}

/// Current user response
#[derive(Serialize)]
struct MeResponse {
    id: Uuid,
    email: String,
    name: Option<String>,
}

/// Get current user info
async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<MeResponse>> {
    let record = state
        .users()
        .get_by_id(user.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(MeResponse {
        id: record.id,
        email: record.email,
        name: record.name,
    }))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::test_support::{create_user, setup_db, TestDb};
    use crate::models::User;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    pub struct TestApp {
        pub app: Router,
        pub state: AppState,
        pub user: User,
        pub token: String,
        _db: TestDb,
    }

    impl TestApp {
        /// Sets up an app with one authenticated user.
        pub async fn new() -> Self {
            let db = setup_db().await;
            let state = AppState::new(db.pool.clone());
            let user = create_user(&db.pool, "user@example.com").await;
            let token = state.tokens().issue(user.id).await.unwrap();
            Self {
                app: router(state.clone()),
                state,
                user,
                token,
                _db: db,
            }
        }

        pub async fn other_user(&self, email: &str) -> User {
            create_user(&self.state.pool, email).await
        }

        /// Sends a request as the test user. Returns status and parsed JSON body
        /// (`Value::Null` when empty).
        pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            self.send_with_auth(method, uri, body, Some(&format!("Bearer {}", self.token)))
                .await
        }

        pub async fn send_with_auth(
            &self,
            method: Method,
            uri: &str,
            body: Option<Value>,
            authorization: Option<&str>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(auth) = authorization {
                builder = builder.header(header::AUTHORIZATION, auth);
            }
            let request = match body {
                Some(json) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }
    }
}
