//! Ingredient and tag endpoints.
//!
//! Both resources share these handlers; the router for each kind carries its
//! [`AttrKind`] as a request extension.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, ApiResult, AppState, AuthUser};
use crate::models::{validate_name, Attr, AttrKind};

/// Routes for one kind: `GET /<kind>` and `PATCH|PUT|DELETE /<kind>/{id}`.
pub fn routes(kind: AttrKind) -> Router<AppState> {
    let base = format!("/{}", kind.path());
    Router::new()
        .route(&base, get(list_attrs))
        .route(
            &format!("{}/{{id}}", base),
            patch(patch_attr).put(put_attr).delete(delete_attr),
        )
        .layer(Extension(kind))
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    /// `1` restricts the list to items used by at least one recipe
    pub assigned_only: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttrPayload {
    pub name: Option<String>,
}

/// Parses a boolean-like query flag: integers (non-zero is true) or
/// `true`/`false`. Missing or empty means false.
pub(crate) fn parse_flag(name: &str, value: Option<&str>) -> ApiResult<bool> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(false);
    };
    if let Ok(n) = value.parse::<i64>() {
        return Ok(n != 0);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ApiError::Validation(format!(
            "Invalid value '{}' for {}: expected 0 or 1",
            value, name
        ))),
    }
}

/// Parses an id from the URL. Malformed ids cannot match any record.
pub(crate) fn parse_path_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound)
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

async fn list_attrs(
    State(state): State<AppState>,
    Extension(kind): Extension<AttrKind>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Attr>>> {
    let query = query_params(query)?;
    let assigned_only = parse_flag("assigned_only", query.assigned_only.as_deref())?;
    let attrs = state.attrs(kind).list(user.id, assigned_only).await?;
    Ok(Json(attrs))
}

async fn patch_attr(
    State(state): State<AppState>,
    Extension(kind): Extension<AttrKind>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<AttrPayload>, JsonRejection>,
) -> ApiResult<Json<Attr>> {
    let id = parse_path_id(&id)?;
    let payload = json_body(payload)?;
    let repo = state.attrs(kind);

    let attr = match payload.name {
        Some(name) => {
            let name = validate_name(&name).map_err(ApiError::Validation)?;
            repo.rename(user.id, id, &name).await?
        }
        None => repo.get(user.id, id).await?,
    };

    let attr = attr.ok_or(ApiError::NotFound)?;
    tracing::info!(kind = %kind, id = %attr.id, "Updated {}", kind);
    Ok(Json(attr))
}

async fn put_attr(
    State(state): State<AppState>,
    Extension(kind): Extension<AttrKind>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<AttrPayload>, JsonRejection>,
) -> ApiResult<Json<Attr>> {
    let id = parse_path_id(&id)?;
    let payload = json_body(payload)?;
    let name = payload
        .name
        .ok_or_else(|| ApiError::Validation("Field 'name' is required".to_string()))?;
    let name = validate_name(&name).map_err(ApiError::Validation)?;

    let attr = state
        .attrs(kind)
        .rename(user.id, id, &name)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(kind = %kind, id = %attr.id, "Updated {}", kind);
    Ok(Json(attr))
}

async fn delete_attr(
    State(state): State<AppState>,
    Extension(kind): Extension<AttrKind>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_path_id(&id)?;

    if !state.attrs(kind).delete(user.id, id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(kind = %kind, id = %id, "Deleted {}", kind);
    Ok(StatusCode::NO_CONTENT)
}
