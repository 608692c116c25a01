//! Recipe endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attrs::{json_body, parse_path_id, query_params};
use super::{ApiError, ApiResult, AppState, AuthUser};
use crate::db::RecipeFilter;
use crate::models::{validate_name, Attr, NewRecipe, Price, Recipe, RecipeChanges, MAX_NAME_LEN};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/{id}",
            get(get_recipe)
                .patch(patch_recipe)
                .put(put_recipe)
                .delete(delete_recipe),
        )
}

/// Recipe as returned in listings
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<Attr>,
    pub ingredients: Vec<Attr>,
}

/// Recipe as returned by the detail, create and update endpoints
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    pub description: String,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: recipe.tags,
            ingredients: recipe.ingredients,
        }
    }
}

impl From<Recipe> for RecipeDetail {
    fn from(mut recipe: Recipe) -> Self {
        let description = std::mem::take(&mut recipe.description);
        Self {
            summary: recipe.into(),
            description,
        }
    }
}

/// Query parameters for listing recipes
#[derive(Debug, Deserialize, Default)]
pub struct ListRecipesQuery {
    /// Comma-separated tag ids
    pub tags: Option<String>,
    /// Comma-separated ingredient ids
    pub ingredients: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttrRef {
    pub name: String,
}

/// Request body for creating or updating a recipe
#[derive(Debug, Deserialize, Default)]
pub struct RecipePayload {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<AttrRef>>,
    pub ingredients: Option<Vec<AttrRef>>,
}

impl RecipePayload {
    /// Validates every field present and converts to a partial update.
    fn into_changes(self) -> ApiResult<RecipeChanges> {
        let title = self.title.map(|t| validate_title(&t)).transpose()?;
        if let Some(minutes) = self.time_minutes {
            if minutes < 0 {
                return Err(ApiError::Validation(
                    "time_minutes must not be negative".to_string(),
                ));
            }
        }

        Ok(RecipeChanges {
            title,
            time_minutes: self.time_minutes,
            price: self.price,
            description: self.description,
            link: self.link.map(|l| l.trim().to_string()),
            tags: self.tags.map(|refs| attr_names(&refs)).transpose()?,
            ingredients: self.ingredients.map(|refs| attr_names(&refs)).transpose()?,
        })
    }

    /// Like `into_changes`, but title, time and price must all be present.
    fn into_complete_changes(self) -> ApiResult<RecipeChanges> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.time_minutes.is_none() {
            missing.push("time_minutes");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if !missing.is_empty() {
            return Err(ApiError::Validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )));
        }
        self.into_changes()
    }

    fn into_new_recipe(self) -> ApiResult<NewRecipe> {
        let changes = self.into_complete_changes()?;
        Ok(NewRecipe {
            title: changes.title.unwrap_or_default(),
            time_minutes: changes.time_minutes.unwrap_or_default(),
            price: changes.price.unwrap_or_default(),
            description: changes.description.unwrap_or_default(),
            link: changes.link.unwrap_or_default(),
            tags: changes.tags.unwrap_or_default(),
            ingredients: changes.ingredients.unwrap_or_default(),
        })
    }
}

fn validate_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "Title must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(title.to_string())
}

fn attr_names(refs: &[AttrRef]) -> ApiResult<Vec<String>> {
    refs.iter()
        .map(|r| validate_name(&r.name).map_err(ApiError::Validation))
        .collect()
}

/// Parses a comma-separated list of ids, e.g. `?tags=<id>,<id>`.
fn parse_id_list(param: &str, value: Option<&str>) -> ApiResult<Vec<Uuid>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| ApiError::Validation(format!("Invalid id '{}' in {}", s, param)))
        })
        .collect()
}

async fn list_recipes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListRecipesQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<RecipeSummary>>> {
    let query = query_params(query)?;
    let filter = RecipeFilter {
        tags: parse_id_list("tags", query.tags.as_deref())?,
        ingredients: parse_id_list("ingredients", query.ingredients.as_deref())?,
    };

    let recipes = state.recipes().list(user.id, &filter).await?;
    Ok(Json(recipes.into_iter().map(RecipeSummary::from).collect()))
}

async fn create_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecipeDetail>)> {
    let new = json_body(payload)?.into_new_recipe()?;

    let recipe = state.recipes().create(user.id, &new).await?;
    tracing::info!(id = %recipe.id, user = %user.email, "Created recipe");
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

async fn get_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecipeDetail>> {
    let id = parse_path_id(&id)?;

    let recipe = state
        .recipes()
        .get(user.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(recipe.into()))
}

async fn patch_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<Json<RecipeDetail>> {
    let id = parse_path_id(&id)?;
    let changes = json_body(payload)?.into_changes()?;
    apply_changes(&state, &user, id, &changes).await
}

async fn put_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<Json<RecipeDetail>> {
    let id = parse_path_id(&id)?;
    let changes = json_body(payload)?.into_complete_changes()?;
    apply_changes(&state, &user, id, &changes).await
}

async fn apply_changes(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    changes: &RecipeChanges,
) -> ApiResult<Json<RecipeDetail>> {
    let recipe = state
        .recipes()
        .update(user.id, id, changes)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(id = %recipe.id, user = %user.email, "Updated recipe");
    Ok(Json(recipe.into()))
}

async fn delete_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_path_id(&id)?;

    if !state.recipes().delete(user.id, id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(id = %id, user = %user.email, "Deleted recipe");
    Ok(StatusCode::NO_CONTENT)
}
