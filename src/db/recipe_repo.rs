use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::attr_repo::{get_or_create, AttrRow};
use super::{parse_id, parse_timestamp};
use crate::models::{Attr, AttrKind, NewRecipe, Price, Recipe, RecipeChanges};

pub struct RecipeRepository {
    pool: SqlitePool,
}

/// Restricts a recipe listing to recipes referencing any of the given tags
/// and any of the given ingredients. Empty lists do not filter.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
}

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: String,
    title: String,
    description: String,
    time_minutes: i32,
    price_cents: i64,
    link: String,
    created_at: String,
    updated_at: String,
}

impl RecipeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner: Uuid, recipe: &NewRecipe) -> Result<Recipe, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO recipes (id, user_id, title, description, time_minutes, price_cents, link, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(recipe.time_minutes)
        .bind(recipe.price.cents())
        .bind(&recipe.link)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        link_attrs(&mut tx, AttrKind::Tag, owner, id, &recipe.tags).await?;
        link_attrs(&mut tx, AttrKind::Ingredient, owner, id, &recipe.ingredients).await?;

        tx.commit().await?;

        self.get(owner, id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Recipe>, sqlx::Error> {
        let row: Option<RecipeRow> =
            sqlx::query_as("SELECT * FROM recipes WHERE id = ? AND user_id = ?")
                .bind(id.to_string())
                .bind(owner.to_string())
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => self.hydrate_recipe(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Lists the owner's recipes, newest first.
    pub async fn list(&self, owner: Uuid, filter: &RecipeFilter) -> Result<Vec<Recipe>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM recipes WHERE user_id = ");
        query.push_bind(owner.to_string());
        push_link_filter(&mut query, AttrKind::Tag, &filter.tags);
        push_link_filter(&mut query, AttrKind::Ingredient, &filter.ingredients);
        query.push(" ORDER BY created_at DESC, rowid DESC");

        let rows: Vec<RecipeRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in rows {
            recipes.push(self.hydrate_recipe(row).await?);
        }
        Ok(recipes)
    }

    /// Applies a partial update. Returns `None` when the owner has no recipe
    /// with this id.
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current: Option<RecipeRow> =
            sqlx::query_as("SELECT * FROM recipes WHERE id = ? AND user_id = ?")
                .bind(id.to_string())
                .bind(owner.to_string())
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let price_cents = changes
            .price
            .map(|p| p.cents())
            .unwrap_or(current.price_cents);

        sqlx::query(
            r#"
            UPDATE recipes
            SET title = ?, description = ?, time_minutes = ?, price_cents = ?, link = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(changes.title.as_ref().unwrap_or(&current.title))
        .bind(changes.description.as_ref().unwrap_or(&current.description))
        .bind(changes.time_minutes.unwrap_or(current.time_minutes))
        .bind(price_cents)
        .bind(changes.link.as_ref().unwrap_or(&current.link))
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if let Some(tags) = &changes.tags {
            replace_links(&mut tx, AttrKind::Tag, owner, id, tags).await?;
        }
        if let Some(ingredients) = &changes.ingredients {
            replace_links(&mut tx, AttrKind::Ingredient, owner, id, ingredients).await?;
        }

        tx.commit().await?;

        self.get(owner, id).await
    }

    /// Deletes a recipe. Its tags and ingredients are kept; only the
    /// associations go (CASCADE).
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn linked_attrs(&self, kind: AttrKind, recipe_id: &str) -> Result<Vec<Attr>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT a.id, a.name
            FROM {table} a
            JOIN {join} j ON j.{column} = a.id
            WHERE j.recipe_id = ?
            ORDER BY a.name, a.id
            "#,
            table = kind.table(),
            join = kind.join_table(),
            column = kind.join_column(),
        );
        let rows: Vec<AttrRow> = sqlx::query_as(&sql)
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Attr::try_from).collect()
    }

    async fn hydrate_recipe(&self, row: RecipeRow) -> Result<Recipe, sqlx::Error> {
        let tags = self.linked_attrs(AttrKind::Tag, &row.id).await?;
        let ingredients = self.linked_attrs(AttrKind::Ingredient, &row.id).await?;

        Ok(Recipe {
            id: parse_id(&row.id)?,
            title: row.title,
            description: row.description,
            time_minutes: row.time_minutes,
            price: Price::from_cents(row.price_cents)
                .map_err(|e| sqlx::Error::Decode(e.into()))?,
            link: row.link,
            tags,
            ingredients,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn push_link_filter(query: &mut QueryBuilder<'_, Sqlite>, kind: AttrKind, ids: &[Uuid]) {
    if ids.is_empty() {
        return;
    }
    query.push(format!(
        " AND id IN (SELECT recipe_id FROM {} WHERE {} IN (",
        kind.join_table(),
        kind.join_column()
    ));
    let mut list = query.separated(", ");
    for id in ids {
        list.push_bind(id.to_string());
    }
    list.push_unseparated("))");
}

async fn link_attrs(
    conn: &mut SqliteConnection,
    kind: AttrKind,
    owner: Uuid,
    recipe_id: Uuid,
    names: &[String],
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} (recipe_id, {}) VALUES (?, ?)",
        kind.join_table(),
        kind.join_column()
    );
    for name in names {
        let attr = get_or_create(&mut *conn, kind, owner, name).await?;
        sqlx::query(&sql)
            .bind(recipe_id.to_string())
            .bind(attr.id.to_string())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn replace_links(
    conn: &mut SqliteConnection,
    kind: AttrKind,
    owner: Uuid,
    recipe_id: Uuid,
    names: &[String],
) -> Result<(), sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE recipe_id = ?", kind.join_table());
    sqlx::query(&sql)
        .bind(recipe_id.to_string())
        .execute(&mut *conn)
        .await?;
    link_attrs(conn, kind, owner, recipe_id, names).await
}
