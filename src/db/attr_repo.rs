use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::parse_id;
use crate::models::{Attr, AttrKind};

/// Storage for ingredients and tags.
///
/// Every query is scoped by the owner id passed in; rows of other users are
/// never read or written.
pub struct AttrRepository {
    pool: SqlitePool,
    kind: AttrKind,
}

#[derive(sqlx::FromRow)]
pub(super) struct AttrRow {
    id: String,
    name: String,
}

impl TryFrom<AttrRow> for Attr {
    type Error = sqlx::Error;

    fn try_from(row: AttrRow) -> Result<Self, Self::Error> {
        Ok(Attr {
            id: parse_id(&row.id)?,
            name: row.name,
        })
    }
}

impl AttrRepository {
    pub fn new(pool: SqlitePool, kind: AttrKind) -> Self {
        Self { pool, kind }
    }

    /// Lists the owner's items ordered by name descending.
    ///
    /// With `assigned_only`, only items referenced by at least one of the
    /// owner's recipes are returned, each once.
    pub async fn list(&self, owner: Uuid, assigned_only: bool) -> Result<Vec<Attr>, sqlx::Error> {
        let table = self.kind.table();
        let sql = if assigned_only {
            format!(
                r#"
                SELECT DISTINCT a.id, a.name
                FROM {table} a
                JOIN {join} j ON j.{column} = a.id
                JOIN recipes r ON r.id = j.recipe_id
                WHERE a.user_id = ?1 AND r.user_id = ?1
                ORDER BY a.name DESC, a.id DESC
                "#,
                table = table,
                join = self.kind.join_table(),
                column = self.kind.join_column(),
            )
        } else {
            format!(
                "SELECT id, name FROM {} WHERE user_id = ?1 ORDER BY name DESC, id DESC",
                table
            )
        };

        let rows: Vec<AttrRow> = sqlx::query_as(&sql)
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Attr::try_from).collect()
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Attr>, sqlx::Error> {
        let sql = format!(
            "SELECT id, name FROM {} WHERE id = ? AND user_id = ?",
            self.kind.table()
        );
        let row: Option<AttrRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .bind(owner.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Attr::try_from).transpose()
    }

    pub async fn create(&self, owner: Uuid, name: &str) -> Result<Attr, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, self.kind, owner, name).await
    }

    /// Renames an item. Returns `None` when the owner has no item with this id.
    pub async fn rename(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Attr>, sqlx::Error> {
        let sql = format!(
            "UPDATE {} SET name = ? WHERE id = ? AND user_id = ?",
            self.kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(name)
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(owner, id).await
    }

    /// Deletes an item and, through CASCADE, its recipe associations.
    /// Returns false when the owner has no item with this id.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let sql = format!(
            "DELETE FROM {} WHERE id = ? AND user_id = ?",
            self.kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert(
    conn: &mut SqliteConnection,
    kind: AttrKind,
    owner: Uuid,
    name: &str,
) -> Result<Attr, sqlx::Error> {
    let attr = Attr::new(name);
    let sql = format!(
        "INSERT INTO {} (id, user_id, name) VALUES (?, ?, ?)",
        kind.table()
    );
    sqlx::query(&sql)
        .bind(attr.id.to_string())
        .bind(owner.to_string())
        .bind(&attr.name)
        .execute(&mut *conn)
        .await?;
    Ok(attr)
}

/// Finds the owner's item with exactly this name, creating it if missing.
pub(super) async fn get_or_create(
    conn: &mut SqliteConnection,
    kind: AttrKind,
    owner: Uuid,
    name: &str,
) -> Result<Attr, sqlx::Error> {
    let sql = format!(
        "SELECT id, name FROM {} WHERE user_id = ? AND name = ? ORDER BY rowid LIMIT 1",
        kind.table()
    );
    let existing: Option<AttrRow> = sqlx::query_as(&sql)
        .bind(owner.to_string())
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    match existing {
        Some(row) => Attr::try_from(row),
        None => insert(conn, kind, owner, name).await,
    }
}
