use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The kinds of named, user-owned items that recipes can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Ingredient,
    Tag,
}

impl AttrKind {
    /// Table holding items of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            AttrKind::Ingredient => "ingredients",
            AttrKind::Tag => "tags",
        }
    }

    /// Join table linking recipes to items of this kind.
    pub fn join_table(&self) -> &'static str {
        match self {
            AttrKind::Ingredient => "recipe_ingredients",
            AttrKind::Tag => "recipe_tags",
        }
    }

    /// Foreign-key column in the join table.
    pub fn join_column(&self) -> &'static str {
        match self {
            AttrKind::Ingredient => "ingredient_id",
            AttrKind::Tag => "tag_id",
        }
    }

    /// URL segment the resource is served under.
    pub fn path(&self) -> &'static str {
        self.table()
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrKind::Ingredient => write!(f, "ingredient"),
            AttrKind::Tag => write!(f, "tag"),
        }
    }
}

/// An ingredient or tag as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attr {
    pub id: Uuid,
    pub name: String,
}

impl Attr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

pub const MAX_NAME_LEN: usize = 255;

/// Trims a submitted name and checks it is usable.
pub fn validate_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name must not be empty".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        ));
    }
    Ok(name.to_string())
}
