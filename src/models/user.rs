use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// An account that owns recipes, ingredients and tags.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    /// Unique, compared case-insensitively.
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)?;
        if let Some(name) = &self.name {
            write!(f, " ({})", name)?;
        }
        if !self.is_active {
            write!(f, " [inactive]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let user = User::new("alice@example.com").with_name("Alice");
        assert_eq!(user.to_string(), "alice@example.com (Alice)");

        let mut user = User::new("bob@example.com");
        user.is_active = false;
        assert_eq!(user.to_string(), "bob@example.com [inactive]");
    }
}
