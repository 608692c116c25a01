mod attr;
mod price;
mod recipe;
mod user;

pub use attr::{validate_name, Attr, AttrKind, MAX_NAME_LEN};
pub use price::Price;
pub use recipe::{NewRecipe, Recipe, RecipeChanges};
pub use user::User;
