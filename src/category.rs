//! Category labels and the canonical form used to compare them.
//!
//! Categories are free-text labels chosen by the user. Two labels refer to the
//! same category when their canonical keys are equal, which makes "Food",
//! "food" and " FOOD " interchangeable everywhere categories are compared.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The category given to transactions created without one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// The canonical comparison key for a category label.
pub fn category_key(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Whether two category labels refer to the same category.
pub(crate) fn same_category(left: &str, right: &str) -> bool {
    category_key(left) == category_key(right)
}

/// A validated, non-empty category label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategory] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name for a transaction, falling back to
    /// [DEFAULT_CATEGORY] when `name` is absent or blank.
    pub fn or_default(name: Option<&str>) -> Self {
        name.and_then(|name| Self::new(name).ok())
            .unwrap_or_else(|| Self(DEFAULT_CATEGORY.to_owned()))
    }

    /// The canonical comparison key for this category.
    pub fn key(&self) -> String {
        category_key(&self.0)
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
