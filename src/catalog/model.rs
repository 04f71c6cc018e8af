//! Catalog records as exchanged with the server.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Cached product collections hold shared, read-only snapshots.
pub type ProductList = Vec<Arc<Product>>;

/// Closed set of menu categories.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    #[default]
    Appetizer,
    MainCourse,
    Dessert,
    Beverage,
    SideDish,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown product category '{0}'")]
pub struct UnknownCategory(pub String);

impl ProductCategory {
    pub const ALL: [ProductCategory; 5] = [
        ProductCategory::Appetizer,
        ProductCategory::MainCourse,
        ProductCategory::Dessert,
        ProductCategory::Beverage,
        ProductCategory::SideDish,
    ];

    /// Wire name, e.g. `MAIN_COURSE`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Appetizer => "APPETIZER",
            ProductCategory::MainCourse => "MAIN_COURSE",
            ProductCategory::Dessert => "DESSERT",
            ProductCategory::Beverage => "BEVERAGE",
            ProductCategory::SideDish => "SIDE_DISH",
        }
    }

    /// Human-readable label, e.g. `Main Course`.
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Appetizer => "Appetizer",
            ProductCategory::MainCourse => "Main Course",
            ProductCategory::Dessert => "Dessert",
            ProductCategory::Beverage => "Beverage",
            ProductCategory::SideDish => "Side Dish",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = UnknownCategory;

    /// Accepts wire names in any case; spaces and dashes count as underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        ProductCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A catalog record as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "price_as_number")]
    pub price: Decimal,
    pub category: ProductCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Product {
    /// Description cut to `max_chars` characters, with an ellipsis when cut.
    pub fn summary(&self, max_chars: usize) -> String {
        if self.description.chars().count() <= max_chars {
            return self.description.clone();
        }
        let cut: String = self.description.chars().take(max_chars).collect();
        format!("{}...", cut)
    }

    pub fn availability_label(&self) -> &'static str {
        if self.is_available {
            "Available"
        } else {
            "Unavailable"
        }
    }
}

/// Body for `POST /products` and `PUT /products/{id}`. Server-assigned
/// fields are never sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "price_as_number")]
    pub price: Decimal,
    pub category: ProductCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

/// Variables of the update mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    pub id: String,
    pub payload: ProductPayload,
}

fn default_available() -> bool {
    true
}

fn price_as_number<S: Serializer>(price: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    match price.to_f64() {
        Some(value) => serializer.serialize_f64(value),
        None => serializer.serialize_str(&price.to_string()),
    }
}

fn id_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
