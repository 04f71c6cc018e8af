use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::catalog::{Product, ProductCategory, ProductPayload};
use crate::ui::mvi::UiState;

pub const NAME_REQUIRED: &str = "Product name is required";
pub const DESCRIPTION_REQUIRED: &str = "Product description is required";
pub const PRICE_INVALID: &str = "Price must be greater than 0";
pub const CATEGORY_REQUIRED: &str = "Category is required";

/// Validation messages keyed by field. A missing key means the field is valid.
pub type FieldErrors = BTreeMap<FormField, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Name,
    Description,
    Price,
    Category,
    ImageUrl,
    IsAvailable,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Description => "description",
            FormField::Price => "price",
            FormField::Category => "category",
            FormField::ImageUrl => "imageUrl",
            FormField::IsAvailable => "isAvailable",
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, FormField::IsAvailable)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw value typed into a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Field values exactly as entered, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_url: String,
    pub is_available: bool,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: String::new(),
            category: ProductCategory::default().as_str().to_string(),
            image_url: String::new(),
            is_available: true,
        }
    }
}

impl ProductDraft {
    /// Draft prefilled from an existing product, for editing.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category.as_str().to_string(),
            image_url: product.image_url.clone().unwrap_or_default(),
            is_available: product.is_available,
        }
    }

    /// Runs the fixed rule set.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert(FormField::Name, NAME_REQUIRED.to_string());
        }
        if self.description.trim().is_empty() {
            errors.insert(FormField::Description, DESCRIPTION_REQUIRED.to_string());
        }
        if self.parsed_price().is_none() {
            errors.insert(FormField::Price, PRICE_INVALID.to_string());
        }
        if self.parsed_category().is_none() {
            errors.insert(FormField::Category, CATEGORY_REQUIRED.to_string());
        }

        errors
    }

    /// Request body for this draft, or the validation errors.
    pub fn to_payload(&self) -> Result<ProductPayload, FieldErrors> {
        let errors = self.validate();
        match (self.parsed_price(), self.parsed_category()) {
            (Some(price), Some(category)) if errors.is_empty() => Ok(ProductPayload {
                name: self.name.trim().to_string(),
                description: self.description.trim().to_string(),
                price,
                category,
                image_url: Some(self.image_url.trim())
                    .filter(|url| !url.is_empty())
                    .map(str::to_string),
                is_available: self.is_available,
            }),
            _ => Err(errors),
        }
    }

    fn parsed_price(&self) -> Option<Decimal> {
        Decimal::from_str(self.price.trim())
            .ok()
            .filter(|price| *price > Decimal::ZERO)
    }

    fn parsed_category(&self) -> Option<ProductCategory> {
        ProductCategory::from_str(&self.category).ok()
    }

    pub(crate) fn set(&mut self, field: FormField, value: FieldValue) -> bool {
        match (field, value) {
            (FormField::Name, FieldValue::Text(v)) => self.name = v,
            (FormField::Description, FieldValue::Text(v)) => self.description = v,
            (FormField::Price, FieldValue::Text(v)) => self.price = v,
            (FormField::Category, FieldValue::Text(v)) => self.category = v,
            (FormField::ImageUrl, FieldValue::Text(v)) => self.image_url = v,
            (FormField::IsAvailable, FieldValue::Flag(v)) => self.is_available = v,
            _ => return false,
        }
        true
    }
}

/// Everything the product form renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub draft: ProductDraft,
    pub errors: FieldErrors,
    pub dirty: bool,
    pub submitting: bool,
}

impl UiState for FormState {}

impl FormState {
    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
