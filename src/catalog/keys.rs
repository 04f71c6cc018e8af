//! Cache keys of catalog queries. Every key lives under [`products`], so
//! invalidating that prefix refreshes the whole catalog.

use crate::catalog::model::ProductCategory;
use crate::query::QueryKey;

pub const PRODUCTS: &str = "products";

pub fn products() -> QueryKey {
    QueryKey::new([PRODUCTS])
}

pub fn featured() -> QueryKey {
    products().with("featured")
}

pub fn product(id: &str) -> QueryKey {
    products().with("detail").with(id)
}

pub fn category(category: ProductCategory) -> QueryKey {
    products().with("category").with(category.as_str())
}
