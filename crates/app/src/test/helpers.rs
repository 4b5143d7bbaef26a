//! Test Helpers

use crate::domain::products::models::{CategoryUuid, NewProduct, ProductUuid};

pub(crate) fn new_product(title: &str, price: u64, stock: u64) -> NewProduct {
    NewProduct {
        uuid: ProductUuid::new(),
        category: CategoryUuid::new(),
        title: title.to_string(),
        description: format!("{title} for tests"),
        image: None,
        price,
        stock,
    }
}
