use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CreditPackage {
    pub id: String,
    pub name: String,
    pub credits: u64,
    pub price: f64,
}

impl CreditPackage {
    pub fn new(id: &str, name: &str, credits: u64, price: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            credits,
            price,
        }
    }

    /// Blank template an administrator fills in before saving.
    pub fn draft() -> Self {
        Self {
            id: format!("new_{}", Uuid::new_v4().simple()),
            name: "New Package".to_string(),
            credits: 0,
            price: 0.0,
        }
    }
}
