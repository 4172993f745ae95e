use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{packages::CreditPackage, users::User};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
        }
    }
}

/// A purchaser's claim of having paid for a package. The user and package
/// fields are copies taken at submission time and are not refreshed when the
/// package is later edited.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PaymentRequest {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub package_id: String,
    pub package_name: String,
    pub package_price: f64,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl PaymentRequest {
    pub fn new(user: &User, package: &CreditPackage, transaction_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().hyphenated().to_string(),
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            package_id: package.id.clone(),
            package_name: package.name.clone(),
            package_price: package.price,
            transaction_id: transaction_id.to_string(),
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
