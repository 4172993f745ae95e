use serde::{Deserialize, Serialize};

use super::packages::CreditPackage;

pub const PLACEHOLDER_QR: &str = "assets/placeholder-qr.png";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PaymentDetails {
    pub method_name: String,
    pub account_number: String,
    /// Opaque image reference, usually a data URI.
    pub qr_code_url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct PaymentDetailsUpdate {
    pub method_name: Option<String>,
    pub account_number: Option<String>,
    pub qr_code_url: Option<String>,
}

impl PaymentDetails {
    pub fn merge(&mut self, update: PaymentDetailsUpdate) {
        if let Some(method_name) = update.method_name {
            self.method_name = method_name;
        }
        if let Some(account_number) = update.account_number {
            self.account_number = account_number;
        }
        if let Some(qr_code_url) = update.qr_code_url {
            self.qr_code_url = qr_code_url;
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AppSettings {
    pub payment_details: PaymentDetails,
    /// Display order.
    pub credit_packages: Vec<CreditPackage>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            payment_details: PaymentDetails {
                method_name: "Bkash/Nagad".to_string(),
                account_number: "01700000000".to_string(),
                qr_code_url: PLACEHOLDER_QR.to_string(),
            },
            credit_packages: vec![
                CreditPackage::new("pkg1", "Starter Pack", 100, 50.0),
                CreditPackage::new("pkg2", "Pro Pack", 500, 200.0),
                CreditPackage::new("pkg3", "Business Pack", 1200, 500.0),
            ],
        }
    }
}

/// Partial settings carried by `Action::UpdateSettings`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SettingsUpdate {
    pub payment_details: Option<PaymentDetailsUpdate>,
    pub credit_packages: Option<Vec<CreditPackage>>,
}
