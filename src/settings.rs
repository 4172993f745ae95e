use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::models::storefront::AppSettings;

#[derive(Clone, Debug, Deserialize)]
pub struct Admin {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Accounts {
    pub starter_credits: u64,
    pub min_password_length: usize,
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            starter_credits: 10,
            min_password_length: 6,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Generation {
    pub url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub admin: Admin,
    #[serde(default)]
    pub accounts: Accounts,
    pub generation: Generation,
    #[serde(default)]
    pub storefront: AppSettings,
}

impl Settings {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("generation.url", "https://generativelanguage.googleapis.com")?
            .set_default("generation.model", "imagen-3.0-generate-002")?
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("PROMPTFORGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}
