#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;

use promptforge::models::generation::GenerationConfig;
use promptforge::models::storefront::AppSettings;
use promptforge::repositories::imagen::ImageGenerator;
use promptforge::services::{self, Session};
use promptforge::settings::{Accounts, Admin, Generation, Settings};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Generator double that answers with a fixed outcome and records prompts.
pub struct StubGenerator {
    outcome: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<GenerationConfig>>,
}

impl StubGenerator {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok("data:image/png;base64,AAAA".to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_config(&self) -> Option<GenerationConfig> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ImageGenerator for StubGenerator {
    async fn generate(&self, config: &GenerationConfig) -> Result<String, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(config.clone());
        self.outcome.clone().map_err(|message| anyhow!(message))
    }
}

pub fn settings() -> Settings {
    Settings {
        admin: Admin {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
        accounts: Accounts::default(),
        generation: Generation {
            url: "http://127.0.0.1:9".to_string(),
            model: "imagen-test".to_string(),
            api_key: String::new(),
        },
        storefront: AppSettings::default(),
    }
}

pub async fn session_with(generator: Arc<StubGenerator>) -> Session {
    services::start_services(settings(), generator)
        .await
        .expect("start services")
}

pub async fn session() -> Session {
    session_with(StubGenerator::succeeding()).await
}
