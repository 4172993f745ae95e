use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::models::storefront::AppSettings;
use crate::repositories::{imagen::ImageGenerator, state::State};
use crate::settings::Settings;

pub mod admin;
pub mod auth;
pub mod console;
pub mod gate;
pub mod generator;
pub mod purchases;
pub mod store;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
}

/// User-visible refusals raised by the pages before anything is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),
    #[error("Password must be at least {0} characters.")]
    PasswordTooShort(usize),
    #[error("An account with this email already exists.")]
    DuplicateEmail,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Your account has been blocked. Please contact support.")]
    AccountBlocked,
    #[error("Transaction ID is required.")]
    MissingTransactionId,
    #[error("You must be logged in to make a purchase.")]
    NotLoggedIn,
    #[error("Could not find the credit package.")]
    PackageNotFound,
    #[error("Could not find the payment request.")]
    PaymentNotFound,
    #[error("This payment request has already been processed.")]
    PaymentNotPending,
    #[error("Could not find the user.")]
    UserNotFound,
    #[error("Please enter a non-zero amount.")]
    ZeroAmount,
    #[error("Please enter a prompt.")]
    EmptyPrompt,
    #[error("Unknown style preset: {0}.")]
    UnknownStyle(String),
    #[error("Your account is blocked. You cannot generate images.")]
    GenerationBlocked,
    #[error("You don't have enough credits to generate an image.")]
    InsufficientCredits,
    #[error("{0}")]
    Generation(String),
    #[error("The {0} page is not available in this session.")]
    Unreachable(&'static str),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    /// Handles requests one at a time, in arrival order.
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            handler.handle_request(request).await;
        }
    }
}

/// Everything a view needs for one session.
#[derive(Clone)]
pub struct Session {
    pub store: store::StoreHandle,
    pub generator: Arc<dyn ImageGenerator>,
    pub settings: Arc<Settings>,
}

pub async fn start_services(
    settings: Settings,
    generator: Arc<dyn ImageGenerator>,
) -> Result<Session, anyhow::Error> {
    let storefront: AppSettings = settings.storefront.clone();

    log::info!(
        "Starting store service with {} credit packages.",
        storefront.credit_packages.len()
    );
    let store = store::spawn(State::new(storefront));

    Ok(Session {
        store,
        generator,
        settings: Arc::new(settings),
    })
}
