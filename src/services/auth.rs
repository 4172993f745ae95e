use std::sync::Arc;

use super::gate::{self, Page};
use super::{store::StoreHandle, PageError, Session};
use crate::models::users::{NewUser, User};
use crate::repositories::state::Action;
use crate::settings::Settings;

pub struct AuthPage {
    store: StoreHandle,
    settings: Arc<Settings>,
}

impl AuthPage {
    pub fn new(session: &Session) -> Self {
        Self {
            store: session.store.clone(),
            settings: session.settings.clone(),
        }
    }

    /// Configured administrator first, then the roster.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, PageError> {
        let state = self.store.snapshot().await?;
        gate::require(&state, Page::Auth)?;
        let email = email.trim();

        let admin = &self.settings.admin;
        if email == admin.email && password == admin.password {
            let user = User::admin(&admin.email);
            self.store.dispatch(Action::Login(user.clone())).await?;
            log::info!("Administrator logged in.");
            return Ok(user);
        }

        let user = state
            .users
            .iter()
            .find(|u| u.email == email && u.password.as_deref() == Some(password))
            .cloned()
            .ok_or(PageError::InvalidCredentials)?;

        if user.is_blocked() {
            log::warn!("Refused login for blocked user {}.", user.id);
            return Err(PageError::AccountBlocked);
        }

        self.store.dispatch(Action::Login(user.clone())).await?;
        log::info!("User {} logged in.", user.id);
        Ok(user)
    }

    pub async fn signup(&self, new_user: NewUser) -> Result<User, PageError> {
        let new_user = NewUser {
            name: new_user.name.trim().to_string(),
            email: new_user.email.trim().to_string(),
            password: new_user.password,
        };

        if new_user.name.is_empty() {
            return Err(PageError::MissingField("name"));
        }
        if new_user.email.is_empty() {
            return Err(PageError::MissingField("email"));
        }
        if new_user.password.is_empty() {
            return Err(PageError::MissingField("password"));
        }
        let min_length = self.settings.accounts.min_password_length;
        if new_user.password.chars().count() < min_length {
            return Err(PageError::PasswordTooShort(min_length));
        }

        let state = self.store.snapshot().await?;
        gate::require(&state, Page::Auth)?;
        if state.find_user_by_email(&new_user.email).is_some() {
            return Err(PageError::DuplicateEmail);
        }

        let user = User::member(new_user, self.settings.accounts.starter_credits);
        self.store.dispatch(Action::Signup(user.clone())).await?;
        log::info!("User {} signed up with {} credits.", user.id, user.credits);
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), PageError> {
        self.store.dispatch(Action::Logout).await?;
        log::info!("Session logged out.");
        Ok(())
    }
}
