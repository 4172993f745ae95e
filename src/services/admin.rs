use serde::Serialize;

use super::gate::{self, Page};
use super::{store::StoreHandle, PageError, Session};
use crate::models::{
    packages::CreditPackage,
    payments::{PaymentRequest, PaymentStatus},
    storefront::{PaymentDetails, PaymentDetailsUpdate, SettingsUpdate},
    users::User,
};
use crate::repositories::state::{Action, State, Transition};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_users: usize,
    pub pending_approvals: usize,
    pub session_revenue: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SavedPackage {
    Added,
    Updated,
}

/// Back-office pages: dashboard, user management, payment verification and
/// settings.
pub struct AdminPages {
    store: StoreHandle,
}

impl AdminPages {
    pub fn new(session: &Session) -> Self {
        Self {
            store: session.store.clone(),
        }
    }

    async fn open(&self, page: Page) -> Result<State, PageError> {
        let state = self.store.snapshot().await?;
        gate::require(&state, page)?;
        Ok(state)
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, PageError> {
        let state = self.open(Page::AdminDashboard).await?;

        Ok(DashboardStats {
            total_users: state.total_users(),
            pending_approvals: state.pending_approvals(),
            session_revenue: state.session_revenue(),
        })
    }

    pub async fn users(&self) -> Result<Vec<User>, PageError> {
        Ok(self.open(Page::UserManagement).await?.users)
    }

    pub async fn adjust_credits(&self, user_id: &str, delta: i64) -> Result<User, PageError> {
        if delta == 0 {
            return Err(PageError::ZeroAmount);
        }
        let state = self.open(Page::UserManagement).await?;
        state.find_user(user_id).ok_or(PageError::UserNotFound)?;

        let next = self
            .store
            .dispatch(Action::UpdateUserCredits {
                user_id: user_id.to_string(),
                delta,
            })
            .await?;

        log::info!("Adjusted credits of {} by {}.", user_id, delta);
        next.find_user(user_id).cloned().ok_or(PageError::UserNotFound)
    }

    pub async fn toggle_status(&self, user_id: &str) -> Result<User, PageError> {
        let state = self.open(Page::UserManagement).await?;
        state.find_user(user_id).ok_or(PageError::UserNotFound)?;

        let next = self
            .store
            .dispatch(Action::ToggleUserStatus {
                user_id: user_id.to_string(),
            })
            .await?;

        let user = next.find_user(user_id).cloned().ok_or(PageError::UserNotFound)?;
        log::info!("User {} is now {}.", user.id, user.status.as_str());
        Ok(user)
    }

    pub async fn pending_payments(&self) -> Result<Vec<PaymentRequest>, PageError> {
        let state = self.open(Page::PaymentVerification).await?;
        Ok(state.pending_payments().cloned().collect())
    }

    /// Marks the request approved and grants the package's current credit
    /// amount to the purchaser.
    pub async fn approve(&self, payment_id: &str) -> Result<(PaymentRequest, u64), PageError> {
        let state = self.open(Page::PaymentVerification).await?;
        let payment = pending(&state, payment_id)?;
        let credits = state
            .find_package(&payment.package_id)
            .map(|package| package.credits)
            .ok_or(PageError::PackageNotFound)?;

        settle(&self.store, &payment, PaymentStatus::Approved).await?;
        let next = self
            .store
            .dispatch(Action::UpdateUserCredits {
                user_id: payment.user_id.clone(),
                delta: i64::try_from(credits).unwrap_or(i64::MAX),
            })
            .await?;

        log::info!(
            "Approved payment {} and granted {} credits to {}.",
            payment.id,
            credits,
            payment.user_id
        );
        let approved = next
            .find_payment(payment_id)
            .cloned()
            .ok_or(PageError::PaymentNotFound)?;
        Ok((approved, credits))
    }

    pub async fn reject(&self, payment_id: &str) -> Result<PaymentRequest, PageError> {
        let state = self.open(Page::PaymentVerification).await?;
        let payment = pending(&state, payment_id)?;

        let next = settle(&self.store, &payment, PaymentStatus::Rejected).await?;
        next.find_payment(payment_id)
            .cloned()
            .ok_or(PageError::PaymentNotFound)
    }

    pub async fn payment_details(&self) -> Result<PaymentDetails, PageError> {
        Ok(self.open(Page::Settings).await?.settings.payment_details)
    }

    pub async fn update_payment_details(
        &self,
        update: PaymentDetailsUpdate,
    ) -> Result<PaymentDetails, PageError> {
        self.open(Page::Settings).await?;

        let next = self
            .store
            .dispatch(Action::UpdateSettings(SettingsUpdate {
                payment_details: Some(update),
                credit_packages: None,
            }))
            .await?;

        log::info!("Payment details updated.");
        Ok(next.settings.payment_details)
    }

    pub async fn upload_qr_code(&self, reference: &str) -> Result<PaymentDetails, PageError> {
        if reference.trim().is_empty() {
            return Err(PageError::MissingField("QR code"));
        }
        self.update_payment_details(PaymentDetailsUpdate {
            qr_code_url: Some(reference.trim().to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn packages(&self) -> Result<Vec<CreditPackage>, PageError> {
        Ok(self.open(Page::Settings).await?.settings.credit_packages)
    }

    /// Updates the package with the same id, or appends it when new.
    pub async fn save_package(&self, package: CreditPackage) -> Result<SavedPackage, PageError> {
        let state = self.open(Page::Settings).await?;

        let (action, saved) = match state.find_package(&package.id) {
            Some(_) => (Action::UpdatePackage(package.clone()), SavedPackage::Updated),
            None => (Action::AddPackage(package.clone()), SavedPackage::Added),
        };
        self.store.dispatch(action).await?;

        log::info!("Package {} saved ({:?}).", package.id, saved);
        Ok(saved)
    }

    pub async fn delete_package(&self, id: &str) -> Result<(), PageError> {
        self.open(Page::Settings).await?;
        self.store.dispatch(Action::DeletePackage(id.to_string())).await?;

        log::info!("Package {} deleted.", id);
        Ok(())
    }
}

/// Moves a pending request to `status`. Fails when another caller settled it
/// first, which the store reports as an ignored transition.
async fn settle(
    store: &StoreHandle,
    payment: &PaymentRequest,
    status: PaymentStatus,
) -> Result<State, PageError> {
    let (next, transition) = store
        .apply(Action::UpdatePaymentStatus {
            payment_id: payment.id.clone(),
            status,
        })
        .await?;

    if transition == Transition::Ignored {
        return Err(PageError::PaymentNotPending);
    }
    log::info!("Payment {} is now {}.", payment.id, status.as_str());
    Ok(next)
}

fn pending(state: &State, payment_id: &str) -> Result<PaymentRequest, PageError> {
    let payment = state
        .find_payment(payment_id)
        .ok_or(PageError::PaymentNotFound)?;

    if payment.status.is_terminal() {
        return Err(PageError::PaymentNotPending);
    }
    Ok(payment.clone())
}
