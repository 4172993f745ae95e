use super::gate::{self, Page};
use super::{store::StoreHandle, PageError, Session};
use crate::models::{
    packages::CreditPackage, payments::PaymentRequest, storefront::PaymentDetails,
};
use crate::repositories::state::Action;

pub struct BuyCreditsPage {
    store: StoreHandle,
}

impl BuyCreditsPage {
    pub fn new(session: &Session) -> Self {
        Self {
            store: session.store.clone(),
        }
    }

    pub async fn packages(&self) -> Result<Vec<CreditPackage>, PageError> {
        let state = self.store.snapshot().await?;
        gate::require(&state, Page::BuyCredits)?;
        Ok(state.settings.credit_packages)
    }

    pub async fn payment_details(&self) -> Result<PaymentDetails, PageError> {
        let state = self.store.snapshot().await?;
        gate::require(&state, Page::BuyCredits)?;
        Ok(state.settings.payment_details)
    }

    /// Files a pending request for admin verification. No credits move here.
    pub async fn submit_payment(
        &self,
        package_id: &str,
        transaction_id: &str,
    ) -> Result<PaymentRequest, PageError> {
        if transaction_id.trim().is_empty() {
            return Err(PageError::MissingTransactionId);
        }

        let state = self.store.snapshot().await?;
        let user = state.current_user.as_ref().ok_or(PageError::NotLoggedIn)?;
        gate::require(&state, Page::BuyCredits)?;
        let package = state
            .find_package(package_id)
            .ok_or(PageError::PackageNotFound)?;

        let request = PaymentRequest::new(user, package, transaction_id);
        self.store
            .dispatch(Action::AddPaymentRequest(request.clone()))
            .await?;

        log::info!(
            "Payment request {} filed by {} for package {}.",
            request.id,
            request.user_id,
            request.package_id
        );
        Ok(request)
    }
}
