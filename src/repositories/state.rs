//! Session state and its transition function.
//!
//! `reduce` is total: every action maps to a next state, and an action that
//! names an id which does not exist leaves the state as it was. Validation
//! (unique emails, non-empty fields, role checks) happens before dispatch.

use serde::{Deserialize, Serialize};

use crate::models::{
    packages::CreditPackage,
    payments::{PaymentRequest, PaymentStatus},
    storefront::{AppSettings, SettingsUpdate},
    users::{Role, User},
};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct State {
    pub current_user: Option<User>,
    pub users: Vec<User>,
    pub payments: Vec<PaymentRequest>,
    pub settings: AppSettings,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Login(User),
    Logout,
    Signup(User),
    AddPaymentRequest(PaymentRequest),
    UpdatePaymentStatus {
        payment_id: String,
        status: PaymentStatus,
    },
    UpdateUserCredits {
        user_id: String,
        delta: i64,
    },
    ToggleUserStatus {
        user_id: String,
    },
    UpdateSettings(SettingsUpdate),
    AddPackage(CreditPackage),
    UpdatePackage(CreditPackage),
    DeletePackage(String),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login(_) => "LOGIN",
            Action::Logout => "LOGOUT",
            Action::Signup(_) => "SIGNUP",
            Action::AddPaymentRequest(_) => "ADD_PAYMENT_REQUEST",
            Action::UpdatePaymentStatus { .. } => "UPDATE_PAYMENT_STATUS",
            Action::UpdateUserCredits { .. } => "UPDATE_USER_CREDITS",
            Action::ToggleUserStatus { .. } => "TOGGLE_USER_STATUS",
            Action::UpdateSettings(_) => "UPDATE_SETTINGS",
            Action::AddPackage(_) => "ADD_PACKAGE",
            Action::UpdatePackage(_) => "UPDATE_PACKAGE",
            Action::DeletePackage(_) => "DELETE_PACKAGE",
        }
    }
}

/// Whether an action changed anything. Only used for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

/// Computes the snapshot that follows `action`, leaving `state` untouched.
pub fn reduce(state: &State, action: Action) -> State {
    let mut next = state.clone();
    next.apply(action);
    next
}

impl State {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, action: Action) -> Transition {
        match action {
            Action::Login(user) => {
                self.current_user = Some(user);
                Transition::Applied
            }
            Action::Logout => {
                self.current_user = None;
                Transition::Applied
            }
            Action::Signup(user) => {
                self.users.push(user.clone());
                self.current_user = Some(user);
                Transition::Applied
            }
            Action::AddPaymentRequest(request) => {
                self.payments.push(request);
                Transition::Applied
            }
            Action::UpdatePaymentStatus { payment_id, status } => {
                // Only pending requests move, and only to a terminal status.
                match self.payments.iter_mut().find(|p| p.id == payment_id) {
                    Some(payment) if !payment.status.is_terminal() && status.is_terminal() => {
                        payment.status = status;
                        Transition::Applied
                    }
                    _ => Transition::Ignored,
                }
            }
            Action::UpdateUserCredits { user_id, delta } => {
                let mut result = Transition::Ignored;
                if let Some(user) = self.users.iter_mut().find(|u| u.id == user_id) {
                    user.apply_credit_delta(delta);
                    result = Transition::Applied;
                }
                // The session copy is adjusted on its own value so that the
                // synthetic admin, who is not on the roster, is covered too.
                if let Some(current) = self.current_user.as_mut().filter(|u| u.id == user_id) {
                    current.apply_credit_delta(delta);
                    result = Transition::Applied;
                }
                result
            }
            Action::ToggleUserStatus { user_id } => {
                // Roster only. A logged-in session keeps the status it had at login.
                match self.users.iter_mut().find(|u| u.id == user_id) {
                    Some(user) => {
                        user.status = user.status.toggled();
                        Transition::Applied
                    }
                    None => Transition::Ignored,
                }
            }
            Action::UpdateSettings(update) => {
                if let Some(details) = update.payment_details {
                    self.settings.payment_details.merge(details);
                }
                if let Some(packages) = update.credit_packages {
                    self.settings.credit_packages = packages;
                }
                Transition::Applied
            }
            Action::AddPackage(package) => {
                self.settings.credit_packages.push(package);
                Transition::Applied
            }
            Action::UpdatePackage(package) => {
                let packages = &mut self.settings.credit_packages;
                match packages.iter_mut().find(|p| p.id == package.id) {
                    Some(existing) => {
                        *existing = package;
                        Transition::Applied
                    }
                    None => Transition::Ignored,
                }
            }
            Action::DeletePackage(id) => {
                let before = self.settings.credit_packages.len();
                self.settings.credit_packages.retain(|p| p.id != id);
                if self.settings.credit_packages.len() == before {
                    Transition::Ignored
                } else {
                    Transition::Applied
                }
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn current_role(&self) -> Option<Role> {
        self.current_user.as_ref().map(|u| u.role)
    }

    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn find_package(&self, id: &str) -> Option<&CreditPackage> {
        self.settings.credit_packages.iter().find(|p| p.id == id)
    }

    pub fn find_payment(&self, id: &str) -> Option<&PaymentRequest> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn pending_payments(&self) -> impl Iterator<Item = &PaymentRequest> {
        self.payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Pending)
    }

    pub fn total_users(&self) -> usize {
        self.users.len()
    }

    pub fn pending_approvals(&self) -> usize {
        self.pending_payments().count()
    }

    /// Sum of the snapshot prices of approved requests.
    pub fn session_revenue(&self) -> f64 {
        self.payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Approved)
            .map(|p| p.package_price)
            .sum()
    }
}
