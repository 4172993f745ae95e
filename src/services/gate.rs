//! Which pages a session may reach, derived from the current snapshot.

use super::PageError;
use crate::models::users::Role;
use crate::repositories::state::State;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Auth,
    ImageGenerator,
    BuyCredits,
    AdminDashboard,
    UserManagement,
    PaymentVerification,
    Settings,
}

const USER_PAGES: [Page; 2] = [Page::ImageGenerator, Page::BuyCredits];
const ADMIN_PAGES: [Page; 4] = [
    Page::AdminDashboard,
    Page::UserManagement,
    Page::PaymentVerification,
    Page::Settings,
];

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Auth => "/auth",
            Page::ImageGenerator | Page::AdminDashboard => "/",
            Page::BuyCredits => "/buy-credits",
            Page::UserManagement => "/user-management",
            Page::PaymentVerification => "/payment-verification",
            Page::Settings => "/settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Auth => "Login",
            Page::ImageGenerator => "Image Generator",
            Page::BuyCredits => "Buy Credits",
            Page::AdminDashboard => "Dashboard",
            Page::UserManagement => "User Management",
            Page::PaymentVerification => "Payment Verification",
            Page::Settings => "Settings",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Render(Page),
    Redirect(&'static str),
}

/// Sidebar entries for the session, in display order.
pub fn navigation(state: &State) -> &'static [Page] {
    match state.current_role() {
        None => &[Page::Auth],
        Some(Role::User) => &USER_PAGES,
        Some(Role::Admin) => &ADMIN_PAGES,
    }
}

pub fn route(state: &State, path: &str) -> Route {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if path == Page::Auth.path() {
        return if state.is_authenticated() {
            Route::Redirect("/")
        } else {
            Route::Render(Page::Auth)
        };
    }

    if !state.is_authenticated() {
        return Route::Redirect("/auth");
    }

    navigation(state)
        .iter()
        .find(|page| page.path() == path)
        .map(|page| Route::Render(*page))
        .unwrap_or(Route::Redirect("/"))
}

/// First page of the session's page set. Every redirect lands here.
pub fn landing(state: &State) -> Page {
    navigation(state)[0]
}

/// Follows a redirect, if any, to the page that ends up rendered.
pub fn resolve(state: &State, path: &str) -> Page {
    match route(state, path) {
        Route::Render(page) => page,
        Route::Redirect(_) => landing(state),
    }
}

/// Refuses the operation unless `page` belongs to the session's page set.
pub fn require(state: &State, page: Page) -> Result<(), PageError> {
    if navigation(state).contains(&page) {
        Ok(())
    } else {
        Err(PageError::Unreachable(page.title()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::{NewUser, User};
    use crate::repositories::state::{reduce, Action};

    fn member_session() -> State {
        let user = User::member(
            NewUser {
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                password: "password".to_string(),
            },
            10,
        );
        reduce(&State::default(), Action::Signup(user))
    }

    fn admin_session() -> State {
        reduce(
            &State::default(),
            Action::Login(User::admin("admin@example.com")),
        )
    }

    #[test]
    fn anonymous_sessions_only_reach_auth() {
        let state = State::default();
        assert_eq!(route(&state, "/auth"), Route::Render(Page::Auth));
        assert_eq!(route(&state, "/"), Route::Redirect("/auth"));
        assert_eq!(route(&state, "/settings"), Route::Redirect("/auth"));
        assert!(require(&state, Page::BuyCredits).is_err());
    }

    #[test]
    fn members_reach_generation_and_purchase() {
        let state = member_session();
        assert_eq!(route(&state, "/"), Route::Render(Page::ImageGenerator));
        assert_eq!(route(&state, "/buy-credits/"), Route::Render(Page::BuyCredits));
        assert_eq!(route(&state, "/auth"), Route::Redirect("/"));
        assert_eq!(route(&state, "/settings"), Route::Redirect("/"));
        assert!(require(&state, Page::PaymentVerification).is_err());
    }

    #[test]
    fn admins_reach_the_back_office() {
        let state = admin_session();
        assert_eq!(route(&state, "/"), Route::Render(Page::AdminDashboard));
        assert_eq!(
            route(&state, "/payment-verification"),
            Route::Render(Page::PaymentVerification)
        );
        assert_eq!(route(&state, "/buy-credits"), Route::Redirect("/"));
        assert_eq!(route(&state, "/nowhere"), Route::Redirect("/"));
        assert!(require(&state, Page::Settings).is_ok());
        assert!(require(&state, Page::ImageGenerator).is_err());
    }

    #[test]
    fn redirects_resolve_to_the_landing_page() {
        assert_eq!(resolve(&State::default(), "/settings"), Page::Auth);
        assert_eq!(resolve(&member_session(), "/auth"), Page::ImageGenerator);
        assert_eq!(resolve(&admin_session(), "/buy-credits"), Page::AdminDashboard);
        assert_eq!(
            resolve(&admin_session(), "/user-management"),
            Page::UserManagement
        );
    }

    #[test]
    fn blocked_members_stay_routed() {
        let mut state = member_session();
        if let Some(user) = state.current_user.as_mut() {
            user.status = crate::models::users::UserStatus::Blocked;
        }
        assert_eq!(route(&state, "/"), Route::Render(Page::ImageGenerator));
    }
}
