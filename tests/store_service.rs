use promptforge::models::{
    packages::CreditPackage,
    payments::{PaymentRequest, PaymentStatus},
    storefront::{AppSettings, PaymentDetailsUpdate, SettingsUpdate},
    users::{NewUser, User},
};
use promptforge::repositories::state::{Action, State, Transition};
use promptforge::services::store;

fn member(email: &str, name: &str) -> User {
    User::member(
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: "password".to_string(),
        },
        10,
    )
}

#[tokio::test]
async fn signup_scenario() {
    let handle = store::spawn(State::new(AppSettings::default()));

    let state = handle
        .dispatch(Action::Signup(member("a@x.com", "A")))
        .await
        .unwrap();

    assert_eq!(state.users.len(), 1);
    assert_eq!(state.users[0].credits, 10);
    assert!(state.is_authenticated());
}

#[tokio::test]
async fn approval_scenario_credits_exactly_the_package() {
    let handle = store::spawn(State::new(AppSettings::default()));
    let user = member("a@x.com", "A");
    handle.dispatch(Action::Signup(user.clone())).await.unwrap();

    let package = CreditPackage::new("pkg1", "Starter Pack", 100, 50.0);
    let request = PaymentRequest::new(&user, &package, "TRX-42");
    let before = handle
        .dispatch(Action::AddPaymentRequest(request.clone()))
        .await
        .unwrap();
    assert_eq!(before.pending_approvals(), 1);

    handle
        .dispatch(Action::UpdatePaymentStatus {
            payment_id: request.id.clone(),
            status: PaymentStatus::Approved,
        })
        .await
        .unwrap();
    let after = handle
        .dispatch(Action::UpdateUserCredits {
            user_id: user.id.clone(),
            delta: 100,
        })
        .await
        .unwrap();

    assert_eq!(after.find_user(&user.id).unwrap().credits, 110);
    assert_eq!(
        after.find_payment(&request.id).unwrap().status,
        PaymentStatus::Approved
    );
    assert_eq!(after.pending_approvals(), before.pending_approvals() - 1);
}

#[tokio::test]
async fn negative_delta_clamps_scenario() {
    let handle = store::spawn(State::default());
    let mut user = member("a@x.com", "A");
    user.credits = 3;
    handle.dispatch(Action::Signup(user.clone())).await.unwrap();

    let state = handle
        .dispatch(Action::UpdateUserCredits {
            user_id: user.id.clone(),
            delta: -5,
        })
        .await
        .unwrap();

    assert_eq!(state.users[0].credits, 0);
    assert_eq!(state.current_user.unwrap().credits, 0);
}

#[tokio::test]
async fn partial_payment_details_scenario() {
    let handle = store::spawn(State::default());
    let original = handle.snapshot().await.unwrap().settings.payment_details;

    let state = handle
        .dispatch(Action::UpdateSettings(SettingsUpdate {
            payment_details: Some(PaymentDetailsUpdate {
                account_number: Some("123".to_string()),
                ..Default::default()
            }),
            credit_packages: None,
        }))
        .await
        .unwrap();

    let details = state.settings.payment_details;
    assert_eq!(details.account_number, "123");
    assert_eq!(details.method_name, original.method_name);
    assert_eq!(details.qr_code_url, original.qr_code_url);
}

#[tokio::test]
async fn transitions_apply_in_send_order() {
    let handle = store::spawn(State::default());
    let user = member("a@x.com", "A");
    handle.dispatch(Action::Signup(user.clone())).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..50 {
        let handle = handle.clone();
        let user_id = user.id.clone();
        tasks.push(tokio::spawn(async move {
            handle
                .dispatch(Action::UpdateUserCredits { user_id, delta: 2 })
                .await
                .unwrap()
        }));
    }
    for task in tasks {
        let state = task.await.unwrap();
        let roster = state.find_user(&user.id).unwrap().credits;
        assert_eq!(Some(roster), state.current_user.as_ref().map(|u| u.credits));
    }

    let state = handle.snapshot().await.unwrap();
    assert_eq!(state.users[0].credits, 110);
}

#[tokio::test]
async fn subscribers_see_applied_transitions() {
    let handle = store::spawn(State::default());
    let mut snapshots = handle.subscribe();

    handle
        .dispatch(Action::AddPackage(CreditPackage::new("pkg4", "Mega", 3000, 1000.0)))
        .await
        .unwrap();

    snapshots.changed().await.unwrap();
    assert_eq!(snapshots.borrow().settings.credit_packages.len(), 4);
}

#[tokio::test]
async fn missing_ids_are_silent_no_ops() {
    let handle = store::spawn(State::default());
    let before = handle.snapshot().await.unwrap();

    for action in [
        Action::DeletePackage("nope".to_string()),
        Action::UpdatePackage(CreditPackage::new("nope", "Nope", 1, 1.0)),
        Action::UpdatePaymentStatus {
            payment_id: "nope".to_string(),
            status: PaymentStatus::Rejected,
        },
        Action::ToggleUserStatus {
            user_id: "nope".to_string(),
        },
    ] {
        let state = handle.dispatch(action).await.unwrap();
        assert_eq!(state, before);
    }
}

#[tokio::test]
async fn apply_reports_whether_the_action_took_effect() {
    let handle = store::spawn(State::default());
    let user = member("a@x.com", "A");
    handle.dispatch(Action::Signup(user.clone())).await.unwrap();
    let request = PaymentRequest::new(&user, &CreditPackage::new("pkg1", "Starter", 100, 50.0), "T");
    handle
        .dispatch(Action::AddPaymentRequest(request.clone()))
        .await
        .unwrap();

    let approve = Action::UpdatePaymentStatus {
        payment_id: request.id.clone(),
        status: PaymentStatus::Approved,
    };
    let (state, transition) = handle.apply(approve.clone()).await.unwrap();
    assert_eq!(transition, Transition::Applied);
    assert_eq!(state.payments[0].status, PaymentStatus::Approved);

    let (again, transition) = handle.apply(approve).await.unwrap();
    assert_eq!(transition, Transition::Ignored);
    assert_eq!(again, state);
}
