mod support;

use promptforge::models::{
    generation::AspectRatio,
    users::{NewUser, UserStatus},
};
use promptforge::repositories::state::Action;
use promptforge::services::{auth::AuthPage, generator::ImageGeneratorPage, PageError, Session};

use support::{StubGenerator, ADMIN_EMAIL, ADMIN_PASSWORD};

async fn signed_in(session: &Session) -> String {
    AuthPage::new(session)
        .signup(NewUser {
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn credits(session: &Session, user_id: &str) -> (u64, u64) {
    let state = session.store.snapshot().await.unwrap();
    let roster = state.find_user(user_id).unwrap().credits;
    let current = state.current_user.as_ref().unwrap().credits;
    (roster, current)
}

#[tokio::test]
async fn success_spends_one_credit_and_fills_the_gallery() {
    let generator = StubGenerator::succeeding();
    let session = support::session_with(generator.clone()).await;
    let user_id = signed_in(&session).await;
    let mut page = ImageGeneratorPage::new(&session);

    page.set_prompt("a raccoon in a space suit");
    page.set_negative_prompt("blurry");
    page.set_aspect_ratio(AspectRatio::Portrait);
    let first = page.generate().await.unwrap();
    page.apply_style("Anime");
    let second = page.generate().await.unwrap();

    assert_eq!(credits(&session, &user_id).await, (8, 8));
    assert_eq!(generator.calls(), 2);
    let sent = generator.last_config().unwrap();
    assert_eq!(sent.prompt, "Anime, a raccoon in a space suit");
    assert_eq!(sent.negative_prompt, "blurry");
    assert_eq!(sent.aspect_ratio, AspectRatio::Portrait);

    let gallery: Vec<&str> = page.gallery().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(gallery, [second.id.as_str(), first.id.as_str()]);
    assert_eq!(second.src, "data:image/png;base64,AAAA");
}

#[tokio::test]
async fn failure_refunds_the_credit() {
    let generator = StubGenerator::failing("quota exhausted");
    let session = support::session_with(generator.clone()).await;
    let user_id = signed_in(&session).await;
    let mut page = ImageGeneratorPage::new(&session);
    page.set_prompt("a lighthouse at dusk");

    let err = page.generate().await.unwrap_err();

    match err {
        PageError::Generation(message) => assert!(message.contains("quota exhausted")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(generator.calls(), 1);
    assert_eq!(credits(&session, &user_id).await, (10, 10));
    assert!(page.gallery().is_empty());
}

#[tokio::test]
async fn refusals_do_not_touch_credits_or_the_service() {
    let generator = StubGenerator::succeeding();
    let session = support::session_with(generator.clone()).await;
    let user_id = signed_in(&session).await;
    let mut page = ImageGeneratorPage::new(&session);

    page.set_prompt("   ");
    assert!(matches!(
        page.generate().await.unwrap_err(),
        PageError::EmptyPrompt
    ));

    page.set_prompt("a lighthouse");
    session
        .store
        .dispatch(Action::UpdateUserCredits {
            user_id: user_id.clone(),
            delta: -10,
        })
        .await
        .unwrap();
    assert!(matches!(
        page.generate().await.unwrap_err(),
        PageError::InsufficientCredits
    ));

    assert_eq!(generator.calls(), 0);
    assert_eq!(credits(&session, &user_id).await, (0, 0));
}

#[tokio::test]
async fn blocking_does_not_reach_a_live_session() {
    // Only the roster entry is blocked. The live session keeps generating
    // until it picks up the roster copy again.
    let generator = StubGenerator::succeeding();
    let session = support::session_with(generator.clone()).await;
    let user_id = signed_in(&session).await;
    let state = session
        .store
        .dispatch(Action::ToggleUserStatus {
            user_id: user_id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(state.find_user(&user_id).unwrap().status, UserStatus::Blocked);
    assert_eq!(state.current_user.as_ref().unwrap().status, UserStatus::Active);

    let mut page = ImageGeneratorPage::new(&session);
    page.set_prompt("a lighthouse");
    page.generate().await.unwrap();
    assert_eq!(generator.calls(), 1);

    let roster_copy = state.find_user(&user_id).cloned().unwrap();
    session.store.dispatch(Action::Login(roster_copy)).await.unwrap();
    assert!(matches!(
        page.generate().await.unwrap_err(),
        PageError::GenerationBlocked
    ));
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn admins_cannot_generate() {
    let generator = StubGenerator::succeeding();
    let session = support::session_with(generator.clone()).await;
    AuthPage::new(&session)
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();

    let mut page = ImageGeneratorPage::new(&session);
    page.set_prompt("anything");
    assert!(matches!(
        page.generate().await.unwrap_err(),
        PageError::Unreachable(_)
    ));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn discarding_images_only_touches_the_gallery() {
    let session = support::session().await;
    let user_id = signed_in(&session).await;
    let mut page = ImageGeneratorPage::new(&session);
    page.set_prompt("a lighthouse");
    let image = page.generate().await.unwrap();

    assert!(page.delete_image(&image.id));
    assert!(!page.delete_image(&image.id));
    assert!(page.gallery().is_empty());
    assert_eq!(credits(&session, &user_id).await, (9, 9));
}
