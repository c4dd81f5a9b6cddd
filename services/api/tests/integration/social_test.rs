use savora_api::domain::types::{SocialAccount, User};
use savora_api::error::ApiError;
use savora_api::usecase::social::{SocialLoginInput, SocialLoginUseCase};

use crate::helpers::{MockGoogleVerifier, MockUserRepo, test_google_identity};

fn login_input(provider: &str) -> SocialLoginInput {
    SocialLoginInput {
        provider: provider.to_owned(),
        id_token: "opaque-google-id-token".to_owned(),
    }
}

#[tokio::test]
async fn should_reject_unsupported_provider() {
    let uc = SocialLoginUseCase {
        users: MockUserRepo::empty(),
        verifier: MockGoogleVerifier::asserting(test_google_identity()),
    };
    let result = uc.execute(login_input("facebook")).await;
    assert!(
        matches!(result, Err(ApiError::Validation(_))),
        "expected Validation, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_invalid_id_token() {
    let uc = SocialLoginUseCase {
        users: MockUserRepo::empty(),
        verifier: MockGoogleVerifier::rejecting(),
    };
    let result = uc.execute(login_input("google")).await;
    assert!(matches!(result, Err(ApiError::GoogleTokenInvalid)));
}

#[tokio::test]
async fn should_create_user_with_scaffolding_on_first_login() {
    let users = MockUserRepo::empty();
    let uc = SocialLoginUseCase {
        users: users.clone(),
        verifier: MockGoogleVerifier::asserting(test_google_identity()),
    };

    let out = uc.execute(login_input("google")).await.unwrap();

    assert!(out.mobile_required, "no mobile yet, verification required");
    let user = users.get(out.user_id).unwrap();
    assert!(user.mobile_number.is_none());
    assert_eq!(user.email.as_deref(), Some("user@example.com"));
    assert_eq!(user.full_name.as_deref(), Some("Amine"));
    assert_eq!(user.wallet_balance, 0);
    assert!(user.refresh_token_digest.is_none(), "no tokens before mobile verification");
    assert!(matches!(
        user.social,
        Some(SocialAccount::Google(ref g)) if g.id == "google-sub-123"
    ));
}

#[tokio::test]
async fn should_link_existing_user_by_email() {
    let mut existing = User::scaffold(Some("0550000000".to_owned()), None, Some("user@example.com".to_owned()));
    existing.mobile_verified = true;
    let user_id = existing.id;
    let users = MockUserRepo::new(vec![existing]);

    let uc = SocialLoginUseCase {
        users: users.clone(),
        verifier: MockGoogleVerifier::asserting(test_google_identity()),
    };
    let out = uc.execute(login_input("google")).await.unwrap();

    assert_eq!(out.user_id, user_id, "matched by email, not re-created");
    assert!(!out.mobile_required, "mobile already verified");
    let user = users.get(user_id).unwrap();
    assert!(matches!(user.social, Some(SocialAccount::Google(_))));
}

#[tokio::test]
async fn should_find_by_google_id_on_return_visit() {
    let users = MockUserRepo::empty();
    let verifier = MockGoogleVerifier::asserting(test_google_identity());

    let first = SocialLoginUseCase {
        users: users.clone(),
        verifier: verifier.clone(),
    }
    .execute(login_input("google"))
    .await
    .unwrap();

    let second = SocialLoginUseCase {
        users: users.clone(),
        verifier,
    }
    .execute(login_input("google"))
    .await
    .unwrap();

    assert_eq!(first.user_id, second.user_id);
    assert_eq!(users.users.lock().unwrap().len(), 1);
}
