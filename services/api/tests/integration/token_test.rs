use savora_api::error::ApiError;
use savora_api::usecase::token::{
    LogoutUseCase, RefreshTokenUseCase, issue_refresh_token, mint_token_pair,
};
use savora_auth_types::digest::token_digest;
use savora_auth_types::token::{AuthError, validate_access_token, validate_token};

use crate::helpers::{
    MockUserRepo, TEST_ACCESS_SECRET, TEST_REFRESH_SECRET, test_keys, test_user,
};

// ── Minting ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_mint_pair_that_validates() {
    let user = test_user("0550000000");
    let pair = mint_token_pair(user.id, &test_keys()).unwrap();

    let info = validate_access_token(&pair.access_token, TEST_ACCESS_SECRET).unwrap();
    assert_eq!(info.user_id, user.id);

    let claims = validate_token(&pair.refresh_token, TEST_REFRESH_SECRET).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
}

#[tokio::test]
async fn should_sign_tokens_with_independent_secrets() {
    let user = test_user("0550000000");
    let pair = mint_token_pair(user.id, &test_keys()).unwrap();

    // An access token must not validate under the refresh secret, and vice
    // versa.
    let err = validate_token(&pair.access_token, TEST_REFRESH_SECRET).unwrap_err();
    assert!(matches!(err, AuthError::InvalidSignature));
    let err = validate_token(&pair.refresh_token, TEST_ACCESS_SECRET).unwrap_err();
    assert!(matches!(err, AuthError::InvalidSignature));
}

// ── RefreshTokenUseCase ──────────────────────────────────────────────────────

fn refresh_uc(users: &MockUserRepo) -> RefreshTokenUseCase<MockUserRepo> {
    RefreshTokenUseCase {
        users: users.clone(),
        keys: test_keys(),
    }
}

#[tokio::test]
async fn should_refresh_with_valid_token_and_digest() {
    let mut user = test_user("0550000000");
    let refresh = issue_refresh_token(user.id, &test_keys()).unwrap();
    user.refresh_token_digest = Some(token_digest(&refresh));
    let user_id = user.id;
    let users = MockUserRepo::new(vec![user]);

    let out = refresh_uc(&users).execute(&refresh).await.unwrap();

    assert_eq!(out.user.id, user_id);
    let info = validate_access_token(&out.tokens.access_token, TEST_ACCESS_SECRET).unwrap();
    assert_eq!(info.user_id, user_id);
}

#[tokio::test]
async fn should_rotate_digest_on_refresh() {
    let mut user = test_user("0550000000");
    let refresh = issue_refresh_token(user.id, &test_keys()).unwrap();
    user.refresh_token_digest = Some(token_digest(&refresh));
    let user_id = user.id;
    let users = MockUserRepo::new(vec![user]);

    let out = refresh_uc(&users).execute(&refresh).await.unwrap();

    // The stored digest now matches the new token, not the presented one.
    let stored = users.get(user_id).unwrap();
    assert_eq!(
        stored.refresh_token_digest.as_deref(),
        Some(token_digest(&out.tokens.refresh_token).as_str())
    );
    assert_ne!(
        stored.refresh_token_digest.as_deref(),
        Some(token_digest(&refresh).as_str())
    );

    // Replaying the old token fails: rotation is one-way.
    let replay = refresh_uc(&users).execute(&refresh).await;
    assert!(
        matches!(replay, Err(ApiError::RefreshTokenMismatch)),
        "expected RefreshTokenMismatch, got {replay:?}"
    );

    // The rotated token is good for exactly the next refresh.
    refresh_uc(&users)
        .execute(&out.tokens.refresh_token)
        .await
        .unwrap();
}

#[tokio::test]
async fn should_reject_garbage_refresh_token() {
    let users = MockUserRepo::new(vec![test_user("0550000000")]);
    let result = refresh_uc(&users).execute("not-a-jwt").await;
    assert!(
        matches!(result, Err(ApiError::RefreshTokenInvalid)),
        "expected RefreshTokenInvalid, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_refresh_when_digest_never_stored() {
    let user = test_user("0550000000");
    let refresh = issue_refresh_token(user.id, &test_keys()).unwrap();
    let users = MockUserRepo::new(vec![user]);

    // Valid signature, but the identity holds no matching digest.
    let result = refresh_uc(&users).execute(&refresh).await;
    assert!(
        matches!(result, Err(ApiError::RefreshTokenMismatch)),
        "expected RefreshTokenMismatch, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_refresh_for_unknown_user() {
    let user = test_user("0550000000");
    let refresh = issue_refresh_token(user.id, &test_keys()).unwrap();
    let users = MockUserRepo::empty();

    let result = refresh_uc(&users).execute(&refresh).await;
    assert!(matches!(result, Err(ApiError::RefreshTokenMismatch)));
}

// ── LogoutUseCase ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_clear_digest_on_logout() {
    let mut user = test_user("0550000000");
    user.refresh_token_digest = Some("some-digest".to_owned());
    let user_id = user.id;
    let users = MockUserRepo::new(vec![user]);

    LogoutUseCase {
        users: users.clone(),
    }
    .execute(user_id)
    .await
    .unwrap();

    assert!(users.get(user_id).unwrap().refresh_token_digest.is_none());
}
