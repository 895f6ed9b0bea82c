// tests/reset_token_tests.rs
mod common;
use biudzetas::services::auth_service;
use biudzetas::services::reset_token::{issue_reset_token, verify_reset_token, ResetToken, ResetTokenStatus};
use chrono::{Duration, Utc};
use common::*;

#[tokio::test]
async fn fresh_token_resolves_to_its_user() {
  let state = test_state().await;
  let id = insert_user(&state, "ona", "ona@pastas.lt").await;
  let user = auth_service::find_user_by_id(&state.db_pool, id).await.unwrap().unwrap();

  let token = issue_reset_token(&state.signer, &user, Duration::seconds(1800), Utc::now()).unwrap();
  let status = verify_reset_token(&state.db_pool, &state.signer, &token, Duration::seconds(1800), Utc::now())
    .await
    .unwrap();
  match status {
    ResetTokenStatus::Valid(found) => assert_eq!(found.id, id),
    other => panic!("Expected a valid token, got {:?}", other),
  }
}

#[tokio::test]
async fn token_past_its_lifetime_is_expired() {
  let state = test_state().await;
  let id = insert_user(&state, "ona", "ona@pastas.lt").await;
  let user = auth_service::find_user_by_id(&state.db_pool, id).await.unwrap().unwrap();

  let issued = Utc::now() - Duration::seconds(1801);
  let token = issue_reset_token(&state.signer, &user, Duration::seconds(1800), issued).unwrap();
  let status = verify_reset_token(&state.db_pool, &state.signer, &token, Duration::seconds(1800), Utc::now())
    .await
    .unwrap();
  assert!(matches!(status, ResetTokenStatus::Expired));
}

#[tokio::test]
async fn token_for_missing_user_is_invalid() {
  let state = test_state().await;
  let token = ResetToken::new(4242, Utc::now()).encode(&state.signer, Duration::seconds(1800)).unwrap();
  let status = verify_reset_token(&state.db_pool, &state.signer, &token, Duration::seconds(1800), Utc::now())
    .await
    .unwrap();
  assert!(matches!(status, ResetTokenStatus::Invalid));
}

#[tokio::test]
async fn garbage_token_is_invalid() {
  let state = test_state().await;
  let status = verify_reset_token(&state.db_pool, &state.signer, "not.a-token", Duration::seconds(1800), Utc::now())
    .await
    .unwrap();
  assert!(matches!(status, ResetTokenStatus::Invalid));
}
