//! Credential and bearer-token lifecycle across the auth seams.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use farmlink_core::{Role, UserId};
use farmlink_server::services::auth::{
    AuthError, hash_password, issue_token, validate_password, verify_password, verify_token,
};

fn jwt_secret() -> SecretString {
    SecretString::from("fT9#kQ2$wE5&rY7*uI1^oP3@aS6!dG8%")
}

#[test]
fn test_registration_shaped_credential_flow() {
    // Validate, hash, then verify: the same sequence registration and
    // login run, including the seeder's bulk path.
    let password = "gandaki-valley-farms";
    validate_password(password).unwrap();

    let stored = hash_password(password).unwrap();
    assert!(stored.starts_with("$argon2"));
    verify_password(password, &stored).unwrap();

    assert!(matches!(
        verify_password("wrong-password", &stored),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn test_issued_token_round_trips_identity_and_role() {
    let user_id = UserId::generate();
    let token = issue_token(user_id, Role::Seller, &jwt_secret(), 3600).unwrap();

    let claims = verify_token(&token, &jwt_secret()).unwrap();
    assert_eq!(claims.sub.parse::<UserId>().unwrap(), user_id);
    assert_eq!(claims.role, Role::Seller);
}

#[test]
fn test_token_is_bound_to_signing_secret() {
    let token = issue_token(UserId::generate(), Role::Customer, &jwt_secret(), 3600).unwrap();
    let other = SecretString::from("zX4$cV6&bN8*mK0^lJ2@hG5!fD7%sA9#");

    assert!(matches!(
        verify_token(&token, &other),
        Err(AuthError::InvalidToken)
    ));
}

#[test]
fn test_tampered_token_rejected() {
    let token = issue_token(UserId::generate(), Role::Customer, &jwt_secret(), 3600).unwrap();

    // Flip a character in the payload segment
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    assert_eq!(parts.len(), 3);
    let tampered_payload = if parts[1].starts_with('A') {
        parts[1].replacen('A', "B", 1)
    } else {
        format!("A{}", &parts[1][1..])
    };
    parts[1] = tampered_payload;

    assert!(matches!(
        verify_token(&parts.join("."), &jwt_secret()),
        Err(AuthError::InvalidToken)
    ));
}
