//! Token builders signed with the shared test secret.

use chrono::Utc;
use common::jwt::{TokenClaims, TokenService, TokenSubject, DEFAULT_TOKEN_TTL};
use common::secret::SecretString;
use common::types::Role;

/// `JWT_SECRET` used by every test server.
pub const TEST_JWT_SECRET: &str = "hostel-test-secret";

/// Token service keyed with `TEST_JWT_SECRET`.
pub fn test_token_service() -> TokenService {
    TokenService::new(&SecretString::from(TEST_JWT_SECRET), DEFAULT_TOKEN_TTL)
}

fn subject(user_id: &str, role: Role) -> TokenSubject {
    TokenSubject {
        user_id: user_id.to_string(),
        email: format!("{user_id}@hostel.test"),
        name: format!("{user_id} name"),
        role,
    }
}

/// Valid token for `user_id` with `role`.
pub fn token_for(user_id: &str, role: Role) -> String {
    test_token_service()
        .issue(&subject(user_id, role))
        .expect("test token should sign")
}

/// Valid student token.
pub fn student_token(user_id: &str) -> String {
    token_for(user_id, Role::Student)
}

/// Valid admin token.
pub fn admin_token(user_id: &str) -> String {
    token_for(user_id, Role::Admin)
}

/// Token whose validity window ended a minute ago.
pub fn expired_token(user_id: &str) -> String {
    let now = Utc::now().timestamp();
    let subject = subject(user_id, Role::Student);
    test_token_service()
        .sign(&TokenClaims {
            user_id: subject.user_id,
            email: subject.email,
            name: subject.name,
            role: subject.role,
            iat: now - 3600,
            exp: now - 60,
        })
        .expect("test token should sign")
}

/// Valid-looking token signed with a different secret.
pub fn foreign_token(user_id: &str) -> String {
    TokenService::new(&SecretString::from("some-other-secret"), DEFAULT_TOKEN_TTL)
        .issue(&subject(user_id, Role::Admin))
        .expect("test token should sign")
}
