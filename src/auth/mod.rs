pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Represents the payload for a sign-in request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    /// User's email address.
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// User's password.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Represents the payload for a new account sign-up request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Email address for the new account.
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    /// Display name for the new account.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

/// Response structure after a successful sign-in.
/// Contains the JWT access token and the ID of the authenticated user.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    /// The JWT (JSON Web Token) for session authentication.
    pub access_token: String,
    /// The unique identifier of the authenticated user.
    pub user_id: i32,
}
