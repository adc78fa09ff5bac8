//! Authentication boundary: credentials, password hashing and bearer tokens.
//!
//! Knows nothing about HTTP or storage.

pub mod claims;
pub mod credentials;
pub mod jwt;
pub mod password;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use credentials::{Email, validate_name, validate_password};
pub use jwt::{DEFAULT_TOKEN_TTL_SECS, Hs256Jwt, JwtValidator, TokenError};
pub use password::{PasswordError, hash_password, verify_password};
pub use user::{NewUser, User, UserProfile, UserSummary};
