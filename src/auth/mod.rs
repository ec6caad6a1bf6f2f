/// Authentication module
///
/// Password hashing, access token issuance/validation, refresh token
/// management, and `Authorization` header parsing.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;

pub use claims::{Claims, ACCESS_TOKEN_ISSUER};
pub use credentials::{extract_api_key, extract_bearer, parse_authorization, AuthorizationCredential};
pub use jwt::{decode_access_token, issue_access_token, validate_access_token, DEFAULT_ACCESS_TOKEN_TTL_SECONDS};
pub use password::{validate_new_password, PasswordHasher, MAX_PASSWORD_BYTES};
pub use refresh_token::{generate_refresh_token, RefreshTokenStore, REFRESH_TOKEN_LIFETIME_DAYS};
