/// Error Handling Module
///
/// Unified error handling for the service:
/// 1. Domain-specific error types (validation, storage, authentication, config)
/// 2. A central `AppError` used for control flow
/// 3. HTTP response mapping that never discloses internal reasons
/// 4. Structured error logging with context

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooLong(String, usize),
    InvalidFormat(String),
    InvalidParameter(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::InvalidParameter(name) => write!(f, "Invalid {} parameter", name),
        }
    }
}

impl StdError for ValidationError {}

/// Storage operation errors
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    QueryExecution(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::QueryExecution(msg) => write!(f, "Query error: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionPool(err.to_string())
            }
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                DatabaseError::UniqueConstraintViolation(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) => DatabaseError::QueryExecution(db_err.message().to_string()),
            _ => DatabaseError::UnexpectedError(err.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Authentication errors.
///
/// Every kind stays distinct here for logging and tests; the HTTP mapping
/// collapses them so callers cannot tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Password did not match the stored hash
    CredentialMismatch,
    /// Login email has no account
    UnknownEmail,
    /// Hashing backend failed, or a stored hash could not be parsed
    HashingFault(String),
    TokenExpired,
    TokenRevoked,
    TokenNotFound,
    TokenMalformed,
    SignatureInvalid,
    IssuerMismatch,
    HeaderMissing,
    HeaderMalformed,
    ApiKeyMismatch,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::CredentialMismatch => write!(f, "Password does not match"),
            AuthError::UnknownEmail => write!(f, "No account for email"),
            AuthError::HashingFault(msg) => write!(f, "Password hashing failed: {}", msg),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenRevoked => write!(f, "Token has been revoked"),
            AuthError::TokenNotFound => write!(f, "Token not found"),
            AuthError::TokenMalformed => write!(f, "Token is malformed"),
            AuthError::SignatureInvalid => write!(f, "Token signature is invalid"),
            AuthError::IssuerMismatch => write!(f, "Token issuer mismatch"),
            AuthError::HeaderMissing => write!(f, "Missing Authorization header"),
            AuthError::HeaderMalformed => write!(f, "Malformed Authorization header"),
            AuthError::ApiKeyMismatch => write!(f, "API key does not match"),
        }
    }
}

impl StdError for AuthError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    /// Authentication failed on a protected resource; always a 401
    Unauthenticated(AuthError),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl AppError {
    pub fn unauthenticated(err: AuthError) -> Self {
        AppError::Unauthenticated(err)
    }

    /// The internal authentication reason, if any.
    pub fn auth_kind(&self) -> Option<&AuthError> {
        match self {
            AppError::Auth(e) | AppError::Unauthenticated(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Unauthenticated(e) => write!(f, "Unauthenticated: {}", e),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.into())
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

pub const INCORRECT_CREDENTIALS_MESSAGE: &str = "Incorrect email or password";

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for correlating with server logs
    pub error_id: String,
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn internal_server_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error".to_string(),
    )
}

fn unauthorized() -> (StatusCode, &'static str, String) {
    (
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED",
        "Unauthorized".to_string(),
    )
}

fn auth_error_parts(err: &AuthError) -> (StatusCode, &'static str, String) {
    match err {
        AuthError::CredentialMismatch | AuthError::UnknownEmail => (
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            INCORRECT_CREDENTIALS_MESSAGE.to_string(),
        ),
        AuthError::HashingFault(_) => internal_server_error(),
        AuthError::HeaderMissing | AuthError::HeaderMalformed => (
            StatusCode::BAD_REQUEST,
            "INVALID_AUTHORIZATION_HEADER",
            "Invalid Authorization header".to_string(),
        ),
        AuthError::ApiKeyMismatch => unauthorized(),
        _ => (
            StatusCode::UNAUTHORIZED,
            "TOKEN_INVALID",
            "Invalid or expired token".to_string(),
        ),
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    fn response_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => (
                    StatusCode::CONFLICT,
                    "DUPLICATE_ENTRY",
                    "Resource already exists".to_string(),
                ),
                DatabaseError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "Resource not found".to_string(),
                ),
                DatabaseError::ConnectionPool(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service temporarily unavailable".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error occurred".to_string(),
                ),
            },

            AppError::Auth(e) => auth_error_parts(e),

            AppError::Unauthenticated(AuthError::HashingFault(_)) => internal_server_error(),
            AppError::Unauthenticated(_) => unauthorized(),

            AppError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "You do not have permission to access this resource".to_string(),
            ),

            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            ),

            AppError::Internal(_) => internal_server_error(),
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = self.response_parts();

        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Database(e) => {
                tracing::error!(request_id = request_id, error = %e, "Database error");
            }
            AppError::Auth(AuthError::HashingFault(msg))
            | AppError::Unauthenticated(AuthError::HashingFault(msg)) => {
                tracing::error!(request_id = request_id, error = %msg, "Password hashing fault");
            }
            AppError::Auth(e) | AppError::Unauthenticated(e) => match e {
                AuthError::CredentialMismatch | AuthError::UnknownEmail => {
                    tracing::warn!(request_id = request_id, error = %e, "Invalid credentials attempt");
                }
                _ => {
                    tracing::warn!(request_id = request_id, error = %e, "Authentication error");
                }
            },
            AppError::Forbidden(msg) => {
                tracing::warn!(request_id = request_id, error = %msg, "Forbidden");
            }
            AppError::NotFound(msg) => {
                tracing::debug!(request_id = request_id, error = %msg, "Not found");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        self.response_parts().0
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Error context for enhanced logging and debugging
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn log_error(&self, error: &AppError) {
        let context = serde_json::json!({
            "request_id": self.request_id,
            "operation": self.operation,
            "user_id": self.user_id,
            "timestamp": self.timestamp.to_rfc3339(),
        });

        match error {
            AppError::Validation(_) | AppError::NotFound(_) | AppError::Forbidden(_) => {
                tracing::warn!(error = %error, context = ?context, "Request rejected");
            }
            AppError::Auth(e) | AppError::Unauthenticated(e) if !matches!(e, AuthError::HashingFault(_)) => {
                tracing::warn!(error = %error, context = ?context, "Authentication error");
            }
            _ => {
                tracing::error!(error = %error, context = ?context, "Operation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_body(err: &AppError) -> (StatusCode, ErrorResponse) {
        <AppError as ErrorHandler>::error_response(err, "test-id")
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email".to_string());
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = AuthError::TokenRevoked.into();
        assert_eq!(app_err.auth_kind(), Some(&AuthError::TokenRevoked));
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let (status_a, body_a) = status_and_body(&AppError::Auth(AuthError::UnknownEmail));
        let (status_b, body_b) = status_and_body(&AppError::Auth(AuthError::CredentialMismatch));

        assert_eq!(status_a, StatusCode::UNAUTHORIZED);
        assert_eq!(status_a, status_b);
        assert_eq!(body_a.code, body_b.code);
        assert_eq!(body_a.message, body_b.message);
        assert_eq!(body_a.message, INCORRECT_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_token_errors_share_one_response() {
        let kinds = [
            AuthError::TokenExpired,
            AuthError::TokenRevoked,
            AuthError::TokenNotFound,
            AuthError::TokenMalformed,
            AuthError::SignatureInvalid,
            AuthError::IssuerMismatch,
        ];

        for kind in kinds {
            let (status, body) = status_and_body(&AppError::Auth(kind.clone()));
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{:?}", kind);
            assert_eq!(body.code, "TOKEN_INVALID");
            assert_eq!(body.message, "Invalid or expired token");
        }
    }

    #[test]
    fn test_header_errors_are_bad_requests() {
        let (status, _) = status_and_body(&AppError::Auth(AuthError::HeaderMissing));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = status_and_body(&AppError::Auth(AuthError::HeaderMalformed));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unauthenticated_is_always_401() {
        let (status, body) = status_and_body(&AppError::unauthenticated(AuthError::HeaderMalformed));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.code, "UNAUTHORIZED");
    }

    #[test]
    fn test_hashing_fault_is_server_error() {
        let err = AppError::Auth(AuthError::HashingFault("rng".to_string()));
        assert_eq!(ResponseError::status_code(&err), StatusCode::INTERNAL_SERVER_ERROR);
        let (_, body) = status_and_body(&err);
        assert!(!body.message.contains("rng"));
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("test_operation");
        assert_eq!(ctx.operation, "test_operation");
        assert!(ctx.user_id.is_none());

        let ctx_with_user = ctx.with_user_id("user-123".to_string());
        assert_eq!(ctx_with_user.user_id, Some("user-123".to_string()));
    }
}
