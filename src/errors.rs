// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Document not found")]
    DocumentNotFound,

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired OTP")]
    OtpInvalid,

    #[error("Authentication error")]
    AuthError,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Email authentication failed: {0}")]
    MailAuthentication(String),

    #[error("Email sending failed: {0}")]
    MailTransport(String),

    #[error("Row {row}: missing or invalid value for column '{column}'")]
    ImportRow { row: usize, column: String },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Multipart error: {0}")]
    Multipart(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MongoDB(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string()),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
            AppError::DocumentNotFound => (StatusCode::NOT_FOUND, "Document not found".to_string()),
            AppError::InvalidObjectId(_) => (StatusCode::BAD_REQUEST, "Invalid ID format".to_string()),
            AppError::EmailTaken => (StatusCode::CONFLICT, "Email already registered".to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string()),
            AppError::OtpInvalid => (StatusCode::BAD_REQUEST, "Invalid or expired OTP".to_string()),
            AppError::AuthError => (StatusCode::UNAUTHORIZED, "Authentication failed".to_string()),
            AppError::Unauthorized => (StatusCode::FORBIDDEN, "Unauthorized access".to_string()),
            AppError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded".to_string()),
            AppError::MailAuthentication(_) => (StatusCode::BAD_GATEWAY, "Email authentication failed".to_string()),
            AppError::MailTransport(_) => (StatusCode::BAD_GATEWAY, "Email sending failed".to_string()),
            AppError::ImportRow { .. } => (StatusCode::BAD_REQUEST, "Import failed".to_string()),
            AppError::Spreadsheet(_) => (StatusCode::BAD_REQUEST, "Spreadsheet error".to_string()),
            AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "Invalid multipart data".to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

// Manual From implementations
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ValidationError(format!("JSON parsing error: {}", err))
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        AppError::InvalidObjectId(err.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::Multipart(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Spreadsheet(err.to_string())
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn spreadsheet(msg: impl Into<String>) -> Self {
        AppError::Spreadsheet(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
