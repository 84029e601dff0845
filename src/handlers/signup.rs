//! Two-step OTP-gated signup.
//!
//! Step 1 issues a code tied to the requested email and mails it to the
//! fixed approver mailbox (never to the requester). Step 2 accepts the code
//! back, consumes it, and creates the account. Both steps reject an email
//! that already has an account.

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use mongodb::{bson::doc, Collection};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::user::User;
use crate::services::otp_service::OtpService;
use crate::state::AppState;

// Request DTOs
#[derive(Debug, Deserialize, Validate)]
pub struct RequestOtpRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifySignupRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(min = 6, max = 6, message = "OTP must be 6 digits"))]
    pub code: String,

    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

// Response DTOs
#[derive(Debug, Serialize)]
pub struct RequestOtpResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VerifySignupResponse {
    pub success: bool,
    pub message: String,
}

async fn email_already_registered(state: &AppState, email: &str) -> Result<bool> {
    let users: Collection<User> = state.db.collection("users");
    Ok(users.find_one(doc! { "email": email }).await?.is_some())
}

// 1. Request OTP
pub async fn request_otp(
    State(state): State<AppState>,
    Json(req): Json<RequestOtpRequest>,
) -> Result<Json<RequestOtpResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    if !state.otp_throttle.check(&req.email, Utc::now()) {
        tracing::warn!("OTP request throttled for {}", req.email);
        return Err(AppError::RateLimitExceeded);
    }

    if email_already_registered(&state, &req.email).await? {
        return Err(AppError::EmailTaken);
    }

    let otp = state.otp_service.issue(&req.email).await?;

    // The OTP row stays persisted even when the mail transport fails; the
    // requester sees the transport error and can retry, which issues a new
    // code.
    if let Err(e) = state
        .mail_service
        .send_signup_otp(
            &req.email,
            &req.username,
            &otp.code,
            state.otp_service.ttl_minutes(),
        )
        .await
    {
        tracing::error!("Failed to send signup OTP email: {}", e);
        return Err(e);
    }

    Ok(Json(RequestOtpResponse {
        success: true,
        message: "Approval code sent for review".to_string(),
    }))
}

// 2. Verify OTP and create the account
pub async fn verify_signup(
    State(state): State<AppState>,
    Json(req): Json<VerifySignupRequest>,
) -> Result<(StatusCode, Json<VerifySignupResponse>)> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    if email_already_registered(&state, &req.email).await? {
        return Err(AppError::EmailTaken);
    }

    // Single-use: the code is consumed here whatever happens downstream.
    if !state.otp_service.consume(&req.email, &req.code).await? {
        return Err(AppError::OtpInvalid);
    }

    // Defensive re-check, redundant with generation
    if !OtpService::is_valid_code_format(&req.code) {
        return Err(AppError::invalid_data("OTP must be 6 digits"));
    }

    let password_hash =
        hash(&req.password, DEFAULT_COST).map_err(|_| AppError::invalid_data("Invalid password"))?;

    let user = User {
        _id: None,
        username: req.username.clone(),
        email: req.email.clone(),
        password_hash,
        is_superuser: false,
        created_at: Utc::now(),
    };

    let users: Collection<User> = state.db.collection("users");
    users.insert_one(&user).await?;

    tracing::info!("Account created for {}", req.email);

    Ok((
        StatusCode::CREATED,
        Json(VerifySignupResponse {
            success: true,
            message: "Account created successfully! Please log in.".to_string(),
        }),
    ))
}
