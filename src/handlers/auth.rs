use axum::{extract::State, response::Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::user::{AuthResponse, Claims, User, UserResponse};
use crate::state::AppState;

const RESET_PURPOSE: &str = "password_reset";

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,

    pub confirm_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: String,
    purpose: String,
    exp: usize,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let users: Collection<User> = state.db.collection("users");

    // One opaque error for unknown email and for wrong password
    let user = users
        .find_one(doc! { "email": &req.email })
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid =
        verify(&req.password, &user.password_hash).map_err(|_| AppError::InvalidCredentials)?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let user_id = user._id.ok_or(AppError::DocumentNotFound)?;

    let claims = Claims {
        sub: user_id.to_hex(),
        username: user.username.clone(),
        email: user.email.clone(),
        is_superuser: user.is_superuser,
        exp: (Utc::now().timestamp() + 86400) as usize, // 24 hours
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_ref()),
    )
    .map_err(|_| AppError::AuthError)?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(user),
        token,
    }))
}

// JWTs are stateless; logout is an acknowledgement for the UI.
pub async fn logout() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Logged out",
    }))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let users: Collection<User> = state.db.collection("users");
    let user = users
        .find_one(doc! { "email": &req.email })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    let user_id = user._id.ok_or(AppError::DocumentNotFound)?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::minutes(10))
        .ok_or_else(|| AppError::invalid_data("Failed to calculate expiration"))?
        .timestamp() as usize;

    let claims = ResetClaims {
        sub: user_id.to_hex(),
        purpose: RESET_PURPOSE.to_string(),
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_ref()),
    )
    .map_err(|_| AppError::AuthError)?;

    let reset_link = format!("{}/reset-password?token={}", state.config.public_url, token);
    state
        .mail_service
        .send_password_reset(&req.email, &reset_link)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Password reset email sent!",
    })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    if req.new_password != req.confirm_password {
        return Err(AppError::invalid_data("Passwords do not match"));
    }

    let token_data = decode::<ResetClaims>(
        &req.token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AppError::AuthError)?;

    if token_data.claims.purpose != RESET_PURPOSE {
        return Err(AppError::AuthError);
    }

    let user_id = ObjectId::parse_str(&token_data.claims.sub)?;

    let password_hash =
        hash(&req.new_password, DEFAULT_COST).map_err(|_| AppError::invalid_data("Invalid password"))?;

    let users: Collection<User> = state.db.collection("users");
    let result = users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "password_hash": password_hash } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::DocumentNotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Your password has been reset successfully.",
    })))
}
