use axum::{routing::post, Router};

use crate::handlers::{auth, signup};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        // Two-step OTP-gated signup
        .route("/signup/request-otp", post(signup::request_otp))
        .route("/signup/verify", post(signup::verify_signup))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
}
