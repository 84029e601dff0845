// config.rs
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,

    // SMTP settings, defaults mirror the original deployment
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,

    // Signup OTPs go to this mailbox, never to the requester
    pub approver_email: String,

    // Base URL used in password reset links
    pub public_url: String,

    pub otp_ttl_minutes: i64,
    pub otp_sweep_interval_secs: u64,
    pub otp_request_limit: u32,
    pub otp_request_window_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .expect("PORT must be a number");

        let smtp_username = env::var("EMAIL_HOST_USER").unwrap_or_default();
        let from_email = env::var("DEFAULT_FROM_EMAIL").unwrap_or_else(|_| {
            if smtp_username.is_empty() {
                "no-reply@example.com".to_string()
            } else {
                smtp_username.clone()
            }
        });

        AppConfig {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "msystem".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            smtp_host: env::var("EMAIL_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("EMAIL_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .expect("EMAIL_PORT must be a number"),
            smtp_username,
            smtp_password: env::var("EMAIL_HOST_PASSWORD").unwrap_or_default(),
            from_email,
            approver_email: env::var("SIGNUP_APPROVER_EMAIL")
                .expect("SIGNUP_APPROVER_EMAIL must be set"),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            otp_ttl_minutes: env::var("OTP_TTL_MINUTES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("OTP_TTL_MINUTES must be a number"),
            otp_sweep_interval_secs: env::var("OTP_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .expect("OTP_SWEEP_INTERVAL_SECS must be a number"),
            otp_request_limit: env::var("OTP_REQUEST_LIMIT")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .expect("OTP_REQUEST_LIMIT must be a number"),
            otp_request_window_secs: env::var("OTP_REQUEST_WINDOW_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .expect("OTP_REQUEST_WINDOW_SECS must be a number"),
        }
    }
}
