pub mod client;
pub mod signup_otp;
pub mod user;
