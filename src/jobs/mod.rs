pub mod otp_cleanup;
