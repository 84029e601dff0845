// ==================== OTP CLEANUP SCHEDULER ====================
// Periodic garbage collection of signup OTPs: deletes used codes and codes
// older than the TTL. Idempotent and safe to run concurrently with
// verification, which only ever consumes unexpired unused rows.

use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::services::otp_service::OtpService;

pub fn start_otp_cleanup_scheduler(otp_service: OtpService, interval_secs: u64) {
    tracing::info!(
        "🧹 Starting OTP cleanup scheduler (runs every {}s)",
        interval_secs
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_secs));

        // First tick fires immediately, so a sweep also runs at startup.
        loop {
            ticker.tick().await;

            match otp_service.sweep(Utc::now()).await {
                Ok(count) => {
                    tracing::info!("✅ Deleted {} expired/used OTP(s)", count);
                }
                Err(e) => {
                    tracing::error!("❌ OTP cleanup failed: {}", e);
                }
            }
        }
    });
}
