use std::sync::Arc;

use mongodb::Database;

use crate::config::AppConfig;
use crate::services::mail_service::MailService;
use crate::services::otp_service::OtpService;
use crate::services::throttle::ThrottleStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub mail_service: MailService,
    pub otp_service: OtpService,
    pub otp_throttle: Arc<ThrottleStore>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, mail_service: MailService) -> Self {
        let otp_service = OtpService::new(db.clone(), config.otp_ttl_minutes);
        let otp_throttle = Arc::new(ThrottleStore::new(
            config.otp_request_limit,
            config.otp_request_window_secs,
        ));
        AppState {
            db,
            config: Arc::new(config),
            mail_service,
            otp_service,
            otp_throttle,
        }
    }
}
