pub mod email_list;
pub mod excel_service;
pub mod mail_service;
pub mod month_merge;
pub mod otp_service;
pub mod throttle;
