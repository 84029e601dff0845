use chrono::{DateTime, Duration, Utc};
use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    Collection, Database,
};
use rand::Rng;

use crate::errors::Result;
use crate::models::signup_otp::SignupOtp;

const COLLECTION: &str = "signup_otps";

/// Issues, consumes and sweeps signup OTPs.
///
/// Lifecycle: a code is created on request, consumed (flipped to used) on
/// the first successful verification, and never touched otherwise. Used and
/// expired rows are garbage-collected by `sweep`.
#[derive(Clone)]
pub struct OtpService {
    db: Database,
    ttl: Duration,
}

impl OtpService {
    pub fn new(db: Database, ttl_minutes: i64) -> Self {
        OtpService {
            db,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    fn collection(&self) -> Collection<SignupOtp> {
        self.db.collection(COLLECTION)
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl.num_minutes()
    }

    // Uniformly random 6-digit code, zero-padded
    pub fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        format!("{:06}", rng.gen_range(0..1_000_000))
    }

    pub fn is_valid_code_format(code: &str) -> bool {
        code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
    }

    /// Persist a fresh OTP for `email`. Multiple outstanding codes per email
    /// are allowed; `consume` picks the most recent matching one.
    pub async fn issue(&self, email: &str) -> Result<SignupOtp> {
        let otp = SignupOtp {
            _id: None,
            email: email.to_string(),
            code: Self::generate_code(),
            created_at: Utc::now(),
            is_used: false,
        };
        self.collection().insert_one(&otp).await?;
        Ok(otp)
    }

    /// Atomically mark the newest matching unexpired, unused OTP as used.
    /// Returns false when nothing matched (wrong code, already used, or
    /// expired). The conditional update means at most one concurrent caller
    /// can win for a given row.
    pub async fn consume(&self, email: &str, code: &str) -> Result<bool> {
        let filter = Self::consume_filter(email, code, self.cutoff(Utc::now()));
        let update = doc! { "$set": { "is_used": true } };

        let consumed = self
            .collection()
            .find_one_and_update(filter, update)
            .sort(doc! { "created_at": -1 })
            .await?;

        Ok(consumed.is_some())
    }

    // A row is consumable only while unused and strictly younger than the
    // TTL; anything at or past the cutoff fails whatever `is_used` says.
    fn consume_filter(email: &str, code: &str, cutoff: BsonDateTime) -> Document {
        doc! {
            "email": email,
            "code": code,
            "is_used": false,
            "created_at": { "$gt": cutoff },
        }
    }

    /// Delete used OTPs and OTPs older than the TTL. Pure garbage
    /// collection: safe to run concurrently with itself or with `consume`.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = self.cutoff(now);
        let result = self
            .collection()
            .delete_many(doc! {
                "$or": [
                    { "is_used": true },
                    { "created_at": { "$lt": cutoff } },
                ]
            })
            .await?;
        Ok(result.deleted_count)
    }

    fn cutoff(&self, now: DateTime<Utc>) -> BsonDateTime {
        Self::cutoff_for(now, self.ttl)
    }

    fn cutoff_for(now: DateTime<Utc>, ttl: Duration) -> BsonDateTime {
        BsonDateTime::from_millis((now - ttl).timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn consume_matches_only_an_unused_row_for_the_same_email_and_code() {
        let filter =
            OtpService::consume_filter("a@x.com", "123456", BsonDateTime::from_millis(0));

        assert_eq!(filter.get_str("email").unwrap(), "a@x.com");
        assert_eq!(filter.get_str("code").unwrap(), "123456");
        // Single-use: once a row is flipped to used, a second verification
        // with the same code can never match again.
        assert_eq!(filter.get_bool("is_used").unwrap(), false);
    }

    #[test]
    fn consume_cutoff_sits_exactly_one_ttl_behind_now() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let ttl = Duration::minutes(10);

        let cutoff = OtpService::cutoff_for(now, ttl);
        assert_eq!(cutoff.timestamp_millis(), (now - ttl).timestamp_millis());
    }

    #[test]
    fn consume_expiry_bound_is_strict() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let cutoff = OtpService::cutoff_for(now, Duration::minutes(10));

        let filter = OtpService::consume_filter("a@x.com", "123456", cutoff);
        let created_at = filter.get_document("created_at").unwrap();

        // `$gt` on the cutoff: a row created exactly ten minutes ago is
        // already expired, regardless of `is_used`. A fresh row created
        // after the cutoff still matches.
        assert_eq!(created_at.len(), 1);
        assert_eq!(created_at.get_datetime("$gt").unwrap(), &cutoff);
    }

    #[test]
    fn generated_codes_are_six_ascii_digits() {
        for _ in 0..200 {
            let code = OtpService::generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()), "bad code {code}");
        }
    }

    #[test]
    fn code_format_check_rejects_non_digit_input() {
        assert!(OtpService::is_valid_code_format("000123"));
        assert!(!OtpService::is_valid_code_format("12345"));
        assert!(!OtpService::is_valid_code_format("1234567"));
        assert!(!OtpService::is_valid_code_format("12a456"));
        assert!(!OtpService::is_valid_code_format(""));
        assert!(!OtpService::is_valid_code_format("１２３４５６")); // fullwidth digits
    }
}
