use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One outstanding signup passcode. Several may exist per email; the most
/// recently created unused one wins at verification time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupOtp {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub email: String,
    pub code: String, // 6 ASCII digits, zero-padded

    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    pub is_used: bool,
}
