use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickbookStatus {
    Done,
    Pending,
    DataProvided,
}

impl Default for QuickbookStatus {
    fn default() -> Self {
        QuickbookStatus::Pending
    }
}

/// A tracked company account. `months` maps month number ("1".."12") to the
/// name of the person assigned for that month; an absent key means no
/// assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub email: Vec<String>,
    #[serde(default)]
    pub first_allocated_person: String,
    #[serde(default)]
    pub review_person: String,
    #[serde(default)]
    pub quickbook_status: QuickbookStatus,
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default)]
    pub months: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

pub fn default_year() -> i32 {
    2025
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: String,
    pub company_name: String,
    pub company_id: Option<String>,
    pub group: Option<String>,
    pub account_no: Option<String>,
    pub bank_name: Option<String>,
    pub email: Vec<String>,
    pub first_allocated_person: String,
    pub review_person: String,
    pub quickbook_status: QuickbookStatus,
    pub year: i32,
    pub months: HashMap<String, String>,
    pub remark: Option<String>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        ClientResponse {
            id: client._id.map(|id| id.to_hex()).unwrap_or_default(),
            company_name: client.company_name,
            company_id: client.company_id,
            group: client.group,
            account_no: client.account_no,
            bank_name: client.bank_name,
            email: client.email,
            first_allocated_person: client.first_allocated_person,
            review_person: client.review_person,
            quickbook_status: client.quickbook_status,
            year: client.year,
            months: client.months,
            remark: client.remark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quickbook_status_uses_snake_case_wire_names() {
        assert_eq!(
            serde_json::to_string(&QuickbookStatus::DataProvided).unwrap(),
            "\"data_provided\""
        );
        let status: QuickbookStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(status, QuickbookStatus::Done);
    }
}
