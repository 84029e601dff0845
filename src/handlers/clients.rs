use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Collection,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::client::{default_year, Client, ClientResponse, QuickbookStatus};
use crate::models::user::Claims;
use crate::services::email_list::parse_email_list;
use crate::services::month_merge::{collect_month_assignments, merge_month_assignments};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    pub company_id: Option<String>,
    pub company_password: Option<String>,
    pub group: Option<String>,
    #[validate(length(min = 1, message = "Account number is required"))]
    pub account_no: String,
    pub bank_name: Option<String>,
    /// Raw textual list, e.g. `["a@x.com", "b@y.com"]`; parsed permissively.
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "First allocated person is required"))]
    pub first_allocated_person: String,
    #[validate(length(min = 1, message = "Review person is required"))]
    pub review_person: String,
    pub quickbook_status: QuickbookStatus,
    #[serde(default = "default_year")]
    pub year: i32,
    /// Months whose checkbox was ticked on the edit form.
    #[serde(default)]
    pub months_checked: Vec<String>,
    /// Per-month person name inputs, keyed by month number.
    #[serde(default)]
    pub month_persons: HashMap<String, String>,
    pub remark: Option<String>,
}

impl ClientPayload {
    /// Build the stored record. Text fields are uppercased the way the
    /// entry form always has; `months` is supplied by the caller since add
    /// and update reconcile it differently.
    fn into_client(self, id: Option<ObjectId>, months: HashMap<String, String>) -> Client {
        Client {
            _id: id,
            company_name: self.company_name.to_uppercase(),
            company_id: upper_opt(self.company_id),
            company_password: self.company_password.filter(|p| !p.is_empty()),
            group: upper_opt(self.group),
            account_no: Some(self.account_no.to_uppercase()),
            bank_name: upper_opt(self.bank_name),
            email: parse_email_list(&self.email),
            first_allocated_person: self.first_allocated_person.to_uppercase(),
            review_person: self.review_person.to_uppercase(),
            quickbook_status: self.quickbook_status,
            year: self.year,
            months,
            remark: upper_opt(self.remark),
        }
    }
}

fn upper_opt(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(|v| v.to_uppercase())
}

fn clients_collection(state: &AppState) -> Collection<Client> {
    state.db.collection("clients")
}

async fn find_client(state: &AppState, id: &str) -> Result<Client> {
    let object_id = ObjectId::parse_str(id)?;
    clients_collection(state)
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::DocumentNotFound)
}

// Regex metacharacters must not leak into the contains filters
fn escape_regex(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if ".^$*+?()[]{}|\\".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_filter(field: &str, term: &str) -> Document {
    doc! { field: { "$regex": escape_regex(term), "$options": "i" } }
}

fn exact_filter(field: &str, term: &str) -> Document {
    doc! { field: { "$regex": format!("^{}$", escape_regex(term)), "$options": "i" } }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// List clients; `?search=` OR-matches each term against company name and
/// group.
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ClientResponse>>> {
    let filter = match query.search.as_deref().map(str::trim) {
        Some(search) if !search.is_empty() => {
            let conditions: Vec<Document> = search
                .split_whitespace()
                .flat_map(|term| {
                    [
                        contains_filter("company_name", term),
                        contains_filter("group", term),
                    ]
                })
                .collect();
            doc! { "$or": conditions }
        }
        _ => doc! {},
    };

    let cursor = clients_collection(&state).find(filter).await?;
    let clients: Vec<Client> = cursor.try_collect().await?;

    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<ClientResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    // The add form has no checkboxes: every non-empty name is stored.
    let months = collect_month_assignments(&payload.month_persons);
    let mut client = payload.into_client(None, months);

    let result = clients_collection(&state).insert_one(&client).await?;
    client._id = result.inserted_id.as_object_id();

    Ok(Json(ClientResponse::from(client)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClientResponse>> {
    let client = find_client(&state, &id).await?;
    Ok(Json(ClientResponse::from(client)))
}

/// Update a client. The month mapping is reconciled against the stored one
/// and the result replaces the whole document.
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<ClientResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let existing = find_client(&state, &id).await?;
    let object_id = existing._id.ok_or(AppError::DocumentNotFound)?;

    let checked: HashSet<String> = payload.months_checked.iter().cloned().collect();
    let months = merge_month_assignments(&existing.months, &checked, &payload.month_persons);

    let client = payload.into_client(Some(object_id), months);
    clients_collection(&state)
        .replace_one(doc! { "_id": object_id }, &client)
        .await?;

    Ok(Json(ClientResponse::from(client)))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    if !claims.is_superuser {
        return Err(AppError::Unauthorized);
    }

    let object_id = ObjectId::parse_str(&id)?;
    let result = clients_collection(&state)
        .delete_one(doc! { "_id": object_id })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::DocumentNotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Company deleted successfully.",
    })))
}

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    pub search: Option<String>,
}

/// Single-company lookup: exact case-insensitive name match first, then a
/// partial match requiring every term.
pub async fn search_details(
    State(state): State<AppState>,
    Query(query): Query<DetailsQuery>,
) -> Result<Json<Value>> {
    let collection = clients_collection(&state);

    let mut company: Option<Client> = None;
    if let Some(search) = query.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            company = collection
                .find_one(exact_filter("company_name", search))
                .await?;

            if company.is_none() {
                let conditions: Vec<Document> = search
                    .split_whitespace()
                    .map(|term| contains_filter("company_name", term))
                    .collect();
                company = collection.find_one(doc! { "$and": conditions }).await?;
            }
        }
    }

    Ok(Json(json!({
        "company": company.map(ClientResponse::from),
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Company search results: exact name match wins, otherwise a partial match
/// on company name or account number.
pub async fn search_company(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ClientResponse>>> {
    let collection = clients_collection(&state);

    let clients: Vec<Client> = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => {
            let exact: Vec<Client> = collection
                .find(exact_filter("company_name", q))
                .await?
                .try_collect()
                .await?;

            if exact.is_empty() {
                collection
                    .find(doc! {
                        "$or": [
                            contains_filter("company_name", q),
                            contains_filter("account_no", q),
                        ]
                    })
                    .await?
                    .try_collect()
                    .await?
            } else {
                exact
            }
        }
        _ => collection.find(doc! {}).await?.try_collect().await?,
    };

    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_metacharacters_are_escaped() {
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
        assert_eq!(escape_regex("(ACME)"), "\\(ACME\\)");
        assert_eq!(escape_regex("plain"), "plain");
    }

    #[test]
    fn payload_uppercases_text_fields_but_not_emails() {
        let payload = ClientPayload {
            company_name: "Acme Ltd".to_string(),
            company_id: Some("c-1".to_string()),
            company_password: Some("secret".to_string()),
            group: Some("g1".to_string()),
            account_no: "ab-12".to_string(),
            bank_name: Some("first bank".to_string()),
            email: r#"["Mixed@Case.com"]"#.to_string(),
            first_allocated_person: "alice".to_string(),
            review_person: "bob".to_string(),
            quickbook_status: QuickbookStatus::Pending,
            year: 2025,
            months_checked: Vec::new(),
            month_persons: HashMap::new(),
            remark: Some("note".to_string()),
        };

        let client = payload.into_client(None, HashMap::new());
        assert_eq!(client.company_name, "ACME LTD");
        assert_eq!(client.group.as_deref(), Some("G1"));
        assert_eq!(client.account_no.as_deref(), Some("AB-12"));
        assert_eq!(client.first_allocated_person, "ALICE");
        assert_eq!(client.review_person, "BOB");
        assert_eq!(client.remark.as_deref(), Some("NOTE"));
        // Passwords and emails keep their case
        assert_eq!(client.company_password.as_deref(), Some("secret"));
        assert_eq!(client.email, vec!["Mixed@Case.com"]);
    }

    #[test]
    fn empty_optional_fields_collapse_to_none() {
        assert_eq!(upper_opt(Some(String::new())), None);
        assert_eq!(upper_opt(None), None);
        assert_eq!(upper_opt(Some("x".to_string())), Some("X".to_string()));
    }
}
