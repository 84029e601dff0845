use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use futures_util::TryStreamExt;
use mongodb::{bson::doc, Collection};
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::models::client::Client;
use crate::services::excel_service::{build_client_workbook, read_client_sheet, EXPORT_FILENAME};
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn clients_collection(state: &AppState) -> Collection<Client> {
    state.db.collection("clients")
}

/// Export every client as an xlsx attachment with the fixed column order.
pub async fn export_clients(State(state): State<AppState>) -> Result<Response> {
    let clients: Vec<Client> = clients_collection(&state)
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    let bytes = build_client_workbook(&clients)?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", EXPORT_FILENAME),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Import clients from an uploaded xlsx file (multipart field `excel_file`).
///
/// Rows are inserted one at a time; a failing row aborts the remainder and
/// reports its row number and column, while rows created before the failure
/// stay committed.
pub async fn import_clients(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("excel_file") {
            file_bytes = Some(field.bytes().await?.to_vec());
            break;
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::invalid_data("excel_file is required"))?;
    let sheet = read_client_sheet(&bytes)?;

    let collection = clients_collection(&state);
    let mut imported = 0usize;

    for idx in 0..sheet.row_count() {
        let client = match sheet.client_for_row(idx) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!("Import aborted after {} row(s): {}", imported, e);
                return Err(e);
            }
        };
        collection.insert_one(&client).await?;
        imported += 1;
    }

    Ok(Json(json!({
        "success": true,
        "message": "File imported successfully!",
        "imported": imported,
    })))
}
