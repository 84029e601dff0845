//! User management, superuser only.

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection,
};
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::models::user::{Claims, User, UserResponse};
use crate::state::AppState;

fn require_superuser(claims: &Claims) -> Result<()> {
    if claims.is_superuser {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserResponse>>> {
    require_superuser(&claims)?;

    let users: Collection<User> = state.db.collection("users");
    let all: Vec<User> = users.find(doc! {}).await?.try_collect().await?;

    Ok(Json(all.into_iter().map(UserResponse::from).collect()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    require_superuser(&claims)?;

    let object_id = ObjectId::parse_str(&id)?;
    let users: Collection<User> = state.db.collection("users");
    let result = users.delete_one(doc! { "_id": object_id }).await?;

    if result.deleted_count == 0 {
        return Err(AppError::DocumentNotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "User deleted successfully.",
    })))
}
