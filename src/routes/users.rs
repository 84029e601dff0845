use axum::{routing::get, Router};

use crate::handlers::users;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route("/:id", axum::routing::delete(users::delete_user))
}
