use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{clients, excel};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(clients::list_clients).post(clients::create_client))
        .route("/search_details", get(clients::search_details))
        .route("/search", get(clients::search_company))
        .route("/export", get(excel::export_clients))
        .route("/import", post(excel::import_clients))
        .route(
            "/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
}
