use axum::extract::State;
use axum::{http::Method, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

mod config;
mod database;
mod errors;
mod handlers;
mod jobs;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::AppConfig;
use database::connection::get_db_client;
use jobs::otp_cleanup::start_otp_cleanup_scheduler;
use services::mail_service::MailService;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();
    let db = get_db_client(&config.database_url, &config.database_name).await;

    let mail_service = match MailService::new(&config) {
        Ok(service) => {
            tracing::info!("✅ Mail service initialized (approver: {})", config.approver_email);
            service
        }
        Err(e) => {
            tracing::error!("❌ Failed to initialize mail service: {}", e);
            panic!("Failed to initialize mail service: {}", e);
        }
    };

    let app_state = AppState::new(db, config, mail_service);

    start_otp_cleanup_scheduler(
        app_state.otp_service.clone(),
        app_state.config.otp_sweep_interval_secs,
    );

    let app = build_router(app_state.clone());
    start_server(app, &app_state.config.host, app_state.config.port).await;
}

fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    // Everything beyond login/signup/password-reset requires a bearer token
    let protected = Router::new()
        .nest("/api/clients", routes::clients::routes())
        .nest("/api/users", routes::users::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .nest("/api/auth", routes::auth::routes())
        .merge(protected)
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(app: Router, host: &str, port: u16) {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST/PORT");

    tracing::info!("🚀 Server starting on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            axum::serve(listener, app).await.unwrap();
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}

async fn root_handler() -> &'static str {
    "📒 Client Record Management API"
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    use mongodb::bson::doc;

    let db_status = match state.db.run_command(doc! {"ping": 1}).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
