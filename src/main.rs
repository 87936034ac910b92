mod models;
mod handlers;
mod services;
mod middleware;
mod worker;
mod marketplace;
mod config;
mod errors;

use axum::{
    routing::{get, post},
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
};
use tower_http::{
    services::ServeDir,
    limit::RequestBodyLimitLayer,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use crate::{
    services::{Mailer, RedisService},
    config::Config,
};
use tracing_subscriber;

#[tokio::main]
async fn main() {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().expect("Failed to load configuration");
    let config_state = config.clone();

    // Initialize Redis client
    let redis_client = if config.redis.sentinel_enabled {
        Arc::new(redis::Client::open(
            config.redis.sentinel_url.expect("Sentinel URL not configured")
        ).expect("Failed to connect to Redis Sentinel"))
    } else {
        Arc::new(redis::Client::open(config.redis.url)
            .expect("Failed to connect to Redis"))
    };

    // Initialize RedisService and the mail API client
    let redis_service = RedisService::new(redis_client.clone());
    let mailer = Mailer::new(&config.mailer);

    // Notification delivery pool
    let semaphore = Arc::new(Semaphore::new(config.worker.max_concurrent_deliveries));
    for _ in 0..config.worker.worker_count {
        let redis_service_worker = redis_service.clone();
        let mailer_worker = mailer.clone();
        let semaphore_worker = semaphore.clone();
        let max_attempts = config.worker.max_attempts;
        tokio::spawn(async move {
            worker::notification_worker(
                redis_service_worker,
                mailer_worker,
                semaphore_worker,
                max_attempts,
            )
            .await;
        });
    }

    let state = (redis_service, config_state);

    // Admin surface: scoped bearer tokens checked by middleware
    let admin_routes = Router::new()
        .route("/admin/add-task", post(handlers::add_task))
        .route("/admin/mark-subscribed", post(handlers::mark_subscribed))
        .route("/admin/export-subscribed", get(handlers::export_subscribed))
        .route("/admin/purge-subscribed", post(handlers::purge_subscribed))
        .route("/users", get(handlers::list_users))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin));

    // Create router with all routes
    let app = Router::new()
        .route("/", get(handlers::service_status))

        // Registration and magic-link auth
        .route("/add-user", post(handlers::add_user))
        .route("/login", post(handlers::login))
        .route("/verify/:token", get(handlers::verify))
        .route("/user/:email", get(handlers::get_user_profile))

        // Task catalog and assignment lifecycle
        .route("/tasks", get(handlers::list_tasks))
        .route("/available-tasks/:email", get(handlers::available_tasks))
        .route("/take-task", post(handlers::take_task))
        .route("/submit-task", post(handlers::submit_task))
        .route("/assignments/:email", get(handlers::list_assignments))
        .route("/task-file/:task_id", get(handlers::download_task_file))

        .merge(admin_routes)

        // Static files
        .nest_service("/static", ServeDir::new("static"))

        // File upload limits from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.upload.max_file_size))

        // Add state
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", config.server.host, config.server.port)
    )
    .await
    .expect("Failed to bind server");

    tracing::info!("Server running on {}:{}", config.server.host, config.server.port);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Failed to start server");
}
