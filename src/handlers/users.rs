use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response, Json},
    Extension,
};
use chrono::{Duration, Utc};
use serde_json::json;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::middleware::AdminContext;
use crate::models::{LoginForm, RegisterForm, Session, User};
use crate::services::{mailer, RedisService};

pub async fn service_status() -> impl IntoResponse {
    Json(json!({ "message": "Task marketplace backend is up" }))
}

pub async fn add_user(
    State((redis_service, _)): State<(RedisService, Config)>,
    Json(form): Json<RegisterForm>,
) -> AppResult<Response> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() || form.phone.trim().is_empty() {
        return Err(AppError::Validation(
            "Name, email, and phone are required".into(),
        ));
    }

    let user = User::new(form.name, form.email, form.phone);
    if !redis_service.create_user(&user).await? {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    tracing::info!("Registered user {}", user.email);
    Ok(Json(json!({ "message": "User added successfully", "user": user })).into_response())
}

// Magic-link login: creates the user on first contact, mints a short-lived
// session token and queues the verification email.
pub async fn login(
    State((redis_service, config)): State<(RedisService, Config)>,
    Json(form): Json<LoginForm>,
) -> AppResult<Response> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() || form.phone.trim().is_empty() {
        return Err(AppError::Validation(
            "Name, email, and phone are required".into(),
        ));
    }

    let user = match redis_service.get_user(&form.email).await? {
        Some(user) => user,
        None => {
            let user = User::new(form.name, form.email.clone(), form.phone);
            if redis_service.create_user(&user).await? {
                user
            } else {
                // Lost the race against a concurrent first login; the stored
                // record wins
                redis_service
                    .get_user(&form.email)
                    .await?
                    .ok_or_else(|| AppError::NotFound("User not found".into()))?
            }
        }
    };

    let ttl = Duration::minutes(config.policy.session_ttl_minutes);
    let session = Session::new(user.email.clone(), Utc::now() + ttl);
    redis_service
        .save_session(&session, ttl.num_seconds().max(1) as usize)
        .await?;

    let url = mailer::verify_url(&config.mailer.frontend_origin, &session.token);
    redis_service
        .enqueue_notification(&mailer::login_email(&user, &url))
        .await?;

    tracing::info!("Queued login link for {}", user.email);
    Ok(Json(json!({ "message": "Verification email sent" })).into_response())
}

// Tokens stay valid until expiry; verification checks but does not consume.
pub async fn verify(
    State((redis_service, _)): State<(RedisService, Config)>,
    Path(token): Path<String>,
) -> AppResult<Response> {
    let session = redis_service
        .get_session(&token)
        .await?
        .filter(|s| !s.is_expired(Utc::now()))
        .ok_or_else(|| AppError::NotFound("Invalid or expired login token".into()))?;

    let user = redis_service
        .get_user(&session.user_email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    tracing::info!("Verified login for {}", user.email);
    Ok(Json(json!({ "message": "Login successful", "user": profile_json(&user) })).into_response())
}

pub async fn get_user_profile(
    State((redis_service, _)): State<(RedisService, Config)>,
    Path(email): Path<String>,
) -> AppResult<Response> {
    let user = redis_service
        .get_user(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(profile_json(&user)).into_response())
}

pub async fn list_users(
    State((redis_service, _)): State<(RedisService, Config)>,
    Extension(ctx): Extension<AdminContext>,
) -> AppResult<Response> {
    ctx.require("users:read")?;

    let users = redis_service.list_users().await?;
    let listing: Vec<serde_json::Value> = users.iter().map(profile_json).collect();
    Ok(Json(listing).into_response())
}

// Profile shape returned to clients: everything except the assignment list.
fn profile_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "phone": user.phone,
        "subscribed": user.subscribed,
        "balance": user.balance,
    })
}
