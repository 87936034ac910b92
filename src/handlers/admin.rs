use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response, Json},
    Extension,
};
use serde_json::json;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::marketplace::export;
use crate::middleware::AdminContext;
use crate::models::{MarkSubscribedForm, PurgeForm, Task};
use crate::services::{uploads, RedisService, StoredFile, UploadStore};

// Holds form data while the multipart stream is consumed
struct TaskUpload {
    title: Option<String>,
    description: Option<String>,
    price: Option<String>,
    file: Option<StoredFile>,
}

pub async fn add_task(
    State((redis_service, config)): State<(RedisService, Config)>,
    Extension(ctx): Extension<AdminContext>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    ctx.require("tasks:write")?;

    let store = UploadStore::new(&config.upload.dir);
    let mut data = TaskUpload {
        title: None,
        description: None,
        price: None,
        file: None,
    };

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        AppError::Upload(format!("Failed to process form field: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "title" => data.title = Some(uploads::field_text(field).await?),
            "description" => data.description = Some(uploads::field_text(field).await?),
            "price" => data.price = Some(uploads::field_text(field).await?),
            "file" => data.file = Some(store.store(&mut field).await?),
            field_name => {
                tracing::warn!("Unexpected form field: {}", field_name);
            }
        }
    }

    let missing = || AppError::Validation("All fields including file are required".into());
    let title = data.title.filter(|v| !v.trim().is_empty()).ok_or_else(missing)?;
    let description = data
        .description
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(missing)?;
    let price_text = data.price.filter(|v| !v.trim().is_empty()).ok_or_else(missing)?;
    let file = data.file.ok_or_else(missing)?;

    let price: f64 = price_text
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("Price must be a number".into()))?;
    if price <= 0.0 {
        return Err(AppError::Validation("Price must be positive".into()));
    }

    let task = Task::new(title, description, price, file.stored_name);
    redis_service.save_task(&task).await?;

    tracing::info!(
        "Admin '{}' added task {} (attachment: {})",
        ctx.label,
        task.id,
        file.original_name
    );
    Ok(Json(json!({
        "success": true,
        "message": "Task added successfully",
        "task": task,
    }))
    .into_response())
}

pub async fn mark_subscribed(
    State((redis_service, _)): State<(RedisService, Config)>,
    Extension(ctx): Extension<AdminContext>,
    Json(form): Json<MarkSubscribedForm>,
) -> AppResult<Response> {
    ctx.require("users:write")?;

    let mut user = redis_service
        .get_user(&form.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    user.subscribed = form.subscribed;
    redis_service.save_user(&user).await?;

    tracing::info!(
        "Admin '{}' set subscribed={} for {}",
        ctx.label,
        form.subscribed,
        user.email
    );
    Ok(Json(json!({ "message": "Subscription updated", "user": user })).into_response())
}

// Read-only CSV dump of subscribed users. Deleting them is a separate,
// explicitly confirmed operation (purge_subscribed).
pub async fn export_subscribed(
    State((redis_service, _)): State<(RedisService, Config)>,
    Extension(ctx): Extension<AdminContext>,
) -> AppResult<Response> {
    ctx.require("users:export")?;

    let subscribed: Vec<_> = redis_service
        .list_users()
        .await?
        .into_iter()
        .filter(|u| u.subscribed)
        .collect();

    if subscribed.is_empty() {
        return Ok(Json(json!({ "message": "No subscribed users found" })).into_response());
    }

    let csv = export::users_csv(&subscribed);
    tracing::info!(
        "Admin '{}' exported {} subscribed users",
        ctx.label,
        subscribed.len()
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"subscribed_users.csv\"",
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::Internal(format!("Failed to build export response: {}", e)))
}

pub async fn purge_subscribed(
    State((redis_service, _)): State<(RedisService, Config)>,
    Extension(ctx): Extension<AdminContext>,
    Json(form): Json<PurgeForm>,
) -> AppResult<Response> {
    ctx.require("users:purge")?;

    if !form.confirm {
        return Err(AppError::Validation(
            "Purge is destructive and requires \"confirm\": true".into(),
        ));
    }

    let emails: Vec<String> = redis_service
        .list_users()
        .await?
        .into_iter()
        .filter(|u| u.subscribed)
        .map(|u| u.email)
        .collect();

    redis_service.delete_users(&emails).await?;

    tracing::info!("Admin '{}' purged {} subscribed users", ctx.label, emails.len());
    Ok(Json(json!({
        "message": "Subscribed users purged",
        "deleted": emails.len(),
    }))
    .into_response())
}
