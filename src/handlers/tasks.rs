use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response, Json},
};
use chrono::{Duration, Utc};
use serde_json::json;
use tokio::{fs::File, io::BufReader};
use tokio_util::io::ReaderStream;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::marketplace::lifecycle;
use crate::models::{Assignment, TakeTaskForm, User};
use crate::services::{mailer, uploads, RedisService, StoredFile, UploadStore};

pub async fn list_tasks(
    State((redis_service, _)): State<(RedisService, Config)>,
) -> AppResult<Response> {
    let tasks = redis_service.list_tasks().await?;
    Ok(Json(tasks).into_response())
}

pub async fn available_tasks(
    State((redis_service, _)): State<(RedisService, Config)>,
    Path(email): Path<String>,
) -> AppResult<Response> {
    let user = redis_service
        .get_user(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let assignments = load_assignments(&redis_service, &user).await?;
    let tasks = redis_service.list_tasks().await?;

    Ok(Json(lifecycle::available_tasks(tasks, &assignments)).into_response())
}

// Core operation: eligibility gate, then the pending assignment with its
// six hour deadline, then the instruction email.
pub async fn take_task(
    State((redis_service, config)): State<(RedisService, Config)>,
    Json(form): Json<TakeTaskForm>,
) -> AppResult<Response> {
    if form.email.trim().is_empty() || form.task_id.trim().is_empty() {
        return Err(AppError::Validation("Email and task ID are required".into()));
    }

    let mut user = redis_service
        .get_user(&form.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let assignments = load_assignments(&redis_service, &user).await?;
    lifecycle::check_eligibility(
        &assignments,
        Utc::now(),
        Duration::hours(config.policy.cooldown_hours),
    )
    .map_err(|e| AppError::Cooldown(e.to_string()))?;

    let task = redis_service
        .get_task(&form.task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    let deadline = lifecycle::submission_deadline(
        Utc::now(),
        Duration::hours(config.policy.deadline_hours),
    );
    let assignment = Assignment::new(user.email.clone(), task.id.clone(), deadline);

    redis_service.save_assignment(&assignment).await?;
    user.assignments.push(assignment.id.clone());
    redis_service.save_user(&user).await?;

    // The assignment is the source of truth; a failed email queue write is
    // logged and never rolls it back
    if let Err(e) = redis_service
        .enqueue_notification(&mailer::assignment_email(&user, &task, deadline))
        .await
    {
        tracing::error!("Failed to queue assignment email for {}: {}", user.email, e);
    }

    tracing::info!("Assigned task {} to {}", task.id, user.email);
    Ok(Json(json!({
        "message": "Task assigned and instructions sent to your email",
        "assignment": assignment,
    }))
    .into_response())
}

// Holds form data while the multipart stream is consumed
struct SubmissionData {
    email: Option<String>,
    assignment_id: Option<String>,
    file: Option<StoredFile>,
}

// Core operation: ownership-checked completion plus balance credit, written
// as one store transaction.
pub async fn submit_task(
    State((redis_service, config)): State<(RedisService, Config)>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let store = UploadStore::new(&config.upload.dir);

    let mut data = SubmissionData {
        email: None,
        assignment_id: None,
        file: None,
    };

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        AppError::Upload(format!("Failed to process form field: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "email" => data.email = Some(uploads::field_text(field).await?),
            "assignment_id" => data.assignment_id = Some(uploads::field_text(field).await?),
            "file" => data.file = Some(store.store(&mut field).await?),
            field_name => {
                tracing::warn!("Unexpected form field: {}", field_name);
            }
        }
    }

    let missing = || AppError::Validation("Email, assignment ID, and file are required".into());
    let email = data.email.filter(|v| !v.trim().is_empty()).ok_or_else(missing)?;
    let assignment_id = data
        .assignment_id
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(missing)?;
    let file = data.file.ok_or_else(missing)?;

    let mut user = redis_service
        .get_user(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut assignment = redis_service
        .get_assignment(&assignment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".into()))?;

    // Only the assignment owner may complete it
    if assignment.user_email != user.email {
        return Err(AppError::Unauthorized(
            "Assignment belongs to a different user".into(),
        ));
    }

    let task = redis_service
        .get_task(&assignment.task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    lifecycle::complete(&mut assignment, file.stored_name, Utc::now())
        .map_err(|e| AppError::Conflict(e.to_string()))?;

    user.balance += task.price;
    redis_service.complete_and_credit(&assignment, &user).await?;

    if let Err(e) = redis_service
        .enqueue_notification(&mailer::submission_email(&user, &task, user.balance))
        .await
    {
        tracing::error!("Failed to queue receipt email for {}: {}", user.email, e);
    }

    tracing::info!(
        "Completed assignment {} for {} with {} (credited {})",
        assignment.id,
        user.email,
        file.original_name,
        task.price
    );
    Ok(Json(json!({
        "message": "Task submitted successfully",
        "assignment": assignment,
        "task_price": task.price,
    }))
    .into_response())
}

pub async fn list_assignments(
    State((redis_service, _)): State<(RedisService, Config)>,
    Path(email): Path<String>,
) -> AppResult<Response> {
    let user = redis_service
        .get_user(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let assignments = load_assignments(&redis_service, &user).await?;

    let mut detailed = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let task = redis_service.get_task(&assignment.task_id).await?;
        if task.is_none() {
            tracing::warn!(
                "Assignment {} references missing task {}",
                assignment.id,
                assignment.task_id
            );
        }
        detailed.push(json!({
            "id": assignment.id,
            "user_email": assignment.user_email,
            "task_id": assignment.task_id,
            "status": assignment.status,
            "deadline": assignment.deadline,
            "file_path": assignment.file_path,
            "created_at": assignment.created_at,
            "completed_at": assignment.completed_at,
            "task": task,
        }));
    }

    Ok(Json(detailed).into_response())
}

// Streams a task's stored instruction attachment.
pub async fn download_task_file(
    State((redis_service, config)): State<(RedisService, Config)>,
    Path(task_id): Path<String>,
) -> AppResult<Response> {
    let task = redis_service
        .get_task(&task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    let store = UploadStore::new(&config.upload.dir);
    let path = store.path_of(&task.file_path);

    let file = File::open(&path).await.map_err(|e| {
        tracing::error!("Failed to open task attachment {}: {}", path, e);
        AppError::File(e)
    })?;
    let file_size = file.metadata().await.map_err(AppError::File)?.len();

    let reader = BufReader::new(file);
    let stream = ReaderStream::new(reader);
    let body = Body::from_stream(stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", task.file_path),
        )
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}

// Resolves the user's assignment IDs to records, skipping dangling entries.
async fn load_assignments(
    redis_service: &RedisService,
    user: &User,
) -> AppResult<Vec<Assignment>> {
    let mut assignments = Vec::with_capacity(user.assignments.len());
    for id in &user.assignments {
        match redis_service.get_assignment(id).await? {
            Some(assignment) => assignments.push(assignment),
            None => tracing::warn!("Assignment {} listed for {} but not found", id, user.email),
        }
    }
    Ok(assignments)
}
