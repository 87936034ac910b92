use redis::{Client, AsyncCommands, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use crate::models::{User, Task, Assignment, Session, Notification};

// Key layout:
//   user:{email}        JSON User          users        index set of emails
//   task:{id}           JSON Task          tasks        index set of ids
//   assignment:{id}     JSON Assignment
//   session:{token}     JSON Session (TTL-bound)
//   notify_queue        list of JSON Notification
const USER_INDEX: &str = "users";
const TASK_INDEX: &str = "tasks";
const NOTIFY_QUEUE: &str = "notify_queue";

fn user_key(email: &str) -> String {
    format!("user:{}", email)
}

fn task_key(id: &str) -> String {
    format!("task:{}", id)
}

fn assignment_key(id: &str) -> String {
    format!("assignment:{}", id)
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

fn encode<T: Serialize>(value: &T) -> Result<String, RedisError> {
    serde_json::to_string(value)
        .map_err(|e| RedisError::from((redis::ErrorKind::TypeError, "Failed to encode value", e.to_string())))
}

fn decode<T: DeserializeOwned>(data: &str) -> Result<T, RedisError> {
    serde_json::from_str(data)
        .map_err(|e| RedisError::from((redis::ErrorKind::TypeError, "Failed to decode value", e.to_string())))
}

pub struct RedisService {
    client: Arc<Client>,
}

impl RedisService {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    pub async fn get_user(&self, email: &str) -> Result<Option<User>, RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        let data: Option<String> = conn.get(user_key(email)).await?;
        data.as_deref().map(decode).transpose()
    }

    pub async fn save_user(&self, user: &User) -> Result<(), RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        conn.set(user_key(&user.email), encode(user)?).await
    }

    // Returns false if the email is already registered. SET NX makes the
    // uniqueness check and the insert a single round trip.
    pub async fn create_user(&self, user: &User) -> Result<bool, RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        let created: bool = conn.set_nx(user_key(&user.email), encode(user)?).await?;
        if created {
            conn.sadd::<_, _, ()>(USER_INDEX, &user.email).await?;
        }
        Ok(created)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        let emails: Vec<String> = conn.smembers(USER_INDEX).await?;

        let mut users = Vec::with_capacity(emails.len());
        for email in emails {
            let data: Option<String> = conn.get(user_key(&email)).await?;
            match data {
                Some(data) => users.push(decode(&data)?),
                None => tracing::warn!("User index entry without record: {}", email),
            }
        }
        Ok(users)
    }

    pub async fn delete_users(&self, emails: &[String]) -> Result<(), RedisError> {
        if emails.is_empty() {
            return Ok(());
        }
        let mut conn = self.client.get_async_connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        for email in emails {
            pipe.del(user_key(email)).ignore();
            pipe.srem(USER_INDEX, email).ignore();
        }
        pipe.query_async(&mut conn).await
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        let data: Option<String> = conn.get(task_key(id)).await?;
        data.as_deref().map(decode).transpose()
    }

    pub async fn save_task(&self, task: &Task) -> Result<(), RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        conn.set::<_, _, ()>(task_key(&task.id), encode(task)?).await?;
        conn.sadd(TASK_INDEX, &task.id).await
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        let ids: Vec<String> = conn.smembers(TASK_INDEX).await?;

        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            let data: Option<String> = conn.get(task_key(&id)).await?;
            match data {
                Some(data) => tasks.push(decode(&data)?),
                None => tracing::warn!("Task index entry without record: {}", id),
            }
        }
        Ok(tasks)
    }

    pub async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        let data: Option<String> = conn.get(assignment_key(id)).await?;
        data.as_deref().map(decode).transpose()
    }

    pub async fn save_assignment(&self, assignment: &Assignment) -> Result<(), RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        conn.set(assignment_key(&assignment.id), encode(assignment)?).await
    }

    // Completion flips the assignment and credits the balance in one
    // MULTI/EXEC transaction so a crash between the two writes cannot leave
    // a completed assignment without its credit.
    pub async fn complete_and_credit(
        &self,
        assignment: &Assignment,
        user: &User,
    ) -> Result<(), RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        redis::pipe()
            .atomic()
            .set(assignment_key(&assignment.id), encode(assignment)?)
            .ignore()
            .set(user_key(&user.email), encode(user)?)
            .ignore()
            .query_async(&mut conn)
            .await
    }

    // Sessions expire server-side; the TTL mirrors the expiry recorded in
    // the session itself.
    pub async fn save_session(&self, session: &Session, ttl_secs: usize) -> Result<(), RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        conn.set_ex(session_key(&session.token), encode(session)?, ttl_secs)
            .await
    }

    pub async fn get_session(&self, token: &str) -> Result<Option<Session>, RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        let data: Option<String> = conn.get(session_key(token)).await?;
        data.as_deref().map(decode).transpose()
    }

    pub async fn enqueue_notification(&self, notification: &Notification) -> Result<(), RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        conn.lpush(NOTIFY_QUEUE, encode(notification)?).await
    }

    pub async fn pop_notification(&self) -> Result<Option<Notification>, RedisError> {
        let mut conn = self.client.get_async_connection().await?;

        if let Some(data) = conn.rpop::<_, Option<String>>(NOTIFY_QUEUE, None).await? {
            Ok(Some(decode(&data)?))
        } else {
            Ok(None)
        }
    }
}

impl Clone for RedisService {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}
