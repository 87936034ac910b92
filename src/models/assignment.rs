use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

// Stored as "pending"/"completed"
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Assignment {
    pub id: String,
    pub user_email: String,
    pub task_id: String,
    pub status: AssignmentStatus,
    pub deadline: DateTime<Utc>,
    pub file_path: Option<String>, // submitted work, set on completion
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Assignment {
    pub fn new(user_email: String, task_id: String, deadline: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_email,
            task_id,
            status: AssignmentStatus::Pending,
            deadline,
            file_path: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}
