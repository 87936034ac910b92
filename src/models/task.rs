use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,        // payout credited to the writer on submission
    pub file_path: String, // stored instruction attachment
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: String, description: String, price: f64, file_path: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            price,
            file_path,
            created_at: Utc::now(),
        }
    }
}
