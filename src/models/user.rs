use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,            // unique key, also the storage key
    pub phone: String,
    pub subscribed: bool,
    pub balance: f64,             // running earnings, credited on submission
    pub assignments: Vec<String>, // assignment IDs, oldest first
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, phone: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            phone,
            subscribed: false,
            balance: 0.0,
            assignments: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
