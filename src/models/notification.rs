use serde::{Deserialize, Serialize};

// Queued outbound email. Delivery is best-effort: the worker re-queues
// failed sends until max_attempts and then drops them.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attempts: u32,
}

impl Notification {
    pub fn new(to: String, subject: String, html: String) -> Self {
        Self {
            to,
            subject,
            html,
            attempts: 0,
        }
    }
}
