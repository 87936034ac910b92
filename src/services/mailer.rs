use serde_json::json;
use chrono::{DateTime, Utc};
use crate::config::MailerConfig;
use crate::errors::{NotifyError, NotifyResult};
use crate::models::{Notification, Task, User};

// Thin client for the hosted mail API. Handlers never call it directly;
// queued notifications are drained by the worker loops.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(config: &MailerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from_address.clone(),
        }
    }

    pub async fn send(&self, notification: &Notification) -> NotifyResult<()> {
        let payload = json!({
            "from": self.from,
            "to": notification.to,
            "subject": notification.subject,
            "html": notification.html,
        });

        let mut request = self.http.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

pub fn verify_url(frontend_origin: &str, token: &str) -> String {
    format!(
        "{}/verify.html?token={}",
        frontend_origin,
        urlencoding::encode(token)
    )
}

pub fn login_email(user: &User, verify_url: &str) -> Notification {
    Notification::new(
        user.email.clone(),
        "Login Verification".to_string(),
        format!(
            "<p>Hello {},</p>\
             <p>Click the link to login:</p>\
             <a href=\"{}\">{}</a>\
             <p>Expires in 15 minutes.</p>",
            user.name, verify_url, verify_url
        ),
    )
}

pub fn assignment_email(user: &User, task: &Task, deadline: DateTime<Utc>) -> Notification {
    Notification::new(
        user.email.clone(),
        format!("New Task Assigned: {}", task.title),
        format!(
            "<p>Hello {},</p>\
             <p>Your task has been assigned successfully.</p>\
             <strong>{}</strong><br/>\
             {}<br/>\
             <p>Submit before {}.</p>\
             <p><strong>Instructions:</strong></p>\
             <ul>\
             <li>No use of AI</li>\
             <li>300 words strictly</li>\
             <li>APA7 format</li>\
             </ul>",
            user.name,
            task.title,
            task.description,
            deadline.format("%Y-%m-%d %H:%M UTC")
        ),
    )
}

pub fn submission_email(user: &User, task: &Task, new_balance: f64) -> Notification {
    Notification::new(
        user.email.clone(),
        "Task Submission Received".to_string(),
        format!(
            "<p>Hello {},</p>\
             <p>Your submission for <strong>{}</strong> has been received.</p>\
             <p>Amount ${} added to balance. Your balance is now ${}.</p>",
            user.name, task.title, task.price, new_balance
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> User {
        User::new(
            "Amina".to_string(),
            "amina@example.com".to_string(),
            "0700111222".to_string(),
        )
    }

    fn sample_task() -> Task {
        Task::new(
            "Product review".to_string(),
            "300 words on a kitchen gadget".to_string(),
            10.0,
            "brief.pdf".to_string(),
        )
    }

    #[test]
    fn test_verify_url_encodes_token() {
        let url = verify_url("https://app.example.com", "abc 123");
        assert_eq!(url, "https://app.example.com/verify.html?token=abc%20123");
    }

    #[test]
    fn test_login_email_contains_link() {
        let n = login_email(&writer(), "https://app.example.com/verify.html?token=t0");
        assert_eq!(n.to, "amina@example.com");
        assert!(n.html.contains("token=t0"));
        assert!(n.html.contains("Expires in 15 minutes"));
    }

    #[test]
    fn test_assignment_email_carries_instructions() {
        let task = sample_task();
        let deadline = Utc::now();
        let n = assignment_email(&writer(), &task, deadline);
        assert!(n.subject.contains("Product review"));
        assert!(n.html.contains("No use of AI"));
        assert!(n.html.contains("300 words strictly"));
        assert!(n.html.contains("APA7 format"));
    }

    #[test]
    fn test_submission_email_reports_amounts() {
        let task = sample_task();
        let n = submission_email(&writer(), &task, 30.0);
        assert_eq!(n.subject, "Task Submission Received");
        assert!(n.html.contains("$10"));
        assert!(n.html.contains("$30"));
    }
}
