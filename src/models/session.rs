use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rand::Rng;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    pub token: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_email: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: generate_token(),
            user_email,
            created_at: Utc::now(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// 256-bit random token, hex-encoded
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_expiry_check() {
        let now = Utc::now();
        let session = Session::new("writer@example.com".into(), now + Duration::minutes(15));
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::minutes(15)));
        assert!(session.is_expired(now + Duration::minutes(16)));
    }
}
