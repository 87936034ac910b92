mod redis_service;
pub mod uploads;
pub mod mailer;

pub use redis_service::RedisService;
pub use uploads::{UploadStore, StoredFile};
pub use mailer::Mailer;
