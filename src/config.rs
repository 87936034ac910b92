use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub upload: UploadConfig,
    pub policy: PolicyConfig,
    pub mailer: MailerConfig,
    pub worker: WorkerConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub sentinel_enabled: bool,
    pub sentinel_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize, // 10MB in bytes
    pub dir: String,
}

// Assignment lifecycle knobs
#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    pub cooldown_hours: i64,       // wait between assignments
    pub deadline_hours: i64,       // submission window recorded on assignment
    pub session_ttl_minutes: i64,  // magic-link validity
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailerConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from_address: String,
    pub frontend_origin: String, // base URL embedded in magic-link emails
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    pub worker_count: usize,
    pub max_concurrent_deliveries: usize,
    pub max_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub tokens: Vec<AdminToken>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminToken {
    pub token: String,
    pub label: String,
    pub scopes: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?;

        config.try_deserialize()
    }
}
