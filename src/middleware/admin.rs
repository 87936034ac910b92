use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use crate::config::Config;
use crate::errors::AppError;
use crate::services::RedisService;

// Scopes carried by the admin token that authorized the request.
// Handlers demand the scope they need via require().
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub label: String,
    scopes: Vec<String>,
}

impl AdminContext {
    pub fn new(label: String, scopes: Vec<String>) -> Self {
        Self { label, scopes }
    }

    pub fn require(&self, scope: &str) -> Result<(), AppError> {
        if self.scopes.iter().any(|s| s == scope) {
            Ok(())
        } else {
            Err(AppError::Unauthorized(format!(
                "Admin token '{}' lacks required scope '{}'",
                self.label, scope
            )))
        }
    }
}

pub async fn require_admin(
    State((_, config)): State<(RedisService, Config)>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = admin_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing admin token".into()))?;

    let token = config
        .admin
        .tokens
        .iter()
        .find(|t| t.token == provided)
        .ok_or_else(|| AppError::Unauthorized("Unrecognized admin token".into()))?;

    tracing::debug!("Admin request authorized for token '{}'", token.label);

    req.extensions_mut()
        .insert(AdminContext::new(token.label.clone(), token.scopes.clone()));

    Ok(next.run(req).await)
}

// Accepts "Authorization: Bearer <token>" or the x-admin-token header.
fn admin_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer secret-1"),
        );
        headers.insert("x-admin-token", HeaderValue::from_static("secret-2"));
        assert_eq!(admin_token(&headers), Some("secret-1".to_string()));
    }

    #[test]
    fn test_plain_header_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-admin-token", HeaderValue::from_static("secret-2"));
        assert_eq!(admin_token(&headers), Some("secret-2".to_string()));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(admin_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_scope_check() {
        let ctx = AdminContext::new("ops".to_string(), vec!["tasks:write".to_string()]);
        assert!(ctx.require("tasks:write").is_ok());
        assert!(ctx.require("users:purge").is_err());
    }
}
