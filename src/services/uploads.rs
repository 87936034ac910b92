use axum::extract::multipart::Field;
use std::{io::Write, path::Path};
use crate::errors::{AppError, AppResult};

pub struct StoredFile {
    pub stored_name: String,
    pub original_name: String,
}

// Writes multipart file fields under the configured upload directory.
// Stored names are prefixed with a timestamp and a uuid so concurrent
// uploads of the same filename never collide.
pub struct UploadStore {
    dir: String,
}

impl UploadStore {
    pub fn new(dir: &str) -> Self {
        Self {
            dir: dir.to_string(),
        }
    }

    pub async fn store(&self, field: &mut Field<'_>) -> AppResult<StoredFile> {
        let original_name = field
            .file_name()
            .ok_or_else(|| AppError::Upload("Missing filename in upload".into()))?
            .to_string();

        if !Path::new(&self.dir).exists() {
            std::fs::create_dir_all(&self.dir).map_err(|e| {
                tracing::error!("Failed to create upload directory {}: {}", self.dir, e);
                AppError::File(e)
            })?;
        }

        let stored_name = storage_name(
            chrono::Utc::now().timestamp(),
            &uuid::Uuid::new_v4().to_string(),
            &original_name,
        );
        let path = self.path_of(&stored_name);

        save_field(field, &path).await?;

        tracing::debug!("Stored upload {} as {}", original_name, path);
        Ok(StoredFile {
            stored_name,
            original_name,
        })
    }

    pub fn path_of(&self, stored_name: &str) -> String {
        format!("{}/{}", self.dir, stored_name)
    }
}

// Streams the field to disk chunk by chunk through a buffered writer.
async fn save_field(field: &mut Field<'_>, path: &str) -> AppResult<()> {
    let file = std::fs::File::create(path).map_err(|e| {
        tracing::error!("Failed to create file {}: {}", path, e);
        AppError::File(e)
    })?;
    let mut writer = std::io::BufWriter::new(file);

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Upload(format!("Failed to read upload chunk: {}", e)))?
    {
        writer.write_all(&chunk).map_err(|e| {
            tracing::error!("Error writing chunk to {}: {}", path, e);
            AppError::File(e)
        })?;
    }

    writer.flush().map_err(|e| {
        tracing::error!("Error flushing file {}: {}", path, e);
        AppError::File(e)
    })?;

    Ok(())
}

// Reads a non-file form field as text.
pub async fn field_text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Upload(format!("Failed to read form field: {}", e)))
}

fn storage_name(timestamp: i64, uuid: &str, original: &str) -> String {
    format!("{}_{}_{}", timestamp, uuid, sanitize_filename(original))
}

// Keeps only the final path component and a conservative character set, so
// a hostile filename cannot escape the upload directory.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim_matches('.');

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_name() {
        assert_eq!(sanitize_filename("essay.docx"), "essay.docx");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
    }

    #[test]
    fn test_sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_filename("my essay (final).docx"), "my_essay__final_.docx");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("..."), "upload");
    }

    #[test]
    fn test_storage_name_is_prefixed() {
        let name = storage_name(1700000000, "abc-123", "essay.docx");
        assert_eq!(name, "1700000000_abc-123_essay.docx");
    }

    #[test]
    fn test_path_of_joins_dir() {
        let store = UploadStore::new("uploads");
        assert_eq!(store.path_of("x.docx"), "uploads/x.docx");
    }
}
