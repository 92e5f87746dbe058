use std::{io::ErrorKind, path::Path};

use serde::Serialize;
use serde_json::Value;
use tokio::fs;

use crate::errors::ServiceError;

/// What was found at a JSON file path.
#[derive(Debug)]
pub enum JsonFile {
    Missing,
    Parsed(Value),
    /// Unreadable or not valid JSON; carries the reason.
    Invalid(String),
}

pub async fn read(path: &Path) -> JsonFile {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => JsonFile::Parsed(value),
            Err(e) => JsonFile::Invalid(e.to_string()),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => JsonFile::Missing,
        Err(e) => JsonFile::Invalid(e.to_string()),
    }
}

/// Write `contents` verbatim, creating parent directories first.
pub async fn create_with(path: &Path, contents: &str) -> Result<(), ServiceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.ok();
    }
    fs::write(path, contents)
        .await
        .map_err(|e| ServiceError::Storage(format!("{}: {e}", path.display())))
}

/// Overwrite the whole file with pretty-printed JSON (two-space indent).
pub async fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ServiceError> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| ServiceError::Storage(e.to_string()))?;
    fs::write(path, data)
        .await
        .map_err(|e| ServiceError::Storage(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn read_reports_missing_invalid_and_parsed() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("json_file_{}", Uuid::new_v4()));
        let path = dir.join("doc.json");

        assert!(matches!(read(&path).await, JsonFile::Missing));

        create_with(&path, "{not json").await?;
        assert!(matches!(read(&path).await, JsonFile::Invalid(_)));

        write_pretty(&path, &json!({"a": [1, 2]})).await?;
        match read(&path).await {
            JsonFile::Parsed(v) => assert_eq!(v, json!({"a": [1, 2]})),
            other => panic!("unexpected {other:?}"),
        }
        let text = fs::read_to_string(&path).await?;
        assert!(text.contains("\n  \"a\""), "{text}");

        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn write_into_missing_dir_fails() {
        let path = std::env::temp_dir()
            .join(format!("json_file_{}", Uuid::new_v4()))
            .join("nested")
            .join("doc.json");
        let res = write_pretty(&path, &json!([])).await;
        assert!(matches!(res, Err(ServiceError::Storage(_))));
    }
}
