use async_trait::async_trait;
use serde_json::Value;

use crate::collections::{CollectionSpec, Record};
use crate::errors::ServiceError;

/// Record storage as seen by the HTTP layer.
/// Ids arrive as raw path text and are parsed by the implementation.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    fn collections(&self) -> &'static [CollectionSpec];
    async fn snapshot(&self) -> Value;
    async fn get_all(&self, key: &str) -> Result<Value, ServiceError>;
    async fn get_by_id(&self, key: &str, id: &str) -> Result<Record, ServiceError>;
    async fn create(&self, key: &str, payload: Record) -> Result<Record, ServiceError>;
    async fn update(&self, key: &str, id: &str, payload: Record) -> Result<Record, ServiceError>;
    async fn update_singleton(&self, key: &str, payload: Record) -> Result<Record, ServiceError>;
    async fn delete(&self, key: &str, id: &str) -> Result<(), ServiceError>;
}
