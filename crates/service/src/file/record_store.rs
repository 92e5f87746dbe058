use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde_json::{Map, Value};
use tokio::{fs, sync::RwLock};
use tracing::{debug, error, info};

use crate::collections::{CollectionData, CollectionKind, CollectionSpec, Record};
use crate::errors::ServiceError;
use crate::ids::{self, IntoRecordId};
use crate::repository::RecordRepository;
use crate::storage::json_file::{self, JsonFile};

/// Result of loading one collection from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// File was missing and has been created with the empty default.
    Created,
    /// File could not be used; memory holds the empty default and the file
    /// was left as it was.
    Malformed,
}

struct Collection {
    spec: &'static CollectionSpec,
    file_path: PathBuf,
    data: RwLock<CollectionData>,
}

/// File-backed store for every portfolio collection.
///
/// Each collection lives in `<data_dir>/<key>.json` and is held in memory
/// behind its own lock. Every mutation rewrites exactly that one file while
/// still holding the write lock, so mutations of the same collection never
/// interleave. A failed write is reported but the in-memory change stays.
pub struct FileRecordStore {
    data_dir: PathBuf,
    specs: &'static [CollectionSpec],
    collections: Vec<Collection>,
}

impl FileRecordStore {
    /// Open the store and load every collection in `specs`.
    ///
    /// Missing files are created with `{}` or `[]`. Malformed files are
    /// logged and replaced by the default in memory only.
    pub async fn open<P: Into<PathBuf>>(
        data_dir: P,
        specs: &'static [CollectionSpec],
    ) -> Result<Arc<Self>, ServiceError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| ServiceError::Storage(format!("{}: {e}", data_dir.display())))?;

        let collections = specs
            .iter()
            .map(|spec| Collection {
                spec,
                file_path: data_dir.join(spec.file_name()),
                data: RwLock::new(CollectionData::empty(spec.kind)),
            })
            .collect();
        let store = Self { data_dir, specs, collections };

        for spec in specs {
            store.load(spec.key).await?;
        }
        Ok(Arc::new(store))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn specs(&self) -> &'static [CollectionSpec] {
        self.specs
    }

    pub fn file_path(&self, key: &str) -> Result<&Path, ServiceError> {
        Ok(self.collection(key)?.file_path.as_path())
    }

    fn collection(&self, key: &str) -> Result<&Collection, ServiceError> {
        self.collections
            .iter()
            .find(|c| c.spec.key == key)
            .ok_or_else(|| ServiceError::UnknownCollection(key.to_string()))
    }

    /// (Re)load one collection from its backing file.
    ///
    /// Only fails when a missing file cannot be created.
    pub async fn load(&self, key: &str) -> Result<LoadOutcome, ServiceError> {
        let col = self.collection(key)?;
        let kind = col.spec.kind;
        let path = &col.file_path;
        let mut data = col.data.write().await;

        let parsed = match json_file::read(path).await {
            JsonFile::Missing => {
                json_file::create_with(path, kind.empty_document()).await?;
                *data = CollectionData::empty(kind);
                info!(collection = key, path = %path.display(), "collection file created");
                return Ok(LoadOutcome::Created);
            }
            JsonFile::Invalid(reason) => Err(reason),
            JsonFile::Parsed(value) => CollectionData::from_value(kind, value),
        };

        match parsed {
            Ok(loaded) => {
                *data = loaded;
                info!(collection = key, path = %path.display(), "collection loaded");
                Ok(LoadOutcome::Loaded)
            }
            Err(reason) => {
                *data = CollectionData::empty(kind);
                let err = ServiceError::Malformed { key: key.to_string(), reason };
                error!(collection = key, path = %path.display(), error = %err, "collection file malformed; starting with empty default");
                Ok(LoadOutcome::Malformed)
            }
        }
    }

    /// Current value of a collection: the singleton object or the full list.
    pub async fn get_all(&self, key: &str) -> Result<Value, ServiceError> {
        let col = self.collection(key)?;
        let data = col.data.read().await;
        Ok(data.to_value())
    }

    /// First record of a list collection whose `id` matches.
    pub async fn get_by_id(&self, key: &str, id: impl IntoRecordId) -> Result<Record, ServiceError> {
        let col = self.collection(key)?;
        let data = col.data.read().await;
        let items = as_list(key, &data)?;
        id.into_record_id()
            .and_then(|id| items.iter().find(|r| ids::record_id(r) == Some(id)))
            .cloned()
            .ok_or_else(|| ServiceError::not_found("item"))
    }

    /// Append a record with a freshly allocated `id` and persist.
    /// Any `id` in the payload is overwritten.
    pub async fn create(&self, key: &str, mut payload: Record) -> Result<Record, ServiceError> {
        let col = self.collection(key)?;
        let mut data = col.data.write().await;
        let items = as_list_mut(key, &mut data)?;

        let id = ids::next_id(items).ok_or_else(|| {
            ServiceError::Storage(format!("{key}: no id left after {}", u64::MAX))
        })?;
        payload.insert(ids::ID_FIELD.to_string(), Value::from(id));
        items.push(payload.clone());

        Self::save(col, &data).await?;
        info!(collection = key, id, "item created");
        Ok(payload)
    }

    /// Replace a whole record, keeping its original `id`, and persist.
    pub async fn update(
        &self,
        key: &str,
        id: impl IntoRecordId,
        mut payload: Record,
    ) -> Result<Record, ServiceError> {
        let col = self.collection(key)?;
        let mut data = col.data.write().await;
        let items = as_list_mut(key, &mut data)?;

        let (id, index) = id
            .into_record_id()
            .and_then(|id| position_of(items, id).map(|index| (id, index)))
            .ok_or_else(|| ServiceError::not_found("item"))?;

        payload.insert(ids::ID_FIELD.to_string(), Value::from(id));
        items[index] = payload.clone();

        Self::save(col, &data).await?;
        info!(collection = key, id, "item updated");
        Ok(payload)
    }

    /// Replace a singleton object wholesale and persist.
    pub async fn update_singleton(&self, key: &str, payload: Record) -> Result<Record, ServiceError> {
        let col = self.collection(key)?;
        let mut data = col.data.write().await;
        match &mut *data {
            CollectionData::Singleton(obj) => *obj = payload.clone(),
            CollectionData::List(_) => {
                return Err(ServiceError::wrong_kind(key, CollectionKind::Singleton))
            }
        }

        Self::save(col, &data).await?;
        info!(collection = key, "singleton replaced");
        Ok(payload)
    }

    /// Remove the record with the given `id` and persist.
    pub async fn delete(&self, key: &str, id: impl IntoRecordId) -> Result<(), ServiceError> {
        let col = self.collection(key)?;
        let mut data = col.data.write().await;
        let items = as_list_mut(key, &mut data)?;

        let id = id.into_record_id();
        let before = items.len();
        let kept: Vec<Record> = items
            .drain(..)
            .filter(|r| id.is_none() || ids::record_id(r) != id)
            .collect();
        *items = kept;

        if items.len() == before {
            return Err(ServiceError::not_found("item"));
        }

        Self::save(col, &data).await?;
        info!(collection = key, id = ?id, "item deleted");
        Ok(())
    }

    /// Overwrite the backing file with the current in-memory value.
    pub async fn persist(&self, key: &str) -> Result<(), ServiceError> {
        let col = self.collection(key)?;
        let data = col.data.read().await;
        Self::save(col, &data).await
    }

    /// Every collection keyed by its name.
    pub async fn snapshot(&self) -> Value {
        let mut out = Map::new();
        for col in &self.collections {
            let data = col.data.read().await;
            out.insert(col.spec.key.to_string(), data.to_value());
        }
        Value::Object(out)
    }

    async fn save(col: &Collection, data: &CollectionData) -> Result<(), ServiceError> {
        match json_file::write_pretty(&col.file_path, data).await {
            Ok(()) => {
                debug!(collection = col.spec.key, path = %col.file_path.display(), "collection saved");
                Ok(())
            }
            Err(e) => {
                error!(collection = col.spec.key, path = %col.file_path.display(), error = %e, "collection save failed; memory and disk now differ");
                Err(e)
            }
        }
    }
}

fn position_of(items: &[Record], id: u64) -> Option<usize> {
    items.iter().position(|r| ids::record_id(r) == Some(id))
}

fn as_list<'a>(key: &str, data: &'a CollectionData) -> Result<&'a Vec<Record>, ServiceError> {
    match data {
        CollectionData::List(items) => Ok(items),
        CollectionData::Singleton(_) => Err(ServiceError::wrong_kind(key, CollectionKind::List)),
    }
}

fn as_list_mut<'a>(key: &str, data: &'a mut CollectionData) -> Result<&'a mut Vec<Record>, ServiceError> {
    match data {
        CollectionData::List(items) => Ok(items),
        CollectionData::Singleton(_) => Err(ServiceError::wrong_kind(key, CollectionKind::List)),
    }
}

#[async_trait::async_trait]
impl RecordRepository for FileRecordStore {
    fn collections(&self) -> &'static [CollectionSpec] { self.specs() }
    async fn snapshot(&self) -> Value { self.snapshot().await }
    async fn get_all(&self, key: &str) -> Result<Value, ServiceError> { self.get_all(key).await }
    async fn get_by_id(&self, key: &str, id: &str) -> Result<Record, ServiceError> { self.get_by_id(key, id).await }
    async fn create(&self, key: &str, payload: Record) -> Result<Record, ServiceError> { self.create(key, payload).await }
    async fn update(&self, key: &str, id: &str, payload: Record) -> Result<Record, ServiceError> { self.update(key, id, payload).await }
    async fn update_singleton(&self, key: &str, payload: Record) -> Result<Record, ServiceError> { self.update_singleton(key, payload).await }
    async fn delete(&self, key: &str, id: &str) -> Result<(), ServiceError> { self.delete(key, id).await }
}
