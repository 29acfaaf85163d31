// In-process stand-ins for object storage and the document database
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use match_summary_uploader::{
    document_store::DocumentStore,
    error::{Result, SummaryError},
    storage::{clip_locator, ObjectStore},
};

#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<(String, String), Value>>,
    fail_collection: Option<String>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes to `collection` fail, for exercising partial-failure paths.
    pub fn failing_on(collection: &str) -> Self {
        Self {
            fail_collection: Some(collection.to_string()),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self, collection: &str) -> Vec<String> {
        self.documents
            .lock()
            .unwrap()
            .keys()
            .filter(|(c, _)| c == collection)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set_document(&self, collection: &str, key: &str, body: &Value) -> Result<()> {
        if self.fail_collection.as_deref() == Some(collection) {
            return Err(SummaryError::Storage(format!("write to {} rejected", collection)));
        }
        self.documents
            .lock()
            .unwrap()
            .insert((collection.to_string(), key.to_string()), body.clone());
        Ok(())
    }

    async fn get_document(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub source: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<Vec<StoredObject>>,
    public_base_url: Option<String>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_public_base_url(base: &str) -> Self {
        Self {
            public_base_url: Some(base.to_string()),
            ..Self::default()
        }
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload_file(&self, local: &Path, key: &str) -> Result<String> {
        let bytes = tokio::fs::read(local).await?;
        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            source: local.to_path_buf(),
            bytes,
        });
        Ok(clip_locator(self.public_base_url.as_deref(), key))
    }
}
