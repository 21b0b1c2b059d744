//! Knowledge base entities

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A document known to the backend's knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeFile {
    #[serde(alias = "filename", alias = "file_name")]
    pub name: String,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Number of chunks indexed from this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<u64>,
}

/// A file read from disk, ready to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Name sent to the backend; folder uploads use the path relative to the folder
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A file the backend refused, with its reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUpload {
    #[serde(alias = "filename", alias = "file_name")]
    pub name: String,
    #[serde(default, alias = "error")]
    pub reason: String,
}

/// Outcome of an upload request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    #[serde(default)]
    pub uploaded: Vec<String>,
    #[serde(default)]
    pub failed: Vec<FailedUpload>,
}

impl UploadReport {
    /// Report used when the backend acknowledges without details
    pub fn all_uploaded(files: &[UploadFile]) -> Self {
        Self {
            uploaded: files.iter().map(|f| f.name.clone()).collect(),
            failed: Vec::new(),
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Vector store statistics; unknown backend fields are kept in `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_documents: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
