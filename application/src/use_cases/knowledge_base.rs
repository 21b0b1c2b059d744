//! Knowledge base management use case.
//!
//! Lists, uploads, and removes the documents the backend retrieves from,
//! and exposes vector store maintenance.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
};
use crate::ports::rag_backend::{BackendError, RagBackend};
use crate::ports::upload_source::{UploadSource, UploadSourceError};
use ragchat_domain::{DomainError, KnowledgeFile, UploadFile, UploadReport, VectorStoreStats};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Collect(#[from] UploadSourceError),

    #[error("Uploading from paths is not configured")]
    NoUploadSource,
}

pub struct KnowledgeBaseUseCase {
    backend: Arc<dyn RagBackend>,
    upload_source: Option<Arc<dyn UploadSource>>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl KnowledgeBaseUseCase {
    pub fn new(backend: Arc<dyn RagBackend>) -> Self {
        Self {
            backend,
            upload_source: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_upload_source(mut self, source: Arc<dyn UploadSource>) -> Self {
        self.upload_source = Some(source);
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub async fn list_files(&self) -> Result<Vec<KnowledgeFile>, KnowledgeBaseError> {
        let files = self.backend.list_files().await?;
        debug!("Knowledge base holds {} files", files.len());
        Ok(files)
    }

    /// Upload files in one request. An empty selection is rejected locally.
    pub async fn upload(&self, files: &[UploadFile]) -> Result<UploadReport, KnowledgeBaseError> {
        if files.is_empty() {
            return Err(DomainError::EmptyUpload.into());
        }

        let total_bytes: usize = files.iter().map(UploadFile::len).sum();
        info!("Uploading {} files ({} bytes)", files.len(), total_bytes);

        let report = self.backend.upload_files(files).await?;
        for failed in &report.failed {
            warn!("Upload of {} rejected: {}", failed.name, failed.reason);
        }
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::FilesUploaded,
            serde_json::json!({
                "uploaded": report.uploaded,
                "failed": report.failed.iter().map(|f| &f.name).collect::<Vec<_>>(),
            }),
        ));
        Ok(report)
    }

    /// Collect files (or whole folders) from `paths` and upload them.
    pub async fn upload_paths(
        &self,
        paths: &[PathBuf],
    ) -> Result<UploadReport, KnowledgeBaseError> {
        let source = self
            .upload_source
            .as_ref()
            .ok_or(KnowledgeBaseError::NoUploadSource)?;
        let files = source.collect(paths)?;
        debug!("Collected {} files from {} paths", files.len(), paths.len());
        self.upload(&files).await
    }

    pub async fn delete_file(&self, name: &str) -> Result<(), KnowledgeBaseError> {
        self.backend.delete_file(name).await?;
        info!("Deleted file {}", name);
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::FileDeleted,
            serde_json::json!({ "name": name }),
        ));
        Ok(())
    }

    /// Drop every indexed chunk from the vector store
    pub async fn clear_vector_store(&self) -> Result<(), KnowledgeBaseError> {
        self.backend.clear_vector_store().await?;
        info!("Vector store cleared");
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::VectorStoreCleared,
            serde_json::Value::Null,
        ));
        Ok(())
    }

    pub async fn stats(&self) -> Result<VectorStoreStats, KnowledgeBaseError> {
        Ok(self.backend.vector_store_stats().await?)
    }
}
