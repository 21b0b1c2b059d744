//! In-memory [`RagBackend`] shared by the use case tests.

use crate::ports::rag_backend::{AnswerStream, BackendError, QueryRequest, RagBackend};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use ragchat_domain::{
    ChatRecord, ChatSummary, KnowledgeFile, NewChat, UploadFile, UploadReport, VectorStoreStats,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Scripted response to the next `stream_answer` call
pub enum FakeAnswer {
    /// Yield these chunks (or read errors), then end the body
    Chunks(Vec<Result<Vec<u8>, String>>),
    /// Yield these chunks, then never yield again
    Stall(Vec<Vec<u8>>),
    /// Reject the request with a status
    Refused(u16, String),
}

impl FakeAnswer {
    pub fn chunks(chunks: &[&str]) -> Self {
        FakeAnswer::Chunks(chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect())
    }
}

#[derive(Default)]
pub struct FakeBackend {
    answers: Mutex<VecDeque<FakeAnswer>>,
    requests: Mutex<Vec<QueryRequest>>,
    chats: Mutex<BTreeMap<String, ChatRecord>>,
    next_id: AtomicUsize,
    files: Mutex<Vec<KnowledgeFile>>,
    uploads: Mutex<Vec<Vec<String>>>,
    cleared: AtomicBool,
    fail_saves: AtomicBool,
}

impl FakeBackend {
    pub fn push_answer(&self, answer: FakeAnswer) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn insert_chat(&self, record: ChatRecord) {
        self.chats.lock().unwrap().insert(record.id.clone(), record);
    }

    pub fn chat(&self, id: &str) -> Option<ChatRecord> {
        self.chats.lock().unwrap().get(id).cloned()
    }

    pub fn chat_count(&self) -> usize {
        self.chats.lock().unwrap().len()
    }

    pub fn set_files(&self, files: Vec<KnowledgeFile>) {
        *self.files.lock().unwrap() = files;
    }

    pub fn uploads(&self) -> Vec<Vec<String>> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn was_cleared(&self) -> bool {
        self.cleared.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    fn check_save(&self) -> Result<(), BackendError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BackendError::ConnectionError("history store offline".into()));
        }
        Ok(())
    }

    fn not_found(what: &str) -> BackendError {
        BackendError::Status {
            status: 404,
            message: format!("{what} not found"),
        }
    }
}

#[async_trait]
impl RagBackend for FakeBackend {
    async fn stream_answer(&self, request: &QueryRequest) -> Result<AnswerStream, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| FakeAnswer::chunks(&["data: [DONE]\n"]));

        match answer {
            FakeAnswer::Chunks(chunks) => {
                let items = chunks.into_iter().map(|chunk| {
                    chunk
                        .map(Bytes::from)
                        .map_err(BackendError::StreamError)
                });
                Ok(futures::stream::iter(items).boxed())
            }
            FakeAnswer::Stall(chunks) => {
                let items = chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk)));
                Ok(futures::stream::iter(items)
                    .chain(futures::stream::pending())
                    .boxed())
            }
            FakeAnswer::Refused(status, message) => Err(BackendError::Status { status, message }),
        }
    }

    async fn list_chats(&self) -> Result<Vec<ChatSummary>, BackendError> {
        Ok(self
            .chats
            .lock()
            .unwrap()
            .values()
            .map(ChatRecord::summary)
            .collect())
    }

    async fn get_chat(&self, id: &str) -> Result<ChatRecord, BackendError> {
        self.chat(id).ok_or_else(|| Self::not_found("chat"))
    }

    async fn create_chat(&self, chat: &NewChat) -> Result<ChatRecord, BackendError> {
        self.check_save()?;
        let id = format!("c{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let record = ChatRecord {
            id: id.clone(),
            title: chat.title.clone(),
            messages: chat.messages.clone(),
            created_at: None,
            updated_at: None,
        };
        self.insert_chat(record.clone());
        Ok(record)
    }

    async fn update_chat(&self, chat: &ChatRecord) -> Result<(), BackendError> {
        self.check_save()?;
        let mut chats = self.chats.lock().unwrap();
        match chats.get_mut(&chat.id) {
            Some(existing) => {
                *existing = chat.clone();
                Ok(())
            }
            None => Err(Self::not_found("chat")),
        }
    }

    async fn delete_chat(&self, id: &str) -> Result<(), BackendError> {
        self.chats
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("chat"))
    }

    async fn list_files(&self) -> Result<Vec<KnowledgeFile>, BackendError> {
        Ok(self.files.lock().unwrap().clone())
    }

    async fn upload_files(&self, files: &[UploadFile]) -> Result<UploadReport, BackendError> {
        self.uploads
            .lock()
            .unwrap()
            .push(files.iter().map(|f| f.name.clone()).collect());
        Ok(UploadReport::all_uploaded(files))
    }

    async fn delete_file(&self, name: &str) -> Result<(), BackendError> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.name != name);
        if files.len() == before {
            return Err(Self::not_found("file"));
        }
        Ok(())
    }

    async fn clear_vector_store(&self) -> Result<(), BackendError> {
        self.cleared.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn vector_store_stats(&self) -> Result<VectorStoreStats, BackendError> {
        Ok(VectorStoreStats {
            total_documents: Some(self.files.lock().unwrap().len() as u64),
            total_chunks: Some(42),
            collection: Some("docs".into()),
            extra: BTreeMap::new(),
        })
    }
}
