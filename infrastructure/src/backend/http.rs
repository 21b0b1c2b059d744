//! [`RagBackend`] over HTTP.

use super::endpoints::Endpoints;
use super::error::{map_http_status, map_reqwest_error};
use async_trait::async_trait;
use futures::StreamExt;
use ragchat_application::{AnswerStream, BackendError, QueryRequest, RagBackend};
use ragchat_domain::{
    ChatRecord, ChatSummary, KnowledgeFile, NewChat, UploadFile, UploadReport, VectorStoreStats,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Multipart field name for uploaded files
const UPLOAD_FIELD: &str = "files";

/// HTTP client for the RAG backend.
///
/// `timeout` bounds connecting, every non-streaming request, and the wait
/// for the answer stream's response headers. The answer body itself is
/// unbounded; it ends when the server closes it or the caller cancels.
pub struct HttpRagBackend {
    client: reqwest::Client,
    base_url: Url,
    endpoints: Endpoints,
    timeout: Option<Duration>,
}

impl HttpRagBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::ConnectionError(format!("invalid URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::ConnectionError(format!(
                "invalid URL {base_url}: not a base URL"
            )));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            endpoints: Endpoints::default(),
            timeout: None,
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, BackendError> {
        self.client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL joined with an endpoint path, plus an optional encoded item segment
    fn url(&self, path: &str, item: Option<&str>) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                BackendError::ConnectionError(format!("invalid URL {}", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(item) = item {
                segments.push(item);
            }
        }
        Ok(url)
    }

    fn bounded(&self, request: RequestBuilder) -> RequestBuilder {
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_http_status(status, &body))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = self.send(self.bounded(request)).await?;
        let body = response.text().await.map_err(map_reqwest_error)?;
        serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(format!("{e}: {}", body.trim())))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), BackendError> {
        self.send(self.bounded(request)).await.map(|_| ())
    }
}

#[async_trait]
impl RagBackend for HttpRagBackend {
    async fn stream_answer(&self, request: &QueryRequest) -> Result<AnswerStream, BackendError> {
        let url = self.url(&self.endpoints.chat_stream, None)?;
        debug!("POST {} ({} history turns)", url, request.history.len());

        let sent = self.send(self.client.post(url).json(request));
        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, sent)
                .await
                .map_err(|_| BackendError::Timeout)??,
            None => sent.await?,
        };
        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::StreamError(e.to_string())
                }
            })
        });
        Ok(stream.boxed())
    }

    async fn list_chats(&self) -> Result<Vec<ChatSummary>, BackendError> {
        let url = self.url(&self.endpoints.history, None)?;
        trace!("GET {}", url);
        self.json(self.client.get(url)).await
    }

    async fn get_chat(&self, id: &str) -> Result<ChatRecord, BackendError> {
        let url = self.url(&self.endpoints.history, Some(id))?;
        trace!("GET {}", url);
        self.json(self.client.get(url)).await
    }

    async fn create_chat(&self, chat: &NewChat) -> Result<ChatRecord, BackendError> {
        let url = self.url(&self.endpoints.history, None)?;
        trace!("POST {}", url);
        let mut record: ChatRecord = self.json(self.client.post(url).json(chat)).await?;

        // Some backends answer with just the new id
        if record.title.is_empty() {
            record.title = chat.title.clone();
        }
        if record.messages.is_empty() {
            record.messages = chat.messages.clone();
        }
        Ok(record)
    }

    async fn update_chat(&self, chat: &ChatRecord) -> Result<(), BackendError> {
        let url = self.url(&self.endpoints.history, Some(&chat.id))?;
        trace!("PUT {}", url);
        self.execute(self.client.put(url).json(chat)).await
    }

    async fn delete_chat(&self, id: &str) -> Result<(), BackendError> {
        let url = self.url(&self.endpoints.history, Some(id))?;
        trace!("DELETE {}", url);
        self.execute(self.client.delete(url)).await
    }

    async fn list_files(&self) -> Result<Vec<KnowledgeFile>, BackendError> {
        let url = self.url(&self.endpoints.files, None)?;
        trace!("GET {}", url);
        self.json(self.client.get(url)).await
    }

    async fn upload_files(&self, files: &[UploadFile]) -> Result<UploadReport, BackendError> {
        let url = self.url(&self.endpoints.upload, None)?;
        debug!("POST {} ({} files)", url, files.len());

        // Relative paths go out verbatim instead of as RFC 5987 `filename*`
        let form = files.iter().fold(Form::new().percent_encode_noop(), |form, file| {
            form.part(
                UPLOAD_FIELD,
                Part::bytes(file.bytes.clone()).file_name(file.name.clone()),
            )
        });
        let response = self
            .send(self.bounded(self.client.post(url).multipart(form)))
            .await?;
        let body = response.text().await.map_err(map_reqwest_error)?;

        // A detailed report is optional; a bare acknowledgement means all succeeded
        let detailed = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .filter(|v| v.get("uploaded").is_some() || v.get("failed").is_some())
            .and_then(|v| serde_json::from_value::<UploadReport>(v).ok());
        Ok(detailed.unwrap_or_else(|| UploadReport::all_uploaded(files)))
    }

    async fn delete_file(&self, name: &str) -> Result<(), BackendError> {
        let url = self.url(&self.endpoints.files, Some(name))?;
        trace!("DELETE {}", url);
        self.execute(self.client.delete(url)).await
    }

    async fn clear_vector_store(&self) -> Result<(), BackendError> {
        let url = self.url(&self.endpoints.clear_vector_store, None)?;
        trace!("POST {}", url);
        self.execute(self.client.post(url)).await
    }

    async fn vector_store_stats(&self) -> Result<VectorStoreStats, BackendError> {
        let url = self.url(&self.endpoints.vector_store_stats, None)?;
        trace!("GET {}", url);
        self.json(self.client.get(url)).await
    }
}
