//! REST paths used by [`HttpRagBackend`](super::HttpRagBackend)

use serde::{Deserialize, Serialize};

/// Endpoint paths, relative to the backend base URL.
///
/// Item routes (`/history/{id}`, `/files/{name}`) append an encoded path
/// segment to the collection path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub chat_stream: String,
    pub history: String,
    pub files: String,
    pub upload: String,
    pub clear_vector_store: String,
    pub vector_store_stats: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            chat_stream: "/api/chat/stream".to_string(),
            history: "/api/history".to_string(),
            files: "/api/files".to_string(),
            upload: "/api/files/upload".to_string(),
            clear_vector_store: "/api/vectorstore/clear".to_string(),
            vector_store_stats: "/api/vectorstore/stats".to_string(),
        }
    }
}
