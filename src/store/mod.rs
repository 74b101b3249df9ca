//! Remote book storage and the dispatcher that drives it

pub mod dispatch;
pub mod http;

pub use dispatch::Dispatcher;
pub use http::HttpBookStore;

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use crate::core::book::Book;

/// Failures talking to the backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection, timeout or other transport failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The book list could not be decoded
    #[error("invalid book list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Body of a save request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub html_content: String,
    /// NPC id. The backend names this field `n` on save only.
    pub n: i64,
    pub command: String,
}

/// Body of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub npc_id: i64,
}

/// Response body of a mutating call, kept only for logging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack(pub String);

/// The four operations the client needs from a backend
pub trait BookStore: Send + Sync + 'static {
    /// Persist a new book
    fn save(&self, request: &SaveRequest) -> impl Future<Output = Result<Ack, StoreError>> + Send;

    /// Fetch every stored book, in no particular order
    fn list_all(&self) -> impl Future<Output = Result<Vec<Book>, StoreError>> + Send;

    /// Remove the book with the given id
    fn delete_by_id(&self, npc_id: i64) -> impl Future<Output = Result<Ack, StoreError>> + Send;

    /// Address the user's browser opens to download all books
    fn download_url(&self) -> String;
}
