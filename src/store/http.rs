//! HTTP implementation of the book store

use reqwest::{Client, Response};

use super::{Ack, BookStore, DeleteRequest, SaveRequest, StoreError};
use crate::core::book::Book;

/// Book store backed by the REST API at a base URL
#[derive(Debug, Clone)]
pub struct HttpBookStore {
    client: Client,
    base_url: String,
}

impl HttpBookStore {
    /// Create a store for the API rooted at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The normalized base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a response into its body text, failing on non-2xx statuses
    async fn body_text(response: Response) -> Result<String, StoreError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl BookStore for HttpBookStore {
    async fn save(&self, request: &SaveRequest) -> Result<Ack, StoreError> {
        tracing::debug!("POST /save npc_id={}", request.n);
        let response = self
            .client
            .post(self.endpoint("save"))
            .json(request)
            .send()
            .await?;
        let body = Self::body_text(response).await?;
        tracing::debug!("Save acknowledged: {}", body);
        Ok(Ack(body))
    }

    async fn list_all(&self) -> Result<Vec<Book>, StoreError> {
        tracing::debug!("GET /getAll");
        let response = self.client.get(self.endpoint("getAll")).send().await?;
        let body = Self::body_text(response).await?;
        let books: Vec<Book> = serde_json::from_str(&body)?;
        tracing::debug!("Fetched {} books", books.len());
        Ok(books)
    }

    async fn delete_by_id(&self, npc_id: i64) -> Result<Ack, StoreError> {
        tracing::debug!("POST /delete npc_id={}", npc_id);
        let response = self
            .client
            .post(self.endpoint("delete"))
            .json(&DeleteRequest { npc_id })
            .send()
            .await?;
        let body = Self::body_text(response).await?;
        tracing::debug!("Delete acknowledged: {}", body);
        Ok(Ack(body))
    }

    fn download_url(&self) -> String {
        self.endpoint("downloadBooks")
    }
}
