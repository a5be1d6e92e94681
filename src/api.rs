use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    ChatAnswer, ChecklistItem, ChecklistStatus, DocumentMeta, NewNote, Note, StatusUpdate,
};

const API_KEY_HEADER: &str = "X-API-Key";

/// Everything the gateway can fail with. All non-2xx responses collapse to
/// `Status`; callers decide how (or whether) to surface it. No retries, no
/// timeouts.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The backend surface, as a trait so the app can be driven by a fake in
/// tests. `ApiClient` is the only production implementation.
#[async_trait]
pub trait RelocationApi: Send + Sync {
    async fn chat(&self, query: &str) -> ApiResult<ChatAnswer>;
    async fn list_checklist(&self, category: Option<&str>) -> ApiResult<Vec<ChecklistItem>>;
    async fn update_checklist_status(&self, id: &str, status: ChecklistStatus) -> ApiResult<()>;
    async fn delete_checklist_item(&self, id: &str) -> ApiResult<()>;
    async fn list_notes(&self) -> ApiResult<Vec<Note>>;
    async fn create_note(&self, note: &NewNote) -> ApiResult<Note>;
    async fn delete_note(&self, id: &str) -> ApiResult<()>;
    async fn upload_document(&self, filename: &str, bytes: Vec<u8>) -> ApiResult<DocumentMeta>;
}

/// Single point of HTTP egress: base URL plus the `X-API-Key` credential on
/// every request.
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn checked(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<(&str, &str)>,
    ) -> ApiResult<T> {
        debug!(path, ?query, "GET");
        let mut request = self
            .client
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.api_key);
        if let Some((key, value)) = query {
            request = request.query(&[(key, value)]);
        }
        let response = Self::checked(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;
        let response = Self::checked(response).await?;
        Ok(response.json().await?)
    }

    async fn patch<B: Serialize + Sync>(&self, path: &str, body: &B) -> ApiResult<()> {
        debug!(path, "PATCH");
        let response = self
            .client
            .patch(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        debug!(path, "DELETE");
        let response = self
            .client
            .delete(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RelocationApi for ApiClient {
    async fn chat(&self, query: &str) -> ApiResult<ChatAnswer> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            query: &'a str,
        }
        self.post("/chat", &ChatRequest { query }).await
    }

    async fn list_checklist(&self, category: Option<&str>) -> ApiResult<Vec<ChecklistItem>> {
        self.get("/checklist", category.map(|c| ("category", c)))
            .await
    }

    async fn update_checklist_status(&self, id: &str, status: ChecklistStatus) -> ApiResult<()> {
        self.patch(&format!("/checklist/{id}"), &StatusUpdate { status })
            .await
    }

    async fn delete_checklist_item(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/checklist/{id}")).await
    }

    async fn list_notes(&self) -> ApiResult<Vec<Note>> {
        self.get("/notes", None).await
    }

    async fn create_note(&self, note: &NewNote) -> ApiResult<Note> {
        self.post("/notes", note).await
    }

    async fn delete_note(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/notes/{id}")).await
    }

    async fn upload_document(&self, filename: &str, bytes: Vec<u8>) -> ApiResult<DocumentMeta> {
        debug!(filename, size = bytes.len(), "POST /documents/upload");
        let form = Form::new().part(
            "file",
            Part::bytes(bytes)
                .file_name(filename.to_string())
                .mime_str("application/pdf")?,
        );
        let response = self
            .client
            .post(self.url("/documents/upload"))
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = Self::checked(response).await?;
        Ok(response.json().await?)
    }
}
