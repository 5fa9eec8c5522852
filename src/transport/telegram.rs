//! Bot API client over reqwest

use super::types::{ApiResponse, File, GetFile, GetUpdates, SendMessage, Update};
use super::TransportError;
use crate::runtime::{FileRef, Transport};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Extra time on top of the long-poll timeout before reqwest gives up
const REQUEST_SLACK: Duration = Duration::from_secs(15);

pub struct TelegramClient {
    client: Client,
    /// `<api>/bot<token>`
    method_base: String,
    /// `<api>/file/bot<token>`
    file_base: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(poll_timeout + REQUEST_SLACK)
            .build()
            .map_err(|e| TransportError::unknown(format!("failed to build HTTP client: {e}")))?;
        let api_url = api_url.trim_end_matches('/');
        Ok(Self {
            client,
            method_base: format!("{api_url}/bot{token}"),
            file_base: format!("{api_url}/file/bot{token}"),
            poll_timeout,
        })
    }

    /// Long-poll for updates newer than `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: self.poll_timeout.as_secs(),
                allowed_updates: &["message"],
            },
        )
        .await
    }

    pub async fn get_file(&self, file_id: &str) -> Result<File, TransportError> {
        self.call("getFile", &GetFile { file_id }).await
    }

    async fn call<P, R>(&self, method: &'static str, params: &P) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.method_base))
            .json(params)
            .send()
            .await
            .map_err(|e| TransportError::from_request(method, &e.without_url()))?;
        Self::unpack(method, response).await
    }

    async fn unpack<R: DeserializeOwned>(
        method: &'static str,
        response: reqwest::Response,
    ) -> Result<R, TransportError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            TransportError::network(format!("{method}: failed to read response: {}", e.without_url()))
        })?;

        let envelope: ApiResponse<R> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TransportError::from_status(method, status.as_u16(), &body, None));
            }
            Err(e) => {
                return Err(TransportError::unknown(format!(
                    "{method}: failed to parse response: {e}"
                )));
            }
        };

        if !envelope.ok {
            let code = envelope.error_code.unwrap_or_else(|| status.as_u16());
            let description = envelope.description.unwrap_or_default();
            let retry_after = envelope.parameters.and_then(|p| p.retry_after);
            return Err(TransportError::from_status(method, code, &description, retry_after));
        }
        envelope
            .result
            .ok_or_else(|| TransportError::unknown(format!("{method}: response without result")))
    }

    async fn fetch_file(&self, file_path: &str) -> Result<Vec<u8>, TransportError> {
        const METHOD: &str = "file download";
        let response = self
            .client
            .get(format!("{}/{file_path}", self.file_base))
            .send()
            .await
            .map_err(|e| TransportError::from_request(METHOD, &e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::from_status(
                METHOD,
                status.as_u16(),
                status.canonical_reason().unwrap_or("download failed"),
                None,
            ));
        }
        let bytes = response.bytes().await.map_err(|e| {
            TransportError::network(format!("{METHOD}: failed to read body: {}", e.without_url()))
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.call::<_, IgnoredAny>("sendMessage", &SendMessage { chat_id, text })
            .await
            .map(|_| ())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        path: &Path,
    ) -> Result<(), TransportError> {
        const METHOD: &str = "sendDocument";
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            TransportError::unknown(format!("{METHOD}: failed to open {}: {e}", path.display()))
        })?;
        let length = file
            .metadata()
            .await
            .map_err(|e| {
                TransportError::unknown(format!("{METHOD}: failed to stat {}: {e}", path.display()))
            })?
            .len();
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = Part::stream_with_length(file, length)
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())
            .map_err(|e| TransportError::invalid_request(format!("{METHOD}: {e}")))?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let response = self
            .client
            .post(format!("{}/{METHOD}", self.method_base))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::from_request(METHOD, &e.without_url()))?;
        Self::unpack::<IgnoredAny>(METHOD, response).await.map(|_| ())
    }

    async fn download(&self, file: &FileRef) -> Result<Vec<u8>, TransportError> {
        let info = self.get_file(&file.file_id).await?;
        let path = info.file_path.ok_or_else(|| {
            TransportError::invalid_request(format!("getFile: no file_path for {}", file.file_id))
        })?;
        self.fetch_file(&path).await
    }
}
