//! HTTP implementation of [`OverlayStore`] using [`reqwest`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;

use streamlay_common::config::ApiConfig;
use streamlay_common::error::{StreamlayError, StreamlayResult};
use streamlay_overlay_model::{
    HealthStatus, Overlay, OverlayDraft, OverlayId, SettingsResponse, StreamSettings,
    StreamStarted, StreamStatus,
};

use crate::OverlayStore;

/// Store client talking to the overlay API over HTTP JSON.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: Url,
}

/// `POST /overlays` answers with either the stored record or an id acknowledgement.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreateResponse {
    Stored(Overlay),
    Ack { id: OverlayId },
}

/// `PUT /overlays/{id}` answers with either the stored record or a bare message.
#[derive(Deserialize)]
#[serde(untagged)]
enum UpdateResponse {
    Stored(Overlay),
    Ack(IgnoredAny),
}

/// `POST /stream/settings` answers `{success}` or just `{message}`.
#[derive(Deserialize)]
struct SaveAck {
    #[serde(default = "saved")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl Default for SaveAck {
    fn default() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
        }
    }
}

fn saved() -> bool {
    true
}

impl HttpStore {
    /// Create a client for the API rooted at `base_url` (e.g. `http://host:5000/api`).
    pub fn new(base_url: &str) -> StreamlayResult<Self> {
        Self::build(base_url, None)
    }

    /// Create a client from the API section of the app config.
    pub fn from_config(config: &ApiConfig) -> StreamlayResult<Self> {
        Self::build(&config.base_url, config.timeout_secs.map(Duration::from_secs))
    }

    /// The API root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> StreamlayResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StreamlayError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Join path segments onto the API root, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.endpoint(segments))
    }

    /// Send a request and insist on a 2xx answer.
    async fn send(&self, label: &str, request: RequestBuilder) -> StreamlayResult<Response> {
        tracing::debug!(request = label, "Sending API request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(request = label, error = %e, "API request failed");
            StreamlayError::network(format!("{label} failed"), e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(request = label, status = status.as_u16(), "API returned error status");
            return Err(StreamlayError::api(status.as_u16(), error_message(&body)));
        }
        Ok(response)
    }

    /// Send a request and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        label: &str,
        request: RequestBuilder,
    ) -> StreamlayResult<T> {
        let body = self.fetch_text(label, request).await?;
        decode(label, &body)
    }

    /// Send a request and decode the JSON body, treating an empty body as the default value.
    async fn fetch_or_default<T: DeserializeOwned + Default>(
        &self,
        label: &str,
        request: RequestBuilder,
    ) -> StreamlayResult<T> {
        let body = self.fetch_text(label, request).await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        decode(label, &body)
    }

    async fn fetch_text(&self, label: &str, request: RequestBuilder) -> StreamlayResult<String> {
        let response = self.send(label, request).await?;
        response
            .text()
            .await
            .map_err(|e| StreamlayError::network(format!("{label}: failed to read body"), e))
    }
}

#[async_trait::async_trait]
impl OverlayStore for HttpStore {
    async fn list_overlays(&self) -> StreamlayResult<Vec<Overlay>> {
        self.fetch("GET /overlays", self.request(Method::GET, &["overlays"]))
            .await
    }

    async fn get_overlay(&self, id: &OverlayId) -> StreamlayResult<Overlay> {
        self.fetch(
            "GET /overlays/{id}",
            self.request(Method::GET, &["overlays", id.as_str()]),
        )
        .await
    }

    async fn create_overlay(&self, draft: &OverlayDraft) -> StreamlayResult<Overlay> {
        let response: CreateResponse = self
            .fetch(
                "POST /overlays",
                self.request(Method::POST, &["overlays"]).json(draft),
            )
            .await?;

        let overlay = match response {
            CreateResponse::Stored(overlay) => overlay,
            CreateResponse::Ack { id } => Overlay::from_draft(id, draft.clone()),
        };
        tracing::info!(id = %overlay.id, name = %overlay.name, "Overlay created");
        Ok(overlay)
    }

    async fn update_overlay(
        &self,
        id: &OverlayId,
        draft: &OverlayDraft,
    ) -> StreamlayResult<Overlay> {
        let label = "PUT /overlays/{id}";
        let body = self
            .fetch_text(
                label,
                self.request(Method::PUT, &["overlays", id.as_str()])
                    .json(draft),
            )
            .await?;
        let response = if body.trim().is_empty() {
            UpdateResponse::Ack(IgnoredAny)
        } else {
            decode(label, &body)?
        };

        let overlay = match response {
            UpdateResponse::Stored(overlay) => overlay,
            UpdateResponse::Ack(_) => Overlay::from_draft(id.clone(), draft.clone()),
        };
        tracing::info!(id = %overlay.id, "Overlay updated");
        Ok(overlay)
    }

    async fn delete_overlay(&self, id: &OverlayId) -> StreamlayResult<()> {
        self.send(
            "DELETE /overlays/{id}",
            self.request(Method::DELETE, &["overlays", id.as_str()]),
        )
        .await?;
        tracing::info!(%id, "Overlay deleted");
        Ok(())
    }

    async fn get_stream_settings(&self) -> StreamlayResult<StreamSettings> {
        let response: SettingsResponse = self
            .fetch(
                "GET /stream/settings",
                self.request(Method::GET, &["stream", "settings"]),
            )
            .await?;
        Ok(response.into_settings())
    }

    async fn save_stream_settings(
        &self,
        settings: &StreamSettings,
    ) -> StreamlayResult<StreamSettings> {
        let label = "POST /stream/settings";
        let response = self
            .send(
                label,
                self.request(Method::POST, &["stream", "settings"])
                    .json(settings),
            )
            .await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| StreamlayError::network(format!("{label}: failed to read body"), e))?;

        let ack: SaveAck = if body.trim().is_empty() {
            SaveAck::default()
        } else {
            decode(label, &body)?
        };
        if !ack.success {
            tracing::warn!(status, "Server refused stream settings");
            let message = ack
                .error
                .or(ack.message)
                .unwrap_or_else(|| "Stream settings were not saved".to_string());
            return Err(StreamlayError::api(status, message));
        }
        tracing::info!(rtsp_url = %settings.rtsp_url, "Stream settings saved");
        Ok(settings.clone())
    }

    async fn start_stream(&self, rtsp_url: &str) -> StreamlayResult<StreamStarted> {
        self.fetch_or_default(
            "POST /stream/start",
            self.request(Method::POST, &["stream", "start"])
                .json(&serde_json::json!({ "rtsp_url": rtsp_url })),
        )
        .await
    }

    async fn stop_stream(&self) -> StreamlayResult<()> {
        self.send(
            "POST /stream/stop",
            self.request(Method::POST, &["stream", "stop"]),
        )
        .await?;
        Ok(())
    }

    async fn stream_status(&self) -> StreamlayResult<StreamStatus> {
        self.fetch(
            "GET /stream/status",
            self.request(Method::GET, &["stream", "status"]),
        )
        .await
    }

    async fn health(&self) -> StreamlayResult<HealthStatus> {
        self.fetch("GET /health", self.request(Method::GET, &["health"]))
            .await
    }
}

fn parse_base_url(base_url: &str) -> StreamlayResult<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| StreamlayError::config(format!("Invalid API base URL {base_url:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(StreamlayError::config(format!(
            "API base URL {base_url:?} cannot carry a path"
        )));
    }
    Ok(url)
}

fn decode<T: DeserializeOwned>(label: &str, body: &str) -> StreamlayResult<T> {
    serde_json::from_str(body)
        .map_err(|e| StreamlayError::network(format!("{label}: malformed response body"), e))
}

/// Pull the `error` field out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamlay_common::error::ErrorKind;
    use streamlay_overlay_model::{OverlayKind, Position, Size};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one connection, answer with a canned response, and hand back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if request_complete(&buf) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{addr}/api"), handle)
    }

    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        buf.len() >= header_end + 4 + content_length
    }

    fn logo_draft() -> OverlayDraft {
        OverlayDraft {
            name: "Logo".to_string(),
            kind: OverlayKind::Image,
            content: "https://x/y.png".to_string(),
            position: Position::new(10, 10),
            size: Size::new(100, 40),
        }
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let store = HttpStore::new("http://localhost:5000/api/").unwrap();
        assert_eq!(
            store.endpoint(&["overlays", "a b"]).as_str(),
            "http://localhost:5000/api/overlays/a%20b"
        );
        let store = HttpStore::new("http://localhost:5000/api").unwrap();
        assert_eq!(
            store.endpoint(&["stream", "settings"]).as_str(),
            "http://localhost:5000/api/stream/settings"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        assert!(matches!(
            HttpStore::new("not a url"),
            Err(StreamlayError::Config { .. })
        ));
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        assert_eq!(error_message(r#"{"error": "Overlay not found"}"#), "Overlay not found");
        assert_eq!(error_message("gateway down\n"), "gateway down");
    }

    #[tokio::test]
    async fn test_list_overlays_decodes_body_and_sends_json_header() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id":"1","name":"Logo","type":"image","content":"https://x/y.png","position":{"x":10,"y":10},"size":{"width":100,"height":40}}]"#,
        )
        .await;

        let store = HttpStore::new(&base).unwrap();
        let overlays = store.list_overlays().await.unwrap();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].draft(), logo_draft());

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /api/overlays http/1.1"));
        assert!(request.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn test_create_merges_id_ack_with_draft() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"id": "65a1f0c2", "message": "Overlay created successfully"}"#,
        )
        .await;

        let store = HttpStore::new(&base).unwrap();
        let overlay = store.create_overlay(&logo_draft()).await.unwrap();
        assert_eq!(overlay.id.as_str(), "65a1f0c2");
        assert_eq!(overlay.draft(), logo_draft());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/overlays HTTP/1.1"));
        assert!(request.contains(r#""type":"image""#));
    }

    #[tokio::test]
    async fn test_update_with_message_ack_rebuilds_overlay() {
        let (base, server) =
            serve_once("200 OK", r#"{"message": "Overlay updated successfully"}"#).await;

        let store = HttpStore::new(&base).unwrap();
        let mut draft = logo_draft();
        draft.position.x = 99;
        let overlay = store
            .update_overlay(&OverlayId::from("1"), &draft)
            .await
            .unwrap();
        assert_eq!(overlay.id.as_str(), "1");
        assert_eq!(overlay.position.x, 99);

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /api/overlays/1 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let (base, server) =
            serve_once("404 Not Found", r#"{"error": "Overlay not found"}"#).await;

        let store = HttpStore::new(&base).unwrap();
        let err = store
            .delete_overlay(&OverlayId::from("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Overlay not found"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_bare_settings_response_is_accepted() {
        let (base, server) = serve_once("200 OK", r#"{"rtsp_url": "rtsp://cam/1"}"#).await;

        let store = HttpStore::new(&base).unwrap();
        let settings = store.get_stream_settings().await.unwrap();
        assert_eq!(settings.rtsp_url, "rtsp://cam/1");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_save_settings_refused_by_server_is_api_error() {
        let (base, server) = serve_once("200 OK", r#"{"success": false}"#).await;

        let store = HttpStore::new(&base).unwrap();
        let err = store
            .save_stream_settings(&StreamSettings::new("rtsp://cam/1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.status(), Some(200));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/stream/settings HTTP/1.1"));
        assert!(request.contains(r#""rtsp_url":"rtsp://cam/1""#));
    }

    #[tokio::test]
    async fn test_save_settings_accepts_message_ack() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"message": "Stream settings saved successfully"}"#,
        )
        .await;

        let store = HttpStore::new(&base).unwrap();
        let saved = store
            .save_stream_settings(&StreamSettings::new("rtsp://cam/1"))
            .await
            .unwrap();
        assert_eq!(saved.rtsp_url, "rtsp://cam/1");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error_with_cause() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = HttpStore::new(&format!("http://{addr}/api")).unwrap();
        let err = store.health().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(std::error::Error::source(&err).is_some());
    }
}
