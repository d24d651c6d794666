use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::interface::{ProviderReply, RawProviderResponse, TranslationProvider, TranslationRequest};
use super::rules::{is_auto, normalize_code};
use crate::config::ProviderConfig;
use crate::error::GatewayError;

/// Outbound body for the Google Translate v2 `translate` endpoint.
#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    target: String,
    format: &'static str,
}

impl<'a> TranslateBody<'a> {
    fn from_request(request: &'a TranslationRequest) -> Self {
        Self {
            q: &request.text,
            source: (!is_auto(&request.from_language))
                .then(|| normalize_code(&request.from_language)),
            target: normalize_code(&request.to_language),
            format: "text",
        }
    }
}

/// HTTP client for a Google Translate v2 compatible provider.
#[derive(Debug, Clone)]
pub struct GoogleTranslateClient {
    client: Client,
    base_url: String,
    max_retry_attempts: u32,
}

impl GoogleTranslateClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_retry_attempts: config.max_retry_attempts,
        })
    }

    /// Send the request, retrying only when the connection itself failed.
    ///
    /// Timeouts and HTTP status replies are returned to the caller as-is.
    async fn send_with_retry(
        &self,
        body: &TranslateBody<'_>,
        api_key: &str,
    ) -> Result<reqwest::Response, GatewayError> {
        let mut attempt: u32 = 0;
        loop {
            let result = self
                .client
                .post(&self.base_url)
                .query(&[("key", api_key)])
                .json(body)
                .send()
                .await;

            match result {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_connect() && attempt < self.max_retry_attempts => {
                    let wait = Duration::from_millis(200 * (1u64 << attempt.min(6)));
                    warn!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "Provider connection failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslateClient {
    async fn call(
        &self,
        request: &TranslationRequest,
        api_key: &str,
    ) -> Result<ProviderReply, GatewayError> {
        let body = TranslateBody::from_request(request);
        debug!(
            "Calling translation provider: {} -> {}",
            body.source.as_deref().unwrap_or("auto"),
            body.target
        );

        let response = self.send_with_retry(&body, api_key).await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                "Translation provider error: {}", error_body
            );
            return Ok(ProviderReply::Failed {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let raw = RawProviderResponse::parse(&text).map_err(|e| {
            GatewayError::ExternalProvider(format!("invalid provider response body: {}", e))
        })?;
        Ok(ProviderReply::Success(raw))
    }

    fn name(&self) -> &'static str {
        "google-translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const PATH: &str = "/language/translate/v2";

    fn client_for(base_url: String, timeout_seconds: u64, max_retry_attempts: u32) -> GoogleTranslateClient {
        GoogleTranslateClient::new(&ProviderConfig {
            api_key: "test-key".to_string(),
            base_url,
            timeout_seconds,
            max_retry_attempts,
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sends_expected_body_and_parses_reply() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::Json(json!({
                "q": "hallo",
                "source": "de",
                "target": "en",
                "format": "text"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"translations":[{"translatedText":"hello"}]}}"#)
            .create_async()
            .await;

        let client = client_for(format!("{}{}", server.url(), PATH), 5, 0);
        let reply = client
            .call(&TranslationRequest::new("hallo", "DE", "en"), "test-key")
            .await
            .unwrap();

        mock.assert_async().await;
        match reply {
            ProviderReply::Success(raw) => {
                assert_eq!(raw.translations()[0].translated_text.as_deref(), Some("hello"));
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn auto_source_is_omitted() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "q": "hello",
                "target": "tr",
                "format": "text"
            })))
            .with_status(200)
            .with_body(
                r#"{"data":{"translations":[{"translatedText":"merhaba","detectedSourceLanguage":"en"}]}}"#,
            )
            .create_async()
            .await;

        let client = client_for(format!("{}{}", server.url(), PATH), 5, 0);
        let reply = client
            .call(&TranslationRequest::new("hello", "auto", "tr"), "test-key")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(matches!(reply, ProviderReply::Success(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_a_reply_not_an_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"error":{"message":"internal secret detail"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(format!("{}{}", server.url(), PATH), 5, 3);
        let reply = client
            .call(&TranslationRequest::new("hello", "auto", "tr"), "test-key")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, ProviderReply::Failed { status: 500 });
    }

    #[tokio::test]
    async fn unparseable_body_is_an_external_provider_fault() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = client_for(format!("{}{}", server.url(), PATH), 5, 0);
        let err = client
            .call(&TranslationRequest::new("hello", "auto", "tr"), "test-key")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ExternalProvider(_)));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_network_fault() {
        // Nothing listens on port 1.
        let client = client_for("http://127.0.0.1:1/translate".to_string(), 5, 1);
        let err = client
            .call(&TranslationRequest::new("hello", "auto", "tr"), "test-key")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[tokio::test]
    async fn slow_provider_is_a_timeout() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(br#"{"data":{"translations":[]}}"#)
            })
            .create_async()
            .await;

        let client = client_for(format!("{}{}", server.url(), PATH), 1, 0);
        let err = client
            .call(&TranslationRequest::new("hello", "auto", "tr"), "test-key")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)), "got {:?}", err);
    }
}
