use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

fn default_from_language() -> String {
    "auto".to_string()
}

/// Inbound translation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_from_language")]
    pub from_language: String,
    #[serde(default)]
    pub to_language: String,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        from_language: impl Into<String>,
        to_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            from_language: from_language.into(),
            to_language: to_language.into(),
        }
    }

    /// First 50 characters of the text, for log lines.
    pub fn preview(&self) -> String {
        self.text.chars().take(50).collect()
    }
}

/// Result of one translation, successful or not.
///
/// `success == true` implies `translated_text` and `original_text` are set and
/// `error` is absent; `success == false` implies `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub from_cache: bool,
    pub timestamp: DateTime<Utc>,
}

/// Body of a successful provider reply (`{data: {translations: [...]}}`).
///
/// Field names are matched case-insensitively; see [`RawProviderResponse::parse`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProviderResponse {
    #[serde(default)]
    pub data: Option<ProviderData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderData {
    #[serde(default)]
    pub translations: Option<Vec<ProviderTranslation>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderTranslation {
    #[serde(rename = "translatedtext", default)]
    pub translated_text: Option<String>,
    #[serde(rename = "detectedsourcelanguage", default)]
    pub detected_source_language: Option<String>,
}

impl RawProviderResponse {
    /// Parse a provider body, ignoring the casing of every field name.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        serde_json::from_value(lowercase_keys(value))
    }

    pub fn translations(&self) -> &[ProviderTranslation] {
        self.data
            .as_ref()
            .and_then(|d| d.translations.as_deref())
            .unwrap_or(&[])
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// What came back from the provider when the HTTP exchange itself completed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    Success(RawProviderResponse),
    /// Non-success HTTP status. The body is logged by the client, never forwarded.
    Failed { status: u16 },
}

/// Outbound translation provider.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Forward the request to the provider.
    ///
    /// A non-success HTTP status is returned as [`ProviderReply::Failed`];
    /// connection failures and timeouts are errors.
    async fn call(
        &self,
        request: &TranslationRequest,
        api_key: &str,
    ) -> Result<ProviderReply, GatewayError>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_source_to_auto() {
        let req: TranslationRequest = serde_json::from_str(r#"{"text":"hi","toLanguage":"tr"}"#).unwrap();
        assert_eq!(req.from_language, "auto");
        assert_eq!(req.to_language, "tr");

        let req: TranslationRequest = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(req.to_language, "");
    }

    #[test]
    fn provider_body_parsing_ignores_casing() {
        let body = r#"{"Data":{"Translations":[{"TranslatedText":"merhaba","DETECTEDSOURCELANGUAGE":"en"}]}}"#;
        let raw = RawProviderResponse::parse(body).unwrap();
        let first = &raw.translations()[0];
        assert_eq!(first.translated_text.as_deref(), Some("merhaba"));
        assert_eq!(first.detected_source_language.as_deref(), Some("en"));
    }

    #[test]
    fn missing_data_yields_no_translations() {
        let raw = RawProviderResponse::parse(r#"{"data":null}"#).unwrap();
        assert!(raw.translations().is_empty());
        let raw = RawProviderResponse::parse(r#"{"data":{"translations":null}}"#).unwrap();
        assert!(raw.translations().is_empty());
        let raw = RawProviderResponse::parse("{}").unwrap();
        assert!(raw.translations().is_empty());
    }

    #[test]
    fn preview_is_char_bounded() {
        let req = TranslationRequest::new("ç".repeat(80), "auto", "en");
        assert_eq!(req.preview().chars().count(), 50);
    }
}
