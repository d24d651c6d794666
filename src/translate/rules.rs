//! Translation business rules: request validation, cache-key derivation and
//! shaping of provider replies into [`TranslationResponse`]s.
//!
//! Everything here is stateless apart from the read-only language table and
//! configured limits, so one instance is shared by every request.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use sha2::{Digest, Sha256};

use super::interface::{RawProviderResponse, TranslationRequest, TranslationResponse};
use super::languages::{SupportedLanguageTable, AUTO_DETECT};
use crate::config::ProviderConfig;
use crate::error::GatewayError;

/// Length of the encoded digest kept in a cache key.
const CACHE_KEY_HASH_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct TranslationRules {
    languages: Arc<SupportedLanguageTable>,
    max_text_length: usize,
    api_key_configured: bool,
}

impl TranslationRules {
    pub fn new(languages: Arc<SupportedLanguageTable>, provider: &ProviderConfig) -> Self {
        Self {
            languages,
            max_text_length: provider.max_text_length,
            api_key_configured: provider.has_api_key(),
        }
    }

    /// Reject requests that must never reach the cache or the provider.
    ///
    /// Input rules run first; a missing provider credential is reported last
    /// as a configuration fault.
    pub fn validate(&self, request: &TranslationRequest) -> Result<(), GatewayError> {
        if request.text.trim().is_empty() {
            return Err(GatewayError::Validation(
                "Text to translate must not be empty.".to_string(),
            ));
        }

        if request.text.chars().count() > self.max_text_length {
            return Err(GatewayError::Validation(format!(
                "Text must not be longer than {} characters.",
                self.max_text_length
            )));
        }

        if !self.languages.contains(&request.from_language) {
            return Err(GatewayError::Validation(format!(
                "Unsupported source language: {}",
                request.from_language
            )));
        }

        if request.to_language.trim().is_empty() {
            return Err(GatewayError::Validation(
                "Target language is required.".to_string(),
            ));
        }

        if is_auto(&request.to_language) || !self.languages.contains(&request.to_language) {
            return Err(GatewayError::Validation(format!(
                "Unsupported target language: {}",
                request.to_language
            )));
        }

        if !self.api_key_configured {
            return Err(GatewayError::Configuration(
                "Translation provider API key is not configured.".to_string(),
            ));
        }

        Ok(())
    }

    /// Fingerprint of `(text, from, to)` under `prefix`.
    ///
    /// Language codes are trimmed and lower-cased before hashing; the text is
    /// hashed exactly as given.
    pub fn derive_cache_key(request: &TranslationRequest, prefix: &str) -> String {
        let input = format!(
            "{}_{}_{}",
            request.text,
            normalize_code(&request.from_language),
            normalize_code(&request.to_language)
        );
        let digest = Sha256::digest(input.as_bytes());
        let encoded = STANDARD.encode(digest);
        format!("{}{}", prefix, &encoded[..CACHE_KEY_HASH_LEN])
    }

    pub fn build_error_response(message: impl Into<String>) -> TranslationResponse {
        TranslationResponse {
            success: false,
            translated_text: None,
            original_text: None,
            from_language: None,
            to_language: None,
            error: Some(message.into()),
            from_cache: false,
            timestamp: Utc::now(),
        }
    }

    /// Shape the first provider translation into a successful response.
    pub fn normalize_provider_response(
        raw: &RawProviderResponse,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, GatewayError> {
        let first = raw.translations().first().ok_or_else(|| {
            GatewayError::ExternalProvider("provider returned no translations".to_string())
        })?;

        let translated_text = first.translated_text.clone().ok_or_else(|| {
            GatewayError::ExternalProvider("provider translation has no text".to_string())
        })?;

        // Codes are reported in the same folded form the cache key uses, so a
        // cached reply reads the same for every casing of the request.
        let from_language = first
            .detected_source_language
            .as_deref()
            .map(normalize_code)
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| normalize_code(&request.from_language));

        Ok(TranslationResponse {
            success: true,
            translated_text: Some(translated_text),
            original_text: Some(request.text.clone()),
            from_language: Some(from_language),
            to_language: Some(normalize_code(&request.to_language)),
            error: None,
            from_cache: false,
            timestamp: Utc::now(),
        })
    }

    pub fn list_supported_languages(&self) -> Vec<String> {
        self.languages.describe()
    }
}

pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

pub(crate) fn is_auto(code: &str) -> bool {
    normalize_code(code) == AUTO_DETECT
}
