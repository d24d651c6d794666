pub mod cache;
pub mod client;
pub mod interface;
pub mod languages;
pub mod rules;
pub mod service;

pub use cache::TranslationCache;
pub use client::GoogleTranslateClient;
pub use interface::{TranslationProvider, TranslationRequest, TranslationResponse};
pub use languages::SupportedLanguageTable;
pub use rules::TranslationRules;
pub use service::TranslationService;
