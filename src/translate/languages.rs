/// Sentinel source language asking the provider to detect the language.
pub const AUTO_DETECT: &str = "auto";

const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    (AUTO_DETECT, "Otomatik Algıla"),
    ("tr", "Türkçe"),
    ("en", "İngilizce"),
    ("de", "Almanca"),
    ("fr", "Fransızca"),
    ("es", "İspanyolca"),
    ("it", "İtalyanca"),
];

/// Fixed, ordered mapping from language code to display name.
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct SupportedLanguageTable {
    entries: Vec<(String, String)>,
}

impl SupportedLanguageTable {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(code, name)| (code.to_lowercase(), name))
                .collect(),
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, code: &str) -> bool {
        let code = code.trim().to_lowercase();
        self.entries.iter().any(|(c, _)| *c == code)
    }

    /// `"code: displayName"` per entry, in table order.
    pub fn describe(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(code, name)| format!("{}: {}", code, name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for SupportedLanguageTable {
    fn default() -> Self {
        Self::new(
            SUPPORTED_LANGUAGES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_order_and_format() {
        let table = SupportedLanguageTable::default();
        let described = table.describe();
        assert_eq!(table.len(), 7);
        assert_eq!(described[0], "auto: Otomatik Algıla");
        assert_eq!(described[1], "tr: Türkçe");
        assert_eq!(described[6], "it: İtalyanca");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = SupportedLanguageTable::default();
        assert!(table.contains("EN"));
        assert!(table.contains(" De "));
        assert!(!table.contains("xx"));
    }
}
