//! CSV header mapping and dialect configuration.

use crate::source::DEFAULT_ALIASES;
use std::collections::HashMap;

/// Configuration for CSV parsing with custom header mappings.
///
/// Column headers are resolved to canonical field names through case-insensitive
/// aliases. The defaults cover the publication, clinical-trial and drug exports:
/// - "id" → ["id", "atccode", "article_id"]
/// - "title" → ["title", "scientific_title", "article title"]
/// - "name" → ["drug", "name", "drug name"]
///   etc.
///
/// # Examples
///
/// ```
/// use druglink::csv::CsvConfig;
///
/// let mut config = CsvConfig::new();
/// config.add_header_aliases("title", vec!["headline".to_string()]);
/// config.set_delimiter(b';');
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Header aliases per canonical field
    pub(crate) header_map: HashMap<String, Vec<String>>,
    /// Reverse lookup map for O(1) header-to-field mapping
    pub(crate) reverse_map: HashMap<String, String>,
    pub(crate) delimiter: u8,
    pub(crate) quote: u8,
    /// Whether to trim whitespace around fields
    pub(crate) trim: bool,
    /// Accept rows with a field count different from the header
    pub(crate) flexible: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvConfig {
    /// Creates a new CSV configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        let mut config = Self {
            header_map: HashMap::new(),
            reverse_map: HashMap::new(),
            delimiter: b',',
            quote: b'"',
            trim: true,
            flexible: false,
        };
        config.set_default_headers();
        config
    }

    fn set_default_headers(&mut self) {
        for (field, aliases) in DEFAULT_ALIASES {
            self.header_map.insert(
                field.to_string(),
                aliases.iter().map(|s| s.to_string()).collect(),
            );
        }
        self.rebuild_reverse_map();
    }

    fn rebuild_reverse_map(&mut self) {
        self.reverse_map.clear();
        for (field, aliases) in &self.header_map {
            for alias in aliases {
                self.reverse_map.insert(alias.to_lowercase(), field.clone());
            }
        }
    }

    /// Replaces the aliases of a field
    pub fn set_header_mapping(&mut self, field: &str, aliases: Vec<String>) -> &mut Self {
        self.header_map.insert(field.to_string(), aliases);
        self.rebuild_reverse_map();
        self
    }

    /// Adds aliases to an existing field mapping
    pub fn add_header_aliases(&mut self, field: &str, aliases: Vec<String>) -> &mut Self {
        self.header_map
            .entry(field.to_string())
            .or_default()
            .extend(aliases);
        self.rebuild_reverse_map();
        self
    }

    pub fn set_delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn set_quote(&mut self, quote: u8) -> &mut Self {
        self.quote = quote;
        self
    }

    pub fn set_trim(&mut self, trim: bool) -> &mut Self {
        self.trim = trim;
        self
    }

    pub fn set_flexible(&mut self, flexible: bool) -> &mut Self {
        self.flexible = flexible;
        self
    }

    /// Finds the canonical field for a header
    pub(crate) fn get_field_for_header(&self, header: &str) -> Option<&str> {
        let header_lower = header.trim().to_lowercase();
        self.reverse_map.get(&header_lower).map(|s| s.as_str())
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.header_map.is_empty() {
            return Err("No header mappings defined".to_string());
        }

        for (field, aliases) in &self.header_map {
            if field.is_empty() {
                return Err("Empty field name found in mappings".to_string());
            }
            if aliases.is_empty() {
                return Err(format!("Field '{}' has no aliases defined", field));
            }
            if aliases.iter().any(|alias| alias.is_empty()) {
                return Err(format!("Empty alias found for field '{}'", field));
            }
        }

        if self.delimiter == b'\n' || self.delimiter == b'\r' {
            return Err("Delimiter cannot be a newline character".to_string());
        }
        if self.delimiter == self.quote {
            return Err("Delimiter and quote must differ".to_string());
        }

        let mut all_aliases = HashMap::new();
        for (field, aliases) in &self.header_map {
            for alias in aliases {
                let alias_lower = alias.to_lowercase();
                if let Some(existing_field) = all_aliases.get(&alias_lower)
                    && existing_field != field
                {
                    return Err(format!(
                        "Alias '{}' is mapped to both '{}' and '{}'",
                        alias, existing_field, field
                    ));
                }
                all_aliases.insert(alias_lower, field.clone());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = CsvConfig::new();
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.header_map.len(), DEFAULT_ALIASES.len());
    }

    #[test]
    fn test_default_aliases() {
        let config = CsvConfig::new();
        assert_eq!(config.get_field_for_header("atccode"), Some("id"));
        assert_eq!(config.get_field_for_header("scientific_title"), Some("title"));
        assert_eq!(config.get_field_for_header("drug"), Some("name"));
        assert_eq!(config.get_field_for_header("abstract"), None);
    }

    #[test]
    fn test_set_header_mapping() {
        let mut config = CsvConfig::new();
        config.set_header_mapping("title", vec!["my_title".to_string()]);

        assert_eq!(config.get_field_for_header("my_title"), Some("title"));
        assert_eq!(config.get_field_for_header("scientific_title"), None);
    }

    #[test]
    fn test_add_header_aliases() {
        let mut config = CsvConfig::new();
        config.add_header_aliases("journal", vec!["source".to_string()]);

        assert_eq!(config.get_field_for_header("journal"), Some("journal"));
        assert_eq!(config.get_field_for_header("Source"), Some("journal"));
    }

    #[test]
    fn test_get_field_for_header_case_insensitive() {
        let config = CsvConfig::new();

        assert_eq!(config.get_field_for_header("ATCCODE"), Some("id"));
        assert_eq!(config.get_field_for_header(" Journal "), Some("journal"));
    }

    #[test]
    fn test_validate_success() {
        assert!(CsvConfig::new().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_mappings() {
        let mut config = CsvConfig::new();
        config.header_map.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_aliases() {
        let mut config = CsvConfig::new();
        config.add_header_aliases("journal", vec!["Title".to_string()]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_alias() {
        let mut config = CsvConfig::new();
        config.set_header_mapping("field", vec!["".to_string()]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_dialect() {
        let mut config = CsvConfig::new();
        config.set_delimiter(b'\n');
        assert!(config.validate().is_err());

        config.set_delimiter(b'"');
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_chaining() {
        let mut config = CsvConfig::new();
        config
            .set_delimiter(b';')
            .set_quote(b'\'')
            .set_trim(false)
            .set_flexible(true);

        assert_eq!(config.delimiter, b';');
        assert_eq!(config.quote, b'\'');
        assert!(!config.trim);
        assert!(config.flexible);
    }
}
