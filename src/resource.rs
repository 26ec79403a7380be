use serde::{Deserialize, Serialize};

use crate::text::clean_string;

/// A single translatable unit: a source string and, optionally, its translation
/// into one target locale.
///
/// Two resources with the same [`ResourceString::hash_key`] are the same unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceString {
    pub project: String,
    pub source_locale: String,
    pub key: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default = "default_datatype")]
    pub datatype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(default)]
    pub auto_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

fn default_datatype() -> String {
    "plaintext".to_string()
}

impl ResourceString {
    pub fn new(project: &str, source_locale: &str, key: &str, source: &str) -> Self {
        ResourceString {
            project: project.to_string(),
            source_locale: source_locale.to_string(),
            key: key.to_string(),
            source: source.to_string(),
            target_locale: None,
            target: None,
            datatype: default_datatype(),
            comment: None,
            context: None,
            index: None,
            path_name: None,
            line_number: None,
            auto_key: false,
            state: None,
        }
    }

    pub fn with_target(mut self, locale: &str, target: &str) -> Self {
        self.target_locale = Some(locale.to_string());
        self.target = Some(target.to_string());
        self
    }

    pub fn with_datatype(mut self, datatype: &str) -> Self {
        self.datatype = datatype.to_string();
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    pub fn with_location(mut self, path_name: &str, line_number: usize) -> Self {
        self.path_name = Some(path_name.to_string());
        self.line_number = Some(line_number);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_auto_key(mut self, auto_key: bool) -> Self {
        self.auto_key = auto_key;
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    /// The locale this resource belongs to: its target locale if it is a
    /// translation, otherwise its source locale.
    pub fn locale(&self) -> &str {
        self.target_locale.as_deref().unwrap_or(&self.source_locale)
    }

    /// Build the lookup key of a resource from its parts.
    ///
    /// # Example
    /// ```ignore
    /// let key = ResourceString::hash_key_for("foo", "fr-FR", "r654479252", "html");
    /// assert_eq!(key, "rs_foo_fr-FR_r654479252_html");
    /// ```
    pub fn hash_key_for(project: &str, locale: &str, key: &str, datatype: &str) -> String {
        format!("rs_{}_{}_{}_{}", project, locale, key, datatype)
    }

    /// Same as [`ResourceString::hash_key_for`] but normalizes the key first, so
    /// keys differing only in whitespace or escaping find each other.
    pub fn clean_hash_key_for(project: &str, locale: &str, key: &str, datatype: &str) -> String {
        Self::hash_key_for(project, locale, &clean_string(key), datatype)
    }

    pub fn hash_key(&self) -> String {
        Self::hash_key_for(&self.project, self.locale(), &self.key, &self.datatype)
    }

    pub fn clean_hash_key(&self) -> String {
        Self::clean_hash_key_for(&self.project, self.locale(), &self.key, &self.datatype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_key_uses_source_locale_without_target() {
        let res = ResourceString::new("foo", "en-US", "r654479252", "This is a test")
            .with_datatype("html");
        assert_eq!(res.hash_key(), "rs_foo_en-US_r654479252_html");
    }

    #[test]
    fn test_hash_key_uses_target_locale() {
        let res = ResourceString::new("foo", "en-US", "r654479252", "This is a test")
            .with_target("fr-FR", "Ceci est un essai")
            .with_datatype("html");
        assert_eq!(res.hash_key(), "rs_foo_fr-FR_r654479252_html");
        assert_eq!(res.locale(), "fr-FR");
    }

    #[test]
    fn test_clean_hash_key_normalizes_key() {
        assert_eq!(
            ResourceString::clean_hash_key_for("foo", "de-DE", "  a \n key ", "html"),
            "rs_foo_de-DE_a key_html"
        );
    }

    #[test]
    fn test_serde_camel_case() {
        let res = ResourceString::new("foo", "en-US", "r1", "One")
            .with_target("de-DE", "Eins")
            .with_auto_key(true);
        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains("\"sourceLocale\":\"en-US\""));
        assert!(json.contains("\"targetLocale\":\"de-DE\""));
        assert!(json.contains("\"autoKey\":true"));
        assert!(!json.contains("pathName"));

        let back: ResourceString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, res);
    }
}
