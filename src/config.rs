use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use icu_locale::Locale;
use serde::{Deserialize, Serialize};

use crate::error::{LocError, LocResult};

/// Per-project switches that change how files are localized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Wrap every localized string in a `<span x-locid="...">` so it can be traced back to its resource
    #[serde(default)]
    pub identify: bool,
    /// Localize into the pseudo locale with the source text instead of pseudo text
    #[serde(default)]
    pub nopseudo: bool,
    /// Mark strings that have no translation with the debug pseudo transform
    #[serde(default)]
    pub missing_pseudo: bool,
}

/// Project-wide configuration, usually loaded from a `project.json` file.
///
/// # Example
///
/// ```ignore
/// let project = ProjectConfig::new("webapp")
///     .with_source_locale("en-US")
///     .with_target("out");
/// assert!(project.is_source_locale("en-US"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub id: String,
    #[serde(default = "default_source_locale")]
    pub source_locale: String,
    #[serde(default = "default_pseudo_locale")]
    pub pseudo_locale: String,
    /// Directory source files are read from
    #[serde(default = "default_dir")]
    pub root: PathBuf,
    /// Directory localized files are written to
    #[serde(default = "default_dir")]
    pub target: PathBuf,
    /// Locale spec to use in output file names instead of the target locale
    #[serde(default)]
    pub locale_map: HashMap<String, String>,
    #[serde(default)]
    pub settings: Settings,
}

fn default_source_locale() -> String {
    "en-US".to_string()
}

fn default_pseudo_locale() -> String {
    "zxx-XX".to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ProjectConfig {
    pub fn new(id: &str) -> Self {
        ProjectConfig {
            id: id.to_string(),
            source_locale: default_source_locale(),
            pseudo_locale: default_pseudo_locale(),
            root: default_dir(),
            target: default_dir(),
            locale_map: HashMap::new(),
            settings: Settings::default(),
        }
    }

    /// Load a project configuration from a JSON file
    ///
    /// # Errors
    /// - File not found or unreadable
    /// - Invalid JSON or missing `id`
    pub fn from_file(path: &Path) -> LocResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| LocError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LocError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_source_locale(mut self, locale: &str) -> Self {
        self.source_locale = locale.to_string();
        self
    }

    pub fn with_pseudo_locale(mut self, locale: &str) -> Self {
        self.pseudo_locale = locale.to_string();
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_locale_mapping(mut self, locale: &str, mapped: &str) -> Self {
        self.locale_map.insert(locale.to_string(), mapped.to_string());
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn is_source_locale(&self, locale: &str) -> bool {
        locale == self.source_locale
    }

    /// Locale spec used when naming output files for `locale`
    pub fn output_locale<'a>(&'a self, locale: &'a str) -> &'a str {
        self.locale_map
            .get(locale)
            .map(String::as_str)
            .unwrap_or(locale)
    }
}

/// Whether the locale spec carries a variant subtag (e.g. `de-DE-1996`).
///
/// # Errors
/// Returns [`LocError::InvalidLocale`] if the spec does not parse.
pub fn has_variant(locale: &str) -> LocResult<bool> {
    let parsed: Locale = locale
        .parse()
        .map_err(|e| LocError::InvalidLocale(format!("'{}': {}", locale, e)))?;
    Ok(!parsed.id.variants.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let project = ProjectConfig::new("foo");
        assert_eq!(project.source_locale, "en-US");
        assert_eq!(project.pseudo_locale, "zxx-XX");
        assert!(!project.settings.identify);
        assert!(project.is_source_locale("en-US"));
        assert!(!project.is_source_locale("fr-FR"));
    }

    #[test]
    fn test_output_locale_mapping() {
        let project = ProjectConfig::new("foo").with_locale_mapping("fr-FR", "fr");
        assert_eq!(project.output_locale("fr-FR"), "fr");
        assert_eq!(project.output_locale("de-DE"), "de-DE");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "id": "webapp",
                "sourceLocale": "en-GB",
                "target": "out",
                "localeMap": {{ "nb-NO": "no" }},
                "settings": {{ "identify": true }}
            }}"#
        )
        .unwrap();

        let project = ProjectConfig::from_file(file.path()).unwrap();
        assert_eq!(project.id, "webapp");
        assert_eq!(project.source_locale, "en-GB");
        assert_eq!(project.pseudo_locale, "zxx-XX");
        assert_eq!(project.target, PathBuf::from("out"));
        assert_eq!(project.root, PathBuf::from("."));
        assert_eq!(project.output_locale("nb-NO"), "no");
        assert!(project.settings.identify);
        assert!(!project.settings.nopseudo);
    }

    #[test]
    fn test_from_file_errors() {
        let missing = ProjectConfig::from_file(Path::new("/nonexistent/project.json"));
        assert!(matches!(missing, Err(LocError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"sourceLocale\": \"en-US\" }}").unwrap();
        let invalid = ProjectConfig::from_file(file.path());
        assert!(matches!(invalid, Err(LocError::Config { .. })));
    }

    #[test]
    fn test_has_variant() {
        assert!(!has_variant("fr-FR").unwrap());
        assert!(!has_variant("zh-Hans-CN").unwrap());
        assert!(has_variant("de-DE-1996").unwrap());
        assert!(has_variant("not a locale").is_err());
    }
}
