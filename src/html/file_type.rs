use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ProjectConfig;
use crate::html::file::HtmlFile;
use crate::pseudo::{DebugPseudo, PseudoTransform};
use crate::translation_set::SharedTranslationSet;

static LOCALIZED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.([a-z][a-z](-[A-Z][a-z][a-z][a-z])?(-[A-Z][A-Z](-[A-Z]+)?)?)\.html?$")
        .expect("valid localized file name pattern")
});

/// Shared state for all HTML files of one project: the project settings, the
/// pseudo transforms per locale, and the collector of strings found without a
/// translation while localizing.
#[derive(Debug)]
pub struct HtmlFileType {
    project: ProjectConfig,
    pseudos: HashMap<String, Box<dyn PseudoTransform>>,
    missing_pseudo: Option<Box<dyn PseudoTransform>>,
    new_resources: SharedTranslationSet,
}

impl HtmlFileType {
    pub const NAME: &'static str = "HTML File Type";
    pub const EXTENSIONS: [&'static str; 2] = [".html", ".htm"];

    /// The project's pseudo locale gets the debug transform. With the
    /// `missingPseudo` setting, untranslated strings get it too.
    pub fn new(project: ProjectConfig) -> Self {
        let mut pseudos: HashMap<String, Box<dyn PseudoTransform>> = HashMap::new();
        pseudos.insert(
            project.pseudo_locale.clone(),
            Box::new(DebugPseudo::new(&project.source_locale)),
        );
        let missing_pseudo = project
            .settings
            .missing_pseudo
            .then(|| Box::new(DebugPseudo::new(&project.source_locale)) as Box<dyn PseudoTransform>);
        let new_resources = SharedTranslationSet::new(&project.source_locale);
        HtmlFileType {
            project,
            pseudos,
            missing_pseudo,
            new_resources,
        }
    }

    /// Use `pseudo` for every string localized into `locale`
    pub fn with_pseudo(mut self, locale: &str, pseudo: Box<dyn PseudoTransform>) -> Self {
        self.pseudos.insert(locale.to_string(), pseudo);
        self
    }

    pub fn with_missing_pseudo(mut self, pseudo: Box<dyn PseudoTransform>) -> Self {
        self.missing_pseudo = Some(pseudo);
        self
    }

    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    pub fn pseudo(&self, locale: &str) -> Option<&dyn PseudoTransform> {
        self.pseudos.get(locale).map(|pseudo| pseudo.as_ref())
    }

    pub fn missing_pseudo(&self) -> Option<&dyn PseudoTransform> {
        self.missing_pseudo.as_deref()
    }

    /// Strings without a translation met while localizing, with the source
    /// text as their target
    pub fn new_resources(&self) -> &SharedTranslationSet {
        &self.new_resources
    }

    /// Whether the path names an HTML file in the source locale.
    ///
    /// A file already carrying a locale in its name (`foo.fr-FR.html`) is a
    /// localized output and is only handled if that locale is the source
    /// locale.
    pub fn handles(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        if !Self::EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return false;
        }
        match LOCALIZED_NAME.captures(path) {
            Some(captures) => self.project.is_source_locale(&captures[1]),
            None => true,
        }
    }

    pub fn new_file(&self, path: &str) -> HtmlFile<'_> {
        HtmlFile::new(self, path)
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn file_type() -> HtmlFileType {
        HtmlFileType::new(ProjectConfig::new("foo"))
    }

    #[test]
    fn test_handles_html_extensions() {
        let file_type = file_type();
        assert!(file_type.handles("foo.html"));
        assert!(file_type.handles("foo.htm"));
        assert!(file_type.handles("a/b/c/foo.HTML"));
        assert!(!file_type.handles("foo.js"));
        assert!(!file_type.handles("foohtml"));
    }

    #[test]
    fn test_handles_skips_localized_files() {
        let file_type = file_type();
        assert!(file_type.handles("foo.en-US.html"));
        assert!(!file_type.handles("foo.fr-FR.html"));
        assert!(!file_type.handles("foo.zh-Hans-CN.html"));
        assert!(!file_type.handles("foo.de.htm"));
        assert!(file_type.handles("foo.bar.html"));
    }

    #[test]
    fn test_pseudo_locale_registered() {
        let file_type = file_type();
        assert!(file_type.pseudo("zxx-XX").is_some());
        assert!(file_type.pseudo("fr-FR").is_none());
        assert!(file_type.missing_pseudo().is_none());
        assert_eq!(file_type.name(), "HTML File Type");
    }

    #[test]
    fn test_missing_pseudo_setting() {
        let file_type = HtmlFileType::new(ProjectConfig::new("foo").with_settings(Settings {
            missing_pseudo: true,
            ..Settings::default()
        }));
        let pseudo = file_type.missing_pseudo().unwrap();
        assert_eq!(pseudo.get_string("Test phrase"), "[Ťëšţ þĥŕàšë543210]");
    }

    #[test]
    fn test_with_pseudo_for_locale() {
        let file_type =
            file_type().with_pseudo("en-GB", Box::new(DebugPseudo::new("en-US")));
        assert_eq!(file_type.pseudo("en-GB").unwrap().pseudo_source_locale(), "en-US");
    }
}
