//! One HTML source file: extraction of its strings and generation of its
//! localized copies.
//!
//! # Example
//!
//! ```ignore
//! let file_type = HtmlFileType::new(ProjectConfig::from_file(Path::new("project.json"))?);
//! let mut file = file_type.new_file("pages/index.html");
//! file.extract()?;
//! let written = file.localize(&translations, &["fr-FR", "de-DE"])?;
//! ```
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, warn};

use crate::config::has_variant;
use crate::error::{LocError, LocResult};
use crate::html::file_type::HtmlFileType;
use crate::html::reassembler::Reassembler;
use crate::html::segment::SegmentStream;
use crate::html::segmenter::HtmlSegmenter;
use crate::translation_set::TranslationSet;

#[derive(Debug)]
pub struct HtmlFile<'t> {
    file_type: &'t HtmlFileType,
    /// Path relative to the project root
    path: String,
    segments: SegmentStream,
    resources: TranslationSet,
}

impl<'t> HtmlFile<'t> {
    pub fn new(file_type: &'t HtmlFileType, path: &str) -> Self {
        let source_locale = &file_type.project().source_locale;
        HtmlFile {
            file_type,
            path: path.to_string(),
            segments: SegmentStream::new(),
            resources: TranslationSet::new(source_locale),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Segment `text` and collect its resources
    ///
    /// # Errors
    /// [`LocError::UnbalancedTags`] if the inline markup does not nest
    pub fn parse(&mut self, text: &str) -> LocResult<()> {
        let extraction = HtmlSegmenter::segment(self.file_type.project(), &self.path, text)
            .inspect_err(|e| error!("{}", e))?;
        self.segments = extraction.segments;
        self.resources = extraction.resources;
        Ok(())
    }

    /// Read the file from under the project root and parse it.
    ///
    /// A file that cannot be read is logged and leaves the file with no
    /// resources.
    pub fn extract(&mut self) -> LocResult<()> {
        let full_path = self.file_type.project().root.join(&self.path);
        match fs::read_to_string(&full_path) {
            Ok(text) => {
                debug!("Extracting strings from {}", full_path.display());
                self.parse(&text)
            }
            Err(e) => {
                warn!("Could not read file {}: {}", full_path.display(), e);
                Ok(())
            }
        }
    }

    /// Resources found by the last parse
    pub fn translation_set(&self) -> &TranslationSet {
        &self.resources
    }

    pub fn segments(&self) -> &SegmentStream {
        &self.segments
    }

    /// The localized text of this file for `locale`
    pub fn localize_text(&self, translations: &TranslationSet, locale: &str) -> String {
        Reassembler::new(self.file_type, translations, locale).reassemble(&self.segments)
    }

    /// Where the localized copy for `locale` goes, relative to the target
    /// directory.
    ///
    /// The locale is put into the file name before the extension, replacing
    /// the source locale if the name already carries it:
    /// `a/simple.html` becomes `a/simple.fr-FR.html` and
    /// `a/simple.en-US.html` becomes `a/simple.fr-FR.html`.
    pub fn localized_path(&self, locale: &str) -> PathBuf {
        let project = self.file_type.project();
        let locale = project.output_locale(locale);
        let path = Path::new(&self.path);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut parts: Vec<&str> = file_name.split('.').collect();
        let len = parts.len();
        if len > 2 && project.is_source_locale(parts[len - 2]) {
            parts[len - 2] = locale;
        } else if len > 1 {
            parts.insert(len - 1, locale);
        } else {
            parts.push(locale);
        }

        let dir: PathBuf = path
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter(|c| !matches!(c, Component::CurDir))
                    .collect()
            })
            .unwrap_or_default();
        dir.join(parts.join("."))
    }

    /// Write a localized copy of the file for each locale under the project's
    /// target directory. The source locale and locales with a variant subtag
    /// are skipped.
    ///
    /// # Returns
    /// The paths of the files written.
    ///
    /// # Errors
    /// [`LocError::Io`] if a directory or file cannot be written.
    pub fn localize(
        &self,
        translations: &TranslationSet,
        locales: &[&str],
    ) -> LocResult<Vec<PathBuf>> {
        let project = self.file_type.project();
        let mut written = Vec::new();

        for &locale in locales {
            if project.is_source_locale(locale) {
                continue;
            }
            match has_variant(locale) {
                Ok(false) => {}
                Ok(true) => {
                    debug!("Skipping variant locale {}", locale);
                    continue;
                }
                Err(e) => {
                    warn!("Skipping locale: {}", e);
                    continue;
                }
            }

            let output = project.target.join(self.localized_path(locale));
            if let Some(dir) = output.parent() {
                fs::create_dir_all(dir).map_err(|source| LocError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            let text = self.localize_text(translations, locale);
            fs::write(&output, text).map_err(|source| LocError::Io {
                path: output.clone(),
                source,
            })?;
            debug!("Wrote {}", output.display());
            written.push(output);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::resource::ResourceString;
    use tempfile::tempdir;

    fn file_type() -> HtmlFileType {
        HtmlFileType::new(ProjectConfig::new("foo"))
    }

    #[test]
    fn test_localized_path() {
        let file_type = file_type();
        let cases = [
            ("simple.html", "simple.fr-FR.html"),
            ("./asdf/bar/simple.html", "asdf/bar/simple.fr-FR.html"),
            ("simple", "simple.fr-FR"),
            ("asdf/simple.en-US.html", "asdf/simple.fr-FR.html"),
            ("foo.bar.html", "foo.bar.fr-FR.html"),
        ];
        for (path, expected) in cases {
            assert_eq!(
                file_type.new_file(path).localized_path("fr-FR"),
                PathBuf::from(expected),
                "path {}",
                path
            );
        }
    }

    #[test]
    fn test_localized_path_uses_locale_map() {
        let file_type =
            HtmlFileType::new(ProjectConfig::new("foo").with_locale_mapping("fr-FR", "fr"));
        assert_eq!(
            file_type.new_file("a/simple.html").localized_path("fr-FR"),
            PathBuf::from("a/simple.fr.html")
        );
    }

    #[test]
    fn test_parse_reports_unbalanced_tags() {
        let file_type = file_type();
        let mut file = file_type.new_file("bad.html");
        let err = file.parse("<p><b>one</i></b></p>").unwrap_err();
        assert!(matches!(err, LocError::UnbalancedTags { line: 1, .. }));
    }

    #[test]
    fn test_extract_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let file_type = HtmlFileType::new(ProjectConfig::new("foo").with_root(dir.path()));
        let mut file = file_type.new_file("nope.html");
        file.extract().unwrap();
        assert!(file.translation_set().is_empty());
        assert!(file.segments().is_empty());
    }

    #[test]
    fn test_extract_and_localize() {
        let root = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::create_dir_all(root.path().join("pages")).unwrap();
        fs::write(
            root.path().join("pages/index.html"),
            "<html><body>This is a test</body></html>\n",
        )
        .unwrap();

        let file_type = HtmlFileType::new(
            ProjectConfig::new("foo")
                .with_root(root.path())
                .with_target(target.path()),
        );
        let mut file = file_type.new_file("pages/index.html");
        file.extract().unwrap();
        assert_eq!(file.translation_set().size(), 1);

        let mut translations = TranslationSet::new("en-US");
        translations.add(
            ResourceString::new("foo", "en-US", "r654479252", "This is a test")
                .with_target("fr-FR", "Ceci est un essai")
                .with_datatype("html"),
        );

        let written = file
            .localize(&translations, &["en-US", "fr-FR", "de-DE-1996"])
            .unwrap();
        let expected = target.path().join("pages/index.fr-FR.html");
        assert_eq!(written, vec![expected.clone()]);
        assert_eq!(
            fs::read_to_string(expected).unwrap(),
            "<html><body>Ceci est un essai</body></html>\n"
        );
        assert!(!target.path().join("pages/index.de-DE-1996.html").exists());
        assert!(!target.path().join("pages/index.en-US.html").exists());
    }
}
