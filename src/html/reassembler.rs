//! Rebuilds a localized document from a segment stream.
//!
//! Passthrough segments are copied, localizable segments are replaced by their
//! translation with the original inline markup put back around the translated
//! text. When no translation exists the text falls back to a pseudo
//! translation or to the source, and the string is recorded as new so it can be
//! sent for translation.
use crate::config::ProjectConfig;
use crate::html::file_type::HtmlFileType;
use crate::html::message::LocalizableAttribute;
use crate::html::segment::{Segment, SegmentStream};
use crate::resource::ResourceString;
use crate::text::{contains_actual_text, escape_invalid_chars, escape_quotes, make_key};
use crate::translation_set::TranslationSet;

/// Datatype of every resource extracted from HTML
pub const HTML_DATATYPE: &str = "html";

pub struct Reassembler<'a> {
    file_type: &'a HtmlFileType,
    translations: &'a TranslationSet,
    locale: &'a str,
}

impl<'a> Reassembler<'a> {
    pub fn new(
        file_type: &'a HtmlFileType,
        translations: &'a TranslationSet,
        locale: &'a str,
    ) -> Self {
        Reassembler {
            file_type,
            translations,
            locale,
        }
    }

    fn project(&self) -> &'a ProjectConfig {
        self.file_type.project()
    }

    /// Produce the localized text of the segmented document
    pub fn reassemble(&self, segments: &SegmentStream) -> String {
        let mut output = String::new();

        for segment in segments {
            match segment {
                Segment::Passthrough(text) => output.push_str(text),
                Segment::Localizable(message) => {
                    let source = message.minimal_string();
                    let translated = self.resolve(source);
                    let text = if translated == source {
                        message.render(|a| self.attribute_value(a))
                    } else {
                        message.inflate_with(&translated, |a| self.attribute_value(a))
                    };
                    output.push_str(&self.identify(source, text));
                }
                Segment::Attribute {
                    source,
                    quoted,
                    escape,
                } => {
                    let translated = self.resolve(source);
                    if translated == *source && !self.project().settings.identify {
                        output.push_str(source);
                        continue;
                    }
                    let text = self.identify(source, translated);
                    let text = if *escape { escape_quotes(&text) } else { text };
                    if *quoted {
                        output.push_str(&text);
                    } else {
                        output.push('"');
                        output.push_str(&text);
                        output.push('"');
                    }
                }
            }
        }
        output
    }

    /// Replacement for an attribute value inside a message, `None` to keep
    /// the source bytes
    fn attribute_value(&self, attribute: &LocalizableAttribute) -> Option<String> {
        let translated = self.resolve(&attribute.source);
        if translated == attribute.source {
            return None;
        }
        let value = escape_quotes(&translated);
        Some(if attribute.quoted {
            value
        } else {
            format!("\"{}\"", value)
        })
    }

    fn key_of(source: &str) -> Option<String> {
        make_key(&escape_invalid_chars(source))
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&'a str> {
        let hash = ResourceString::clean_hash_key_for(
            &self.project().id,
            locale,
            key,
            HTML_DATATYPE,
        );
        self.translations
            .get_clean(&hash)
            .and_then(|resource| resource.target.as_deref())
    }

    /// Text to use for `source` in the target locale
    fn resolve(&self, source: &str) -> String {
        let project = self.project();
        if self.locale == project.pseudo_locale && project.settings.nopseudo {
            return source.to_string();
        }
        let Some(key) = Self::key_of(source) else {
            return source.to_string();
        };
        if let Some(target) = self.lookup(self.locale, &key) {
            return target.to_string();
        }

        if contains_actual_text(source) && !project.is_source_locale(self.locale) {
            self.record_new(&key, source);
        }

        if let Some(pseudo) = self.file_type.pseudo(self.locale) {
            let pseudo_source_locale = pseudo.pseudo_source_locale();
            let base = if pseudo_source_locale != project.source_locale {
                self.lookup(pseudo_source_locale, &key).unwrap_or(source)
            } else {
                source
            };
            return pseudo.get_string(base);
        }

        match self.file_type.missing_pseudo() {
            Some(pseudo) if !project.settings.nopseudo => pseudo.get_string(source),
            _ => source.to_string(),
        }
    }

    fn record_new(&self, key: &str, source: &str) {
        let project = self.project();
        let source = escape_invalid_chars(source);
        let resource = ResourceString::new(&project.id, &project.source_locale, key, &source)
            .with_target(self.locale, &source)
            .with_datatype(HTML_DATATYPE)
            .with_auto_key(true)
            .with_state("new");
        self.file_type.new_resources().add(resource);
    }

    /// Wrap the text in an element naming its resource key, if configured
    fn identify(&self, source: &str, text: String) -> String {
        if !self.project().settings.identify {
            return text;
        }
        match Self::key_of(source) {
            Some(key) => format!(
                "<span loclang=\"html\" x-locid=\"{}\">{}</span>",
                escape_quotes(&key),
                text
            ),
            None => text,
        }
    }
}
