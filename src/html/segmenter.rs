//! The segmentation state machine.
//!
//! [`HtmlSegmenter`] consumes [`TagEvent`]s in document order and splits the
//! document into passthrough markup and translatable units, registering a
//! resource for every unit it finds. Runs of text and inline tags are gathered
//! in a [`MessageAccumulator`]; any breaking tag ends the message.
//!
//! # Example
//!
//! ```ignore
//! let project = ProjectConfig::new("webapp");
//! let extraction = HtmlSegmenter::segment(&project, "index.html", "<p>Hello <b>world</b></p>")?;
//! assert_eq!(extraction.resources.size(), 1);
//! // resource source: "Hello <c0>world</c0>"
//! ```
use tracing::debug;

use crate::config::ProjectConfig;
use crate::error::{LocError, LocResult};
use crate::html::message::{LocalizableAttribute, Markup, MessageAccumulator, TagInfo};
use crate::html::scanner::{TagEvent, scan};
use crate::html::segment::{Segment, SegmentStream};
use crate::html::tags::TagClassifier;
use crate::resource::ResourceString;
use crate::text::{escape_invalid_chars, is_all_white, make_key};
use crate::translation_set::TranslationSet;

/// Result of segmenting one document
#[derive(Debug, Clone)]
pub struct Extraction {
    pub segments: SegmentStream,
    pub resources: TranslationSet,
}

/// An inline tag whose attributes are still being read
#[derive(Debug, Clone)]
struct PendingTag {
    name: String,
    text: String,
    /// Localizable values in `text`
    attributes: Vec<LocalizableAttribute>,
}

/// Mutable state threaded through the event handlers
#[derive(Debug, Default)]
struct ParserState {
    /// Depth of ignored elements the scanner is inside
    ignore_depth: usize,
    passthrough: String,
    pending_tag: Option<PendingTag>,
    message: MessageAccumulator,
    /// Line the live message started on
    message_line: Option<usize>,
    /// Translator comment for the next resource
    comment: Option<String>,
    /// Tag whose attributes are being read
    current_tag: String,
    resource_index: usize,
}

impl ParserState {
    fn ignoring(&self) -> bool {
        self.ignore_depth > 0
    }

    /// Accumulator the current tag's markup goes to
    fn markup_target(&mut self) -> &mut String {
        match self.pending_tag.as_mut() {
            Some(pending) => &mut pending.text,
            None => &mut self.passthrough,
        }
    }
}

fn is_template_expression(value: &str) -> bool {
    let value = value.trim_start();
    value.starts_with("<%") || value.starts_with("{{")
}

pub struct HtmlSegmenter<'p> {
    project: &'p ProjectConfig,
    path: String,
    tags: TagClassifier,
    state: ParserState,
    segments: SegmentStream,
    resources: TranslationSet,
}

impl<'p> HtmlSegmenter<'p> {
    pub fn new(project: &'p ProjectConfig, path: &str) -> Self {
        HtmlSegmenter {
            project,
            path: path.to_string(),
            tags: TagClassifier,
            state: ParserState::default(),
            segments: SegmentStream::new(),
            resources: TranslationSet::new(&project.source_locale),
        }
    }

    /// Scan and segment a whole document
    ///
    /// # Errors
    /// [`LocError::UnbalancedTags`] if an inline closing tag matches no open tag
    pub fn segment(project: &'p ProjectConfig, path: &str, text: &str) -> LocResult<Extraction> {
        let mut segmenter = HtmlSegmenter::new(project, path);
        for scanned in scan(text) {
            segmenter.handle_event(&scanned.event, scanned.line)?;
        }
        Ok(segmenter.finish())
    }

    /// Feed one event, starting on `line`, into the state machine
    pub fn handle_event(&mut self, event: &TagEvent<'_>, line: usize) -> LocResult<()> {
        match *event {
            TagEvent::Open { name } => self.open_tag(name),
            TagEvent::Attribute {
                name,
                value,
                quote,
                raw,
                ..
            } => self.attribute(name, value, quote, raw, line),
            TagEvent::CloseOpened { name, token, unary } => {
                self.close_opened_tag(name, token, unary)
            }
            TagEvent::Close { name, raw } => return self.close_tag(name, raw, line),
            TagEvent::Text(text) => self.text(text, line),
            TagEvent::Comment { value, raw } => self.comment(value, raw),
            TagEvent::CData(raw) | TagEvent::DocType(raw) => {
                if !self.state.ignoring() {
                    self.emit();
                }
                self.state.passthrough.push_str(raw);
            }
        }
        Ok(())
    }

    /// Flush what is left and return the segments and resources
    pub fn finish(mut self) -> Extraction {
        if !self.state.message.is_empty() {
            self.emit();
        }
        if let Some(pending) = self.state.pending_tag.take() {
            self.push_markup(Markup {
                text: pending.text,
                attributes: pending.attributes,
            });
        }
        self.flush_passthrough();
        debug!(
            "{}: {} segments, {} resources",
            self.path,
            self.segments.len(),
            self.resources.size()
        );
        Extraction {
            segments: self.segments,
            resources: self.resources,
        }
    }

    fn open_tag(&mut self, name: &str) {
        self.state.current_tag = name.to_string();
        if self.state.ignoring() {
            if self.tags.is_ignored(name) {
                self.state.ignore_depth += 1;
            }
        } else if self.tags.is_ignored(name) {
            self.emit();
            self.state.ignore_depth = 1;
        } else if self.tags.is_non_breaking(name) {
            self.state.pending_tag = Some(PendingTag {
                name: name.to_string(),
                text: format!("<{}", name),
                attributes: Vec::new(),
            });
            return;
        } else {
            self.emit();
        }
        self.state.passthrough.push('<');
        self.state.passthrough.push_str(name);
    }

    fn attribute(
        &mut self,
        name: &str,
        value: Option<&str>,
        quote: Option<char>,
        raw: &str,
        line: usize,
    ) {
        if self.state.ignoring() {
            self.state.markup_target().push_str(raw);
            return;
        }

        let localizable = value.filter(|value| {
            self.tags
                .is_localizable_attribute(&self.state.current_tag, name)
                && !value.trim().is_empty()
                && !is_template_expression(value)
        });
        let Some(source) = localizable else {
            self.state.markup_target().push_str(raw);
            return;
        };

        self.add_resource(source, line);

        // the value sits at the end of raw, before the closing quote if any
        let end = raw.len() - usize::from(quote.is_some());
        let start = end - source.len();

        if let Some(pending) = self.state.pending_tag.as_mut() {
            let offset = pending.text.len();
            pending.text.push_str(raw);
            pending.attributes.push(LocalizableAttribute {
                source: source.to_string(),
                range: offset + start..offset + end,
                quoted: quote.is_some(),
            });
        } else {
            self.emit();
            self.state.passthrough.push_str(&raw[..start]);
            self.flush_passthrough();
            self.segments.push(Segment::Attribute {
                source: source.to_string(),
                quoted: quote.is_some(),
                escape: true,
            });
            self.state.passthrough.push_str(&raw[end..]);
        }
    }

    fn close_opened_tag(&mut self, name: &str, token: &str, unary: bool) {
        if self.state.ignoring() {
            self.state.passthrough.push_str(token);
            if unary && self.tags.is_ignored(name) {
                self.state.ignore_depth -= 1;
            }
            return;
        }

        match self.state.pending_tag.take() {
            Some(mut pending) => {
                pending.text.push_str(token);
                let void = unary || self.tags.is_void(&pending.name);
                self.state.message.push_tag(
                    TagInfo::new(&pending.name, &pending.text)
                        .void(void)
                        .with_attributes(pending.attributes),
                );
            }
            None => self.state.passthrough.push_str(token),
        }
    }

    fn close_tag(&mut self, name: &str, raw: &str, line: usize) -> LocResult<()> {
        if self.state.ignoring() {
            if self.tags.is_ignored(name) {
                self.state.ignore_depth -= 1;
            }
            self.state.passthrough.push_str(raw);
            return Ok(());
        }

        if self.tags.is_non_breaking(name) && self.state.message.current_level() > 0 {
            return self
                .state
                .message
                .pop_tag(name, raw)
                .map(|_| ())
                .map_err(|_| LocError::UnbalancedTags {
                    path: self.path.clone(),
                    line,
                });
        }

        self.emit();
        self.state.passthrough.push_str(raw);
        Ok(())
    }

    fn text(&mut self, text: &str, line: usize) {
        if self.state.ignoring() {
            self.state.passthrough.push_str(text);
            return;
        }
        if is_all_white(text) {
            if let Some(pending) = self.state.pending_tag.as_mut() {
                pending.text.push_str(text);
                return;
            }
        } else {
            self.flush_passthrough();
            self.state.message_line.get_or_insert(line);
        }
        self.state.message.add_text(text);
    }

    fn comment(&mut self, value: &str, raw: &str) {
        if self.state.ignoring() {
            self.state.passthrough.push_str(raw);
            return;
        }
        if let Some(note) = value.trim().strip_prefix("i18n:") {
            self.state.comment = Some(note.trim().to_string());
        }
    }

    fn flush_passthrough(&mut self) {
        let text = std::mem::take(&mut self.state.passthrough);
        self.segments.push_passthrough(text);
    }

    /// Append markup to the passthrough, splitting out its attribute values
    /// as attribute segments
    fn push_markup(&mut self, markup: Markup) {
        let mut last = 0;
        for attribute in markup.attributes {
            self.state
                .passthrough
                .push_str(&markup.text[last..attribute.range.start]);
            self.flush_passthrough();
            self.segments.push(Segment::Attribute {
                source: attribute.source,
                quoted: attribute.quoted,
                escape: true,
            });
            last = attribute.range.end;
        }
        self.state.passthrough.push_str(&markup.text[last..]);
    }

    /// Finish the live message: its prefix and suffix become passthrough and
    /// its core, if it has one, becomes a localizable segment.
    fn emit(&mut self) {
        let message = std::mem::take(&mut self.state.message);
        let line = self.state.message_line.take().unwrap_or(1);
        let minimized = message.minimize();

        self.push_markup(minimized.prefix);
        if let Some(message) = minimized.message {
            self.flush_passthrough();
            self.add_resource(message.minimal_string(), line);
            self.segments.push(Segment::Localizable(message));
        }
        self.push_markup(minimized.suffix);
    }

    fn add_resource(&mut self, text: &str, line: usize) {
        let source = escape_invalid_chars(text);
        let Some(key) = make_key(&source) else {
            return;
        };
        let resource = ResourceString::new(
            &self.project.id,
            &self.project.source_locale,
            &key,
            &source,
        )
        .with_datatype("html")
        .with_auto_key(true)
        .with_comment(self.state.comment.take())
        .with_location(&self.path, line)
        .with_index(self.state.resource_index);
        self.state.resource_index += 1;
        self.resources.add(resource);
    }
}
