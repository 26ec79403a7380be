//! Message accumulation for runs of text with inline markup.
//!
//! A message is a tree of text runs and components, one component per inline
//! (non-breaking) tag. Translators see the *minimal string*, where every
//! component is written as `<cN>...</cN>` and N is the order of first
//! appearance. Components that wrap the whole message, and markup or
//! whitespace at its edges, are moved out into a prefix and a suffix that are
//! written back verbatim.
//!
//! Translatable attribute values of inline tags stay in the markup of their
//! tag, tracked by byte range, so each value is replaced only inside its own
//! component whatever order the translation puts the components in.
//!
//! # Example
//!
//! ```ignore
//! let mut message = MessageAccumulator::new();
//! message.add_text("This is a ");
//! message.push_tag(TagInfo::new("b", "<b>"));
//! message.add_text("test");
//! message.pop_tag("b", "</b>")?;
//! assert_eq!(message.minimal_string(), "This is a <c0>test</c0>");
//! ```
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::text::{is_all_white, leading_white_len, trailing_white_len};

static COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)c(\d+)(/?)>").expect("valid component regex"));

/// A translatable attribute value inside a stretch of source markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizableAttribute {
    /// The value as written in the source
    pub source: String,
    /// Byte range of the value within the markup holding it
    pub range: Range<usize>,
    /// Whether the source value was quoted
    pub quoted: bool,
}

impl LocalizableAttribute {
    fn shifted(&self, offset: usize) -> Self {
        LocalizableAttribute {
            source: self.source.clone(),
            range: self.range.start + offset..self.range.end + offset,
            quoted: self.quoted,
        }
    }
}

/// Copy `text`, replacing the value of each attribute for which `value_of`
/// returns a replacement. Attributes must be in source order.
fn substitute<F>(text: &str, attributes: &[LocalizableAttribute], value_of: &mut F) -> String
where
    F: FnMut(&LocalizableAttribute) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for attribute in attributes {
        if let Some(value) = value_of(attribute) {
            out.push_str(&text[last..attribute.range.start]);
            out.push_str(&value);
            last = attribute.range.end;
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Literal markup of one inline tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    /// The opening tag exactly as written, attributes included
    pub text: String,
    /// Localizable attribute values in `text`
    pub attributes: Vec<LocalizableAttribute>,
    /// The closing tag exactly as written, if the source closed it
    pub close: Option<String>,
    /// Void or self-closing tags have no content and no closing tag
    pub void: bool,
}

impl TagInfo {
    pub fn new(name: &str, text: &str) -> Self {
        TagInfo {
            name: name.to_string(),
            text: text.to_string(),
            attributes: Vec::new(),
            close: None,
            void: false,
        }
    }

    pub fn void(mut self, void: bool) -> Self {
        self.void = void;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<LocalizableAttribute>) -> Self {
        self.attributes = attributes;
        self
    }

    fn opening_tag<F>(&self, value_of: &mut F) -> String
    where
        F: FnMut(&LocalizableAttribute) -> Option<String>,
    {
        substitute(&self.text, &self.attributes, value_of)
    }

    fn closing_tag(&self) -> String {
        self.close
            .clone()
            .unwrap_or_else(|| format!("</{}>", self.name))
    }
}

/// Source text together with the localizable attribute values inside it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    pub text: String,
    pub attributes: Vec<LocalizableAttribute>,
}

impl Markup {
    fn from_nodes(nodes: &[Node]) -> Self {
        let mut markup = Markup::default();
        markup.push_nodes(nodes);
        markup
    }

    fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn push_tag(&mut self, tag: &TagInfo) {
        let offset = self.text.len();
        self.attributes
            .extend(tag.attributes.iter().map(|a| a.shifted(offset)));
        self.text.push_str(&tag.text);
    }

    fn push_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Text(text) => self.push_str(text),
                Node::Component(component) => {
                    self.push_tag(&component.tag);
                    self.push_nodes(&component.children);
                    if let Some(close) = &component.tag.close {
                        self.push_str(close);
                    }
                }
            }
        }
    }

    fn append(&mut self, tail: Markup) {
        let offset = self.text.len();
        self.attributes
            .extend(tail.attributes.iter().map(|a| a.shifted(offset)));
        self.text.push_str(&tail.text);
    }

    fn prepend(&mut self, mut head: Markup) {
        head.append(std::mem::take(self));
        *self = head;
    }

    /// The markup with attribute values replaced where `value_of` returns one
    pub fn render<F>(&self, mut value_of: F) -> String
    where
        F: FnMut(&LocalizableAttribute) -> Option<String>,
    {
        substitute(&self.text, &self.attributes, &mut value_of)
    }
}

impl From<&str> for Markup {
    fn from(text: &str) -> Self {
        Markup {
            text: text.to_string(),
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Component(Component),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub tag: TagInfo,
    pub children: Vec<Node>,
}

impl Node {
    /// Whether the node holds any non-whitespace text
    fn has_content(&self) -> bool {
        match self {
            Node::Text(text) => !is_all_white(text),
            Node::Component(component) => component.children.iter().any(Node::has_content),
        }
    }
}

fn render_minimal(nodes: &[Node], tags: &mut Vec<TagInfo>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Component(component) => {
                let index = tags.len();
                tags.push(component.tag.clone());
                if component.tag.void {
                    out.push_str(&format!("<c{}/>", index));
                } else {
                    out.push_str(&format!("<c{}>", index));
                    render_minimal(&component.children, tags, out);
                    out.push_str(&format!("</c{}>", index));
                }
            }
        }
    }
}

/// The closing tag did not match any open inline tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbalancedTag(pub String);

/// Builds one message while the segmenter walks the tag stream
#[derive(Debug, Clone, Default)]
pub struct MessageAccumulator {
    root: Vec<Node>,
    stack: Vec<Component>,
    text_length: usize,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn container(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(component) => &mut component.children,
            None => &mut self.root,
        }
    }

    pub fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.text_length += text.chars().count();
        let container = self.container();
        if let Some(Node::Text(last)) = container.last_mut() {
            last.push_str(text);
        } else {
            container.push(Node::Text(text.to_string()));
        }
    }

    /// Open an inline tag. Void tags are added as empty components and stay closed.
    pub fn push_tag(&mut self, tag: TagInfo) {
        let component = Component {
            tag,
            children: Vec::new(),
        };
        if component.tag.void {
            self.container().push(Node::Component(component));
        } else {
            self.stack.push(component);
        }
    }

    fn close_top(&mut self) {
        if let Some(component) = self.stack.pop() {
            self.container().push(Node::Component(component));
        }
    }

    /// Close the innermost open tag called `name`, closing any tags opened
    /// inside it that were left unclosed.
    pub fn pop_tag(&mut self, name: &str, close: &str) -> Result<TagInfo, UnbalancedTag> {
        let Some(position) = self
            .stack
            .iter()
            .rposition(|component| component.tag.name.eq_ignore_ascii_case(name))
        else {
            return Err(UnbalancedTag(name.to_string()));
        };
        while self.stack.len() > position + 1 {
            self.close_top();
        }
        let tag = match self.stack.last_mut() {
            Some(component) => {
                component.tag.close = Some(close.to_string());
                component.tag.clone()
            }
            None => return Err(UnbalancedTag(name.to_string())),
        };
        self.close_top();
        Ok(tag)
    }

    /// Number of inline tags currently open
    pub fn current_level(&self) -> usize {
        self.stack.len()
    }

    /// Number of characters of text added, whitespace included
    pub fn text_length(&self) -> usize {
        self.text_length
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.stack.is_empty()
    }

    /// All nodes, with tags still open closed implicitly
    fn into_nodes(mut self) -> Vec<Node> {
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.root
    }

    /// The source text of everything added so far, exactly as written
    pub fn original_text(&self) -> String {
        Markup::from_nodes(&self.clone().into_nodes()).text
    }

    pub fn minimal_string(&self) -> String {
        self.clone()
            .minimize()
            .message
            .map(|message| message.minimal)
            .unwrap_or_default()
    }

    pub fn prefix(&self) -> String {
        self.clone().minimize().prefix.text
    }

    pub fn suffix(&self) -> String {
        self.clone().minimize().suffix.text
    }

    /// Split the message into prefix, translatable core and suffix
    pub fn minimize(self) -> Minimized {
        let mut nodes = self.into_nodes();
        let mut prefix = Markup::default();
        let mut suffix = Markup::default();

        loop {
            let (Some(first), Some(last)) = (
                nodes.iter().position(Node::has_content),
                nodes.iter().rposition(Node::has_content),
            ) else {
                prefix.push_nodes(&nodes);
                return Minimized {
                    prefix,
                    message: None,
                    suffix,
                };
            };

            let trailing = nodes.split_off(last + 1);
            suffix.prepend(Markup::from_nodes(&trailing));
            let core = nodes.split_off(first);
            prefix.push_nodes(&nodes);
            nodes = core;

            if nodes.len() == 1 && matches!(nodes[0], Node::Component(_)) {
                if let Some(Node::Component(component)) = nodes.pop() {
                    prefix.push_tag(&component.tag);
                    if let Some(close) = &component.tag.close {
                        suffix.prepend(Markup::from(close.as_str()));
                    }
                    nodes = component.children;
                    continue;
                }
            }
            break;
        }

        Minimized::from_text(nodes, prefix, suffix)
    }
}

/// A message split for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minimized {
    /// Source markup before the translatable core
    pub prefix: Markup,
    /// The translatable core, `None` if there is nothing to translate
    pub message: Option<Message>,
    /// Source markup after the translatable core
    pub suffix: Markup,
}

impl Minimized {
    fn from_text(mut nodes: Vec<Node>, mut prefix: Markup, mut suffix: Markup) -> Self {
        if let Some(Node::Text(text)) = nodes.first_mut() {
            let lead = leading_white_len(text);
            prefix.push_str(&text[..lead]);
            text.replace_range(..lead, "");
        }
        if let Some(Node::Text(text)) = nodes.last_mut() {
            let cut = text.len() - trailing_white_len(text);
            suffix.prepend(Markup::from(&text[cut..]));
            text.truncate(cut);
        }
        Minimized {
            prefix,
            message: Some(Message::new(&nodes)),
            suffix,
        }
    }
}

/// The translatable core of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    minimal: String,
    original: Markup,
    tags: Vec<TagInfo>,
}

impl Message {
    fn new(nodes: &[Node]) -> Self {
        let mut tags = Vec::new();
        let mut minimal = String::new();
        render_minimal(nodes, &mut tags, &mut minimal);
        Message {
            minimal,
            original: Markup::from_nodes(nodes),
            tags,
        }
    }

    /// Text with `<cN>` placeholders, as sent to translators
    pub fn minimal_string(&self) -> &str {
        &self.minimal
    }

    /// The core exactly as it appeared in the source
    pub fn original_text(&self) -> &str {
        &self.original.text
    }

    /// The source attribute values held by the core, in source order
    pub fn attributes(&self) -> &[LocalizableAttribute] {
        &self.original.attributes
    }

    /// The core as in the source, with attribute values replaced where
    /// `value_of` returns one
    pub fn render<F>(&self, value_of: F) -> String
    where
        F: FnMut(&LocalizableAttribute) -> Option<String>,
    {
        self.original.render(value_of)
    }

    /// Tag behind each component index
    pub fn tags(&self) -> &[TagInfo] {
        &self.tags
    }

    /// Replace the `<cN>` placeholders of a translated minimal string with the
    /// original markup of component N.
    ///
    /// Translators may reorder components. Components left open are closed at
    /// the end, closing a component also closes the ones opened inside it, and
    /// stray closing placeholders are dropped.
    pub fn inflate(&self, translated: &str) -> String {
        self.inflate_with(translated, |_| None)
    }

    /// [`Message::inflate`], replacing the attribute values of each component's
    /// opening tag where `value_of` returns one
    pub fn inflate_with<F>(&self, translated: &str, mut value_of: F) -> String
    where
        F: FnMut(&LocalizableAttribute) -> Option<String>,
    {
        let mut out = String::with_capacity(translated.len() + self.original.text.len());
        let mut open: Vec<usize> = Vec::new();
        let mut last = 0;

        for caps in COMPONENT.captures_iter(translated) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&translated[last..whole.start()]);
            last = whole.end();

            let tag = caps[2]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.tags.get(index).map(|tag| (index, tag)));
            let Some((index, tag)) = tag else {
                warn!(
                    "Translation '{}' refers to unknown component {}",
                    translated,
                    whole.as_str()
                );
                out.push_str(whole.as_str());
                continue;
            };

            if !caps[1].is_empty() {
                if let Some(position) = open.iter().rposition(|&i| i == index) {
                    for &i in open[position..].iter().rev() {
                        out.push_str(&self.tags[i].closing_tag());
                    }
                    open.truncate(position);
                }
            } else {
                out.push_str(&tag.opening_tag(&mut value_of));
                if caps[3].is_empty() && !tag.void {
                    open.push(index);
                }
            }
        }
        out.push_str(&translated[last..]);

        for &i in open.iter().rev() {
            out.push_str(&self.tags[i].closing_tag());
        }
        out
    }
}
