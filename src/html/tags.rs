//! Static tag tables used by the segmenter.
//!
//! Tag and attribute names are compared case-insensitively; unknown tags are
//! breaking and have no localizable attributes.

/// Inline tags that can sit inside a translatable message as a `<cN>` component
const NON_BREAKING_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "dfn", "del", "em", "i", "ins", "mark", "q",
    "ruby", "rt", "s", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr",
];

/// Tags whose whole content is passed through untouched
const IGNORED_TAGS: &[&str] = &["script", "style", "code"];

/// Elements that never have content or a closing tag
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Attributes localizable on specific tags, in addition to `title` on every tag
const LOCALIZABLE_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["aria-label"]),
    ("area", &["alt"]),
    ("button", &["aria-label"]),
    ("img", &["alt"]),
    ("input", &["alt", "placeholder", "aria-label"]),
    ("optgroup", &["label"]),
    ("option", &["label"]),
    ("select", &["aria-label"]),
    ("textarea", &["placeholder", "aria-label"]),
    ("track", &["label"]),
];

fn contains(table: &[&str], name: &str) -> bool {
    table.iter().any(|entry| entry.eq_ignore_ascii_case(name))
}

/// Classifies tags and attributes for the segmenter
#[derive(Debug, Clone, Copy, Default)]
pub struct TagClassifier;

impl TagClassifier {
    /// Whether the content of this tag must never be scanned for strings
    pub fn is_ignored(&self, tag: &str) -> bool {
        contains(IGNORED_TAGS, tag)
    }

    /// Whether this tag can be merged into the surrounding text as a component
    pub fn is_non_breaking(&self, tag: &str) -> bool {
        contains(NON_BREAKING_TAGS, tag)
    }

    pub fn is_void(&self, tag: &str) -> bool {
        contains(VOID_TAGS, tag)
    }

    /// Whether the value of `attribute` on `tag` is sent for translation
    pub fn is_localizable_attribute(&self, tag: &str, attribute: &str) -> bool {
        if attribute.eq_ignore_ascii_case("title") {
            return true;
        }
        LOCALIZABLE_ATTRIBUTES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(tag))
            .is_some_and(|(_, attributes)| contains(attributes, attribute))
    }
}
