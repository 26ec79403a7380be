//! String utilities shared by extraction and localization.
//!
//! Resource keys are derived from the *cleaned* source text, so every string that
//! differs only in whitespace, entity encoding or backslash escaping collapses
//! onto the same key.
//!
//! # Example
//!
//! ```ignore
//! use loctool::text::make_key;
//!
//! assert_eq!(make_key("This is a test").as_deref(), Some("r654479252"));
//! assert_eq!(make_key("\n\t This \t is\n \t a   test\n").as_deref(), Some("r654479252"));
//! ```
use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \n\t\r\f]+").expect("valid whitespace regex"));

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>|&[a-zA-Z0-9#]+;").expect("valid markup regex"));

/// Entities that render as some kind of space
const SPACE_ENTITIES: &[&str] = &[
    "&nbsp;", "&nnbsp;", "&mmsp;", "&ensp;", "&emsp;", "&thinsp;", "&#160;", "&#xa0;", "&#xA0;",
];

/// Hash a string into a resource key of the form `r<number>`.
///
/// The hash runs over UTF-16 code units so keys stay stable across
/// implementations that store strings as UTF-16.
///
/// # Returns
/// `None` for the empty string
pub fn hash_key(source: &str) -> Option<String> {
    if source.is_empty() {
        return None;
    }
    let mut hash: u64 = 0;
    for unit in source.encode_utf16() {
        hash += u64::from(unit);
        hash *= 65521;
        hash %= 1073741789;
    }
    Some(format!("r{}", hash))
}

/// Remove backslash escapes: a backslash followed by any character becomes that character.
pub fn unescape_string(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => result.push(next),
                None => result.push(c),
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Normalize a source string before hashing.
///
/// Decodes HTML entities, removes backslash escapes, collapses runs of
/// whitespace to a single space and trims both ends.
pub fn clean_string(source: &str) -> String {
    let decoded = html_escape::decode_html_entities(source);
    let unescaped = unescape_string(&decoded);
    WHITESPACE_RUN
        .replace_all(&unescaped, " ")
        .trim()
        .to_string()
}

/// Key of a source string: the hash of its cleaned form.
pub fn make_key(source: &str) -> Option<String> {
    hash_key(&clean_string(source))
}

/// Escape quotes and angle brackets so the string can be placed inside an attribute value.
///
/// Template markers (`<% ... %>`) are left alone, a backslash protects the
/// character after it, and a quote character wrapping the whole value is kept.
pub fn escape_quotes(source: &str) -> String {
    let mut chars: Vec<char> = source.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    let mut result = String::with_capacity(source.len());
    let mut suffix = None;
    if chars[0] == '"' || chars[0] == '\'' {
        result.push(chars.remove(0));
        if let Some(&last) = chars.last() {
            if last == '"' || last == '\'' {
                suffix = chars.pop();
            }
        }
    }

    let len = chars.len();
    let mut i = 0;
    while i < len {
        match chars[i] {
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            '<' => {
                if i + 1 < len && chars[i + 1] == '%' {
                    result.push_str("<%");
                    i += 2;
                    while i + 1 < len && (chars[i] != '%' || chars[i + 1] != '>') {
                        result.push(chars[i]);
                        i += 1;
                    }
                    if i < len {
                        result.push(chars[i]);
                    }
                } else {
                    result.push_str("&lt;");
                }
            }
            '>' => {
                if i > 0 && chars[i - 1] == '%' {
                    result.push('>');
                } else {
                    result.push_str("&gt;");
                }
            }
            '\\' => {
                result.push('\\');
                if i + 1 < len - 1 {
                    i += 1;
                    result.push(chars[i]);
                }
            }
            c => result.push(c),
        }
        i += 1;
    }

    if let Some(c) = suffix {
        result.push(c);
    }
    result
}

/// Replace control characters that are not valid in XML/HTML text with numeric
/// character references. Whitespace controls (tab, newlines, form feed) are kept.
pub fn escape_invalid_chars(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    for c in source.chars() {
        let code = c as u32;
        if code < 0x09 || (code > 0x0D && code < 0x20) {
            result.push_str(&format!("&#{};", code));
        } else {
            result.push(c);
        }
    }
    result
}

/// Whether the character is whitespace, including the Unicode space separators.
pub fn is_white(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\t' | '\r' | '\u{0B}' | '\u{0C}')
        || matches!(
            c as u32,
            0x00A0 | 0x2000..=0x200F | 0x2028..=0x202F | 0x205F..=0x206F | 0x3000 | 0xFEFF
        )
}

fn space_entity_at(text: &str) -> Option<usize> {
    SPACE_ENTITIES
        .iter()
        .find(|entity| text.starts_with(*entity))
        .map(|entity| entity.len())
}

fn space_entity_before(text: &str) -> Option<usize> {
    SPACE_ENTITIES
        .iter()
        .find(|entity| text.ends_with(*entity))
        .map(|entity| entity.len())
}

/// Byte length of the run of whitespace (and space entities) at the start of `text`.
pub fn leading_white_len(text: &str) -> usize {
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        if let Some(len) = space_entity_at(rest) {
            pos += len;
            continue;
        }
        match rest.chars().next() {
            Some(c) if is_white(c) => pos += c.len_utf8(),
            _ => break,
        }
    }
    pos
}

/// Byte length of the run of whitespace (and space entities) at the end of `text`.
pub fn trailing_white_len(text: &str) -> usize {
    let mut end = text.len();
    while end > 0 {
        let head = &text[..end];
        if let Some(len) = space_entity_before(head) {
            end -= len;
            continue;
        }
        match head.chars().next_back() {
            Some(c) if is_white(c) => end -= c.len_utf8(),
            _ => break,
        }
    }
    text.len() - end
}

/// Whether the text holds nothing but whitespace and space entities.
pub fn is_all_white(text: &str) -> bool {
    leading_white_len(text) == text.len()
}

/// Whether the text has something a translator would translate once markup
/// and entities are removed: a letter or digit in any script.
pub fn contains_actual_text(text: &str) -> bool {
    MARKUP
        .replace_all(text, "")
        .chars()
        .any(|c| c.is_alphanumeric())
}
