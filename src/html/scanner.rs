//! Tag-stream scanner.
//!
//! Turns HTML text into a flat sequence of [`TagEvent`]s in document order. The
//! scanner keeps the literal source text of every construct so that a consumer
//! can rebuild the input byte for byte. It never fails: anything that does not
//! scan as markup (a lone `<`, an unterminated tag or comment) is reported as text.
//!
//! # Example
//!
//! ```ignore
//! let events = scan("<p class=\"x\">Hi</p>");
//! // Open("p"), Attribute(class="x"), CloseOpened(">"), Text("Hi"), Close("</p>")
//! assert_eq!(events.len(), 5);
//! ```

/// One parse event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent<'a> {
    /// `<name` of an opening tag
    Open { name: &'a str },
    /// One attribute of the tag opened last
    Attribute {
        name: &'a str,
        value: Option<&'a str>,
        quote: Option<char>,
        /// Whitespace between the previous token and the attribute name
        lead: &'a str,
        /// Exact source text including `lead`
        raw: &'a str,
    },
    /// The `>` or `/>` ending an opening tag, with any whitespace before it
    CloseOpened {
        name: &'a str,
        token: &'a str,
        unary: bool,
    },
    /// A closing tag
    Close { name: &'a str, raw: &'a str },
    Text(&'a str),
    Comment { value: &'a str, raw: &'a str },
    CData(&'a str),
    /// A `<!DOCTYPE ...>` or other `<!...>`/`<?...>` declaration
    DocType(&'a str),
}

/// An event and the 1-based line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEvent<'a> {
    pub event: TagEvent<'a>,
    pub line: usize,
}

/// End offset, events with their start offsets, and the raw-text element whose content follows
type Markup<'a> = (usize, Vec<(usize, TagEvent<'a>)>, Option<&'a str>);

/// Elements whose content is raw text up to the matching closing tag
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0B
}

fn starts_with_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

pub struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    line: usize,
    counted: usize,
    events: Vec<ScannedEvent<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner {
            input,
            bytes: input.as_bytes(),
            line: 1,
            counted: 0,
            events: Vec::new(),
        }
    }

    /// Scan the whole input
    pub fn scan(mut self) -> Vec<ScannedEvent<'a>> {
        let len = self.bytes.len();
        let mut position = 0;
        let mut text_start = 0;

        while position < len {
            let Some(offset) = self.bytes[position..].iter().position(|&b| b == b'<') else {
                break;
            };
            let lt = position + offset;
            let Some((end, events, raw_text_tag)) = self.scan_markup(lt) else {
                position = lt + 1;
                continue;
            };

            self.push_text(text_start, lt);
            for (start, event) in events {
                self.push(start, event);
            }
            position = end;
            text_start = end;

            if let Some(tag) = raw_text_tag {
                let close = find_raw_text_close(&self.bytes[end..], tag.as_bytes())
                    .map(|rel| end + rel)
                    .unwrap_or(len);
                self.push_text(end, close);
                position = close;
                text_start = close;
            }
        }

        self.push_text(text_start, len);
        self.events
    }

    fn line_at(&mut self, position: usize) -> usize {
        if position > self.counted {
            self.line += self.bytes[self.counted..position]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.counted = position;
        }
        self.line
    }

    fn push(&mut self, start: usize, event: TagEvent<'a>) {
        let line = self.line_at(start);
        self.events.push(ScannedEvent { event, line });
    }

    fn push_text(&mut self, start: usize, end: usize) {
        if end > start {
            let text = &self.input[start..end];
            self.push(start, TagEvent::Text(text));
        }
    }

    /// Try to scan a markup construct starting at the `<` at `lt`.
    ///
    /// # Returns
    /// The end offset, the events with their start offsets, and the name of a
    /// raw-text element whose content follows. `None` if this `<` is plain text.
    fn scan_markup(&self, lt: usize) -> Option<Markup<'a>> {
        let rest = &self.bytes[lt..];
        let input = self.input;

        if rest.starts_with(b"<!--") {
            let inner_start = lt + 4;
            let close = input[inner_start..].find("-->")?;
            let end = inner_start + close + 3;
            let event = TagEvent::Comment {
                value: &input[inner_start..inner_start + close],
                raw: &input[lt..end],
            };
            return Some((end, vec![(lt, event)], None));
        }

        if starts_with_ignore_ascii_case(rest, b"<![cdata[") {
            let close = input[lt..].find("]]>")?;
            let end = lt + close + 3;
            return Some((end, vec![(lt, TagEvent::CData(&input[lt..end]))], None));
        }

        if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
            let close = input[lt..].find('>')?;
            let end = lt + close + 1;
            return Some((end, vec![(lt, TagEvent::DocType(&input[lt..end]))], None));
        }

        if rest.starts_with(b"</") {
            if !rest.get(2)?.is_ascii_alphabetic() {
                return None;
            }
            let name_start = lt + 2;
            let name_end = self.tag_name_end(name_start);
            let close = input[name_end..].find('>')?;
            let end = name_end + close + 1;
            let event = TagEvent::Close {
                name: &input[name_start..name_end],
                raw: &input[lt..end],
            };
            return Some((end, vec![(lt, event)], None));
        }

        if rest.get(1)?.is_ascii_alphabetic() {
            return self.scan_open_tag(lt);
        }

        None
    }

    fn tag_name_end(&self, start: usize) -> usize {
        let mut end = start;
        while end < self.bytes.len() && is_tag_name_byte(self.bytes[end]) {
            end += 1;
        }
        end
    }

    fn scan_open_tag(&self, lt: usize) -> Option<Markup<'a>> {
        let bytes = self.bytes;
        let input = self.input;
        let len = bytes.len();

        let name_end = self.tag_name_end(lt + 1);
        let name = &input[lt + 1..name_end];
        let mut events = vec![(lt, TagEvent::Open { name })];
        let mut k = name_end;

        loop {
            let lead_start = k;
            while k < len
                && (is_space(bytes[k]) || (bytes[k] == b'/' && bytes.get(k + 1) != Some(&b'>')))
            {
                k += 1;
            }
            if k >= len {
                return None;
            }

            if bytes[k] == b'>' || bytes[k] == b'/' {
                let unary = bytes[k] == b'/';
                let end = if unary { k + 2 } else { k + 1 };
                events.push((
                    lead_start,
                    TagEvent::CloseOpened {
                        name,
                        token: &input[lead_start..end],
                        unary,
                    },
                ));
                let raw_text_tag = RAW_TEXT_TAGS
                    .iter()
                    .find(|tag| tag.eq_ignore_ascii_case(name))
                    .filter(|_| !unary)
                    .copied();
                return Some((end, events, raw_text_tag));
            }

            let attr_start = k;
            while k < len
                && !is_space(bytes[k])
                && bytes[k] != b'>'
                && bytes[k] != b'='
                && !(bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>'))
            {
                k += 1;
            }
            if k == attr_start {
                // a stray '=' with no name before it
                k += 1;
            }
            let attr_name = &input[attr_start..k];

            let mut value = None;
            let mut quote = None;
            let mut probe = k;
            while probe < len && is_space(bytes[probe]) {
                probe += 1;
            }
            if probe < len && bytes[probe] == b'=' {
                probe += 1;
                while probe < len && is_space(bytes[probe]) {
                    probe += 1;
                }
                if probe >= len {
                    return None;
                }
                if bytes[probe] == b'"' || bytes[probe] == b'\'' {
                    let q = bytes[probe];
                    let value_start = probe + 1;
                    let close = bytes[value_start..].iter().position(|&b| b == q)?;
                    value = Some(&input[value_start..value_start + close]);
                    quote = Some(char::from(q));
                    k = value_start + close + 1;
                } else {
                    let value_start = probe;
                    while probe < len && !is_space(bytes[probe]) && bytes[probe] != b'>' {
                        probe += 1;
                    }
                    value = Some(&input[value_start..probe]);
                    k = probe;
                }
            }

            events.push((
                lead_start,
                TagEvent::Attribute {
                    name: attr_name,
                    value,
                    quote,
                    lead: &input[lead_start..attr_start],
                    raw: &input[lead_start..k],
                },
            ));
        }
    }
}

/// Offset of the closing tag of a raw-text element, e.g. `</script`, matched
/// case-insensitively and followed by a non-name character.
fn find_raw_text_close(haystack: &[u8], tag: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < haystack.len() {
        let rel = haystack[i..].iter().position(|&b| b == b'<')?;
        i += rel;
        let candidate = &haystack[i..];
        if candidate.len() >= tag.len() + 2
            && candidate[1] == b'/'
            && candidate[2..2 + tag.len()].eq_ignore_ascii_case(tag)
            && !candidate
                .get(2 + tag.len())
                .is_some_and(|&b| is_tag_name_byte(b))
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Scan `input` into tag events
pub fn scan(input: &str) -> Vec<ScannedEvent<'_>> {
    Scanner::new(input).scan()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Vec<TagEvent<'_>> {
        scan(input).into_iter().map(|e| e.event).collect()
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            events("<p>Hello</p>"),
            vec![
                TagEvent::Open { name: "p" },
                TagEvent::CloseOpened {
                    name: "p",
                    token: ">",
                    unary: false
                },
                TagEvent::Text("Hello"),
                TagEvent::Close {
                    name: "p",
                    raw: "</p>"
                },
            ]
        );
    }

    #[test]
    fn test_attributes() {
        let scanned = events("<img src='a.png' alt=\"Alt text\" hidden width=86 />");
        assert_eq!(scanned[0], TagEvent::Open { name: "img" });
        assert_eq!(
            scanned[1],
            TagEvent::Attribute {
                name: "src",
                value: Some("a.png"),
                quote: Some('\''),
                lead: " ",
                raw: " src='a.png'"
            }
        );
        assert_eq!(
            scanned[2],
            TagEvent::Attribute {
                name: "alt",
                value: Some("Alt text"),
                quote: Some('"'),
                lead: " ",
                raw: " alt=\"Alt text\""
            }
        );
        assert_eq!(
            scanned[3],
            TagEvent::Attribute {
                name: "hidden",
                value: None,
                quote: None,
                lead: " ",
                raw: " hidden"
            }
        );
        assert_eq!(
            scanned[4],
            TagEvent::Attribute {
                name: "width",
                value: Some("86"),
                quote: None,
                lead: " ",
                raw: " width=86"
            }
        );
        assert_eq!(
            scanned[5],
            TagEvent::CloseOpened {
                name: "img",
                token: " />",
                unary: true
            }
        );
    }

    #[test]
    fn test_quoted_value_may_contain_angle_brackets() {
        let scanned = events("<div title=\"a > b\">x</div>");
        assert!(matches!(
            scanned[1],
            TagEvent::Attribute {
                value: Some("a > b"),
                ..
            }
        ));
        assert_eq!(scanned[3], TagEvent::Text("x"));
    }

    #[test]
    fn test_comment_doctype_cdata() {
        let scanned = events("<!DOCTYPE html><!-- i18n: note --><![CDATA[ x < y ]]>");
        assert_eq!(
            scanned,
            vec![
                TagEvent::DocType("<!DOCTYPE html>"),
                TagEvent::Comment {
                    value: " i18n: note ",
                    raw: "<!-- i18n: note -->"
                },
                TagEvent::CData("<![CDATA[ x < y ]]>"),
            ]
        );
    }

    #[test]
    fn test_script_content_is_raw_text() {
        let scanned = events("<script>if (a < b) { x = '<b>'; }</script>");
        assert_eq!(scanned[2], TagEvent::Text("if (a < b) { x = '<b>'; }"));
        assert_eq!(
            scanned[3],
            TagEvent::Close {
                name: "script",
                raw: "</script>"
            }
        );
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        assert_eq!(events("a < b"), vec![TagEvent::Text("a < b")]);
        assert_eq!(events("x <% foo %> y"), vec![TagEvent::Text("x <% foo %> y")]);
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        assert_eq!(
            events("Hello <span class=\"x"),
            vec![TagEvent::Text("Hello <span class=\"x")]
        );
        assert_eq!(events("a <!-- b"), vec![TagEvent::Text("a <!-- b")]);
    }

    #[test]
    fn test_line_numbers() {
        let scanned = scan("<div>\n  text\n\n<span\n title=\"t\">x</span></div>");
        let lines: Vec<usize> = scanned.iter().map(|e| e.line).collect();
        // div, >, text, span, title, >, x, </span>, </div>
        assert_eq!(lines, vec![1, 1, 1, 4, 4, 5, 5, 5, 5]);
    }

    #[test]
    fn test_concatenated_raw_text_reproduces_input() {
        let input = "<html>\n<body class=\"a\"  id=x>Text <b>bold</b><br/>\n<!-- c --></body></html>";
        let mut rebuilt = String::new();
        for scanned in scan(input) {
            match scanned.event {
                TagEvent::Open { name } => {
                    rebuilt.push('<');
                    rebuilt.push_str(name);
                }
                TagEvent::Attribute { raw, .. } => rebuilt.push_str(raw),
                TagEvent::CloseOpened { token, .. } => rebuilt.push_str(token),
                TagEvent::Close { raw, .. } => rebuilt.push_str(raw),
                TagEvent::Text(text) => rebuilt.push_str(text),
                TagEvent::Comment { raw, .. } => rebuilt.push_str(raw),
                TagEvent::CData(raw) | TagEvent::DocType(raw) => rebuilt.push_str(raw),
            }
        }
        assert_eq!(rebuilt, input);
    }
}
