use crate::html::message::Message;

/// One ordered piece of a segmented document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Markup and text copied to the output unchanged
    Passthrough(String),
    /// A translatable message
    Localizable(Message),
    /// The value of a localizable attribute on a tag outside any message,
    /// written at this position. `quoted` is false for a bare `name=value`.
    Attribute {
        source: String,
        quoted: bool,
        escape: bool,
    },
}

impl Segment {
    pub fn is_localizable(&self) -> bool {
        !matches!(self, Segment::Passthrough(_))
    }
}

/// Segments of one document in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentStream {
    segments: Vec<Segment>,
}

impl SegmentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Append passthrough text, skipping empty strings
    pub fn push_passthrough(&mut self, text: String) {
        if !text.is_empty() {
            self.segments.push(Segment::Passthrough(text));
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments holding something to translate
    pub fn localizable_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_localizable()).count()
    }

    /// Rebuild the source document from the segments, with every message and
    /// attribute value in its original form.
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Passthrough(text) => out.push_str(text),
                Segment::Localizable(message) => out.push_str(message.original_text()),
                Segment::Attribute { source, .. } => out.push_str(source),
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a SegmentStream {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_passthrough_skips_empty() {
        let mut stream = SegmentStream::new();
        stream.push_passthrough(String::new());
        stream.push_passthrough("<div>".to_string());
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.localizable_count(), 0);
    }

    #[test]
    fn test_source_text_with_inline_attribute() {
        let mut stream = SegmentStream::new();
        stream.push_passthrough("<img alt=\"".to_string());
        stream.push(Segment::Attribute {
            source: "Alt text".to_string(),
            quoted: true,
            escape: true,
        });
        stream.push_passthrough("\">".to_string());
        assert_eq!(stream.source_text(), "<img alt=\"Alt text\">");
        assert_eq!(stream.localizable_count(), 1);
    }
}
