/// HTML localization
///
/// This module extracts translatable strings from HTML documents and writes
/// localized copies of them. Localization works in two passes over one
/// segmentation of the document, so that everything that is not translated
/// comes out byte for byte as it went in.
///
/// # Overview
///
/// 1. **Scanner** - Tokenizes the markup into tag, attribute, text and comment events
/// 2. **Tag classification** - Decides which tags break a message and which attributes are translatable
/// 3. **Segmenter** - Groups text and inline tags into messages and emits a segment stream plus resources
/// 4. **Message** - Minimizes a message to its `<cN>` form and inflates translations back to markup
/// 5. **Reassembler** - Joins the segments again with translations substituted
///
/// # Example
///
/// ```ignore
/// use loctool::html::HtmlFileType;
/// use loctool::config::ProjectConfig;
///
/// let file_type = HtmlFileType::new(ProjectConfig::new("webapp"));
/// let mut file = file_type.new_file("index.html");
/// file.parse("<p>Hello <b>world</b></p>")?;
/// // resource source: "Hello <c0>world</c0>"
/// let french = file.localize_text(&translations, "fr-FR");
/// ```
pub mod file;
pub mod file_type;
pub mod message;
pub mod reassembler;
pub mod scanner;
pub mod segment;
pub mod segmenter;
pub mod tags;


pub use file::HtmlFile;
pub use file_type::HtmlFileType;
pub use message::{LocalizableAttribute, Markup, Message, MessageAccumulator, Minimized, TagInfo};
pub use reassembler::{HTML_DATATYPE, Reassembler};
pub use scanner::{ScannedEvent, TagEvent, scan};
pub use segment::{Segment, SegmentStream};
pub use segmenter::{Extraction, HtmlSegmenter};
pub use tags::TagClassifier;
