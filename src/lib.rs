//! Extraction of translatable strings from HTML files and generation of
//! localized copies of them.
//!
//! # Example
//!
//! ```ignore
//! use loctool::{HtmlFileType, ProjectConfig, TranslationSet};
//!
//! let file_type = HtmlFileType::new(ProjectConfig::new("webapp"));
//! let mut file = file_type.new_file("index.html");
//! file.parse("<p>This is a <b>test</b></p>")?;
//! for resource in file.translation_set().iter() {
//!     println!("{} {}", resource.key, resource.source);
//! }
//! let french = file.localize_text(&translations, "fr-FR");
//! ```
pub mod config;
pub mod error;
pub mod html;
pub mod pseudo;
pub mod resource;
pub mod text;
pub mod translation_set;

pub use config::{ProjectConfig, Settings};
pub use error::{LocError, LocResult};
pub use html::{HtmlFile, HtmlFileType, HtmlSegmenter, Reassembler, Segment, SegmentStream};
pub use pseudo::{DebugPseudo, PseudoTransform};
pub use resource::ResourceString;
pub use translation_set::{SharedTranslationSet, TranslationSet};
