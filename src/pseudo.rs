//! Pseudo-localization.
//!
//! A pseudo transform rewrites source text so that untranslated or
//! truncation-prone strings stand out when the product is run in a pseudo
//! locale. The debug transform accents every ASCII letter, lengthens the text
//! and brackets it:
//!
//! ```ignore
//! use loctool::pseudo::{DebugPseudo, PseudoTransform};
//!
//! let pseudo = DebugPseudo::new("en-US");
//! assert_eq!(pseudo.get_string("I am a Blues Traveler"), "[Ï àm à ßľüëš Ťŕàvëľëŕ6543210]");
//! ```

/// A string transform applied when no real translation is available.
pub trait PseudoTransform: Send + Sync + std::fmt::Debug {
    /// Transform the source text.
    fn get_string(&self, source: &str) -> String;

    /// Locale whose text is fed into the transform. When it differs from the
    /// project's source locale, the translation into this locale is transformed
    /// instead of the source string.
    fn pseudo_source_locale(&self) -> &str;
}

/// How markup inside the text is recognized so it can be left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoDatatype {
    /// Skip `<tags>` and `&entities;`
    Html,
    /// Skip `{replacement}` parameters
    Text,
}

/// The accent-and-lengthen debug transform
#[derive(Debug, Clone)]
pub struct DebugPseudo {
    source_locale: String,
    datatype: PseudoDatatype,
}

impl DebugPseudo {
    pub fn new(source_locale: &str) -> Self {
        DebugPseudo {
            source_locale: source_locale.to_string(),
            datatype: PseudoDatatype::Html,
        }
    }

    pub fn with_datatype(mut self, datatype: PseudoDatatype) -> Self {
        self.datatype = datatype;
        self
    }

    /// Index of the character closing the markup that starts at `start`, if any.
    fn markup_end(&self, chars: &[char], start: usize) -> Option<usize> {
        let rest = chars.get(start + 1..)?;
        let offset = match (self.datatype, chars[start]) {
            (PseudoDatatype::Html, '<') => rest.iter().position(|&c| c == '>'),
            (PseudoDatatype::Html, '&') => rest
                .iter()
                .position(|&c| !(c.is_ascii_alphanumeric() || c == '#'))
                .filter(|&pos| pos > 0 && rest[pos] == ';'),
            (_, '{') => rest.iter().position(|&c| c == '}'),
            _ => None,
        };
        offset.map(|pos| start + 1 + pos)
    }
}

fn accent(c: char) -> char {
    match c {
        'a' => 'à',
        'c' => 'ç',
        'd' => 'ð',
        'e' => 'ë',
        'g' => 'ğ',
        'h' => 'ĥ',
        'i' => 'í',
        'j' => 'ĵ',
        'k' => 'ķ',
        'l' => 'ľ',
        'n' => 'ñ',
        'o' => 'õ',
        'p' => 'þ',
        'r' => 'ŕ',
        's' => 'š',
        't' => 'ţ',
        'u' => 'ü',
        'w' => 'ŵ',
        'y' => 'ÿ',
        'z' => 'ž',
        'A' => 'Ã',
        'B' => 'ß',
        'C' => 'Ç',
        'D' => 'Ð',
        'E' => 'Ë',
        'G' => 'Ĝ',
        'H' => 'Ħ',
        'I' => 'Ï',
        'J' => 'Ĵ',
        'K' => 'Ķ',
        'L' => 'Ľ',
        'N' => 'Ň',
        'O' => 'Ø',
        'R' => 'Ŗ',
        'S' => 'Š',
        'T' => 'Ť',
        'U' => 'Ú',
        'W' => 'Ŵ',
        'Y' => 'Ŷ',
        'Z' => 'Ż',
        other => other,
    }
}

/// Number of padding digits added to a string of `len` characters,
/// rounding halves up.
fn padding_for(len: usize) -> usize {
    let divisor = if len <= 20 {
        2
    } else if len <= 40 {
        3
    } else {
        5
    };
    (2 * len + divisor) / (2 * divisor)
}

impl PseudoTransform for DebugPseudo {
    fn get_string(&self, source: &str) -> String {
        let chars: Vec<char> = source.chars().collect();
        let mut result = String::with_capacity(source.len() * 2);
        let mut i = 0;
        while i < chars.len() {
            match self.markup_end(&chars, i) {
                Some(end) => {
                    result.extend(&chars[i..=end]);
                    i = end + 1;
                }
                None => {
                    result.push(accent(chars[i]));
                    i += 1;
                }
            }
        }

        let padding = padding_for(result.chars().count());
        let digits: String = (0..padding)
            .rev()
            .map(|n| char::from(b'0' + (n % 10) as u8))
            .collect();
        format!("[{}{}]", result, digits)
    }

    fn pseudo_source_locale(&self) -> &str {
        &self.source_locale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_pseudo_short_string() {
        let pseudo = DebugPseudo::new("en-US");
        assert_eq!(
            pseudo.get_string("I am a Blues Traveler"),
            "[Ï àm à ßľüëš Ťŕàvëľëŕ6543210]"
        );
        assert_eq!(pseudo.get_string("GLOBALIZATION"), "[ĜĽØßÃĽÏŻÃŤÏØŇ6543210]");
        assert_eq!(pseudo.get_string("Test phrase"), "[Ťëšţ þĥŕàšë543210]");
        assert_eq!(pseudo.get_string("In Person Mode"), "[Ïñ Pëŕšõñ Mõðë6543210]");
    }

    #[test]
    fn test_debug_pseudo_skips_replacement_params() {
        let pseudo = DebugPseudo::new("en-US").with_datatype(PseudoDatatype::Text);
        assert_eq!(
            pseudo.get_string("Skip the unflavored {estrogen} supplements."),
            "[Šķíþ ţĥë üñfľàvõŕëð {estrogen} šüþþľëmëñţš.876543210]"
        );
    }

    #[test]
    fn test_debug_pseudo_skips_html() {
        let pseudo = DebugPseudo::new("en-US");
        assert_eq!(
            pseudo.get_string("Skip the unflavored <span name=\"estrogen\">supplements</a>."),
            "[Šķíþ ţĥë üñfľàvõŕëð <span name=\"estrogen\">šüþþľëmëñţš</a>.109876543210]"
        );
        assert_eq!(pseudo.get_string("a &amp; b"), "[à &amp; b43210]");
        assert_eq!(pseudo.get_string("Tom & Jerry"), "[Ťõm & Ĵëŕŕÿ543210]");
    }

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(11), 6);
        assert_eq!(padding_for(21), 7);
        assert_eq!(padding_for(41), 8);
        assert_eq!(padding_for(58), 12);
    }

    #[test]
    fn test_pseudo_source_locale() {
        let pseudo = DebugPseudo::new("en-GB");
        assert_eq!(pseudo.pseudo_source_locale(), "en-GB");
    }
}
