//! HTML to plain text. A few regexes, not a parser.

use regex_lite::Regex;

/// Compiled patterns for turning markup into readable text.
#[derive(Debug, Clone)]
pub struct HtmlText {
    hidden: Regex,
    tag: Regex,
    space: Regex,
}

impl HtmlText {
    pub fn new() -> Result<Self, regex_lite::Error> {
        Ok(Self {
            hidden: Regex::new(
                r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<!--.*?-->",
            )?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
            space: Regex::new(r"\s+")?,
        })
    }

    /// Strip tags, drop script/style bodies, decode common entities and
    /// collapse whitespace.
    pub fn to_text(&self, html: &str) -> String {
        let visible = self.hidden.replace_all(html, " ");
        let text = self.tag.replace_all(&visible, " ");
        let decoded = decode_entities(&text);
        self.space.replace_all(&decoded, " ").trim().to_string()
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Keep at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].to_string(),
        None => s.to_string(),
    }
}
