//! HTML artifact to plain text
//!
//! Captured `html` artifacts are converted to text before normalization:
//! script and style blocks are removed, remaining tags are stripped, and
//! character entities are unescaped. Layout fidelity is not a goal; the
//! normalizer collapses whatever whitespace this leaves behind.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap()
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#x?[0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").unwrap());

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let body = entity.strip_prefix('#')?;
            let code = match body.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => body.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

/// Strip tags and unescape entities, leaving raw text for the normalizer.
pub fn html_to_text(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_scripts, " ");
    ENTITY_RE
        .replace_all(&without_tags, |caps: &regex::Captures<'_>| {
            // Unknown entities survive verbatim.
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_tags_become_whitespace() {
        let text = html_to_text("<p>Stocks <b>fell</b> 3%.</p>");
        assert_eq!(normalize(&text), "Stocks fell 3%.");
    }

    #[test]
    fn test_scripts_and_styles_are_dropped() {
        let html = "<html><head><style>p { color: red; }</style>\
                    <script type=\"text/javascript\">var x = 1 < 2;</script></head>\
                    <body><p>Visible text.</p></body></html>";
        assert_eq!(normalize(&html_to_text(html)), "Visible text.");
    }

    #[test]
    fn test_named_entities_unescape() {
        let text = html_to_text("Profits &amp; losses &lt;booked&gt; &quot;today&quot;");
        assert_eq!(normalize(&text), "Profits & losses <booked> \"today\"");
    }

    #[test]
    fn test_numeric_entities_unescape() {
        assert_eq!(html_to_text("&#65;&#x42;"), "AB");
        assert_eq!(html_to_text("caf&#233;"), "café");
    }

    #[test]
    fn test_unknown_entities_survive() {
        assert_eq!(html_to_text("&unknown; stays"), "&unknown; stays");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(html_to_text("no markup here"), "no markup here");
    }
}
