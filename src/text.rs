//! Plain-text extraction from the HTML fragments found in feed fields.
//!
//! Feeds routinely put markup in `<title>` and `<description>` (bold tags,
//! paragraphs, `&amp;`-style entities).  [`normalize`] turns such a fragment
//! into a single line of display text.  It is deliberately forgiving: input
//! that is not well-formed HTML is kept as literal text instead of rejected.

/// Tags that start a new line when rendered, so their boundaries become spaces
/// rather than gluing neighbouring words together.
const BLOCK_TAGS: &[&str] = &[
    "br", "p", "div", "li", "ul", "ol", "tr", "td", "h1", "h2", "h3", "h4", "h5", "h6",
    "blockquote", "pre", "hr",
];

/// Tags whose content is never displayed.
const HIDDEN_TAGS: &[&str] = &["script", "style"];

/// Strip markup, decode entities, flatten newlines and collapse whitespace.
///
/// Never fails.  A `<` that does not open a recognisable tag (or has no
/// closing `>`) is passed through as text.
pub fn normalize(raw: &str) -> String {
    let stripped = strip_tags(raw);
    let decoded = html_escape::decode_html_entities(&stripped);
    collapse_whitespace(&decoded)
}

fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let Some(tag_len) = tag_length(candidate) else {
            // Not a tag: keep the `<` literally and move on.
            out.push('<');
            rest = &candidate[1..];
            continue;
        };

        let tag = &candidate[..tag_len];
        let name = tag_name(tag);
        rest = &candidate[tag_len..];

        if HIDDEN_TAGS.contains(&name.as_str()) && !tag.starts_with("</") {
            rest = skip_hidden_block(rest, &name);
            continue;
        }
        if BLOCK_TAGS.contains(&name.as_str()) {
            out.push('\n');
        }
    }
    out.push_str(rest);
    out
}

/// Byte length of the tag at the start of `s`, or `None` if `s` does not
/// begin with something that looks like a tag.
fn tag_length(s: &str) -> Option<usize> {
    let next = s[1..].chars().next()?;
    if !(next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?')) {
        return None;
    }
    s.find('>').map(|end| end + 1)
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Everything up to and including the closing tag.  An unclosed block hides
/// the rest of the input, as in a browser.
fn skip_hidden_block<'a>(rest: &'a str, name: &str) -> &'a str {
    let close = format!("</{name}");
    match rest.to_ascii_lowercase().find(&close) {
        Some(pos) => {
            let after = &rest[pos..];
            after.find('>').map_or("", |end| &after[end + 1..])
        }
        None => "",
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.replace('\n', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_flattens_newlines() {
        assert_eq!(normalize("<b>Hi</b>\nThere"), "Hi There");
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(normalize("Tom &amp; Jerry &#8212; &quot;live&quot;"), "Tom & Jerry \u{2014} \"live\"");
    }

    #[test]
    fn escaped_markup_is_decoded_to_literal_text() {
        // Entities are decoded after tags are stripped, so escaped markup
        // survives as visible text.
        assert_eq!(normalize("&lt;b&gt;bold&lt;/b&gt;"), "<b>bold</b>");
    }

    #[test]
    fn block_tags_separate_words() {
        assert_eq!(normalize("<p>one</p><p>two</p>three<br/>four"), "one two three four");
    }

    #[test]
    fn collapses_runs_of_whitespace_and_trims() {
        assert_eq!(normalize("  a \t\t b \r\n\n c  "), "a b c");
    }

    #[test]
    fn script_and_style_content_is_dropped() {
        assert_eq!(
            normalize("before<script>alert('x')</script><style>p{}</style>after"),
            "beforeafter"
        );
    }

    #[test]
    fn unclosed_script_hides_the_rest() {
        assert_eq!(normalize("lead <script>var x = 1; trailing text"), "lead");
        assert_eq!(normalize("lead <STYLE>p{} more"), "lead");
        assert_eq!(normalize("lead <script>x</script trailing"), "lead");
    }

    #[test]
    fn stray_angle_bracket_is_kept() {
        assert_eq!(normalize("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn unterminated_tag_is_kept_as_text() {
        assert_eq!(normalize("broken <b unterminated"), "broken <b unterminated");
    }

    #[test]
    fn unknown_entity_passes_through() {
        assert_eq!(normalize("fish &chips; ok"), "fish &chips; ok");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n  "), "");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
