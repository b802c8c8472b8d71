use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
///
/// CJK characters and emoji count as two columns, combining marks as zero.
///
/// ```
/// use newsdesk::util::display_width;
///
/// assert_eq!(display_width("Hello"), 5);
/// assert_eq!(display_width("\u{4f60}\u{597d}"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within `max_width` terminal columns.
///
/// Appends "..." when text was cut. Widths of three columns or less are
/// too narrow for an ellipsis, so the string is simply cut there. Returns
/// `Cow::Borrowed` when the string already fits.
///
/// ```
/// use newsdesk::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut used = 0;
    let mut cut = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        cut = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..cut].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
    }
}

fn is_stripped_control(b: u8) -> bool {
    b == 0x1b || b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r')
}

/// Strip terminal control characters and ANSI escape sequences.
///
/// Post titles and category names come from the server and are rendered
/// straight into the terminal. Tab, newline and carriage return survive.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if !bytes.iter().any(|&b| is_stripped_control(b)) {
        return Cow::Borrowed(s);
    }

    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        match bytes[i] {
            0x1b if bytes.get(i + 1) == Some(&b'[') => {
                // CSI: parameters until a final byte in 0x40..=0x7e
                i += 2;
                while i < len {
                    let c = bytes[i];
                    i += 1;
                    if (0x40..=0x7e).contains(&c) {
                        break;
                    }
                }
            }
            0x1b if bytes.get(i + 1) == Some(&b']') => {
                // OSC: until BEL or ESC \
                i += 2;
                while i < len {
                    if bytes[i] == 0x07 {
                        i += 1;
                        break;
                    }
                    if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            b if is_stripped_control(b) => i += 1,
            _ => {
                let start = i;
                while i < len && !is_stripped_control(bytes[i]) {
                    i += 1;
                }
                // Only ASCII bytes stop the run, so this is a char boundary
                out.push_str(&s[start..i]);
            }
        }
    }

    Cow::Owned(out)
}

/// Maximum characters of stripped post content shown as a summary.
pub const SUMMARY_CHARS: usize = 150;

/// Plain text of an HTML fragment: tags dropped, common entities decoded,
/// whitespace collapsed.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            _ => text.push(c),
        }
    }

    let decoded = decode_entities(&text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    const ENTITIES: &[(&str, &str)] = &[
        ("&nbsp;", " "),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&apos;", "'"),
        ("&amp;", "&"),
    ];
    let mut out = s.to_string();
    for (entity, replacement) in ENTITIES {
        out = out.replace(entity, replacement);
    }
    Cow::Owned(out)
}

/// Summary line for a post: the explicit summary when it has one, otherwise
/// the first 150 characters of its stripped content followed by "...".
///
/// ```
/// use newsdesk::util::post_summary;
///
/// assert_eq!(post_summary(Some("Given"), Some("<p>ignored</p>")), "Given");
/// assert_eq!(post_summary(None, Some("<p>Short <b>body</b></p>")), "Short body");
/// ```
pub fn post_summary(summary: Option<&str>, content: Option<&str>) -> String {
    if let Some(summary) = summary.filter(|s| !s.is_empty()) {
        return summary.to_string();
    }

    let plain = strip_html(content.unwrap_or_default());
    match plain.char_indices().nth(SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}{}", &plain[..cut], ELLIPSIS),
        None => plain,
    }
}

/// URL slug from a display name: lowercase, punctuation dropped, runs of
/// spaces, underscores and hyphens collapsed into one hyphen.
///
/// ```
/// use newsdesk::util::slugify;
///
/// assert_eq!(slugify("  Campus News & Events "), "campus-news-events");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '_' || c == '-' {
            pending_sep = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("Short", 10), "Short");
        assert_eq!(truncate_to_width("12345", 5), "12345");
    }

    #[test]
    fn test_wide_char_truncation() {
        let cjk = "\u{4f60}\u{597d}\u{4e16}\u{754c}";
        assert_eq!(truncate_to_width(cjk, 7), "\u{4f60}\u{597d}...");
        assert_eq!(truncate_to_width(cjk, 5), "\u{4f60}...");
        assert_eq!(truncate_to_width(cjk, 3), "\u{4f60}");
        assert_eq!(truncate_to_width(cjk, 1), "");
    }

    #[test]
    fn test_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
        assert_eq!(truncate_to_width("Testing", 4), "T...");
        assert_eq!(truncate_to_width("Hi", 3), "Hi");
    }

    #[test]
    fn test_strip_clean_text_is_borrowed() {
        let input = "line1\nline2\ttabbed\r\n";
        assert!(matches!(strip_control_chars(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_escape_sequences() {
        assert_eq!(strip_control_chars("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_control_chars("\x1b]0;title\x07safe"), "safe");
        assert_eq!(strip_control_chars("\x1b]0;title\x1b\\safe"), "safe");
        assert_eq!(strip_control_chars("a\x00b\x7fc\x1bd"), "abcd");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Dhaka&nbsp;<b>University</b></p>\n<p>news &amp; views</p>"),
            "Dhaka University news & views"
        );
        assert_eq!(strip_html(""), "");
        assert_eq!(strip_html("no tags"), "no tags");
    }

    #[test]
    fn test_summary_prefers_explicit_summary() {
        assert_eq!(post_summary(Some("Summary"), Some("<p>Body</p>")), "Summary");
        // Empty summary falls back to content
        assert_eq!(post_summary(Some(""), Some("<p>Body</p>")), "Body");
    }

    #[test]
    fn test_summary_truncates_at_150_chars() {
        let body = format!("<p>{}</p>", "a".repeat(200));
        let summary = post_summary(None, Some(&body));
        assert_eq!(summary, format!("{}...", "a".repeat(150)));

        let exact = "b".repeat(150);
        assert_eq!(post_summary(None, Some(&exact)), exact);
    }

    #[test]
    fn test_summary_counts_chars_not_bytes() {
        let bengali = "\u{0995}".repeat(151);
        let summary = post_summary(None, Some(&bengali));
        assert_eq!(summary.chars().count(), 153);
    }

    #[test]
    fn test_summary_without_content() {
        assert_eq!(post_summary(None, None), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("--Sports__&  Games--"), "sports-games");
        assert_eq!(slugify("!!!"), "");
    }
}
