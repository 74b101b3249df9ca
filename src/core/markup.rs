//! Markup toolbar operations and plain-text rendering of stored markup
//!
//! The formats and the markup they emit match the rich-text editor the books
//! were originally authored with, so saved content renders the same way
//! downstream.

use std::ops::Range;
use std::sync::OnceLock;

use regex_lite::Regex;

/// Colors offered by the color and background pickers
pub const PALETTE: [Rgb; 8] = [
    Rgb(0, 0, 0),
    Rgb(230, 0, 0),
    Rgb(255, 153, 0),
    Rgb(255, 255, 0),
    Rgb(0, 138, 0),
    Rgb(0, 102, 204),
    Rgb(153, 51, 255),
    Rgb(255, 255, 255),
];

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn css(self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub const ALL: [Alignment; 4] = [
        Alignment::Left,
        Alignment::Center,
        Alignment::Right,
        Alignment::Justify,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Alignment::Left => "Left",
            Alignment::Center => "Center",
            Alignment::Right => "Right",
            Alignment::Justify => "Justify",
        }
    }

    fn class(self) -> Option<&'static str> {
        match self {
            Alignment::Left => None,
            Alignment::Center => Some("ql-align-center"),
            Alignment::Right => Some("ql-align-right"),
            Alignment::Justify => Some("ql-align-justify"),
        }
    }
}

/// A toolbar action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    /// Header level, 1 or 2
    Header(u8),
    OrderedList,
    BulletList,
    Bold,
    Italic,
    Underline,
    Color(Rgb),
    Background(Rgb),
    Align(Alignment),
    Link(String),
    Image(String),
}

/// Result of applying a format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    /// Where the cursor goes afterwards, in chars
    pub cursor: usize,
}

/// Apply `format` to the chars in `selection`.
///
/// Inline formats wrap the selection and the cursor lands after the new
/// element; an empty selection inserts an empty element with the cursor
/// inside it. Links and images replace the selection; a link keeps the
/// selected text as its label, or uses the address when nothing is selected.
///
/// Headers, alignment and lists are line formats: they restyle every line the
/// selection touches. A line that already is a header or paragraph keeps its
/// content and has its tag or alignment replaced rather than nested.
pub fn apply(text: &str, selection: Range<usize>, format: &Format) -> Edit {
    let start = byte_offset(text, selection.start.min(selection.end));
    let end = byte_offset(text, selection.start.max(selection.end));

    match format {
        Format::Header(level) => {
            let tag = format!("h{}", (*level).clamp(1, 2));
            return restyle_lines(text, start..end, |block| {
                let toggled = if block.tag == tag { "p".to_string() } else { tag.clone() };
                Block { tag: toggled, ..block }
            });
        }
        Format::Align(alignment) => {
            return restyle_lines(text, start..end, |block| Block {
                class: alignment.class(),
                ..block
            });
        }
        Format::OrderedList => return make_list(text, start..end, "ol"),
        Format::BulletList => return make_list(text, start..end, "ul"),
        _ => {}
    }

    let selected = &text[start..end];
    let (open, close) = match format {
        Format::Bold => tags("strong"),
        Format::Italic => tags("em"),
        Format::Underline => tags("u"),
        Format::Color(rgb) => (
            format!("<span style=\"color: {};\">", rgb.css()),
            "</span>".to_string(),
        ),
        Format::Background(rgb) => (
            format!("<span style=\"background-color: {};\">", rgb.css()),
            "</span>".to_string(),
        ),
        Format::Link(href) => {
            let label = if selected.is_empty() { href.as_str() } else { selected };
            let element = format!(
                "<a href=\"{}\" rel=\"noopener noreferrer\" target=\"_blank\">{}</a>",
                escape_attribute(href),
                label
            );
            return splice(text, start..end, &element, None);
        }
        Format::Image(src) => {
            let element = format!("<img src=\"{}\">", escape_attribute(src));
            return splice(text, start..end, &element, None);
        }
        Format::Header(_) | Format::Align(_) | Format::OrderedList | Format::BulletList => {
            return Edit {
                text: text.to_string(),
                cursor: text[..end].chars().count(),
            };
        }
    };

    let element = format!("{}{}{}", open, selected, close);
    let cursor_inside = selected.is_empty().then(|| open.chars().count());
    splice(text, start..end, &element, cursor_inside)
}

/// Render stored markup as readable text for the book list
pub fn to_plain_text(markup: &str) -> String {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    static BLOCK_END: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();

    let brk = BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid pattern"));
    let block_end = BLOCK_END.get_or_init(|| {
        Regex::new(r"(?i)</(p|h[1-6]|li|ol|ul|div|blockquote|pre)\s*>").expect("valid pattern")
    });
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid pattern"));

    let text = brk.replace_all(markup, "\n");
    let text = block_end.replace_all(&text, "\n");
    let text = tag.replace_all(&text, "");
    let text = decode_entities(&text);

    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn tags(tag: &str) -> (String, String) {
    (format!("<{}>", tag), format!("</{}>", tag))
}

/// A single-line block element: `<tag class="...">inner</tag>`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Block<'a> {
    tag: String,
    class: Option<&'a str>,
    inner: &'a str,
}

impl<'a> Block<'a> {
    /// Read a line as a header or paragraph. Anything else is bare paragraph content.
    fn parse(line: &'a str) -> Self {
        static BLOCK: OnceLock<Regex> = OnceLock::new();
        let re = BLOCK.get_or_init(|| {
            Regex::new(r#"^<(h[1-6]|p)(?:\s+class="([^"]*)")?>(.*)</(h[1-6]|p)>$"#)
                .expect("valid pattern")
        });

        if let Some(caps) = re.captures(line) {
            let tag = &caps[1];
            let inner = caps.get(3).map_or("", |m| m.as_str());
            // `<p>a</p><p>b</p>` is two blocks, not one
            if tag == &caps[4] && !inner.contains(&format!("</{}>", tag)) {
                return Self {
                    tag: tag.to_string(),
                    class: caps.get(2).map(|m| m.as_str()),
                    inner,
                };
            }
        }

        Self {
            tag: "p".to_string(),
            class: None,
            inner: line,
        }
    }

    /// Markup plus the char offset of the content inside it
    fn render(&self) -> (String, usize) {
        let open = match self.class {
            Some(class) => format!("<{} class=\"{}\">", self.tag, class),
            None => format!("<{}>", self.tag),
        };
        let offset = open.chars().count();
        (format!("{}{}</{}>", open, self.inner, self.tag), offset)
    }
}

/// Byte range of the whole lines touched by `range`
fn line_bounds(text: &str, range: Range<usize>) -> Range<usize> {
    let mut end = range.end;
    // A selection ending right after a newline does not touch the next line
    if end > range.start && text[..end].ends_with('\n') {
        end -= 1;
    }
    let line_start = text[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    line_start..line_end
}

/// Apply a block rewrite to every line touched by `range`
fn restyle_lines<'a>(
    text: &'a str,
    range: Range<usize>,
    restyle: impl Fn(Block<'a>) -> Block<'a>,
) -> Edit {
    let bounds = line_bounds(text, range);
    let lines: Vec<&'a str> = text[bounds.clone()].split('\n').collect();

    let mut cursor_inside = None;
    let rendered: Vec<String> = lines
        .into_iter()
        .map(|line| {
            let block = restyle(Block::parse(line));
            let (markup, offset) = block.render();
            if block.inner.is_empty() {
                cursor_inside = Some(offset);
            }
            markup
        })
        .collect();

    let cursor_inside = if rendered.len() == 1 { cursor_inside } else { None };
    splice(text, bounds, &rendered.join("\n"), cursor_inside)
}

/// Turn the touched lines into one list of `tag`.
///
/// Lines that are already lists contribute their items. When every line is
/// already a list of the same kind the list is removed, one paragraph per item.
fn make_list(text: &str, range: Range<usize>, tag: &str) -> Edit {
    static LIST: OnceLock<Regex> = OnceLock::new();
    static ITEM: OnceLock<Regex> = OnceLock::new();
    let list_re =
        LIST.get_or_init(|| Regex::new(r"^<(ol|ul)>(.*)</(ol|ul)>$").expect("valid pattern"));
    let item_re =
        ITEM.get_or_init(|| Regex::new(r"<li(?:\s[^>]*)?>(.*?)</li>").expect("valid pattern"));

    let bounds = line_bounds(text, range);
    let mut items: Vec<&str> = Vec::new();
    let mut all_same_kind = true;

    for line in text[bounds.clone()].split('\n') {
        match list_re.captures(line) {
            Some(caps) if caps[1] == caps[3] => {
                if &caps[1] != tag {
                    all_same_kind = false;
                }
                let body = caps.get(2).map_or("", |m| m.as_str());
                items.extend(
                    item_re
                        .captures_iter(body)
                        .filter_map(|c| c.get(1).map(|m| m.as_str())),
                );
            }
            _ => {
                all_same_kind = false;
                items.push(Block::parse(line).inner);
            }
        }
    }

    if all_same_kind {
        let paragraphs: Vec<String> = items.iter().map(|item| format!("<p>{}</p>", item)).collect();
        return splice(text, bounds, &paragraphs.join("\n"), None);
    }

    let open = format!("<{}><li>", tag);
    let body: Vec<String> = items.iter().map(|item| format!("<li>{}</li>", item)).collect();
    let element = format!("<{}>{}</{}>", tag, body.concat(), tag);
    let cursor_inside = (items.len() == 1 && items[0].is_empty()).then(|| open.chars().count());
    splice(text, bounds, &element, cursor_inside)
}

fn splice(text: &str, range: Range<usize>, element: &str, cursor_inside: Option<usize>) -> Edit {
    let before = text[..range.start].chars().count();
    let mut result = String::with_capacity(text.len() + element.len());
    result.push_str(&text[..range.start]);
    result.push_str(element);
    result.push_str(&text[range.end..]);

    let cursor = before + cursor_inside.unwrap_or_else(|| element.chars().count());
    Edit {
        text: result,
        cursor,
    }
}

/// Byte index of the `char_index`th char, clamped to the end
fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_selection() {
        let edit = apply("say hello now", 4..9, &Format::Bold);
        assert_eq!(edit.text, "say <strong>hello</strong> now");
        assert_eq!(edit.cursor, "say <strong>hello</strong>".len());
    }

    #[test]
    fn test_reversed_selection() {
        let edit = apply("say hello now", 9..4, &Format::Italic);
        assert_eq!(edit.text, "say <em>hello</em> now");
    }

    #[test]
    fn test_empty_selection_places_cursor_inside() {
        let edit = apply("ab", 1..1, &Format::Underline);
        assert_eq!(edit.text, "a<u></u>b");
        assert_eq!(edit.cursor, "a<u>".len());
    }

    #[test]
    fn test_headers() {
        assert_eq!(apply("Title", 0..5, &Format::Header(1)).text, "<h1>Title</h1>");
        assert_eq!(apply("Title", 0..5, &Format::Header(2)).text, "<h2>Title</h2>");
        assert_eq!(apply("Title", 0..5, &Format::Header(7)).text, "<h2>Title</h2>");
    }

    #[test]
    fn test_lists() {
        let edit = apply("one\ntwo", 0..7, &Format::OrderedList);
        assert_eq!(edit.text, "<ol><li>one</li><li>two</li></ol>");

        let edit = apply("", 0..0, &Format::BulletList);
        assert_eq!(edit.text, "<ul><li></li></ul>");
        assert_eq!(edit.cursor, "<ul><li>".len());
    }

    #[test]
    fn test_header_covers_whole_line() {
        let edit = apply("say hello now", 4..9, &Format::Header(1));
        assert_eq!(edit.text, "<h1>say hello now</h1>");
        assert_eq!(edit.cursor, edit.text.chars().count());

        let edit = apply("intro\nsay hi\nend", 8..9, &Format::Header(2));
        assert_eq!(edit.text, "intro\n<h2>say hi</h2>\nend");
    }

    #[test]
    fn test_header_on_every_selected_line() {
        let edit = apply("a\nb\nc", 0..3, &Format::Header(1));
        assert_eq!(edit.text, "<h1>a</h1>\n<h1>b</h1>\nc");
    }

    #[test]
    fn test_header_replaces_existing_block() {
        let edit = apply("<h1>Title</h1>", 4..9, &Format::Header(2));
        assert_eq!(edit.text, "<h2>Title</h2>");

        let edit = apply("<p class=\"ql-align-right\">x</p>", 0..1, &Format::Header(1));
        assert_eq!(edit.text, "<h1 class=\"ql-align-right\">x</h1>");

        // Same level again turns the header off
        let edit = apply("<h1>Title</h1>", 4..9, &Format::Header(1));
        assert_eq!(edit.text, "<p>Title</p>");
    }

    #[test]
    fn test_empty_line_header_places_cursor_inside() {
        let edit = apply("", 0..0, &Format::Header(1));
        assert_eq!(edit.text, "<h1></h1>");
        assert_eq!(edit.cursor, "<h1>".len());
    }

    #[test]
    fn test_align_existing_header() {
        let inside = apply("<h1>Title</h1>", 4..9, &Format::Align(Alignment::Center));
        assert_eq!(inside.text, "<h1 class=\"ql-align-center\">Title</h1>");

        let whole = apply("<h1>Title</h1>", 0..14, &Format::Align(Alignment::Center));
        assert_eq!(whole.text, inside.text);

        let left = apply(&inside.text, 0..0, &Format::Align(Alignment::Left));
        assert_eq!(left.text, "<h1>Title</h1>");
    }

    #[test]
    fn test_list_converts_existing_blocks() {
        let edit = apply("<p>one</p>\n<h2>two</h2>", 2..14, &Format::OrderedList);
        assert_eq!(edit.text, "<ol><li>one</li><li>two</li></ol>");

        let edit = apply("<ol><li>a</li><li>b</li></ol>", 5..5, &Format::BulletList);
        assert_eq!(edit.text, "<ul><li>a</li><li>b</li></ul>");

        let edit = apply("<ul><li>a</li><li>b</li></ul>", 5..5, &Format::BulletList);
        assert_eq!(edit.text, "<p>a</p>\n<p>b</p>");
    }

    #[test]
    fn test_selection_ending_at_line_start() {
        let edit = apply("a\nb", 0..2, &Format::Header(1));
        assert_eq!(edit.text, "<h1>a</h1>\nb");
    }

    #[test]
    fn test_colors_and_alignment() {
        let edit = apply("red", 0..3, &Format::Color(Rgb(230, 0, 0)));
        assert_eq!(edit.text, "<span style=\"color: rgb(230, 0, 0);\">red</span>");

        let edit = apply("hi", 0..2, &Format::Background(Rgb(255, 255, 0)));
        assert_eq!(
            edit.text,
            "<span style=\"background-color: rgb(255, 255, 0);\">hi</span>"
        );

        let edit = apply("mid", 0..3, &Format::Align(Alignment::Center));
        assert_eq!(edit.text, "<p class=\"ql-align-center\">mid</p>");

        let edit = apply("left", 0..4, &Format::Align(Alignment::Left));
        assert_eq!(edit.text, "<p>left</p>");
    }

    #[test]
    fn test_link_and_image() {
        let edit = apply("see docs", 4..8, &Format::Link("https://x.test/?a=1&b=\"2\"".to_string()));
        assert_eq!(
            edit.text,
            "see <a href=\"https://x.test/?a=1&amp;b=&quot;2&quot;\" rel=\"noopener noreferrer\" target=\"_blank\">docs</a>"
        );

        let edit = apply("", 0..0, &Format::Link("https://x.test".to_string()));
        assert!(edit.text.ends_with(">https://x.test</a>"));
        assert_eq!(edit.cursor, edit.text.chars().count());

        let edit = apply("a b", 1..2, &Format::Image("pic.png".to_string()));
        assert_eq!(edit.text, "a<img src=\"pic.png\">b");
    }

    #[test]
    fn test_selection_uses_char_offsets() {
        let edit = apply("héllo wörld", 6..11, &Format::Bold);
        assert_eq!(edit.text, "héllo <strong>wörld</strong>");
        assert_eq!(edit.cursor, edit.text.chars().count());
    }

    #[test]
    fn test_selection_past_end_is_clamped() {
        let edit = apply("abc", 1..50, &Format::Bold);
        assert_eq!(edit.text, "a<strong>bc</strong>");
    }

    #[test]
    fn test_to_plain_text() {
        let markup = "<h1>Title</h1><p>Hello <strong>brave</strong> &amp; new<br>world</p>\
                      <ol><li>one</li><li>two</li></ol><p><br></p>";
        assert_eq!(
            to_plain_text(markup),
            "Title\nHello brave & new\nworld\none\ntwo"
        );
    }

    #[test]
    fn test_to_plain_text_of_plain_input() {
        assert_eq!(to_plain_text("just text"), "just text");
        assert_eq!(to_plain_text(""), "");
    }
}
