use crate::entity::ListItem;
use crate::entity::Markdown;
use crate::entity::MarkdownInline;
use crate::entity::MarkdownText;

pub fn translate(md: Vec<Markdown>) -> String {
    translate_blocks(&md)
}

fn translate_blocks(md: &[Markdown]) -> String {
    md.iter().map(translate_block).collect::<Vec<String>>().join("")
}

fn translate_block(block: &Markdown) -> String {
    match block {
        Markdown::Heading(size, line) => translate_header(*size, line),
        Markdown::Paragraph(lines) => translate_paragraph(lines),
        Markdown::Blockquote(blocks) => translate_blockquote(blocks),
        Markdown::UnorderedList(items) => translate_unordered_list(items),
        Markdown::OrderedList(start, items) => translate_ordered_list(*start, items),
        Markdown::Codeblock(lang, code) => translate_codeblock(lang, code),
        Markdown::HorizontalRule => String::from("<hr>"),
    }
}

fn translate_header(size: usize, text: &MarkdownText) -> String {
    let size = size.clamp(1, 6);
    format!("<h{}>{}</h{}>", size, translate_text(text), size)
}

fn translate_paragraph(lines: &[MarkdownText]) -> String {
    let body = lines
        .iter()
        .map(translate_text)
        .collect::<Vec<String>>()
        .join("<br>");
    format!("<p>{}</p>", body)
}

fn translate_blockquote(blocks: &[Markdown]) -> String {
    format!("<blockquote>{}</blockquote>", translate_blocks(blocks))
}

fn translate_unordered_list(items: &[ListItem]) -> String {
    format!("<ul>{}</ul>", translate_list_items(items))
}

fn translate_ordered_list(start: Option<u64>, items: &[ListItem]) -> String {
    match start {
        Some(n) => format!("<ol start=\"{}\">{}</ol>", n, translate_list_items(items)),
        None => format!("<ol>{}</ol>", translate_list_items(items)),
    }
}

fn translate_list_items(items: &[ListItem]) -> String {
    items.iter().map(translate_list_element).collect::<Vec<String>>().join("")
}

fn translate_list_element(item: &ListItem) -> String {
    match item.task {
        Some(checked) => format!(
            "<li class=\"task-list-item\"><input type=\"checkbox\" disabled{}> {}</li>",
            if checked { " checked" } else { "" },
            translate_text(&item.text)
        ),
        None => format!("<li>{}</li>", translate_text(&item.text)),
    }
}

fn translate_codeblock(lang: &str, code: &str) -> String {
    if lang.is_empty() {
        format!("<pre><code>{}</code></pre>", escape_html(code))
    } else {
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape_attr(lang),
            escape_html(code)
        )
    }
}

fn translate_text(text: &MarkdownText) -> String {
    text.iter().map(translate_inline).collect::<Vec<String>>().join("")
}

fn translate_inline(inline: &MarkdownInline) -> String {
    match inline {
        MarkdownInline::Plaintext(s) => escape_html(s),
        MarkdownInline::InlineCode(code) => format!("<code>{}</code>", escape_html(code)),
        MarkdownInline::Bold(text) => format!("<strong>{}</strong>", translate_text(text)),
        MarkdownInline::Italic(text) => format!("<em>{}</em>", translate_text(text)),
        MarkdownInline::Strike(text) => format!("<del>{}</del>", translate_text(text)),
        MarkdownInline::Link(text, url) => translate_link(text, url),
        MarkdownInline::Image(alt, url) => translate_image(alt, url),
    }
}

// External targets open outside the preview; the host intercepts `_blank`.
fn translate_link(text: &MarkdownText, url: &str) -> String {
    if is_external_link(url) {
        format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            escape_attr(url),
            translate_text(text)
        )
    } else {
        format!("<a href=\"{}\">{}</a>", escape_attr(url), translate_text(text))
    }
}

fn translate_image(alt: &str, url: &str) -> String {
    format!("<img alt=\"{}\" src=\"{}\">", escape_attr(alt), escape_attr(url))
}

/// `http` and `https` URLs, matched case-insensitively.
pub fn is_external_link(url: &str) -> bool {
    let url = url.trim_start();
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn escape_attr(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wraps a rendered fragment into a standalone HTML document.
pub fn page(body: &str, title: &str, stylesheet: Option<&str>) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    if let Some(href) = stylesheet {
        html.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n",
            escape_attr(href)
        ));
    }
    html.push_str("</head>\n<body>\n");
    html.push_str(body);
    html.push_str("\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use crate::entity::*;
    use crate::translator::*;
    use pretty_assertions::assert_eq;

    fn plain(s: &str) -> MarkdownInline {
        MarkdownInline::Plaintext(String::from(s))
    }

    #[test]
    fn test_translate_inline() {
        assert_eq!(translate_inline(&plain("a < b & c")), "a &lt; b &amp; c");
        assert_eq!(
            translate_inline(&MarkdownInline::InlineCode(String::from("<div>"))),
            "<code>&lt;div&gt;</code>"
        );
        assert_eq!(
            translate_inline(&MarkdownInline::Bold(vec![
                plain("a "),
                MarkdownInline::Italic(vec![plain("b")]),
            ])),
            "<strong>a <em>b</em></strong>"
        );
        assert_eq!(
            translate_inline(&MarkdownInline::Image(
                String::from("say \"hi\""),
                String::from("a.png")
            )),
            "<img alt=\"say &quot;hi&quot;\" src=\"a.png\">"
        );
    }

    #[test]
    fn test_translate_link() {
        assert_eq!(
            translate_link(&vec![plain("x")], "https://example.com/?a=1&b=2"),
            "<a href=\"https://example.com/?a=1&amp;b=2\" target=\"_blank\" rel=\"noopener noreferrer\">x</a>"
        );
        assert_eq!(
            translate_link(&vec![plain("x")], "notes.md\" onclick=\"evil()"),
            "<a href=\"notes.md&quot; onclick=&quot;evil()\">x</a>"
        );
    }

    #[test]
    fn test_is_external_link() {
        assert!(is_external_link("http://example.com"));
        assert!(is_external_link("HTTPS://example.com"));
        assert!(!is_external_link("notes.md"));
        assert!(!is_external_link("mailto:a@b.c"));
        assert!(!is_external_link("http"));
        assert!(!is_external_link("ht\u{e9}tp://x"));
    }

    #[test]
    fn test_translate_lists() {
        assert_eq!(
            translate(vec![Markdown::OrderedList(
                Some(3),
                vec![ListItem::plain(vec![plain("c")])]
            )]),
            "<ol start=\"3\"><li>c</li></ol>"
        );
        assert_eq!(
            translate(vec![Markdown::UnorderedList(vec![
                ListItem::task(true, vec![plain("done")]),
                ListItem::plain(vec![plain("other")]),
            ])]),
            "<ul><li class=\"task-list-item\"><input type=\"checkbox\" disabled checked> done</li><li>other</li></ul>"
        );
    }

    #[test]
    fn test_translate_codeblock() {
        assert_eq!(
            translate_codeblock("", "<b>&\n"),
            "<pre><code>&lt;b&gt;&amp;\n</code></pre>"
        );
        assert_eq!(
            translate_codeblock("c\"s", "x\n"),
            "<pre><code class=\"language-c&quot;s\">x\n</code></pre>"
        );
    }

    #[test]
    fn test_page() {
        assert_eq!(
            page("<p>x</p>", "A & B", Some("style.css")),
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>A &amp; B</title>\n<link rel=\"stylesheet\" href=\"style.css\">\n</head>\n<body>\n<p>x</p>\n</body>\n</html>\n"
        );
    }
}
