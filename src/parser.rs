use crate::entity::ListItem;
use crate::entity::Markdown;
use crate::entity::MarkdownInline;
use crate::entity::MarkdownText;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take, take_until, take_while1, take_while_m_n},
    character::complete::{char, digit1, line_ending, not_line_ending, one_of, space0},
    combinator::{eof, map, not, opt, peek, recognize, value, verify},
    error::ErrorKind,
    multi::{many0, many1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// Quotes nested deeper than this are kept as literal paragraph text.
const MAX_QUOTE_DEPTH: usize = 16;

/// Unifies line endings to `\n` and guarantees a trailing newline, which
/// every line parser below relies on.
pub fn normalize(i: &str) -> String {
    let mut content = i.replace("\r\n", "\n").replace('\r', "\n");
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

/// Parses a whole document. Never fails: anything the block grammar leaves
/// behind becomes a trailing paragraph.
pub fn parse_document(i: &str) -> Vec<Markdown> {
    parse_document_at(i, 0)
}

fn parse_document_at(i: &str, depth: usize) -> Vec<Markdown> {
    match parse_blocks(i, depth) {
        Ok((rest, mut blocks)) => {
            if !rest.is_empty() {
                blocks.push(leftover(rest));
            }
            blocks
        }
        Err(_) => vec![leftover(i)],
    }
}

fn leftover(i: &str) -> Markdown {
    Markdown::Paragraph(i.lines().map(parse_markdown_text).collect())
}

fn parse_blocks(i: &str, depth: usize) -> IResult<&str, Vec<Markdown>> {
    map(
        many0(alt((
            map(parse_blank_line, |_| None),
            map(|i| parse_block(i, depth), Some),
        ))),
        |blocks: Vec<Option<Markdown>>| blocks.into_iter().flatten().collect(),
    )(i)
}

fn parse_block(i: &str, depth: usize) -> IResult<&str, Markdown> {
    alt((
        map(parse_code_block, |(lang, code)| {
            Markdown::Codeblock(lang.to_string(), code.to_string())
        }),
        map(parse_header, |e| Markdown::Heading(e.0, e.1)),
        map(parse_horizontal_rule, |_| Markdown::HorizontalRule),
        map(|i| parse_blockquote(i, depth), Markdown::Blockquote),
        map(parse_unordered_list, Markdown::UnorderedList),
        map(parse_ordered_list, |(start, items)| {
            Markdown::OrderedList(start, items)
        }),
        map(parse_paragraph, Markdown::Paragraph),
    ))(i)
}

fn parse_line(i: &str) -> IResult<&str, &str> {
    terminated(not_line_ending, line_ending)(i)
}

fn parse_inline_line(i: &str) -> IResult<&str, MarkdownText> {
    map(parse_line, parse_markdown_text)(i)
}

fn parse_blank_line(i: &str) -> IResult<&str, &str> {
    recognize(pair(space0, line_ending))(i)
}

fn parse_horizontal_rule(i: &str) -> IResult<&str, &str> {
    terminated(
        verify(take_while1(|c| c == '-'), |s: &str| s.len() >= 3),
        pair(space0, line_ending),
    )(i)
}

fn parse_strong_emphasis(i: &str) -> IResult<&str, &str> {
    delimited(
        tag("***"),
        verify(take_until("***"), |s: &str| !s.is_empty()),
        tag("***"),
    )(i)
}

fn parse_boldtext(i: &str) -> IResult<&str, &str> {
    delimited(
        tag("**"),
        verify(take_until("**"), |s: &str| !s.is_empty()),
        tag("**"),
    )(i)
}

fn parse_italics(i: &str) -> IResult<&str, &str> {
    delimited(
        tag("*"),
        verify(is_not("*"), |s: &str| {
            !s.starts_with(char::is_whitespace) && !s.ends_with(char::is_whitespace)
        }),
        tag("*"),
    )(i)
}

fn parse_strike(i: &str) -> IResult<&str, &str> {
    delimited(
        tag("~~"),
        verify(take_until("~~"), |s: &str| !s.is_empty()),
        tag("~~"),
    )(i)
}

fn parse_inline_code(i: &str) -> IResult<&str, &str> {
    delimited(tag("`"), is_not("`"), tag("`"))(i)
}

/// Where every `[` of a line closes, counting nested pairs, and where the
/// next `)` sits. Link and image attempts look these up instead of scanning
/// ahead, so a line full of unmatched brackets stays linear.
struct LinkIndex<'a> {
    line: &'a str,
    closing: Vec<Option<usize>>,
    next_paren: Vec<Option<usize>>,
}

impl<'a> LinkIndex<'a> {
    fn new(line: &'a str) -> Self {
        let bytes = line.as_bytes();
        let mut closing = vec![None; bytes.len()];
        let mut open = Vec::new();
        let mut escaped = false;
        for (pos, &b) in bytes.iter().enumerate() {
            if escaped {
                escaped = false;
                continue;
            }
            match b {
                b'\\' => escaped = true,
                b'[' => open.push(pos),
                b']' => {
                    if let Some(start) = open.pop() {
                        closing[start] = Some(pos);
                    }
                }
                _ => {}
            }
        }

        let mut next_paren = vec![None; bytes.len() + 1];
        for pos in (0..bytes.len()).rev() {
            next_paren[pos] = if bytes[pos] == b')' {
                Some(pos)
            } else {
                next_paren[pos + 1]
            };
        }

        LinkIndex {
            line,
            closing,
            next_paren,
        }
    }

    /// Splits `[text](url)` at the start of `i`, which must be a suffix of
    /// the indexed line. Returns the text, the url and what follows.
    fn bracketed(&self, i: &'a str) -> Option<(&'a str, &'a str, &'a str)> {
        let open = self.line.len().checked_sub(i.len())?;
        let close = self.closing.get(open).copied().flatten()?;
        let paren = close + 1;
        if self.line.as_bytes().get(paren) != Some(&b'(') {
            return None;
        }
        let end = self.next_paren.get(paren + 1).copied().flatten()?;
        if end == paren + 1 {
            return None;
        }
        Some((
            &self.line[open + 1..close],
            &self.line[paren + 1..end],
            &self.line[end + 1..],
        ))
    }
}

fn not_bracketed(i: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(i, ErrorKind::Tag))
}

fn parse_link<'a>(i: &'a str, index: &LinkIndex<'a>) -> IResult<&'a str, (&'a str, &'a str)> {
    match index.bracketed(i) {
        Some((text, url, rest)) if !text.is_empty() => Ok((rest, (text, url))),
        _ => Err(not_bracketed(i)),
    }
}

fn parse_image<'a>(i: &'a str, index: &LinkIndex<'a>) -> IResult<&'a str, (&'a str, &'a str)> {
    let (i, _) = tag("!")(i)?;
    match index.bracketed(i) {
        Some((alt, url, rest)) => Ok((rest, (alt, url))),
        None => Err(not_bracketed(i)),
    }
}

fn parse_escaped_char(i: &str) -> IResult<&str, char> {
    preceded(char('\\'), one_of("\\`*_{}[]()#+-.!~>|"))(i)
}

// Runs of characters that cannot open a span. A lone `!` is plain text;
// only `![` starts an image.
fn parse_plaintext(i: &str) -> IResult<&str, &str> {
    recognize(many1(alt((
        is_not("*`~[!\\"),
        terminated(tag("!"), not(tag("["))),
    ))))(i)
}

// Link text is parsed with `links` off: it may hold images and emphasis
// but never another link.
fn parse_markdown_inline<'a>(
    i: &'a str,
    index: &LinkIndex<'a>,
    links: bool,
) -> IResult<&'a str, MarkdownInline> {
    alt((
        map(parse_escaped_char, |c| MarkdownInline::Plaintext(c.to_string())),
        map(parse_inline_code, |s: &str| {
            MarkdownInline::InlineCode(s.to_string())
        }),
        map(|i| parse_image(i, index), |(alt, url): (&str, &str)| {
            MarkdownInline::Image(alt.to_string(), url.trim().to_string())
        }),
        map(
            verify(|i| parse_link(i, index), |_: &(&str, &str)| links),
            |(text, url): (&str, &str)| {
                MarkdownInline::Link(parse_inlines(text, false), url.trim().to_string())
            },
        ),
        map(parse_strong_emphasis, |s: &str| {
            MarkdownInline::Bold(vec![MarkdownInline::Italic(parse_inlines(s, links))])
        }),
        map(parse_boldtext, |s: &str| {
            MarkdownInline::Bold(parse_inlines(s, links))
        }),
        map(parse_strike, |s: &str| {
            MarkdownInline::Strike(parse_inlines(s, links))
        }),
        map(parse_italics, |s: &str| {
            MarkdownInline::Italic(parse_inlines(s, links))
        }),
        map(parse_plaintext, |s: &str| {
            MarkdownInline::Plaintext(s.to_string())
        }),
        // an unmatched delimiter is literal text
        map(take(1usize), |s: &str| MarkdownInline::Plaintext(s.to_string())),
    ))(i)
}

/// Parses the inline content of a single line. Total: unmatched delimiters
/// fall back to literal text, and adjacent text runs are merged.
pub fn parse_markdown_text(i: &str) -> MarkdownText {
    parse_inlines(i, true)
}

fn parse_inlines(i: &str, links: bool) -> MarkdownText {
    let index = LinkIndex::new(i);
    let result = match many0(|i| parse_markdown_inline(i, &index, links))(i) {
        Ok((_, inlines)) => merge_plaintext(inlines),
        Err(_) => vec![MarkdownInline::Plaintext(i.to_string())],
    };
    result
}

fn merge_plaintext(inlines: Vec<MarkdownInline>) -> MarkdownText {
    let mut merged: MarkdownText = Vec::with_capacity(inlines.len());
    for inline in inlines {
        if let MarkdownInline::Plaintext(s) = &inline {
            if let Some(MarkdownInline::Plaintext(prev)) = merged.last_mut() {
                prev.push_str(s);
                continue;
            }
        }
        merged.push(inline);
    }
    merged
}

// this guy matches 1 to 6 of the literal character #
fn parse_header_tag(i: &str) -> IResult<&str, usize> {
    map(
        terminated(take_while_m_n(1, 6, |c| c == '#'), tag(" ")),
        |s: &str| s.len(),
    )(i)
}

// `# Title ##` keeps only `Title`; `# C#` is left alone
fn strip_closing_sequence(line: &str) -> &str {
    let line = line.trim_end();
    let stripped = line.trim_end_matches('#');
    if stripped.len() == line.len() {
        line
    } else if stripped.is_empty() || stripped.ends_with(' ') {
        stripped.trim_end()
    } else {
        line
    }
}

// this combines a tuple of the header tag and the rest of the line
fn parse_header(i: &str) -> IResult<&str, (usize, MarkdownText)> {
    tuple((
        parse_header_tag,
        map(parse_line, |line| {
            parse_markdown_text(strip_closing_sequence(line))
        }),
    ))(i)
}

fn parse_unordered_list_tag(i: &str) -> IResult<&str, &str> {
    terminated(alt((tag("-"), tag("*"), tag("+"))), tag(" "))(i)
}

fn parse_task_tag(i: &str) -> IResult<&str, bool> {
    alt((
        value(false, tag("[ ] ")),
        value(true, tag("[x] ")),
        value(true, tag("[X] ")),
    ))(i)
}

fn parse_unordered_list_element(i: &str) -> IResult<&str, ListItem> {
    preceded(
        parse_unordered_list_tag,
        alt((
            map(pair(parse_task_tag, parse_inline_line), |(checked, text)| {
                ListItem::task(checked, text)
            }),
            map(parse_inline_line, ListItem::plain),
        )),
    )(i)
}

fn parse_unordered_list(i: &str) -> IResult<&str, Vec<ListItem>> {
    many1(parse_unordered_list_element)(i)
}

fn parse_ordered_list_tag(i: &str) -> IResult<&str, &str> {
    terminated(terminated(digit1, tag(".")), tag(" "))(i)
}

fn parse_ordered_list_element(i: &str) -> IResult<&str, (&str, MarkdownText)> {
    pair(parse_ordered_list_tag, parse_inline_line)(i)
}

fn parse_ordered_list(i: &str) -> IResult<&str, (Option<u64>, Vec<ListItem>)> {
    map(many1(parse_ordered_list_element), |elements| {
        let start = elements
            .first()
            // digits only, so a parse failure is an overflow
            .map(|(number, _)| number.parse::<u64>().unwrap_or(u64::MAX))
            .filter(|&n| n != 1);
        let items = elements
            .into_iter()
            .map(|(_, text)| ListItem::plain(text))
            .collect();
        (start, items)
    })(i)
}

fn parse_code_fence(i: &str) -> IResult<&str, &str> {
    map(
        delimited(tag("```"), not_line_ending, line_ending),
        |info: &str| info.split_whitespace().next().unwrap_or(""),
    )(i)
}

fn parse_code_fence_close(i: &str) -> IResult<&str, ()> {
    value((), tuple((tag("```"), space0, alt((line_ending, eof)))))(i)
}

fn parse_code_line(i: &str) -> IResult<&str, &str> {
    preceded(not(parse_code_fence_close), recognize(parse_line))(i)
}

// an unterminated fence swallows the rest of the input
fn parse_code_block(i: &str) -> IResult<&str, (&str, &str)> {
    tuple((
        parse_code_fence,
        terminated(
            recognize(many0(parse_code_line)),
            opt(parse_code_fence_close),
        ),
    ))(i)
}

fn parse_blockquote_tag(i: &str) -> IResult<&str, &str> {
    alt((tag("> "), terminated(tag(">"), peek(line_ending))))(i)
}

fn parse_blockquote_line(i: &str) -> IResult<&str, &str> {
    preceded(parse_blockquote_tag, recognize(parse_line))(i)
}

fn parse_blockquote(i: &str, depth: usize) -> IResult<&str, Vec<Markdown>> {
    map(many1(parse_blockquote_line), |lines: Vec<&str>| {
        let inner = lines.concat();
        if depth < MAX_QUOTE_DEPTH {
            parse_document_at(&inner, depth + 1)
        } else {
            vec![leftover(&inner)]
        }
    })(i)
}

fn parse_block_start(i: &str) -> IResult<&str, &str> {
    alt((
        tag("```"),
        recognize(parse_header_tag),
        parse_horizontal_rule,
        parse_blockquote_tag,
        parse_unordered_list_tag,
        parse_ordered_list_tag,
    ))(i)
}

fn parse_paragraph_line(i: &str) -> IResult<&str, MarkdownText> {
    preceded(
        not(alt((parse_blank_line, parse_block_start))),
        parse_inline_line,
    )(i)
}

fn parse_paragraph(i: &str) -> IResult<&str, Vec<MarkdownText>> {
    many1(parse_paragraph_line)(i)
}
