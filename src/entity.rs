pub type MarkdownText = Vec<MarkdownInline>;

#[derive(Clone, Debug, PartialEq)]
pub enum Markdown {
    Heading(usize, MarkdownText),
    /// One entry per source line; lines are joined with hard breaks.
    Paragraph(Vec<MarkdownText>),
    Blockquote(Vec<Markdown>),
    /// Start number is kept only when it is not 1.
    OrderedList(Option<u64>, Vec<ListItem>),
    UnorderedList(Vec<ListItem>),
    Codeblock(String, String),
    HorizontalRule,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    /// `Some(checked)` for `[ ]` / `[x]` task items.
    pub task: Option<bool>,
    pub text: MarkdownText,
}

impl ListItem {
    pub fn plain(text: MarkdownText) -> Self {
        ListItem { task: None, text }
    }

    pub fn task(checked: bool, text: MarkdownText) -> Self {
        ListItem {
            task: Some(checked),
            text,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MarkdownInline {
    Link(MarkdownText, String),
    Image(String, String),
    InlineCode(String),
    Bold(MarkdownText),
    Italic(MarkdownText),
    Strike(MarkdownText),
    Plaintext(String),
}
