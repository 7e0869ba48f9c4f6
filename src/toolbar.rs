//! Markdown insertion helpers behind the editor toolbar.
//!
//! Every helper edits a [`Buffer`] in place and returns the byte offset
//! where the cursor should land. Selections are byte ranges; they are
//! clamped to the text and snapped down to char boundaries on construction.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn prefix(self) -> &'static str {
        match self {
            ListKind::Unordered => "- ",
            ListKind::Ordered => "1. ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    text: String,
    selection: Range<usize>,
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

impl Buffer {
    pub fn new(text: impl Into<String>, selection: Range<usize>) -> Self {
        let text = text.into();
        let start = floor_char_boundary(&text, selection.start);
        let end = floor_char_boundary(&text, selection.end).max(start);
        Buffer {
            text,
            selection: start..end,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn selected(&self) -> &str {
        &self.text[self.selection.clone()]
    }

    fn replace_selection(&mut self, replacement: &str, cursor: usize) -> usize {
        let start = self.selection.start;
        self.text.replace_range(self.selection.clone(), replacement);
        let cursor = start + cursor;
        self.selection = cursor..cursor;
        cursor
    }

    /// Surrounds the selection with `before` and `after`, e.g. `**` for bold.
    /// The cursor ends up just past the selected text, inside the wrapper.
    pub fn wrap(&mut self, before: &str, after: &str) -> usize {
        let selected = self.selected().to_string();
        let replacement = format!("{}{}{}", before, selected, after);
        self.replace_selection(&replacement, before.len() + selected.len())
    }

    pub fn bold(&mut self) -> usize {
        self.wrap("**", "**")
    }

    pub fn italic(&mut self) -> usize {
        self.wrap("*", "*")
    }

    pub fn strikethrough(&mut self) -> usize {
        self.wrap("~~", "~~")
    }

    pub fn code(&mut self) -> usize {
        self.wrap("`", "`")
    }

    /// Turns the line holding the cursor into a heading of `level`,
    /// replacing any heading marker it already had.
    pub fn heading(&mut self, level: usize) -> usize {
        let level = level.clamp(1, 6);
        let cursor = self.selection.start;
        let line_start = self.text[..cursor].rfind('\n').map_or(0, |p| p + 1);
        let line_end = self.text[cursor..]
            .find('\n')
            .map_or(self.text.len(), |p| cursor + p);

        let line = &self.text[line_start..line_end];
        let content = if line.starts_with('#') {
            line.trim_start_matches('#').trim_start()
        } else {
            line
        };
        let new_line = format!("{} {}", "#".repeat(level), content);

        self.text.replace_range(line_start..line_end, &new_line);
        let cursor = line_start + new_line.len();
        self.selection = cursor..cursor;
        cursor
    }

    /// Prefixes every selected line with a list marker.
    pub fn list(&mut self, kind: ListKind) -> usize {
        let items = self
            .selected()
            .split('\n')
            .map(|line| format!("{}{}", kind.prefix(), line))
            .collect::<Vec<String>>()
            .join("\n");
        let len = items.len();
        self.replace_selection(&items, len)
    }

    /// Replaces the selection with a link. The visible text falls back to
    /// the selection, then to the URL itself.
    pub fn link(&mut self, text: Option<&str>, url: &str) -> usize {
        let label = match text.filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None if !self.selected().is_empty() => self.selected().to_string(),
            None => url.to_string(),
        };
        let link = format!("[{}]({})", label, url);
        let len = link.len();
        self.replace_selection(&link, len)
    }

    pub fn image(&mut self, alt: &str, url: &str) -> usize {
        let image = format!("![{}]({})", alt, url);
        let len = image.len();
        self.replace_selection(&image, len)
    }

    /// Inserts a `rows` x `cols` table skeleton (the header counts as a row)
    /// in front of the selection. Zero rows or columns is a no-op.
    pub fn table(&mut self, rows: usize, cols: usize) -> usize {
        if rows == 0 || cols == 0 {
            return self.selection.end;
        }
        let mut table = format!("|{}\n", " Header |".repeat(cols));
        table.push_str(&format!("|{}\n", " --- |".repeat(cols)));
        for _ in 1..rows {
            table.push_str(&format!("|{}\n", " Cell |".repeat(cols)));
        }
        self.wrap(&table, "")
    }
}
