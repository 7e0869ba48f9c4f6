//! Core of a split-pane markdown editor.
//!
//! [`render`] turns the whole buffer into preview HTML on every edit: the
//! [`parser`] segments it into blocks and inline spans, the [`translator`]
//! emits escaped markup. [`editor`], [`toolbar`] and [`workspace`] hold the
//! session state and the boundaries a GUI host plugs into.

pub mod config;
pub mod editor;
pub mod entity;
pub mod error;
pub mod parser;
pub mod toolbar;
pub mod translator;
pub mod workspace;

pub use error::{Error, Result};

/// Renders markdown into an HTML fragment. Never fails; input the grammar
/// does not recognize comes out as escaped paragraph text.
pub fn render(text: &str) -> String {
    let content = parser::normalize(text);
    translator::translate(parser::parse_document(&content))
}
