//! Editor session state: the document text, where it lives on disk, and
//! whether it has unsaved changes.
//!
//! Time is passed in as an [`Instant`] so auto-save is a deadline the host
//! polls rather than a timer this crate owns.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::error::Result;
use crate::toolbar::Buffer;
use crate::translator::is_external_link;
use crate::workspace::{Dialogs, ExternalOpen, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Fresh buffer, no file attached.
    New,
    /// Edited, never saved.
    NewDirty,
    Saved,
    Dirty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub words: usize,
    pub characters: usize,
}

impl Stats {
    pub fn of(text: &str) -> Self {
        Stats {
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Words: {} | Characters: {}", self.words, self.characters)
    }
}

pub struct Editor {
    text: String,
    path: Option<PathBuf>,
    dirty: bool,
    last_edit: Option<Instant>,
    settings: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(settings: EditorConfig) -> Self {
        Editor {
            text: String::new(),
            path: None,
            dirty: false,
            last_edit: None,
            settings,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn state(&self) -> DocumentState {
        match (self.path.is_some(), self.dirty) {
            (false, false) => DocumentState::New,
            (false, true) => DocumentState::NewDirty,
            (true, false) => DocumentState::Saved,
            (true, true) => DocumentState::Dirty,
        }
    }

    /// Replaces the whole buffer, as on every keystroke.
    pub fn set_text(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.touch(now);
    }

    /// Runs a toolbar helper against the buffer and returns the new cursor.
    pub fn edit<F>(&mut self, selection: Range<usize>, now: Instant, f: F) -> usize
    where
        F: FnOnce(&mut Buffer) -> usize,
    {
        let mut buffer = Buffer::new(std::mem::take(&mut self.text), selection);
        let cursor = f(&mut buffer);
        self.text = buffer.into_text();
        self.touch(now);
        cursor
    }

    fn touch(&mut self, now: Instant) {
        self.dirty = true;
        self.last_edit = Some(now);
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        self.last_edit = None;
    }

    pub fn preview(&self) -> String {
        crate::render(&self.text)
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.text)
    }

    /// File name (or the untitled placeholder), starred while dirty.
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.settings.untitled_name.clone());
        if self.dirty {
            format!("{}*", name)
        } else {
            name
        }
    }

    /// Only files that already live on disk are auto-saved.
    pub fn autosave_due(&self, now: Instant) -> bool {
        if !self.settings.autosave || !self.dirty || self.path.is_none() {
            return false;
        }
        self.last_edit.map_or(false, |t| {
            now.saturating_duration_since(t) >= self.settings.autosave_delay()
        })
    }

    pub fn autosave<D: Dialogs>(
        &mut self,
        workspace: &mut Workspace<D>,
        now: Instant,
    ) -> Result<bool> {
        if !self.autosave_due(now) {
            return Ok(false);
        }
        debug!("autosave");
        self.save(workspace)
    }

    fn confirm_discard<D: Dialogs>(&self, workspace: &mut Workspace<D>, action: &str) -> bool {
        !self.dirty
            || workspace.dialogs_mut().confirm_discard(&format!(
                "Are you sure you want to {}? Unsaved changes will be lost.",
                action
            ))
    }

    /// Returns `false` when the user kept their unsaved changes.
    pub fn new_file<D: Dialogs>(&mut self, workspace: &mut Workspace<D>) -> bool {
        if !self.confirm_discard(workspace, "create a new file") {
            return false;
        }
        self.text.clear();
        self.path = None;
        self.mark_clean();
        info!("new document");
        true
    }

    pub fn open_file<D: Dialogs>(&mut self, workspace: &mut Workspace<D>) -> Result<bool> {
        if !self.confirm_discard(workspace, "open a new file") {
            return Ok(false);
        }
        match workspace.open()? {
            Some(opened) => {
                self.text = opened.content;
                self.path = Some(opened.path);
                self.mark_clean();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Saves to the current path, or asks for one when there is none.
    pub fn save<D: Dialogs>(&mut self, workspace: &mut Workspace<D>) -> Result<bool> {
        match self.path.clone() {
            Some(path) => {
                workspace.save(&path, &self.text)?;
                self.mark_clean();
                Ok(true)
            }
            None => self.save_as(workspace),
        }
    }

    pub fn save_as<D: Dialogs>(&mut self, workspace: &mut Workspace<D>) -> Result<bool> {
        match workspace.save_as(&self.text)? {
            Some(path) => {
                self.path = Some(path);
                self.mark_clean();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Hands a clicked preview link to the platform. Returns `false` for
    /// schemes that are not opened externally.
    pub fn activate_link(&self, url: &str, opener: &dyn ExternalOpen) -> Result<bool> {
        let url = url.trim();
        let mailto = url
            .get(..7)
            .map_or(false, |scheme| scheme.eq_ignore_ascii_case("mailto:"));
        if !is_external_link(url) && !mailto {
            debug!(url, "refusing to open link");
            return Ok(false);
        }
        opener.open_url(url)?;
        Ok(true)
    }

    /// Asks for a local image and inserts it at `selection`.
    pub fn insert_image<D: Dialogs>(
        &mut self,
        workspace: &mut Workspace<D>,
        selection: Range<usize>,
        alt: &str,
        now: Instant,
    ) -> Option<usize> {
        let reference = workspace.pick_image()?;
        Some(self.edit(selection, now, |buffer| buffer.image(alt, &reference)))
    }
}
