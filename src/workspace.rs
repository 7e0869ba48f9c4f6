//! File, dialog and external-open boundaries.
//!
//! Native dialogs belong to the host; it plugs them in through [`Dialogs`].
//! A dialog returning `None` means the user cancelled, which is never an
//! error. Reads and writes fail with [`Error::Read`] / [`Error::Write`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use url::Url;

use crate::config::EditorConfig;
use crate::error::{Error, Result};

/// Extensions offered by the open dialog's markdown filter.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

pub trait Dialogs {
    fn pick_open(&mut self, extensions: &[&str]) -> Option<PathBuf>;
    fn pick_save(&mut self, default: &Path) -> Option<PathBuf>;
    fn pick_image(&mut self) -> Option<PathBuf>;
    /// Asked before unsaved changes would be thrown away.
    fn confirm_discard(&mut self, message: &str) -> bool;
}

/// Asks the platform to open a URL outside the application.
pub trait ExternalOpen {
    fn open_url(&self, url: &str) -> Result<()>;
}

pub struct SystemOpener;

impl ExternalOpen for SystemOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        info!(url, "opening in browser");
        opener::open_browser(url).map_err(|source| Error::Open {
            url: url.to_string(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opened {
    pub path: PathBuf,
    pub content: String,
}

pub struct Workspace<D> {
    dialogs: D,
    save_name: String,
}

impl<D: Dialogs> Workspace<D> {
    pub fn new(dialogs: D, save_name: impl Into<String>) -> Self {
        Workspace {
            dialogs,
            save_name: save_name.into(),
        }
    }

    /// Save-as starts from the configured `save_name`.
    pub fn from_config(dialogs: D, config: &EditorConfig) -> Self {
        Workspace::new(dialogs, config.save_name.as_str())
    }

    pub fn dialogs_mut(&mut self) -> &mut D {
        &mut self.dialogs
    }

    /// Where save-as starts: the user's documents folder, falling back to
    /// home and then the working directory.
    pub fn default_save_path(&self) -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&self.save_name)
    }

    pub fn open(&mut self) -> Result<Option<Opened>> {
        let path = match self.dialogs.pick_open(MARKDOWN_EXTENSIONS) {
            Some(path) => path,
            None => {
                debug!("open cancelled");
                return Ok(None);
            }
        };
        let content = fs::read_to_string(&path).map_err(|source| {
            warn!(path = %path.display(), "read failed");
            Error::Read {
                path: path.clone(),
                source,
            }
        })?;
        info!(path = %path.display(), bytes = content.len(), "opened");
        Ok(Some(Opened { path, content }))
    }

    pub fn save(&mut self, path: &Path, content: &str) -> Result<PathBuf> {
        fs::write(path, content).map_err(|source| {
            warn!(path = %path.display(), "write failed");
            Error::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!(path = %path.display(), bytes = content.len(), "saved");
        Ok(path.to_path_buf())
    }

    pub fn save_as(&mut self, content: &str) -> Result<Option<PathBuf>> {
        let default = self.default_save_path();
        match self.dialogs.pick_save(&default) {
            Some(path) => self.save(&path, content).map(Some),
            None => {
                debug!("save-as cancelled");
                Ok(None)
            }
        }
    }

    /// Picks a local image and returns a reference usable as an image URL.
    pub fn pick_image(&mut self) -> Option<String> {
        self.dialogs.pick_image().map(|path| image_reference(&path))
    }
}

/// `file://` URL for absolute paths; relative paths stay relative with
/// forward slashes.
pub fn image_reference(path: &Path) -> String {
    match Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        Err(()) => path.to_string_lossy().replace('\\', "/"),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Scripted dialogs: each answer is consumed once.
    #[derive(Default)]
    pub struct FakeDialogs {
        pub open: Option<PathBuf>,
        pub save: Option<PathBuf>,
        pub image: Option<PathBuf>,
        pub confirm: bool,
        pub prompts: Vec<String>,
        pub save_defaults: Vec<PathBuf>,
    }

    impl Dialogs for FakeDialogs {
        fn pick_open(&mut self, extensions: &[&str]) -> Option<PathBuf> {
            assert_eq!(extensions, MARKDOWN_EXTENSIONS);
            self.open.take()
        }

        fn pick_save(&mut self, default: &Path) -> Option<PathBuf> {
            self.save_defaults.push(default.to_path_buf());
            self.save.take()
        }

        fn pick_image(&mut self) -> Option<PathBuf> {
            self.image.take()
        }

        fn confirm_discard(&mut self, message: &str) -> bool {
            self.prompts.push(message.to_string());
            self.confirm
        }
    }

    #[derive(Default)]
    pub struct RecordingOpener {
        pub opened: RefCell<Vec<String>>,
    }

    impl ExternalOpen for RecordingOpener {
        fn open_url(&self, url: &str) -> Result<()> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }
}
