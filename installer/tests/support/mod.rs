//! Test support utilities for setup behavioural tests.
//!
//! Provides stand-ins for the network and home-directory collaborators so
//! scenarios run without touching the host.

use camino::Utf8PathBuf;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use unity_setup::dirs::BaseDirs;
use unity_setup::download::{DownloadError, Downloader};

/// Serves canned release pages and records every fetched URL.
#[derive(Default)]
pub struct PageDownloader {
    pages: HashMap<String, String>,
    fetched: RefCell<Vec<String>>,
}

impl PageDownloader {
    /// Register `body` as the page served at `url`.
    pub fn serve(&mut self, url: &str, body: &str) {
        self.pages.insert(url.to_owned(), body.to_owned());
    }

    /// URLs requested so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl Downloader for PageDownloader {
    fn download_text(&self, url: &str) -> Result<String, DownloadError> {
        self.fetched.borrow_mut().push(url.to_owned());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::NotFound {
                url: url.to_owned(),
            })
    }

    fn download_file(&self, url: &str, _dest: &Path) -> Result<(), DownloadError> {
        self.fetched.borrow_mut().push(url.to_owned());
        Err(DownloadError::NotFound {
            url: url.to_owned(),
        })
    }
}

/// Resolves the home directory to a fixed path.
pub struct FixedHome(pub PathBuf);

impl BaseDirs for FixedHome {
    fn home_dir(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// A temporary directory addressed through a UTF-8 path.
pub struct TempRoot {
    _dir: TempDir,
    /// Root of the temporary directory.
    pub path: Utf8PathBuf,
}

impl TempRoot {
    /// Create a fresh temporary directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        Self { _dir: dir, path }
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directories");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }
}
