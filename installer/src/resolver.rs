//! Resolution of the editor version and changeset to install.
//!
//! The resolver turns partial input into a [`VersionSpec`]:
//!
//! 1. No explicit version: read the project's version file, using the
//!    recorded changeset when present and looking it up remotely otherwise.
//! 2. Explicit version without changeset: look the changeset up remotely.
//! 3. Both explicit: use them as given.

use crate::download::Downloader;
use crate::error::{Result, SetupError};
use crate::parser::{ChangesetPageParser, ProjectVersion, ReleasePageParser, parse_project_version};
use crate::version::{VersionSpec, changeset_page_url};
use camino::{Utf8Path, Utf8PathBuf};
use log::{error, info};

/// Location of the version file relative to the project root.
pub const PROJECT_VERSION_FILE: &str = "ProjectSettings/ProjectVersion.txt";

/// Partial version information supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRequest {
    /// Explicit editor version, if given.
    pub version: Option<String>,
    /// Explicit changeset, if given.
    pub changeset: Option<String>,
    /// Project root used when no version is given.
    pub project_path: Utf8PathBuf,
}

/// Resolves a [`VersionRequest`] into a [`VersionSpec`].
pub struct VersionResolver<'a, P = ReleasePageParser> {
    downloader: &'a dyn Downloader,
    parser: P,
}

impl<'a> VersionResolver<'a> {
    /// Create a resolver using the default release-page parser.
    #[must_use]
    pub fn new(downloader: &'a dyn Downloader) -> Self {
        Self {
            downloader,
            parser: ReleasePageParser,
        }
    }
}

impl<'a, P: ChangesetPageParser> VersionResolver<'a, P> {
    /// Create a resolver with a custom release-page parser.
    #[must_use]
    pub fn with_parser(downloader: &'a dyn Downloader, parser: P) -> Self {
        Self { downloader, parser }
    }

    /// Resolve the request into a complete version spec.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::ProjectNotFound`] when the version file is
    /// missing, [`SetupError::VersionUnparsable`] when it carries no version,
    /// and [`SetupError::ChangesetNotFound`] when a remote lookup fails.
    pub fn resolve(&self, request: &VersionRequest) -> Result<VersionSpec> {
        match (&request.version, &request.changeset) {
            (None, _) => {
                info!("No Unity version given; reading it from the project");
                let spec = self.resolve_from_project(&request.project_path)?;
                info!("Found project version {spec}");
                Ok(spec)
            }
            (Some(version), None) => {
                let changeset = self.find_changeset(version)?;
                VersionSpec::new(version.as_str(), changeset)
            }
            (Some(version), Some(changeset)) => {
                VersionSpec::new(version.as_str(), changeset.as_str())
            }
        }
    }

    /// Read the project's version file, looking the changeset up when the
    /// file records the version only.
    ///
    /// # Errors
    ///
    /// See [`VersionResolver::resolve`].
    pub fn resolve_from_project(&self, project_path: &Utf8Path) -> Result<VersionSpec> {
        let path = project_path.join(PROJECT_VERSION_FILE);
        info!("Reading editor version from {path}");
        let contents = std::fs::read_to_string(&path)
            .map_err(|_| SetupError::ProjectNotFound { path: path.clone() })?;

        match parse_project_version(&contents) {
            Some(ProjectVersion::WithRevision { version, changeset }) => {
                VersionSpec::new(version, changeset)
            }
            Some(ProjectVersion::VersionOnly { version }) => {
                let changeset = self.find_changeset(&version)?;
                VersionSpec::new(version, changeset)
            }
            None => Err(SetupError::VersionUnparsable { path }),
        }
    }

    /// Look up the changeset of `version` on the vendor's release pages.
    ///
    /// Fetch and parse failures are logged and reported as a single
    /// [`SetupError::ChangesetNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::ChangesetNotFound`] on any failure.
    pub fn find_changeset(&self, version: &str) -> Result<String> {
        info!("Looking up the changeset for {version}");
        let not_found = || SetupError::ChangesetNotFound {
            version: version.to_owned(),
        };

        let Some(url) = changeset_page_url(version) else {
            error!("no release page can be derived from {version}");
            return Err(not_found());
        };
        info!("Fetching release page {url}");

        let page = self.downloader.download_text(&url).map_err(|err| {
            error!("{err}");
            not_found()
        })?;

        self.parser
            .changeset(&page, version)
            .filter(|changeset| !changeset.is_empty())
            .ok_or_else(not_found)
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
