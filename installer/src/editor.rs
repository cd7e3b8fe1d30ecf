//! Locating and installing the editor through the hub.

use crate::error::{Result, SetupError};
use crate::hub::Hub;
use crate::parser::{EditorListingParser, HubListingParser};
use crate::runner::{Invocation, RunOptions};
use crate::version::VersionSpec;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

/// Finds installed editors by querying the hub's editor listing.
pub struct EditorLocator<'a, P = HubListingParser> {
    hub: &'a Hub<'a>,
    parser: P,
}

impl<'a> EditorLocator<'a> {
    /// Create a locator using the default listing parser.
    #[must_use]
    pub fn new(hub: &'a Hub<'a>) -> Self {
        Self {
            hub,
            parser: HubListingParser,
        }
    }
}

impl<'a, P: EditorListingParser> EditorLocator<'a, P> {
    /// Create a locator with a custom listing parser.
    #[must_use]
    pub fn with_parser(hub: &'a Hub<'a>, parser: P) -> Self {
        Self { hub, parser }
    }

    /// Return the editor executable for `version`, or `None` when the hub
    /// does not list it. Absence is an expected outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the hub cannot be started.
    pub fn locate(&self, version: &str) -> Result<Option<Utf8PathBuf>> {
        let listing = self
            .hub
            .run(&["editors".to_owned(), "--installed".to_owned()])?;
        Ok(self
            .parser
            .install_location(&listing.stdout, version)
            .map(|location| self.hub.profile().editor_executable(&location)))
    }
}

/// Installs the editor when the hub does not already list it.
pub struct EditorProvisioner<'a, P = HubListingParser> {
    hub: &'a Hub<'a>,
    locator: EditorLocator<'a, P>,
    self_hosted: bool,
}

impl<'a> EditorProvisioner<'a> {
    /// Create a provisioner using the default listing parser.
    ///
    /// On self-hosted runners the install directory is prepared without
    /// `sudo`.
    #[must_use]
    pub fn new(hub: &'a Hub<'a>, self_hosted: bool) -> Self {
        Self {
            hub,
            locator: EditorLocator::new(hub),
            self_hosted,
        }
    }
}

impl<'a, P: EditorListingParser> EditorProvisioner<'a, P> {
    /// Create a provisioner around an existing locator.
    #[must_use]
    pub fn with_locator(hub: &'a Hub<'a>, locator: EditorLocator<'a, P>, self_hosted: bool) -> Self {
        Self {
            hub,
            locator,
            self_hosted,
        }
    }

    /// Return the editor executable, installing the editor first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InstallationFailed`] when the editor is still
    /// missing after the hub install command, or a command error when the
    /// install directory cannot be prepared.
    pub fn provision(
        &self,
        install_path: Option<&Utf8Path>,
        spec: &VersionSpec,
    ) -> Result<Utf8PathBuf> {
        info!("Looking for Unity {} via {}", spec.version(), self.hub.path());
        if let Some(path) = self.locator.locate(spec.version())? {
            info!("Unity {} already installed at {path}", spec.version());
            return Ok(path);
        }

        info!("Unity {} not found, proceeding with installation", spec.version());
        if let Some(install_path) = install_path {
            self.configure_install_path(install_path)?;
        }

        info!("Installing Unity {spec}");
        self.hub.run(&[
            "install".to_owned(),
            "--version".to_owned(),
            spec.version().to_owned(),
            "--changeset".to_owned(),
            spec.changeset().to_owned(),
        ])?;

        let path = self
            .locator
            .locate(spec.version())?
            .ok_or_else(|| SetupError::InstallationFailed {
                version: spec.version().to_owned(),
            })?;
        info!("Unity Editor installed at {path}");
        Ok(path)
    }

    fn configure_install_path(&self, install_path: &Utf8Path) -> Result<()> {
        if self.hub.profile().platform().prepares_install_dir() {
            info!("Preparing install directory {install_path}");
            let options = RunOptions::elevated_if(!self.self_hosted);
            let runner = self.hub.runner();
            runner.run(
                &Invocation::new("mkdir").arg("-p").arg(install_path.as_str()),
                options,
            )?;
            runner.run(
                &Invocation::new("chmod")
                    .args(["-R", "o+rwx"])
                    .arg(install_path.as_str()),
                options,
            )?;
        }

        self.hub.run(&[
            "install-path".to_owned(),
            "--set".to_owned(),
            install_path.as_str().to_owned(),
        ])?;
        info!("Install path configured in Unity Hub: {install_path}");
        Ok(())
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod tests;
