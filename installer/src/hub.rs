//! Unity Hub installation and invocation.
//!
//! [`HubProvisioner`] makes sure the hub executable exists at the platform's
//! fixed location, downloading and installing it when absent. [`Hub`] runs
//! hub commands through the platform's headless wrapper.

use crate::download::Downloader;
use crate::error::{Result, SetupError};
use crate::platform::{Platform, PlatformProfile};
use crate::runner::{CommandResult, CommandRunner, Invocation, RunOptions};
use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};

/// System packages the hub and editor need on Linux images.
pub const LINUX_SYSTEM_PACKAGES: [&str; 8] = [
    "libgconf-2-4",
    "libglu1",
    "libasound2",
    "libgtk2.0-0",
    "libgtk-3-0",
    "libnss3",
    "zenity",
    "xvfb",
];

/// Sentinel file that pre-accepts the hub EULA on Linux.
const EULA_SENTINEL: &str = "eulaAccepted";

/// Mount root for disk images on macOS.
const MACOS_VOLUMES: &str = "/Volumes";

/// Name prefix of the mounted hub volume on macOS.
const HUB_VOLUME_PREFIX: &str = "Unity Hub";

/// Destination of the hub application bundle on macOS.
const MACOS_HUB_APP: &str = "/Applications/Unity Hub.app";

/// A hub executable together with the platform wrapper used to run it.
pub struct Hub<'a> {
    profile: &'a PlatformProfile,
    path: Utf8PathBuf,
    runner: &'a dyn CommandRunner,
}

impl<'a> Hub<'a> {
    /// Create a hub handle for the executable at `path`.
    #[must_use]
    pub fn new(
        profile: &'a PlatformProfile,
        path: impl Into<Utf8PathBuf>,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            profile,
            path: path.into(),
            runner,
        }
    }

    /// Path of the hub executable.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The platform profile the hub was created for.
    #[must_use]
    pub fn profile(&self) -> &PlatformProfile {
        self.profile
    }

    /// The runner used for hub and auxiliary commands.
    #[must_use]
    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner
    }

    /// Run a hub command through the headless wrapper.
    ///
    /// The hub's exit status is meaningless, so non-zero exits are tolerated
    /// and callers judge the captured output instead.
    ///
    /// # Errors
    ///
    /// Returns an error only when the process cannot be started.
    pub fn run(&self, args: &[String]) -> Result<CommandResult> {
        let invocation = self.profile.hub_invocation(&self.path, args);
        self.runner.run(&invocation, RunOptions::tolerant())
    }
}

/// Ensures the hub tool is installed.
pub struct HubProvisioner<'a> {
    profile: &'a PlatformProfile,
    runner: &'a dyn CommandRunner,
    downloader: &'a dyn Downloader,
    download_dir: Utf8PathBuf,
    self_hosted: bool,
}

impl<'a> HubProvisioner<'a> {
    /// Create a provisioner that downloads installers into `download_dir`.
    ///
    /// On self-hosted runners privileged steps run without `sudo`.
    #[must_use]
    pub fn new(
        profile: &'a PlatformProfile,
        runner: &'a dyn CommandRunner,
        downloader: &'a dyn Downloader,
        download_dir: impl Into<Utf8PathBuf>,
        self_hosted: bool,
    ) -> Self {
        Self {
            profile,
            runner,
            downloader,
            download_dir: download_dir.into(),
            self_hosted,
        }
    }

    /// Return the hub path, installing the hub first if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the installer cannot be downloaded or one of the
    /// required install steps fails. Linux package installation is
    /// best-effort and never fails the run.
    pub fn ensure(&self) -> Result<Utf8PathBuf> {
        let hub_path = self.profile.hub_path();
        if hub_path.exists() {
            info!("Unity Hub is already installed in: {hub_path}");
            return Ok(hub_path.to_owned());
        }

        info!("Installing Unity Hub...");
        std::fs::create_dir_all(&self.download_dir)?;
        let installer = self.download_dir.join(self.profile.installer_file_name());
        self.downloader
            .download_file(&self.profile.hub_installer_url(), installer.as_std_path())?;

        match self.profile.platform() {
            Platform::Linux => self.install_linux(&installer)?,
            Platform::MacOs => self.install_macos(&installer)?,
            Platform::Windows => self.install_windows(&installer)?,
        }
        Ok(hub_path.to_owned())
    }

    fn elevated(&self) -> RunOptions {
        RunOptions::elevated_if(!self.self_hosted)
    }

    fn install_linux(&self, installer: &Utf8Path) -> Result<()> {
        let hub_path = self.profile.hub_path();
        if let Some(hub_dir) = hub_path.parent() {
            std::fs::create_dir_all(hub_dir)?;
        }
        move_file(installer, hub_path)?;
        mark_executable(hub_path)?;

        if let Some(config_dir) = self.profile.hub_config_dir() {
            std::fs::create_dir_all(config_dir)?;
            std::fs::File::create(config_dir.join(EULA_SENTINEL))?;
        }

        match self.install_system_packages() {
            Ok(()) => info!("Unity Hub successfully installed"),
            Err(err) => warn!("Unity Hub installed with errors: {err}"),
        }
        Ok(())
    }

    fn install_system_packages(&self) -> Result<()> {
        self.runner
            .run(&Invocation::new("apt-get").arg("update"), self.elevated())?;
        self.runner.run(
            &Invocation::new("apt-get")
                .args(["install", "-y"])
                .args(LINUX_SYSTEM_PACKAGES),
            self.elevated(),
        )?;
        Ok(())
    }

    fn install_macos(&self, installer: &Utf8Path) -> Result<()> {
        self.runner.run(
            &Invocation::new("hdiutil").args(["mount", installer.as_str()]),
            self.elevated(),
        )?;

        let listing = self.runner.run(
            &Invocation::new("ls").arg(MACOS_VOLUMES),
            RunOptions::default(),
        )?;
        let volume = listing
            .stdout
            .lines()
            .map(str::trim)
            .find(|entry| entry.starts_with(HUB_VOLUME_PREFIX))
            .ok_or_else(|| SetupError::HubInstallFailed {
                reason: format!("no {HUB_VOLUME_PREFIX} volume mounted under {MACOS_VOLUMES}"),
            })?;
        let volume = format!("{MACOS_VOLUMES}/{volume}");

        self.runner.run(
            &Invocation::new("ditto")
                .arg(format!("{volume}/Unity Hub.app"))
                .arg(MACOS_HUB_APP),
            RunOptions::default(),
        )?;
        self.runner.run(
            &Invocation::new("hdiutil").arg("detach").arg(volume),
            self.elevated(),
        )?;
        std::fs::remove_file(installer)?;
        info!("Unity Hub successfully installed");
        Ok(())
    }

    fn install_windows(&self, installer: &Utf8Path) -> Result<()> {
        self.runner.run(
            &Invocation::new(installer.as_str()).arg("/s"),
            RunOptions::default(),
        )?;
        std::fs::remove_file(installer)?;
        info!("Unity Hub successfully installed");
        Ok(())
    }
}

/// Move a file, copying when source and destination are on different
/// filesystems.
fn move_file(from: &Utf8Path, to: &Utf8Path) -> Result<()> {
    if std::fs::rename(from, to).is_err() {
        std::fs::copy(from, to)?;
        std::fs::remove_file(from)?;
    }
    Ok(())
}

#[cfg(unix)]
fn mark_executable(path: &Utf8Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    std::fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn mark_executable(_path: &Utf8Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
