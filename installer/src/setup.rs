//! End-to-end provisioning run.
//!
//! A run resolves the platform profile, then drives the four stages in
//! order: version resolution, hub installation, editor installation, and
//! module installation. Each stage consumes the previous stage's output and
//! the first failure aborts the run.

use crate::dirs::BaseDirs;
use crate::download::Downloader;
use crate::editor::EditorProvisioner;
use crate::error::{Result, SetupError};
use crate::hub::{Hub, HubProvisioner};
use crate::modules::{ModuleProvisioner, ModuleRequest};
use crate::platform::PlatformProfile;
use crate::resolver::{VersionRequest, VersionResolver};
use crate::runner::CommandRunner;
use crate::version::VersionSpec;
use camino::Utf8PathBuf;
use log::info;
use std::fmt;

/// Variable naming the runner's scratch directory.
const RUNNER_TEMP_VAR: &str = "RUNNER_TEMP";

/// Everything the user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupRequest {
    /// Version inputs and the project to fall back to.
    pub version: VersionRequest,
    /// Optional modules to install after the editor.
    pub modules: ModuleRequest,
    /// Custom editor install location.
    pub install_path: Option<Utf8PathBuf>,
    /// Skip privilege elevation.
    pub self_hosted: bool,
}

/// Collaborators a run talks to.
pub struct SetupContext<'a> {
    /// Executes installer and hub commands.
    pub runner: &'a dyn CommandRunner,
    /// Fetches release pages and installers.
    pub downloader: &'a dyn Downloader,
    /// Resolves the home directory.
    pub dirs: &'a dyn BaseDirs,
    /// Scratch directory for downloaded installers.
    pub download_dir: Utf8PathBuf,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOutcome {
    /// The editor version that is now installed.
    pub version: String,
    /// Path of the editor executable.
    pub editor_path: Utf8PathBuf,
}

/// What a run would do, as reported by a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPlan {
    /// Platform profile for the host.
    pub profile: PlatformProfile,
    /// Resolved version and changeset.
    pub spec: VersionSpec,
    /// Custom editor install location.
    pub install_path: Option<Utf8PathBuf>,
    /// Modules that would be installed.
    pub modules: ModuleRequest,
    /// Whether elevation is skipped.
    pub self_hosted: bool,
}

impl fmt::Display for SetupPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dry run - nothing will be installed")?;
        writeln!(f)?;
        writeln!(f, "Platform: {}", self.profile.platform())?;
        writeln!(f, "Unity Hub: {}", self.profile.hub_path())?;
        writeln!(f, "Unity version: {}", self.spec.version())?;
        writeln!(f, "Changeset: {}", self.spec.changeset())?;
        match &self.install_path {
            Some(path) => writeln!(f, "Install path: {path}")?,
            None => writeln!(f, "Install path: (hub default)")?,
        }
        writeln!(f, "Self-hosted: {}", self.self_hosted)?;
        if self.modules.is_empty() {
            write!(f, "Modules: (none)")
        } else {
            write!(f, "Modules: {}", self.modules.names().join(", "))?;
            if self.modules.include_children() {
                write!(f, " (with child modules)")?;
            }
            Ok(())
        }
    }
}

/// Resolve the platform and version without installing anything.
///
/// # Errors
///
/// Returns the platform or version resolution error.
pub fn plan_setup(request: &SetupRequest, os: &str, context: &SetupContext<'_>) -> Result<SetupPlan> {
    let profile = PlatformProfile::detect(os, context.dirs)?;
    let spec = VersionResolver::new(context.downloader).resolve(&request.version)?;
    Ok(SetupPlan {
        profile,
        spec,
        install_path: request.install_path.clone(),
        modules: request.modules.clone(),
        self_hosted: request.self_hosted,
    })
}

/// Provision the editor and modules described by `request` on `os`.
///
/// The platform is checked before any filesystem, network, or process
/// access.
///
/// # Errors
///
/// Returns the first stage failure.
pub fn run_setup(
    request: &SetupRequest,
    os: &str,
    context: &SetupContext<'_>,
) -> Result<SetupOutcome> {
    let profile = PlatformProfile::detect(os, context.dirs)?;
    log_request(request);

    let spec = VersionResolver::new(context.downloader).resolve(&request.version)?;
    info!("Resolved Unity {spec}");

    let hub_path = HubProvisioner::new(
        &profile,
        context.runner,
        context.downloader,
        context.download_dir.clone(),
        request.self_hosted,
    )
    .ensure()?;
    let hub = Hub::new(&profile, hub_path, context.runner);

    let editor_path = EditorProvisioner::new(&hub, request.self_hosted)
        .provision(request.install_path.as_deref(), &spec)?;

    if !request.modules.is_empty() {
        ModuleProvisioner::new(&hub).install(spec.version(), &request.modules)?;
    }

    Ok(SetupOutcome {
        version: spec.version().to_owned(),
        editor_path,
    })
}

fn log_request(request: &SetupRequest) {
    let version = &request.version;
    info!(
        "Unity version: {}",
        version.version.as_deref().unwrap_or("(from project)")
    );
    info!(
        "Unity changeset: {}",
        version.changeset.as_deref().unwrap_or("(lookup)")
    );
    info!("Project path: {}", version.project_path);
    if let Some(path) = &request.install_path {
        info!("Install path: {path}");
    }
    if !request.modules.is_empty() {
        info!(
            "Unity modules: {} (child modules: {})",
            request.modules.names().join(" "),
            request.modules.include_children()
        );
    }
    info!("Self-hosted: {}", request.self_hosted);
}

/// Directory for downloaded installers: the runner's scratch directory when
/// set, otherwise the system temporary directory.
///
/// # Errors
///
/// Returns [`SetupError::InvalidPath`] when the directory is not valid UTF-8.
pub fn default_download_dir() -> Result<Utf8PathBuf> {
    let dir = std::env::var_os(RUNNER_TEMP_VAR)
        .filter(|value| !value.is_empty())
        .map_or_else(std::env::temp_dir, Into::into);
    Utf8PathBuf::try_from(dir).map_err(|e| SetupError::InvalidPath {
        reason: format!("download directory is not valid UTF-8: {e}"),
    })
}

#[cfg(test)]
#[path = "setup_tests.rs"]
mod tests;
