//! Error types for the Unity setup action.
//!
//! Every failure that aborts a provisioning run is a variant of
//! [`SetupError`]. The binary reports the rendered message to the CI job as
//! its failure reason, so each message names the input or path involved.

use crate::download::DownloadError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while provisioning the editor.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The running operating system has no platform profile.
    #[error("unsupported platform: {os}")]
    UnsupportedPlatform {
        /// The operating system identifier that was rejected.
        os: String,
    },

    /// The user's home directory could not be determined.
    #[error("could not determine the home directory for the Unity Hub install")]
    HomeDirUnavailable,

    /// The project version file is missing or unreadable.
    #[error("project not found at path: {path}")]
    ProjectNotFound {
        /// Path of the version file that was expected.
        path: Utf8PathBuf,
    },

    /// The project version file exists but carries no editor version.
    #[error("no editor version found in {path}")]
    VersionUnparsable {
        /// Path of the malformed version file.
        path: Utf8PathBuf,
    },

    /// The changeset for a version could not be discovered.
    #[error("can't find Unity version changeset automatically for {version}")]
    ChangesetNotFound {
        /// The version whose changeset was looked up.
        version: String,
    },

    /// A version spec was built with an empty field.
    #[error("Unity {field} must not be empty")]
    IncompleteVersion {
        /// Name of the empty field.
        field: &'static str,
    },

    /// The Unity Hub installer could not be applied.
    #[error("Unity Hub installation failed: {reason}")]
    HubInstallFailed {
        /// Description of the failed step.
        reason: String,
    },

    /// The editor is still absent after the hub install command ran.
    #[error("Unity Editor {version} installation failed")]
    InstallationFailed {
        /// The version that was requested.
        version: String,
    },

    /// The hub output carried no module success marker.
    #[error("Unity modules installation failed for {version}: {modules}")]
    ModuleInstallFailed {
        /// The editor version the modules were requested for.
        version: String,
        /// Space-separated list of requested modules.
        modules: String,
    },

    /// A command exited unsuccessfully and its exit code was not tolerated.
    #[error("command `{command}` failed with exit code {code}: {stderr}")]
    CommandFailed {
        /// The rendered command line.
        command: String,
        /// The exit code, or `-1` when terminated by a signal.
        code: i32,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// A download failed after exhausting retries.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// A filesystem path was not valid UTF-8.
    #[error("invalid path: {reason}")]
    InvalidPath {
        /// Description of the conversion failure.
        reason: String,
    },

    /// Writing an action output or exported variable failed.
    #[error("failed to write action output to {path}")]
    ActionOutput {
        /// The output file that could not be written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`SetupError`].
pub type Result<T> = std::result::Result<T, SetupError>;
