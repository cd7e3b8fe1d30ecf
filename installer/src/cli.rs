//! CLI argument definitions for the Unity setup action.
//!
//! Every option falls back to the matching GitHub Actions input variable
//! (`INPUT_<NAME>`), so the same binary serves as the action entrypoint and as
//! a local command. Inputs the workflow leaves empty count as absent.

use crate::modules::ModuleRequest;
use crate::resolver::VersionRequest;
use crate::setup::SetupRequest;
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};
use std::convert::Infallible;

/// Project path used when none is given.
const DEFAULT_PROJECT_PATH: &str = ".";

/// Install the Unity editor and modules through Unity Hub.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "unity-setup")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install the Unity editor and modules through Unity Hub.\n\n",
    "The editor version is taken from --unity-version or, when absent, from the ",
    "project's ProjectSettings/ProjectVersion.txt. A missing changeset is looked ",
    "up on the Unity release pages. Unity Hub is installed first when it is not ",
    "already present.\n\n",
    "On GitHub Actions the options are read from the step inputs, and the ",
    "resolved version and editor path are published as step outputs and as the ",
    "UNITY_VERSION and UNITY_PATH environment variables.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install the version recorded in a project:\n",
    "    $ unity-setup --project-path ./game\n\n",
    "  Install a specific version with Android support:\n",
    "    $ unity-setup --unity-version 2022.3.10f1 --unity-module android\n\n",
    "  Preview the resolved version without installing:\n",
    "    $ unity-setup --unity-version 2022.3.10f1 --dry-run",
))]
pub struct Cli {
    /// Editor version to install [default: read from the project].
    #[arg(long, env = "INPUT_UNITY-VERSION", value_name = "VERSION")]
    pub unity_version: Option<String>,

    /// Changeset of the editor version [default: looked up online].
    #[arg(long, env = "INPUT_UNITY-VERSION-CHANGESET", value_name = "CHANGESET")]
    pub unity_version_changeset: Option<String>,

    /// Module to install alongside the editor (can be repeated).
    #[arg(
        long = "unity-module",
        env = "INPUT_UNITY-MODULES",
        value_name = "MODULE",
        value_delimiter = '\n'
    )]
    pub unity_modules: Vec<String>,

    /// Install child modules of the requested modules.
    #[arg(
        long,
        env = "INPUT_UNITY-MODULES-CHILD",
        value_name = "BOOL",
        value_parser = parse_action_bool,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub unity_modules_child: bool,

    /// Custom editor install location [default: Unity Hub's own].
    #[arg(long, env = "INPUT_INSTALL-PATH", value_name = "DIR")]
    pub install_path: Option<String>,

    /// Project whose version file is read when no version is given.
    #[arg(long, env = "INPUT_PROJECT-PATH", value_name = "DIR")]
    pub project_path: Option<String>,

    /// Run privileged steps without sudo.
    #[arg(
        long,
        env = "INPUT_SELF-HOSTED",
        value_name = "BOOL",
        value_parser = parse_action_bool,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub self_hosted: bool,

    /// Log at debug level, including command error output.
    #[arg(
        short,
        long,
        env = "INPUT_VERBOSE",
        value_name = "BOOL",
        value_parser = parse_action_bool,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub verbose: bool,

    /// Resolve the version and show the plan without installing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Parse a workflow boolean input: only a case-insensitive `true` is true.
///
/// # Errors
///
/// Never fails; any other text, including the empty string, is false.
///
/// # Examples
///
/// ```
/// use unity_setup::cli::parse_action_bool;
///
/// assert_eq!(parse_action_bool("TRUE"), Ok(true));
/// assert_eq!(parse_action_bool("yes"), Ok(false));
/// ```
pub fn parse_action_bool(value: &str) -> Result<bool, Infallible> {
    Ok(value.trim().eq_ignore_ascii_case("true"))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

impl Cli {
    /// Build the setup request from the parsed inputs.
    ///
    /// Blank values are treated as absent and module entries are split on
    /// newlines, trimmed, and normalised.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use unity_setup::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["unity-setup", "--unity-version", " ", "--unity-module", "Android"]);
    /// let request = cli.setup_request();
    /// assert!(request.version.version.is_none());
    /// assert_eq!(request.modules.names(), ["android"]);
    /// ```
    #[must_use]
    pub fn setup_request(&self) -> SetupRequest {
        let project_path = non_blank(self.project_path.as_deref())
            .unwrap_or_else(|| DEFAULT_PROJECT_PATH.to_owned());
        let module_names = self
            .unity_modules
            .iter()
            .flat_map(|entry| entry.lines())
            .collect::<Vec<_>>();

        SetupRequest {
            version: VersionRequest {
                version: non_blank(self.unity_version.as_deref()),
                changeset: non_blank(self.unity_version_changeset.as_deref()),
                project_path: Utf8PathBuf::from(project_path),
            },
            modules: ModuleRequest::new(module_names, self.unity_modules_child),
            install_path: non_blank(self.install_path.as_deref()).map(Utf8PathBuf::from),
            self_hosted: self.self_hosted,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
