//! Optional editor component installation.

use crate::error::{Result, SetupError};
use crate::hub::Hub;
use log::info;

/// Hub output markers that count as a successful module install.
const SUCCESS_MARKERS: [&str; 2] = ["successfully", "it's already installed"];

/// Ordered, de-duplicated set of module names plus the child-module flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRequest {
    names: Vec<String>,
    include_children: bool,
}

impl ModuleRequest {
    /// Build a request from raw names.
    ///
    /// Names are trimmed and lower-cased; blank and repeated names are
    /// dropped while the first-seen order is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use unity_setup::modules::ModuleRequest;
    ///
    /// let request = ModuleRequest::new(["Android", " ios ", "", "android"], false);
    /// assert_eq!(request.names(), ["android", "ios"]);
    /// ```
    #[must_use]
    pub fn new<I, S>(names: I, include_children: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim().to_lowercase();
            if !name.is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            names: unique,
            include_children,
        }
    }

    /// Normalised module names in request order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether child modules should be installed too.
    #[must_use]
    pub fn include_children(&self) -> bool {
        self.include_children
    }

    /// Whether no modules were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Hub arguments installing this request for `version`.
    #[must_use]
    pub fn hub_args(&self, version: &str) -> Vec<String> {
        let mut args = vec![
            "install-modules".to_owned(),
            "--version".to_owned(),
            version.to_owned(),
        ];
        for name in &self.names {
            args.push("--module".to_owned());
            args.push(name.clone());
        }
        if self.include_children {
            args.push("--childModules".to_owned());
        }
        args
    }
}

/// Installs modules for an editor that is already present.
pub struct ModuleProvisioner<'a> {
    hub: &'a Hub<'a>,
}

impl<'a> ModuleProvisioner<'a> {
    /// Create a provisioner driving `hub`.
    #[must_use]
    pub fn new(hub: &'a Hub<'a>) -> Self {
        Self { hub }
    }

    /// Install every module in `request` for `version`.
    ///
    /// The hub's combined output decides the outcome for the whole request:
    /// it succeeds when a success or already-installed marker appears.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::ModuleInstallFailed`] when neither marker is
    /// present.
    pub fn install(&self, version: &str, request: &ModuleRequest) -> Result<()> {
        let modules = request.names().join(" ");
        info!("Installing Unity modules for {version}: {modules}");

        let result = self.hub.run(&request.hub_args(version))?;
        if result.satisfies(|out| SUCCESS_MARKERS.iter().any(|marker| out.contains(marker))) {
            info!("Unity modules installed");
            Ok(())
        } else {
            Err(SetupError::ModuleInstallFailed {
                version: version.to_owned(),
                modules,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::MockBaseDirs;
    use crate::platform::{Platform, PlatformProfile};
    use crate::runner::{CommandResult, Invocation, RunOptions};
    use crate::test_utils::{ExpectedCall, StubRunner};
    use rstest::{fixture, rstest};

    #[fixture]
    fn windows() -> PlatformProfile {
        PlatformProfile::for_platform(Platform::Windows, &MockBaseDirs::new())
            .expect("windows profile")
    }

    fn install_modules(profile: &PlatformProfile, args: &[&str], stdout: &str) -> ExpectedCall {
        ExpectedCall::returning(
            Invocation::new(profile.hub_path().as_str())
                .args(["--", "--headless", "install-modules", "--version", "2022.3.10f1"])
                .args(args.iter().copied()),
            RunOptions::tolerant(),
            Ok(CommandResult::new(stdout, 1)),
        )
    }

    #[test]
    fn request_keeps_first_seen_order() {
        let request = ModuleRequest::new(["WebGL", "android", "ANDROID", "ios"], true);
        assert_eq!(request.names(), ["webgl", "android", "ios"]);
        assert!(request.include_children());
    }

    #[test]
    fn blank_names_make_an_empty_request() {
        assert!(ModuleRequest::new(["", "  "], true).is_empty());
    }

    #[rstest]
    #[case::plain(false, vec!["install-modules", "--version", "6000.0.1f1", "--module", "android", "--module", "ios"])]
    #[case::children(true, vec!["install-modules", "--version", "6000.0.1f1", "--module", "android", "--module", "ios", "--childModules"])]
    fn hub_args_list_one_flag_per_module(#[case] children: bool, #[case] expected: Vec<&str>) {
        let request = ModuleRequest::new(["Android", "iOS"], children);
        assert_eq!(request.hub_args("6000.0.1f1"), expected);
    }

    #[rstest]
    #[case::installed("All modules were installed successfully.")]
    #[case::present("Module android: it's already installed")]
    fn success_markers_accept_output(windows: PlatformProfile, #[case] stdout: &str) {
        let runner = StubRunner::new(vec![install_modules(
            &windows,
            &["--module", "android"],
            stdout,
        )]);
        let hub = Hub::new(&windows, windows.hub_path(), &runner);

        ModuleProvisioner::new(&hub)
            .install("2022.3.10f1", &ModuleRequest::new(["android"], false))
            .expect("modules installed");
        runner.assert_finished();
    }

    #[rstest]
    fn missing_marker_fails_whole_request(windows: PlatformProfile) {
        let runner = StubRunner::new(vec![install_modules(
            &windows,
            &["--module", "android", "--module", "ios", "--childModules"],
            "Error: module ios is not available",
        )]);
        let hub = Hub::new(&windows, windows.hub_path(), &runner);

        let err = ModuleProvisioner::new(&hub)
            .install("2022.3.10f1", &ModuleRequest::new(["android", "ios"], true))
            .expect_err("no success marker");
        assert!(matches!(
            err,
            SetupError::ModuleInstallFailed { ref modules, .. } if modules == "android ios"
        ));
        runner.assert_finished();
    }
}
