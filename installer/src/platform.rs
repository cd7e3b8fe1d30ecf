//! Platform-specific constants and command templates.
//!
//! A [`PlatformProfile`] is resolved once at startup from the running
//! operating system and passed to every component that needs hub paths,
//! installer URLs, or the headless invocation wrapper.

use crate::dirs::BaseDirs;
use crate::error::{Result, SetupError};
use crate::runner::Invocation;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Base URL for Unity Hub installers.
const HUB_CDN: &str = "https://public-cdn.cloud.unity3d.com/hub/prod";

/// Relative path from a macOS editor bundle to its executable.
const MACOS_EDITOR_EXECUTABLE: &str = "Contents/MacOS/Unity";

/// Wrapper that provides a virtual display for the hub on Linux.
const LINUX_DISPLAY_WRAPPER: &str = "xvfb-run";

/// Operating systems the setup supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux runners; the hub ships as an AppImage.
    Linux,
    /// macOS runners; the hub ships as a disk image.
    MacOs,
    /// Windows runners; the hub ships as an NSIS installer.
    Windows,
}

impl Platform {
    /// Map an operating system identifier (as in [`std::env::consts::OS`]).
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::UnsupportedPlatform`] for any other identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use unity_setup::platform::Platform;
    ///
    /// assert_eq!(Platform::from_os("macos").ok(), Some(Platform::MacOs));
    /// assert!(Platform::from_os("freebsd").is_err());
    /// ```
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::MacOs),
            "windows" => Ok(Self::Windows),
            other => Err(SetupError::UnsupportedPlatform {
                os: other.to_owned(),
            }),
        }
    }

    /// Whether the install-path override needs a prepared directory.
    #[must_use]
    pub fn prepares_install_dir(self) -> bool {
        matches!(self, Self::Linux | Self::MacOs)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        };
        f.write_str(name)
    }
}

/// Read-only per-platform constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    platform: Platform,
    hub_path: Utf8PathBuf,
    hub_config_dir: Option<Utf8PathBuf>,
    installer_file_name: &'static str,
}

impl PlatformProfile {
    /// Resolve the profile for an operating system identifier.
    ///
    /// The platform is validated before any directory lookup takes place.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::UnsupportedPlatform`] for unknown systems and
    /// [`SetupError::HomeDirUnavailable`] when the Linux home directory cannot
    /// be determined.
    pub fn detect(os: &str, dirs: &dyn BaseDirs) -> Result<Self> {
        let platform = Platform::from_os(os)?;
        Self::for_platform(platform, dirs)
    }

    /// Build the profile for a known platform.
    ///
    /// # Errors
    ///
    /// Returns an error when the Linux home directory is unavailable or not
    /// valid UTF-8.
    pub fn for_platform(platform: Platform, dirs: &dyn BaseDirs) -> Result<Self> {
        match platform {
            Platform::Linux => {
                let home = dirs.home_dir().ok_or(SetupError::HomeDirUnavailable)?;
                let home = Utf8PathBuf::try_from(home).map_err(|e| SetupError::InvalidPath {
                    reason: format!("home directory is not valid UTF-8: {e}"),
                })?;
                Ok(Self {
                    platform,
                    hub_path: home.join("Unity Hub").join("UnityHub.AppImage"),
                    hub_config_dir: Some(home.join(".config").join("Unity Hub")),
                    installer_file_name: "UnityHub.AppImage",
                })
            }
            Platform::MacOs => Ok(Self {
                platform,
                hub_path: Utf8PathBuf::from("/Applications/Unity Hub.app/Contents/MacOS/Unity Hub"),
                hub_config_dir: None,
                installer_file_name: "UnityHubSetup.dmg",
            }),
            Platform::Windows => Ok(Self {
                platform,
                hub_path: Utf8PathBuf::from("C:/Program Files/Unity Hub/Unity Hub.exe"),
                hub_config_dir: None,
                installer_file_name: "UnityHubSetup.exe",
            }),
        }
    }

    /// Replace the hub executable location.
    #[must_use]
    pub fn with_hub_path(mut self, hub_path: impl Into<Utf8PathBuf>) -> Self {
        self.hub_path = hub_path.into();
        self
    }

    /// The platform this profile describes.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Fixed install location of the hub executable.
    #[must_use]
    pub fn hub_path(&self) -> &Utf8Path {
        &self.hub_path
    }

    /// Hub configuration directory (Linux only).
    #[must_use]
    pub fn hub_config_dir(&self) -> Option<&Utf8Path> {
        self.hub_config_dir.as_deref()
    }

    /// File name of the downloaded hub installer.
    #[must_use]
    pub fn installer_file_name(&self) -> &'static str {
        self.installer_file_name
    }

    /// Download URL of the hub installer.
    ///
    /// # Examples
    ///
    /// ```
    /// use unity_setup::dirs::SystemBaseDirs;
    /// use unity_setup::platform::{Platform, PlatformProfile};
    ///
    /// let profile = PlatformProfile::for_platform(Platform::Windows, &SystemBaseDirs)?;
    /// assert!(profile.hub_installer_url().ends_with("/UnityHubSetup.exe"));
    /// # Ok::<(), unity_setup::error::SetupError>(())
    /// ```
    #[must_use]
    pub fn hub_installer_url(&self) -> String {
        format!("{HUB_CDN}/{}", self.installer_file_name)
    }

    /// Wrap hub arguments in the platform's headless invocation.
    ///
    /// Linux runs the hub under a virtual display; macOS and Windows pass the
    /// headless flag after an argument separator.
    #[must_use]
    pub fn hub_invocation(&self, hub_path: &Utf8Path, args: &[String]) -> Invocation {
        match self.platform {
            Platform::Linux => Invocation::new(LINUX_DISPLAY_WRAPPER)
                .arg("--auto-servernum")
                .arg(hub_path.as_str())
                .arg("--headless")
                .args(args.iter().cloned()),
            Platform::MacOs | Platform::Windows => Invocation::new(hub_path.as_str())
                .arg("--")
                .arg("--headless")
                .args(args.iter().cloned()),
        }
    }

    /// Turn an install location reported by the hub into the editor
    /// executable path.
    #[must_use]
    pub fn editor_executable(&self, install_location: &str) -> Utf8PathBuf {
        let location = Utf8PathBuf::from(install_location);
        match self.platform {
            Platform::MacOs => location.join(MACOS_EDITOR_EXECUTABLE),
            Platform::Linux | Platform::Windows => location,
        }
    }
}
