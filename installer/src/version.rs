//! Editor version identifiers and release-channel classification.

use crate::error::{Result, SetupError};
use std::fmt;

/// Base URL of the vendor's release pages.
const RELEASE_PAGES: &str = "https://unity3d.com/unity";

/// A fully resolved editor version and the changeset pinning its build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    version: String,
    changeset: String,
}

impl VersionSpec {
    /// Create a spec from a version and changeset.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::IncompleteVersion`] when either field is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use unity_setup::version::VersionSpec;
    ///
    /// let spec = VersionSpec::new("2022.3.10f1", "ff3792e53c62")?;
    /// assert_eq!(spec.to_string(), "2022.3.10f1 (ff3792e53c62)");
    /// assert!(VersionSpec::new("2022.3.10f1", " ").is_err());
    /// # Ok::<(), unity_setup::error::SetupError>(())
    /// ```
    pub fn new(version: impl Into<String>, changeset: impl Into<String>) -> Result<Self> {
        let version = version.into().trim().to_owned();
        let changeset = changeset.into().trim().to_owned();
        if version.is_empty() {
            return Err(SetupError::IncompleteVersion { field: "version" });
        }
        if changeset.is_empty() {
            return Err(SetupError::IncompleteVersion { field: "changeset" });
        }
        Ok(Self { version, changeset })
    }

    /// The vendor release identifier, e.g. `2022.3.10f1`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The changeset pinning the build, e.g. `ff3792e53c62`.
    #[must_use]
    pub fn changeset(&self) -> &str {
        &self.changeset
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.changeset)
    }
}

/// Release stage encoded in a version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseChannel {
    /// Versions carrying an `a` marker.
    Alpha,
    /// Versions carrying a `b` marker.
    Beta,
    /// Versions carrying an `f` marker.
    Final,
}

impl ReleaseChannel {
    /// Classify a version by the first matching marker, checked in the order
    /// alpha, beta, final.
    ///
    /// # Examples
    ///
    /// ```
    /// use unity_setup::version::ReleaseChannel;
    ///
    /// assert_eq!(ReleaseChannel::classify("2023.1.0a14"), Some(ReleaseChannel::Alpha));
    /// assert_eq!(ReleaseChannel::classify("2022.3.10f1"), Some(ReleaseChannel::Final));
    /// assert_eq!(ReleaseChannel::classify("2022.3.10"), None);
    /// ```
    #[must_use]
    pub fn classify(version: &str) -> Option<Self> {
        if version.contains('a') {
            Some(Self::Alpha)
        } else if version.contains('b') {
            Some(Self::Beta)
        } else if version.contains('f') {
            Some(Self::Final)
        } else {
            None
        }
    }

    /// URL of the release page that lists the changeset for `version`.
    ///
    /// Alpha and beta pages key on the full version; final release notes key
    /// on the numeric prefix only, so a final version without digits has no
    /// page.
    #[must_use]
    pub fn page_url(self, version: &str) -> Option<String> {
        match self {
            Self::Alpha => Some(format!("{RELEASE_PAGES}/alpha/{version}")),
            Self::Beta => Some(format!("{RELEASE_PAGES}/beta/{version}")),
            Self::Final => match numeric_prefix(version) {
                "" => None,
                prefix => Some(format!("{RELEASE_PAGES}/whats-new/{prefix}")),
            },
        }
    }
}

/// Return the first run of digits and dots in `version`.
fn numeric_prefix(version: &str) -> &str {
    let is_numeric = |c: char| c.is_ascii_digit() || c == '.';
    let Some(start) = version.find(is_numeric) else {
        return "";
    };
    let rest = version.get(start..).unwrap_or_default();
    let end = rest.find(|c: char| !is_numeric(c)).unwrap_or(rest.len());
    rest.get(..end).unwrap_or_default()
}

/// Build the changeset lookup URL for a version, if one can be derived.
#[must_use]
pub fn changeset_page_url(version: &str) -> Option<String> {
    ReleaseChannel::classify(version).and_then(|channel| channel.page_url(version))
}
