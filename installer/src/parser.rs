//! Parsers for text produced by the hub tool, vendor release pages, and
//! project version files.
//!
//! Every external text format is read through a narrow trait so the
//! orchestration code never depends on a particular matching strategy. The
//! regex-backed implementations here are the defaults.

use regex::Regex;
use std::sync::OnceLock;

/// Vendor annotations the hub appends to editor listings on macOS.
const LISTING_ANNOTATIONS: [&str; 2] = ["(Intel)", "(Apple silicon)"];

/// Extracts the install location of an editor from `editors --installed`
/// output.
pub trait EditorListingParser {
    /// Return the install location reported for `version`, if listed.
    fn install_location(&self, listing: &str, version: &str) -> Option<String>;
}

/// Extracts a changeset from a vendor release page.
pub trait ChangesetPageParser {
    /// Return the changeset published for `version`, if present.
    fn changeset(&self, page: &str, version: &str) -> Option<String>;
}

/// Default listing parser matching `<version> , installed at <path>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HubListingParser;

impl EditorListingParser for HubListingParser {
    fn install_location(&self, listing: &str, version: &str) -> Option<String> {
        let cleaned = strip_annotations(listing);
        let pattern = format!("{} , installed at (.+)", regex::escape(version));
        let re = Regex::new(&pattern).ok()?;
        let location = re.captures(&cleaned)?.get(1)?.as_str().trim();
        (!location.is_empty()).then(|| location.to_owned())
    }
}

/// Remove architecture annotations that sit between the version and the
/// separator in hub listings.
///
/// # Examples
///
/// ```
/// use unity_setup::parser::strip_annotations;
///
/// assert_eq!(
///     strip_annotations("2022.3.10f1 (Apple silicon), installed at /Apps/Unity.app"),
///     "2022.3.10f1 , installed at /Apps/Unity.app"
/// );
/// ```
#[must_use]
pub fn strip_annotations(listing: &str) -> String {
    LISTING_ANNOTATIONS
        .iter()
        .fold(listing.to_owned(), |text, annotation| text.replace(annotation, ""))
}

/// Default release-page parser.
///
/// Prefers the `unityhub://<version>/<changeset>` deep link and falls back to
/// the human-readable `Changeset:` label.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleasePageParser;

impl ChangesetPageParser for ReleasePageParser {
    fn changeset(&self, page: &str, version: &str) -> Option<String> {
        hub_link_changeset(page, version).or_else(|| labelled_changeset(page))
    }
}

fn hub_link_changeset(page: &str, version: &str) -> Option<String> {
    let pattern = format!("unityhub://{}/([a-z0-9]+)", regex::escape(version));
    let re = Regex::new(&pattern).ok()?;
    Some(re.captures(page)?.get(1)?.as_str().to_owned())
}

fn labelled_changeset(page: &str) -> Option<String> {
    static LABEL: OnceLock<Option<Regex>> = OnceLock::new();
    let re = LABEL
        .get_or_init(|| Regex::new(r"Changeset:</span>[ \n]*([a-z0-9]{12})").ok())
        .as_ref()?;
    Some(re.captures(page)?.get(1)?.as_str().to_owned())
}

/// Editor version recorded in a project's version file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectVersion {
    /// The file records both the version and its changeset.
    WithRevision {
        /// The editor version.
        version: String,
        /// The changeset pinning the build.
        changeset: String,
    },
    /// The file records the version only.
    VersionOnly {
        /// The editor version.
        version: String,
    },
}

/// Parse the contents of `ProjectSettings/ProjectVersion.txt`.
///
/// Returns `None` when neither the `m_EditorVersionWithRevision` nor the
/// `m_EditorVersion` entry is present.
///
/// # Examples
///
/// ```
/// use unity_setup::parser::{ProjectVersion, parse_project_version};
///
/// let parsed = parse_project_version("m_EditorVersion: 2022.3.10f1\n");
/// assert_eq!(
///     parsed,
///     Some(ProjectVersion::VersionOnly { version: "2022.3.10f1".to_owned() })
/// );
/// ```
#[must_use]
pub fn parse_project_version(contents: &str) -> Option<ProjectVersion> {
    static WITH_REVISION: OnceLock<Option<Regex>> = OnceLock::new();
    static VERSION_ONLY: OnceLock<Option<Regex>> = OnceLock::new();

    let with_revision = WITH_REVISION
        .get_or_init(|| Regex::new(r"m_EditorVersionWithRevision: (.+) \((.+)\)").ok())
        .as_ref()?;
    if let Some(captures) = with_revision.captures(contents) {
        return Some(ProjectVersion::WithRevision {
            version: captures.get(1)?.as_str().trim().to_owned(),
            changeset: captures.get(2)?.as_str().trim().to_owned(),
        });
    }

    let version_only = VERSION_ONLY
        .get_or_init(|| Regex::new(r"m_EditorVersion: (.+)").ok())
        .as_ref()?;
    let version = version_only.captures(contents)?.get(1)?.as_str().trim();
    (!version.is_empty()).then(|| ProjectVersion::VersionOnly {
        version: version.to_owned(),
    })
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
