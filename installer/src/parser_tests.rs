//! Tests for hub listing, release page, and project file parsers.

use super::*;
use rstest::rstest;

const LINUX_LISTING: &str = "\
2021.3.5f1 , installed at /home/runner/Unity/Hub/Editor/2021.3.5f1/Editor/Unity
2022.3.10f1 , installed at /home/runner/Unity/Hub/Editor/2022.3.10f1/Editor/Unity
";

#[test]
fn listing_parser_finds_requested_version() {
    let location = HubListingParser.install_location(LINUX_LISTING, "2022.3.10f1");
    assert_eq!(
        location.as_deref(),
        Some("/home/runner/Unity/Hub/Editor/2022.3.10f1/Editor/Unity")
    );
}

#[test]
fn listing_parser_returns_none_for_missing_version() {
    assert_eq!(
        HubListingParser.install_location(LINUX_LISTING, "2023.1.0b1"),
        None
    );
}

#[rstest]
#[case::intel("2022.3.10f1 (Intel), installed at /Applications/Unity/Hub/Editor/2022.3.10f1/Unity.app")]
#[case::apple_silicon(
    "2022.3.10f1 (Apple silicon), installed at /Applications/Unity/Hub/Editor/2022.3.10f1/Unity.app"
)]
fn listing_parser_ignores_architecture_annotations(#[case] listing: &str) {
    let location = HubListingParser.install_location(listing, "2022.3.10f1");
    assert_eq!(
        location.as_deref(),
        Some("/Applications/Unity/Hub/Editor/2022.3.10f1/Unity.app")
    );
}

#[test]
fn listing_parser_treats_version_dots_literally() {
    let listing = "2022x3x10f1 , installed at /wrong/path\n";
    assert_eq!(HubListingParser.install_location(listing, "2022.3.10f1"), None);
}

#[test]
fn listing_parser_trims_carriage_returns() {
    let listing = "2022.3.10f1 , installed at C:\\Program Files\\Unity\\Editor\\Unity.exe\r\n";
    assert_eq!(
        HubListingParser
            .install_location(listing, "2022.3.10f1")
            .as_deref(),
        Some("C:\\Program Files\\Unity\\Editor\\Unity.exe")
    );
}

#[test]
fn release_page_parser_prefers_hub_link() {
    let page = r#"
        <a href="unityhub://2022.3.10f1/ff3792e53c62">Install with Hub</a>
        <span>Changeset:</span> 000000000000
    "#;
    assert_eq!(
        ReleasePageParser.changeset(page, "2022.3.10f1").as_deref(),
        Some("ff3792e53c62")
    );
}

#[test]
fn release_page_parser_falls_back_to_label() {
    let page = "<li><span>Changeset:</span>\n  ff3792e53c62</li>";
    assert_eq!(
        ReleasePageParser.changeset(page, "2022.3.10f1").as_deref(),
        Some("ff3792e53c62")
    );
}

#[test]
fn release_page_parser_ignores_links_for_other_versions() {
    let page = r#"<a href="unityhub://2022.3.9f1/aaaaaaaaaaaa">Older</a>"#;
    assert_eq!(ReleasePageParser.changeset(page, "2022.3.10f1"), None);
}

#[test]
fn release_page_parser_rejects_short_labels() {
    let page = "<span>Changeset:</span> abc123";
    assert_eq!(ReleasePageParser.changeset(page, "2022.3.10f1"), None);
}

#[test]
fn project_version_with_revision_yields_both_fields() {
    let contents = "m_EditorVersion: 2022.3.10f1\nm_EditorVersionWithRevision: 2022.3.10f1 (abc123def456)\n";
    assert_eq!(
        parse_project_version(contents),
        Some(ProjectVersion::WithRevision {
            version: "2022.3.10f1".to_owned(),
            changeset: "abc123def456".to_owned(),
        })
    );
}

#[test]
fn project_version_handles_windows_line_endings() {
    let contents = "m_EditorVersion: 2022.3.10f1\r\n";
    assert_eq!(
        parse_project_version(contents),
        Some(ProjectVersion::VersionOnly {
            version: "2022.3.10f1".to_owned(),
        })
    );
}

#[test]
fn project_version_rejects_unrelated_contents() {
    assert_eq!(parse_project_version("m_Something: else\n"), None);
}
