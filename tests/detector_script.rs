// ABOUTME: Runs the OS detection shell script against fake release files.
// ABOUTME: Checks file precedence and version extraction for every branch.

#![cfg(unix)]

use assert_cmd::Command;
use pinject::inject::{DetectionResult, PROBE_SCRIPT, parse_probe_line};
use std::fs;
use tempfile::TempDir;

/// A scratch root whose `etc/` holds the given release files.
fn root_with(files: &[(&str, &str)]) -> TempDir {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("etc")).unwrap();
    for (name, content) in files {
        fs::write(root.path().join("etc").join(name), content).unwrap();
    }
    root
}

/// Run the script with `/etc/` pointed at `root` and parse its answer.
fn detect(root: &TempDir) -> DetectionResult {
    let etc = format!("{}/etc/", root.path().display());
    let script = PROBE_SCRIPT.replace("/etc/", &etc);

    let assert = Command::new("sh").arg("-c").arg(script).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert_eq!(stdout.lines().count(), 1, "unexpected output: {stdout:?}");
    parse_probe_line(&stdout).unwrap()
}

fn os_and_version(result: &DetectionResult) -> (&str, &str) {
    (result.distro.as_str(), result.version.as_str())
}

#[test]
fn lsb_release_wins_over_debian_version() {
    let root = root_with(&[
        (
            "lsb-release",
            "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=22.04\nDISTRIB_CODENAME=jammy\n",
        ),
        ("debian_version", "bookworm/sid\n"),
        ("os-release", "ID=ubuntu\nVERSION_ID=\"22.04\"\n"),
    ]);

    let result = detect(&root);
    assert_eq!(os_and_version(&result), ("ubuntu", "22"));
    assert!(!result.user.is_empty());
}

#[test]
fn debian_version_gives_major() {
    let root = root_with(&[
        ("debian_version", "12.5\n"),
        ("os-release", "ID=debian\nVERSION_ID=\"12\"\n"),
    ]);

    assert_eq!(os_and_version(&detect(&root)), ("debian", "12"));
}

#[test]
fn oracle_release_wins_over_redhat_release() {
    let root = root_with(&[
        ("oracle-release", "Oracle Linux Server release 7.9\n"),
        (
            "redhat-release",
            "Red Hat Enterprise Linux Server release 7.9 (Maipo)\n",
        ),
    ]);

    assert_eq!(os_and_version(&detect(&root)), ("oracle", "7"));
}

#[test]
fn redhat_release_is_reported_as_centos() {
    let root = root_with(&[("redhat-release", "CentOS release 6.10 (Final)\n")]);
    assert_eq!(os_and_version(&detect(&root)), ("centos", "6"));

    let root = root_with(&[("redhat-release", "CentOS Linux release 7.9.2009 (Core)\n")]);
    assert_eq!(os_and_version(&detect(&root)), ("centos", "7"));
}

#[test]
fn alpine_release_gives_major() {
    let root = root_with(&[
        ("alpine-release", "3.19.1\n"),
        ("os-release", "ID=alpine\nVERSION_ID=3.19.1\n"),
    ]);

    assert_eq!(os_and_version(&detect(&root)), ("alpine", "3"));
}

#[test]
fn os_release_strips_quotes() {
    let root = root_with(&[(
        "os-release",
        "NAME=\"openSUSE Leap\"\nID=\"opensuse-leap\"\nID_LIKE=\"suse opensuse\"\nVERSION_ID='15.5'\n",
    )]);

    assert_eq!(os_and_version(&detect(&root)), ("opensuse-leap", "15.5"));
}

#[test]
fn os_release_without_version_is_unknown() {
    let root = root_with(&[("os-release", "ID=arch\nBUILD_ID=rolling\n")]);
    assert_eq!(os_and_version(&detect(&root)), ("arch", "unknown"));
}

#[test]
fn no_release_files_is_other() {
    let root = root_with(&[]);
    assert_eq!(os_and_version(&detect(&root)), ("other", "unknown"));
}

#[test]
fn separators_in_names_are_replaced() {
    let root = root_with(&[(
        "lsb-release",
        "DISTRIB_ID=\"Linux Mint\"\nDISTRIB_RELEASE=21.3\n",
    )]);

    assert_eq!(os_and_version(&detect(&root)), ("linux-mint", "21"));
}
