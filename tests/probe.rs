// ABOUTME: Integration tests for the probe output parser.
// ABOUTME: Property tests for well-formed lines plus malformed-input cases.

use pinject::inject::{DetectionResult, ProbeLineError, parse_probe_line};
use proptest::prelude::*;

fn field() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9._-]{0,15}"
}

proptest! {
    #[test]
    fn well_formed_lines_parse_back(distro in field(), version in field(), user in field()) {
        let line = format!("{distro}/{version}:{user}");
        let parsed = parse_probe_line(&line).unwrap();
        prop_assert_eq!(&parsed, &DetectionResult::new(&distro, &version, &user));
        prop_assert_eq!(parsed.to_string(), line);
    }

    #[test]
    fn surrounding_whitespace_is_ignored(distro in field(), version in field(), user in field()) {
        let line = format!("  {distro}/{version}:{user}\r\n");
        prop_assert!(parse_probe_line(&line).is_ok());
    }

    #[test]
    fn lines_without_slash_are_rejected(text in "[a-z0-9:]{0,20}") {
        let is_missing_separator = matches!(
            parse_probe_line(&text),
            Err(ProbeLineError::MissingSeparator { separator: '/', .. })
        );
        prop_assert!(is_missing_separator);
    }
}

#[test]
fn version_may_contain_colon_free_dots() {
    let parsed = parse_probe_line("debian/12.5:root").unwrap();
    assert_eq!(parsed.version, "12.5");
}

#[test]
fn empty_fields_are_rejected() {
    for (line, field) in [("/22:root", "distro"), ("ubuntu/:root", "version")] {
        match parse_probe_line(line) {
            Err(ProbeLineError::EmptyField { field: f, .. }) => assert_eq!(f, field, "{line}"),
            other => panic!("{line}: unexpected {other:?}"),
        }
    }
}

#[test]
fn stray_colon_in_user_is_rejected() {
    assert!(matches!(
        parse_probe_line("alpine/3:root:extra"),
        Err(ProbeLineError::StraySeparator { field: "user", .. })
    ));
}

#[test]
fn parses_via_from_str() {
    let parsed: DetectionResult = "oracle/8:root".parse().unwrap();
    assert_eq!(parsed.distro, "oracle");
    assert_eq!(parsed.version, "8");
    assert_eq!(parsed.user, "root");
}
