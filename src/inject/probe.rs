// ABOUTME: The OS probe shell script and the parser for its one-line answer.
// ABOUTME: The probe prints "distro/version:user" in lowercase on stdout and nothing else.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Where the probe is placed inside the detection container.
pub const PROBE_PATH: &str = "/opt/pinject/detector";

/// Identifies the distribution, its major version and the image's default user.
///
/// The cascade goes from the most specific release file to the generic
/// `os-release`. Separators and whitespace inside the OS and version are
/// replaced with `-` and empty values become `unknown` before printing.
pub const PROBE_SCRIPT: &str = r#"#!/bin/sh
# Prints "<os>/<version>:<user>" on stdout. Diagnostics go to stderr only.
if [ -f /etc/lsb-release ]; then
    . /etc/lsb-release
    OS=$DISTRIB_ID
    VER=${DISTRIB_RELEASE%%.*}
elif [ -f /etc/debian_version ]; then
    OS=debian
    VER=$(cut -d. -f1 /etc/debian_version)
elif [ -f /etc/oracle-release ]; then
    OS=oracle
    VER=$(sed -e 's/.*[[:space:]]\([0-9][0-9]*\)\..*/\1/' /etc/oracle-release)
elif [ -f /etc/redhat-release ]; then
    OS=centos
    VER=$(sed -e 's/.*[[:space:]]\([0-9][0-9]*\)\..*/\1/' /etc/redhat-release)
elif [ -f /etc/alpine-release ]; then
    OS=alpine
    VER=$(cut -d. -f1 /etc/alpine-release)
elif [ -f /etc/os-release ]; then
    OS=$(sed -n 's/^ID=//p' /etc/os-release | tr -d "\"'")
    VER=$(sed -n 's/^VERSION_ID=//p' /etc/os-release | tr -d "\"'")
else
    OS=other
    VER=unknown
fi
OS=$(printf '%s' "$OS" | tr '/: \t\n' '-----')
VER=$(printf '%s' "$VER" | tr '/: \t\n' '-----')
[ -n "$OS" ] || OS=unknown
[ -n "$VER" ] || VER=unknown
WHO=$(whoami 2>/dev/null || id -un 2>/dev/null || id -u)
echo "$OS/$VER:$WHO" | tr '[:upper:]' '[:lower:]'
"#;

/// What the probe found out about an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    pub distro: String,
    pub version: String,
    pub user: String,
}

impl DetectionResult {
    pub fn new(
        distro: impl Into<String>,
        version: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            distro: distro.into(),
            version: version.into(),
            user: user.into(),
        }
    }
}

/// Formats back into the probe's output line.
impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.distro, self.version, self.user)
    }
}

/// A probe line that does not match `distro '/' version ':' user`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeLineError {
    #[error("probe output {line:?} is missing the {separator:?} separator")]
    MissingSeparator { line: String, separator: char },

    #[error("probe output {line:?} has an empty {field}")]
    EmptyField { line: String, field: &'static str },

    #[error("probe output {line:?} has a stray separator in the {field}")]
    StraySeparator { line: String, field: &'static str },
}

/// Parse one probe output line.
///
/// Grammar: `distro '/' version ':' user`, every field non-empty, `distro`
/// free of both separators, `version` free of `/`, `user` free of both.
/// Surrounding whitespace is ignored.
pub fn parse_probe_line(line: &str) -> Result<DetectionResult, ProbeLineError> {
    let trimmed = line.trim();
    let missing = |separator| ProbeLineError::MissingSeparator {
        line: trimmed.to_string(),
        separator,
    };

    let (distro, rest) = trimmed.split_once('/').ok_or_else(|| missing('/'))?;
    let (version, user) = rest.split_once(':').ok_or_else(|| missing(':'))?;

    for (field, value, forbidden) in [
        ("distro", distro, &['/', ':'][..]),
        ("version", version, &['/'][..]),
        ("user", user, &['/', ':'][..]),
    ] {
        if value.is_empty() {
            return Err(ProbeLineError::EmptyField {
                line: trimmed.to_string(),
                field,
            });
        }
        if value.contains(forbidden) {
            return Err(ProbeLineError::StraySeparator {
                line: trimmed.to_string(),
                field,
            });
        }
    }

    Ok(DetectionResult::new(distro, version, user))
}

impl FromStr for DetectionResult {
    type Err = ProbeLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_probe_line(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_line() {
        let result = parse_probe_line("ubuntu/22:root\n").unwrap();
        assert_eq!(result, DetectionResult::new("ubuntu", "22", "root"));
    }

    #[test]
    fn missing_colon_is_an_error() {
        let err = parse_probe_line("ubuntu/22").unwrap_err();
        assert!(matches!(
            err,
            ProbeLineError::MissingSeparator { separator: ':', .. }
        ));
    }

    #[test]
    fn empty_user_is_an_error() {
        let err = parse_probe_line("alpine/3:").unwrap_err();
        assert!(matches!(err, ProbeLineError::EmptyField { field: "user", .. }));
    }

    #[test]
    fn extra_slash_in_version_is_an_error() {
        let err = parse_probe_line("debian/bookworm/sid:root").unwrap_err();
        assert!(matches!(
            err,
            ProbeLineError::StraySeparator {
                field: "version",
                ..
            }
        ));
    }

    #[test]
    fn script_is_a_posix_shell_script() {
        assert!(PROBE_SCRIPT.starts_with("#!/bin/sh\n"));
        assert!(PROBE_SCRIPT.ends_with("tr '[:upper:]' '[:lower:]'\n"));
    }
}
